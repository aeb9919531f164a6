//! Run configuration
//!
//! Built once at startup (from defaults, an optional YAML file and command
//! line overrides), validated before any graph is loaded, and never mutated
//! afterwards.

use rwrank_walk::{WalkParams, WalkResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Configuration errors; all are detected before the engine starts
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No graph file given")]
    MissingGraphSource,

    #[error("Number of random walks must be positive, got {0}")]
    NonPositiveWalkCount(i64),

    #[error("Fraction of active replicas must be in (0, 1], got {0}")]
    ActivationOutOfRange(f64),

    #[error("At least one worker is required")]
    ZeroWorkers,

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Parameters of one random-walk PageRank run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Edge-list file to load
    pub graph: Option<PathBuf>,
    /// Target number of random walks over the whole graph
    pub rw_num: i64,
    /// Super-steps to wait before absorbing; the absorb threshold is `max_wait - 1`
    pub max_wait: u32,
    /// Fraction of active replicas for scatter
    pub activation_fraction: f64,
    /// Partitions / worker threads
    pub workers: usize,
    /// Run seed; drawn from entropy when absent
    pub seed: Option<u64>,
    /// Hard cap on super-steps
    pub max_supersteps: Option<u32>,
    /// Prefix of the per-partition score files
    pub output: PathBuf,
    /// Where to write the run statistics line; `<output>_stats.txt` when absent
    pub stats: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            graph: None,
            rw_num: 800_000,
            max_wait: 5,
            activation_fraction: 1.0,
            workers: rayon::current_num_threads(),
            seed: None,
            max_supersteps: None,
            output: PathBuf::from("output"),
            stats: None,
        }
    }
}

impl RunConfig {
    /// Load a configuration from a YAML file; missing keys take their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        info!("Reading run configuration from {:?}", path);
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        match &self.graph {
            Some(path) if !path.as_os_str().is_empty() => {}
            _ => return Err(ConfigError::MissingGraphSource),
        }

        if self.rw_num <= 0 {
            return Err(ConfigError::NonPositiveWalkCount(self.rw_num));
        }

        if !(self.activation_fraction > 0.0 && self.activation_fraction <= 1.0) {
            return Err(ConfigError::ActivationOutOfRange(self.activation_fraction));
        }

        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }

        Ok(())
    }

    /// File receiving the statistics line: the configured path, or the
    /// output prefix with `_stats.txt` appended.
    pub fn stats_path(&self) -> PathBuf {
        match &self.stats {
            Some(path) => path.clone(),
            None => {
                let mut name = self.output.clone().into_os_string();
                name.push("_stats.txt");
                PathBuf::from(name)
            }
        }
    }

    /// Zero-based absorb threshold, or `None` when the wait count is 0
    /// (no walk is started at all).
    pub fn absorb_threshold(&self) -> Option<u32> {
        self.max_wait.checked_sub(1)
    }

    /// Walk parameters for a graph with `vertex_count` vertices.
    ///
    /// Returns `None` when no walk should be started. Expects a validated
    /// configuration; a negative walk count starts no walks.
    pub fn walk_params(&self, vertex_count: u64) -> WalkResult<Option<WalkParams>> {
        let Some(max_wait_iter) = self.absorb_threshold() else {
            return Ok(None);
        };
        let rw_num = u64::try_from(self.rw_num).unwrap_or(0);
        WalkParams::from_target(rw_num, vertex_count, max_wait_iter, self.activation_fraction).map(Some)
    }
}
