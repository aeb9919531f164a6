//! rwrank: command-line driver for random-walk PageRank
//!
//! Settings come from built-in defaults, then an optional YAML file, then
//! the flags given here.

use anyhow::Context;
use clap::Parser;
use rwrank::RunConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rwrank", version, about = "Random-walk PageRank on a bulk-synchronous engine")]
struct Cli {
    /// Edge-list file (`source target` per line)
    #[arg(long)]
    graph: Option<PathBuf>,

    /// YAML run configuration; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of random walks to start over the whole graph
    #[arg(long = "rwnum", allow_negative_numbers = true)]
    rw_num: Option<i64>,

    /// Super-steps a walk-unit travels before being absorbed
    #[arg(long = "maxwait")]
    max_wait: Option<u32>,

    /// Fraction of active replicas, in (0, 1]
    #[arg(long = "replicap")]
    activation_fraction: Option<f64>,

    /// Partitions and worker threads
    #[arg(long)]
    workers: Option<usize>,

    /// Seed for every random draw; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many super-steps
    #[arg(long)]
    max_supersteps: Option<u32>,

    /// Prefix of the per-partition score files
    #[arg(long)]
    output: Option<PathBuf>,

    /// File receiving `compute_secs<TAB>bytes_sent<TAB>runtime_secs`;
    /// defaults to `<output>_stats.txt`
    #[arg(long)]
    stats: Option<PathBuf>,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<(RunConfig, bool)> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_yaml_file(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => RunConfig::default(),
        };

        if let Some(graph) = self.graph {
            config.graph = Some(graph);
        }
        if let Some(rw_num) = self.rw_num {
            config.rw_num = rw_num;
        }
        if let Some(max_wait) = self.max_wait {
            config.max_wait = max_wait;
        }
        if let Some(fraction) = self.activation_fraction {
            config.activation_fraction = fraction;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.max_supersteps.is_some() {
            config.max_supersteps = self.max_supersteps;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if self.stats.is_some() {
            config.stats = self.stats;
        }

        Ok((config, self.json))
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let (config, json) = Cli::parse().into_config()?;
    tracing::info!("rwrank {}", rwrank::version());
    config.validate().context("invalid run configuration")?;

    let summary = rwrank::run(&config).context("random-walk PageRank run failed")?;

    if json {
        println!("{}", summary.to_json()?);
    } else {
        let report = &summary.report;
        println!(
            "{} vertices, {} edges: {} walk-units absorbed in {} super-steps ({:.3}s)",
            summary.vertex_count,
            summary.edge_count,
            report.absorbed,
            report.supersteps,
            report.runtime.as_secs_f64()
        );
        for path in &summary.score_files {
            println!("{}", path.display());
        }
        println!("{}", summary.stats_file.display());
    }

    Ok(())
}
