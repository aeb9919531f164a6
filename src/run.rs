//! End-to-end run: load, partition, walk, write results

use crate::bsp::{Engine, EngineOptions, RunReport};
use crate::config::{ConfigError, RunConfig};
use crate::error::RwRankResult;
use crate::graph::{load_edge_list, PartitionedGraph};
use crate::output::{write_scores, write_stats};
use rand::Rng;
use rwrank_walk::{Signal, WalkParams};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// What a finished run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub vertex_count: usize,
    pub edge_count: usize,
    /// `None` when the wait count was 0 and no walk was started
    pub params: Option<WalkParams>,
    pub report: RunReport,
    pub score_files: Vec<PathBuf>,
    pub stats_file: PathBuf,
}

impl RunSummary {
    /// Pretty-printed JSON form, as printed by `rwrank --json`
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// The configured seed, or a fresh one from entropy.
///
/// A drawn seed is logged so the run can be replayed.
pub fn resolve_seed(config: &RunConfig) -> u64 {
    match config.seed {
        Some(seed) => seed,
        None => {
            let seed = rand::thread_rng().gen();
            info!("No seed configured, using {}", seed);
            seed
        }
    }
}

/// Run one random-walk round over an already loaded graph.
///
/// Vertex counters are not reset first, so callers that reuse a graph should
/// call [`PartitionedGraph::reset_states`].
pub fn walk(graph: &mut PartitionedGraph, config: &RunConfig, seed: u64) -> RwRankResult<RunReport> {
    let Some(params) = config.walk_params(graph.vertex_count() as u64)? else {
        warn!("Wait count is 0: no random walks are started and every score is 0");
        return Ok(RunReport {
            seed,
            ..RunReport::default()
        });
    };

    info!(
        "Starting {} walk-units per vertex plus one with probability {:.4}, absorbing from super-step {}",
        params.num_of_rw_per_node_to_start, params.prob_to_start_rw, params.max_wait_iter
    );

    let options = EngineOptions {
        workers: config.workers,
        seed,
        max_supersteps: config.max_supersteps,
    };
    let mut engine = Engine::new(graph, params, options)?;
    engine.signal_all(Signal::Start);
    Ok(engine.start()?)
}

/// Validate `config`, load its graph, run the walk and write every output.
pub fn run(config: &RunConfig) -> RwRankResult<RunSummary> {
    config.validate()?;
    let graph_path = config
        .graph
        .as_ref()
        .ok_or(ConfigError::MissingGraphSource)?;

    let store = load_edge_list(graph_path)?;
    let mut graph = store.finalize(config.workers)?;
    let seed = resolve_seed(config);

    let report = walk(&mut graph, config, seed)?;
    let params = config.walk_params(graph.vertex_count() as u64)?;

    let score_files = write_scores(&graph, &config.output)?;
    let stats_file = config.stats_path();
    write_stats(&stats_file, &report)?;
    info!("Wrote run statistics to {:?}", stats_file);

    Ok(RunSummary {
        vertex_count: graph.vertex_count(),
        edge_count: graph.edge_count(),
        params,
        report,
        score_files,
        stats_file,
    })
}
