//! rwrank: random-walk PageRank on a bulk-synchronous vertex-centric engine
//!
//! Every vertex starts a batch of walk-units, forwards them along its
//! out-edges for a fixed number of super-steps and then absorbs whatever it
//! holds. The absorbed count is the vertex's (unnormalized) PageRank score.
//!
//! # Layout
//!
//! - [`graph`]: edge-list loading, the graph builder and the partitioned,
//!   finalized graph
//! - [`bsp`]: super-step engine, per-worker mailboxes and the message bus
//! - [`config`]: run configuration (defaults, YAML, validation)
//! - [`output`]: per-partition score files and the statistics line
//! - [`run`]: the end-to-end pipeline used by the command-line tool
//!
//! The per-vertex algorithm itself (start allocation, stochastic splitter,
//! absorb threshold) lives in the `rwrank-walk` crate.
//!
//! ## Example Usage
//!
//! ```rust
//! use rwrank::graph::{Edge, GraphStore};
//! use rwrank::{walk, RunConfig};
//!
//! // 0 -> 1 -> 2 -> 0
//! let store: GraphStore = vec![Edge::new(0u64, 1u64), Edge::new(1u64, 2u64), Edge::new(2u64, 0u64)]
//!     .into_iter()
//!     .collect();
//! let mut graph = store.finalize(2).unwrap();
//!
//! let config = RunConfig {
//!     rw_num: 300,
//!     max_wait: 3,
//!     workers: 2,
//!     ..RunConfig::default()
//! };
//! let report = walk(&mut graph, &config, 7).unwrap();
//!
//! assert_eq!(report.absorbed, 300);
//! assert_eq!(graph.total_pagerank(), 300);
//! ```

#![warn(clippy::all)]

pub mod bsp;
pub mod config;
pub mod error;
pub mod graph;
pub mod output;
pub mod run;

// Re-export main types for convenience
pub use bsp::{BusStats, Engine, EngineError, EngineOptions, EngineResult, RunReport, SuperstepStats};
pub use config::{ConfigError, ConfigResult, RunConfig};
pub use error::{RwRankError, RwRankResult};
pub use graph::{Edge, GraphError, GraphResult, GraphStore, PartitionedGraph, Partitioner, VertexId};
pub use run::{resolve_seed, run, walk, RunSummary};

pub use rwrank_walk::{RandomWalkProgram, RandomWalkSplitter, Signal, VertexState, WalkError, WalkParams};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
