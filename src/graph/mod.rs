//! Graph storage for random-walk PageRank
//!
//! - `GraphStore`: mutable builder filled by the loader
//! - `PartitionedGraph`: finalized topology split over owner partitions,
//!   carrying each vertex's walk counters
//! - `Partitioner`: vertex -> owner partition lookup

pub mod loader;
pub mod partition;
pub mod store;
pub mod types;

// Re-export main types
pub use loader::{load_edge_list, read_edge_list};
pub use partition::{Partition, PartitionedGraph, Partitioner, RouteResult};
pub use store::{GraphError, GraphResult, GraphStore};
pub use types::{Edge, PartitionId, VertexId};
