//! Engine error types

use crate::graph::{GraphError, VertexId};
use rwrank_walk::WalkError;
use thiserror::Error;

/// Errors that abort a run
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Vertex {vertex} failed: {source}")]
    Vertex {
        vertex: VertexId,
        #[source]
        source: WalkError,
    },

    #[error("Walk-unit count for {0} overflowed during message aggregation")]
    MessageOverflow(VertexId),

    #[error("Walk parameters rejected: {0}")]
    Walk(#[from] WalkError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type EngineResult<T> = Result<T, EngineError>;
