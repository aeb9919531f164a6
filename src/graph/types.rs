//! Core type definitions for the walk graph

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable integer identifier of a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct VertexId(pub u64);

impl VertexId {
    pub fn new(id: u64) -> Self {
        VertexId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for VertexId {
    fn from(id: u64) -> Self {
        VertexId(id)
    }
}

/// Index of a partition (worker)
pub type PartitionId = usize;

/// Directed edge, `source -> target`; edges carry no payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: VertexId,
    pub target: VertexId,
}

impl Edge {
    pub fn new(source: impl Into<VertexId>, target: impl Into<VertexId>) -> Self {
        Edge {
            source: source.into(),
            target: target.into(),
        }
    }
}
