//! Mutable graph builder
//!
//! Vertices and edges are collected here while the graph is loaded. A
//! one-time [`GraphStore::finalize`] freezes the topology and splits it over
//! owner partitions; after that only per-vertex walk counters change.

use super::partition::{Partition, PartitionedGraph, Partitioner};
use super::types::{Edge, VertexId};
use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while building or addressing the graph
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Vertex {0} not found")]
    UnknownVertex(VertexId),

    #[error("Cannot finalize a graph with no vertices")]
    Empty,

    #[error("Malformed edge list at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// In-memory graph under construction
///
/// Vertices keep their insertion order, and each vertex's out-edges keep the
/// order they were added in, so a finalized graph is identical from run to
/// run for the same input.
#[derive(Debug, Default, Clone)]
pub struct GraphStore {
    /// Vertex -> out-edge targets (adjacency list)
    adjacency: IndexMap<VertexId, Vec<VertexId>>,

    /// Total number of edges
    edge_count: usize,
}

impl GraphStore {
    /// Create a new empty graph store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex; adding an existing vertex is a no-op.
    /// Returns true if the vertex is new.
    pub fn add_vertex(&mut self, id: impl Into<VertexId>) -> bool {
        let id = id.into();
        if self.adjacency.contains_key(&id) {
            return false;
        }
        self.adjacency.insert(id, Vec::new());
        true
    }

    /// Add a directed edge, creating both endpoints as needed.
    /// Parallel edges and self-loops are kept.
    pub fn add_edge(&mut self, source: impl Into<VertexId>, target: impl Into<VertexId>) {
        let source = source.into();
        let target = target.into();
        self.adjacency.entry(source).or_default().push(target);
        self.add_vertex(target);
        self.edge_count += 1;
    }

    pub fn insert_edge(&mut self, edge: Edge) {
        self.add_edge(edge.source, edge.target);
    }

    /// All vertices, in the order they were first seen
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn contains(&self, id: VertexId) -> bool {
        self.adjacency.contains_key(&id)
    }

    /// Out-edge targets of `id`
    pub fn out_edges(&self, id: VertexId) -> GraphResult<&[VertexId]> {
        self.adjacency
            .get(&id)
            .map(Vec::as_slice)
            .ok_or(GraphError::UnknownVertex(id))
    }

    /// Iterate all edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.adjacency.iter().flat_map(|(&source, targets)| {
            targets.iter().map(move |&target| Edge { source, target })
        })
    }

    /// Freeze the topology and split it over `partitions` owner partitions.
    pub fn finalize(self, partitions: usize) -> GraphResult<PartitionedGraph> {
        if self.adjacency.is_empty() {
            return Err(GraphError::Empty);
        }

        let partitioner = Partitioner::new(partitions);
        let mut buckets: Vec<Vec<(VertexId, Vec<VertexId>)>> =
            (0..partitioner.partitions()).map(|_| Vec::new()).collect();

        for (id, targets) in self.adjacency {
            buckets[partitioner.owner(id)].push((id, targets));
        }

        let parts: Vec<Partition> = buckets
            .into_iter()
            .enumerate()
            .map(|(index, adjacency)| {
                debug!("Partition {} owns {} vertices", index, adjacency.len());
                Partition::from_adjacency(index, adjacency)
            })
            .collect();

        let graph = PartitionedGraph::new(partitioner, parts);
        info!(
            "Finalized graph: {} vertices, {} edges over {} partitions",
            graph.vertex_count(),
            graph.edge_count(),
            graph.partition_count()
        );
        Ok(graph)
    }
}

impl FromIterator<Edge> for GraphStore {
    fn from_iter<I: IntoIterator<Item = Edge>>(iter: I) -> Self {
        let mut store = GraphStore::new();
        for edge in iter {
            store.insert_edge(edge);
        }
        store
    }
}
