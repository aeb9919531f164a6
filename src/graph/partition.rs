//! Partition ownership and per-partition vertex storage
//!
//! Every vertex has exactly one owner partition. A partition stores its
//! owned vertices densely (index 0..len) with their out-edges in Compressed
//! Sparse Row form. Out-edges pointing at vertices owned elsewhere are plain
//! `VertexId` references resolved through the [`Partitioner`].

use super::types::{PartitionId, VertexId};
use rustc_hash::FxHashMap;
use rwrank_walk::rng::mix64;
use rwrank_walk::VertexState;

/// Result of an ownership lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteResult {
    /// Vertex is owned by the asking partition
    Local,
    /// Vertex is owned by another partition
    Remote(PartitionId),
}

/// Maps vertex IDs to their owner partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partitioner {
    partitions: usize,
}

impl Partitioner {
    /// Create a partitioner over `partitions` workers (at least one)
    pub fn new(partitions: usize) -> Self {
        Self {
            partitions: partitions.max(1),
        }
    }

    pub fn partitions(&self) -> usize {
        self.partitions
    }

    /// Owner partition of `vertex`; fixed for a given partition count
    pub fn owner(&self, vertex: VertexId) -> PartitionId {
        (mix64(vertex.as_u64()) % self.partitions as u64) as PartitionId
    }

    /// Determine where a message for `vertex` sent from `from` must go
    pub fn route(&self, from: PartitionId, vertex: VertexId) -> RouteResult {
        let owner = self.owner(vertex);
        if owner == from {
            RouteResult::Local
        } else {
            RouteResult::Remote(owner)
        }
    }
}

/// The vertices owned by one worker, plus their per-run state
#[derive(Debug, Clone)]
pub struct Partition {
    /// Index of this partition
    index: PartitionId,
    /// Mapping from dense index back to VertexId, ascending
    vertex_ids: Vec<VertexId>,
    /// Mapping from VertexId to dense index
    local_index: FxHashMap<VertexId, usize>,
    /// Offsets into `out_targets`. Size = len + 1
    out_offsets: Vec<usize>,
    /// Contiguous out-edge targets, in load order per vertex
    out_targets: Vec<VertexId>,
    /// Walk-unit counters, aligned with `vertex_ids`
    states: Vec<VertexState>,
}

impl Partition {
    /// Build from `(vertex, out-edges)` pairs; vertices are stored sorted by ID.
    pub(crate) fn from_adjacency(index: PartitionId, mut adjacency: Vec<(VertexId, Vec<VertexId>)>) -> Self {
        adjacency.sort_by_key(|(id, _)| *id);

        let len = adjacency.len();
        let mut vertex_ids = Vec::with_capacity(len);
        let mut local_index = FxHashMap::default();
        local_index.reserve(len);
        let mut out_offsets = Vec::with_capacity(len + 1);
        let mut out_targets = Vec::new();

        out_offsets.push(0);
        for (idx, (id, targets)) in adjacency.into_iter().enumerate() {
            vertex_ids.push(id);
            local_index.insert(id, idx);
            out_targets.extend(targets);
            out_offsets.push(out_targets.len());
        }

        Partition {
            index,
            vertex_ids,
            local_index,
            out_offsets,
            out_targets,
            states: vec![VertexState::default(); len],
        }
    }

    pub fn index(&self) -> PartitionId {
        self.index
    }

    /// Number of owned vertices
    pub fn len(&self) -> usize {
        self.vertex_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_ids.is_empty()
    }

    /// Number of out-edges stored here
    pub fn edge_count(&self) -> usize {
        self.out_targets.len()
    }

    pub fn vertex_id(&self, local: usize) -> VertexId {
        self.vertex_ids[local]
    }

    pub fn vertex_ids(&self) -> &[VertexId] {
        &self.vertex_ids
    }

    /// Dense index of `vertex` if this partition owns it
    pub fn local_index(&self, vertex: VertexId) -> Option<usize> {
        self.local_index.get(&vertex).copied()
    }

    /// Out-degree of a vertex (by dense index)
    pub fn out_degree(&self, local: usize) -> usize {
        self.out_offsets[local + 1] - self.out_offsets[local]
    }

    /// Out-edge targets of a vertex (by dense index)
    pub fn out_edges(&self, local: usize) -> &[VertexId] {
        &self.out_targets[self.out_offsets[local]..self.out_offsets[local + 1]]
    }

    pub fn state(&self, local: usize) -> VertexState {
        self.states[local]
    }

    pub fn set_state(&mut self, local: usize, state: VertexState) {
        self.states[local] = state;
    }

    pub fn states(&self) -> &[VertexState] {
        &self.states
    }

    /// Zero every counter, keeping the topology
    pub fn reset_states(&mut self) {
        self.states.iter_mut().for_each(|s| *s = VertexState::default());
    }

    /// `(vertex, pagerank)` for every owned vertex, ascending by ID
    pub fn scores(&self) -> impl Iterator<Item = (VertexId, u64)> + '_ {
        self.vertex_ids
            .iter()
            .zip(&self.states)
            .map(|(&id, state)| (id, state.pagerank))
    }
}

/// A finalized graph: immutable topology split over owner partitions
#[derive(Debug, Clone)]
pub struct PartitionedGraph {
    partitioner: Partitioner,
    partitions: Vec<Partition>,
    vertex_count: usize,
    edge_count: usize,
}

impl PartitionedGraph {
    pub(crate) fn new(partitioner: Partitioner, partitions: Vec<Partition>) -> Self {
        let vertex_count = partitions.iter().map(Partition::len).sum();
        let edge_count = partitions.iter().map(Partition::edge_count).sum();
        Self {
            partitioner,
            partitions,
            vertex_count,
            edge_count,
        }
    }

    pub fn partitioner(&self) -> &Partitioner {
        &self.partitioner
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    pub fn partition(&self, index: PartitionId) -> &Partition {
        &self.partitions[index]
    }

    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    pub fn partitions_mut(&mut self) -> &mut [Partition] {
        &mut self.partitions
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Whether `vertex` exists anywhere in the graph
    pub fn contains(&self, vertex: VertexId) -> bool {
        self.partitions[self.partitioner.owner(vertex)]
            .local_index(vertex)
            .is_some()
    }

    /// Current state of `vertex`, looked up through its owner
    pub fn state(&self, vertex: VertexId) -> Option<VertexState> {
        let partition = &self.partitions[self.partitioner.owner(vertex)];
        partition.local_index(vertex).map(|local| partition.state(local))
    }

    /// Out-edges of `vertex`, looked up through its owner
    pub fn out_edges(&self, vertex: VertexId) -> Option<&[VertexId]> {
        let partition = &self.partitions[self.partitioner.owner(vertex)];
        partition.local_index(vertex).map(|local| partition.out_edges(local))
    }

    /// `(vertex, pagerank)` for all vertices, ascending by ID
    pub fn scores(&self) -> Vec<(VertexId, u64)> {
        let mut scores: Vec<_> = self.partitions.iter().flat_map(Partition::scores).collect();
        scores.sort_unstable_by_key(|(id, _)| *id);
        scores
    }

    /// Sum of all absorbed walk-units
    pub fn total_pagerank(&self) -> u64 {
        self.partitions
            .iter()
            .flat_map(|p| p.states())
            .map(|s| s.pagerank)
            .sum()
    }

    /// Sum of all walk-units still held without being absorbed
    pub fn total_pending(&self) -> u64 {
        self.partitions
            .iter()
            .flat_map(|p| p.states())
            .map(|s| s.pending)
            .sum()
    }

    /// Zero every vertex's counters so the graph can be walked again
    pub fn reset_states(&mut self) {
        self.partitions.iter_mut().for_each(Partition::reset_states);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_routing() {
        let partitioner = Partitioner::new(4);
        let vertex = VertexId(17);
        let owner = partitioner.owner(vertex);
        assert_eq!(partitioner.route(owner, vertex), RouteResult::Local);
    }

    #[test]
    fn test_remote_routing() {
        let partitioner = Partitioner::new(4);
        let vertex = VertexId(17);
        let owner = partitioner.owner(vertex);
        let other = (owner + 1) % 4;
        assert_eq!(partitioner.route(other, vertex), RouteResult::Remote(owner));
    }

    #[test]
    fn test_single_partition_owns_everything() {
        let partitioner = Partitioner::new(1);
        for id in 0..100 {
            assert_eq!(partitioner.owner(VertexId(id)), 0);
        }
        // zero is clamped to one partition
        assert_eq!(Partitioner::new(0).partitions(), 1);
    }

    #[test]
    fn test_owner_spreads_vertices() {
        let partitioner = Partitioner::new(4);
        let mut counts = [0usize; 4];
        for id in 0..4000 {
            counts[partitioner.owner(VertexId(id))] += 1;
        }
        for count in counts {
            assert!(count > 800, "unbalanced partitions: {:?}", counts);
        }
    }

    #[test]
    fn test_partition_csr() {
        let partition = Partition::from_adjacency(
            0,
            vec![
                (VertexId(5), vec![VertexId(1)]),
                (VertexId(2), vec![VertexId(5), VertexId(7), VertexId(1)]),
                (VertexId(9), vec![]),
            ],
        );
        assert_eq!(partition.len(), 3);
        assert_eq!(partition.edge_count(), 4);
        assert_eq!(partition.vertex_ids(), &[VertexId(2), VertexId(5), VertexId(9)]);

        let local = partition.local_index(VertexId(2)).unwrap();
        assert_eq!(local, 0);
        // load order of out-edges is kept
        assert_eq!(partition.out_edges(local), &[VertexId(5), VertexId(7), VertexId(1)]);
        assert_eq!(partition.out_degree(2), 0);
        assert!(partition.local_index(VertexId(3)).is_none());
    }
}
