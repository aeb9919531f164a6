//! Walk-unit messages and per-worker mailboxes
//!
//! Messages are plain walk-unit counts addressed to a vertex. Sends to the
//! same target within a super-step are summed as they are buffered, which
//! is valid because summation is commutative and associative.

use super::error::{EngineError, EngineResult};
use crate::graph::{PartitionId, VertexId};
use rustc_hash::FxHashMap;
use rwrank_walk::Signal;

/// Size of one message on the wire: 8-byte vertex id + 8-byte count
pub const MESSAGE_WIRE_BYTES: u64 = 16;

/// Outgoing messages buffered by one worker during scatter
#[derive(Debug)]
pub struct Outbox {
    /// Partition that produced these messages
    source: PartitionId,
    /// One combined bucket per destination partition
    buckets: Vec<FxHashMap<VertexId, u64>>,
    /// Sends before combining
    sent: u64,
}

impl Outbox {
    pub fn new(source: PartitionId, partitions: usize) -> Self {
        Self {
            source,
            buckets: (0..partitions).map(|_| FxHashMap::default()).collect(),
            sent: 0,
        }
    }

    pub fn source(&self) -> PartitionId {
        self.source
    }

    /// Buffer `units` for `target`, owned by partition `owner`.
    /// Zero-unit sends are dropped.
    pub fn send(&mut self, owner: PartitionId, target: VertexId, units: u64) -> EngineResult<()> {
        if units == 0 {
            return Ok(());
        }
        let slot = self.buckets[owner].entry(target).or_insert(0);
        *slot = slot
            .checked_add(units)
            .ok_or(EngineError::MessageOverflow(target))?;
        self.sent += 1;
        Ok(())
    }

    /// Sends before combining
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Distinct targets across all buckets
    pub fn combined_len(&self) -> usize {
        self.buckets.iter().map(FxHashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(FxHashMap::is_empty)
    }

    pub(crate) fn into_buckets(self) -> Vec<FxHashMap<VertexId, u64>> {
        self.buckets
    }
}

/// Aggregated messages delivered to one partition, keyed by dense vertex index
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Inbox {
    messages: FxHashMap<usize, u64>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `units` for the vertex at dense index `local`
    pub fn deliver(&mut self, local: usize, vertex: VertexId, units: u64) -> EngineResult<()> {
        let slot = self.messages.entry(local).or_insert(0);
        *slot = slot
            .checked_add(units)
            .ok_or(EngineError::MessageOverflow(vertex))?;
        Ok(())
    }

    /// Keep a vertex scheduled for the next super-step without adding units
    pub fn keep_active(&mut self, local: usize) {
        self.messages.entry(local).or_insert(0);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Total walk-units waiting in this inbox
    pub fn units(&self) -> u64 {
        self.messages
            .values()
            .fold(0u64, |acc, &units| acc.saturating_add(units))
    }

    pub fn get(&self, local: usize) -> Option<u64> {
        self.messages.get(&local).copied()
    }

    /// Drain in ascending vertex order
    pub fn into_sorted(self) -> Vec<(usize, u64)> {
        let mut messages: Vec<_> = self.messages.into_iter().collect();
        messages.sort_unstable_by_key(|&(local, _)| local);
        messages
    }
}

/// What a partition runs in the next super-step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    /// Every owned vertex receives the same signal
    All(Signal),
    /// Only vertices with delivered messages run
    Messages(Inbox),
}

impl Pending {
    pub fn is_empty(&self) -> bool {
        match self {
            Pending::All(_) => false,
            Pending::Messages(inbox) => inbox.is_empty(),
        }
    }

    /// Walk-units carried by pending messages (a broadcast signal carries none)
    pub fn units(&self) -> u64 {
        match self {
            Pending::All(_) => 0,
            Pending::Messages(inbox) => inbox.units(),
        }
    }
}

impl Default for Pending {
    fn default() -> Self {
        Pending::Messages(Inbox::new())
    }
}
