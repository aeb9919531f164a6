//! Message bus: delivery of buffered walk-units at the super-step barrier
//!
//! Workers never touch each other's inboxes. Each worker fills its own
//! [`Outbox`] during scatter; once every worker is done, [`MessageBus::exchange`]
//! regroups the buckets by destination partition, sums them per target and
//! resolves each target to its dense index in the owner partition.

use super::error::{EngineError, EngineResult};
use super::message::{Inbox, Outbox, MESSAGE_WIRE_BYTES};
use crate::graph::{GraphError, PartitionedGraph, Partitioner, VertexId};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use tracing::debug;

/// Message traffic counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusStats {
    /// Individual sends, before combining
    pub messages_sent: u64,
    /// Combined messages delivered to vertices
    pub messages_delivered: u64,
    /// Combined messages that crossed a partition boundary
    pub remote_messages: u64,
    /// Bytes that crossed a partition boundary
    pub bytes_sent: u64,
}

impl AddAssign for BusStats {
    fn add_assign(&mut self, other: Self) {
        self.messages_sent += other.messages_sent;
        self.messages_delivered += other.messages_delivered;
        self.remote_messages += other.remote_messages;
        self.bytes_sent += other.bytes_sent;
    }
}

/// Routes buffered messages to owner partitions
#[derive(Debug, Clone)]
pub struct MessageBus {
    partitioner: Partitioner,
    stats: BusStats,
}

impl MessageBus {
    pub fn new(partitioner: Partitioner) -> Self {
        Self {
            partitioner,
            stats: BusStats::default(),
        }
    }

    pub fn partitioner(&self) -> &Partitioner {
        &self.partitioner
    }

    /// Cumulative traffic since the bus was created
    pub fn stats(&self) -> BusStats {
        self.stats
    }

    /// Fresh outbox for partition `source`
    pub fn outbox(&self, source: usize) -> Outbox {
        Outbox::new(source, self.partitioner.partitions())
    }

    /// Merge all outboxes and produce one inbox per partition.
    ///
    /// Must be called once every worker has finished scatter for the current
    /// super-step. Returns the inboxes and the traffic of this exchange.
    pub fn exchange(
        &mut self,
        outboxes: Vec<Outbox>,
        graph: &PartitionedGraph,
    ) -> EngineResult<(Vec<Inbox>, BusStats)> {
        let partitions = self.partitioner.partitions();
        let mut step = BusStats::default();

        let mut by_destination: Vec<Vec<FxHashMap<VertexId, u64>>> = (0..partitions)
            .map(|_| Vec::with_capacity(outboxes.len()))
            .collect();

        for outbox in outboxes {
            step.messages_sent += outbox.sent();
            let source = outbox.source();
            for (destination, bucket) in outbox.into_buckets().into_iter().enumerate() {
                if bucket.is_empty() {
                    continue;
                }
                if destination != source {
                    step.remote_messages += bucket.len() as u64;
                }
                by_destination[destination].push(bucket);
            }
        }
        step.bytes_sent = step.remote_messages * MESSAGE_WIRE_BYTES;

        let inboxes = by_destination
            .into_par_iter()
            .enumerate()
            .map(|(destination, buckets)| -> EngineResult<Inbox> {
                let partition = graph.partition(destination);
                let mut inbox = Inbox::new();
                for bucket in buckets {
                    for (target, units) in bucket {
                        let local = partition
                            .local_index(target)
                            .ok_or(EngineError::Graph(GraphError::UnknownVertex(target)))?;
                        inbox.deliver(local, target, units)?;
                    }
                }
                Ok(inbox)
            })
            .collect::<EngineResult<Vec<Inbox>>>()?;

        step.messages_delivered = inboxes.iter().map(|inbox| inbox.len() as u64).sum();
        debug!(
            "Exchanged {} sends as {} messages ({} remote, {} bytes)",
            step.messages_sent, step.messages_delivered, step.remote_messages, step.bytes_sent
        );

        self.stats += step;
        Ok((inboxes, step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, GraphStore};

    fn graph(partitions: usize) -> PartitionedGraph {
        let store: GraphStore = (0..20u64).map(|i| Edge::new(i, (i + 1) % 20)).collect();
        store.finalize(partitions).unwrap()
    }

    #[test]
    fn test_exchange_sums_across_workers() {
        let graph = graph(3);
        let mut bus = MessageBus::new(*graph.partitioner());
        let target = VertexId(7);
        let owner = bus.partitioner().owner(target);

        let mut outboxes: Vec<Outbox> = (0..3).map(|p| bus.outbox(p)).collect();
        outboxes[0].send(owner, target, 2).unwrap();
        outboxes[1].send(owner, target, 3).unwrap();
        outboxes[2].send(owner, target, 5).unwrap();

        let (inboxes, step) = bus.exchange(outboxes, &graph).unwrap();
        let local = graph.partition(owner).local_index(target).unwrap();

        assert_eq!(inboxes[owner].get(local), Some(10));
        assert_eq!(inboxes.iter().map(Inbox::len).sum::<usize>(), 1);
        assert_eq!(step.messages_sent, 3);
        // three workers each delivered one combined message, two of them remote
        assert_eq!(step.remote_messages, 2);
        assert_eq!(step.bytes_sent, 2 * MESSAGE_WIRE_BYTES);
        assert_eq!(step.messages_delivered, 1);
        assert_eq!(bus.stats(), step);
    }

    #[test]
    fn test_exchange_unknown_target() {
        let graph = graph(2);
        let mut bus = MessageBus::new(*graph.partitioner());
        let stranger = VertexId(1_000);
        let mut outbox = bus.outbox(0);
        outbox.send(bus.partitioner().owner(stranger), stranger, 1).unwrap();

        let err = bus.exchange(vec![outbox], &graph).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Graph(GraphError::UnknownVertex(VertexId(1_000)))
        ));
    }

    #[test]
    fn test_empty_exchange() {
        let graph = graph(2);
        let mut bus = MessageBus::new(*graph.partitioner());
        let outboxes = vec![bus.outbox(0), bus.outbox(1)];
        let (inboxes, step) = bus.exchange(outboxes, &graph).unwrap();
        assert!(inboxes.iter().all(Inbox::is_empty));
        assert_eq!(step, BusStats::default());
    }
}
