//! Synchronous super-step engine
//!
//! Each super-step runs the vertex program on every vertex that has a
//! pending signal, partition by partition on a dedicated worker pool. A
//! partition's vertices only read and write that partition's state and
//! buffer outgoing walk-units in the partition's own outbox. The join of all
//! partition tasks is the barrier: afterwards the message bus delivers the
//! buffered units and the super-step counter advances. The run ends when no
//! partition has anything pending, or when the optional step cap is hit.

use super::bus::{BusStats, MessageBus};
use super::error::{EngineError, EngineResult};
use super::message::{Outbox, Pending};
use crate::graph::{Partition, PartitionedGraph, Partitioner, RouteResult};
use rayon::prelude::*;
use rwrank_walk::{vertex_rng, Outcome, RandomWalkProgram, Signal, WalkParams};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Engine knobs that do not change the algorithm's semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Worker threads
    pub workers: usize,
    /// Run seed for every vertex random source
    pub seed: u64,
    /// Stop after this many super-steps even if messages remain
    pub max_supersteps: Option<u32>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            workers: 1,
            seed: 0,
            max_supersteps: None,
        }
    }
}

/// Per super-step counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperstepStats {
    pub superstep: u32,
    /// Vertices that ran the program
    pub active_vertices: u64,
    /// Units injected by start signals
    pub injected: u64,
    /// Units moved into `pagerank`
    pub absorbed: u64,
    /// Units put on out-edges
    pub forwarded: u64,
    /// Vertices that kept units for lack of out-edges
    pub holding_vertices: u64,
    pub bus: BusStats,
}

/// Summary of a finished run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub seed: u64,
    pub supersteps: u32,
    /// Whether the step cap ended the run with messages still pending
    pub capped: bool,
    pub injected: u64,
    pub absorbed: u64,
    /// Units still pending or in flight when the run ended
    pub stranded: u64,
    pub steps: Vec<SuperstepStats>,
    pub bus: BusStats,
    /// Summed busy time of all partition tasks
    pub compute_time: Duration,
    /// Wall-clock time of the run
    pub runtime: Duration,
}

/// What one partition produced in one super-step
struct WorkerOutput {
    outbox: Outbox,
    /// Dense indices of vertices that must run again next step
    holding: Vec<usize>,
    stats: SuperstepStats,
    compute_time: Duration,
}

/// Drives the random-walk vertex program over a partitioned graph
pub struct Engine<'g> {
    graph: &'g mut PartitionedGraph,
    program: RandomWalkProgram,
    options: EngineOptions,
    bus: MessageBus,
    pool: rayon::ThreadPool,
    pending: Vec<Pending>,
    superstep: u32,
}

impl<'g> Engine<'g> {
    /// Create an engine over `graph`; vertex counters are left as they are.
    pub fn new(graph: &'g mut PartitionedGraph, params: WalkParams, options: EngineOptions) -> EngineResult<Self> {
        let program = RandomWalkProgram::new(params)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.workers.max(1))
            .thread_name(|i| format!("rwrank-worker-{}", i))
            .build()?;
        let bus = MessageBus::new(*graph.partitioner());
        let pending = vec![Pending::default(); graph.partition_count()];

        Ok(Self {
            graph,
            program,
            options,
            bus,
            pool,
            pending,
            superstep: 0,
        })
    }

    pub fn params(&self) -> &WalkParams {
        self.program.params()
    }

    /// Index of the next super-step to run
    pub fn superstep(&self) -> u32 {
        self.superstep
    }

    /// Deliver `signal` to every vertex at the next super-step.
    pub fn signal_all(&mut self, signal: Signal) {
        self.pending.iter_mut().for_each(|p| *p = Pending::All(signal));
    }

    /// Whether any partition has work for the next super-step
    pub fn has_pending(&self) -> bool {
        self.pending.iter().any(|p| !p.is_empty())
    }

    /// Run super-steps until nothing is pending or the step cap is reached.
    pub fn start(&mut self) -> EngineResult<RunReport> {
        let started = Instant::now();
        let mut report = RunReport {
            seed: self.options.seed,
            ..RunReport::default()
        };

        info!(
            "Starting random-walk run: {} vertices, {} partitions, {} workers, seed {}",
            self.graph.vertex_count(),
            self.graph.partition_count(),
            self.options.workers,
            self.options.seed
        );

        while self.has_pending() {
            if let Some(cap) = self.options.max_supersteps {
                if report.supersteps >= cap {
                    warn!("Super-step cap {} reached with messages still pending", cap);
                    report.capped = true;
                    break;
                }
            }

            let stats = self.step(&mut report.compute_time)?;
            report.supersteps += 1;
            report.injected += stats.injected;
            report.absorbed += stats.absorbed;
            report.steps.push(stats);
        }

        report.bus = self.bus.stats();
        report.stranded = self.graph.total_pending()
            + self.pending.iter().map(Pending::units).sum::<u64>();
        report.runtime = started.elapsed();

        info!(
            "Finished random-walk run in {:?}: {} super-steps, {} units injected, {} absorbed, {} bytes exchanged",
            report.runtime, report.supersteps, report.injected, report.absorbed, report.bus.bytes_sent
        );
        Ok(report)
    }

    /// Run one super-step followed by the barrier exchange.
    fn step(&mut self, compute_time: &mut Duration) -> EngineResult<SuperstepStats> {
        let superstep = self.superstep;
        let pending = std::mem::take(&mut self.pending);
        let partitioner = *self.graph.partitioner();
        let program = &self.program;
        let seed = self.options.seed;

        let outputs = self.pool.install(|| {
            self.graph
                .partitions_mut()
                .par_iter_mut()
                .zip(pending.into_par_iter())
                .map(|(partition, pending)| {
                    run_partition(partition, pending, program, &partitioner, seed, superstep)
                })
                .collect::<EngineResult<Vec<WorkerOutput>>>()
        })?;

        // barrier: every partition has finished scatter
        let mut stats = SuperstepStats {
            superstep,
            ..SuperstepStats::default()
        };
        let mut outboxes = Vec::with_capacity(outputs.len());
        let mut holding = Vec::with_capacity(outputs.len());
        for output in outputs {
            stats.active_vertices += output.stats.active_vertices;
            stats.injected += output.stats.injected;
            stats.absorbed += output.stats.absorbed;
            stats.forwarded += output.stats.forwarded;
            stats.holding_vertices += output.stats.holding_vertices;
            *compute_time += output.compute_time;
            outboxes.push(output.outbox);
            holding.push(output.holding);
        }

        let graph = &*self.graph;
        let (inboxes, bus_stats) = self.pool.install(|| self.bus.exchange(outboxes, graph))?;
        stats.bus = bus_stats;

        self.pending = inboxes
            .into_iter()
            .zip(holding)
            .map(|(mut inbox, holding)| {
                for local in holding {
                    inbox.keep_active(local);
                }
                Pending::Messages(inbox)
            })
            .collect();
        self.superstep += 1;

        debug!(
            "Super-step {}: {} active, {} injected, {} absorbed, {} forwarded, {} messages",
            superstep,
            stats.active_vertices,
            stats.injected,
            stats.absorbed,
            stats.forwarded,
            stats.bus.messages_delivered
        );
        Ok(stats)
    }
}

/// Run the vertex program over one partition's pending vertices.
fn run_partition(
    partition: &mut Partition,
    pending: Pending,
    program: &RandomWalkProgram,
    partitioner: &Partitioner,
    seed: u64,
    superstep: u32,
) -> EngineResult<WorkerOutput> {
    let started = Instant::now();
    let mut output = WorkerOutput {
        outbox: Outbox::new(partition.index(), partitioner.partitions()),
        holding: Vec::new(),
        stats: SuperstepStats {
            superstep,
            ..SuperstepStats::default()
        },
        compute_time: Duration::ZERO,
    };

    match pending {
        Pending::All(signal) => {
            for local in 0..partition.len() {
                run_vertex(partition, local, signal, program, partitioner, seed, superstep, &mut output)?;
            }
        }
        Pending::Messages(inbox) => {
            for (local, units) in inbox.into_sorted() {
                let signal = Signal::Walkers(units);
                run_vertex(partition, local, signal, program, partitioner, seed, superstep, &mut output)?;
            }
        }
    }

    output.compute_time = started.elapsed();
    Ok(output)
}

#[allow(clippy::too_many_arguments)]
fn run_vertex(
    partition: &mut Partition,
    local: usize,
    signal: Signal,
    program: &RandomWalkProgram,
    partitioner: &Partitioner,
    seed: u64,
    superstep: u32,
    output: &mut WorkerOutput,
) -> EngineResult<()> {
    let vertex = partition.vertex_id(local);
    let prior = partition.state(local);
    let mut rng = vertex_rng(seed, vertex.as_u64(), superstep);

    let step = program
        .compute(prior, signal, superstep, partition.out_edges(local), &mut rng)
        .map_err(|source| EngineError::Vertex { vertex, source })?;
    partition.set_state(local, step.state);

    let stats = &mut output.stats;
    stats.active_vertices += 1;
    if signal == Signal::Start {
        stats.injected += step.outcome.held() - prior.pending;
    }
    match step.outcome {
        Outcome::Idle => {}
        Outcome::Absorbed(units) => stats.absorbed += units,
        Outcome::Scattered { sent, .. } => stats.forwarded += sent,
        Outcome::Holding(_) => {
            stats.holding_vertices += 1;
            output.holding.push(local);
        }
    }

    for (target, units) in step.forwards {
        let destination = match partitioner.route(partition.index(), target) {
            RouteResult::Local => partition.index(),
            RouteResult::Remote(owner) => owner,
        };
        output.outbox.send(destination, target, units)?;
    }
    Ok(())
}
