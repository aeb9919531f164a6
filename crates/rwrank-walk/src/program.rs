//! Random-walk PageRank vertex program
//!
//! One invocation is a pure function of the vertex's state, the aggregated
//! signal it received, the super-step index, its out-edges and a random
//! source. It returns the new state and the walk-units to send.

use super::error::{WalkError, WalkResult};
use super::params::WalkParams;
use super::splitter::RandomWalkSplitter;
use rand::Rng;

/// Aggregated input of a vertex for one super-step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Signal {
    /// Compute the vertex's own starting allocation
    Start,
    /// Walk-units received from in-neighbours
    Walkers(u64),
}

/// Per-vertex counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexState {
    /// Walk-units absorbed so far; never decreases
    pub pagerank: u64,
    /// Walk-units held but not yet absorbed or forwarded
    pub pending: u64,
}

/// What happened to the pending units in one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing pending
    Idle,
    /// Units moved into `pagerank`
    Absorbed(u64),
    /// Units spread over the out-edges
    Scattered { held: u64, sent: u64 },
    /// Units kept: no out-edges and the absorb threshold is not reached yet
    Holding(u64),
}

impl Outcome {
    /// Units the vertex held after folding in its signal
    pub fn held(&self) -> u64 {
        match *self {
            Outcome::Idle => 0,
            Outcome::Absorbed(units) | Outcome::Holding(units) => units,
            Outcome::Scattered { held, .. } => held,
        }
    }
}

/// Result of one vertex invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexStep<T> {
    pub state: VertexState,
    pub outcome: Outcome,
    /// Non-empty sends, in out-edge order
    pub forwards: Vec<(T, u64)>,
}

/// The vertex program for one random-walk round
#[derive(Debug, Clone, Copy)]
pub struct RandomWalkProgram {
    params: WalkParams,
    splitter: RandomWalkSplitter,
}

impl RandomWalkProgram {
    pub fn new(params: WalkParams) -> WalkResult<Self> {
        let splitter = RandomWalkSplitter::new(params.activation_fraction)?;
        Ok(Self { params, splitter })
    }

    pub fn params(&self) -> &WalkParams {
        &self.params
    }

    pub fn splitter(&self) -> &RandomWalkSplitter {
        &self.splitter
    }

    /// Fold the incoming signal into the pending count.
    pub fn init<R: Rng + ?Sized>(
        &self,
        mut state: VertexState,
        signal: Signal,
        rng: &mut R,
    ) -> WalkResult<VertexState> {
        let incoming = match signal {
            Signal::Start => self.params.initial_allocation(rng),
            Signal::Walkers(units) => units,
        };
        state.pending = state.pending.checked_add(incoming).ok_or_else(|| {
            WalkError::CounterOverflow(format!(
                "pending {} + incoming {}",
                state.pending, incoming
            ))
        })?;
        Ok(state)
    }

    /// Absorb everything pending once the wait threshold is reached.
    pub fn apply(&self, mut state: VertexState, superstep: u32) -> WalkResult<(VertexState, Option<u64>)> {
        if !self.params.absorbs_at(superstep) || state.pending == 0 {
            return Ok((state, None));
        }
        let absorbed = state.pending;
        state.pagerank = state.pagerank.checked_add(absorbed).ok_or_else(|| {
            WalkError::CounterOverflow(format!(
                "pagerank {} + absorbed {}",
                state.pagerank, absorbed
            ))
        })?;
        state.pending = 0;
        Ok((state, Some(absorbed)))
    }

    /// Forward all pending units along the out-edges.
    ///
    /// Returns `None` when the vertex has nothing to send or nowhere to send it.
    pub fn scatter<T: Copy, R: Rng + ?Sized>(
        &self,
        state: &mut VertexState,
        out_edges: &[T],
        rng: &mut R,
    ) -> WalkResult<Option<Vec<(T, u64)>>> {
        if state.pending == 0 || out_edges.is_empty() {
            return Ok(None);
        }
        let counts = self.splitter.split(state.pending, out_edges.len(), rng)?;
        state.pending = 0;
        Ok(Some(
            out_edges
                .iter()
                .zip(counts)
                .filter(|&(_, units)| units > 0)
                .map(|(&target, units)| (target, units))
                .collect(),
        ))
    }

    /// Run init, apply and scatter for one vertex.
    pub fn compute<T: Copy, R: Rng + ?Sized>(
        &self,
        state: VertexState,
        signal: Signal,
        superstep: u32,
        out_edges: &[T],
        rng: &mut R,
    ) -> WalkResult<VertexStep<T>> {
        let state = self.init(state, signal, rng)?;
        let (mut state, absorbed) = self.apply(state, superstep)?;
        if let Some(units) = absorbed {
            return Ok(VertexStep {
                state,
                outcome: Outcome::Absorbed(units),
                forwards: Vec::new(),
            });
        }

        let held = state.pending;
        match self.scatter(&mut state, out_edges, rng)? {
            Some(forwards) => {
                let sent = forwards
                    .iter()
                    .try_fold(0u64, |acc, &(_, units)| acc.checked_add(units))
                    .ok_or_else(|| WalkError::CounterOverflow(format!("forwarded from {} held", held)))?;
                Ok(VertexStep {
                    state,
                    outcome: Outcome::Scattered { held, sent },
                    forwards,
                })
            }
            None => {
                let outcome = if held > 0 { Outcome::Holding(held) } else { Outcome::Idle };
                Ok(VertexStep {
                    state,
                    outcome,
                    forwards: Vec::new(),
                })
            }
        }
    }
}
