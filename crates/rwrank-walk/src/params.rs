//! Run-wide walk parameters
//!
//! Built once from the target walk count and the vertex count, then shared
//! read-only by every vertex invocation.

use super::error::{WalkError, WalkResult};
use rand::Rng;

/// Immutable parameters of one random-walk round
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WalkParams {
    /// Base number of walk-units every vertex starts with
    pub num_of_rw_per_node_to_start: u64,
    /// Probability of one extra starting unit per vertex
    pub prob_to_start_rw: f64,
    /// Zero-based super-step from which pending units are absorbed
    pub max_wait_iter: u32,
    /// Fraction of out-edge replicas taking part in a scatter, in (0, 1]
    pub activation_fraction: f64,
}

impl WalkParams {
    /// Spread `rw_num` walk-units over `vertex_count` vertices.
    ///
    /// Every vertex gets `rw_num / vertex_count` units, plus one more with
    /// probability equal to the per-vertex remainder, so the expected total
    /// is exactly `rw_num`.
    pub fn from_target(
        rw_num: u64,
        vertex_count: u64,
        max_wait_iter: u32,
        activation_fraction: f64,
    ) -> WalkResult<Self> {
        if vertex_count == 0 {
            return Err(WalkError::EmptyGraph);
        }
        let params = Self {
            num_of_rw_per_node_to_start: rw_num / vertex_count,
            prob_to_start_rw: (rw_num % vertex_count) as f64 / vertex_count as f64,
            max_wait_iter,
            activation_fraction,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check the activation fraction; everything else is valid by construction.
    pub fn validate(&self) -> WalkResult<()> {
        if !(self.activation_fraction > 0.0 && self.activation_fraction <= 1.0) {
            return Err(WalkError::InvalidActivation(self.activation_fraction));
        }
        Ok(())
    }

    /// Starting allocation of one vertex: base plus a Bernoulli(`prob_to_start_rw`) unit.
    pub fn initial_allocation<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        let extra = rng.gen::<f64>() < self.prob_to_start_rw;
        self.num_of_rw_per_node_to_start + u64::from(extra)
    }

    /// Expected number of units injected over `vertex_count` vertices
    pub fn expected_total(&self, vertex_count: u64) -> f64 {
        (self.num_of_rw_per_node_to_start as f64 + self.prob_to_start_rw) * vertex_count as f64
    }

    /// Whether a vertex absorbs (instead of forwarding) at `superstep`
    pub fn absorbs_at(&self, superstep: u32) -> bool {
        superstep >= self.max_wait_iter
    }
}
