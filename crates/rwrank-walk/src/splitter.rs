//! Stochastic splitting of walk-units across out-edges
//!
//! Walk-units are discrete, so a vertex cannot send "0.1 of a walker" down
//! every edge. Instead each edge independently decides how many whole units
//! it carries, with probabilities chosen so the expected total equals the
//! number of units the vertex holds.
//!
//! For `received` units, `n` out-edges and activation fraction `f`:
//!
//! - each edge-replica is active with probability `f`;
//! - `active_edges = f * n`;
//! - if `active_edges < 1`, an active edge carries `received / active_edges`
//!   units (stochastically rounded);
//! - otherwise an active edge is empty with probability
//!   `(1 - 1/active_edges)^received` (the chance that a bin stays empty when
//!   `received` balls are thrown into `active_edges` bins), and when not
//!   empty it carries the conditional mean
//!   `received / active_edges / (1 - zero_prob)` units.

use super::error::{WalkError, WalkResult};
use rand::Rng;

/// Probability that one of `active_edges` bins receives none of `received` balls
pub fn zero_probability(received: u64, active_edges: f64) -> f64 {
    (1.0 - 1.0 / active_edges).powf(received as f64)
}

/// Truncate `rate` toward zero and add one with probability equal to its
/// fractional part, so the result has expectation `rate`.
pub fn stochastic_round<R: Rng + ?Sized>(rate: f64, rng: &mut R) -> WalkResult<u64> {
    if !rate.is_finite() || rate < 0.0 || rate >= u64::MAX as f64 {
        return Err(WalkError::CounterOverflow(format!(
            "rate {} cannot be represented as a walk-unit count",
            rate
        )));
    }
    let whole = rate.trunc();
    let extra = rng.gen::<f64>() < rate - whole;
    (whole as u64)
        .checked_add(u64::from(extra))
        .ok_or_else(|| WalkError::CounterOverflow(format!("rate {}", rate)))
}

/// Splits a vertex's pending walk-units over its out-edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomWalkSplitter {
    activation_fraction: f64,
}

impl RandomWalkSplitter {
    /// Create a splitter; `activation_fraction` must lie in (0, 1].
    pub fn new(activation_fraction: f64) -> WalkResult<Self> {
        if !(activation_fraction > 0.0 && activation_fraction <= 1.0) {
            return Err(WalkError::InvalidActivation(activation_fraction));
        }
        Ok(Self { activation_fraction })
    }

    pub fn activation_fraction(&self) -> f64 {
        self.activation_fraction
    }

    /// Expected number of active out-edges
    pub fn active_edges(&self, num_out_edges: usize) -> f64 {
        self.activation_fraction * num_out_edges as f64
    }

    /// Units carried by one edge, given that its replica is active.
    pub fn units_for_active_edge<R: Rng + ?Sized>(
        &self,
        received: u64,
        num_out_edges: usize,
        rng: &mut R,
    ) -> WalkResult<u64> {
        let active_edges = self.active_edges(num_out_edges);

        if active_edges < 1.0 {
            return stochastic_round(received as f64 / active_edges, rng);
        }

        let zero_prob = zero_probability(received, active_edges);
        if rng.gen::<f64>() < zero_prob {
            return Ok(0);
        }
        // zero_prob < 1 here, otherwise the draw above always returns
        let rate = received as f64 / active_edges / (1.0 - zero_prob);
        stochastic_round(rate, rng)
    }

    /// Decide the forwarded count for every out-edge.
    ///
    /// Edges are decided independently and in order; the returned vector is
    /// aligned with the vertex's out-edges. Callers must not invoke this with
    /// `num_out_edges == 0` or `received == 0`.
    pub fn split<R: Rng + ?Sized>(
        &self,
        received: u64,
        num_out_edges: usize,
        rng: &mut R,
    ) -> WalkResult<Vec<u64>> {
        let mut forwarded = Vec::with_capacity(num_out_edges);
        for _ in 0..num_out_edges {
            // A fraction of exactly 1 draws nothing for activation
            let active = self.activation_fraction >= 1.0
                || rng.gen::<f64>() < self.activation_fraction;
            if active {
                forwarded.push(self.units_for_active_edge(received, num_out_edges, rng)?);
            } else {
                forwarded.push(0);
            }
        }
        Ok(forwarded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_zero_probability_formula() {
        let z = zero_probability(100, 10.0);
        assert!((z - 0.9f64.powi(100)).abs() < 1e-15);
        assert!((z - 0.0000266).abs() < 1e-6);

        // one active edge is never empty
        assert_eq!(zero_probability(5, 1.0), 0.0);
    }

    #[test]
    fn test_stochastic_round_exact_integer() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            assert_eq!(stochastic_round(3.0, &mut rng).unwrap(), 3);
        }
    }

    #[test]
    fn test_stochastic_round_mean() {
        let mut rng = StdRng::seed_from_u64(2);
        let trials = 200_000;
        let total: u64 = (0..trials)
            .map(|_| stochastic_round(2.25, &mut rng).unwrap())
            .sum();
        let mean = total as f64 / trials as f64;
        assert!((mean - 2.25).abs() < 0.01, "mean {}", mean);
    }

    #[test]
    fn test_stochastic_round_rejects_unrepresentable() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(stochastic_round(f64::INFINITY, &mut rng).is_err());
        assert!(stochastic_round(1e30, &mut rng).is_err());
        assert!(stochastic_round(f64::NAN, &mut rng).is_err());
    }

    #[test]
    fn test_single_edge_full_activation_is_deterministic() {
        let splitter = RandomWalkSplitter::new(1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        for received in 1..50 {
            assert_eq!(splitter.split(received, 1, &mut rng).unwrap(), vec![received]);
        }
    }

    #[test]
    fn test_low_activity_branch_preserves_mass() {
        // one edge, half the replicas active: active_edges = 0.5
        let splitter = RandomWalkSplitter::new(0.5).unwrap();
        assert_eq!(splitter.active_edges(1), 0.5);

        let mut rng = StdRng::seed_from_u64(5);
        let trials = 100_000;
        let mut total = 0u64;
        for _ in 0..trials {
            let sent = splitter.split(10, 1, &mut rng).unwrap();
            // when the edge is active it carries disproportionately more
            assert!(sent[0] == 0 || sent[0] == 20);
            total += sent[0];
        }
        let mean = total as f64 / trials as f64;
        assert!((mean - 10.0).abs() < 0.2, "mean forwarded {}", mean);
    }

    #[test]
    fn test_low_activity_fractional_rate() {
        // active_edges = 0.3 * 3 = 0.9, rate = 7 / 0.9 = 7.77..
        let splitter = RandomWalkSplitter::new(0.3).unwrap();
        let mut rng = StdRng::seed_from_u64(6);
        let trials = 100_000;
        let mut total = 0u64;
        for _ in 0..trials {
            let sent = splitter.split(7, 3, &mut rng).unwrap();
            for &units in &sent {
                assert!(units == 0 || units == 7 || units == 8);
            }
            total += sent.iter().sum::<u64>();
        }
        let mean = total as f64 / trials as f64;
        assert!((mean - 7.0).abs() < 0.15, "mean forwarded {}", mean);
    }

    #[test]
    fn test_high_activity_branch_preserves_mass() {
        let splitter = RandomWalkSplitter::new(1.0).unwrap();
        let received = 100;
        let edges = 10;

        // analytic expectation: P(non-empty) * conditional mean, per edge
        let z = zero_probability(received, splitter.active_edges(edges));
        let rate = received as f64 / 10.0 / (1.0 - z);
        let expected_total = edges as f64 * (1.0 - z) * rate;
        assert!((expected_total - 100.0).abs() < 1e-9);

        let mut rng = StdRng::seed_from_u64(7);
        let trials = 20_000;
        let mut total = 0u64;
        for _ in 0..trials {
            let sent = splitter.split(received, edges, &mut rng).unwrap();
            assert_eq!(sent.len(), edges);
            total += sent.iter().sum::<u64>();
        }
        let mean = total as f64 / trials as f64;
        assert!((mean - 100.0).abs() < 0.5, "mean forwarded {}", mean);
    }

    #[test]
    fn test_sparse_walkers_many_edges() {
        // 3 walkers over 50 edges: most edges are empty
        let splitter = RandomWalkSplitter::new(1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        let trials = 50_000;
        let mut total = 0u64;
        for _ in 0..trials {
            total += splitter.split(3, 50, &mut rng).unwrap().iter().sum::<u64>();
        }
        let mean = total as f64 / trials as f64;
        assert!((mean - 3.0).abs() < 0.1, "mean forwarded {}", mean);
    }

    #[test]
    fn test_rejects_invalid_fraction() {
        assert!(RandomWalkSplitter::new(0.0).is_err());
        assert!(RandomWalkSplitter::new(-0.5).is_err());
        assert!(RandomWalkSplitter::new(1.01).is_err());
        assert!(RandomWalkSplitter::new(1.0).is_ok());
    }
}
