//! Seedable random source for vertex invocations
//!
//! Each (vertex, super-step) pair gets its own generator derived from the run
//! seed, so outcomes depend only on the seed and never on how vertices are
//! spread over workers or in which order they run.

use rand::rngs::StdRng;
use rand::SeedableRng;

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// SplitMix64 finalizer
pub fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed for one vertex invocation
pub fn vertex_seed(run_seed: u64, vertex: u64, superstep: u32) -> u64 {
    let a = mix64(run_seed.wrapping_add(GOLDEN_GAMMA));
    let b = mix64(a ^ vertex.wrapping_mul(GOLDEN_GAMMA));
    mix64(b ^ u64::from(superstep).wrapping_add(GOLDEN_GAMMA))
}

/// Generator for `vertex` at `superstep`
pub fn vertex_rng(run_seed: u64, vertex: u64, superstep: u32) -> StdRng {
    StdRng::seed_from_u64(vertex_seed(run_seed, vertex, superstep))
}
