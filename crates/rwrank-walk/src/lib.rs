//! Walk-unit algorithms for random-walk PageRank
//!
//! Pure, framework-free pieces of one random-walk round: run parameters,
//! the stochastic splitter and the vertex program. No I/O and no threads;
//! the engine that drives super-steps lives in the `rwrank` crate.

pub mod error;
pub mod params;
pub mod program;
pub mod rng;
pub mod splitter;

pub use error::{WalkError, WalkResult};
pub use params::WalkParams;
pub use program::{Outcome, RandomWalkProgram, Signal, VertexState, VertexStep};
pub use rng::{vertex_rng, vertex_seed};
pub use splitter::{stochastic_round, zero_probability, RandomWalkSplitter};
