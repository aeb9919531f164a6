//! Error types for the walk-unit algorithms

use thiserror::Error;

/// Errors raised while computing a vertex step
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalkError {
    /// A forwarded or absorbed count does not fit in a `u64`
    #[error("walk-unit counter overflow: {0}")]
    CounterOverflow(String),

    /// Activation fraction outside (0, 1]
    #[error("activation fraction {0} is outside (0, 1]")]
    InvalidActivation(f64),

    /// Walk-unit target cannot be spread over an empty vertex set
    #[error("cannot derive start allocation for an empty graph")]
    EmptyGraph,
}

pub type WalkResult<T> = Result<T, WalkError>;
