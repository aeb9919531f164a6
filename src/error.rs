//! Crate-level error type

use crate::bsp::EngineError;
use crate::config::ConfigError;
use crate::graph::GraphError;
use rwrank_walk::WalkError;
use thiserror::Error;

/// Any failure of a random-walk PageRank run
#[derive(Error, Debug)]
pub enum RwRankError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Walk error: {0}")]
    Walk(#[from] WalkError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RwRankResult<T> = Result<T, RwRankError>;
