//! Result files
//!
//! - `writer`: per-partition `id\tpagerank` score files
//! - `stats`: the one-line run statistics record

pub mod stats;
pub mod writer;

pub use stats::{format_stats, write_stats};
pub use writer::{partition_file_name, write_scores};
