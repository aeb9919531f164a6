//! Run statistics record
//!
//! A single tab-separated line: summed worker compute seconds, bytes sent
//! between partitions, wall-clock seconds.

use crate::bsp::RunReport;
use std::fs;
use std::io;
use std::path::Path;

pub fn format_stats(report: &RunReport) -> String {
    format!(
        "{:.6}\t{}\t{:.6}\n",
        report.compute_time.as_secs_f64(),
        report.bus.bytes_sent,
        report.runtime.as_secs_f64()
    )
}

/// Write the statistics line to `path`, replacing any previous content.
pub fn write_stats(path: impl AsRef<Path>, report: &RunReport) -> io::Result<()> {
    fs::write(path, format_stats(report))
}
