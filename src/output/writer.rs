//! Score files
//!
//! One file per partition, named `<prefix>_<k>_of_<n>` with `k` counted from
//! 1. Each line is `id\tpagerank`, ascending by vertex ID. Edges are not
//! written.

use crate::graph::{Partition, PartitionedGraph};
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Path of partition `index`'s score file under `prefix`
pub fn partition_file_name(prefix: &Path, index: usize, partitions: usize) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(format!("_{}_of_{}", index + 1, partitions));
    PathBuf::from(name)
}

/// Write every partition's scores; returns the files written, in partition order.
pub fn write_scores(graph: &PartitionedGraph, prefix: impl AsRef<Path>) -> io::Result<Vec<PathBuf>> {
    let prefix = prefix.as_ref();
    let partitions = graph.partition_count();

    let mut written = Vec::with_capacity(partitions);
    for partition in graph.partitions() {
        let path = partition_file_name(prefix, partition.index(), partitions);
        let file = File::create(&path)?;
        write_partition(partition, BufWriter::new(file))?;
        debug!("Wrote {} scores to {:?}", partition.len(), path);
        written.push(path);
    }

    info!("Wrote scores for {} vertices to {} files", graph.vertex_count(), written.len());
    Ok(written)
}

fn write_partition<W: Write>(partition: &Partition, mut out: W) -> io::Result<()> {
    for (id, pagerank) in partition.scores() {
        writeln!(out, "{}\t{}", id.as_u64(), pagerank)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, GraphStore};
    use tempfile::TempDir;

    #[test]
    fn test_file_names() {
        let prefix = Path::new("/tmp/out/rank");
        assert_eq!(
            partition_file_name(prefix, 0, 4),
            PathBuf::from("/tmp/out/rank_1_of_4")
        );
        assert_eq!(
            partition_file_name(prefix, 3, 4),
            PathBuf::from("/tmp/out/rank_4_of_4")
        );
    }

    #[test]
    fn test_write_scores() {
        let store: GraphStore = (0..10u64).map(|i| Edge::new(i, (i + 3) % 10)).collect();
        let graph = store.finalize(3).unwrap();
        let dir = TempDir::new().unwrap();
        let prefix = dir.path().join("output");

        let files = write_scores(&graph, &prefix).unwrap();
        assert_eq!(files.len(), 3);

        let mut ids = Vec::new();
        for (k, path) in files.iter().enumerate() {
            assert_eq!(path, &partition_file_name(&prefix, k, 3));
            let text = std::fs::read_to_string(path).unwrap();
            let mut previous = None;
            for line in text.lines() {
                let (id, score) = line.split_once('\t').unwrap();
                let id: u64 = id.parse().unwrap();
                assert_eq!(score, "0");
                assert!(previous.map_or(true, |p| p < id));
                previous = Some(id);
                ids.push(id);
            }
        }
        ids.sort_unstable();
        assert_eq!(ids, (0..10).collect::<Vec<u64>>());
    }
}
