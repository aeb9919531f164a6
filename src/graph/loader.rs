//! Edge-list ("tsv") graph loader
//!
//! One edge per line as `source<ws>target`. A line holding a single ID
//! declares an isolated vertex. Blank lines and lines starting with `#` or
//! `%` are ignored.

use super::store::{GraphError, GraphResult, GraphStore};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

/// Load an edge list from `path`
pub fn load_edge_list(path: impl AsRef<Path>) -> GraphResult<GraphStore> {
    let path = path.as_ref();
    info!("Loading edge list from {:?}", path);
    let file = File::open(path)?;
    let store = read_edge_list(BufReader::new(file))?;
    info!(
        "Loaded {} vertices and {} edges",
        store.vertex_count(),
        store.edge_count()
    );
    Ok(store)
}

/// Parse an edge list from any buffered reader
pub fn read_edge_list<R: BufRead>(reader: R) -> GraphResult<GraphStore> {
    let mut store = GraphStore::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('%') {
            continue;
        }

        let mut fields = trimmed.split_whitespace();
        let source = parse_id(fields.next(), line_no)?;
        match fields.next() {
            None => {
                store.add_vertex(source);
            }
            Some(target) => {
                let target = parse_id(Some(target), line_no)?;
                if let Some(extra) = fields.next() {
                    return Err(GraphError::Parse {
                        line: line_no,
                        message: format!("unexpected trailing field '{}'", extra),
                    });
                }
                store.add_edge(source, target);
            }
        }
    }

    Ok(store)
}

fn parse_id(field: Option<&str>, line: usize) -> GraphResult<u64> {
    let field = field.ok_or_else(|| GraphError::Parse {
        line,
        message: "missing vertex id".to_string(),
    })?;
    field.parse::<u64>().map_err(|e| GraphError::Parse {
        line,
        message: format!("invalid vertex id '{}': {}", field, e),
    })
}
