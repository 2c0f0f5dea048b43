use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::BlobError;
use crate::types::FaceGraph;

/// Current graph blob format version.
pub const FORMAT_VERSION: u32 = 1;

const FORMAT_ID: &str = "face-graph";

/// Top-level blob structure for serialization.
#[derive(Debug, Serialize)]
struct GraphBlob<'a> {
    format: &'a str,
    version: u32,
    graph: &'a FaceGraph,
}

/// Top-level blob structure for deserialization.
#[derive(Debug, Deserialize)]
struct GraphBlobRaw {
    format: String,
    version: u32,
    graph: FaceGraph,
}

/// Serialize a graph to a JSON blob.
pub fn save_graph(graph: &FaceGraph) -> Result<String, BlobError> {
    let blob = GraphBlob {
        format: FORMAT_ID,
        version: FORMAT_VERSION,
        graph,
    };
    serde_json::to_string(&blob).map_err(|e| BlobError::ParseError(e.to_string()))
}

/// Deserialize a graph blob.
///
/// Validates the format identifier, the version, and the tensor shapes.
pub fn load_graph(json: &str) -> Result<FaceGraph, BlobError> {
    let raw: GraphBlobRaw =
        serde_json::from_str(json).map_err(|e| BlobError::ParseError(e.to_string()))?;

    if raw.format != FORMAT_ID {
        return Err(BlobError::UnknownFormat(raw.format));
    }

    if raw.version > FORMAT_VERSION {
        return Err(BlobError::FutureVersion {
            file_version: raw.version,
            supported_version: FORMAT_VERSION,
        });
    }

    let graph = if raw.version < FORMAT_VERSION {
        migrate(raw.graph, raw.version, FORMAT_VERSION)?
    } else {
        raw.graph
    };

    graph
        .validate()
        .map_err(|reason| BlobError::Inconsistent { reason })?;
    Ok(graph)
}

/// Write a graph blob to disk.
pub fn write_graph_file(path: &Path, graph: &FaceGraph) -> Result<(), BlobError> {
    let json = save_graph(graph)?;
    std::fs::write(path, json).map_err(|e| BlobError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    info!(path = %path.display(), nodes = graph.num_nodes, "graph blob written");
    Ok(())
}

/// Read a graph blob from disk.
pub fn read_graph_file(path: &Path) -> Result<FaceGraph, BlobError> {
    let json = std::fs::read_to_string(path).map_err(|e| BlobError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    load_graph(&json)
}

/// Apply format migrations from `from_version` to `to_version`.
///
/// Version 1 is the only version, so every migration request is an error.
fn migrate(graph: FaceGraph, from_version: u32, to_version: u32) -> Result<FaceGraph, BlobError> {
    if from_version != to_version {
        return Err(BlobError::MigrationFailed {
            from: from_version,
            to: to_version,
            reason: format!("no migration path from v{} to v{}", from_version, to_version),
        });
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, Array4};

    fn tiny_graph() -> FaceGraph {
        FaceGraph {
            num_nodes: 2,
            edges: vec![[0, 1]],
            node_features: Array4::zeros((2, 2, 2, 7)),
            edge_features: Array3::zeros((1, 2, 6)),
        }
    }

    #[test]
    fn rejects_foreign_format() {
        let json = save_graph(&tiny_graph()).unwrap().replace("face-graph", "other");
        assert!(matches!(load_graph(&json), Err(BlobError::UnknownFormat(f)) if f == "other"));
    }

    #[test]
    fn rejects_future_version() {
        let json = save_graph(&tiny_graph())
            .unwrap()
            .replace("\"version\":1", "\"version\":99");
        assert!(matches!(
            load_graph(&json),
            Err(BlobError::FutureVersion {
                file_version: 99,
                ..
            })
        ));
    }

    #[test]
    fn rejects_dangling_edge() {
        let mut graph = tiny_graph();
        graph.edges.push([0, 5]);
        let json = save_graph(&graph).unwrap();
        assert!(matches!(load_graph(&json), Err(BlobError::Inconsistent { .. })));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(load_graph("not json"), Err(BlobError::ParseError(_))));
    }
}
