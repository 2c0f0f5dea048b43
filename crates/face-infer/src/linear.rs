use std::path::Path;

use face_graph::{EDGE_CHANNELS, FACE_CHANNELS};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::InferenceError;
use crate::model::ScoringModel;
use crate::tensor::ChannelFirstGraph;

pub const LINEAR_FORMAT_ID: &str = "face-seg-linear";
pub const LINEAR_FORMAT_VERSION: u32 = 1;

/// On-disk layout of a linear probe weights file.
#[derive(Debug, Serialize, Deserialize)]
struct LinearProbeFile {
    format: String,
    version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    face_weights: Vec<Vec<f32>>,
    #[serde(default)]
    edge_weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
}

/// Linear scoring model over pooled face and edge features.
///
/// Each face is summarized by the mean of its 7 face channels over the sample
/// grid and by the mean of the pooled features of its incident edges. Class
/// scores are `bias + face_weights · face + edge_weights · edge`. A probe
/// without edge weights ignores edge features entirely.
#[derive(Debug, Clone)]
pub struct LinearProbe {
    name: String,
    face_weights: Array2<f32>,
    edge_weights: Option<Array2<f32>>,
    bias: Array1<f32>,
}

impl LinearProbe {
    /// Build a probe from row-major weights, one row per class.
    pub fn new(
        name: impl Into<String>,
        face_weights: Vec<Vec<f32>>,
        edge_weights: Vec<Vec<f32>>,
        bias: Vec<f32>,
    ) -> Result<Self, InferenceError> {
        let classes = bias.len();
        if classes == 0 {
            return Err(InferenceError::InvalidModel {
                reason: "model has no output classes".into(),
            });
        }
        let face_weights = weight_matrix("face_weights", face_weights, classes, FACE_CHANNELS)?;
        let edge_weights = if edge_weights.is_empty() {
            None
        } else {
            Some(weight_matrix("edge_weights", edge_weights, classes, EDGE_CHANNELS)?)
        };
        Ok(Self {
            name: name.into(),
            face_weights,
            edge_weights,
            bias: Array1::from(bias),
        })
    }

    /// Parse a weights file body. `fallback_name` is used when the file has no name.
    pub fn from_json(fallback_name: &str, json: &str) -> Result<Self, InferenceError> {
        let file: LinearProbeFile =
            serde_json::from_str(json).map_err(|e| InferenceError::InvalidModel {
                reason: e.to_string(),
            })?;
        if file.format != LINEAR_FORMAT_ID {
            return Err(InferenceError::InvalidModel {
                reason: format!("unknown model format: {}", file.format),
            });
        }
        if file.version > LINEAR_FORMAT_VERSION {
            return Err(InferenceError::InvalidModel {
                reason: format!(
                    "model version {} is newer than supported version {}",
                    file.version, LINEAR_FORMAT_VERSION
                ),
            });
        }
        let name = file
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| fallback_name.to_string());
        Self::new(name, file.face_weights, file.edge_weights, file.bias)
    }

    /// Load a weights file. The model is named after the file stem unless the
    /// file names itself.
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let load_err = |reason: String| InferenceError::ModelLoad {
            path: path.to_path_buf(),
            reason,
        };
        let json = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let probe = Self::from_json(&stem, &json).map_err(|e| load_err(e.to_string()))?;
        info!(
            path = %path.display(),
            classes = probe.num_classes(),
            uses_edges = probe.edge_weights.is_some(),
            "linear probe loaded"
        );
        Ok(probe)
    }

    /// Serialize back to the weights file format.
    pub fn to_json(&self) -> Result<String, InferenceError> {
        let rows = |m: &Array2<f32>| m.outer_iter().map(|r| r.to_vec()).collect::<Vec<_>>();
        let file = LinearProbeFile {
            format: LINEAR_FORMAT_ID.to_string(),
            version: LINEAR_FORMAT_VERSION,
            name: Some(self.name.clone()),
            face_weights: rows(&self.face_weights),
            edge_weights: self.edge_weights.as_ref().map(rows).unwrap_or_default(),
            bias: self.bias.to_vec(),
        };
        serde_json::to_string_pretty(&file).map_err(|e| InferenceError::InvalidModel {
            reason: e.to_string(),
        })
    }

    /// Mean of each node's incident edge features, `(n, 6)`. Nodes without
    /// incident edges get zeros.
    fn pooled_edges(&self, graph: &ChannelFirstGraph) -> Result<Array2<f32>, InferenceError> {
        let n = graph.num_nodes;
        if graph.num_edge_features() != graph.edges.len() {
            return Err(InferenceError::ShapeMismatch {
                reason: format!(
                    "{} edge feature tensors for {} adjacency edges",
                    graph.num_edge_features(),
                    graph.edges.len()
                ),
            });
        }
        let mut sums = Array2::<f32>::zeros((n, EDGE_CHANNELS));
        let mut incident = vec![0u32; n];
        if graph.edges.is_empty() {
            return Ok(sums);
        }
        if graph.edge_channels() != EDGE_CHANNELS {
            return Err(InferenceError::ShapeMismatch {
                reason: format!(
                    "expected {} edge channels, found {}",
                    EDGE_CHANNELS,
                    graph.edge_channels()
                ),
            });
        }
        let pooled = graph
            .edge_features
            .mean_axis(Axis(2))
            .ok_or_else(|| InferenceError::ShapeMismatch {
                reason: "edge features have no curve samples".into(),
            })?;

        for (j, &[a, b]) in graph.edges.iter().enumerate() {
            if a >= n || b >= n {
                return Err(InferenceError::ShapeMismatch {
                    reason: format!("edge {} references a node outside 0..{}", j, n),
                });
            }
            let row = pooled.row(j);
            for node in [a, b] {
                let mut acc = sums.row_mut(node);
                acc += &row;
                incident[node] += 1;
            }
        }
        for (node, &count) in incident.iter().enumerate() {
            if count > 0 {
                let mut acc = sums.row_mut(node);
                acc /= count as f32;
            }
        }
        Ok(sums)
    }
}

fn weight_matrix(
    field: &str,
    rows: Vec<Vec<f32>>,
    classes: usize,
    channels: usize,
) -> Result<Array2<f32>, InferenceError> {
    if rows.len() != classes || rows.iter().any(|r| r.len() != channels) {
        return Err(InferenceError::InvalidModel {
            reason: format!("{} must be {}x{}", field, classes, channels),
        });
    }
    let flat: Vec<f32> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((classes, channels), flat).map_err(|e| InferenceError::InvalidModel {
        reason: e.to_string(),
    })
}

impl ScoringModel for LinearProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_classes(&self) -> usize {
        self.bias.len()
    }

    fn score(&self, graph: &ChannelFirstGraph) -> Result<Array2<f32>, InferenceError> {
        let shape = graph.node_features.shape();
        if shape[0] != graph.num_nodes || shape[1] != FACE_CHANNELS {
            return Err(InferenceError::ShapeMismatch {
                reason: format!(
                    "expected node tensor ({}, {}, u, v), found {:?}",
                    graph.num_nodes, FACE_CHANNELS, shape
                ),
            });
        }
        let no_grid = || InferenceError::ShapeMismatch {
            reason: "face features have an empty sample grid".into(),
        };
        let pooled_faces = graph
            .node_features
            .mean_axis(Axis(3))
            .ok_or_else(no_grid)?
            .mean_axis(Axis(2))
            .ok_or_else(no_grid)?;

        let mut scores = pooled_faces.dot(&self.face_weights.t()) + &self.bias;
        if let Some(edge_weights) = &self.edge_weights {
            let pooled_edges = self.pooled_edges(graph)?;
            scores += &pooled_edges.dot(&edge_weights.t());
        }
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array3, Array4};

    /// Two nodes, one edge, constant features per node.
    fn graph(edge_features: usize) -> ChannelFirstGraph {
        let mut node_features = Array4::zeros((2, FACE_CHANNELS, 2, 2));
        node_features.index_axis_mut(Axis(0), 0).fill(1.0);
        node_features.index_axis_mut(Axis(0), 1).fill(-1.0);
        ChannelFirstGraph {
            num_nodes: 2,
            edges: vec![[0, 1]],
            node_features,
            edge_features: Array3::from_elem((edge_features, EDGE_CHANNELS, 3), 2.0),
        }
    }

    fn sign_probe(edge_weights: Vec<Vec<f32>>) -> LinearProbe {
        LinearProbe::new(
            "sign",
            vec![vec![1.0; FACE_CHANNELS], vec![-1.0; FACE_CHANNELS]],
            edge_weights,
            vec![0.0, 0.5],
        )
        .unwrap()
    }

    #[test]
    fn face_only_scores() {
        let scores = sign_probe(vec![]).score(&graph(0)).unwrap();
        assert_eq!(scores.shape(), &[2, 2]);
        assert_relative_eq!(scores[[0, 0]], 7.0);
        assert_relative_eq!(scores[[0, 1]], -6.5);
        assert_relative_eq!(scores[[1, 0]], -7.0);
        assert_relative_eq!(scores[[1, 1]], 7.5);
    }

    #[test]
    fn edge_weights_add_incident_edge_means() {
        let probe = sign_probe(vec![vec![1.0; EDGE_CHANNELS], vec![0.0; EDGE_CHANNELS]]);
        let scores = probe.score(&graph(1)).unwrap();
        assert_relative_eq!(scores[[0, 0]], 7.0 + 12.0);
        assert_relative_eq!(scores[[1, 0]], -7.0 + 12.0);
    }

    #[test]
    fn truncated_edge_features_are_a_shape_mismatch() {
        let probe = sign_probe(vec![vec![1.0; EDGE_CHANNELS], vec![0.0; EDGE_CHANNELS]]);
        let err = probe.score(&graph(0)).unwrap_err();
        assert!(matches!(err, InferenceError::ShapeMismatch { .. }));
    }

    #[test]
    fn wrong_channel_count_is_a_shape_mismatch() {
        let mut g = graph(0);
        g.node_features = Array4::zeros((2, 3, 2, 2));
        let err = sign_probe(vec![]).score(&g).unwrap_err();
        assert!(matches!(err, InferenceError::ShapeMismatch { .. }));
    }

    #[test]
    fn rejects_ragged_weights() {
        let err = LinearProbe::new("bad", vec![vec![1.0; 3]], vec![], vec![0.0]).unwrap_err();
        assert!(matches!(err, InferenceError::InvalidModel { .. }));
    }

    #[test]
    fn json_round_trip_keeps_weights() {
        let probe = sign_probe(vec![]);
        let reloaded = LinearProbe::from_json("other", &probe.to_json().unwrap()).unwrap();
        assert_eq!(reloaded.name(), "sign");
        assert_eq!(reloaded.num_classes(), 2);
        assert_eq!(reloaded.face_weights, probe.face_weights);
        assert!(reloaded.edge_weights.is_none());
    }

    #[test]
    fn rejects_foreign_format() {
        let json = r#"{"format":"other","version":1,"face_weights":[],"bias":[]}"#;
        assert!(LinearProbe::from_json("m", json).is_err());
    }
}
