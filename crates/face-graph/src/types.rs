use ndarray::{Array3, Array4, Axis};
use serde::{Deserialize, Serialize};

/// Channels per face sample: point (3) + normal (3) + visibility mask (1).
pub const FACE_CHANNELS: usize = 7;

/// Channels per edge sample: point (3) + tangent (3).
pub const EDGE_CHANNELS: usize = 6;

/// Face-adjacency graph with sampled feature tensors, channel-last.
///
/// `node_features` has shape `(num_nodes, u, v, 7)` in face traversal order.
/// `edge_features` has shape `(k, u, 6)` where `k` counts only the adjacency
/// edges that had a parametric curve, in adjacency order. `k` can be smaller
/// than `edges.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceGraph {
    pub num_nodes: usize,
    /// Adjacency edges as `[source, target]` node indices.
    pub edges: Vec<[usize; 2]>,
    pub node_features: Array4<f32>,
    pub edge_features: Array3<f32>,
}

impl FaceGraph {
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of edges that carry a feature tensor.
    pub fn num_edge_features(&self) -> usize {
        self.edge_features.len_of(Axis(0))
    }

    /// Whether every adjacency edge has a feature tensor.
    pub fn has_complete_edge_features(&self) -> bool {
        self.num_edge_features() == self.num_edges()
    }

    /// Structural checks shared by the builder and the blob loader.
    pub fn validate(&self) -> Result<(), String> {
        let shape = self.node_features.shape();
        if shape[0] != self.num_nodes {
            return Err(format!(
                "{} node feature tensors for {} nodes",
                shape[0], self.num_nodes
            ));
        }
        if shape[3] != FACE_CHANNELS {
            return Err(format!(
                "face features have {} channels, expected {}",
                shape[3], FACE_CHANNELS
            ));
        }
        let edge_shape = self.edge_features.shape();
        if edge_shape[2] != EDGE_CHANNELS {
            return Err(format!(
                "edge features have {} channels, expected {}",
                edge_shape[2], EDGE_CHANNELS
            ));
        }
        if self.num_edge_features() > self.num_edges() {
            return Err(format!(
                "{} edge feature tensors for {} edges",
                self.num_edge_features(),
                self.num_edges()
            ));
        }
        if let Some(bad) = self
            .edges
            .iter()
            .find(|[s, t]| *s >= self.num_nodes || *t >= self.num_nodes)
        {
            return Err(format!(
                "edge {:?} references a node outside 0..{}",
                bad, self.num_nodes
            ));
        }
        Ok(())
    }
}
