use face_graph::{FaceGraph, EDGE_CHANNELS, FACE_CHANNELS};
use ndarray::{Array3, Array4, Axis};

/// Graph tensors in the layout scoring models consume.
///
/// `node_features` is `(n, 7, u, v)` and `edge_features` is `(k, 6, u)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelFirstGraph {
    pub num_nodes: usize,
    pub edges: Vec<[usize; 2]>,
    pub node_features: Array4<f32>,
    pub edge_features: Array3<f32>,
}

impl ChannelFirstGraph {
    pub fn from_graph(graph: &FaceGraph) -> Self {
        Self::from(graph.clone())
    }

    pub fn node_channels(&self) -> usize {
        self.node_features.len_of(Axis(1))
    }

    pub fn edge_channels(&self) -> usize {
        self.edge_features.len_of(Axis(1))
    }

    pub fn num_edge_features(&self) -> usize {
        self.edge_features.len_of(Axis(0))
    }

    /// Whether the channel axes carry the expected face and edge channel counts.
    pub fn has_expected_channels(&self) -> bool {
        self.node_channels() == FACE_CHANNELS
            && (self.num_edge_features() == 0 || self.edge_channels() == EDGE_CHANNELS)
    }
}

impl From<FaceGraph> for ChannelFirstGraph {
    fn from(graph: FaceGraph) -> Self {
        Self {
            num_nodes: graph.num_nodes,
            edges: graph.edges,
            node_features: graph.node_features.permuted_axes([0, 3, 1, 2]),
            edge_features: graph.edge_features.permuted_axes([0, 2, 1]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_move_to_axis_one() {
        let mut node_features = Array4::zeros((2, 3, 4, FACE_CHANNELS));
        node_features[[1, 2, 3, 5]] = 9.0;
        let mut edge_features = Array3::zeros((1, 3, EDGE_CHANNELS));
        edge_features[[0, 2, 4]] = 7.0;
        let graph = FaceGraph {
            num_nodes: 2,
            edges: vec![[0, 1]],
            node_features,
            edge_features,
        };

        let cf = ChannelFirstGraph::from(graph);
        assert_eq!(cf.node_features.shape(), &[2, FACE_CHANNELS, 3, 4]);
        assert_eq!(cf.edge_features.shape(), &[1, EDGE_CHANNELS, 3]);
        assert_eq!(cf.node_features[[1, 5, 2, 3]], 9.0);
        assert_eq!(cf.edge_features[[0, 4, 2]], 7.0);
        assert!(cf.has_expected_channels());
    }
}
