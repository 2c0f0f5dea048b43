//! MockModel: scripted scoring model for tests.

use ndarray::Array2;

use crate::errors::InferenceError;
use crate::model::ScoringModel;
use crate::tensor::ChannelFirstGraph;

/// Scores each node one-hot on a scripted label.
///
/// Node `i` gets label `labels[i % labels.len()]`, so a short script repeats
/// over larger graphs.
#[derive(Debug, Clone)]
pub struct MockModel {
    name: String,
    num_classes: usize,
    labels: Vec<usize>,
}

impl MockModel {
    pub fn new(name: impl Into<String>, num_classes: usize, labels: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            num_classes,
            labels,
        }
    }

    /// Model that labels every face 0.
    pub fn constant(num_classes: usize) -> Self {
        Self::new("constant", num_classes, vec![0])
    }
}

impl ScoringModel for MockModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn score(&self, graph: &ChannelFirstGraph) -> Result<Array2<f32>, InferenceError> {
        if self.labels.is_empty() {
            return Err(InferenceError::InvalidModel {
                reason: "mock model has no scripted labels".into(),
            });
        }
        let mut scores = Array2::zeros((graph.num_nodes, self.num_classes));
        for node in 0..graph.num_nodes {
            let label = self.labels[node % self.labels.len()];
            if label >= self.num_classes {
                return Err(InferenceError::ShapeMismatch {
                    reason: format!("scripted label {} outside {} classes", label, self.num_classes),
                });
            }
            scores[[node, label]] = 1.0;
        }
        Ok(scores)
    }
}
