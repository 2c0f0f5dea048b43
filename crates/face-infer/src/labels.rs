use face_graph::FaceGraph;
use ndarray::Array2;
use tracing::{debug, instrument};

use crate::errors::InferenceError;
use crate::model::ScoringModel;
use crate::tensor::ChannelFirstGraph;

/// Index of the highest score in each row. Ties go to the lowest index.
pub fn argmax_labels(scores: &Array2<f32>) -> Vec<usize> {
    scores
        .outer_iter()
        .map(|row| {
            let mut best = 0;
            for (i, &s) in row.iter().enumerate() {
                if s > row[best] {
                    best = i;
                }
            }
            best
        })
        .collect()
}

/// Run `model` over `graph` and return one raw label per face.
#[instrument(skip(model, graph), fields(model = model.name(), nodes = graph.num_nodes))]
pub fn predict(model: &dyn ScoringModel, graph: &FaceGraph) -> Result<Vec<usize>, InferenceError> {
    let input = ChannelFirstGraph::from_graph(graph);
    let scores = model.score(&input)?;
    let expected = [graph.num_nodes, model.num_classes()];
    if scores.shape() != &expected[..] {
        return Err(InferenceError::ShapeMismatch {
            reason: format!("model returned scores {:?}, expected {:?}", scores.shape(), expected),
        });
    }
    let labels = argmax_labels(&scores);
    debug!(labels = labels.len(), "inference complete");
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn argmax_picks_first_maximum() {
        let scores = array![[0.1, 0.9, 0.0], [0.5, 0.5, 0.2], [-1.0, -3.0, -0.5]];
        assert_eq!(argmax_labels(&scores), vec![1, 0, 2]);
    }

    #[test]
    fn argmax_of_empty_scores_is_empty() {
        let scores = Array2::<f32>::zeros((0, 4));
        assert!(argmax_labels(&scores).is_empty());
    }
}
