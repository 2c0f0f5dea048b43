use ndarray::Array2;

use crate::errors::InferenceError;
use crate::tensor::ChannelFirstGraph;

/// A pretrained per-face scoring model.
///
/// The number of output classes is fixed when the model is loaded and does not
/// depend on the taxonomy. Implementations must be deterministic and must not
/// mutate state across calls.
pub trait ScoringModel: Send + Sync {
    /// Display name, usually the model file stem.
    fn name(&self) -> &str;

    fn num_classes(&self) -> usize;

    /// Score every node. Returns a `(num_nodes, num_classes)` matrix.
    fn score(&self, graph: &ChannelFirstGraph) -> Result<Array2<f32>, InferenceError>;
}
