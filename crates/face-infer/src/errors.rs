use std::path::PathBuf;

/// Errors from loading or running a scoring model.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InferenceError {
    #[error("tensor shape mismatch: {reason}")]
    ShapeMismatch { reason: String },

    #[error("failed to load model from {path:?}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    #[error("invalid model: {reason}")]
    InvalidModel { reason: String },
}
