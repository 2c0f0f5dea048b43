use std::path::PathBuf;

use face_graph::{BlobError, GraphError};
use face_infer::InferenceError;
use geom_sampler::SamplerError;
use seg_types::{InputKind, PipelineMode};

/// Errors from the segmentation pipeline and the label session.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("invalid mode: {reason}")]
    InvalidMode { reason: String },

    #[error("missing input: no {input} loaded")]
    MissingInput { input: InputKind },

    #[error("malformed label mapping: {reason}")]
    MalformedLabelFile { reason: String },

    #[error("invalid label on line {line}: {token:?}")]
    InvalidLabelToken { line: usize, token: String },

    #[error("shape mismatch: {reason}")]
    ShapeMismatch { reason: String },

    #[error("segmentation produced no labels")]
    EmptyResult,

    #[error("I/O failure on {path:?}: {reason}")]
    IoFailure { path: PathBuf, reason: String },

    #[error("label {label} outside taxonomy of size {size}")]
    OutOfRangeLabel { label: usize, size: usize },

    #[error("unsupported input file: {path:?}")]
    UnsupportedInput { path: PathBuf },

    #[error("sampler error: {0}")]
    Sampler(#[from] SamplerError),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("graph blob error: {0}")]
    GraphBlob(BlobError),

    #[error("model load failed for {path:?}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    #[error("inference failed: {reason}")]
    Inference { reason: String },

    #[error("a segmentation run is already in progress")]
    RunInProgress,

    #[error("no segmentation run is in progress")]
    NoRunInProgress,

    #[error("history index {index} out of range (history has {len} records)")]
    HistoryIndex { index: usize, len: usize },

    #[error("no segmentation result available")]
    NoResult,
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: impl ToString) -> Self {
        EngineError::IoFailure {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn not_batchable(mode: PipelineMode) -> Self {
        EngineError::InvalidMode {
            reason: format!("{} cannot run as a batch", mode),
        }
    }
}

impl From<InferenceError> for EngineError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::ShapeMismatch { reason } => EngineError::ShapeMismatch { reason },
            InferenceError::ModelLoad { path, reason } => EngineError::ModelLoad { path, reason },
            InferenceError::InvalidModel { reason } => EngineError::Inference { reason },
        }
    }
}

impl From<BlobError> for EngineError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::Io { path, reason } => EngineError::IoFailure { path, reason },
            BlobError::Inconsistent { reason } => EngineError::ShapeMismatch { reason },
            other => EngineError::GraphBlob(other),
        }
    }
}
