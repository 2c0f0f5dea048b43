use std::path::PathBuf;

use label_engine::EngineError;

/// Errors while writing or reading label-session files.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FormatError {
    #[error("{0}")]
    Engine(#[from] EngineError),

    #[error("serialization failed: {0}")]
    Serialize(String),

    #[error("I/O error on {path:?}: {reason}")]
    Io { path: PathBuf, reason: String },
}

impl FormatError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: impl ToString) -> Self {
        FormatError::Io {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}
