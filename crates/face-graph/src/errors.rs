use std::path::PathBuf;

use geom_sampler::SamplerError;

/// Errors during face graph construction.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GraphError {
    #[error("sampling failed: {0}")]
    Sampler(#[from] SamplerError),

    #[error("sampler returned {found} samples for face {face}, expected {expected}")]
    InconsistentFaceSamples {
        face: usize,
        expected: usize,
        found: usize,
    },

    #[error("sampler returned {found} samples for edge {edge}, expected {expected}")]
    InconsistentEdgeSamples {
        edge: usize,
        expected: usize,
        found: usize,
    },

    #[error("feature tensor assembly failed: {reason}")]
    Shape { reason: String },
}

/// Errors while reading or writing a graph blob.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BlobError {
    #[error("failed to parse graph blob: {0}")]
    ParseError(String),

    #[error("unknown graph format: {0}")]
    UnknownFormat(String),

    #[error("graph blob version {file_version} is newer than supported version {supported_version}")]
    FutureVersion {
        file_version: u32,
        supported_version: u32,
    },

    #[error("migration failed from version {from} to {to}: {reason}")]
    MigrationFailed { from: u32, to: u32, reason: String },

    #[error("graph blob is inconsistent: {reason}")]
    Inconsistent { reason: String },

    #[error("I/O error on {path:?}: {reason}")]
    Io { path: PathBuf, reason: String },
}
