use label_engine::{CancelToken, EngineError, Session};
use label_format::FormatError;

use crate::worker::{BatchHandle, RunHandle};

/// A batch on the worker plus the token that cancels it.
#[derive(Debug)]
pub struct ActiveBatch {
    pub handle: BatchHandle,
    pub cancel: CancelToken,
}

/// Session plus the run or batch currently on the worker, if any.
pub struct BridgeState {
    pub session: Session,
    pub pending: Option<RunHandle>,
    pub batch: Option<ActiveBatch>,
}

impl BridgeState {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            pending: None,
            batch: None,
        }
    }

    /// Whether a run or a batch is on the worker.
    pub fn is_running(&self) -> bool {
        self.pending.is_some() || self.batch.is_some()
    }
}

/// Errors surfaced to the front end as `EngineToUi::Error`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BridgeError {
    #[error("{0}")]
    Engine(#[from] EngineError),

    #[error("{0}")]
    Format(#[from] FormatError),

    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}
