//! JSON file storage for run history.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use geom_sampler::GeometrySampler;
use label_engine::{
    EngineError, HistoryBackend, HistoryConfig, HistoryRecord, MemoryBackend, Session,
    SessionConfig,
};
use tracing::{debug, instrument};

/// History stored as a pretty-printed JSON array of records.
#[derive(Debug, Clone)]
pub struct JsonHistoryFile {
    path: PathBuf,
}

impl JsonHistoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryBackend for JsonHistoryFile {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Vec<HistoryRecord>, EngineError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let json = std::fs::read_to_string(&self.path).map_err(|e| io(&self.path, e))?;
        let records: Vec<HistoryRecord> =
            serde_json::from_str(&json).map_err(|e| io(&self.path, e))?;
        debug!(records = records.len(), "history file read");
        Ok(records)
    }

    #[instrument(skip(self, records), fields(path = %self.path.display(), records = records.len()))]
    fn save(&self, records: &[HistoryRecord]) -> Result<(), EngineError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(records).map_err(|e| io(&self.path, e))?;
        std::fs::write(&self.path, json).map_err(|e| io(&self.path, e))
    }
}

fn io(path: &Path, err: impl ToString) -> EngineError {
    EngineError::IoFailure {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

/// File-backed history when `config` names a path, in-memory otherwise.
pub fn history_backend(config: &HistoryConfig) -> Box<dyn HistoryBackend> {
    match &config.path {
        Some(path) => Box::new(JsonHistoryFile::new(path.clone())),
        None => Box::new(MemoryBackend::new()),
    }
}

/// Session whose history is stored where `config` says.
pub fn open_session(config: SessionConfig, sampler: Arc<dyn GeometrySampler>) -> Session {
    let backend = history_backend(&config.history);
    Session::new(config, sampler, backend)
}
