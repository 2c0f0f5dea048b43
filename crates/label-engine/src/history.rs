use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use seg_types::PipelineMode;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::EngineError;
use crate::taxonomy::{LabelTaxonomy, TaxonomyInfo};

/// Snapshot of one successful segmentation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: Uuid,
    #[serde(rename = "time")]
    pub timestamp: DateTime<Utc>,
    pub mode: PipelineMode,
    #[serde(rename = "step_path")]
    pub geometry: Option<PathBuf>,
    /// Model, graph blob or label file used by the run.
    #[serde(rename = "extra_path")]
    pub auxiliary: Option<PathBuf>,
    pub label_info: TaxonomyInfo,
    pub labels: Vec<usize>,
}

/// Everything a replay restores.
#[derive(Debug, Clone, PartialEq)]
pub struct Replay {
    pub mode: PipelineMode,
    pub geometry: Option<PathBuf>,
    pub auxiliary: Option<PathBuf>,
    pub taxonomy: LabelTaxonomy,
    pub labels: Vec<usize>,
}

fn file_name(path: &Option<PathBuf>) -> Option<String> {
    path.as_deref()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
}

impl HistoryRecord {
    pub fn new(
        mode: PipelineMode,
        geometry: Option<PathBuf>,
        auxiliary: Option<PathBuf>,
        taxonomy: &LabelTaxonomy,
        labels: Vec<usize>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            mode,
            geometry,
            auxiliary,
            label_info: taxonomy.info(),
            labels,
        }
    }

    /// `%Y-%m-%d %H:%M:%S` in UTC.
    pub fn time_display(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    pub fn mode_label(&self) -> String {
        self.mode.to_string()
    }

    pub fn geometry_name(&self) -> Option<String> {
        file_name(&self.geometry)
    }

    pub fn auxiliary_name(&self) -> Option<String> {
        file_name(&self.auxiliary)
    }

    pub fn replay(&self) -> Replay {
        Replay {
            mode: self.mode,
            geometry: self.geometry.clone(),
            auxiliary: self.auxiliary.clone(),
            taxonomy: LabelTaxonomy::from(self.label_info.clone()),
            labels: self.labels.clone(),
        }
    }
}

/// Durable storage for the history store.
pub trait HistoryBackend: Send {
    /// Stored records, oldest first. Absent storage is an empty history.
    fn load(&self) -> Result<Vec<HistoryRecord>, EngineError>;

    /// Overwrite storage with `records`.
    fn save(&self, records: &[HistoryRecord]) -> Result<(), EngineError>;
}

/// In-memory backend. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    stored: Arc<Mutex<Vec<HistoryRecord>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<HistoryRecord>) -> Self {
        Self {
            stored: Arc::new(Mutex::new(records)),
        }
    }

    /// Copy of what was last saved.
    pub fn stored(&self) -> Vec<HistoryRecord> {
        self.stored.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl HistoryBackend for MemoryBackend {
    fn load(&self) -> Result<Vec<HistoryRecord>, EngineError> {
        Ok(self.stored())
    }

    fn save(&self, records: &[HistoryRecord]) -> Result<(), EngineError> {
        *self.stored.lock().unwrap_or_else(|e| e.into_inner()) = records.to_vec();
        Ok(())
    }
}

/// Bounded FIFO log of past runs, persisted after every mutation.
pub struct HistoryStore {
    records: VecDeque<HistoryRecord>,
    capacity: usize,
    backend: Box<dyn HistoryBackend>,
}

impl HistoryStore {
    /// Open the store, loading whatever the backend holds.
    ///
    /// Unreadable storage starts an empty history. Only the newest `capacity`
    /// records are kept.
    pub fn open(capacity: usize, backend: Box<dyn HistoryBackend>) -> Self {
        let capacity = capacity.max(1);
        let loaded = backend.load().unwrap_or_else(|e| {
            warn!(error = %e, "history could not be loaded, starting empty");
            Vec::new()
        });
        let skip = loaded.len().saturating_sub(capacity);
        let records: VecDeque<_> = loaded.into_iter().skip(skip).collect();
        info!(records = records.len(), capacity, "history opened");
        Self {
            records,
            capacity,
            backend,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryRecord> + '_ {
        self.records.iter()
    }

    pub fn get(&self, index: usize) -> Option<&HistoryRecord> {
        self.records.get(index)
    }

    /// Append, evicting the oldest at capacity, then persist.
    ///
    /// The record is kept in memory even when persisting fails.
    pub fn append(&mut self, record: HistoryRecord) -> Result<(), EngineError> {
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
        self.flush()
    }

    /// Remove every record and persist the empty history.
    pub fn clear(&mut self) -> Result<(), EngineError> {
        self.records.clear();
        self.flush()
    }

    pub fn replay(&self, index: usize) -> Result<Replay, EngineError> {
        self.records
            .get(index)
            .map(HistoryRecord::replay)
            .ok_or(EngineError::HistoryIndex {
                index,
                len: self.records.len(),
            })
    }

    /// Write the current records to the backend.
    pub fn flush(&self) -> Result<(), EngineError> {
        let records: Vec<HistoryRecord> = self.records.iter().cloned().collect();
        self.backend.save(&records)
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("records", &self.records.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: usize) -> HistoryRecord {
        HistoryRecord::new(
            PipelineMode::PrecomputedLabelFile,
            Some(PathBuf::from(format!("/parts/p{}.step", n))),
            Some(PathBuf::from("/parts/labels.seg")),
            &LabelTaxonomy::load_default(),
            vec![n % 2],
        )
    }

    #[test]
    fn eviction_keeps_newest_in_order() {
        let backend = MemoryBackend::new();
        let mut store = HistoryStore::open(3, Box::new(backend.clone()));
        for n in 0..5 {
            store.append(record(n)).unwrap();
        }
        let names: Vec<_> = store.iter().filter_map(|r| r.geometry_name()).collect();
        assert_eq!(names, vec!["p2.step", "p3.step", "p4.step"]);
        assert_eq!(backend.stored().len(), 3);
    }

    #[test]
    fn open_truncates_oversized_storage() {
        let backend = MemoryBackend::with_records((0..6).map(record).collect());
        let store = HistoryStore::open(4, Box::new(backend));
        assert_eq!(store.len(), 4);
        assert_eq!(store.get(0).unwrap().geometry_name().unwrap(), "p2.step");
    }

    #[test]
    fn clear_wipes_storage() {
        let backend = MemoryBackend::new();
        let mut store = HistoryStore::open(50, Box::new(backend.clone()));
        store.append(record(1)).unwrap();
        store.clear().unwrap();
        assert!(store.is_empty());
        assert!(backend.stored().is_empty());
    }

    #[test]
    fn replay_restores_snapshot() {
        let mut store = HistoryStore::open(50, Box::new(MemoryBackend::new()));
        store.append(record(7)).unwrap();
        let replay = store.replay(0).unwrap();
        assert_eq!(replay.mode, PipelineMode::PrecomputedLabelFile);
        assert_eq!(replay.labels, vec![1]);
        assert_eq!(replay.taxonomy, LabelTaxonomy::load_default());
        assert!(matches!(
            store.replay(1),
            Err(EngineError::HistoryIndex { index: 1, len: 1 })
        ));
    }

    #[test]
    fn display_fields() {
        let r = record(3);
        assert_eq!(r.mode_label(), "Mode 3");
        assert_eq!(r.auxiliary_name().unwrap(), "labels.seg");
        assert_eq!(r.time_display().len(), 19);
    }

    #[test]
    fn serialized_field_names() {
        let json = serde_json::to_value(record(0)).unwrap();
        for key in ["id", "time", "mode", "step_path", "extra_path", "label_info", "labels"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
