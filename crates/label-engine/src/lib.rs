//! Label session management for face segmentation.
//!
//! A [`Session`] owns the label taxonomy, the current label vector and its
//! statistics, the segmentation pipeline state, and the run history. Runs are
//! dispatched by [`PipelineMode`](seg_types::PipelineMode): live geometry and
//! precomputed graphs go through graph construction and inference, label files
//! are parsed directly. Raw labels are always clamped into the current
//! taxonomy before they are accepted.

pub mod batch;
pub mod config;
pub mod errors;
pub mod history;
pub mod mapping;
pub mod pipeline;
pub mod seg_file;
pub mod session;
pub mod stats;
pub mod taxonomy;

pub use batch::{
    collect_geometry_sources, run_batch, BatchItem, BatchOutcome, BatchReport, BatchRequest,
    CancelToken,
};
pub use config::{default_history_path, HistoryConfig, SessionConfig, DEFAULT_HISTORY_CAPACITY};
pub use errors::EngineError;
pub use history::{HistoryBackend, HistoryRecord, HistoryStore, MemoryBackend, Replay};
pub use mapping::{parse_mapping, read_mapping_file, MappingShape};
pub use pipeline::{CompletedRun, LoadedModel, PreparedRun, RunJob, SegmentationPipeline};
pub use seg_file::{format_label_text, parse_label_text, read_label_file, write_label_file};
pub use session::{FaceEntry, ModelLoadReport, Session, TaxonomySnapshot};
pub use stats::CategoryStatistics;
pub use taxonomy::{LabelTaxonomy, TaxonomyInfo};
