use std::path::PathBuf;

use label_engine::{FaceEntry, HistoryRecord, TaxonomySnapshot};
use label_format::ExportFormat;
use seg_types::{InputKind, PipelineMode};
use serde::{Deserialize, Serialize};

/// Requests from the front end to the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UiToEngine {
    // -- Inputs --
    /// Switch pipeline mode. Mode-specific inputs are dropped on change.
    SetMode { mode: PipelineMode },
    /// Load any supported file, routed by extension.
    LoadInput { path: PathBuf },
    /// Load model weights and their companion mapping.
    LoadModel { path: PathBuf },
    LoadMapping { path: PathBuf },
    SetGeometry { path: PathBuf },

    // -- Taxonomy --
    /// Replace category names and colors interactively.
    ReplaceTaxonomy {
        names: Vec<String>,
        #[serde(default)]
        colors: Vec<Vec<i64>>,
    },
    SaveTaxonomy { path: PathBuf },

    // -- Runs --
    /// Start a run on the worker thread.
    Segment,
    /// Segment every geometry file under `input_dir` into `output_dir` on the
    /// worker thread.
    RunBatch {
        input_dir: PathBuf,
        output_dir: PathBuf,
    },
    /// Stop the running batch before its next source.
    CancelBatch,

    // -- Views --
    GetSnapshot,
    GetFaces,

    // -- History --
    ListHistory,
    ReplayHistory { index: usize },
    ClearHistory,

    // -- Files --
    Export {
        path: PathBuf,
        #[serde(default)]
        format: Option<ExportFormat>,
    },

    /// Drop inputs and results, keeping history.
    Reset,
    /// Finish any pending run and flush history.
    Shutdown,
}

/// One row of the history list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub index: usize,
    pub time: String,
    pub mode: String,
    pub geometry: Option<String>,
    pub auxiliary: Option<String>,
    pub faces: usize,
}

impl HistoryEntry {
    pub fn from_record(index: usize, record: &HistoryRecord) -> Self {
        Self {
            index,
            time: record.time_display(),
            mode: record.mode_label(),
            geometry: record.geometry_name(),
            auxiliary: record.auxiliary_name(),
            faces: record.labels.len(),
        }
    }
}

/// Responses and notifications from the session to the front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EngineToUi {
    /// Mode set; `missing` is the first input the mode still needs.
    ModeChanged {
        mode: PipelineMode,
        missing: Option<InputKind>,
    },

    InputLoaded { kind: InputKind, path: PathBuf },

    ModelLoaded {
        model_name: String,
        companion: Option<PathBuf>,
        companion_error: Option<String>,
        snapshot: TaxonomySnapshot,
    },

    /// Taxonomy or statistics changed.
    TaxonomyUpdated { snapshot: TaxonomySnapshot },

    /// A run was handed to the worker.
    RunStarted { mode: PipelineMode },

    /// A run finished and its labels are applied.
    SegmentationReady {
        snapshot: TaxonomySnapshot,
        labels: Vec<usize>,
    },

    Faces { faces: Vec<FaceEntry> },

    History { entries: Vec<HistoryEntry> },

    /// A batch was handed to the worker.
    BatchStarted { mode: PipelineMode },

    BatchFinished {
        total: usize,
        succeeded: usize,
        failed: usize,
        cancelled: bool,
    },

    Exported { path: PathBuf, format: ExportFormat },

    /// Request handled with nothing to report.
    Done,

    Error { message: String },
}
