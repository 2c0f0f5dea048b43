//! Mode dispatch for segmentation runs.
//!
//! [`SegmentationPipeline`] tracks the active mode and which inputs are ready.
//! [`SegmentationPipeline::prepare`] validates readiness and captures
//! everything a run needs into a [`PreparedRun`], which owns its inputs and
//! can be executed on another thread.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use face_graph::{build_graph, read_graph_file, SamplingConfig};
use face_infer::{predict, ScoringModel};
use geom_sampler::GeometrySampler;
use seg_types::{InputKind, PipelineMode};
use tracing::{debug, info, instrument};

use crate::errors::EngineError;
use crate::seg_file::read_label_file;

/// A loaded scoring model and the file it came from.
#[derive(Clone)]
pub struct LoadedModel {
    pub model: Arc<dyn ScoringModel>,
    pub path: PathBuf,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("name", &self.model.name())
            .field("path", &self.path)
            .finish()
    }
}

/// Active mode plus readiness of each mode-specific input.
#[derive(Debug, Clone)]
pub struct SegmentationPipeline {
    mode: PipelineMode,
    model: Option<LoadedModel>,
    graph_file: Option<PathBuf>,
    label_file: Option<PathBuf>,
}

impl Default for SegmentationPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentationPipeline {
    pub fn new() -> Self {
        Self {
            mode: PipelineMode::LiveGeometry,
            model: None,
            graph_file: None,
            label_file: None,
        }
    }

    pub fn mode(&self) -> PipelineMode {
        self.mode
    }

    /// Switch modes. Changing the mode drops every mode-specific input.
    pub fn set_mode(&mut self, mode: PipelineMode) {
        if mode == self.mode {
            return;
        }
        debug!(from = %self.mode, to = %mode, "pipeline mode changed, inputs reset");
        self.mode = mode;
        self.model = None;
        self.graph_file = None;
        self.label_file = None;
    }

    pub fn set_model(&mut self, model: Arc<dyn ScoringModel>, path: PathBuf) {
        self.model = Some(LoadedModel { model, path });
    }

    pub fn set_graph_file(&mut self, path: PathBuf) {
        self.graph_file = Some(path);
    }

    pub fn set_label_file(&mut self, path: PathBuf) {
        self.label_file = Some(path);
    }

    pub fn model(&self) -> Option<&LoadedModel> {
        self.model.as_ref()
    }

    pub fn graph_file(&self) -> Option<&Path> {
        self.graph_file.as_deref()
    }

    pub fn label_file(&self) -> Option<&Path> {
        self.label_file.as_deref()
    }

    pub fn model_ready(&self) -> bool {
        self.model.is_some()
    }

    pub fn graph_ready(&self) -> bool {
        self.graph_file.is_some()
    }

    pub fn label_file_ready(&self) -> bool {
        self.label_file.is_some()
    }

    /// Whether `input` has been supplied.
    pub fn is_ready(&self, input: InputKind) -> bool {
        match input {
            InputKind::Model => self.model_ready(),
            InputKind::PrecomputedGraph => self.graph_ready(),
            InputKind::LabelFile => self.label_file_ready(),
            InputKind::Geometry | InputKind::LabelMapping => true,
        }
    }

    /// First required input of the current mode that is not ready.
    pub fn missing_input(&self) -> Option<InputKind> {
        self.mode
            .required_inputs()
            .iter()
            .copied()
            .find(|&input| !self.is_ready(input))
    }

    fn require_model(&self) -> Result<&LoadedModel, EngineError> {
        self.model.as_ref().ok_or(EngineError::MissingInput {
            input: InputKind::Model,
        })
    }

    /// Validate readiness and capture a run for `geometry`.
    ///
    /// Live runs need geometry; the other modes record it when given.
    pub fn prepare(
        &self,
        geometry: Option<&Path>,
        sampler: &Arc<dyn GeometrySampler>,
        sampling: SamplingConfig,
    ) -> Result<PreparedRun, EngineError> {
        if let Some(input) = self.missing_input() {
            return Err(EngineError::MissingInput { input });
        }
        let geometry = geometry.map(Path::to_path_buf);
        let (job, auxiliary) = match self.mode {
            PipelineMode::LiveGeometry => {
                let loaded = self.require_model()?;
                let path = geometry.clone().ok_or(EngineError::MissingInput {
                    input: InputKind::Geometry,
                })?;
                let job = RunJob::Live {
                    sampler: Arc::clone(sampler),
                    model: Arc::clone(&loaded.model),
                    sampling,
                    geometry: path,
                };
                (job, Some(loaded.path.clone()))
            }
            PipelineMode::PrecomputedGraph => {
                let loaded = self.require_model()?;
                let path = self.graph_file.clone().ok_or(EngineError::MissingInput {
                    input: InputKind::PrecomputedGraph,
                })?;
                let job = RunJob::Graph {
                    model: Arc::clone(&loaded.model),
                    path: path.clone(),
                };
                (job, Some(path))
            }
            PipelineMode::PrecomputedLabelFile => {
                let path = self.label_file.clone().ok_or(EngineError::MissingInput {
                    input: InputKind::LabelFile,
                })?;
                (RunJob::LabelFile { path: path.clone() }, Some(path))
            }
        };
        Ok(PreparedRun {
            mode: self.mode,
            geometry,
            auxiliary,
            model_name: self.model.as_ref().map(|m| m.model.name().to_string()),
            job,
        })
    }
}

/// Work captured for one run.
#[derive(Clone)]
pub enum RunJob {
    Live {
        sampler: Arc<dyn GeometrySampler>,
        model: Arc<dyn ScoringModel>,
        sampling: SamplingConfig,
        geometry: PathBuf,
    },
    Graph {
        model: Arc<dyn ScoringModel>,
        path: PathBuf,
    },
    LabelFile {
        path: PathBuf,
    },
}

impl RunJob {
    /// Produce raw, unclamped labels.
    pub fn raw_labels(&self) -> Result<Vec<i64>, EngineError> {
        match self {
            RunJob::Live {
                sampler,
                model,
                sampling,
                geometry,
            } => {
                let solid = sampler.load_solid(geometry)?;
                let graph = build_graph(sampler.as_ref(), &solid, sampling)?;
                Ok(to_raw(predict(model.as_ref(), &graph)?))
            }
            RunJob::Graph { model, path } => {
                let graph = read_graph_file(path)?;
                Ok(to_raw(predict(model.as_ref(), &graph)?))
            }
            RunJob::LabelFile { path } => read_label_file(path),
        }
    }
}

fn to_raw(labels: Vec<usize>) -> Vec<i64> {
    labels.into_iter().map(|l| l as i64).collect()
}

/// A validated run, ready to execute. Owns all of its inputs.
#[derive(Clone)]
pub struct PreparedRun {
    pub mode: PipelineMode,
    pub geometry: Option<PathBuf>,
    pub auxiliary: Option<PathBuf>,
    pub model_name: Option<String>,
    pub job: RunJob,
}

impl std::fmt::Debug for PreparedRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedRun")
            .field("mode", &self.mode)
            .field("geometry", &self.geometry)
            .field("auxiliary", &self.auxiliary)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl PreparedRun {
    /// Run graph construction and inference, or read the label file.
    ///
    /// Touches no session state.
    #[instrument(skip(self), fields(mode = %self.mode))]
    pub fn execute(self) -> Result<CompletedRun, EngineError> {
        let raw_labels = self.job.raw_labels()?;
        if raw_labels.is_empty() {
            return Err(EngineError::EmptyResult);
        }
        info!(faces = raw_labels.len(), "segmentation run finished");
        Ok(CompletedRun {
            mode: self.mode,
            geometry: self.geometry,
            auxiliary: self.auxiliary,
            model_name: self.model_name,
            raw_labels,
        })
    }
}

/// Output of a finished run, before clamping into the taxonomy.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedRun {
    pub mode: PipelineMode,
    pub geometry: Option<PathBuf>,
    pub auxiliary: Option<PathBuf>,
    pub model_name: Option<String>,
    pub raw_labels: Vec<i64>,
}
