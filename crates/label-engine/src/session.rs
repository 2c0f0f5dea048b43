use std::path::{Path, PathBuf};
use std::sync::Arc;

use face_infer::{LinearProbe, ScoringModel};
use geom_sampler::GeometrySampler;
use seg_types::{InputKind, PipelineMode, Rgb};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::batch::BatchRequest;
use crate::config::SessionConfig;
use crate::errors::EngineError;
use crate::history::{HistoryBackend, HistoryRecord, HistoryStore};
use crate::mapping::read_mapping_file;
use crate::pipeline::{CompletedRun, PreparedRun, SegmentationPipeline};
use crate::stats::CategoryStatistics;
use crate::taxonomy::LabelTaxonomy;

/// Read-only view of the taxonomy and current statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomySnapshot {
    pub names: Vec<String>,
    pub colors: Vec<Rgb>,
    pub counts: Vec<usize>,
    pub total_faces: usize,
}

/// One face of the current result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceEntry {
    pub face: usize,
    pub category: usize,
    pub name: String,
    pub color: Rgb,
}

/// Result of loading a model file.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelLoadReport {
    pub model_name: String,
    /// Companion mapping that was found next to the model, if any.
    pub companion: Option<PathBuf>,
    /// Why the companion mapping was not applied. The model stays loaded.
    pub companion_error: Option<String>,
}

/// Mutable state of one segmentation session.
///
/// All mutation happens through `&mut self` on the orchestrating thread. Runs
/// are split into [`Session::begin_run`], which captures a [`PreparedRun`] that
/// can execute elsewhere, and [`Session::finish_run`], which folds the result
/// back in.
pub struct Session {
    config: SessionConfig,
    sampler: Arc<dyn GeometrySampler>,
    taxonomy: LabelTaxonomy,
    labels: Option<Vec<usize>>,
    stats: CategoryStatistics,
    pipeline: SegmentationPipeline,
    geometry: Option<PathBuf>,
    history: HistoryStore,
    run_in_flight: bool,
}

impl Session {
    pub fn new(
        config: SessionConfig,
        sampler: Arc<dyn GeometrySampler>,
        backend: Box<dyn HistoryBackend>,
    ) -> Self {
        let history = HistoryStore::open(config.history.capacity, backend);
        let taxonomy = LabelTaxonomy::load_default();
        let stats = CategoryStatistics::zeroed(taxonomy.len());
        Self {
            config,
            sampler,
            taxonomy,
            labels: None,
            stats,
            pipeline: SegmentationPipeline::new(),
            geometry: None,
            history,
            run_in_flight: false,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn sampler(&self) -> &Arc<dyn GeometrySampler> {
        &self.sampler
    }

    pub fn pipeline(&self) -> &SegmentationPipeline {
        &self.pipeline
    }

    pub fn mode(&self) -> PipelineMode {
        self.pipeline.mode()
    }

    pub fn set_mode(&mut self, mode: PipelineMode) {
        self.pipeline.set_mode(mode);
    }

    pub fn geometry(&self) -> Option<&Path> {
        self.geometry.as_deref()
    }

    /// Select the geometry to segment. Labels of the previous geometry are dropped.
    ///
    /// The path is not checked here; the sampler reports unreadable solids
    /// when a run starts.
    pub fn set_geometry(&mut self, path: PathBuf) {
        info!(path = %path.display(), "geometry selected");
        self.geometry = Some(path);
        self.clear_labels();
    }

    /// Route a file to the right loader by its extension.
    pub fn load_input(&mut self, path: &Path) -> Result<InputKind, EngineError> {
        let kind = InputKind::from_path(path).ok_or_else(|| EngineError::UnsupportedInput {
            path: path.to_path_buf(),
        })?;
        match kind {
            InputKind::Geometry => self.set_geometry(path.to_path_buf()),
            InputKind::Model => {
                self.load_model(path)?;
            }
            InputKind::LabelMapping => self.load_mapping(path)?,
            InputKind::PrecomputedGraph => self.set_graph_file(path.to_path_buf())?,
            InputKind::LabelFile => self.set_label_file(path.to_path_buf())?,
        }
        Ok(kind)
    }

    /// Load a linear probe model, then its companion `<stem>.json` mapping if present.
    pub fn load_model(&mut self, path: &Path) -> Result<ModelLoadReport, EngineError> {
        let model = LinearProbe::load(path)?;
        let model_name = model.name().to_string();
        self.set_model(Arc::new(model), path.to_path_buf());

        let mapping = path.with_extension("json");
        let mut report = ModelLoadReport {
            model_name,
            companion: None,
            companion_error: None,
        };
        if mapping.is_file() {
            report.companion = Some(mapping.clone());
            if let Err(e) = self.load_mapping(&mapping) {
                warn!(path = %mapping.display(), error = %e, "companion label mapping rejected");
                report.companion_error = Some(e.to_string());
            }
        }
        Ok(report)
    }

    /// Install an already-loaded model.
    pub fn set_model(&mut self, model: Arc<dyn ScoringModel>, path: PathBuf) {
        info!(model = model.name(), classes = model.num_classes(), "model ready");
        self.pipeline.set_model(model, path);
    }

    pub fn model_name(&self) -> Option<&str> {
        self.pipeline.model().map(|m| m.model.name())
    }

    pub fn set_graph_file(&mut self, path: PathBuf) -> Result<(), EngineError> {
        require_file(&path)?;
        self.pipeline.set_graph_file(path);
        Ok(())
    }

    pub fn set_label_file(&mut self, path: PathBuf) -> Result<(), EngineError> {
        require_file(&path)?;
        self.pipeline.set_label_file(path);
        Ok(())
    }

    /// Replace the taxonomy from a mapping file.
    ///
    /// Existing labels are kept, clamped into the new range, and the
    /// statistics recomputed from them.
    pub fn load_mapping(&mut self, path: &Path) -> Result<(), EngineError> {
        let taxonomy = read_mapping_file(path)?;
        info!(path = %path.display(), categories = taxonomy.len(), "label mapping loaded");
        self.install_taxonomy(taxonomy)
    }

    /// Replace the taxonomy interactively. Existing labels are clamped into the
    /// new range and the statistics recomputed.
    pub fn replace_taxonomy(
        &mut self,
        names: &[String],
        colors: &[Vec<i64>],
    ) -> Result<(), EngineError> {
        self.install_taxonomy(LabelTaxonomy::normalized(names, colors))
    }

    fn install_taxonomy(&mut self, taxonomy: LabelTaxonomy) -> Result<(), EngineError> {
        self.taxonomy = taxonomy;
        if let Some(labels) = self.labels.as_mut() {
            self.taxonomy.reclamp(labels);
        }
        self.recompute()
    }

    pub fn taxonomy(&self) -> &LabelTaxonomy {
        &self.taxonomy
    }

    pub fn labels(&self) -> Option<&[usize]> {
        self.labels.as_deref()
    }

    pub fn statistics(&self) -> &CategoryStatistics {
        &self.stats
    }

    pub fn snapshot(&self) -> TaxonomySnapshot {
        TaxonomySnapshot {
            names: self.taxonomy.names(),
            colors: self.taxonomy.colors(),
            counts: self.stats.counts.clone(),
            total_faces: self.stats.total_faces,
        }
    }

    /// Per-face category assignment in traversal order. Empty without a result.
    pub fn face_entries(&self) -> Vec<FaceEntry> {
        let Some(labels) = &self.labels else {
            return Vec::new();
        };
        labels
            .iter()
            .enumerate()
            .filter_map(|(face, &category)| {
                self.taxonomy.get(category).map(|c| FaceEntry {
                    face,
                    category,
                    name: c.name.clone(),
                    color: c.color,
                })
            })
            .collect()
    }

    pub fn is_running(&self) -> bool {
        self.run_in_flight
    }

    /// Validate inputs and capture a run. Only one run may be in flight.
    pub fn begin_run(&mut self) -> Result<PreparedRun, EngineError> {
        if self.run_in_flight {
            return Err(EngineError::RunInProgress);
        }
        let run = self.pipeline.prepare(
            self.geometry.as_deref(),
            &self.sampler,
            self.config.sampling,
        )?;
        self.run_in_flight = true;
        Ok(run)
    }

    /// Fold a run result back into the session.
    ///
    /// On success the labels are clamped, statistics recomputed and, when
    /// enabled, a history record appended.
    pub fn finish_run(
        &mut self,
        result: Result<CompletedRun, EngineError>,
    ) -> Result<&CategoryStatistics, EngineError> {
        if !self.run_in_flight {
            return Err(EngineError::NoRunInProgress);
        }
        self.run_in_flight = false;
        let completed = result?;

        let labels = self.taxonomy.clamp_labels(&completed.raw_labels);
        self.labels = Some(labels.clone());
        self.recompute()?;

        if self.config.record_history {
            let record = HistoryRecord::new(
                completed.mode,
                completed.geometry,
                completed.auxiliary,
                &self.taxonomy,
                labels,
            );
            if let Err(e) = self.history.append(record) {
                warn!(error = %e, "history could not be persisted");
            }
        }
        Ok(&self.stats)
    }

    /// Run synchronously on the calling thread.
    #[instrument(skip(self), fields(mode = %self.mode()))]
    pub fn process(&mut self) -> Result<&CategoryStatistics, EngineError> {
        let run = self.begin_run()?;
        let result = run.execute();
        self.finish_run(result)
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn clear_history(&mut self) -> Result<(), EngineError> {
        self.history.clear()
    }

    /// Restore a history record without recomputation.
    ///
    /// Sets the mode, geometry, taxonomy and labels stored in the record. The
    /// loaded model is left alone unless the mode changes.
    pub fn replay(&mut self, index: usize) -> Result<(), EngineError> {
        if self.run_in_flight {
            return Err(EngineError::RunInProgress);
        }
        let replay = self.history.replay(index)?;
        self.pipeline.set_mode(replay.mode);
        self.geometry = replay.geometry;
        self.taxonomy = replay.taxonomy;
        let mut labels = replay.labels;
        self.taxonomy.reclamp(&mut labels);
        self.labels = Some(labels);
        self.recompute()
    }

    /// Capture a batch over the current mode and inputs.
    pub fn batch_request(&self, output_dir: PathBuf) -> Result<BatchRequest, EngineError> {
        let mode = self.mode();
        if mode == PipelineMode::PrecomputedLabelFile {
            return Err(EngineError::not_batchable(mode));
        }
        let model = self.pipeline.model().ok_or(EngineError::MissingInput {
            input: InputKind::Model,
        })?;
        BatchRequest::new(
            mode,
            Arc::clone(&self.sampler),
            Arc::clone(&model.model),
            self.config.sampling,
            self.pipeline.graph_file().map(Path::to_path_buf),
            self.taxonomy.clone(),
            output_dir,
        )
    }

    /// Drop the model, inputs and labels and restore the default taxonomy.
    /// History is kept.
    pub fn reset(&mut self) {
        self.pipeline = SegmentationPipeline::new();
        self.geometry = None;
        self.taxonomy = LabelTaxonomy::load_default();
        self.clear_labels();
        info!("session reset");
    }

    /// Persist history before the session goes away.
    pub fn shutdown(&self) -> Result<(), EngineError> {
        self.history.flush()
    }

    fn clear_labels(&mut self) {
        self.labels = None;
        self.stats = CategoryStatistics::zeroed(self.taxonomy.len());
    }

    fn recompute(&mut self) -> Result<(), EngineError> {
        self.stats = match &self.labels {
            Some(labels) => CategoryStatistics::compute(labels, self.taxonomy.len())?,
            None => CategoryStatistics::zeroed(self.taxonomy.len()),
        };
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("mode", &self.mode())
            .field("geometry", &self.geometry)
            .field("categories", &self.taxonomy.len())
            .field("faces", &self.stats.total_faces)
            .field("history", &self.history)
            .finish()
    }
}

fn require_file(path: &Path) -> Result<(), EngineError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(EngineError::io(path, "file not found"))
    }
}
