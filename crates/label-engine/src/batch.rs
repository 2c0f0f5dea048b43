use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use face_graph::SamplingConfig;
use face_infer::ScoringModel;
use geom_sampler::GeometrySampler;
use seg_types::{InputKind, PipelineMode};
use tracing::{info, instrument, warn};
use walkdir::WalkDir;

use crate::errors::EngineError;
use crate::pipeline::RunJob;
use crate::seg_file::write_label_file;
use crate::taxonomy::LabelTaxonomy;

/// Cooperative cancellation flag shared between a batch and its controller.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Geometry files under `dir`, recursively, sorted by path.
///
/// Symbolic links are not followed, so a link back to an ancestor cannot
/// repeat sources.
pub fn collect_geometry_sources(dir: &Path) -> Result<Vec<PathBuf>, EngineError> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            EngineError::io(path, e)
        })?;
        if entry.file_type().is_file()
            && InputKind::from_path(entry.path()) == Some(InputKind::Geometry)
        {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

/// Outcome for one source.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    Written { output: PathBuf, faces: usize },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    pub source: PathBuf,
    pub outcome: BatchOutcome,
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
    pub total: usize,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i.outcome, BatchOutcome::Written { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }
}

/// A batch with its mode and inputs fixed.
///
/// Built from a session snapshot; running it never touches the session.
#[derive(Clone)]
pub struct BatchRequest {
    pub mode: PipelineMode,
    pub sampler: Arc<dyn GeometrySampler>,
    pub model: Arc<dyn ScoringModel>,
    pub sampling: SamplingConfig,
    /// Blob used for every source in graph mode.
    pub graph_file: Option<PathBuf>,
    pub taxonomy: LabelTaxonomy,
    pub output_dir: PathBuf,
}

impl BatchRequest {
    pub fn new(
        mode: PipelineMode,
        sampler: Arc<dyn GeometrySampler>,
        model: Arc<dyn ScoringModel>,
        sampling: SamplingConfig,
        graph_file: Option<PathBuf>,
        taxonomy: LabelTaxonomy,
        output_dir: PathBuf,
    ) -> Result<Self, EngineError> {
        match mode {
            PipelineMode::LiveGeometry => {}
            PipelineMode::PrecomputedGraph if graph_file.is_none() => {
                return Err(EngineError::MissingInput {
                    input: InputKind::PrecomputedGraph,
                })
            }
            PipelineMode::PrecomputedGraph => {}
            PipelineMode::PrecomputedLabelFile => return Err(EngineError::not_batchable(mode)),
        }
        Ok(Self {
            mode,
            sampler,
            model,
            sampling,
            graph_file,
            taxonomy,
            output_dir,
        })
    }

    fn job_for(&self, source: &Path) -> RunJob {
        match (&self.mode, &self.graph_file) {
            (PipelineMode::PrecomputedGraph, Some(path)) => RunJob::Graph {
                model: Arc::clone(&self.model),
                path: path.clone(),
            },
            _ => RunJob::Live {
                sampler: Arc::clone(&self.sampler),
                model: Arc::clone(&self.model),
                sampling: self.sampling,
                geometry: source.to_path_buf(),
            },
        }
    }

    /// `<output_dir>/<stem>.seg`
    pub fn output_path(&self, source: &Path) -> PathBuf {
        let mut name = source.file_stem().unwrap_or(source.as_os_str()).to_os_string();
        name.push(".seg");
        self.output_dir.join(name)
    }

    fn process_one(&self, source: &Path) -> Result<BatchOutcome, EngineError> {
        let raw = self.job_for(source).raw_labels()?;
        if raw.is_empty() {
            return Err(EngineError::EmptyResult);
        }
        let labels = self.taxonomy.clamp_labels(&raw);
        let output = self.output_path(source);
        write_label_file(&output, &labels)?;
        Ok(BatchOutcome::Written {
            output,
            faces: labels.len(),
        })
    }
}

impl std::fmt::Debug for BatchRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchRequest")
            .field("mode", &self.mode)
            .field("model", &self.model.name())
            .field("graph_file", &self.graph_file)
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

/// Segment every source and write one label file each.
///
/// Per-source failures are recorded and the batch continues. Cancellation is
/// checked before each source; files already written are kept.
#[instrument(skip(request, sources, cancel, progress), fields(count = sources.len()))]
pub fn run_batch(
    request: &BatchRequest,
    sources: &[PathBuf],
    cancel: &CancelToken,
    mut progress: impl FnMut(usize, usize, &Path),
) -> Result<BatchReport, EngineError> {
    std::fs::create_dir_all(&request.output_dir)
        .map_err(|e| EngineError::io(&request.output_dir, e))?;

    let mut report = BatchReport {
        total: sources.len(),
        ..BatchReport::default()
    };
    for (index, source) in sources.iter().enumerate() {
        if cancel.is_cancelled() {
            report.cancelled = true;
            info!(processed = index, "batch cancelled");
            break;
        }
        progress(index, sources.len(), source);
        let outcome = request.process_one(source).unwrap_or_else(|e| {
            warn!(source = %source.display(), error = %e, "batch item failed");
            BatchOutcome::Failed {
                reason: e.to_string(),
            }
        });
        report.items.push(BatchItem {
            source: source.clone(),
            outcome,
        });
    }

    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        cancelled = report.cancelled,
        "batch finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use face_infer::MockModel;
    use geom_sampler::MockSampler;

    fn request(mode: PipelineMode, graph_file: Option<PathBuf>) -> Result<BatchRequest, EngineError> {
        BatchRequest::new(
            mode,
            Arc::new(MockSampler::new()),
            Arc::new(MockModel::constant(2)),
            SamplingConfig::default(),
            graph_file,
            LabelTaxonomy::load_default(),
            PathBuf::from("/out"),
        )
    }

    #[test]
    fn label_file_mode_is_not_batchable() {
        let err = request(PipelineMode::PrecomputedLabelFile, None).unwrap_err();
        assert!(matches!(err, EngineError::InvalidMode { .. }));
    }

    #[test]
    fn graph_mode_needs_a_blob() {
        let err = request(PipelineMode::PrecomputedGraph, None).unwrap_err();
        assert!(matches!(
            err,
            EngineError::MissingInput {
                input: InputKind::PrecomputedGraph
            }
        ));
    }

    #[test]
    fn output_uses_source_stem() {
        let req = request(PipelineMode::LiveGeometry, None).unwrap();
        assert_eq!(
            req.output_path(Path::new("/in/sub/bracket.v2.step")),
            PathBuf::from("/out/bracket.v2.seg")
        );
    }

    #[test]
    fn cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
