//! SessionDriver: fluent API for scripting segmentation sessions in tests.
//!
//! Wraps `seg_bridge::dispatch()` to test the real message path, not a
//! simulation. Solids are addressed by short names instead of paths.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use face_graph::SamplingConfig;
use face_infer::{LinearProbe, MockModel};
use geom_sampler::{GeometrySampler, MockSampler, MockSolid};
use label_engine::{MemoryBackend, Session, SessionConfig, TaxonomySnapshot};
use label_format::ExportFormat;
use seg_bridge::{BridgeState, EngineToUi, HistoryEntry, UiToEngine};
use seg_types::{InputKind, PipelineMode};

use crate::helpers::*;
use crate::oracle;

/// A fluent driver for building and checking segmentation sessions in tests.
///
/// Owns a [`BridgeState`] over a [`MockSampler`] that serves named solids
/// from a fixture workspace.
pub struct SessionDriver {
    pub state: BridgeState,
    pub workspace: FixtureWorkspace,
    sampler: Arc<MockSampler>,
    sampling: SamplingConfig,
    solids: HashMap<String, PathBuf>,
    log: Vec<(String, String)>,
    auto_check: bool,
}

impl SessionDriver {
    /// Driver over the standard solids (`box`, `tri`, `hex`) with 4x4 sampling.
    pub fn mock() -> Result<Self, HarnessError> {
        Self::with_solids(standard_solids())
    }

    /// Driver over caller-supplied solids, each written as `<name>.step`.
    pub fn with_solids(solids: Vec<(&str, MockSolid)>) -> Result<Self, HarnessError> {
        let workspace = FixtureWorkspace::new()?;
        let mut sampler = MockSampler::new();
        let mut paths = HashMap::new();
        for (name, solid) in solids {
            let path = workspace.geometry_file(&format!("{}.step", name))?;
            sampler.register(path.clone(), solid);
            paths.insert(name.to_string(), path);
        }
        let sampler = Arc::new(sampler);
        let sampling = SamplingConfig::uniform(4);
        let config = SessionConfig {
            sampling,
            ..SessionConfig::ephemeral()
        };
        let session = Session::new(
            config,
            Arc::clone(&sampler) as Arc<dyn GeometrySampler>,
            Box::new(MemoryBackend::new()),
        );
        Ok(Self {
            state: BridgeState::new(session),
            workspace,
            sampler,
            sampling,
            solids: paths,
            log: Vec::new(),
            auto_check: false,
        })
    }

    /// After every run, fail if any oracle check fails.
    pub fn with_auto_check(mut self) -> Self {
        self.auto_check = true;
        self
    }

    // ── Raw Dispatch ────────────────────────────────────────────────────

    /// Send one message and record it in the log.
    pub fn send(&mut self, msg: UiToEngine) -> EngineToUi {
        let request = request_name(&msg);
        let response = seg_bridge::dispatch(&mut self.state, msg);
        self.log.push((request, response_name(&response)));
        response
    }

    fn expect_ok(&mut self, msg: UiToEngine) -> Result<EngineToUi, HarnessError> {
        match self.send(msg) {
            EngineToUi::Error { message } => Err(HarnessError::DispatchError { message }),
            response => Ok(response),
        }
    }

    // ── Inputs ──────────────────────────────────────────────────────────

    pub fn solid_path(&self, name: &str) -> Result<PathBuf, HarnessError> {
        self.solids
            .get(name)
            .cloned()
            .ok_or_else(|| HarnessError::SolidNotFound {
                name: name.to_string(),
            })
    }

    pub fn mode(&mut self, mode: PipelineMode) -> Result<&mut Self, HarnessError> {
        self.expect_ok(UiToEngine::SetMode { mode })?;
        Ok(self)
    }

    pub fn geometry(&mut self, name: &str) -> Result<&mut Self, HarnessError> {
        let path = self.solid_path(name)?;
        self.expect_ok(UiToEngine::SetGeometry { path })?;
        Ok(self)
    }

    /// Install a model that assigns `labels[i % len]` to face `i`.
    pub fn scripted_model(&mut self, classes: usize, labels: Vec<usize>) -> &mut Self {
        let path = self.workspace.path("scripted.ckpt");
        self.state
            .session
            .set_model(Arc::new(MockModel::new("scripted", classes, labels)), path);
        self.log.push(("SetModel".into(), "scripted".into()));
        self
    }

    /// Write `probe` as `<file_name>` and load it through the bridge.
    pub fn linear_model(
        &mut self,
        file_name: &str,
        probe: &LinearProbe,
    ) -> Result<EngineToUi, HarnessError> {
        let path = self.workspace.model_file(file_name, probe)?;
        self.expect_ok(UiToEngine::LoadModel { path })
    }

    pub fn mapping(
        &mut self,
        file_name: &str,
        mapping: serde_json::Value,
    ) -> Result<&mut Self, HarnessError> {
        let path = self.workspace.mapping_file(file_name, &mapping)?;
        self.expect_ok(UiToEngine::LoadMapping { path })?;
        Ok(self)
    }

    pub fn label_file(&mut self, file_name: &str, labels: &[i64]) -> Result<&mut Self, HarnessError> {
        let path = self.workspace.label_file(file_name, labels)?;
        self.load(&path, InputKind::LabelFile)?;
        Ok(self)
    }

    /// Precompute the graph of solid `name` and load the blob.
    pub fn graph_of(&mut self, name: &str) -> Result<&mut Self, HarnessError> {
        let geometry = self.solid_path(name)?;
        let path = self.workspace.graph_file(
            &format!("{}.bin", name),
            self.sampler.as_ref(),
            &geometry,
            &self.sampling,
        )?;
        self.load(&path, InputKind::PrecomputedGraph)?;
        Ok(self)
    }

    fn load(&mut self, path: &Path, expected: InputKind) -> Result<(), HarnessError> {
        match self.expect_ok(UiToEngine::LoadInput {
            path: path.to_path_buf(),
        })? {
            EngineToUi::InputLoaded { kind, .. } if kind == expected => Ok(()),
            other => Err(unexpected("LoadInput", &other)),
        }
    }

    pub fn replace_taxonomy(
        &mut self,
        names: &[&str],
        colors: Vec<Vec<i64>>,
    ) -> Result<TaxonomySnapshot, HarnessError> {
        let names = names.iter().map(|n| n.to_string()).collect();
        match self.expect_ok(UiToEngine::ReplaceTaxonomy { names, colors })? {
            EngineToUi::TaxonomyUpdated { snapshot } => Ok(snapshot),
            other => Err(unexpected("ReplaceTaxonomy", &other)),
        }
    }

    // ── Runs ────────────────────────────────────────────────────────────

    /// Run on the worker and wait for the labels.
    pub fn segment(&mut self) -> Result<Vec<usize>, HarnessError> {
        match self.expect_ok(UiToEngine::Segment)? {
            EngineToUi::RunStarted { .. } => {}
            other => return Err(unexpected("Segment", &other)),
        }
        let labels = match self.finish("run")? {
            EngineToUi::SegmentationReady { labels, .. } => labels,
            EngineToUi::Error { message } => return Err(HarnessError::DispatchError { message }),
            other => return Err(unexpected("Wait", &other)),
        };
        if self.auto_check {
            self.assert_checks_pass()?;
        }
        Ok(labels)
    }

    /// Segment every fixture geometry file into `output` under the workspace,
    /// waiting for the worker to finish.
    pub fn batch(&mut self, output: &str) -> Result<(usize, usize, usize), HarnessError> {
        let msg = UiToEngine::RunBatch {
            input_dir: self.workspace.root().to_path_buf(),
            output_dir: self.workspace.path(output),
        };
        match self.expect_ok(msg)? {
            EngineToUi::BatchStarted { .. } => {}
            other => return Err(unexpected("RunBatch", &other)),
        }
        let finished = self.finish("batch")?;
        match finished {
            EngineToUi::BatchFinished {
                total,
                succeeded,
                failed,
                ..
            } => Ok((total, succeeded, failed)),
            EngineToUi::Error { message } => Err(HarnessError::DispatchError { message }),
            other => Err(unexpected("Wait", &other)),
        }
    }

    /// Wait for the worker and log the result.
    fn finish(&mut self, what: &str) -> Result<EngineToUi, HarnessError> {
        let finished = seg_bridge::wait(&mut self.state).ok_or_else(|| {
            HarnessError::DispatchError {
                message: format!("{} started but nothing was pending", what),
            }
        })?;
        self.log.push(("Wait".into(), response_name(&finished)));
        Ok(finished)
    }

    // ── History and Files ───────────────────────────────────────────────

    pub fn history_entries(&mut self) -> Result<Vec<HistoryEntry>, HarnessError> {
        match self.expect_ok(UiToEngine::ListHistory)? {
            EngineToUi::History { entries } => Ok(entries),
            other => Err(unexpected("ListHistory", &other)),
        }
    }

    pub fn replay(&mut self, index: usize) -> Result<Vec<usize>, HarnessError> {
        match self.expect_ok(UiToEngine::ReplayHistory { index })? {
            EngineToUi::SegmentationReady { labels, .. } => Ok(labels),
            other => Err(unexpected("ReplayHistory", &other)),
        }
    }

    pub fn reset(&mut self) -> Result<&mut Self, HarnessError> {
        self.expect_ok(UiToEngine::Reset)?;
        Ok(self)
    }

    /// Export into the workspace; the format follows the extension.
    pub fn export(&mut self, file_name: &str) -> Result<(PathBuf, ExportFormat), HarnessError> {
        let path = self.workspace.path(file_name);
        match self.expect_ok(UiToEngine::Export { path, format: None })? {
            EngineToUi::Exported { path, format } => Ok((path, format)),
            other => Err(unexpected("Export", &other)),
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn session(&self) -> &Session {
        &self.state.session
    }

    pub fn snapshot(&self) -> TaxonomySnapshot {
        self.state.session.snapshot()
    }

    pub fn labels(&self) -> Option<Vec<usize>> {
        self.state.session.labels().map(<[usize]>::to_vec)
    }

    /// `(request, response)` type names of every message sent so far.
    pub fn log(&self) -> &[(String, String)] {
        &self.log
    }

    // ── Checks ──────────────────────────────────────────────────────────

    pub fn check(&self) -> Vec<oracle::OracleVerdict> {
        oracle::run_session_checks(&self.state.session)
    }

    pub fn assert_checks_pass(&self) -> Result<&Self, HarnessError> {
        match self.check().into_iter().find(|v| !v.passed) {
            None => Ok(self),
            Some(v) => Err(HarnessError::OracleFailure {
                oracle: v.oracle_name,
                detail: v.detail,
            }),
        }
    }

    pub fn assert_counts(&self, expected: &[usize]) -> Result<&Self, HarnessError> {
        crate::assertions::assert_counts_eq(&self.state.session, expected, "driver")?;
        Ok(self)
    }

    pub fn assert_names(&self, expected: &[&str]) -> Result<&Self, HarnessError> {
        crate::assertions::assert_taxonomy_names(&self.state.session, expected, "driver")?;
        Ok(self)
    }
}

fn variant_name(json: serde_json::Result<serde_json::Value>) -> String {
    json.ok()
        .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(str::to_string))
        .unwrap_or_else(|| "?".to_string())
}

fn request_name(msg: &UiToEngine) -> String {
    variant_name(serde_json::to_value(msg))
}

fn response_name(msg: &EngineToUi) -> String {
    variant_name(serde_json::to_value(msg))
}

fn unexpected(request: &str, response: &EngineToUi) -> HarnessError {
    HarnessError::UnexpectedResponse {
        request: request.to_string(),
        response: format!("{:?}", response),
    }
}
