//! Helper functions: error type, fixture files, standard solids.

use std::path::{Path, PathBuf};

use face_graph::{build_graph, write_graph_file, SamplingConfig};
use face_infer::LinearProbe;
use geom_sampler::{GeometrySampler, MockSolid};
use label_engine::EngineError;

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("unknown solid: {name}")]
    SolidNotFound { name: String },

    #[error("dispatch error: {message}")]
    DispatchError { message: String },

    #[error("unexpected response to {request}: {response}")]
    UnexpectedResponse { request: String, response: String },

    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("oracle failure ({oracle}): {detail}")]
    OracleFailure { oracle: String, detail: String },

    #[error("fixture error: {reason}")]
    Fixture { reason: String },

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

fn fixture_err(err: impl ToString) -> HarnessError {
    HarnessError::Fixture {
        reason: err.to_string(),
    }
}

// ── Standard Solids ─────────────────────────────────────────────────────────

/// Solids every driver registers: a 6-face box, a 5-face triangular prism and
/// an 8-face hexagonal prism.
pub fn standard_solids() -> Vec<(&'static str, MockSolid)> {
    vec![
        ("box", MockSolid::box_solid(2.0, 1.0, 1.0)),
        ("tri", MockSolid::prism(3, 1.0, 1.0)),
        ("hex", MockSolid::prism(6, 1.0, 2.0)),
    ]
}

// ── Fixture Files ───────────────────────────────────────────────────────────

/// Temporary directory holding the files a scenario loads and writes.
pub struct FixtureWorkspace {
    dir: tempfile::TempDir,
}

impl FixtureWorkspace {
    pub fn new() -> Result<Self, HarnessError> {
        Ok(Self {
            dir: tempfile::tempdir().map_err(fixture_err)?,
        })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `contents` to `name`, creating parent directories.
    pub fn write(&self, name: &str, contents: &str) -> Result<PathBuf, HarnessError> {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(fixture_err)?;
        }
        std::fs::write(&path, contents).map_err(fixture_err)?;
        Ok(path)
    }

    /// Placeholder STEP file so directory walks find it.
    pub fn geometry_file(&self, name: &str) -> Result<PathBuf, HarnessError> {
        self.write(name, "ISO-10303-21;\nEND-ISO-10303-21;\n")
    }

    /// Label file with one label per line.
    pub fn label_file(&self, name: &str, labels: &[i64]) -> Result<PathBuf, HarnessError> {
        let text: String = labels.iter().map(|l| format!("{}\n", l)).collect();
        self.write(name, &text)
    }

    pub fn mapping_file(
        &self,
        name: &str,
        mapping: &serde_json::Value,
    ) -> Result<PathBuf, HarnessError> {
        self.write(name, &mapping.to_string())
    }

    pub fn model_file(&self, name: &str, probe: &LinearProbe) -> Result<PathBuf, HarnessError> {
        self.write(name, &probe.to_json().map_err(fixture_err)?)
    }

    /// Sample `geometry` through `sampler` and store the graph blob.
    pub fn graph_file(
        &self,
        name: &str,
        sampler: &dyn GeometrySampler,
        geometry: &Path,
        sampling: &SamplingConfig,
    ) -> Result<PathBuf, HarnessError> {
        let solid = sampler.load_solid(geometry).map_err(fixture_err)?;
        let graph = build_graph(sampler, &solid, sampling).map_err(fixture_err)?;
        let path = self.path(name);
        write_graph_file(&path, &graph).map_err(fixture_err)?;
        Ok(path)
    }
}

// ── Models ──────────────────────────────────────────────────────────────────

/// Two-class probe that labels faces by the sign of their mean normal z.
///
/// Channel 5 is the normal's z component in the face tensor layout.
pub fn normal_z_probe(name: &str) -> Result<LinearProbe, HarnessError> {
    let mut up = vec![0.0; face_graph::FACE_CHANNELS];
    up[5] = 1.0;
    let down: Vec<f32> = up.iter().map(|w| -w).collect();
    LinearProbe::new(name, vec![down, up], vec![], vec![0.0, 0.0]).map_err(fixture_err)
}
