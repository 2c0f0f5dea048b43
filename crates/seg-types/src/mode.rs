use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Input strategy used by a segmentation run. Exactly one is active per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PipelineMode {
    /// Sample the live geometry and run the scoring model on it.
    LiveGeometry,
    /// Run the scoring model on a previously serialized face graph.
    PrecomputedGraph,
    /// Read per-face labels from a flat label file; no model involved.
    PrecomputedLabelFile,
}

impl PipelineMode {
    pub const ALL: [PipelineMode; 3] = [
        PipelineMode::LiveGeometry,
        PipelineMode::PrecomputedGraph,
        PipelineMode::PrecomputedLabelFile,
    ];

    /// 1-based mode number as shown to operators.
    pub fn number(self) -> u8 {
        match self {
            PipelineMode::LiveGeometry => 1,
            PipelineMode::PrecomputedGraph => 2,
            PipelineMode::PrecomputedLabelFile => 3,
        }
    }

    /// Inverse of [`PipelineMode::number`].
    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.number() == n)
    }

    /// Inputs that must be supplied before a run in this mode can start.
    pub fn required_inputs(self) -> &'static [InputKind] {
        match self {
            PipelineMode::LiveGeometry => &[InputKind::Model],
            PipelineMode::PrecomputedGraph => &[InputKind::Model, InputKind::PrecomputedGraph],
            PipelineMode::PrecomputedLabelFile => &[InputKind::LabelFile],
        }
    }
}

impl fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mode {}", self.number())
    }
}

/// Kind of file an operator can hand to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InputKind {
    /// CAD solid (STEP).
    Geometry,
    /// Scoring model weights.
    Model,
    /// Label mapping (category names and colors).
    LabelMapping,
    /// Serialized face graph.
    PrecomputedGraph,
    /// Flat per-face label file.
    LabelFile,
}

impl InputKind {
    /// Classify a path by its extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "step" | "stp" => Some(InputKind::Geometry),
            "ckpt" | "pt" | "pth" | "model" => Some(InputKind::Model),
            "json" => Some(InputKind::LabelMapping),
            "bin" => Some(InputKind::PrecomputedGraph),
            "seg" => Some(InputKind::LabelFile),
            _ => None,
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputKind::Geometry => "geometry file",
            InputKind::Model => "model file",
            InputKind::LabelMapping => "label mapping file",
            InputKind::PrecomputedGraph => "precomputed graph file",
            InputKind::LabelFile => "label file",
        };
        f.write_str(name)
    }
}
