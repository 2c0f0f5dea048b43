//! Result export: JSON report, plain-text report, or raw `.seg` labels.

use std::fmt;
use std::path::Path;

use label_engine::{format_label_text, EngineError, Session};
use seg_types::Rgb;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{info, instrument};

use crate::errors::FormatError;

/// Output format of [`export_session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Json,
    Text,
    RawLabels,
}

impl ExportFormat {
    /// `.txt` is a text report, `.seg` raw labels, anything else JSON.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        match ext.as_deref() {
            Some("txt") => ExportFormat::Text,
            Some("seg") => ExportFormat::RawLabels,
            _ => ExportFormat::Json,
        }
    }
}

/// Category name to face count, in taxonomy order. Serialized as a JSON object
/// whose keys keep that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelDistribution(pub Vec<(String, usize)>);

impl LabelDistribution {
    /// Pair names with counts. Categories sharing a name are merged at the
    /// position of the first one.
    pub fn from_counts(names: &[String], counts: &[usize]) -> Self {
        let mut entries: Vec<(String, usize)> = Vec::with_capacity(names.len());
        for (name, &count) in names.iter().zip(counts) {
            match entries.iter_mut().find(|(n, _)| n == name) {
                Some((_, total)) => *total += count,
                None => entries.push((name.clone(), count)),
            }
        }
        Self(entries)
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, c)| *c)
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|(n, _)| n.as_str()).collect()
    }
}

impl Serialize for LabelDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, count) in &self.0 {
            map.serialize_entry(name, count)?;
        }
        map.end()
    }
}

struct DistributionVisitor;

impl<'de> Visitor<'de> for DistributionVisitor {
    type Value = LabelDistribution;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of category name to face count")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((name, count)) = access.next_entry::<String, usize>()? {
            entries.push((name, count));
        }
        Ok(LabelDistribution(entries))
    }
}

impl<'de> Deserialize<'de> for LabelDistribution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DistributionVisitor)
    }
}

/// JSON export body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReport {
    /// Model file name.
    pub model: Option<String>,
    /// Geometry file name.
    pub step_file: Option<String>,
    pub total_faces: usize,
    pub label_distribution: LabelDistribution,
    pub face_labels: Vec<usize>,
    pub label_colors: Vec<Rgb>,
    pub label_names: Vec<String>,
}

fn file_name(path: Option<&Path>) -> Option<String> {
    path.and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
}

impl ExportReport {
    /// Capture the current result of `session`. Fails with
    /// [`EngineError::NoResult`] when no labels are present.
    pub fn from_session(session: &Session) -> Result<Self, FormatError> {
        let labels = session.labels().ok_or(EngineError::NoResult)?;
        let snapshot = session.snapshot();

        let label_distribution = LabelDistribution::from_counts(&snapshot.names, &snapshot.counts);

        Ok(Self {
            model: file_name(session.pipeline().model().map(|m| m.path.as_path())),
            step_file: file_name(session.geometry()),
            total_faces: snapshot.total_faces,
            label_distribution,
            face_labels: labels.to_vec(),
            label_colors: snapshot.colors,
            label_names: snapshot.names,
        })
    }

    pub fn to_json(&self) -> Result<String, FormatError> {
        serde_json::to_string_pretty(self).map_err(|e| FormatError::Serialize(e.to_string()))
    }
}

/// Plain-text report: header, then one line per non-empty category.
pub fn text_report(session: &Session) -> Result<String, FormatError> {
    let report = ExportReport::from_session(session)?;
    let unknown = || "Unknown".to_string();
    let mut lines = vec![
        "Face Segmentation Report".to_string(),
        "=".repeat(40),
        format!("Model file: {}", report.model.unwrap_or_else(unknown)),
        format!("STEP file: {}", report.step_file.unwrap_or_else(unknown)),
        format!("Total faces: {}", report.total_faces),
        String::new(),
        "Category distribution:".to_string(),
    ];
    lines.extend(session.statistics().summary_lines(&report.label_names));
    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}

/// Render the session result in `format` without writing it.
pub fn render_export(session: &Session, format: ExportFormat) -> Result<String, FormatError> {
    match format {
        ExportFormat::Json => ExportReport::from_session(session)?.to_json(),
        ExportFormat::Text => text_report(session),
        ExportFormat::RawLabels => {
            let labels = session.labels().ok_or(EngineError::NoResult)?;
            Ok(format_label_text(labels))
        }
    }
}

/// Write the session result to `path`. The format is inferred from the
/// extension unless given.
#[instrument(skip(session, path), fields(path = %path.display()))]
pub fn export_session(
    session: &Session,
    path: &Path,
    format: Option<ExportFormat>,
) -> Result<ExportFormat, FormatError> {
    let format = format.unwrap_or_else(|| ExportFormat::from_path(path));
    let body = render_export(session, format)?;
    std::fs::write(path, body).map_err(|e| FormatError::io(path, e))?;
    info!(?format, "segmentation result exported");
    Ok(format)
}
