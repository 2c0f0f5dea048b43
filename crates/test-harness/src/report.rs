//! Structured text session reports for test diagnostics.
//!
//! Reports are plain text, not JSON, because a failing scenario is read by
//! a person scanning test output.

use std::fmt;
use std::path::Path;

use label_engine::Session;
use seg_types::PipelineMode;

use crate::oracle::{run_session_checks, OracleVerdict};
use crate::workflow::SessionDriver;

/// A complete session report with all sections.
pub struct SessionReport {
    pub mode: PipelineMode,
    pub geometry: Option<String>,
    pub model: Option<String>,
    pub missing_input: Option<String>,
    pub categories: Vec<CategoryLine>,
    pub total_faces: usize,
    pub has_result: bool,
    pub history: Vec<String>,
    pub oracle_results: Vec<OracleVerdict>,
}

/// One category row.
pub struct CategoryLine {
    pub index: usize,
    pub name: String,
    pub color: [u8; 3],
    pub count: usize,
    pub percent: f64,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl SessionReport {
    pub fn from_session(session: &Session) -> Self {
        let snapshot = session.snapshot();
        let percentages = session.statistics().percentages();
        let categories = snapshot
            .names
            .iter()
            .zip(&snapshot.colors)
            .enumerate()
            .map(|(i, (name, color))| CategoryLine {
                index: i,
                name: name.clone(),
                color: [color.r(), color.g(), color.b()],
                count: snapshot.counts.get(i).copied().unwrap_or(0),
                percent: percentages.get(i).copied().unwrap_or(0.0),
            })
            .collect();
        let history = session
            .history()
            .iter()
            .map(|r| {
                format!(
                    "{} {} {} ({} faces)",
                    r.time_display(),
                    r.mode_label(),
                    r.geometry_name().unwrap_or_else(|| "-".into()),
                    r.labels.len()
                )
            })
            .collect();

        Self {
            mode: session.mode(),
            geometry: session.geometry().map(file_name),
            model: session.model_name().map(str::to_string),
            missing_input: session.pipeline().missing_input().map(|k| k.to_string()),
            categories,
            total_faces: snapshot.total_faces,
            has_result: session.labels().is_some(),
            history,
            oracle_results: run_session_checks(session),
        }
    }

    /// Format the report as text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Face Segmentation Session Report ===\n\n");

        out.push_str(&format!("Mode: {}\n", self.mode));
        out.push_str(&format!(
            "Geometry: {}\n",
            self.geometry.as_deref().unwrap_or("none")
        ));
        out.push_str(&format!("Model: {}\n", self.model.as_deref().unwrap_or("none")));
        if let Some(missing) = &self.missing_input {
            out.push_str(&format!("Missing input: {}\n", missing));
        }

        out.push_str(&format!(
            "\nTaxonomy ({} categories, {} faces{}):\n",
            self.categories.len(),
            self.total_faces,
            if self.has_result { "" } else { ", no result" },
        ));
        for c in &self.categories {
            out.push_str(&format!(
                "  [{}] \"{}\" rgb({}, {}, {}): {} ({:.1}%)\n",
                c.index, c.name, c.color[0], c.color[1], c.color[2], c.count, c.percent,
            ));
        }

        if self.history.is_empty() {
            out.push_str("\nHistory: empty\n");
        } else {
            out.push_str(&format!("\nHistory ({} records):\n", self.history.len()));
            for (i, line) in self.history.iter().enumerate() {
                out.push_str(&format!("  {}. {}\n", i, line));
            }
        }

        if !self.oracle_results.is_empty() {
            out.push_str(&format!(
                "\nOracle Results ({} checks):\n",
                self.oracle_results.len()
            ));
            for v in &self.oracle_results {
                let status = if v.passed { "PASS" } else { "FAIL" };
                out.push_str(&format!("  [{}] {}: {}\n", status, v.oracle_name, v.detail));
            }
        }

        out
    }

    pub fn all_passed(&self) -> bool {
        self.oracle_results.iter().all(|v| v.passed)
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl SessionDriver {
    /// Generate a complete session report.
    pub fn report(&self) -> SessionReport {
        SessionReport::from_session(self.session())
    }
}
