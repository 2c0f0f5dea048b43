//! Verification oracles: pure functions returning pass/fail verdicts.
//!
//! Each oracle returns an `OracleVerdict` with diagnostic detail, not panics.
//! This lets a scenario collect every failure in one pass.

use label_engine::{CategoryStatistics, HistoryStore, LabelTaxonomy, Session};

/// The result of a single oracle check.
#[derive(Debug, Clone)]
pub struct OracleVerdict {
    pub oracle_name: String,
    pub passed: bool,
    pub detail: String,
    pub value: Option<f64>,
}

impl OracleVerdict {
    fn pass(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: None,
        }
    }

    fn pass_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: Some(value),
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: None,
        }
    }

    fn fail_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: Some(value),
        }
    }
}

// ── Label Oracles ───────────────────────────────────────────────────────────

/// Every label indexes a category of the taxonomy.
pub fn check_labels_in_range(labels: &[usize], taxonomy: &LabelTaxonomy) -> OracleVerdict {
    let size = taxonomy.len();
    let bad: Vec<(usize, usize)> = labels
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, l)| l >= size)
        .collect();
    if bad.is_empty() {
        OracleVerdict::pass(
            "labels_in_range",
            format!("all {} labels in [0, {}]", labels.len(), size - 1),
        )
    } else {
        OracleVerdict::fail(
            "labels_in_range",
            format!(
                "{} labels outside [0, {}], first (face, label): {:?}",
                bad.len(),
                size - 1,
                &bad[..bad.len().min(5)]
            ),
        )
    }
}

/// Counts match a fresh tally of the labels.
pub fn check_counts_match_labels(labels: &[usize], stats: &CategoryStatistics) -> OracleVerdict {
    let mut tally = vec![0usize; stats.counts.len()];
    for &label in labels {
        if let Some(slot) = tally.get_mut(label) {
            *slot += 1;
        }
    }
    if tally == stats.counts && stats.total_faces == labels.len() {
        OracleVerdict::pass("counts_match_labels", format!("counts {:?}", stats.counts))
    } else {
        OracleVerdict::fail(
            "counts_match_labels",
            format!(
                "stored counts {:?} (total {}), recount {:?} (total {})",
                stats.counts,
                stats.total_faces,
                tally,
                labels.len()
            ),
        )
    }
}

// ── Statistics Oracles ──────────────────────────────────────────────────────

pub fn check_counts_sum(stats: &CategoryStatistics) -> OracleVerdict {
    let sum: usize = stats.counts.iter().sum();
    if sum == stats.total_faces {
        OracleVerdict::pass_val(
            "counts_sum",
            format!("sum(counts) = total_faces = {}", sum),
            sum as f64,
        )
    } else {
        OracleVerdict::fail_val(
            "counts_sum",
            format!("sum(counts) = {}, total_faces = {}", sum, stats.total_faces),
            sum as f64,
        )
    }
}

/// Percentages sum to 100 when there are faces, and are all zero otherwise.
pub fn check_percentages(stats: &CategoryStatistics) -> OracleVerdict {
    let total: f64 = stats.percentages().iter().sum();
    let expected = if stats.total_faces == 0 { 0.0 } else { 100.0 };
    if (total - expected).abs() < 1e-6 {
        OracleVerdict::pass_val("percentages", format!("sum = {:.3}%", total), total)
    } else {
        OracleVerdict::fail_val(
            "percentages",
            format!("sum = {:.3}%, expected {:.1}%", total, expected),
            total,
        )
    }
}

/// One count per category.
pub fn check_statistics_size(stats: &CategoryStatistics, taxonomy: &LabelTaxonomy) -> OracleVerdict {
    if stats.counts.len() == taxonomy.len() {
        OracleVerdict::pass(
            "statistics_size",
            format!("{} counts for {} categories", stats.counts.len(), taxonomy.len()),
        )
    } else {
        OracleVerdict::fail(
            "statistics_size",
            format!("{} counts for {} categories", stats.counts.len(), taxonomy.len()),
        )
    }
}

// ── Taxonomy Oracles ────────────────────────────────────────────────────────

/// Non-empty, with a color and a non-blank name per category.
pub fn check_taxonomy_shape(taxonomy: &LabelTaxonomy) -> OracleVerdict {
    let names = taxonomy.names();
    let colors = taxonomy.colors();
    let blank = names.iter().filter(|n| n.trim().is_empty()).count();
    if !names.is_empty() && names.len() == colors.len() && blank == 0 {
        OracleVerdict::pass(
            "taxonomy_shape",
            format!("{} categories with colors", names.len()),
        )
    } else {
        OracleVerdict::fail(
            "taxonomy_shape",
            format!(
                "{} names, {} colors, {} blank names",
                names.len(),
                colors.len(),
                blank
            ),
        )
    }
}

// ── History Oracles ─────────────────────────────────────────────────────────

/// Within capacity, and every record's labels fit its stored taxonomy.
pub fn check_history(history: &HistoryStore) -> OracleVerdict {
    if history.len() > history.capacity() {
        return OracleVerdict::fail(
            "history",
            format!("{} records, capacity {}", history.len(), history.capacity()),
        );
    }
    for (i, record) in history.iter().enumerate() {
        let size = record.label_info.names.len();
        if record.label_info.colors.len() != size {
            return OracleVerdict::fail(
                "history",
                format!("record {}: {} names, {} colors", i, size, record.label_info.colors.len()),
            );
        }
        if let Some(&label) = record.labels.iter().find(|&&l| l >= size) {
            return OracleVerdict::fail(
                "history",
                format!("record {}: label {} outside taxonomy of size {}", i, label, size),
            );
        }
    }
    OracleVerdict::pass_val(
        "history",
        format!("{} of {} records valid", history.len(), history.capacity()),
        history.len() as f64,
    )
}

// ── Composite Checks ────────────────────────────────────────────────────────

/// Every oracle that applies to the session's current state.
pub fn run_session_checks(session: &Session) -> Vec<OracleVerdict> {
    let taxonomy = session.taxonomy();
    let stats = session.statistics();
    let mut verdicts = vec![
        check_taxonomy_shape(taxonomy),
        check_statistics_size(stats, taxonomy),
        check_counts_sum(stats),
        check_percentages(stats),
        check_history(session.history()),
    ];
    if let Some(labels) = session.labels() {
        verdicts.push(check_labels_in_range(labels, taxonomy));
        verdicts.push(check_counts_match_labels(labels, stats));
    }
    verdicts
}
