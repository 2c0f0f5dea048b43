//! Tests for verification oracles.

use label_engine::*;
use seg_types::PipelineMode;
use test_harness::oracle::*;
use test_harness::SessionDriver;

/// Driver holding the five-face result `[0, 0, 1, 1, 1]`.
fn segmented() -> SessionDriver {
    let mut d = SessionDriver::mock().unwrap();
    d.scripted_model(2, vec![0, 0, 1, 1, 1]);
    d.geometry("tri").unwrap();
    d.segment().unwrap();
    d
}

// ── Passing Oracles ─────────────────────────────────────────────────────

#[test]
fn all_checks_pass_after_run() {
    let d = segmented();
    let verdicts = d.check();
    assert_eq!(verdicts.len(), 7);
    for v in &verdicts {
        assert!(v.passed, "{} failed: {}", v.oracle_name, v.detail);
    }
}

#[test]
fn fresh_session_skips_label_checks() {
    let d = SessionDriver::mock().unwrap();
    let verdicts = d.check();
    assert_eq!(verdicts.len(), 5);
    assert!(verdicts.iter().all(|v| v.passed));
}

#[test]
fn counts_sum_reports_value() {
    let d = segmented();
    let verdict = check_counts_sum(d.session().statistics());
    assert!(verdict.passed);
    assert_eq!(verdict.value, Some(5.0));
}

// ── Failing Oracles ─────────────────────────────────────────────────────

#[test]
fn out_of_range_labels_fail() {
    let verdict = check_labels_in_range(&[0, 3, 1, 2], &LabelTaxonomy::placeholders(2));
    assert!(!verdict.passed);
    assert!(verdict.detail.contains("2 labels"), "{}", verdict.detail);
}

#[test]
fn inconsistent_statistics_fail() {
    let stats = CategoryStatistics {
        counts: vec![2, 2],
        total_faces: 5,
    };
    assert!(!check_counts_sum(&stats).passed);
    assert!(!check_counts_match_labels(&[0, 0, 1, 1, 1], &stats).passed);
    assert!(!check_percentages(&stats).passed);
}

#[test]
fn statistics_size_mismatch_fails() {
    let stats = CategoryStatistics::zeroed(3);
    assert!(!check_statistics_size(&stats, &LabelTaxonomy::placeholders(2)).passed);
    assert!(check_percentages(&stats).passed);
}

#[test]
fn history_with_stale_labels_fails() {
    let record = HistoryRecord::new(
        PipelineMode::LiveGeometry,
        None,
        None,
        &LabelTaxonomy::load_default(),
        vec![0, 4],
    );
    let store = HistoryStore::open(10, Box::new(MemoryBackend::with_records(vec![record])));
    let verdict = check_history(&store);
    assert!(!verdict.passed);
    assert!(verdict.detail.contains("label 4"), "{}", verdict.detail);
}
