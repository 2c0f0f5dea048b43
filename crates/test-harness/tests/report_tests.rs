//! Tests for session reports.

use test_harness::SessionDriver;

#[test]
fn report_before_any_run() {
    let d = SessionDriver::mock().unwrap();
    let text = d.report().to_text();
    assert!(text.starts_with("=== Face Segmentation Session Report ==="));
    assert!(text.contains("Mode: Mode 1"));
    assert!(text.contains("Geometry: none"));
    assert!(text.contains("Missing input: model file"));
    assert!(text.contains("2 categories, 0 faces, no result"));
    assert!(text.contains("History: empty"));
}

#[test]
fn report_after_run() {
    let mut d = SessionDriver::mock().unwrap();
    d.scripted_model(2, vec![0, 0, 1, 1, 1]);
    d.geometry("tri").unwrap();
    d.segment().unwrap();

    let report = d.report();
    assert!(report.all_passed());
    assert_eq!(report.total_faces, 5);
    assert_eq!(report.categories[1].count, 3);

    let text = report.to_string();
    assert!(text.contains("Geometry: tri.step"));
    assert!(text.contains("Model: scripted"));
    assert!(!text.contains("Missing input"));
    assert!(text.contains("\"Category 2\" rgb("));
    assert!(text.contains(": 3 (60.0%)"));
    assert!(text.contains("History (1 records):"));
    assert!(text.contains("[PASS] counts_sum"));
}
