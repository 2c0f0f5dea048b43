//! Multi-step scenarios: real model files, graph blobs, batches, history limits.

use seg_bridge::EngineToUi;
use seg_types::PipelineMode;
use serde_json::json;
use test_harness::assertions::*;
use test_harness::helpers::normal_z_probe;
use test_harness::SessionDriver;

// ── Linear model files ──────────────────────────────────────────────────

#[test]
fn test_linear_probe_labels_top_faces() {
    let mut d = SessionDriver::mock().unwrap().with_auto_check();
    d.linear_model("probe.ckpt", &normal_z_probe("probe").unwrap())
        .unwrap();
    d.geometry("box").unwrap();

    // Bottom has normal -z, top +z, sides tie and take the first class.
    assert_eq!(d.segment().unwrap(), vec![0, 1, 0, 0, 0, 0]);
    d.assert_counts(&[5, 1]).unwrap();
}

#[test]
fn test_companion_mapping_loaded_with_model() {
    let mut d = SessionDriver::mock().unwrap();
    d.workspace
        .mapping_file("probe.json", &json!(["Lower", "Upper"]))
        .unwrap();
    let response = d
        .linear_model("probe.ckpt", &normal_z_probe("probe").unwrap())
        .unwrap();

    match response {
        EngineToUi::ModelLoaded {
            model_name,
            companion,
            companion_error,
            snapshot,
        } => {
            assert_eq!(model_name, "probe");
            assert!(companion.is_some());
            assert!(companion_error.is_none());
            assert_eq!(snapshot.names, vec!["Lower", "Upper"]);
        }
        other => panic!("expected ModelLoaded, got {:?}", other),
    }
}

#[test]
fn test_broken_companion_keeps_model() {
    let mut d = SessionDriver::mock().unwrap();
    d.workspace.write("probe.json", "{ nope").unwrap();
    let response = d
        .linear_model("probe.ckpt", &normal_z_probe("probe").unwrap())
        .unwrap();
    assert!(matches!(
        response,
        EngineToUi::ModelLoaded {
            companion_error: Some(_),
            ..
        }
    ));
    assert_eq!(d.session().model_name(), Some("probe"));
    d.assert_names(&["Category 1", "Category 2"]).unwrap();
}

// ── Precomputed graphs ──────────────────────────────────────────────────

#[test]
fn test_graph_mode_matches_live_mode() {
    let mut d = SessionDriver::mock().unwrap().with_auto_check();
    let probe = normal_z_probe("probe").unwrap();
    d.linear_model("probe.ckpt", &probe).unwrap();
    d.geometry("hex").unwrap();
    let live = d.segment().unwrap();

    d.mode(PipelineMode::PrecomputedGraph).unwrap();
    d.linear_model("probe.ckpt", &probe).unwrap();
    d.graph_of("hex").unwrap();
    let precomputed = d.segment().unwrap();

    assert_eq!(live, precomputed);
    assert_eq!(live, vec![0, 1, 0, 0, 0, 0, 0, 0]);
    let modes: Vec<_> = d.session().history().iter().map(|r| r.mode).collect();
    assert_eq!(
        modes,
        vec![PipelineMode::LiveGeometry, PipelineMode::PrecomputedGraph]
    );
}

#[test]
fn test_graph_mode_needs_blob() {
    let mut d = SessionDriver::mock().unwrap();
    d.mode(PipelineMode::PrecomputedGraph).unwrap();
    d.scripted_model(2, vec![0]);
    let err = d.segment().unwrap_err().to_string();
    assert!(err.contains("precomputed graph file"), "{}", err);
}

// ── Batch ───────────────────────────────────────────────────────────────

#[test]
fn test_batch_over_fixture_solids() {
    let mut d = SessionDriver::mock().unwrap();
    d.scripted_model(2, vec![1]);
    let (total, succeeded, failed) = d.batch("out").unwrap();
    assert_eq!((total, succeeded, failed), (3, 3, 0));

    let labels = label_engine::read_label_file(&d.workspace.path("out/box.seg")).unwrap();
    assert_eq!(labels, vec![1; 6]);
    assert!(d.labels().is_none());
    assert!(d.session().history().is_empty());
}

#[test]
fn test_label_file_mode_cannot_batch() {
    let mut d = SessionDriver::mock().unwrap();
    d.mode(PipelineMode::PrecomputedLabelFile).unwrap();
    assert!(d.batch("out").is_err());
}

// ── History limits ──────────────────────────────────────────────────────

#[test]
fn test_history_evicts_oldest_after_fifty_runs() {
    let names = ["box", "tri", "hex"];
    let mut d = SessionDriver::mock().unwrap();
    d.scripted_model(2, vec![0, 1]);
    for i in 0..51 {
        d.geometry(names[i % 3]).unwrap();
        d.segment().unwrap();
    }

    assert_eq!(d.session().history().len(), 50);
    let expected: Vec<String> = (1..51).map(|i| format!("{}.step", names[i % 3])).collect();
    let expected: Vec<&str> = expected.iter().map(String::as_str).collect();
    assert_history_geometry(d.session(), &expected, "after 51 runs").unwrap();
    d.assert_checks_pass().unwrap();
}

// ── Export ──────────────────────────────────────────────────────────────

#[test]
fn test_exports_in_every_format() {
    let mut d = SessionDriver::mock().unwrap();
    d.scripted_model(2, vec![0, 0, 1, 1, 1]);
    d.geometry("tri").unwrap();
    d.segment().unwrap();

    let (json_path, _) = d.export("result.json").unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(json_path).unwrap()).unwrap();
    assert_eq!(value["total_faces"], 5);
    assert_eq!(value["step_file"], "tri.step");

    let (txt_path, _) = d.export("result.txt").unwrap();
    let text = std::fs::read_to_string(txt_path).unwrap();
    assert!(text.contains("Category 2: 3 (60.0%)"));

    let (seg_path, _) = d.export("result.seg").unwrap();
    assert_eq!(
        label_engine::read_label_file(&seg_path).unwrap(),
        vec![0, 0, 1, 1, 1]
    );
}
