use std::path::{Path, PathBuf};
use std::sync::Arc;

use face_infer::MockModel;
use geom_sampler::{MockSampler, MockSolid};
use label_engine::*;
use label_format::*;
use seg_types::{palette_color, PipelineMode, Rgb};

// ── Helper Functions ────────────────────────────────────────────────

fn sampler() -> Arc<MockSampler> {
    Arc::new(MockSampler::new().with_solid("parts/tri.step", MockSolid::prism(3, 1.0, 1.0)))
}

fn config(history: HistoryConfig) -> SessionConfig {
    SessionConfig {
        history,
        ..SessionConfig::ephemeral()
    }
}

/// Session holding the result `[0, 0, 1, 1, 1]` for the 5-face prism.
fn segmented(history: HistoryConfig) -> Session {
    let mut session = open_session(config(history), sampler());
    session.set_model(
        Arc::new(MockModel::new("scripted", 2, vec![0, 0, 1, 1, 1])),
        PathBuf::from("models/scripted.ckpt"),
    );
    session.set_geometry(PathBuf::from("parts/tri.step"));
    session.process().unwrap();
    session
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

// ── Export ──────────────────────────────────────────────────────────

#[test]
fn json_report_fields() {
    let dir = tempfile::tempdir().unwrap();
    let session = segmented(HistoryConfig::in_memory());
    let path = dir.path().join("result.json");
    assert_eq!(export_session(&session, &path, None).unwrap(), ExportFormat::Json);

    let value: serde_json::Value = serde_json::from_str(&read(&path)).unwrap();
    assert_eq!(value["model"], "scripted.ckpt");
    assert_eq!(value["step_file"], "tri.step");
    assert_eq!(value["total_faces"], 5);
    assert_eq!(value["label_distribution"]["Category 1"], 2);
    assert_eq!(value["label_distribution"]["Category 2"], 3);
    assert_eq!(value["face_labels"], serde_json::json!([0, 0, 1, 1, 1]));
    assert_eq!(value["label_names"], serde_json::json!(["Category 1", "Category 2"]));
    let first = palette_color(0);
    assert_eq!(
        value["label_colors"][0],
        serde_json::json!([first.r(), first.g(), first.b()])
    );
}

#[test]
fn json_distribution_follows_taxonomy_order() {
    let mut session = segmented(HistoryConfig::in_memory());
    let names: Vec<String> = ["Wall", "Boss", "Arc"].iter().map(|s| s.to_string()).collect();
    session.replace_taxonomy(&names, &[]).unwrap();

    let json = render_export(&session, ExportFormat::Json).unwrap();
    let wall = json.find("\"Wall\": 2").unwrap();
    let boss = json.find("\"Boss\": 3").unwrap();
    let arc = json.find("\"Arc\": 0").unwrap();
    assert!(wall < boss && boss < arc, "{}", json);

    let reparsed: ExportReport = serde_json::from_str(&json).unwrap();
    assert_eq!(reparsed.label_distribution.names(), vec!["Wall", "Boss", "Arc"]);
}

#[test]
fn json_report_parses_back() {
    let session = segmented(HistoryConfig::in_memory());
    let report = ExportReport::from_session(&session).unwrap();
    let reparsed: ExportReport = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(reparsed, report);
}

#[test]
fn text_report_lists_non_empty_categories() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = segmented(HistoryConfig::in_memory());
    session
        .replace_taxonomy(
            &["Flat".to_string(), "Side".to_string(), "Unused".to_string()],
            &[],
        )
        .unwrap();
    let path = dir.path().join("result.txt");
    export_session(&session, &path, None).unwrap();

    let text = read(&path);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Face Segmentation Report");
    assert_eq!(lines[1], "=".repeat(40));
    assert_eq!(lines[2], "Model file: scripted.ckpt");
    assert_eq!(lines[3], "STEP file: tri.step");
    assert_eq!(lines[4], "Total faces: 5");
    assert_eq!(lines[5], "");
    assert_eq!(lines[6], "Category distribution:");
    assert_eq!(&lines[7..], &["Flat: 2 (40.0%)", "Side: 3 (60.0%)"]);
}

#[test]
fn text_report_without_model_says_unknown() {
    let dir = tempfile::tempdir().unwrap();
    let labels = dir.path().join("labels.seg");
    std::fs::write(&labels, "1\n0\n").unwrap();

    let mut session = open_session(config(HistoryConfig::in_memory()), sampler());
    session.set_mode(PipelineMode::PrecomputedLabelFile);
    session.set_label_file(labels).unwrap();
    session.process().unwrap();

    let text = render_export(&session, ExportFormat::Text).unwrap();
    assert!(text.contains("Model file: Unknown\n"));
    assert!(text.contains("STEP file: Unknown\n"));
}

#[test]
fn raw_label_export_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let session = segmented(HistoryConfig::in_memory());
    let path = dir.path().join("result.seg");
    export_session(&session, &path, None).unwrap();
    assert_eq!(read(&path), "0\n0\n1\n1\n1\n");
    assert_eq!(read_label_file(&path).unwrap(), vec![0, 0, 1, 1, 1]);
}

#[test]
fn explicit_format_overrides_extension() {
    let dir = tempfile::tempdir().unwrap();
    let session = segmented(HistoryConfig::in_memory());
    let path = dir.path().join("result.out");
    export_session(&session, &path, Some(ExportFormat::RawLabels)).unwrap();
    assert_eq!(read(&path).lines().count(), 5);
}

#[test]
fn export_without_result_fails() {
    let dir = tempfile::tempdir().unwrap();
    let session = open_session(config(HistoryConfig::in_memory()), sampler());
    let path = dir.path().join("result.json");
    let err = export_session(&session, &path, None).unwrap_err();
    assert!(matches!(err, FormatError::Engine(EngineError::NoResult)));
    assert!(!path.exists());
}

#[test]
fn export_to_missing_directory_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let session = segmented(HistoryConfig::in_memory());
    let path = dir.path().join("missing").join("result.json");
    assert!(matches!(
        export_session(&session, &path, None),
        Err(FormatError::Io { .. })
    ));
}

// ── Taxonomy Files ──────────────────────────────────────────────────

#[test]
fn taxonomy_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let taxonomy = LabelTaxonomy::normalized(
        &["Hole".to_string(), "Fillet".to_string(), "".to_string()],
        &[vec![255, 0, 0], vec![0, 128, 0]],
    );
    let path = dir.path().join("labels.json");
    write_taxonomy(&path, &taxonomy).unwrap();

    let reloaded = read_mapping_file(&path).unwrap();
    assert_eq!(reloaded.names(), taxonomy.names());
    assert_eq!(reloaded.colors(), taxonomy.colors());
    assert_eq!(reloaded.colors()[0], Rgb::new(255, 0, 0));
}

#[test]
fn written_taxonomy_loads_into_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("labels.json");
    write_taxonomy(&path, &LabelTaxonomy::placeholders(4)).unwrap();

    let mut session = open_session(config(HistoryConfig::in_memory()), sampler());
    session.load_input(&path).unwrap();
    assert_eq!(session.taxonomy().len(), 4);
}

// ── History File ────────────────────────────────────────────────────

#[test]
fn absent_history_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let file = JsonHistoryFile::new(dir.path().join("history.json"));
    assert!(file.load().unwrap().is_empty());
}

#[test]
fn runs_are_persisted_and_reloaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("history.json");
    let session = segmented(HistoryConfig::at(&path));
    assert_eq!(session.history().len(), 1);
    assert!(path.exists());

    let reopened = open_session(config(HistoryConfig::at(&path)), sampler());
    assert_eq!(reopened.history().len(), 1);
    let record = reopened.history().get(0).unwrap();
    assert_eq!(record.labels, vec![0, 0, 1, 1, 1]);
    assert_eq!(record.geometry_name().as_deref(), Some("tri.step"));
    assert_eq!(record.auxiliary_name().as_deref(), Some("scripted.ckpt"));
}

#[test]
fn history_file_uses_record_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    segmented(HistoryConfig::at(&path));

    let value: serde_json::Value = serde_json::from_str(&read(&path)).unwrap();
    let record = &value[0];
    for key in ["id", "time", "mode", "step_path", "extra_path", "label_info", "labels"] {
        assert!(record.get(key).is_some(), "missing {}", key);
    }
}

#[test]
fn corrupt_history_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        JsonHistoryFile::new(&path).load(),
        Err(EngineError::IoFailure { .. })
    ));
    let session = open_session(config(HistoryConfig::at(&path)), sampler());
    assert!(session.history().is_empty());
}

#[test]
fn clearing_history_rewrites_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    let mut session = segmented(HistoryConfig::at(&path));
    session.clear_history().unwrap();
    assert_eq!(read(&path).trim(), "[]");
}
