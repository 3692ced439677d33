//! Integrationstests für Track-Dateien:
//! - Fixtures laden und als Strecke aufbauen
//! - Export → Datei → Import bleibt verlustfrei
//! - Szene der CLI ist als JSON serialisierbar

use race_track_editor::track_file::is_looped_layout;
use race_track_editor::{
    load_track_file, parse_track_json, save_track_file, write_track_json, CurveEditor,
    EditorOptions, MemoryScene, SceneObjectKind,
};
use std::path::Path;

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn editor_from_fixture(name: &str) -> CurveEditor<MemoryScene> {
    let points = load_track_file(&fixture(name)).expect("Fixture lesbar");
    let mut editor = CurveEditor::new(MemoryScene::new(), EditorOptions::default());
    editor.load_from_points(&points).expect("Fixture ist gültige Strecke");
    editor
}

// ─── Laden ──────────────────────────────────────────────────────────

#[test]
fn test_ovale_strecke_ist_geschlossen() {
    let editor = editor_from_fixture("oval_track.json");
    let track = editor.track();
    assert!(track.is_looped());
    assert_eq!(track.num_points(), 4);
    assert_eq!(track.num_segments(), 4);
    assert_eq!(editor.host().count_of(SceneObjectKind::RoadMesh), 4);
}

#[test]
fn test_offene_strecke_hat_start_und_ziel() {
    let editor = editor_from_fixture("open_track.json");
    let track = editor.track();
    assert!(!track.is_looped());
    assert_eq!(track.num_points(), 4);
    assert_eq!(track.num_segments(), 3);

    let scene = editor.host();
    assert_eq!(scene.count_of(SceneObjectKind::StartCap), 1);
    assert_eq!(scene.count_of(SceneObjectKind::FinishCap), 1);
    assert_eq!(scene.count_of(SceneObjectKind::StartBracket), 4);
}

// ─── Roundtrip ──────────────────────────────────────────────────────

#[test]
fn test_export_datei_import_roundtrip() {
    for name in ["oval_track.json", "open_track.json"] {
        let editor = editor_from_fixture(name);
        let exported = editor.export_points();

        let path = std::env::temp_dir().join(format!("race_track_editor_roundtrip_{name}"));
        save_track_file(&path, &exported).expect("Datei schreibbar");
        let reloaded = load_track_file(&path).expect("Datei lesbar");
        let _ = std::fs::remove_file(&path);

        assert_eq!(reloaded, exported, "Roundtrip für {}", name);
        assert_eq!(is_looped_layout(&reloaded), editor.track().is_looped());
    }
}

#[test]
fn test_json_string_roundtrip_nach_bearbeitung() {
    let mut editor = editor_from_fixture("open_track.json");
    editor
        .new_point(glam::Vec2::new(0.0, 1800.0), None, None)
        .expect("Anhängen möglich");

    let json = write_track_json(&editor.export_points()).expect("serialisierbar");
    let points = parse_track_json(&json).expect("parsebar");

    let mut copy = CurveEditor::new(MemoryScene::new(), EditorOptions::default());
    copy.load_from_points(&points).expect("gültige Strecke");
    assert_eq!(copy.track().num_points(), 5);
    assert_eq!(copy.export_points(), editor.export_points());
}

// ─── Szenen-Export ──────────────────────────────────────────────────

#[test]
fn test_szene_als_json() {
    let editor = editor_from_fixture("oval_track.json");
    let object_count = editor.host().len();
    let json = serde_json::to_value(editor.host()).expect("Szene serialisierbar");

    let objects = json["objects"].as_object().expect("Objekt-Map");
    assert_eq!(objects.len(), object_count);
    let meshes = objects
        .values()
        .filter(|object| object["kind"] == "road_mesh")
        .count();
    assert_eq!(meshes, 4);
    assert!(objects
        .values()
        .filter(|object| object["kind"] == "road_mesh")
        .all(|object| object["mesh"]["columns"] == 2));
}
