use super::*;

#[test]
fn defaults_match_editor_behavior() {
    let cfg = EditorConfig::default();
    assert_eq!(cfg.background, Color::WHITE);
    assert_eq!(cfg.export_file_name, "protest-canvas.png");
    assert_eq!(cfg.overlay_max_side, 200.0);
    assert_eq!(cfg.image_position, Point::new(100.0, 100.0));
    assert_eq!(cfg.text.position, Point::new(50.0, 50.0));
    assert_eq!(cfg.text.font_size, 48.0);
    assert_eq!(cfg.text.width, 300.0);
    assert_eq!(cfg.text.color, Color::BLACK);
    cfg.validate().unwrap();
}

#[test]
fn partial_json_keeps_other_defaults() {
    let json = r#"{
        "background": "0 0% 96%",
        "export_file_name": "sign.png",
        "text": { "font_size": 64 }
    }"#;
    let cfg = EditorConfig::from_reader(json.as_bytes()).unwrap();
    assert_eq!(cfg.export_file_name, "sign.png");
    assert_eq!(cfg.text.font_size, 64.0);
    assert_eq!(cfg.text.width, 300.0);
    assert_eq!(cfg.background, Color::rgb(245, 245, 245));
}

#[test]
fn invalid_values_are_rejected() {
    let err = EditorConfig::from_reader(r#"{ "overlay_max_side": 0 }"#.as_bytes()).unwrap_err();
    assert!(matches!(err, PlacardError::Validation(_)));

    let err = EditorConfig::from_reader(r#"{ "background": "nope" }"#.as_bytes()).unwrap_err();
    assert!(matches!(err, PlacardError::Serde(_)));

    let mut cfg = EditorConfig::default();
    cfg.text.font_family = "  ".to_string();
    assert!(cfg.validate().is_err());
}

#[test]
fn from_path_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("placard.json");
    std::fs::write(&path, r#"{ "overlay_max_side": 150 }"#).unwrap();
    let cfg = EditorConfig::from_path(&path).unwrap();
    assert_eq!(cfg.overlay_max_side, 150.0);

    assert!(EditorConfig::from_path(dir.path().join("missing.json")).is_err());
}
