use super::*;

#[test]
fn empty_object_gives_defaults() {
    let cfg = RenderConfig::from_reader("{}".as_bytes()).unwrap();
    assert_eq!(cfg, RenderConfig::default());
    assert_eq!(cfg.canvas, Canvas::default());
    assert_eq!(cfg.background.hex(), "#222222");
    assert_eq!(cfg.background_rgba8(), [0x22, 0x22, 0x22, 255]);
}

#[test]
fn partial_override() {
    let json = r##"{"canvas":{"width":320,"height":180},"fps":{"num":24,"den":1},"background":"#000"}"##;
    let cfg = RenderConfig::from_reader(json.as_bytes()).unwrap();
    assert_eq!(cfg.canvas.width, 320);
    assert_eq!(cfg.fps, Fps::new(24, 1).unwrap());
    assert_eq!(cfg.background, Color::BLACK);
    assert_eq!(cfg.reference_height, DEFAULT_REFERENCE_HEIGHT);
}

#[test]
fn invalid_values_are_rejected() {
    for json in [
        r#"{"canvas":{"width":0,"height":10}}"#,
        r#"{"fps":{"num":30,"den":0}}"#,
        r#"{"reference_height":-1}"#,
        r##"{"background":"#zzzzzz"}"##,
        r#"{"unknown":1}"#,
        "not json",
    ] {
        assert!(RenderConfig::from_reader(json.as_bytes()).is_err(), "{json}");
    }
}

#[test]
fn round_trips_through_a_file() {
    let path = std::env::temp_dir().join(format!("recalc-config-{}.json", std::process::id()));
    let cfg = RenderConfig {
        font_dirs: vec![PathBuf::from("fonts")],
        ..RenderConfig::default()
    };
    std::fs::write(&path, serde_json::to_string(&cfg).unwrap()).unwrap();
    assert_eq!(RenderConfig::from_path(&path).unwrap(), cfg);
    std::fs::remove_file(&path).unwrap();

    assert!(RenderConfig::from_path(&path).is_err());
}
