use gather_core::settings::{
    load_settings, load_settings_or_default, save_settings, GatherSettings, SettingsLayout,
};
use tempfile::tempdir;

#[test]
fn layout_places_settings_under_meta_dir() {
    let root = tempdir().unwrap();
    let layout = SettingsLayout::new(root.path());
    assert!(layout.settings_path.ends_with(".gather/settings.json"));
    assert!(!layout.meta_dir.exists(), "layout must not touch the filesystem");
}

#[test]
fn settings_round_trip_through_disk() {
    let root = tempdir().unwrap();
    let layout = SettingsLayout::new(root.path());
    let settings = GatherSettings { enable_gather: false, default_cell_marker: Some("#%%".into()) };
    save_settings(&layout, &settings).expect("save");
    assert_eq!(load_settings(&layout.settings_path).expect("load"), settings);
}

#[test]
fn missing_settings_fall_back_to_defaults() {
    let root = tempdir().unwrap();
    let layout = SettingsLayout::new(root.path());
    let settings = load_settings_or_default(&layout).expect("defaults");
    assert_eq!(settings, GatherSettings::default());
    assert_eq!(settings.cell_marker(), "# %%");
}

#[test]
fn partial_json_uses_field_defaults() {
    let settings: GatherSettings = serde_json::from_str("{}").expect("parse");
    assert!(settings.enable_gather);
    assert!(settings.default_cell_marker.is_none());
}

#[test]
fn blank_marker_falls_back_to_default() {
    let settings = GatherSettings::default().with_cell_marker(Some("   ".into()));
    assert_eq!(settings.cell_marker(), "# %%");
}

#[test]
fn malformed_settings_report_context() {
    let root = tempdir().unwrap();
    let layout = SettingsLayout::new(root.path());
    std::fs::create_dir_all(&layout.meta_dir).unwrap();
    std::fs::write(&layout.settings_path, "not json").unwrap();
    let err = load_settings(&layout.settings_path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse gather settings JSON"));
}
