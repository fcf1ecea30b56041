use std::fs;
use std::path::PathBuf;

use gridmap::{Config, Error};

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("gridmap-config-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn file_then_env_then_validate() {
    let path = temp_file("layered.json",
                         r#"{"map": {"viewport": {"width": 640.0, "height": 480.0},
                                     "grid_spacing": 25.0, "auto_center": true},
                             "sensors": {"gps_interval_ms": 250}}"#);
    let config = Config::load_with(Some(&path), |key| match key {
            "GRIDMAP_HEIGHT" => Some("360".to_string()),
            "GRIDMAP_AUTO_CENTER" => Some("false".to_string()),
            _ => None,
        })
        .unwrap();
    assert_eq!(config.map.viewport.width, 640.0);
    assert_eq!(config.map.viewport.height, 360.0);
    assert_eq!(config.map.grid_spacing, 25.0);
    assert!(!config.map.auto_center);
    assert_eq!(config.sensors.gps_interval_ms, 250);
    assert_eq!(config.sensors.heading_interval_ms, 500);
    fs::remove_file(&path).unwrap();
}

#[test]
fn no_file_gives_defaults() {
    let config = Config::load_with(None::<&str>, no_env).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn missing_file_is_io_error() {
    let path = std::env::temp_dir().join("gridmap-config-does-not-exist.json");
    assert!(matches!(Config::load(Some(&path)), Err(Error::Io(_))));
}

#[test]
fn invalid_json_is_json_error() {
    let path = temp_file("broken.json", "{\"map\": {\"grid_spacing\": ");
    assert!(matches!(Config::load_with(Some(&path), no_env), Err(Error::Json(_))));
    fs::remove_file(&path).unwrap();
}

#[test]
fn file_values_are_validated() {
    let path = temp_file("negative.json", r#"{"map": {"grid_spacing": -5.0}}"#);
    assert!(matches!(Config::load_with(Some(&path), no_env), Err(Error::Config(_))));
    fs::remove_file(&path).unwrap();
}

#[test]
fn env_can_break_a_valid_file() {
    let path = temp_file("valid.json", "{}");
    let err = Config::load_with(Some(&path), |key| {
            if key == "GRIDMAP_WIDTH" { Some("0".to_string()) } else { None }
        })
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    fs::remove_file(&path).unwrap();
}
