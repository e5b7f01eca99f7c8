//! 設定の読み書きと環境変数による上書き

use snapgeo_common::{GeoBounds, LocationHint};
use snapgeo_ocr::config::{Config, ENV_LANG, ENV_TESSDATA, ENV_TESSERACT, ENV_TIMEOUT, ENV_WORKERS};
use snapgeo_ocr::error::SnapGeoError;
use std::collections::HashMap;
use std::path::PathBuf;
use tempfile::tempdir;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> =
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_defaults() {
    let config = Config::default();
    assert!(config.tesseract_path.is_none());
    assert_eq!(config.language, "eng");
    assert!(config.max_workers >= 1);
    assert_eq!(config.request_timeout_seconds, 120);
    assert_eq!(config.bounds, GeoBounds::INDONESIA);
    assert_eq!(config.fragment_policy.min_digits, 4);
    assert_eq!(config.fragment_policy.min_sources, 2);
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = tempdir().unwrap();
    let config = Config::load_from(&dir.path().join("config.json")).unwrap();
    assert_eq!(config.language, "eng");
}

#[test]
fn test_save_and_load_roundtrip_creates_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("snapgeo").join("config.json");

    let mut config = Config::default();
    config.tesseract_path = Some(PathBuf::from("/opt/tesseract/bin/tesseract"));
    config.max_workers = 3;
    config.extra_locations.push(LocationHint::new("Wonogiri", -7.81, 110.92));
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded.tesseract_path, config.tesseract_path);
    assert_eq!(loaded.max_workers, 3);
    assert_eq!(loaded.extra_locations, config.extra_locations);
}

#[test]
fn test_partial_file_fills_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"language": "ind", "request_timeout_seconds": 30}"#).unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.language, "ind");
    assert_eq!(config.request_timeout_seconds, 30);
    assert_eq!(config.bounds, GeoBounds::INDONESIA);
}

#[test]
fn test_broken_file_is_json_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(Config::load_from(&path), Err(SnapGeoError::JsonParse(_))));
}

#[test]
fn test_env_overrides() {
    let config = Config::default()
        .with_env_overrides(env(&[
            (ENV_TESSERACT, "/usr/local/bin/tesseract"),
            (ENV_TESSDATA, "/usr/share/tessdata"),
            (ENV_LANG, "eng+ind"),
            (ENV_WORKERS, " 2 "),
            (ENV_TIMEOUT, "45"),
        ]))
        .unwrap();

    assert_eq!(config.tesseract_path, Some(PathBuf::from("/usr/local/bin/tesseract")));
    assert_eq!(config.tessdata_dir, Some(PathBuf::from("/usr/share/tessdata")));
    assert_eq!(config.language, "eng+ind");
    assert_eq!(config.max_workers, 2);
    assert_eq!(config.request_timeout_seconds, 45);
}

#[test]
fn test_empty_env_values_are_ignored() {
    let config = Config::default().with_env_overrides(env(&[(ENV_LANG, "")])).unwrap();
    assert_eq!(config.language, "eng");
}

#[test]
fn test_invalid_env_numbers_are_rejected() {
    let err = Config::default().with_env_overrides(env(&[(ENV_WORKERS, "many")])).unwrap_err();
    assert!(matches!(err, SnapGeoError::Config(_)));

    let err = Config::default().with_env_overrides(env(&[(ENV_WORKERS, "0")])).unwrap_err();
    assert!(matches!(err, SnapGeoError::Config(_)));
}

#[test]
fn test_invalid_bounds_are_rejected() {
    let mut config = Config::default();
    config.bounds = GeoBounds { min_lat: 10.0, max_lat: -10.0, min_lon: 95.0, max_lon: 141.0 };
    assert!(matches!(config.validate(), Err(SnapGeoError::Common(_))));
    assert!(config.cascade().is_err());
}

#[test]
fn test_cascade_includes_extra_locations() {
    let mut config = Config::default();
    config.extra_locations.push(LocationHint::new("Wonogiri", -7.81, 110.92));

    let cascade = config.cascade().unwrap();
    assert!(cascade.gazetteer.entries().iter().any(|h| h.name == "Wonogiri"));
    assert_eq!(cascade.bounds, config.bounds);
}
