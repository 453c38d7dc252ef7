//! Async stratum loading from files.

use super::test_utils::{group_with_two_items, members, stratum};
use catalog_strata::load::{load_all, load_stratum, JsonFileSource, StratumSource};
use catalog_strata::stratum::common_strata::*;
use catalog_strata::CatalogError;
use serde_json::json;
use tempfile::TempDir;

fn write_staged(dir: &TempDir, name: &str, value: serde_json::Value) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, value.to_string()).unwrap();
    path
}

#[tokio::test]
async fn test_loaded_values_sit_below_user_edits() {
    let dir = TempDir::new().unwrap();
    let mut catalog = group_with_two_items();
    catalog
        .set_raw_value("a", &stratum(USER), "opacity", json!(0.9))
        .unwrap();

    let path = write_staged(
        &dir,
        "a.json",
        json!({"entry": "a", "stratum": LOAD, "values": {"opacity": 0.1, "url": "https://tiles"}}),
    );
    load_stratum(&mut catalog, &JsonFileSource::new(&path))
        .await
        .unwrap();

    assert_eq!(catalog.resolve("a", "opacity").unwrap().as_f64(), Some(0.9));
    assert_eq!(catalog.resolve("a", "url").unwrap().as_str(), Some("https://tiles"));
}

#[tokio::test]
async fn test_invalid_staged_value_applies_nothing() {
    let dir = TempDir::new().unwrap();
    let mut catalog = group_with_two_items();
    let path = write_staged(
        &dir,
        "a.json",
        json!({"entry": "a", "stratum": LOAD, "values": {"url": "https://tiles", "opacity": "half"}}),
    );
    let err = load_stratum(&mut catalog, &JsonFileSource::new(&path))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Stratum(_)));
    assert!(catalog.resolve("a", "url").unwrap().is_unset());
}

#[tokio::test]
async fn test_load_all_reports_each_source() {
    let dir = TempDir::new().unwrap();
    let mut catalog = group_with_two_items();
    let good = write_staged(
        &dir,
        "g.json",
        json!({"entry": "g", "stratum": LOAD, "values": {"name": "Loaded", "members": ["b"]}}),
    );
    let malformed = dir.path().join("broken.json");
    std::fs::write(&malformed, "{not json").unwrap();

    let sources: Vec<Box<dyn StratumSource>> = vec![
        Box::new(JsonFileSource::new(&good)),
        Box::new(JsonFileSource::new(&malformed)),
    ];
    let results = load_all(&mut catalog, &sources).await;
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(CatalogError::LoadFailed(_))));

    assert_eq!(catalog.resolve("g", "name").unwrap().as_str(), Some("Loaded"));
    assert_eq!(members(&catalog, "g"), vec!["b", "a"]);
}
