//! Catalog documents: round trips, tolerant loading and file output.

use super::test_utils::{group_with_two_items, id, members, stratum};
use catalog_strata::persist::{CatalogDocument, LoadWarning};
use catalog_strata::stratum::common_strata::*;
use catalog_strata::{Catalog, CatalogContext};
use serde_json::json;
use tempfile::TempDir;

#[test]
fn test_round_trip_preserves_resolution() {
    let mut catalog = group_with_two_items();
    catalog.remove_entry(&id("a"), &stratum(USER)).unwrap();
    catalog
        .set_raw_value("b", &stratum(USER), "opacity", json!(0.3))
        .unwrap();
    catalog.add_share_key("b", "legacy-b").unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.json");
    catalog.to_document().to_path(&path).unwrap();

    let (reloaded, warnings) = Catalog::from_document(
        CatalogContext::builtin().unwrap(),
        CatalogDocument::from_path(&path).unwrap(),
    );
    assert!(warnings.is_empty());
    assert_eq!(members(&reloaded, "g"), vec!["b"]);
    assert_eq!(reloaded.resolve("b", "opacity").unwrap().as_f64(), Some(0.3));
    assert_eq!(
        reloaded
            .get_by_id_or_share_key("legacy-b")
            .map(|e| e.id().to_string()),
        Some("b".to_string())
    );
}

#[test]
fn test_document_shape() {
    let catalog = group_with_two_items();
    let value = serde_json::to_value(catalog.to_document()).unwrap();
    assert_eq!(
        value["entries"][0],
        json!({"id": "g", "type": "group", "strata": {"definition": {"members": ["a", "b"]}}})
    );
    assert_eq!(value["entries"][1], json!({"id": "a", "type": "item", "strata": {}}));
}

#[test]
fn test_members_applied_after_all_entries_exist() {
    // The group precedes its members and one member refers back to the group
    let document: CatalogDocument = serde_json::from_value(json!({
        "entries": [
            {"id": "outer", "type": "group", "strata": {"definition": {"members": ["inner"]}}},
            {"id": "inner", "type": "group", "strata": {"definition": {"members": ["leaf"]}, "user": {"members": ["outer"]}}},
            {"id": "leaf", "type": "item"}
        ]
    }))
    .unwrap();
    let (catalog, warnings) = Catalog::from_document(CatalogContext::builtin().unwrap(), document);

    assert_eq!(warnings.len(), 1);
    match &warnings[0] {
        LoadWarning::RejectedValue {
            entry, attribute, ..
        } => {
            assert_eq!(entry.as_str(), "inner");
            assert_eq!(attribute, "members");
        }
        other => panic!("unexpected warning: {other}"),
    }
    assert_eq!(members(&catalog, "outer"), vec!["inner"]);
    assert_eq!(members(&catalog, "inner"), vec!["leaf"]);
}

#[test]
fn test_tombstones_accepted_from_documents_only() {
    let document: CatalogDocument = serde_json::from_value(json!({
        "entries": [
            {"id": "g", "type": "group", "strata": {
                "definition": {"members": ["a"]},
                "user": {"members": [{"removed": "a"}]}
            }},
            {"id": "a", "type": "item"}
        ]
    }))
    .unwrap();
    let (mut catalog, warnings) =
        Catalog::from_document(CatalogContext::builtin().unwrap(), document);
    assert!(warnings.is_empty());
    assert!(members(&catalog, "g").is_empty());

    assert!(catalog
        .set_raw_value("g", &stratum(OVERRIDE), "members", json!([{"removed": "b"}]))
        .is_err());
}

#[test]
fn test_duplicate_and_share_key_conflicts_are_warnings() {
    let document: CatalogDocument = serde_json::from_value(json!({
        "entries": [
            {"id": "a", "type": "item", "shareKeys": ["k"]},
            {"id": "b", "type": "item", "shareKeys": ["k"]},
            {"id": "a", "type": "group"}
        ]
    }))
    .unwrap();
    let (catalog, warnings) = Catalog::from_document(CatalogContext::builtin().unwrap(), document);
    assert_eq!(catalog.len(), 2);
    assert!(matches!(warnings[0], LoadWarning::RejectedShareKey { .. }));
    assert!(matches!(warnings[1], LoadWarning::DuplicateEntry { .. }));
    assert_eq!(catalog.entry("a").unwrap().kind(), "item");
}

#[test]
fn test_unknown_attribute_in_document_is_skipped() {
    let document: CatalogDocument = serde_json::from_value(json!({
        "entries": [
            {"id": "layer", "type": "item", "strata": {
                "definition": {"colour": "red", "opacity": 0.3}
            }}
        ]
    }))
    .unwrap();
    let (catalog, warnings) = Catalog::from_document(CatalogContext::builtin().unwrap(), document);

    assert_eq!(warnings.len(), 1);
    match &warnings[0] {
        LoadWarning::RejectedValue {
            entry, attribute, ..
        } => {
            assert_eq!(entry.as_str(), "layer");
            assert_eq!(attribute, "colour");
        }
        other => panic!("unexpected warning: {other}"),
    }
    assert_eq!(catalog.resolve("layer", "opacity").unwrap().as_f64(), Some(0.3));

    let saved = serde_json::to_value(catalog.to_document()).unwrap();
    assert_eq!(
        saved["entries"][0]["strata"],
        json!({"definition": {"opacity": 0.3}})
    );
    let (reloaded, warnings) = Catalog::from_document(
        CatalogContext::builtin().unwrap(),
        serde_json::from_value(saved).unwrap(),
    );
    assert!(warnings.is_empty());
    assert!(reloaded
        .entry("layer")
        .unwrap()
        .strata()
        .raw_value(DEFINITION, "colour")
        .is_none());
}
