//! Resolution across strata: precedence, defaults, merge policies and memoization.

use super::test_utils::{empty_catalog, group_with_two_items, id, members, stratum};
use catalog_strata::config::CatalogConfig;
use catalog_strata::resolve::resolve_attribute;
use catalog_strata::schema::builtin::{GROUP_KIND, ITEM_KIND};
use catalog_strata::schema::SchemaRegistry;
use catalog_strata::stratum::common_strata::*;
use catalog_strata::{NewEntry, Resolved};
use serde_json::json;

#[test]
fn test_opacity_scenario() {
    let mut catalog = empty_catalog();
    catalog
        .add_entry(NewEntry::new("layer", ITEM_KIND), None, &stratum(DEFINITION))
        .unwrap();
    assert_eq!(catalog.resolve("layer", "opacity").unwrap().as_f64(), Some(1.0));

    catalog
        .set_raw_value("layer", &stratum(DEFINITION), "opacity", json!(0.5))
        .unwrap();
    assert_eq!(catalog.resolve("layer", "opacity").unwrap().as_f64(), Some(0.5));

    catalog
        .set_raw_value("layer", &stratum(USER), "opacity", json!(0.8))
        .unwrap();
    assert_eq!(catalog.resolve("layer", "opacity").unwrap().as_f64(), Some(0.8));

    assert!(catalog.delete_stratum("layer", &stratum(USER)).unwrap());
    assert_eq!(catalog.resolve("layer", "opacity").unwrap().as_f64(), Some(0.5));
    assert!(!catalog.delete_stratum("layer", &stratum(USER)).unwrap());
}

#[test]
fn test_precedence_law_ignores_lower_strata() {
    let mut catalog = empty_catalog();
    catalog
        .add_entry(NewEntry::new("layer", ITEM_KIND), None, &stratum(DEFINITION))
        .unwrap();
    for (lower, value) in [(DEFAULTS, "d"), (DEFINITION, "x"), (LOAD, "y"), (USER, "z")] {
        catalog
            .set_raw_value("layer", &stratum(lower), "url", json!(value))
            .unwrap();
    }
    catalog
        .set_raw_value("layer", &stratum(OVERRIDE), "url", json!("forced"))
        .unwrap();
    catalog
        .set_raw_value("layer", &stratum(UNDERRIDE), "url", json!("ignored"))
        .unwrap();
    assert_eq!(catalog.resolve("layer", "url").unwrap().as_str(), Some("forced"));
}

#[test]
fn test_delete_only_defining_stratum_falls_back() {
    let mut catalog = empty_catalog();
    catalog
        .add_entry(NewEntry::new("layer", ITEM_KIND), None, &stratum(DEFINITION))
        .unwrap();
    catalog
        .set_raw_value("layer", &stratum(LOAD), "url", json!("https://example.com"))
        .unwrap();
    catalog
        .set_raw_value("layer", &stratum(LOAD), "show", json!(false))
        .unwrap();

    catalog.delete_stratum("layer", &stratum(LOAD)).unwrap();
    assert_eq!(catalog.resolve("layer", "url").unwrap(), Resolved::Unset);
    assert_eq!(catalog.resolve("layer", "show").unwrap().as_bool(), Some(true));
}

#[test]
fn test_explicit_null_hides_lower_value() {
    let mut catalog = empty_catalog();
    catalog
        .add_entry(NewEntry::new("layer", ITEM_KIND), None, &stratum(DEFINITION))
        .unwrap();
    catalog
        .set_raw_value("layer", &stratum(DEFINITION), "description", json!("Rivers"))
        .unwrap();
    catalog
        .set_raw_value("layer", &stratum(USER), "description", json!(null))
        .unwrap();
    let resolved = catalog.resolve("layer", "description").unwrap();
    assert!(resolved.is_null());

    catalog
        .clear_raw_value("layer", &stratum(USER), "description")
        .unwrap();
    assert_eq!(
        catalog.resolve("layer", "description").unwrap().as_str(),
        Some("Rivers")
    );
}

#[test]
fn test_style_deep_merge_across_strata() {
    let mut catalog = empty_catalog();
    catalog
        .add_entry(NewEntry::new("layer", ITEM_KIND), None, &stratum(DEFINITION))
        .unwrap();
    catalog
        .set_raw_value(
            "layer",
            &stratum(DEFINITION),
            "style",
            json!({"fill": "blue", "stroke": {"color": "black", "width": 1}}),
        )
        .unwrap();
    catalog
        .set_raw_value("layer", &stratum(USER), "style", json!({"stroke": {"width": 3}}))
        .unwrap();
    assert_eq!(
        catalog.resolve("layer", "style").unwrap().value(),
        Some(&json!({"fill": "blue", "stroke": {"color": "black", "width": 3}}))
    );
}

#[test]
fn test_membership_scenario_c_before_b() {
    let mut catalog = group_with_two_items();
    catalog
        .add_entry(NewEntry::new("c", ITEM_KIND), None, &stratum(DEFINITION))
        .unwrap();
    catalog.remove_entry(&id("a"), &stratum(USER)).unwrap();
    catalog
        .add_member(&id("g"), &id("c"), &stratum(USER))
        .unwrap();

    assert_eq!(members(&catalog, "g"), vec!["c", "b"]);

    // Recomputing without the memo gives the same sequence
    let group = catalog.entry("g").unwrap();
    let descriptor = group.schema().describe("members").unwrap();
    let first = resolve_attribute(group.strata(), descriptor);
    let second = resolve_attribute(group.strata(), descriptor);
    assert_eq!(first, second);
    assert_eq!(first.value(), Some(&json!(["c", "b"])));

    let raw = catalog
        .entry("g")
        .unwrap()
        .strata()
        .raw_value(USER, "members")
        .cloned();
    assert_eq!(raw, Some(json!([{"removed": "a"}, "c"])));
}

#[test]
fn test_reference_introduced_by_two_strata_takes_higher_position() {
    let mut catalog = group_with_two_items();
    catalog
        .add_entry(NewEntry::new("c", ITEM_KIND), None, &stratum(DEFINITION))
        .unwrap();
    catalog
        .set_raw_value("g", &stratum(USER), "members", json!(["b", "c"]))
        .unwrap();
    assert_eq!(members(&catalog, "g"), vec!["b", "c", "a"]);
}

#[test]
fn test_resolution_is_memoized_and_invalidated_by_writes() {
    let mut catalog = empty_catalog();
    catalog
        .add_entry(NewEntry::new("layer", ITEM_KIND), None, &stratum(DEFINITION))
        .unwrap();
    catalog.resolve("layer", "opacity").unwrap();
    catalog.resolve("layer", "opacity").unwrap();
    assert_eq!(catalog.entry("layer").unwrap().cache_stats().hits, 1);

    catalog
        .set_raw_value("layer", &stratum(DEFINITION), "opacity", json!(0.1))
        .unwrap();
    assert!(!catalog.entry("layer").unwrap().is_cached("opacity"));
    assert_eq!(catalog.resolve("layer", "opacity").unwrap().as_f64(), Some(0.1));
}

#[test]
fn test_capabilities_follow_schema_not_kind() {
    let catalog = group_with_two_items();
    let capabilities = catalog.registry().capabilities();
    let group = catalog.entry("g").unwrap();
    let item = catalog.entry("a").unwrap();

    assert!(group.has_capability(capabilities, "group"));
    assert!(!group.has_capability(capabilities, "opacity"));
    assert!(item.has_capability(capabilities, "opacity"));
    assert!(item.has_capability(capabilities, "mappable"));
    assert!(!item.has_capability(capabilities, "nonexistent"));
}

#[test]
fn test_configured_load_stratum_sits_between_load_and_user() {
    let mut config = CatalogConfig::default();
    config.strata.load_strata = vec!["wms".to_string()];
    let mut catalog = config
        .new_catalog(SchemaRegistry::with_builtin().unwrap())
        .unwrap();
    catalog
        .add_entry(NewEntry::new("layer", ITEM_KIND), None, &stratum(DEFINITION))
        .unwrap();

    catalog
        .set_raw_value("layer", &stratum(LOAD), "opacity", json!(0.2))
        .unwrap();
    catalog
        .set_raw_value("layer", &stratum("wms"), "opacity", json!(0.4))
        .unwrap();
    assert_eq!(catalog.resolve("layer", "opacity").unwrap().as_f64(), Some(0.4));

    catalog
        .set_raw_value("layer", &stratum(USER), "opacity", json!(0.6))
        .unwrap();
    assert_eq!(catalog.resolve("layer", "opacity").unwrap().as_f64(), Some(0.6));

    let order: Vec<String> = catalog
        .entry("layer")
        .unwrap()
        .strata()
        .bottom_to_top()
        .map(|(id, _)| id.to_string())
        .collect();
    assert_eq!(order, vec![LOAD, "wms", USER]);
}

#[test]
fn test_unknown_stratum_and_attribute_are_rejected() {
    let mut catalog = empty_catalog();
    catalog
        .add_entry(NewEntry::new("g", GROUP_KIND), None, &stratum(DEFINITION))
        .unwrap();
    assert!(catalog
        .set_raw_value("g", &stratum("scratch"), "name", json!("x"))
        .is_err());
    assert!(catalog
        .set_raw_value("g", &stratum(USER), "opacity", json!(0.5))
        .is_err());
    assert!(catalog.resolve("g", "opacity").is_err());
    assert!(!catalog.entry("g").unwrap().strata().contains(USER));
}
