//! Membership: tombstones, re-adds, cycles and absolute deletion.

use super::test_utils::{empty_catalog, group_with_two_items, id, members, stratum};
use catalog_strata::schema::builtin::{GROUP_KIND, ITEM_KIND};
use catalog_strata::stratum::common_strata::*;
use catalog_strata::{CatalogError, NewEntry};
use serde_json::json;

#[test]
fn test_tombstone_then_readd_in_higher_stratum() {
    let mut catalog = group_with_two_items();
    let groups = catalog.remove_entry(&id("a"), &stratum(USER)).unwrap();
    assert_eq!(groups, vec![id("g")]);
    assert_eq!(members(&catalog, "g"), vec!["b"]);

    catalog
        .add_member(&id("g"), &id("a"), &stratum(OVERRIDE))
        .unwrap();
    assert!(members(&catalog, "g").contains(&"a".to_string()));
}

#[test]
fn test_readd_then_tombstone_in_higher_stratum() {
    let mut catalog = group_with_two_items();
    catalog.remove_entry(&id("a"), &stratum(USER)).unwrap();
    catalog
        .add_member(&id("g"), &id("a"), &stratum(USER))
        .unwrap();
    assert!(members(&catalog, "g").contains(&"a".to_string()));

    catalog.remove_entry(&id("a"), &stratum(OVERRIDE)).unwrap();
    assert!(!members(&catalog, "g").contains(&"a".to_string()));

    // Lower strata are untouched by removal
    let definition = catalog
        .entry("g")
        .unwrap()
        .strata()
        .raw_value(DEFINITION, "members")
        .cloned();
    assert_eq!(definition, Some(json!(["a", "b"])));
}

#[test]
fn test_tombstone_in_lower_stratum_does_not_hide_higher_reference() {
    let mut catalog = group_with_two_items();
    catalog
        .add_member(&id("g"), &id("a"), &stratum(OVERRIDE))
        .unwrap();
    catalog.remove_entry(&id("a"), &stratum(USER)).unwrap();
    assert!(members(&catalog, "g").contains(&"a".to_string()));
}

#[test]
fn test_remove_entry_touches_every_parent() {
    let mut catalog = group_with_two_items();
    catalog
        .add_entry(NewEntry::new("h", GROUP_KIND), None, &stratum(DEFINITION))
        .unwrap();
    catalog
        .add_member(&id("h"), &id("a"), &stratum(DEFINITION))
        .unwrap();

    let mut groups = catalog.remove_entry(&id("a"), &stratum(USER)).unwrap();
    groups.sort();
    assert_eq!(groups, vec![id("g"), id("h")]);
    assert!(catalog.parents_of(&id("a")).is_empty());
    assert!(catalog.contains("a"));
}

#[test]
fn test_cycle_rejection_leaves_membership_unchanged() {
    let mut catalog = empty_catalog();
    let definition = stratum(DEFINITION);
    catalog
        .add_entry(NewEntry::new("A", GROUP_KIND), None, &definition)
        .unwrap();
    catalog
        .add_entry(NewEntry::new("mid", GROUP_KIND), Some(&id("A")), &definition)
        .unwrap();
    catalog
        .add_entry(NewEntry::new("B", GROUP_KIND), Some(&id("mid")), &definition)
        .unwrap();

    let before_a = catalog.entry("A").unwrap().to_document();
    let before_b = catalog.entry("B").unwrap().to_document();

    let err = catalog
        .add_entry(NewEntry::new("A", GROUP_KIND), Some(&id("B")), &stratum(USER))
        .unwrap_err();
    assert!(matches!(err, CatalogError::Cycle { .. }));

    assert_eq!(catalog.entry("A").unwrap().to_document(), before_a);
    assert_eq!(catalog.entry("B").unwrap().to_document(), before_b);
    assert_eq!(members(&catalog, "B"), Vec::<String>::new());
}

#[test]
fn test_cycle_through_staged_write_is_rolled_back() {
    let mut catalog = empty_catalog();
    let definition = stratum(DEFINITION);
    catalog
        .add_entry(NewEntry::new("A", GROUP_KIND), None, &definition)
        .unwrap();
    catalog
        .add_entry(NewEntry::new("B", GROUP_KIND), Some(&id("A")), &definition)
        .unwrap();

    let mut staged = catalog_strata::load::StagedStratum::new("B", LOAD);
    staged.set("name", json!("Loaded B"));
    staged.set("members", json!(["A"]));
    let err = catalog.commit_staged(staged).unwrap_err();
    assert!(matches!(err, CatalogError::Cycle { .. }));

    let b = catalog.entry("B").unwrap();
    assert!(!b.strata().contains(LOAD));
    assert!(b.resolve("name").unwrap().is_unset());
}

#[test]
fn test_deleting_lower_tombstone_restores_member() {
    let mut catalog = group_with_two_items();
    catalog.remove_entry(&id("b"), &stratum(USER)).unwrap();
    assert_eq!(members(&catalog, "g"), vec!["a"]);
    catalog.delete_stratum("g", &stratum(USER)).unwrap();
    assert_eq!(members(&catalog, "g"), vec!["a", "b"]);
}

#[test]
fn test_delete_entry_leaves_dangling_reference() {
    let mut catalog = group_with_two_items();
    catalog.delete_entry(&id("a")).unwrap();
    assert_eq!(members(&catalog, "g"), vec!["a", "b"]);

    let children: Vec<String> = catalog
        .resolve_children("g")
        .unwrap()
        .iter()
        .map(|e| e.id().to_string())
        .collect();
    assert_eq!(children, vec!["b"]);
    assert_eq!(catalog.diagnostics().len(), 1);

    assert!(matches!(
        catalog.delete_entry(&id("a")),
        Err(CatalogError::EntryNotFound(_))
    ));
}

#[test]
fn test_items_cannot_have_members() {
    let mut catalog = group_with_two_items();
    let err = catalog
        .add_member(&id("a"), &id("b"), &stratum(USER))
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotAGroup(_)));

    let err = catalog
        .add_entry(NewEntry::new("x", ITEM_KIND), Some(&id("missing")), &stratum(USER))
        .unwrap_err();
    assert!(matches!(err, CatalogError::EntryNotFound(_)));
    assert!(!catalog.contains("x"));
}
