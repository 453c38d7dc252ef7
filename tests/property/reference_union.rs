//! Property-based tests for reference-array union

use catalog_strata::resolve::references::union_references;
use catalog_strata::EntryId;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashSet;

/// A stratum's reference array over a small id space, tombstones included.
fn layer() -> impl Strategy<Value = Value> {
    let reference = prop_oneof![
        3 => "[a-f]".prop_map(Value::from),
        1 => "[a-f]".prop_map(|id| json!({"removed": id})),
    ];
    prop::collection::vec(reference, 0..6).prop_map(Value::Array)
}

fn stack() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(layer(), 0..5)
}

#[test]
fn test_union_has_no_duplicates() {
    let mut runner = proptest::test_runner::TestRunner::default();
    runner
        .run(&stack(), |layers| {
            let resolved = union_references(layers.iter());
            let unique: HashSet<&EntryId> = resolved.iter().collect();
            prop_assert_eq!(unique.len(), resolved.len());
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_repeating_a_layer_changes_nothing() {
    let mut runner = proptest::test_runner::TestRunner::default();
    runner
        .run(&(stack(), 0usize..5), |(layers, pick)| {
            prop_assume!(!layers.is_empty());
            let index = pick % layers.len();
            let mut repeated = layers.clone();
            repeated.insert(index + 1, layers[index].clone());
            prop_assert_eq!(
                union_references(layers.iter()),
                union_references(repeated.iter())
            );
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_top_layer_decides() {
    let mut runner = proptest::test_runner::TestRunner::default();
    runner
        .run(&(stack(), "[a-f]", any::<bool>()), |(lower, id, removed)| {
            let top = if removed {
                json!([{"removed": id.clone()}])
            } else {
                json!([id.clone()])
            };
            let layers: Vec<&Value> = std::iter::once(&top).chain(lower.iter()).collect();
            let resolved = union_references(layers);
            let target = EntryId::from(id.as_str());
            if removed {
                prop_assert!(!resolved.contains(&target));
            } else {
                prop_assert_eq!(resolved.first(), Some(&target));
            }
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_null_layers_contribute_nothing() {
    let mut runner = proptest::test_runner::TestRunner::default();
    runner
        .run(&stack(), |layers| {
            let with_nulls: Vec<Value> = layers
                .iter()
                .flat_map(|layer| [Value::Null, layer.clone()])
                .collect();
            prop_assert_eq!(
                union_references(layers.iter()),
                union_references(with_nulls.iter())
            );
            Ok(())
        })
        .unwrap();
}
