//! Property-based tests for object deep merge

use catalog_strata::resolve::merge::{merge_layers, Patch};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        (-100i64..100).prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::from),
    ]
}

/// Objects up to two levels deep over a small key space so layers overlap.
fn object(with_nulls: bool) -> impl Strategy<Value = Value> {
    let field = if with_nulls {
        prop_oneof![4 => leaf(), 1 => Just(Value::Null)].boxed()
    } else {
        leaf().boxed()
    };
    let inner = prop::collection::btree_map("[a-d]", field.clone(), 0..4)
        .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>()));
    let value = prop_oneof![3 => field, 1 => inner];
    prop::collection::btree_map("[a-d]", value, 0..5)
        .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>()))
}

fn contains_null(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.values().any(contains_null),
        _ => false,
    }
}

#[test]
fn test_top_leaf_fields_win() {
    let mut runner = proptest::test_runner::TestRunner::default();
    runner
        .run(
            &prop::collection::vec(object(true), 1..5),
            |layers| {
                let merged = merge_layers(layers.iter()).unwrap();
                let top = layers.last().unwrap().as_object().unwrap();
                for (key, value) in top {
                    match value {
                        Value::Null => prop_assert!(merged.get(key).is_none()),
                        Value::Object(_) => prop_assert!(merged[key].is_object()),
                        leaf => prop_assert_eq!(&merged[key], leaf),
                    }
                }
                Ok(())
            },
        )
        .unwrap();
}

#[test]
fn test_merge_never_returns_nulls() {
    let mut runner = proptest::test_runner::TestRunner::default();
    runner
        .run(
            &prop::collection::vec(object(true), 1..5),
            |layers| {
                let merged = merge_layers(layers.iter()).unwrap();
                prop_assert!(!contains_null(&merged));
                Ok(())
            },
        )
        .unwrap();
}

#[test]
fn test_grouping_does_not_change_the_result() {
    let mut runner = proptest::test_runner::TestRunner::default();
    runner
        .run(
            &(object(true), object(true), object(true)),
            |(bottom, middle, top)| {
                let bottom = Patch::from_layer(&bottom);
                let middle = Patch::from_layer(&middle);
                let top = Patch::from_layer(&top);
                let folded = bottom.then(&middle).then(&top).apply(None);
                let grouped = bottom.then(&middle.then(&top)).apply(None);
                prop_assert_eq!(folded, grouped);
                Ok(())
            },
        )
        .unwrap();
}

#[test]
fn test_merge_equals_upper_result_laid_over_lower() {
    let mut runner = proptest::test_runner::TestRunner::default();
    runner
        .run(
            &prop::collection::vec(object(true), 2..6),
            |layers| {
                let all = merge_layers(layers.iter());
                let upper = layers[1..]
                    .iter()
                    .map(Patch::from_layer)
                    .reduce(|lower, upper| lower.then(&upper))
                    .unwrap();
                let staged = Patch::from_layer(&layers[0]).then(&upper).apply(None);
                prop_assert_eq!(all, staged);
                Ok(())
            },
        )
        .unwrap();
}

#[test]
fn test_fields_absent_above_survive() {
    let mut runner = proptest::test_runner::TestRunner::default();
    runner
        .run(&(object(false), object(false)), |(lower, upper)| {
            let merged = merge_layers([&lower, &upper]).unwrap();
            let upper_fields = upper.as_object().unwrap();
            for (key, value) in lower.as_object().unwrap() {
                if !upper_fields.contains_key(key) {
                    prop_assert_eq!(&merged[key], value);
                }
            }
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_single_layer_is_its_own_result() {
    let mut runner = proptest::test_runner::TestRunner::default();
    runner
        .run(&object(false), |layer| {
            prop_assert_eq!(merge_layers([&layer]).unwrap(), layer);
            Ok(())
        })
        .unwrap();
}
