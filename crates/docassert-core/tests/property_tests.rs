#![allow(clippy::unwrap_used, clippy::expect_used)]

use docassert_core::{
    assert_json_equal, compare, load_json, ComparisonOptions, Difference, DifferenceKind,
    DocumentFormat, OrderMode,
};
use proptest::prelude::*;
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-50i64..50).prop_map(Value::from),
        "[a-z]{0,4}".prop_map(Value::String),
    ]
}

fn object_of(inner: impl Strategy<Value = Value>) -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-e]", inner, 0..4)
        .prop_map(|m| Value::Object(m.into_iter().collect::<Map<String, Value>>()))
}

/// Arbitrary JSON documents; keys never collide with the stamp key
fn document() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            object_of(inner),
        ]
    })
}

fn order_mode() -> impl Strategy<Value = OrderMode> {
    prop_oneof![Just(OrderMode::Ignore), Just(OrderMode::Include)]
}

fn diff_json(expected: &Value, actual: &Value, options: &ComparisonOptions) -> Vec<Difference> {
    let e = load_json(&expected.to_string(), options).unwrap();
    let a = load_json(&actual.to_string(), options).unwrap();
    compare(&e, &a, DocumentFormat::Json, options).unwrap()
}

fn stamped(doc: &Value, stamp: &str) -> Value {
    match doc {
        Value::Object(map) => {
            let mut map = map.clone();
            map.insert("ts".to_string(), Value::String(stamp.to_string()));
            Value::Object(map)
        }
        other => {
            let mut map = Map::new();
            map.insert("body".to_string(), other.clone());
            map.insert("ts".to_string(), Value::String(stamp.to_string()));
            Value::Object(map)
        }
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_reflexive(doc in document(), order in order_mode()) {
        let options = ComparisonOptions::default().with_order(order);
        prop_assert!(diff_json(&doc, &doc, &options).is_empty());
    }

    #[test]
    fn prop_missing_mirrors_unexpected(a in document(), b in document()) {
        let options = ComparisonOptions::default();
        let forward = diff_json(&a, &b, &options);
        let backward = diff_json(&b, &a, &options);

        let rendered = |diffs: &[Difference], kind: DifferenceKind| {
            let mut paths: Vec<String> = diffs
                .iter()
                .filter(|d| d.kind == kind)
                .map(|d| d.path.to_string())
                .collect();
            paths.sort();
            paths
        };
        prop_assert_eq!(
            rendered(&forward, DifferenceKind::MissingInActual),
            rendered(&backward, DifferenceKind::UnexpectedInActual)
        );
        prop_assert_eq!(
            rendered(&forward, DifferenceKind::UnexpectedInActual),
            rendered(&backward, DifferenceKind::MissingInActual)
        );
        prop_assert_eq!(forward.len(), backward.len());
    }

    #[test]
    fn prop_ignored_stamp_changes_nothing(
        a in document(),
        b in document(),
        s1 in "[0-9]{1,3}",
        s2 in "[0-9]{1,3}",
    ) {
        let plain = ComparisonOptions::default();
        let ignoring = ComparisonOptions::default().ignore_node("ts");

        let (wrapped_a, wrapped_b) = (stamped(&a, &s1), stamped(&b, &s2));
        let baseline = diff_json(&stamped(&a, "x"), &stamped(&b, "x"), &plain);
        let stamped_diffs = diff_json(&wrapped_a, &wrapped_b, &ignoring);
        prop_assert_eq!(&baseline, &stamped_diffs);

        let twice = ignoring.clone().ignore_node("ts");
        prop_assert_eq!(&stamped_diffs, &diff_json(&wrapped_a, &wrapped_b, &twice));
    }

    #[test]
    fn prop_relaxing_order_never_adds_mismatches(
        (items, shuffled) in prop::collection::vec(document(), 0..6)
            .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle())),
        other in prop::collection::vec(document(), 0..6),
    ) {
        let include = ComparisonOptions::default().with_order(OrderMode::Include);
        let ignore = ComparisonOptions::default().with_order(OrderMode::Ignore);
        let items = Value::Array(items);

        for candidate in [Value::Array(shuffled), Value::Array(other)] {
            if diff_json(&items, &candidate, &include).is_empty() {
                prop_assert!(diff_json(&items, &candidate, &ignore).is_empty());
            }
        }
    }

    #[test]
    fn prop_permutation_equal_when_order_ignored(
        (items, shuffled) in prop::collection::vec(document(), 0..6)
            .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle())),
    ) {
        let ignore = ComparisonOptions::default();
        prop_assert!(diff_json(&Value::Array(items), &Value::Array(shuffled), &ignore).is_empty());
    }

    #[test]
    fn prop_truncation_only_affects_preview(
        a in document(),
        b in document(),
        max in 0usize..64,
    ) {
        let (a, b) = (a.to_string(), b.to_string());
        let default_result = assert_json_equal(&a, &b, &ComparisonOptions::default());
        let truncated_result =
            assert_json_equal(&a, &b, &ComparisonOptions::default().with_max_input_characters(max));

        prop_assert_eq!(default_result.is_ok(), truncated_result.is_ok());
        if let (Err(d), Err(t)) = (&default_result, &truncated_result) {
            prop_assert_eq!(d.differences(), t.differences());
        }
    }
}
