//! Structural patching of state trees.

use crate::Value;

/// Merge `source` into `target` in place.
///
/// Only keys that already exist in `target` are visited; a key the source
/// names but the target lacks is ignored, and a key the source omits is left
/// alone. Where both sides hold a map (or both an array) the merge recurses,
/// otherwise the target value is overwritten. Structurally incompatible pairs
/// are resolved by overwrite as well.
///
/// Returns `true` if anything in `target` changed.
pub fn merge(target: &mut Value, source: &Value) -> bool {
    match (target, source) {
        (Value::Map(target), Value::Map(source)) => {
            let mut changed = false;
            for (key, slot) in target.iter_mut() {
                if let Some(incoming) = source.get(key) {
                    changed |= merge(slot, incoming);
                }
            }
            changed
        }
        (Value::Array(target), Value::Array(source)) => {
            let mut changed = false;
            for (slot, incoming) in target.iter_mut().zip(source) {
                changed |= merge(slot, incoming);
            }
            changed
        }
        (target, source) => {
            if target == source {
                false
            } else {
                *target = source.clone();
                true
            }
        }
    }
}

/// Shallow assignment: copy every top-level entry of `source` onto `target`.
///
/// Unlike [`merge`] this may introduce keys. A non-map target is replaced by
/// an empty map first; a non-map source assigns nothing.
pub fn assign(target: &mut Value, source: &Value) -> bool {
    let Some(source) = source.as_map() else {
        return false;
    };
    if !target.is_map() {
        *target = Value::map();
    }
    let Some(target) = target.as_map_mut() else {
        return false;
    };

    let mut changed = false;
    for (key, value) in source {
        if target.get(key) != Some(value) {
            target.insert(key.clone(), value.clone());
            changed = true;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn nested_update_keeps_siblings() {
        let mut target = v(json!({"a": {"b": 0, "c": 7}, "d": 1}));
        assert!(merge(&mut target, &v(json!({"a": {"b": 1}}))));
        assert_eq!(target, v(json!({"a": {"b": 1, "c": 7}, "d": 1})));
    }

    #[test]
    fn source_only_keys_are_ignored() {
        let mut target = v(json!({"a": 1}));
        assert!(!merge(&mut target, &v(json!({"z": 2}))));
        assert_eq!(target, v(json!({"a": 1})));
    }

    #[test]
    fn mismatch_overwrites() {
        let mut target = v(json!({"a": {"b": 1}, "n": 3}));
        merge(&mut target, &v(json!({"a": 5, "n": {"x": 1}})));
        assert_eq!(target, v(json!({"a": 5, "n": {"x": 1}})));
    }

    #[test]
    fn arrays_merge_over_existing_indices() {
        let mut target = v(json!({"items": [{"done": false, "t": "x"}, 2]}));
        merge(&mut target, &v(json!({"items": [{"done": true}, 9, 10]})));
        assert_eq!(target, v(json!({"items": [{"done": true, "t": "x"}, 9]})));
    }

    #[test]
    fn identical_source_reports_no_change() {
        let mut target = v(json!({"a": {"b": 1}}));
        assert!(!merge(&mut target, &v(json!({"a": {"b": 1}}))));
    }

    #[test]
    fn assign_adds_keys() {
        let mut target = v(json!({"a": 1}));
        assert!(assign(&mut target, &v(json!({"b": {"c": 2}}))));
        assert_eq!(target.get(&path!("b/c")), Some(&Value::Integer(2)));
        assert_eq!(target.field("a"), Some(&Value::Integer(1)));
    }

    #[test]
    fn assign_replaces_nested_wholesale() {
        let mut target = v(json!({"a": {"b": 1, "c": 2}}));
        assign(&mut target, &v(json!({"a": {"b": 5}})));
        assert_eq!(target, v(json!({"a": {"b": 5}})));
    }

    #[test]
    fn assign_non_map_source_is_noop() {
        let mut target = v(json!({"a": 1}));
        assert!(!assign(&mut target, &Value::from(3)));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Integer),
            "[a-z]{0,6}".prop_map(Value::String),
        ]
    }

    fn tree() -> impl Strategy<Value = Value> {
        leaf().prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-d]", inner, 0..4).prop_map(Value::Map),
            ]
        })
    }

    fn keys(value: &Value) -> Vec<String> {
        value
            .as_map()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }

    proptest! {
        #[test]
        fn merge_never_adds_top_level_keys(
            target in prop::collection::btree_map("[a-d]", tree(), 0..4),
            source in prop::collection::btree_map("[a-f]", tree(), 0..5),
        ) {
            let mut target = Value::Map(target);
            let before = keys(&target);
            merge(&mut target, &Value::Map(source));
            prop_assert_eq!(keys(&target), before);
        }

        #[test]
        fn merge_is_idempotent(target in tree(), source in tree()) {
            let mut once = target.clone();
            merge(&mut once, &source);
            let mut twice = once.clone();
            prop_assert!(!merge(&mut twice, &source));
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn merge_with_self_is_noop(target in tree()) {
            let mut copy = target.clone();
            prop_assert!(!merge(&mut copy, &target));
            prop_assert_eq!(copy, target);
        }

        #[test]
        fn untouched_keys_keep_their_values(
            target in prop::collection::btree_map("[a-d]", tree(), 1..4),
            patch in tree(),
        ) {
            let first = target.keys().next().cloned().unwrap_or_default();
            let mut source = BTreeMap::new();
            source.insert(first.clone(), patch);

            let mut merged = Value::Map(target.clone());
            merge(&mut merged, &Value::Map(source));
            for (key, value) in &target {
                if key != &first {
                    prop_assert_eq!(merged.field(key), Some(value));
                }
            }
        }
    }
}
