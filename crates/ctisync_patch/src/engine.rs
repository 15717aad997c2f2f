//! Application of patch operations to JSON documents.

use serde_json::{Map, Value};

use crate::error::{PatchError, PatchResult};
use crate::operation::{PatchOp, PatchOperation};
use crate::pointer;

/// Apply a sequence of operations in order, stopping at the first failure.
///
/// The document may be partially modified when an error is returned.
/// Callers that need all-or-nothing behavior apply to a copy and persist
/// only on success.
///
/// # Errors
///
/// Returns the error of the first operation that fails.
pub fn apply_all(document: &mut Value, operations: &[PatchOperation]) -> PatchResult<()> {
    for operation in operations {
        apply(document, operation)?;
    }
    Ok(())
}

/// Apply a single operation to the document.
///
/// # Errors
///
/// - [`PatchError::UnsupportedOperation`] for an unknown operation name.
/// - [`PatchError::MissingFrom`] when `move` or `copy` lack `from`.
/// - [`PatchError::PathNotFound`] when a location cannot be resolved.
/// - [`PatchError::TestFailed`] when a `test` comparison fails.
pub fn apply(document: &mut Value, operation: &PatchOperation) -> PatchResult<()> {
    let op = operation
        .kind()
        .ok_or_else(|| PatchError::UnsupportedOperation {
            op: operation.op.clone(),
        })?;

    match op {
        PatchOp::Add => {
            let value = operation.value.clone().unwrap_or(Value::Null);
            add(document, &operation.path, value)
        }
        PatchOp::Remove => remove(document, &operation.path),
        PatchOp::Replace => {
            let value = operation.value.clone().unwrap_or(Value::Null);
            remove(document, &operation.path)?;
            add(document, &operation.path, value)
        }
        PatchOp::Move => {
            let from = require_from(operation)?;
            let value = read_from(document, from)?;
            remove(document, from)?;
            add(document, &operation.path, value)
        }
        PatchOp::Copy => {
            let from = require_from(operation)?;
            let value = read_from(document, from)?;
            add(document, &operation.path, value)
        }
        PatchOp::Test => test(document, &operation.path, operation.value.as_ref()),
    }
}

fn require_from(operation: &PatchOperation) -> PatchResult<&str> {
    operation
        .from
        .as_deref()
        .ok_or_else(|| PatchError::MissingFrom {
            op: operation.op.clone(),
        })
}

fn add(document: &mut Value, path: &str, value: Value) -> PatchResult<()> {
    if path.is_empty() {
        // The whole document is replaced; a non-object operand clears it.
        *document = match value {
            Value::Object(_) => value,
            _ => Value::Object(Map::new()),
        };
        return Ok(());
    }

    let parts = pointer::segments(path);
    let Some(key) = parts.last().copied() else {
        return Err(PatchError::path_not_found(path));
    };
    let parent =
        pointer::parent_of(document, &parts).ok_or_else(|| PatchError::path_not_found(path))?;

    match parent {
        Value::Object(map) => {
            map.insert(key.to_string(), value);
            Ok(())
        }
        Value::Array(items) => {
            if key == "-" {
                items.push(value);
                return Ok(());
            }
            let index: usize = key.parse().map_err(|_| PatchError::path_not_found(path))?;
            if index > items.len() {
                return Err(PatchError::path_not_found(path));
            }
            items.insert(index, value);
            Ok(())
        }
        _ => Err(PatchError::path_not_found(path)),
    }
}

fn remove(document: &mut Value, path: &str) -> PatchResult<()> {
    if path.is_empty() {
        match document {
            Value::Object(map) => map.clear(),
            Value::Array(items) => items.clear(),
            _ => *document = Value::Null,
        }
        return Ok(());
    }

    let parts = pointer::segments(path);
    let Some(key) = parts.last().copied() else {
        return Err(PatchError::path_not_found(path));
    };
    let parent =
        pointer::parent_of(document, &parts).ok_or_else(|| PatchError::path_not_found(path))?;

    match parent {
        Value::Object(map) => {
            // shift_remove keeps the remaining keys in document order.
            if map.shift_remove(key).is_none() {
                return Err(PatchError::path_not_found(path));
            }
            Ok(())
        }
        Value::Array(items) => {
            let index: usize = key.parse().map_err(|_| PatchError::path_not_found(path))?;
            if index >= items.len() {
                return Err(PatchError::path_not_found(path));
            }
            items.remove(index);
            Ok(())
        }
        _ => Err(PatchError::path_not_found(path)),
    }
}

fn read_from(document: &mut Value, from: &str) -> PatchResult<Value> {
    let parts = pointer::segments(from);
    let Some(key) = parts.last().copied() else {
        return Err(PatchError::path_not_found(from));
    };
    let parent =
        pointer::parent_of(document, &parts).ok_or_else(|| PatchError::path_not_found(from))?;
    pointer::read_child(parent, key)
        .cloned()
        .ok_or_else(|| PatchError::path_not_found(from))
}

fn test(document: &mut Value, path: &str, expected: Option<&Value>) -> PatchResult<()> {
    let parts = pointer::segments(path);
    let Some(key) = parts.last().copied() else {
        return Err(PatchError::path_not_found(path));
    };
    let parent =
        pointer::parent_of(document, &parts).ok_or_else(|| PatchError::path_not_found(path))?;

    let actual = match &*parent {
        Value::Object(map) => map.get(key),
        Value::Array(items) => {
            let index: usize = key.parse().map_err(|_| PatchError::path_not_found(path))?;
            if index >= items.len() {
                return Err(PatchError::path_not_found(path));
            }
            items.get(index)
        }
        _ => None,
    };

    match (actual, expected) {
        (Some(actual), Some(expected)) if actual == expected => Ok(()),
        _ => Err(PatchError::test_failed(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn add_inserts_object_key() {
        let mut doc = json!({"name": "rule-1001"});
        apply(&mut doc, &PatchOperation::add("/severity", json!("high"))).unwrap();
        assert_eq!(doc, json!({"name": "rule-1001", "severity": "high"}));
    }

    #[test]
    fn add_overwrites_existing_key() {
        let mut doc = json!({"severity": "low"});
        apply(&mut doc, &PatchOperation::add("/severity", json!("high"))).unwrap();
        assert_eq!(doc, json!({"severity": "high"}));
    }

    #[test]
    fn add_nested_path() {
        let mut doc = json!({"metadata": {"module": "aws"}});
        apply(&mut doc, &PatchOperation::add("/metadata/title", json!("t"))).unwrap();
        assert_eq!(doc, json!({"metadata": {"module": "aws", "title": "t"}}));
    }

    #[test]
    fn add_without_value_stores_null() {
        let mut doc = json!({});
        let op = PatchOperation {
            op: "add".to_string(),
            path: "/a".to_string(),
            value: None,
            from: None,
        };
        apply(&mut doc, &op).unwrap();
        assert_eq!(doc, json!({"a": null}));
    }

    #[test]
    fn add_empty_path_replaces_document() {
        let mut doc = json!({"old": 1});
        apply(&mut doc, &PatchOperation::add("", json!({"new": 2}))).unwrap();
        assert_eq!(doc, json!({"new": 2}));
    }

    #[test]
    fn add_empty_path_with_scalar_clears_document() {
        let mut doc = json!({"old": 1});
        apply(&mut doc, &PatchOperation::add("", json!(42))).unwrap();
        assert_eq!(doc, json!({}));
    }

    #[test]
    fn add_array_index_shifts_right() {
        let mut doc = json!({"items": ["a", "c"]});
        apply(&mut doc, &PatchOperation::add("/items/1", json!("b"))).unwrap();
        assert_eq!(doc, json!({"items": ["a", "b", "c"]}));
    }

    #[test]
    fn add_array_dash_appends() {
        let mut doc = json!({"items": ["a", "b", "c"]});
        apply(&mut doc, &PatchOperation::add("/items/-", json!("d"))).unwrap();
        assert_eq!(doc, json!({"items": ["a", "b", "c", "d"]}));
    }

    #[test]
    fn add_array_index_at_len_appends() {
        let mut doc = json!({"items": [1, 2]});
        apply(&mut doc, &PatchOperation::add("/items/2", json!(3))).unwrap();
        assert_eq!(doc, json!({"items": [1, 2, 3]}));
    }

    #[test]
    fn add_array_index_past_len_fails() {
        let mut doc = json!({"items": [1, 2]});
        let err = apply(&mut doc, &PatchOperation::add("/items/3", json!(3))).unwrap_err();
        assert_eq!(err, PatchError::path_not_found("/items/3"));
    }

    #[test]
    fn add_array_non_numeric_index_fails() {
        let mut doc = json!({"items": [1, 2]});
        let err = apply(&mut doc, &PatchOperation::add("/items/x", json!(3))).unwrap_err();
        assert_eq!(err, PatchError::path_not_found("/items/x"));
    }

    #[test]
    fn add_into_missing_parent_fails() {
        let mut doc = json!({});
        let err = apply(&mut doc, &PatchOperation::add("/a/b", json!(1))).unwrap_err();
        assert_eq!(err, PatchError::path_not_found("/a/b"));
    }

    #[test]
    fn add_into_scalar_parent_fails() {
        let mut doc = json!({"a": 1});
        let err = apply(&mut doc, &PatchOperation::add("/a/b", json!(1))).unwrap_err();
        assert_eq!(err, PatchError::path_not_found("/a/b"));
    }

    #[test]
    fn remove_object_key() {
        let mut doc = json!({"a": 1, "b": 2});
        apply(&mut doc, &PatchOperation::remove("/a")).unwrap();
        assert_eq!(doc, json!({"b": 2}));
    }

    #[test]
    fn remove_missing_key_fails() {
        let mut doc = json!({"a": 1});
        let err = apply(&mut doc, &PatchOperation::remove("/b")).unwrap_err();
        assert_eq!(err, PatchError::path_not_found("/b"));
    }

    #[test]
    fn remove_array_element_shifts_left() {
        let mut doc = json!({"items": ["a", "b", "c"]});
        apply(&mut doc, &PatchOperation::remove("/items/1")).unwrap();
        assert_eq!(doc, json!({"items": ["a", "c"]}));
    }

    #[test]
    fn remove_array_out_of_bounds_fails() {
        let mut doc = json!({"items": ["a"]});
        let err = apply(&mut doc, &PatchOperation::remove("/items/1")).unwrap_err();
        assert_eq!(err, PatchError::path_not_found("/items/1"));
    }

    #[test]
    fn remove_empty_path_clears_document() {
        let mut doc = json!({"a": 1, "b": 2});
        apply(&mut doc, &PatchOperation::remove("")).unwrap();
        assert_eq!(doc, json!({}));
    }

    #[test]
    fn remove_preserves_key_order() {
        let mut doc = json!({"a": 1, "b": 2, "c": 3, "d": 4});
        apply(&mut doc, &PatchOperation::remove("/b")).unwrap();
        let keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["a", "c", "d"]);
    }

    #[test]
    fn replace_existing_value() {
        let mut doc = json!({"severity": "low"});
        apply(&mut doc, &PatchOperation::replace("/severity", json!("high"))).unwrap();
        assert_eq!(doc, json!({"severity": "high"}));
    }

    #[test]
    fn replace_missing_path_fails() {
        let mut doc = json!({"a": 1});
        let err = apply(&mut doc, &PatchOperation::replace("/b", json!(2))).unwrap_err();
        assert_eq!(err, PatchError::path_not_found("/b"));
        assert_eq!(doc, json!({"a": 1}));
    }

    #[test]
    fn replace_array_element() {
        let mut doc = json!({"items": [1, 2, 3]});
        apply(&mut doc, &PatchOperation::replace("/items/1", json!(9))).unwrap();
        assert_eq!(doc, json!({"items": [1, 9, 3]}));
    }

    #[test]
    fn move_renames_field() {
        let mut doc = json!({"fieldToMove": "value"});
        apply(
            &mut doc,
            &PatchOperation::move_from("/fieldToMove", "/newField"),
        )
        .unwrap();
        assert_eq!(doc, json!({"newField": "value"}));
        assert!(doc.get("fieldToMove").is_none());
    }

    #[test]
    fn move_between_nested_locations() {
        let mut doc = json!({"a": {"x": 1}, "b": {}});
        apply(&mut doc, &PatchOperation::move_from("/a/x", "/b/y")).unwrap();
        assert_eq!(doc, json!({"a": {}, "b": {"y": 1}}));
    }

    #[test]
    fn move_missing_from_field_fails() {
        let mut doc = json!({"a": 1});
        let op = PatchOperation {
            op: "move".to_string(),
            path: "/b".to_string(),
            value: None,
            from: None,
        };
        let err = apply(&mut doc, &op).unwrap_err();
        assert_eq!(
            err,
            PatchError::MissingFrom {
                op: "move".to_string()
            }
        );
    }

    #[test]
    fn move_missing_source_fails() {
        let mut doc = json!({"a": 1});
        let err =
            apply(&mut doc, &PatchOperation::move_from("/missing", "/b")).unwrap_err();
        assert_eq!(err, PatchError::path_not_found("/missing"));
        assert_eq!(doc, json!({"a": 1}));
    }

    #[test]
    fn copy_duplicates_value() {
        let mut doc = json!({"a": {"deep": [1, 2]}});
        apply(&mut doc, &PatchOperation::copy_from("/a", "/b")).unwrap();
        assert_eq!(doc, json!({"a": {"deep": [1, 2]}, "b": {"deep": [1, 2]}}));
    }

    #[test]
    fn copy_then_mutate_leaves_source_untouched() {
        let mut doc = json!({"a": {"n": 1}});
        apply(&mut doc, &PatchOperation::copy_from("/a", "/b")).unwrap();
        apply(&mut doc, &PatchOperation::replace("/b/n", json!(2))).unwrap();
        assert_eq!(doc, json!({"a": {"n": 1}, "b": {"n": 2}}));
    }

    #[test]
    fn test_matching_value_passes_and_leaves_document() {
        let mut doc = json!({"a": {"b": [1, 2]}});
        let before = doc.clone();
        apply(&mut doc, &PatchOperation::test("/a/b", json!([1, 2]))).unwrap();
        assert_eq!(doc, before);
    }

    #[test]
    fn test_mismatch_fails_and_leaves_document() {
        let mut doc = json!({"a": 1});
        let before = doc.clone();
        let err = apply(&mut doc, &PatchOperation::test("/a", json!(2))).unwrap_err();
        assert_eq!(err, PatchError::test_failed("/a"));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_missing_key_fails_as_test_failure() {
        let mut doc = json!({"a": 1});
        let err = apply(&mut doc, &PatchOperation::test("/b", json!(1))).unwrap_err();
        assert_eq!(err, PatchError::test_failed("/b"));
    }

    #[test]
    fn test_missing_parent_fails_as_path_not_found() {
        let mut doc = json!({"a": 1});
        let err = apply(&mut doc, &PatchOperation::test("/x/y", json!(1))).unwrap_err();
        assert_eq!(err, PatchError::path_not_found("/x/y"));
    }

    #[test]
    fn test_object_equality_ignores_key_order() {
        let mut doc: Value = serde_json::from_str(r#"{"a": {"x": 1, "y": 2}}"#).unwrap();
        let expected: Value = serde_json::from_str(r#"{"y": 2, "x": 1}"#).unwrap();
        apply(&mut doc, &PatchOperation::test("/a", expected)).unwrap();
    }

    #[test]
    fn unsupported_op_fails_naming_the_op() {
        let mut doc = json!({"a": 1});
        let before = doc.clone();
        let op = PatchOperation {
            op: "unsupported".to_string(),
            path: "/a".to_string(),
            value: Some(json!(2)),
            from: None,
        };
        let err = apply(&mut doc, &op).unwrap_err();
        assert_eq!(
            err,
            PatchError::UnsupportedOperation {
                op: "unsupported".to_string()
            }
        );
        assert!(err.to_string().contains("unsupported"));
        assert_eq!(doc, before);
    }

    #[test]
    fn apply_all_runs_in_order() {
        let mut doc = json!({"items": []});
        let ops = vec![
            PatchOperation::add("/items/-", json!("a")),
            PatchOperation::add("/items/-", json!("b")),
            PatchOperation::add("/items/0", json!("start")),
        ];
        apply_all(&mut doc, &ops).unwrap();
        assert_eq!(doc, json!({"items": ["start", "a", "b"]}));
    }

    #[test]
    fn apply_all_stops_at_first_error() {
        let mut doc = json!({});
        let ops = vec![
            PatchOperation::add("/a", json!(1)),
            PatchOperation::remove("/missing"),
            PatchOperation::add("/b", json!(2)),
        ];
        let err = apply_all(&mut doc, &ops).unwrap_err();
        assert_eq!(err, PatchError::path_not_found("/missing"));
        assert_eq!(doc, json!({"a": 1}));
    }

    #[test]
    fn later_ops_see_paths_created_by_earlier_ops() {
        let mut doc = json!({});
        let ops = vec![
            PatchOperation::add("/parents", json!([])),
            PatchOperation::add("/parents/-", json!("decoder/base/0")),
            PatchOperation::test("/parents/0", json!("decoder/base/0")),
        ];
        apply_all(&mut doc, &ops).unwrap();
    }

    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-z0-9]{0,8}".prop_map(Value::from),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                proptest::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                    .prop_map(|map| Value::Object(map.into_iter().collect())),
            ]
        })
    }

    proptest! {
        // Key "added0" contains a digit, so the [a-z]-only generator
        // can never collide with it.
        #[test]
        fn add_then_remove_restores_document(
            entries in proptest::collection::btree_map("[a-z]{1,6}", json_value(), 0..5),
            value in json_value(),
        ) {
            let original = Value::Object(entries.into_iter().collect());
            let mut doc = original.clone();
            apply(&mut doc, &PatchOperation::add("/added0", value)).unwrap();
            apply(&mut doc, &PatchOperation::remove("/added0")).unwrap();
            prop_assert_eq!(doc, original);
        }

        #[test]
        fn array_insert_then_remove_restores_document(
            items in proptest::collection::vec(json_value(), 0..5),
            value in json_value(),
            position in 0usize..5,
        ) {
            let index = position.min(items.len());
            let original = serde_json::json!({"items": items});
            let mut doc = original.clone();
            let path = format!("/items/{index}");
            apply(&mut doc, &PatchOperation::add(&path, value)).unwrap();
            apply(&mut doc, &PatchOperation::remove(&path)).unwrap();
            prop_assert_eq!(doc, original);
        }
    }
}
