//! Property-based test generators using proptest.
//!
//! Strategies for random catalog content that keeps the invariants the
//! engine relies on (documents are objects and carry an id).

use ctisync_model::ResourceType;
use proptest::prelude::*;
use serde_json::{json, Value};

/// Strategy for arbitrary JSON values nested up to three levels.
pub fn json_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 _.-]{0,16}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 6, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            proptest::collection::btree_map("[a-z_]{1,10}", inner, 0..6)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

/// Strategy for content documents carrying an id and arbitrary fields.
pub fn document_strategy() -> impl Strategy<Value = Value> {
    ("[a-z]{3,8}-[0-9]{1,4}", json_value_strategy()).prop_map(|(id, definition)| {
        json!({"id": id, "definition": definition})
    })
}

/// Strategy for any resource type.
pub fn resource_type_strategy() -> impl Strategy<Value = ResourceType> {
    proptest::sample::select(ResourceType::ALL.to_vec())
}

/// Strategy for resource types that take part in promotion.
pub fn promotable_type_strategy() -> impl Strategy<Value = ResourceType> {
    resource_type_strategy().prop_filter("type must be promotable", |rt| rt.promotable())
}
