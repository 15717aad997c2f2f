//! Patch operation types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The set of operations the patch engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchOp {
    /// Insert or overwrite a value at a path.
    Add,
    /// Delete the value at a path.
    Remove,
    /// Remove then add at the same path.
    Replace,
    /// Relocate a value from one path to another.
    Move,
    /// Duplicate a value from one path to another.
    Copy,
    /// Assert that a path holds an expected value.
    Test,
}

impl PatchOp {
    /// Parse an operation name. Returns `None` for unknown names.
    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "add" => Some(Self::Add),
            "remove" => Some(Self::Remove),
            "replace" => Some(Self::Replace),
            "move" => Some(Self::Move),
            "copy" => Some(Self::Copy),
            "test" => Some(Self::Test),
            _ => None,
        }
    }

    /// The wire name of this operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Replace => "replace",
            Self::Move => "move",
            Self::Copy => "copy",
            Self::Test => "test",
        }
    }
}

/// A single mutation of a JSON document.
///
/// The `op` field keeps the raw wire string so that records carrying an
/// unknown operation still deserialize; the engine rejects them at apply
/// time, naming the literal operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    /// Operation name (`add`, `remove`, `replace`, `move`, `copy`, `test`).
    pub op: String,
    /// Slash-separated path to the target location.
    pub path: String,
    /// Operand for `add`, `replace` and `test`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Source path for `move` and `copy`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl PatchOperation {
    /// Create an `add` operation.
    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: PatchOp::Add.as_str().to_string(),
            path: path.into(),
            value: Some(value),
            from: None,
        }
    }

    /// Create a `remove` operation.
    pub fn remove(path: impl Into<String>) -> Self {
        Self {
            op: PatchOp::Remove.as_str().to_string(),
            path: path.into(),
            value: None,
            from: None,
        }
    }

    /// Create a `replace` operation.
    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: PatchOp::Replace.as_str().to_string(),
            path: path.into(),
            value: Some(value),
            from: None,
        }
    }

    /// Create a `move` operation.
    pub fn move_from(from: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            op: PatchOp::Move.as_str().to_string(),
            path: path.into(),
            value: None,
            from: Some(from.into()),
        }
    }

    /// Create a `copy` operation.
    pub fn copy_from(from: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            op: PatchOp::Copy.as_str().to_string(),
            path: path.into(),
            value: None,
            from: Some(from.into()),
        }
    }

    /// Create a `test` operation.
    pub fn test(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: PatchOp::Test.as_str().to_string(),
            path: path.into(),
            value: Some(value),
            from: None,
        }
    }

    /// The parsed operation kind, `None` when the name is unknown.
    pub fn kind(&self) -> Option<PatchOp> {
        PatchOp::parse(&self.op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_known_ops() {
        assert_eq!(PatchOp::parse("add"), Some(PatchOp::Add));
        assert_eq!(PatchOp::parse("remove"), Some(PatchOp::Remove));
        assert_eq!(PatchOp::parse("replace"), Some(PatchOp::Replace));
        assert_eq!(PatchOp::parse("move"), Some(PatchOp::Move));
        assert_eq!(PatchOp::parse("copy"), Some(PatchOp::Copy));
        assert_eq!(PatchOp::parse("test"), Some(PatchOp::Test));
    }

    #[test]
    fn parse_unknown_op_is_none() {
        assert_eq!(PatchOp::parse("merge"), None);
        assert_eq!(PatchOp::parse("ADD"), None);
        assert_eq!(PatchOp::parse(""), None);
    }

    #[test]
    fn deserialize_without_optional_fields() {
        let op: PatchOperation =
            serde_json::from_str(r#"{"op":"remove","path":"/a"}"#).unwrap();
        assert_eq!(op.op, "remove");
        assert_eq!(op.path, "/a");
        assert!(op.value.is_none());
        assert!(op.from.is_none());
    }

    #[test]
    fn deserialize_keeps_unknown_op_string() {
        let op: PatchOperation =
            serde_json::from_str(r#"{"op":"merge","path":"/a","value":1}"#).unwrap();
        assert_eq!(op.op, "merge");
        assert_eq!(op.kind(), None);
    }

    #[test]
    fn serialize_skips_absent_fields() {
        let op = PatchOperation::remove("/a/b");
        let text = serde_json::to_string(&op).unwrap();
        assert_eq!(text, r#"{"op":"remove","path":"/a/b"}"#);
    }

    #[test]
    fn serialize_move_carries_from() {
        let op = PatchOperation::move_from("/old", "/new");
        let text = serde_json::to_string(&op).unwrap();
        assert_eq!(text, r#"{"op":"move","path":"/new","from":"/old"}"#);
    }

    #[test]
    fn constructors_round_trip_through_serde() {
        let op = PatchOperation::add("/severity", json!("high"));
        let text = serde_json::to_string(&op).unwrap();
        let back: PatchOperation = serde_json::from_str(&text).unwrap();
        assert_eq!(back, op);
    }
}
