//! Slash-separated path navigation over JSON documents.
//!
//! Paths follow the convention used by the remote catalog: a leading
//! slash, segments separated by slashes, array indices as decimal
//! numbers and `-` addressing one past the end of an array. No tilde
//! escaping is performed on segments.

use serde_json::Value;

/// Split a path into segments, dropping the empty segment introduced by
/// the leading slash.
pub(crate) fn segments(path: &str) -> Vec<&str> {
    path.split('/').skip(1).collect()
}

/// Walk every segment except the last, returning the node the final
/// segment applies to.
///
/// Returns `None` when an intermediate segment names a missing key, a
/// non-numeric or out-of-bounds index, or descends into a scalar.
pub(crate) fn parent_of<'a>(document: &'a mut Value, parts: &[&str]) -> Option<&'a mut Value> {
    let mut current = document;
    for part in parts.iter().take(parts.len().saturating_sub(1)) {
        current = match current {
            Value::Object(map) => map.get_mut(*part)?,
            Value::Array(items) => {
                let index: usize = part.parse().ok()?;
                items.get_mut(index)?
            }
            _ => return None,
        };
    }
    Some(current)
}

/// Read the child named by `key` from a parent node, `None` when the
/// key is missing, the index invalid or the parent a scalar.
pub(crate) fn read_child<'a>(parent: &'a Value, key: &str) -> Option<&'a Value> {
    match parent {
        Value::Object(map) => map.get(key),
        Value::Array(items) => {
            let index: usize = key.parse().ok()?;
            items.get(index)
        }
        _ => None,
    }
}
