//! Persisted content documents.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resource::ResourceType;
use crate::space::SpaceName;

/// Content hash of a document, as persisted under `space.hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceHash {
    /// Lowercase hex SHA-256 of the canonical document.
    pub sha256: String,
}

/// Space membership and content hash of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceInfo {
    /// The space the document lives in.
    pub name: SpaceName,
    /// Hash identifying the document's content.
    pub hash: SpaceHash,
}

impl SpaceInfo {
    /// Create space info from a name and a precomputed hash.
    pub fn new(name: SpaceName, sha256: impl Into<String>) -> Self {
        Self {
            name,
            hash: SpaceHash {
                sha256: sha256.into(),
            },
        }
    }
}

/// One catalog entry as persisted in a space's store.
///
/// The document id is the storage key, not a field of the persisted
/// shape. `decoder` carries the serialized YAML rule-engine form and is
/// present only for decoder documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentDocument {
    /// The resource type of the entry.
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    /// The normalized catalog payload.
    pub document: Value,
    /// Space membership and content hash.
    pub space: SpaceInfo,
    /// Serialized YAML rule-engine form, decoder documents only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decoder: Option<String>,
}

impl ContentDocument {
    /// Create a document with no decoder representation.
    pub fn new(resource_type: ResourceType, document: Value, space: SpaceInfo) -> Self {
        Self {
            resource_type,
            document,
            space,
            decoder: None,
        }
    }

    /// The document's content hash.
    pub fn hash(&self) -> &str {
        &self.space.hash.sha256
    }
}
