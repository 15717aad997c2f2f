//! Change stream wire types.

use ctisync_patch::PatchOperation;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// The kind of mutation a change record describes.
///
/// Parsed case-insensitively: catalog deployments have emitted both
/// `CREATE` and `create`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    /// A new document, full payload attached.
    Create,
    /// Patch operations against an existing document.
    Update,
    /// Removal of an existing document.
    Delete,
}

impl ChangeType {
    /// Parse a type token, ignoring case. Returns `None` for unknown tokens.
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "create" => Some(Self::Create),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    /// The lowercase token for this change type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl Serialize for ChangeType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ChangeType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        ChangeType::parse(&raw)
            .ok_or_else(|| D::Error::unknown_variant(&raw, &["create", "update", "delete"]))
    }
}

/// One remote catalog mutation from the changes endpoint.
///
/// Records carry no resource-type field of their own: creates are routed
/// by the `type` inside `payload`, updates and deletes by locating the
/// resource id in the per-type stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Catalog context the record belongs to.
    pub context: String,
    /// Position of this record in the context's change log.
    pub offset: u64,
    /// Id of the document the record targets.
    pub resource: String,
    /// Kind of mutation.
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    /// Remote schema version of the record.
    #[serde(default)]
    pub version: u64,
    /// Patch operations, meaningful only for updates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<PatchOperation>,
    /// Full document payload, present only for creates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl ChangeRecord {
    /// The resource type named inside the payload, for create routing.
    pub fn payload_type(&self) -> Option<&str> {
        self.payload.as_ref()?.get("type")?.as_str()
    }
}

/// One page of the changes endpoint's response, ordered by offset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangePage {
    /// The change records, in ascending offset order.
    pub data: Vec<ChangeRecord>,
}

impl ChangePage {
    /// The highest offset in the page, `None` when the page is empty.
    pub fn max_offset(&self) -> Option<u64> {
        self.data.iter().map(|record| record.offset).max()
    }

    /// Whether the page carries no records.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
