//! Space promotion diffs.

use serde::{Deserialize, Serialize};

use crate::resource::ResourceType;
use crate::space::SpaceName;

/// The kind of change a diff entry asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffOp {
    /// Present in the source space only.
    Add,
    /// Present in both spaces with differing content hashes.
    Update,
    /// Present in the target space only.
    Remove,
}

impl DiffOp {
    /// The lowercase token used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Update => "update",
            Self::Remove => "remove",
        }
    }
}

/// One resource-level entry of a promotion diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEntry {
    /// The change to apply.
    pub operation: DiffOp,
    /// Id of the document the entry refers to.
    pub id: String,
}

impl DiffEntry {
    /// Create a diff entry.
    pub fn new(operation: DiffOp, id: impl Into<String>) -> Self {
        Self {
            operation,
            id: id.into(),
        }
    }
}

/// Per-resource-type change lists of a promotion diff.
///
/// IoCs are not promotable and have no list here. The policy list only
/// ever carries `update` entries; each space holds a singleton policy
/// that is resynchronized, never added or removed independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceChanges {
    /// Integration changes.
    #[serde(default)]
    pub integrations: Vec<DiffEntry>,
    /// Decoder changes.
    #[serde(default)]
    pub decoders: Vec<DiffEntry>,
    /// Rule changes.
    #[serde(default)]
    pub rules: Vec<DiffEntry>,
    /// Key-value database changes.
    #[serde(default)]
    pub kvdbs: Vec<DiffEntry>,
    /// Filter changes.
    #[serde(default)]
    pub filters: Vec<DiffEntry>,
    /// Policy changes, update-only.
    #[serde(default)]
    pub policy: Vec<DiffEntry>,
}

impl SpaceChanges {
    /// The change list for a resource type, `None` for non-promotable types.
    pub fn for_type(&self, resource_type: ResourceType) -> Option<&[DiffEntry]> {
        match resource_type {
            ResourceType::Integration => Some(&self.integrations),
            ResourceType::Decoder => Some(&self.decoders),
            ResourceType::Rule => Some(&self.rules),
            ResourceType::Kvdb => Some(&self.kvdbs),
            ResourceType::Filter => Some(&self.filters),
            ResourceType::Policy => Some(&self.policy),
            ResourceType::Ioc => None,
        }
    }

    /// Mutable access to the change list for a resource type.
    pub fn for_type_mut(&mut self, resource_type: ResourceType) -> Option<&mut Vec<DiffEntry>> {
        match resource_type {
            ResourceType::Integration => Some(&mut self.integrations),
            ResourceType::Decoder => Some(&mut self.decoders),
            ResourceType::Rule => Some(&mut self.rules),
            ResourceType::Kvdb => Some(&mut self.kvdbs),
            ResourceType::Filter => Some(&mut self.filters),
            ResourceType::Policy => Some(&mut self.policy),
            ResourceType::Ioc => None,
        }
    }

    /// Whether every change list is empty.
    pub fn is_empty(&self) -> bool {
        self.integrations.is_empty()
            && self.decoders.is_empty()
            && self.rules.is_empty()
            && self.kvdbs.is_empty()
            && self.filters.is_empty()
            && self.policy.is_empty()
    }

    /// Total number of entries across all lists.
    pub fn len(&self) -> usize {
        self.integrations.len()
            + self.decoders.len()
            + self.rules.len()
            + self.kvdbs.len()
            + self.filters.len()
            + self.policy.len()
    }
}

/// A promotion request: the source space and what to carry over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceDiff {
    /// The source space being promoted.
    pub space: SpaceName,
    /// The per-type change lists.
    pub changes: SpaceChanges,
}

impl SpaceDiff {
    /// Create an empty diff for the given source space.
    pub fn new(space: SpaceName) -> Self {
        Self {
            space,
            changes: SpaceChanges::default(),
        }
    }
}
