//! In-memory document store.

use std::collections::HashMap;

use ctisync_model::{ContentDocument, ResourceType, SpaceName};
use ctisync_patch::PatchOperation;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::normalize;
use crate::store::DocumentStore;

struct Entry {
    sequence: u64,
    document: ContentDocument,
}

/// An in-memory document store for one resource type within one space.
///
/// # Thread Safety
///
/// The store is thread-safe; expensive work (patching, normalization,
/// hashing) runs outside the lock and writes re-validate the document's
/// sequence number, failing with `VersionConflict` when a concurrent
/// writer got there first.
pub struct InMemoryDocumentStore {
    space: SpaceName,
    resource_type: ResourceType,
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryDocumentStore {
    /// Creates an empty store for the given space and resource type.
    #[must_use]
    pub fn new(space: SpaceName, resource_type: ResourceType) -> Self {
        Self {
            space,
            resource_type,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The space this store belongs to.
    pub fn space(&self) -> SpaceName {
        self.space
    }

    /// The resource type this store holds.
    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn create(&self, id: &str, payload: &Value) -> StoreResult<()> {
        let document = normalize::normalize_payload(self.space, self.resource_type, payload);
        let mut entries = self.entries.write();
        if entries.contains_key(id) {
            return Err(StoreError::already_exists(id));
        }
        entries.insert(
            id.to_string(),
            Entry {
                sequence: 0,
                document,
            },
        );
        Ok(())
    }

    fn get(&self, id: &str) -> StoreResult<ContentDocument> {
        self.entries
            .read()
            .get(id)
            .map(|entry| entry.document.clone())
            .ok_or_else(|| StoreError::not_found(id))
    }

    fn put(&self, id: &str, document: ContentDocument) -> StoreResult<()> {
        let mut entries = self.entries.write();
        match entries.get_mut(id) {
            Some(entry) => {
                entry.sequence += 1;
                entry.document = document;
            }
            None => {
                entries.insert(
                    id.to_string(),
                    Entry {
                        sequence: 0,
                        document,
                    },
                );
            }
        }
        Ok(())
    }

    fn update(&self, id: &str, operations: &[PatchOperation]) -> StoreResult<()> {
        let (sequence, current) = {
            let entries = self.entries.read();
            let entry = entries.get(id).ok_or_else(|| StoreError::not_found(id))?;
            (entry.sequence, entry.document.clone())
        };

        // Patch the persisted wrapper shape: operation paths address
        // /document/..., /decoder and friends.
        let mut wrapper = serde_json::to_value(&current)?;
        ctisync_patch::apply_all(&mut wrapper, operations)?;
        let normalized =
            normalize::normalize_payload(self.space, current.resource_type, &wrapper);

        let mut entries = self.entries.write();
        let entry = entries.get_mut(id).ok_or_else(|| StoreError::not_found(id))?;
        if entry.sequence != sequence {
            return Err(StoreError::version_conflict(id));
        }
        entry.sequence += 1;
        entry.document = normalized;
        Ok(())
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        if self.entries.write().remove(id).is_none() {
            debug!(id, space = %self.space, "delete of absent document, nothing to do");
        }
        Ok(())
    }

    fn exists(&self, id: &str) -> bool {
        self.entries.read().contains_key(id)
    }

    fn ids(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    fn content_hashes(&self) -> Vec<(String, String)> {
        self.entries
            .read()
            .iter()
            .map(|(id, entry)| (id.clone(), entry.document.space.hash.sha256.clone()))
            .collect()
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}
