//! Per-space store registries.

use std::sync::Arc;

use ctisync_model::{ResourceType, SpaceName};
use serde_json::Value;

use crate::error::StoreResult;
use crate::memory::InMemoryDocumentStore;
use crate::store::DocumentStore;

fn slot(resource_type: ResourceType) -> usize {
    match resource_type {
        ResourceType::Rule => 0,
        ResourceType::Decoder => 1,
        ResourceType::Integration => 2,
        ResourceType::Kvdb => 3,
        ResourceType::Policy => 4,
        ResourceType::Ioc => 5,
        ResourceType::Filter => 6,
    }
}

/// One store per resource type, all belonging to the same space.
pub struct SpaceStores {
    space: SpaceName,
    stores: [Arc<dyn DocumentStore>; 7],
}

impl SpaceStores {
    /// Creates in-memory stores for every resource type in a space.
    #[must_use]
    pub fn in_memory(space: SpaceName) -> Self {
        Self {
            space,
            stores: ResourceType::ALL
                .map(|rt| Arc::new(InMemoryDocumentStore::new(space, rt)) as Arc<dyn DocumentStore>),
        }
    }

    /// The space these stores belong to.
    pub fn space(&self) -> SpaceName {
        self.space
    }

    /// The store holding the given resource type.
    pub fn store(&self, resource_type: ResourceType) -> &Arc<dyn DocumentStore> {
        &self.stores[slot(resource_type)]
    }

    /// Normalizes and persists a new document in the typed store.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if the id is already present.
    pub fn create(
        &self,
        resource_type: ResourceType,
        id: &str,
        payload: &Value,
    ) -> StoreResult<()> {
        self.store(resource_type).create(id, payload)
    }

    /// Finds which resource type holds the given id, if any.
    ///
    /// Update and delete records carry no resource type; the id is
    /// located by probing each typed store in catalog order.
    pub fn locate(&self, id: &str) -> Option<ResourceType> {
        ResourceType::ALL
            .into_iter()
            .find(|rt| self.store(*rt).exists(id))
    }

    /// Total number of documents across all typed stores.
    pub fn len(&self) -> usize {
        self.stores.iter().map(|store| store.len()).sum()
    }

    /// Whether every typed store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The three per-space registries the system operates on.
pub struct ContentStores {
    draft: SpaceStores,
    test: SpaceStores,
    custom: SpaceStores,
}

impl ContentStores {
    /// Creates in-memory stores for every space.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            draft: SpaceStores::in_memory(SpaceName::Draft),
            test: SpaceStores::in_memory(SpaceName::Test),
            custom: SpaceStores::in_memory(SpaceName::Custom),
        }
    }

    /// The registry for one space.
    pub fn for_space(&self, space: SpaceName) -> &SpaceStores {
        match space {
            SpaceName::Draft => &self.draft,
            SpaceName::Test => &self.test,
            SpaceName::Custom => &self.custom,
        }
    }
}

impl Default for ContentStores {
    fn default() -> Self {
        Self::in_memory()
    }
}
