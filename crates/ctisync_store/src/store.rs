//! Document store trait definition.

use ctisync_model::ContentDocument;
use ctisync_patch::PatchOperation;
use serde_json::Value;

use crate::error::StoreResult;

/// A document collection holding one resource type within one space.
///
/// Stores are **normalizing**: `create` and `update` run payload
/// normalization (sanitization, decoder YAML synthesis, content hash
/// recomputation) before persisting, so everything read back via `get`
/// is already in the persisted shape.
///
/// # Invariants
///
/// - At most one document exists per id
/// - `update` is all-or-nothing: a failing operation leaves the stored
///   document untouched
/// - Concurrent same-id writes fail with a retryable `VersionConflict`
///   instead of silently overwriting (per-document sequence
///   compare-and-set)
/// - `delete` is idempotent: deleting an absent id is success
/// - Stores must be `Send + Sync` for concurrent bulk loading
///
/// # Implementors
///
/// - [`super::InMemoryDocumentStore`] - the in-memory replica store
pub trait DocumentStore: Send + Sync {
    /// Normalizes and persists a new document.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if the id is already present. Bootstrap
    /// bulk loading treats that as already-applied.
    fn create(&self, id: &str, payload: &Value) -> StoreResult<()>;

    /// Reads the document stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is absent.
    fn get(&self, id: &str) -> StoreResult<ContentDocument>;

    /// Persists a document under `id`, overwriting any existing one.
    ///
    /// Used by space promotion, which copies already-normalized
    /// documents between spaces.
    ///
    /// # Errors
    ///
    /// Returns `VersionConflict` when losing a concurrent write race.
    fn put(&self, id: &str, document: ContentDocument) -> StoreResult<()>;

    /// Applies patch operations to the stored document, renormalizes and
    /// persists the result.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the id is absent, a `Patch` error if any
    /// operation fails (nothing is persisted in that case), and
    /// `VersionConflict` when losing a concurrent write race.
    fn update(&self, id: &str, operations: &[PatchOperation]) -> StoreResult<()>;

    /// Deletes the document stored under `id`, succeeding if it is
    /// already absent.
    ///
    /// # Errors
    ///
    /// Reserved for backend failures; absence is not an error.
    fn delete(&self, id: &str) -> StoreResult<()>;

    /// Whether a document exists under `id`.
    fn exists(&self, id: &str) -> bool;

    /// All document ids in this store.
    fn ids(&self) -> Vec<String>;

    /// `(id, sha256)` pairs for every document, for promotion diffing.
    fn content_hashes(&self) -> Vec<(String, String)>;

    /// Number of documents in this store.
    fn len(&self) -> usize;

    /// Whether this store holds no documents.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
