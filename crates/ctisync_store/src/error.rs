//! Error types for store operations.

use ctisync_patch::PatchError;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The document id does not exist in this store.
    #[error("document not found: {id}")]
    NotFound {
        /// The missing document id.
        id: String,
    },

    /// The document id already exists in this store.
    #[error("document already exists: {id}")]
    AlreadyExists {
        /// The conflicting document id.
        id: String,
    },

    /// A concurrent writer modified the document between read and write.
    #[error("version conflict on document: {id}")]
    VersionConflict {
        /// The contended document id.
        id: String,
    },

    /// A patch operation failed against the stored document.
    #[error(transparent)]
    Patch(#[from] PatchError),

    /// The stored document could not be converted for patching.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Create a `NotFound` error for the given id.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create an `AlreadyExists` error for the given id.
    pub fn already_exists(id: impl Into<String>) -> Self {
        Self::AlreadyExists { id: id.into() }
    }

    /// Create a `VersionConflict` error for the given id.
    pub fn version_conflict(id: impl Into<String>) -> Self {
        Self::VersionConflict { id: id.into() }
    }

    /// Whether retrying the same call can succeed.
    ///
    /// Only version conflicts are transient; everything else reflects the
    /// state or content of the store and will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}
