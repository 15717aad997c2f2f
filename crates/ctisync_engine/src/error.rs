//! Error types for the sync engine.

use ctisync_model::{DiffOp, ResourceType, SpaceName};
use ctisync_store::StoreError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during synchronization and promotion.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Transport-level error talking to the remote catalog.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of what failed.
        message: String,
        /// Whether the next trigger may succeed.
        retryable: bool,
    },

    /// The remote catalog returned a response the engine cannot use.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A snapshot archive entry resolved outside the extraction directory.
    #[error("Unsafe archive entry: {name}")]
    UnsafeArchiveEntry {
        /// Name of the offending entry.
        name: String,
    },

    /// The snapshot archive could not be read.
    #[error("Archive error: {0}")]
    Archive(String),

    /// Filesystem failure while staging a snapshot.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A content store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// One or more snapshot entries failed to load during bootstrap.
    #[error("snapshot bulk load failed for {failed} of {total} entries")]
    BulkLoadFailed {
        /// Entries that could not be created.
        failed: u64,
        /// Entries the snapshot carried, skipped policies excluded.
        total: u64,
    },

    /// The space cannot act as a promotion source.
    #[error("space '{space}' cannot be promoted")]
    InvalidSourceSpace {
        /// The rejected source space.
        space: SpaceName,
    },

    /// A policy diff entry carried an operation other than update.
    #[error("invalid policy operation '{operation:?}': policies are only ever updated")]
    InvalidPolicyOperation {
        /// The rejected operation.
        operation: DiffOp,
    },

    /// A diff entry references a document the source space does not hold.
    #[error("resource '{id}' not found in {space} space")]
    MissingResource {
        /// The referenced document id.
        id: String,
        /// The space it was expected in.
        space: SpaceName,
    },

    /// Promotion completed for some resource types but not all.
    #[error("promotion failed for resource types {failed_types:?}")]
    PartialPromotionFailure {
        /// The types whose entries could not be applied.
        failed_types: Vec<ResourceType>,
    },
}

impl SyncError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        SyncError::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a fatal transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        SyncError::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Whether retrying the failed call can succeed.
    ///
    /// Transient transport failures and store version conflicts are
    /// retryable; everything else reflects the content or the request
    /// and will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Transport { retryable, .. } => *retryable,
            SyncError::Store(err) => err.is_retryable(),
            _ => false,
        }
    }
}
