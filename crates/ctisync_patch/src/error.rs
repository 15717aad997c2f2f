//! Error types for patch application.

use thiserror::Error;

/// Result type for patch operations.
pub type PatchResult<T> = Result<T, PatchError>;

/// Errors that can occur while applying patch operations to a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// A path (or `from` path) did not resolve to an existing location.
    #[error("path not found: {path}")]
    PathNotFound {
        /// The path that failed to resolve.
        path: String,
    },

    /// A `test` operation found a value that differs from the expected one.
    #[error("test failed at path: {path}")]
    TestFailed {
        /// The path whose value did not match.
        path: String,
    },

    /// The operation name is not one of the six supported operations.
    #[error("unsupported patch operation: {op}")]
    UnsupportedOperation {
        /// The literal operation string as received.
        op: String,
    },

    /// A `move` or `copy` operation arrived without its `from` field.
    #[error("missing 'from' field for {op} operation")]
    MissingFrom {
        /// The operation that required the field.
        op: String,
    },
}

impl PatchError {
    /// Create a `PathNotFound` error for the given path.
    pub fn path_not_found(path: impl Into<String>) -> Self {
        Self::PathNotFound { path: path.into() }
    }

    /// Create a `TestFailed` error for the given path.
    pub fn test_failed(path: impl Into<String>) -> Self {
        Self::TestFailed { path: path.into() }
    }
}
