//! Consumer offset tracking records.

use serde::{Deserialize, Serialize};

/// Synchronization state of one (context, consumer) stream.
///
/// Mirrors the record returned by the remote catalog's consumer endpoint
/// and the record persisted locally between runs. Absent numeric fields
/// default to zero, which is the "never synchronized" state.
///
/// # Fields
///
/// - `context`: the catalog context the consumer subscribes to
/// - `name`: the consumer name within that context
/// - `offset`: last offset fully applied locally (0 = never synchronized)
/// - `last_offset`: highest offset known to exist at the remote source
/// - `last_snapshot_link`: URL of the most recent full snapshot archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerInfo {
    /// Catalog context.
    pub context: String,
    /// Consumer name within the context.
    pub name: String,
    /// Last offset fully applied locally.
    #[serde(default)]
    pub offset: u64,
    /// Highest offset known at the remote source.
    #[serde(default)]
    pub last_offset: u64,
    /// URL of the most recent full snapshot archive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_snapshot_link: Option<String>,
}

impl ConsumerInfo {
    /// Create a never-synchronized record for the given stream.
    pub fn new(context: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            name: name.into(),
            offset: 0,
            last_offset: 0,
            last_snapshot_link: None,
        }
    }

    /// The stable identifier this record is persisted under.
    pub fn doc_id(&self) -> String {
        format!("{}_{}", self.context, self.name)
    }

    /// Whether this consumer has never completed a synchronization.
    pub fn is_uninitialized(&self) -> bool {
        self.offset == 0
    }

    /// Whether remote offsets exist that have not been applied locally.
    pub fn has_pending_changes(&self) -> bool {
        self.offset < self.last_offset
    }
}

/// Envelope wrapping the consumer endpoint's response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsumerEnvelope {
    /// The consumer record.
    pub data: ConsumerInfo,
}
