//! Consumer offset tracking.

use std::collections::HashMap;

use ctisync_model::ConsumerInfo;
use parking_lot::RwLock;

use crate::error::StoreResult;

/// Persists, per (context, consumer) pair, the last applied offset and
/// the last known snapshot location.
///
/// # Invariants
///
/// - `get` never fails on absence: a missing record is the valid
///   "never synchronized" state and comes back with zero offsets
/// - Callers invoke `set` only after local application fully succeeded,
///   so a crashed or failed run leaves the stored offset unchanged
pub trait ConsumerOffsetTracker: Send + Sync {
    /// Reads the record for a stream, zero offsets when none exists.
    ///
    /// # Errors
    ///
    /// Reserved for backend failures; absence is not an error.
    fn get(&self, context: &str, consumer: &str) -> StoreResult<ConsumerInfo>;

    /// Upserts the record, keyed `"{context}_{consumer}"`.
    ///
    /// # Errors
    ///
    /// Reserved for backend failures.
    fn set(&self, info: &ConsumerInfo) -> StoreResult<()>;
}

/// An in-memory offset tracker.
#[derive(Default)]
pub struct InMemoryOffsetTracker {
    records: RwLock<HashMap<String, ConsumerInfo>>,
}

impl InMemoryOffsetTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConsumerOffsetTracker for InMemoryOffsetTracker {
    fn get(&self, context: &str, consumer: &str) -> StoreResult<ConsumerInfo> {
        let key = format!("{context}_{consumer}");
        Ok(self
            .records
            .read()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| ConsumerInfo::new(context, consumer)))
    }

    fn set(&self, info: &ConsumerInfo) -> StoreResult<()> {
        self.records.write().insert(info.doc_id(), info.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_record_reads_as_uninitialized() {
        let tracker = InMemoryOffsetTracker::new();
        let info = tracker.get("ctx", "consumer").unwrap();
        assert_eq!(info.offset, 0);
        assert_eq!(info.last_offset, 0);
        assert!(info.is_uninitialized());
    }

    #[test]
    fn set_then_get_round_trips() {
        let tracker = InMemoryOffsetTracker::new();
        let mut info = ConsumerInfo::new("ctx", "consumer");
        info.offset = 42;
        info.last_offset = 100;
        info.last_snapshot_link = Some("https://cti.example/snap.zip".to_string());
        tracker.set(&info).unwrap();
        assert_eq!(tracker.get("ctx", "consumer").unwrap(), info);
    }

    #[test]
    fn streams_are_tracked_independently() {
        let tracker = InMemoryOffsetTracker::new();
        let mut a = ConsumerInfo::new("ctx", "a");
        a.offset = 1;
        tracker.set(&a).unwrap();
        assert_eq!(tracker.get("ctx", "b").unwrap().offset, 0);
    }
}
