//! Run orchestration.
//!
//! One `Synchronizer` drives one (context, consumer) pair. Each
//! trigger fetches the remote consumer record, then either bootstraps
//! from a snapshot (first contact), applies incremental changes, or
//! does nothing. At most one run is in flight at a time; triggers
//! arriving during a run are dropped, not queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ctisync_model::{ConsumerInfo, SpaceName};
use ctisync_store::{ConsumerOffsetTracker, ContentStores};
use tracing::{info, warn};

use crate::bootstrap::SnapshotBootstrapper;
use crate::client::CatalogClient;
use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::updater::IncrementalUpdater;

/// What a sync run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Local and remote offsets already match.
    NoNewContent,
    /// First contact: the snapshot was loaded and the consumer jumped
    /// straight to the remote head.
    Bootstrapped {
        /// The offset the consumer advanced to.
        offset: u64,
    },
    /// Change records were applied.
    Applied {
        /// The offset the consumer ended on.
        new_offset: u64,
    },
    /// Another run was in flight; this trigger was dropped.
    SkippedAlreadyRunning,
}

/// The highest offset a remote consumer record attests.
pub(crate) fn remote_head(remote: &ConsumerInfo) -> u64 {
    remote.offset.max(remote.last_offset)
}

/// Drives one consumer against the remote catalog.
pub struct Synchronizer<C: CatalogClient> {
    config: SyncConfig,
    client: C,
    stores: Arc<ContentStores>,
    tracker: Arc<dyn ConsumerOffsetTracker>,
    running: AtomicBool,
}

impl<C: CatalogClient> Synchronizer<C> {
    /// Creates a synchronizer writing into the draft space of `stores`.
    pub fn new(
        config: SyncConfig,
        client: C,
        stores: Arc<ContentStores>,
        tracker: Arc<dyn ConsumerOffsetTracker>,
    ) -> Self {
        Self {
            config,
            client,
            stores,
            tracker,
            running: AtomicBool::new(false),
        }
    }

    /// Runs one synchronization pass.
    ///
    /// Consumer offset 0 selects the bootstrap path, a local offset
    /// behind the remote head selects incremental catch-up, an offset
    /// at the head is a no-op. A trigger arriving while another run is
    /// active returns `SkippedAlreadyRunning` without touching
    /// anything.
    ///
    /// # Errors
    ///
    /// Any failure leaves the consumer offset where the last fully
    /// applied page (or bootstrap) put it; the next trigger picks up
    /// from there.
    pub fn run(&self) -> SyncResult<SyncOutcome> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!(
                context = %self.config.context,
                consumer = %self.config.consumer,
                "sync already in flight, dropping trigger"
            );
            return Ok(SyncOutcome::SkippedAlreadyRunning);
        }
        let outcome = self.run_locked();
        self.running.store(false, Ordering::SeqCst);
        outcome
    }

    fn run_locked(&self) -> SyncResult<SyncOutcome> {
        let remote = self.client.get_catalog()?;
        let local = self
            .tracker
            .get(&self.config.context, &self.config.consumer)?;
        let head = remote_head(&remote);
        let stores = self.stores.for_space(SpaceName::Draft);

        if local.is_uninitialized() && head > 0 {
            let bootstrapper =
                SnapshotBootstrapper::new(&self.config, &self.client, stores, self.tracker.as_ref());
            let report = bootstrapper.run(&remote)?;
            info!(
                offset = head,
                created = report.created,
                "sync run bootstrapped the consumer"
            );
            return Ok(SyncOutcome::Bootstrapped { offset: head });
        }

        if local.offset < head {
            let updater =
                IncrementalUpdater::new(&self.config, &self.client, stores, self.tracker.as_ref());
            let new_offset = updater.run(&local, &remote)?;
            info!(offset = new_offset, "sync run applied new content");
            return Ok(SyncOutcome::Applied { new_offset });
        }

        info!(offset = local.offset, "no new content to synchronize");
        Ok(SyncOutcome::NoNewContent)
    }
}
