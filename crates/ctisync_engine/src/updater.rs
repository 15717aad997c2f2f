//! Incremental change application.
//!
//! Once a consumer is bootstrapped it catches up by pulling change
//! records in bounded pages over the half-open window
//! `(current_offset, remote_head]` and applying them in ascending
//! offset order. The tracker advances once per fully applied page, so
//! a crash or failure replays at most one page.

use ctisync_model::{ChangePage, ChangeRecord, ChangeType, ConsumerInfo, ResourceType};
use ctisync_store::{ConsumerOffsetTracker, SpaceStores, StoreError};
use tracing::{debug, info, warn};

use crate::client::CatalogClient;
use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::synchronizer::remote_head;

/// Applies catalog change records on top of a bootstrapped space.
pub struct IncrementalUpdater<'a, C: CatalogClient> {
    config: &'a SyncConfig,
    client: &'a C,
    stores: &'a SpaceStores,
    tracker: &'a dyn ConsumerOffsetTracker,
}

impl<'a, C: CatalogClient> IncrementalUpdater<'a, C> {
    /// Creates an updater over the given client and stores.
    pub fn new(
        config: &'a SyncConfig,
        client: &'a C,
        stores: &'a SpaceStores,
        tracker: &'a dyn ConsumerOffsetTracker,
    ) -> Self {
        Self {
            config,
            client,
            stores,
            tracker,
        }
    }

    /// Catches the consumer up to the remote head, page by page.
    ///
    /// Returns the offset the consumer ended on. Already up to date is
    /// a no-op returning the current offset.
    ///
    /// # Errors
    ///
    /// A record that keeps failing after its retry budget fails the
    /// run; the failing page's offset is not advanced and the page is
    /// replayed on the next trigger.
    pub fn run(&self, local: &ConsumerInfo, remote: &ConsumerInfo) -> SyncResult<u64> {
        let head = remote_head(remote);
        let mut current = local.offset;
        if current >= head {
            return Ok(current);
        }
        info!(
            context = %self.config.context,
            consumer = %self.config.consumer,
            from = current,
            to = head,
            "applying incremental changes"
        );

        let page_size = self.config.page_size.max(1);
        let snapshot_link = remote
            .last_snapshot_link
            .clone()
            .or_else(|| local.last_snapshot_link.clone());
        while current < head {
            let to = head.min(current + page_size);
            let page = self
                .client
                .get_changes(current, to, self.config.with_empties)?;
            let records = page.data.len();
            let advanced_to = self.apply_page(page, to)?;

            let mut info = ConsumerInfo::new(&self.config.context, &self.config.consumer);
            info.offset = advanced_to;
            info.last_offset = head;
            info.last_snapshot_link = snapshot_link.clone();
            self.tracker.set(&info)?;
            debug!(records, offset = advanced_to, "change page applied");
            current = advanced_to;
        }
        Ok(current)
    }

    /// Applies one page in ascending offset order.
    ///
    /// Returns the offset to advance to: the page's highest offset, or
    /// the window end when the server omitted every record (trailing
    /// empty changes with `with_empties` off).
    fn apply_page(&self, mut page: ChangePage, window_end: u64) -> SyncResult<u64> {
        page.data.sort_by_key(|record| record.offset);
        let advanced_to = page.max_offset().unwrap_or(window_end);
        for record in &page.data {
            self.apply_with_retry(record)?;
            debug!(
                offset = record.offset,
                resource = %record.resource,
                change = record.change_type.as_str(),
                "applied change record"
            );
        }
        Ok(advanced_to)
    }

    fn apply_with_retry(&self, record: &ChangeRecord) -> SyncResult<()> {
        let budget = self.config.record_retry_budget.max(1);
        let mut attempt = 0;
        loop {
            match self.apply_record(record) {
                Ok(()) => return Ok(()),
                Err(err) if err.is_retryable() && attempt + 1 < budget => {
                    attempt += 1;
                    warn!(
                        offset = record.offset,
                        resource = %record.resource,
                        error = %err,
                        attempt,
                        "retrying change record"
                    );
                    std::thread::sleep(self.config.retry.delay_for_attempt(attempt));
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn apply_record(&self, record: &ChangeRecord) -> SyncResult<()> {
        match record.change_type {
            ChangeType::Create => self.apply_create(record),
            ChangeType::Update => self.apply_update(record),
            ChangeType::Delete => self.apply_delete(record),
        }
    }

    fn apply_create(&self, record: &ChangeRecord) -> SyncResult<()> {
        let Some(payload) = record.payload.as_ref() else {
            warn!(
                offset = record.offset,
                resource = %record.resource,
                "create change carries no payload, skipping"
            );
            return Ok(());
        };
        let Some(token) = record.payload_type() else {
            warn!(
                offset = record.offset,
                resource = %record.resource,
                "create change carries no payload type, skipping"
            );
            return Ok(());
        };
        let Some(resource_type) = ResourceType::parse(token) else {
            warn!(
                offset = record.offset,
                resource = %record.resource,
                payload_type = token,
                "unknown payload type, skipping create"
            );
            return Ok(());
        };

        match self.stores.create(resource_type, &record.resource, payload) {
            Ok(()) => Ok(()),
            Err(StoreError::AlreadyExists { .. }) => {
                debug!(
                    resource = %record.resource,
                    "document already present, treating create as applied"
                );
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn apply_update(&self, record: &ChangeRecord) -> SyncResult<()> {
        let Some(resource_type) = self.stores.locate(&record.resource) else {
            return Err(StoreError::not_found(&record.resource).into());
        };
        self.stores
            .store(resource_type)
            .update(&record.resource, &record.operations)?;
        Ok(())
    }

    fn apply_delete(&self, record: &ChangeRecord) -> SyncResult<()> {
        match self.stores.locate(&record.resource) {
            Some(resource_type) => {
                self.stores.store(resource_type).delete(&record.resource)?;
                Ok(())
            }
            None => {
                warn!(
                    offset = record.offset,
                    resource = %record.resource,
                    "delete for unknown document, skipping"
                );
                Ok(())
            }
        }
    }
}
