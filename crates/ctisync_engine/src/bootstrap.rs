//! First-time synchronization from a full snapshot.
//!
//! When a consumer has never synchronized (offset 0), the engine
//! downloads the catalog's snapshot archive, extracts the per-type
//! NDJSON content files and bulk-loads every document into the space's
//! stores. On full success the consumer record jumps straight to the
//! remote head offset; on any failure the offset is left untouched so
//! the next trigger re-bootstraps from scratch.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, SyncSender};

use ctisync_model::{ConsumerInfo, ResourceType};
use ctisync_store::{ConsumerOffsetTracker, SpaceStores, StoreError};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::archive::extract_archive;
use crate::client::CatalogClient;
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::synchronizer::remote_head;

/// Counters from one bootstrap run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Documents created in the store.
    pub created: u64,
    /// Documents that already existed, treated as applied.
    pub already_present: u64,
    /// Entries that could not be parsed or created.
    pub failed: u64,
    /// Policy lines skipped; the policy arrives via the change stream.
    pub skipped_policies: u64,
    /// Content files found in the archive.
    pub files: usize,
}

impl BootstrapReport {
    /// Entries the snapshot carried, skipped policies excluded.
    pub fn total(&self) -> u64 {
        self.created + self.already_present + self.failed
    }
}

/// Loads a consumer's full snapshot into the space's stores.
pub struct SnapshotBootstrapper<'a, C: CatalogClient> {
    config: &'a SyncConfig,
    client: &'a C,
    stores: &'a SpaceStores,
    tracker: &'a dyn ConsumerOffsetTracker,
}

impl<'a, C: CatalogClient> SnapshotBootstrapper<'a, C> {
    /// Creates a bootstrapper over the given client and stores.
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

    /// Runs the bootstrap end to end.
    ///
    /// Staging files are removed when the run finishes, success or
    /// failure. The consumer record is advanced only on full success.
    ///
    /// # Errors
    ///
    /// Returns `Protocol` when the remote record carries no snapshot
    /// link, `UnsafeArchiveEntry`/`Archive`/`Io` for archive problems
    /// and `BulkLoadFailed` when any entry could not be loaded.
    pub fn run(&self, remote: &ConsumerInfo) -> SyncResult<BootstrapReport> {
        let link = remote
            .last_snapshot_link
            .as_deref()
            .filter(|link| !link.is_empty())
            .ok_or_else(|| {
                SyncError::Protocol("consumer metadata carries no snapshot link".into())
            })?;
        info!(
            context = %self.config.context,
            consumer = %self.config.consumer,
            link,
            "starting snapshot bootstrap"
        );

        let staging = Staging::create(self.config.working_dir.as_deref())?;
        let download_dir = staging.path().join("download");
        let content_dir = staging.path().join("content");
        std::fs::create_dir_all(&download_dir)?;

        let archive_path = self.client.download(link, &download_dir)?;
        extract_archive(&archive_path, &content_dir)?;

        let files = discover_content_files(&content_dir)?;
        info!(files = files.len(), "discovered snapshot content files");

        let report = self.bulk_load(&files)?;
        if report.failed > 0 {
            return Err(SyncError::BulkLoadFailed {
                failed: report.failed,
                total: report.total(),
            });
        }

        let head = remote_head(remote);
        let mut info = ConsumerInfo::new(&self.config.context, &self.config.consumer);
        info.offset = head;
        info.last_offset = head;
        info.last_snapshot_link = Some(link.to_string());
        self.tracker.set(&info)?;

        info!(
            offset = head,
            created = report.created,
            already_present = report.already_present,
            skipped_policies = report.skipped_policies,
            "snapshot bootstrap complete"
        );
        Ok(report)
    }

    /// Parses the content files and creates their documents through a
    /// bounded worker pool.
    fn bulk_load(&self, files: &[PathBuf]) -> SyncResult<BootstrapReport> {
        let created = AtomicU64::new(0);
        let already_present = AtomicU64::new(0);
        let failed = AtomicU64::new(0);
        let skipped_policies = AtomicU64::new(0);

        let workers = self.config.max_concurrent_batches.max(1);
        let (sender, receiver) = mpsc::sync_channel::<Vec<SnapshotEntry>>(workers);
        let receiver = Mutex::new(receiver);

        std::thread::scope(|scope| -> SyncResult<()> {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let batch = match receiver.lock().recv() {
                        Ok(batch) => batch,
                        Err(_) => break,
                    };
                    self.apply_batch(batch, &created, &already_present, &failed);
                });
            }

            for file in files {
                self.feed_file(file, &sender, &failed, &skipped_policies)?;
            }
            drop(sender);
            Ok(())
        })?;

        Ok(BootstrapReport {
            created: created.load(Ordering::SeqCst),
            already_present: already_present.load(Ordering::SeqCst),
            failed: failed.load(Ordering::SeqCst),
            skipped_policies: skipped_policies.load(Ordering::SeqCst),
            files: files.len(),
        })
    }

    /// Reads one NDJSON file and submits its entries in batches.
    fn feed_file(
        &self,
        path: &Path,
        sender: &SyncSender<Vec<SnapshotEntry>>,
        failed: &AtomicU64,
        skipped_policies: &AtomicU64,
    ) -> SyncResult<()> {
        let batch_size = self.config.bulk_batch_size.max(1);
        let reader = BufReader::new(File::open(path)?);
        let mut batch = Vec::with_capacity(batch_size);

        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match classify_line(trimmed) {
                LineOutcome::Entry(entry) => {
                    batch.push(entry);
                    if batch.len() >= batch_size {
                        submit(sender, std::mem::take(&mut batch))?;
                    }
                }
                LineOutcome::SkippedPolicy => {
                    debug!(file = %path.display(), "skipping policy snapshot line");
                    skipped_policies.fetch_add(1, Ordering::SeqCst);
                }
                LineOutcome::Malformed(reason) => {
                    warn!(
                        file = %path.display(),
                        reason = %reason,
                        "skipping malformed snapshot line"
                    );
                    failed.fetch_add(1, Ordering::SeqCst);
                }
            }
        }
        if !batch.is_empty() {
            submit(sender, batch)?;
        }
        Ok(())
    }

    fn apply_batch(
        &self,
        batch: Vec<SnapshotEntry>,
        created: &AtomicU64,
        already_present: &AtomicU64,
        failed: &AtomicU64,
    ) {
        for entry in batch {
            match self
                .stores
                .create(entry.resource_type, &entry.id, &entry.payload)
            {
                Ok(()) => {
                    created.fetch_add(1, Ordering::SeqCst);
                }
                Err(StoreError::AlreadyExists { .. }) => {
                    debug!(id = %entry.id, "document already present, treating as applied");
                    already_present.fetch_add(1, Ordering::SeqCst);
                }
                Err(err) => {
                    warn!(
                        id = %entry.id,
                        resource_type = %entry.resource_type,
                        error = %err,
                        "bulk create failed"
                    );
                    failed.fetch_add(1, Ordering::SeqCst);
                }
            }
        }
    }
}

fn submit(sender: &SyncSender<Vec<SnapshotEntry>>, batch: Vec<SnapshotEntry>) -> SyncResult<()> {
    sender
        .send(batch)
        .map_err(|_| SyncError::Protocol("bulk load workers exited early".into()))
}

/// One loadable document parsed from a snapshot line.
struct SnapshotEntry {
    resource_type: ResourceType,
    id: String,
    payload: Value,
}

enum LineOutcome {
    Entry(SnapshotEntry),
    SkippedPolicy,
    Malformed(String),
}

/// Classifies one snapshot line.
///
/// Lines may wrap the content under a top-level `payload` key or be the
/// payload itself; the payload may nest the content under `document` or
/// (IoC records) be the document itself. The id is read from the
/// document subtree.
fn classify_line(line: &str) -> LineOutcome {
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(err) => return LineOutcome::Malformed(format!("invalid JSON: {err}")),
    };
    let payload = match value.get("payload") {
        Some(payload) if payload.is_object() => payload,
        _ => &value,
    };

    let Some(type_token) = payload.get("type").and_then(Value::as_str) else {
        return LineOutcome::Malformed("missing payload type".to_string());
    };
    if type_token.eq_ignore_ascii_case("policy") {
        return LineOutcome::SkippedPolicy;
    }
    let Some(resource_type) = ResourceType::parse(type_token) else {
        return LineOutcome::Malformed(format!("unknown payload type '{type_token}'"));
    };

    let document = match payload.get("document") {
        Some(document) if document.is_object() => document,
        _ => payload,
    };
    let Some(id) = document.get("id").and_then(Value::as_str) else {
        return LineOutcome::Malformed("missing document id".to_string());
    };

    LineOutcome::Entry(SnapshotEntry {
        resource_type,
        id: id.to_string(),
        payload: payload.clone(),
    })
}

/// All `*.json` content files under `dir`, recursively, in path order.
fn discover_content_files(dir: &Path) -> SyncResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Per-run staging directory, removed when the run ends.
enum Staging {
    Temp(tempfile::TempDir),
    Managed(PathBuf),
}

impl Staging {
    fn create(working_dir: Option<&Path>) -> SyncResult<Self> {
        match working_dir {
            Some(dir) => {
                let stamp = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_millis();
                let path = dir.join(format!("snapshot_{stamp}"));
                std::fs::create_dir_all(&path)?;
                Ok(Staging::Managed(path))
            }
            None => Ok(Staging::Temp(tempfile::tempdir()?)),
        }
    }

    fn path(&self) -> &Path {
        match self {
            Staging::Temp(dir) => dir.path(),
            Staging::Managed(path) => path,
        }
    }
}

impl Drop for Staging {
    fn drop(&mut self) {
        if let Staging::Managed(path) = self {
            if let Err(err) = std::fs::remove_dir_all(&path) {
                debug!(
                    path = %path.display(),
                    error = %err,
                    "failed to remove snapshot staging directory"
                );
            }
        }
    }
}
