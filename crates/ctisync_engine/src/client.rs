//! Catalog client abstraction.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use ctisync_model::{ChangePage, ConsumerInfo};

use crate::error::{SyncError, SyncResult};

/// A catalog client fetches consumer metadata, change windows and
/// snapshot archives from the remote catalog service.
///
/// This trait abstracts the transport, allowing for different
/// implementations (HTTP, mock for testing, etc.). Transport failures
/// and non-2xx remote statuses are both "retry later" conditions; the
/// engine distinguishes them only for logging.
pub trait CatalogClient: Send + Sync {
    /// Fetches the remote consumer record, including the head offset
    /// and the last snapshot link.
    fn get_catalog(&self) -> SyncResult<ConsumerInfo>;

    /// Fetches the change records in the window `(from_offset, to_offset]`.
    fn get_changes(
        &self,
        from_offset: u64,
        to_offset: u64,
        with_empties: bool,
    ) -> SyncResult<ChangePage>;

    /// Downloads the archive at `url` into `dest_dir`, named by the
    /// URL's final path segment, and returns the file's path.
    fn download(&self, url: &str, dest_dir: &Path) -> SyncResult<PathBuf>;
}

/// The file name for a downloaded archive: the final path segment of
/// its URL, query string and fragment stripped.
pub(crate) fn archive_file_name(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path.rsplit_once('/') {
        Some((_, name)) if !name.is_empty() => name,
        _ => "snapshot.zip",
    }
}

/// A mock catalog client for testing.
#[derive(Debug, Default)]
pub struct MockCatalogClient {
    connected: std::sync::atomic::AtomicBool,
    catalog_response: std::sync::Mutex<Option<ConsumerInfo>>,
    change_pages: std::sync::Mutex<VecDeque<ChangePage>>,
    snapshot_file: std::sync::Mutex<Option<PathBuf>>,
    requested_windows: std::sync::Mutex<Vec<(u64, u64)>>,
}

impl MockCatalogClient {
    /// Creates a new mock catalog client.
    pub fn new() -> Self {
        Self {
            connected: std::sync::atomic::AtomicBool::new(true),
            catalog_response: std::sync::Mutex::new(None),
            change_pages: std::sync::Mutex::new(VecDeque::new()),
            snapshot_file: std::sync::Mutex::new(None),
            requested_windows: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Sets the consumer record returned by `get_catalog`.
    pub fn set_catalog_response(&self, response: ConsumerInfo) {
        *self.catalog_response.lock().unwrap() = Some(response);
    }

    /// Queues a change page; each `get_changes` call consumes one.
    pub fn push_change_page(&self, page: ChangePage) {
        self.change_pages.lock().unwrap().push_back(page);
    }

    /// Sets the local file `download` copies into the destination.
    pub fn set_snapshot_file(&self, path: impl Into<PathBuf>) {
        *self.snapshot_file.lock().unwrap() = Some(path.into());
    }

    /// Sets the connected state.
    pub fn set_connected(&self, connected: bool) {
        self.connected
            .store(connected, std::sync::atomic::Ordering::SeqCst);
    }

    /// Whether the mock is connected.
    pub fn is_connected(&self) -> bool {
        self.connected.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// The `(from_offset, to_offset)` windows requested so far.
    pub fn requested_windows(&self) -> Vec<(u64, u64)> {
        self.requested_windows.lock().unwrap().clone()
    }
}

impl CatalogClient for MockCatalogClient {
    fn get_catalog(&self) -> SyncResult<ConsumerInfo> {
        if !self.is_connected() {
            return Err(SyncError::transport_retryable("mock client is disconnected"));
        }
        self.catalog_response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SyncError::Protocol("No mock catalog response set".into()))
    }

    fn get_changes(
        &self,
        from_offset: u64,
        to_offset: u64,
        _with_empties: bool,
    ) -> SyncResult<ChangePage> {
        if !self.is_connected() {
            return Err(SyncError::transport_retryable("mock client is disconnected"));
        }
        self.requested_windows
            .lock()
            .unwrap()
            .push((from_offset, to_offset));
        self.change_pages
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| SyncError::Protocol("No mock change page queued".into()))
    }

    fn download(&self, url: &str, dest_dir: &Path) -> SyncResult<PathBuf> {
        if !self.is_connected() {
            return Err(SyncError::transport_retryable("mock client is disconnected"));
        }
        let source = self
            .snapshot_file
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SyncError::Protocol("No mock snapshot file set".into()))?;
        let target = dest_dir.join(archive_file_name(url));
        std::fs::copy(&source, &target)?;
        Ok(target)
    }
}
