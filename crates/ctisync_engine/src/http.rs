//! HTTP catalog client implementation.
//!
//! Talks to the catalog's consumer endpoints over blocking HTTP with
//! bounded timeouts. Transport failures and non-2xx statuses map to
//! retryable transport errors; undecodable bodies are protocol errors.

use std::path::{Path, PathBuf};

use ctisync_model::{ChangePage, ConsumerEnvelope, ConsumerInfo};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::{archive_file_name, CatalogClient};
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};

/// A catalog client over blocking HTTP.
pub struct HttpCatalogClient {
    /// Base URL of the catalog service (e.g. "https://cti.example.com").
    base_url: String,
    /// Catalog context to address.
    context: String,
    /// Consumer name within the context.
    consumer: String,
    /// The underlying HTTP client.
    client: reqwest::blocking::Client,
    /// Last error message.
    last_error: RwLock<Option<String>>,
}

impl HttpCatalogClient {
    /// Creates a client from a sync configuration.
    ///
    /// # Errors
    ///
    /// Returns a fatal transport error if the HTTP client cannot be
    /// built.
    pub fn new(config: &SyncConfig) -> SyncResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()
            .map_err(|err| {
                SyncError::transport_fatal(format!("failed to build HTTP client: {err}"))
            })?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            context: config.context.clone(),
            consumer: config.consumer.clone(),
            client,
            last_error: RwLock::new(None),
        })
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the last error message.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    fn set_error(&self, err: &str) {
        *self.last_error.write() = Some(err.to_string());
    }

    fn clear_error(&self) {
        *self.last_error.write() = None;
    }

    fn consumer_url(&self) -> String {
        format!(
            "{}/api/v1/catalog/contexts/{}/consumers/{}",
            self.base_url, self.context, self.consumer
        )
    }

    fn changes_url(&self, from_offset: u64, to_offset: u64, with_empties: bool) -> String {
        format!(
            "{}/changes?from_offset={}&to_offset={}&with_empties={}",
            self.consumer_url(),
            from_offset,
            to_offset,
            with_empties
        )
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> SyncResult<T> {
        debug!(url, "catalog request");
        let response = self.client.get(url).send().map_err(|err| {
            self.set_error(&err.to_string());
            SyncError::transport_retryable(format!("GET {url} failed: {err}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = format!("GET {url} returned {status}");
            self.set_error(&message);
            return Err(SyncError::transport_retryable(message));
        }

        self.clear_error();
        response.json::<T>().map_err(|err| {
            SyncError::Protocol(format!("failed to decode response from {url}: {err}"))
        })
    }
}

impl CatalogClient for HttpCatalogClient {
    fn get_catalog(&self) -> SyncResult<ConsumerInfo> {
        let envelope: ConsumerEnvelope = self.get_json(&self.consumer_url())?;
        Ok(envelope.data)
    }

    fn get_changes(
        &self,
        from_offset: u64,
        to_offset: u64,
        with_empties: bool,
    ) -> SyncResult<ChangePage> {
        self.get_json(&self.changes_url(from_offset, to_offset, with_empties))
    }

    fn download(&self, url: &str, dest_dir: &Path) -> SyncResult<PathBuf> {
        debug!(url, "snapshot download");
        let mut response = self.client.get(url).send().map_err(|err| {
            self.set_error(&err.to_string());
            SyncError::transport_retryable(format!("GET {url} failed: {err}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = format!("GET {url} returned {status}");
            self.set_error(&message);
            return Err(SyncError::transport_retryable(message));
        }

        self.clear_error();
        let path = dest_dir.join(archive_file_name(url));
        let mut file = std::fs::File::create(&path)?;
        response.copy_to(&mut file).map_err(|err| {
            SyncError::transport_retryable(format!("download of {url} failed: {err}"))
        })?;
        Ok(path)
    }
}
