//! # CtiSync Engine
//!
//! Synchronization and promotion engine for the ctisync content catalog.
//!
//! This crate provides:
//! - Consumer synchronization (snapshot bootstrap + incremental catch-up)
//! - Offset tracking against the remote change log
//! - Safe snapshot archive extraction and bounded bulk loading
//! - Space promotion (draft → test → custom) with hash bookkeeping
//! - Retry with exponential backoff
//! - HTTP catalog client abstraction
//!
//! ## Architecture
//!
//! The engine implements a **catch-up** synchronization model:
//! 1. A consumer at offset 0 bootstraps from a full snapshot archive
//! 2. A consumer behind the remote head applies change records in
//!    ascending offset order, page by page
//! 3. A consumer at the head does nothing
//!
//! Synchronized content lands in the **draft** space; promotion copies
//! it onward to test and custom without ever touching the source copy.
//!
//! ## Key Invariants
//!
//! - The remote catalog is authoritative
//! - The consumer offset never moves past unapplied changes, and never
//!   moves at all on a failed run
//! - Change application is idempotent (replays are treated as applied)
//! - At most one sync run per consumer is in flight
//! - Archive entries escaping the extraction directory are rejected

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod archive;
mod bootstrap;
mod client;
mod config;
mod error;
mod http;
mod promoter;
mod synchronizer;
mod updater;

pub use archive::extract_archive;
pub use bootstrap::{BootstrapReport, SnapshotBootstrapper};
pub use client::{CatalogClient, MockCatalogClient};
pub use config::{RetryConfig, SyncConfig};
pub use error::{SyncError, SyncResult};
pub use http::HttpCatalogClient;
pub use promoter::SpacePromoter;
pub use synchronizer::{SyncOutcome, Synchronizer};
pub use updater::IncrementalUpdater;
