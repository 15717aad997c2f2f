//! # CtiSync Store
//!
//! Document stores, offset tracking and payload normalization for
//! ctisync.
//!
//! This crate provides:
//! - `DocumentStore`, the per-type per-space collection trait
//! - `InMemoryDocumentStore` with per-document sequence compare-and-set
//! - `ConsumerOffsetTracker` for synchronization progress records
//! - `SpaceStores`/`ContentStores` registries routing ids to typed stores
//! - The normalization layer: metadata sanitization, decoder YAML
//!   synthesis, canonical content hash recomputation

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod memory;
mod normalize;
mod offsets;
mod registry;
mod store;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryDocumentStore;
pub use normalize::{decoder_yaml, normalize_payload, sanitize_document};
pub use offsets::{ConsumerOffsetTracker, InMemoryOffsetTracker};
pub use registry::{ContentStores, SpaceStores};
pub use store::DocumentStore;
