//! # CtiSync Model
//!
//! Catalog domain and wire types for ctisync.
//!
//! This crate provides:
//! - `ResourceType` and `SpaceName` for the catalog taxonomy
//! - `ConsumerInfo` for offset tracking records
//! - `ChangeRecord`/`ChangePage` for the change stream
//! - `ContentDocument` for the persisted shape
//! - `SpaceDiff` for promotion requests
//!
//! This is a pure data crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod changes;
mod consumer;
mod diff;
mod document;
mod resource;
mod space;

pub use changes::{ChangePage, ChangeRecord, ChangeType};
pub use consumer::{ConsumerEnvelope, ConsumerInfo};
pub use diff::{DiffEntry, DiffOp, SpaceChanges, SpaceDiff};
pub use document::{ContentDocument, SpaceHash, SpaceInfo};
pub use resource::ResourceType;
pub use space::{ParseSpaceError, SpaceName};
