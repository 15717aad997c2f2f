//! # CtiSync Patch
//!
//! JSON patch application and canonical content hashing for ctisync.
//!
//! This crate provides the two deterministic building blocks the rest of
//! the system is built on:
//! - A patch engine applying `add`, `remove`, `replace`, `move`, `copy`
//!   and `test` operations to a JSON document tree, with exact array
//!   index and append (`-`) addressing.
//! - A canonical SHA-256 content hash that is independent of object key
//!   order, so equal content hashes equal across spaces.
//!
//! ## Usage
//!
//! ```
//! use ctisync_patch::{apply, content_hash, PatchOperation};
//! use serde_json::json;
//!
//! let mut document = json!({"name": "rule-1001"});
//! let operation = PatchOperation::add("/severity", json!("high"));
//! apply(&mut document, &operation).unwrap();
//! assert_eq!(document, json!({"name": "rule-1001", "severity": "high"}));
//!
//! // Hashing ignores the order object keys arrived in.
//! let reordered = json!({"severity": "high", "name": "rule-1001"});
//! assert_eq!(content_hash(&document), content_hash(&reordered));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod engine;
mod error;
mod hash;
mod operation;
mod pointer;

pub use engine::{apply, apply_all};
pub use error::{PatchError, PatchResult};
pub use hash::{canonical_json, content_hash, sha256_hex};
pub use operation::{PatchOp, PatchOperation};
