//! # CtiSync Testkit
//!
//! Test utilities for ctisync.
//!
//! This crate provides:
//! - Sample catalog payloads per resource type
//! - Snapshot archive builders for bootstrap tests
//! - Pre-populated content stores
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ctisync_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_snapshot() {
//!     let zip = write_snapshot_zip(
//!         &dir.join("snapshot.zip"),
//!         &[("rules.json", vec![snapshot_line(ResourceType::Rule, "rule-1")])],
//!     );
//!     // ... drive a bootstrap against the archive
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
