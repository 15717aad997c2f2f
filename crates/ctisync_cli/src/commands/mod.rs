//! CLI command implementations.

pub mod hash;
pub mod preview;
pub mod promote;
pub mod status;
pub mod sync;
