//! Hash command implementation.

use std::path::Path;

use ctisync_patch::content_hash;
use serde::Serialize;
use serde_json::Value;

/// Canonical hash of one JSON document.
#[derive(Debug, Serialize)]
pub struct HashResult {
    /// The hashed file.
    pub path: String,
    /// Canonical SHA-256 of the document, lowercase hex.
    pub sha256: String,
}

/// Runs the hash command.
///
/// The hash is computed over the canonical form of the file's JSON
/// value (object keys sorted at every level), so it matches the
/// `space.hash.sha256` the catalog stores for the same content.
pub fn run(file: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(file)?;
    let value: Value = serde_json::from_str(&text)?;

    let result = HashResult {
        path: file.display().to_string(),
        sha256: content_hash(&value),
    };

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}  {}", result.sha256, result.path);
    }

    Ok(())
}
