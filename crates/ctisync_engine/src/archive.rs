//! Snapshot archive extraction.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{SyncError, SyncResult};

/// Extracts a zip archive into `dest_dir` and returns the extracted
/// file paths.
///
/// Every entry's resolved path must remain inside the destination
/// directory; an entry that would escape it (absolute path or `..`
/// traversal) fails the whole extraction with `UnsafeArchiveEntry`.
///
/// # Errors
///
/// Returns `Archive` when the zip cannot be read, `UnsafeArchiveEntry`
/// for hostile entries and `Io` for filesystem failures.
pub fn extract_archive(archive_path: &Path, dest_dir: &Path) -> SyncResult<Vec<PathBuf>> {
    let file = File::open(archive_path)?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|err| SyncError::Archive(err.to_string()))?;
    std::fs::create_dir_all(dest_dir)?;

    let mut extracted = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|err| SyncError::Archive(err.to_string()))?;

        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            return Err(SyncError::UnsafeArchiveEntry {
                name: entry.name().to_string(),
            });
        };
        let target = dest_dir.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut output = File::create(&target)?;
        std::io::copy(&mut entry, &mut output)?;
        debug!(entry = %target.display(), "extracted archive entry");
        extracted.push(target);
    }
    Ok(extracted)
}
