//! Local folder scan: immediate subdirectory names as candidate bands
//!
//! Music libraries are commonly laid out as `<root>/<Artist>/<Album>/...`, so
//! the first directory level is read as a list of artists.

use std::path::Path;
use walkdir::WalkDir;

use crate::error::{TrackerError, TrackerResult};
use crate::models::distinct_names;

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Names of the non-hidden subdirectories of `root`, sorted
///
/// A missing, non-directory or unreadable root is reported as
/// [`TrackerError::CapabilityUnavailable`].
pub fn scan_band_folders(root: &Path) -> TrackerResult<Vec<String>> {
    tracing::debug!(root = %root.display(), "Scanning folder for band directories");

    if !root.is_dir() {
        tracing::warn!(root = %root.display(), "Folder scan target is not a directory");
        return Err(TrackerError::CapabilityUnavailable(format!(
            "Cannot scan '{}': not an accessible directory",
            root.display()
        )));
    }

    let mut names = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            tracing::warn!(root = %root.display(), error = %e, "Folder scan failed");
            TrackerError::CapabilityUnavailable(format!(
                "Cannot scan '{}': {}",
                root.display(),
                e
            ))
        })?;

        if !entry.file_type().is_dir() {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            tracing::debug!(path = %entry.path().display(), "Skipping non UTF-8 directory name");
            continue;
        };

        if !is_hidden(name) {
            names.push(name.to_string());
        }
    }

    names.sort();
    let names = distinct_names(names);
    tracing::info!(root = %root.display(), found = names.len(), "Folder scan complete");
    Ok(names)
}
