//! Band import: discover candidate names, let the user pick, then merge
//!
//! Discovery never touches the library. The chosen names are merged in one
//! state update by the tracker.

use std::collections::HashSet;
use std::path::PathBuf;

use super::folder_scanner::scan_band_folders;
use super::gateway::ConcertGateway;
use crate::error::{TrackerError, TrackerResult};
use crate::models::distinct_names;

/// Where candidate band names come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSource {
    /// Free-form text dump (playlist export, library listing)
    Text(String),
    /// Public playlist or library page
    Url(String),
    /// Local folder whose subdirectories are artists
    Folder(PathBuf),
}

impl ImportSource {
    pub fn label(&self) -> &'static str {
        match self {
            ImportSource::Text(_) => "text",
            ImportSource::Url(_) => "url",
            ImportSource::Folder(_) => "folder",
        }
    }
}

/// Names found by a discovery, with the user's current selection
///
/// Every found name starts selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSelection {
    found: Vec<String>,
    selected: HashSet<String>,
}

impl ImportSelection {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let found = distinct_names(names);
        let selected = found.iter().cloned().collect();
        Self { found, selected }
    }

    /// Nothing was found: the explicit "no results" state
    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
    }

    pub fn found(&self) -> &[String] {
        &self.found
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.contains(name)
    }

    /// Flip one name; names that were not found are ignored
    pub fn toggle(&mut self, name: &str) {
        if !self.selected.remove(name) && self.found.iter().any(|found| found == name) {
            self.selected.insert(name.to_string());
        }
    }

    pub fn select_all(&mut self) {
        self.selected = self.found.iter().cloned().collect();
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    /// Selected names in discovery order
    pub fn selected_names(&self) -> Vec<String> {
        self.found
            .iter()
            .filter(|name| self.selected.contains(name.as_str()))
            .cloned()
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }
}

/// Run a discovery against its source
///
/// Blank text or URL input is rejected before any request is made.
pub async fn discover_bands(
    gateway: &dyn ConcertGateway,
    source: &ImportSource,
) -> TrackerResult<ImportSelection> {
    tracing::info!(source = source.label(), "Discovering bands");

    let names = match source {
        ImportSource::Text(text) => {
            if text.trim().is_empty() {
                return Err(TrackerError::InvalidInput("Import text is empty".to_string()));
            }
            gateway.extract_bands_from_text(text).await?
        }
        ImportSource::Url(url) => {
            let url = url.trim();
            if url.is_empty() {
                return Err(TrackerError::InvalidInput("Import URL is empty".to_string()));
            }
            gateway.extract_bands_from_url(url).await?
        }
        ImportSource::Folder(path) => {
            let root = path.clone();
            tokio::task::spawn_blocking(move || scan_band_folders(&root))
                .await
                .map_err(|e| {
                    gigwatch_common::Error::Internal(format!("Folder scan task failed: {e}"))
                })??
        }
    };

    let selection = ImportSelection::new(names);
    if selection.is_empty() {
        tracing::info!(source = source.label(), "No bands found");
    }
    Ok(selection)
}
