//! This module keeps a most-recent-first list of compared file pairs and persists it as JSON.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::Result;

/// The history never grows beyond this many entries
pub const MAX_HISTORY: usize = 20;

/// A document on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub path: PathBuf,
    /// Display name, usually the file name
    pub name: String,
}

impl FileRef {
    /// Reference a file, naming it after the last path component
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        FileRef { path, name }
    }
}

/// One past comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub file1: FileRef,
    pub file2: FileRef,
}

impl HistoryEntry {
    /// The same two paths, in either order
    fn is_pair(&self, a: &FileRef, b: &FileRef) -> bool {
        (self.file1.path == a.path && self.file2.path == b.path)
            || (self.file1.path == b.path && self.file2.path == a.path)
    }

    /// Names of the referenced files that no longer exist
    pub fn missing_files(&self) -> Vec<&str> {
        [&self.file1, &self.file2]
            .into_iter()
            .filter(|file| !file.path.exists())
            .map(|file| file.name.as_str())
            .collect()
    }

    /// Read both documents so the comparison can be run again
    pub fn load_files(&self) -> Result<(String, String)> {
        let original = fs::read_to_string(&self.file1.path)?;
        let revised = fs::read_to_string(&self.file2.path)?;
        Ok((original, revised))
    }
}

/// Past comparisons, most recent first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComparisonHistory {
    entries: Vec<HistoryEntry>,
}

impl ComparisonHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Put a comparison at the front, dropping any earlier entry for the same pair
    pub fn record(&mut self, file1: FileRef, file2: FileRef) -> &HistoryEntry {
        self.entries.retain(|entry| !entry.is_pair(&file1, &file2));
        self.entries.insert(
            0,
            HistoryEntry {
                id: Uuid::new_v4(),
                // Stored as milliseconds, so keep no finer precision in memory either
                timestamp: Utc::now().trunc_subsecs(3),
                file1,
                file2,
            },
        );
        self.entries.truncate(MAX_HISTORY);
        &self.entries[0]
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Load the history from a JSON file.
    /// A missing file is an empty history; so is a corrupt one, which is logged and otherwise ignored.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<Self>(&raw) {
            Ok(history) => Ok(history),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to parse comparison history");
                Ok(Self::new())
            }
        }
    }

    /// Write the history to a JSON file, replacing its contents
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!(path = %path.display(), entries = self.len(), "saved comparison history");
        Ok(())
    }
}
