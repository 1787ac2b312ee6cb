//! Corpus scanning.
//!
//! Lists the direct children of a directory whose names carry a recognized
//! image extension. Matching is a case-sensitive substring test against
//! [`IMAGE_EXTENSIONS`], so `photo.png.bak` is picked up as well as
//! `photo.png`.

use crate::core::constants::IMAGE_EXTENSIONS;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A candidate image found by the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputRecord {
    /// Full path of the file.
    pub path: PathBuf,
    /// File name relative to the scanned directory.
    pub file_name: String,
}

impl InputRecord {
    /// Creates a record for `file_name` inside `dir`.
    pub fn new(dir: &Path, file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        Self {
            path: dir.join(&file_name),
            file_name,
        }
    }

    /// Creates a record for an existing `path`, displayed as `file_name`.
    ///
    /// `file_name` may be a lossy rendering of the on-disk name; `path` is
    /// used as is for decoding.
    pub fn from_path(path: PathBuf, file_name: impl Into<String>) -> Self {
        Self {
            path,
            file_name: file_name.into(),
        }
    }

    /// Extension inferred from the file name, without the leading dot.
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
    }
}

/// Returns true when `file_name` contains one of the recognized extensions.
pub fn has_image_extension(file_name: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|ext| file_name.contains(ext))
}

/// Lists the image files directly inside `dir`, sorted by file name.
///
/// Subdirectories are skipped. A missing or unreadable directory yields an
/// empty list.
pub fn scan_dir(dir: &Path) -> Vec<InputRecord> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot read directory {}: {e}", dir.display());
            return Vec::new();
        }
    };

    let mut records: Vec<InputRecord> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {e}", dir.display());
                None
            }
        })
        .filter(|entry| entry.file_type().map(|t| !t.is_dir()).unwrap_or(false))
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            has_image_extension(&name).then(|| InputRecord::from_path(entry.path(), name))
        })
        .collect();

    records.sort();
    debug!("Found {} candidate images in {}", records.len(), dir.display());
    records
}
