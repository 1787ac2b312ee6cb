//! Analysis engine backends.
//!
//! The face engine is an external collaborator reached through the
//! [`EngineService`](crate::core::traits::EngineService) and
//! [`ProcessingBlock`](crate::core::traits::ProcessingBlock) traits. This
//! module resolves the SDK install layout and provides [`RecordedService`],
//! a backend that replays analysis results exported from the SDK.

pub mod recorded;

pub use recorded::{RecordedBlock, RecordedImage, RecordedService, Recording};

use std::path::{Path, PathBuf};

/// Install layout of the face SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkLayout {
    root: PathBuf,
}

impl SdkLayout {
    /// Creates a layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The SDK root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The engine shared library.
    pub fn library_path(&self) -> PathBuf {
        self.root.join("bin").join("facerec.dll")
    }

    /// Directory holding the block configuration files.
    pub fn config_dir(&self) -> PathBuf {
        self.root.join("conf").join("facerec")
    }

    /// Directory holding the license files.
    pub fn license_dir(&self) -> PathBuf {
        self.root.join("license")
    }

    /// Resolves a block configuration file name.
    pub fn config_file(&self, name: &str) -> PathBuf {
        self.config_dir().join(name)
    }
}
