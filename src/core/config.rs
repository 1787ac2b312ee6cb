//! Run configuration and validation.

use crate::core::constants::{DEFAULT_OUTPUT_FILE, DEFAULT_SDK_PATH};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required setting was not provided.
    #[error("{name} is required")]
    MissingRequired { name: &'static str },

    /// The input directory setting is unusable.
    #[error("invalid input directory: {path}")]
    InvalidDirectory { path: PathBuf },

    /// Error indicating that a configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl From<ConfigError> for crate::core::ScanError {
    fn from(err: ConfigError) -> Self {
        crate::core::ScanError::config_error(err.to_string())
    }
}

/// A trait for validating configuration parameters.
pub trait ConfigValidator {
    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Returns the default configuration.
    fn get_defaults() -> Self
    where
        Self: Sized;

    /// Validates that a path setting is not empty.
    fn validate_non_empty_path(&self, name: &'static str, path: &Path) -> Result<(), ConfigError> {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired { name });
        }
        Ok(())
    }
}

/// Settings for one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Directory holding the images to evaluate.
    pub dir: PathBuf,
    /// Root of the face SDK installation.
    pub sdk_path: PathBuf,
    /// Maximum number of images to process; `0` processes everything.
    pub num_processed: usize,
    /// Report file, truncated at the start of every run.
    pub output: PathBuf,
    /// Seed for the sampler. Drawn from OS entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Recorded analysis results replayed by the engine.
    #[serde(default)]
    pub recording: Option<PathBuf>,
}

impl ScanConfig {
    /// Creates a configuration for `dir` with default settings.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::get_defaults()
        }
    }

    /// Sets the maximum number of processed images.
    pub fn with_num_processed(mut self, num_processed: usize) -> Self {
        self.num_processed = num_processed;
        self
    }

    /// Sets the report file path.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Sets the SDK installation root.
    pub fn with_sdk_path(mut self, sdk_path: impl Into<PathBuf>) -> Self {
        self.sdk_path = sdk_path.into();
        self
    }

    /// Fixes the sampler seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the recording replayed by the engine.
    pub fn with_recording(mut self, recording: impl Into<PathBuf>) -> Self {
        self.recording = Some(recording.into());
        self
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::get_defaults()
    }
}

impl ConfigValidator for ScanConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_non_empty_path("--dir", &self.dir)?;
        self.validate_non_empty_path("--output", &self.output)?;
        if self.dir.is_file() {
            return Err(ConfigError::InvalidDirectory {
                path: self.dir.clone(),
            });
        }
        if self.output.is_dir() {
            return Err(ConfigError::InvalidConfig {
                message: format!("output {} is a directory", self.output.display()),
            });
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self {
            dir: PathBuf::new(),
            sdk_path: PathBuf::from(DEFAULT_SDK_PATH),
            num_processed: 0,
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            seed: None,
            recording: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dir_is_rejected() {
        let err = ScanConfig::default().validate().unwrap_err();
        assert_eq!(err.to_string(), "--dir is required");
    }

    #[test]
    fn test_defaults() {
        let config = ScanConfig::new("images");
        assert_eq!(config.num_processed, 0);
        assert_eq!(config.output, PathBuf::from("result.csv"));
        assert_eq!(config.sdk_path, PathBuf::from("C:/3DiVi_FaceSDK/3_22_0/"));
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_file_as_dir_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = ScanConfig::new(file.path()).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDirectory { .. }));
    }

    #[test]
    fn test_missing_dir_on_disk_is_accepted() {
        let config = ScanConfig::new("/definitely/not/here");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let config = ScanConfig::new("imgs").with_seed(7).with_num_processed(3);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ScanConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
