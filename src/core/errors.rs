//! Error types for the quality scan pipeline.
//!
//! This module defines the errors that can occur while scanning a corpus,
//! decoding images, marshalling pixel buffers, running analysis stages and
//! writing the report. It also provides helper constructors for building
//! these errors with appropriate context.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error raised by an analysis engine stage.
///
/// Engines report failures with a numeric code; the code is kept verbatim so
/// it can be matched against the vendor documentation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (code {code:#x})")]
pub struct EngineError {
    /// Engine-specific error code.
    pub code: u32,
    /// Human readable description.
    pub message: String,
}

impl EngineError {
    /// Creates a new engine error.
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Enum representing the errors that can occur in the quality scan pipeline.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    Config {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error occurred while decoding an image.
    #[error("failed to decode {}", path.display())]
    ImageLoad {
        /// Path of the image that could not be decoded.
        path: PathBuf,
        /// The underlying decoder error.
        #[source]
        source: image::ImageError,
    },

    /// The decoder produced an image without pixels.
    #[error("decoded image {} is empty", path.display())]
    EmptyImage {
        /// Path of the offending image.
        path: PathBuf,
    },

    /// The pixel buffer uses an element type the engine cannot consume.
    #[error("unsupported element type: {dtype}")]
    UnsupportedElementType {
        /// Name of the element type.
        dtype: String,
    },

    /// Error reported by an analysis stage.
    #[error("engine: {0}")]
    Engine(#[from] EngineError),

    /// The engine output lacks a field required to build a record.
    #[error("engine output is missing field '{field}'")]
    MissingField {
        /// Dotted path of the missing field.
        field: String,
    },

    /// Engine output or a recording could not be decoded.
    #[error("malformed engine data")]
    Json(#[from] serde_json::Error),

    /// Error from tensor shape operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl ScanError {
    /// Creates a configuration error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a decode error for the given path.
    pub fn image_load(path: &Path, source: image::ImageError) -> Self {
        Self::ImageLoad {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Creates an error for an image that decoded to zero pixels.
    pub fn empty_image(path: &Path) -> Self {
        Self::EmptyImage {
            path: path.to_path_buf(),
        }
    }

    /// Creates an error for an element type without a tensor mapping.
    pub fn unsupported_element_type(dtype: impl Into<String>) -> Self {
        Self::UnsupportedElementType {
            dtype: dtype.into(),
        }
    }

    /// Creates an error for a field missing from the engine output.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Returns the engine error code when this error came from an analysis stage.
    pub fn engine_code(&self) -> Option<u32> {
        match self {
            Self::Engine(e) => Some(e.code),
            _ => None,
        }
    }
}

/// Convenient result alias for quality scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_renders_hex_code() {
        let err = EngineError::new(0x2a, "license expired");
        assert_eq!(err.to_string(), "license expired (code 0x2a)");
    }

    #[test]
    fn test_engine_code_is_exposed() {
        let err: ScanError = EngineError::new(0x1001, "no result").into();
        assert_eq!(err.engine_code(), Some(0x1001));
        assert_eq!(ScanError::config_error("x").engine_code(), None);
    }

    #[test]
    fn test_missing_field_message() {
        let err = ScanError::missing_field("objects[0].quality.total_score");
        assert_eq!(
            err.to_string(),
            "engine output is missing field 'objects[0].quality.total_score'"
        );
    }
}
