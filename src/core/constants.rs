//! Constants used throughout the quality scan pipeline.
//!
//! This module defines the recognized file extensions, default install
//! locations, output names and the context keys exchanged with the
//! analysis engine.

/// File extensions recognized as images.
///
/// Matching is case-sensitive, so both spellings are listed. `.TIFFF` is kept
/// as-is for compatibility with existing corpora.
pub const IMAGE_EXTENSIONS: [&str; 14] = [
    ".png", ".bmp", ".tif", ".tiff", ".jpg", ".jpeg", ".ppm", ".PNG", ".BMP", ".TIF", ".TIFFF",
    ".JPG", ".JPEG", ".PPM",
];

/// The default install location of the face SDK.
pub const DEFAULT_SDK_PATH: &str = "C:/3DiVi_FaceSDK/3_22_0/";

/// The default report file name, created in the working directory.
pub const DEFAULT_OUTPUT_FILE: &str = "result.csv";

/// Configuration file used by the quality assessment block.
pub const QUALITY_CONFIG_NAME: &str = "quality_assessment.xml";

/// Context key holding the input image.
pub const IMAGE_KEY: &str = "image";

/// Context key holding the source file name of the input image.
pub const IMAGE_NAME_KEY: &str = "image_name";

/// Context key holding the detected objects.
pub const OBJECTS_KEY: &str = "objects";

/// Context key holding the quality sub-context of a detected object.
pub const QUALITY_KEY: &str = "quality";

/// Format tag stored with marshalled images.
pub const NDARRAY_FORMAT: &str = "NDARRAY";

/// Error code reported when a recording has no entry for an image.
pub const RECORDING_MISS_CODE: u32 = 0x1001;

/// Error code reported when a stage receives a malformed context.
pub const BAD_CONTEXT_CODE: u32 = 0x1002;
