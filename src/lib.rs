//! # Quality Scan
//!
//! Batch face image quality assessment. A run scans a directory for image
//! files, optionally draws a random subset, runs every selected image through
//! face detection, landmark fitting and quality estimation, and writes one CSV
//! row per image in which a face was found.
//!
//! ## Modules
//!
//! * [`core`] - Configuration, constants, errors and the stage traits
//! * [`domain`] - Quality metrics and the CSV record layout
//! * [`engine`] - SDK layout and the analysis engine backends
//! * [`pipeline`] - Sampling, per-image orchestration, reporting and run statistics
//! * [`utils`] - Image decoding, tensor marshalling and corpus scanning
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quality_scan::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScanConfig::new("photos")
//!     .with_num_processed(100)
//!     .with_output("result.csv");
//!
//! let service = RecordedService::open(
//!     SdkLayout::new("/opt/face_sdk"),
//!     Path::new("recording.json"),
//! )?;
//!
//! let stats = BatchRunner::new(config)?.run(&service)?;
//! println!("{stats}");
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod engine;
pub mod pipeline;
pub mod utils;

/// Prelude module for convenient imports.
///
/// ```rust
/// use quality_scan::prelude::*;
/// ```
///
/// Brings in the batch runner and its configuration, the replay engine
/// backend, the result types and the error types. Stage traits and tensor
/// helpers live in `quality_scan::core::traits` and `quality_scan::utils`.
pub mod prelude {
    pub use crate::pipeline::{BatchRunner, QualityPipeline, RunStats};

    pub use crate::core::{ConfigValidator, ScanConfig};

    pub use crate::engine::{RecordedService, SdkLayout};

    pub use crate::domain::{QualityMetrics, QualityRecord};

    pub use crate::core::{EngineError, ScanError, ScanResult};

    pub use crate::utils::load_image;
}
