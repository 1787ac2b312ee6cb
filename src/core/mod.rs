//! The core module of the quality scan pipeline.
//!
//! This module contains the fundamental components shared by every stage:
//! - Configuration and validation
//! - Constants used throughout the pipeline
//! - Error handling
//! - Traits defining the sampler, reader and processing block interfaces

pub mod config;
pub mod constants;
pub mod errors;
pub mod traits;

pub use config::{ConfigError, ConfigValidator, ScanConfig};
pub use constants::*;
pub use errors::{EngineError, ScanError, ScanResult};
pub use traits::{BlockConfig, EngineService, ImageReader, ProcessingBlock, Sampler, UnitType};
