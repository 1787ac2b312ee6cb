//! Domain types for quality scan results.

pub mod quality;

pub use quality::{CSV_HEADER, QualityMetrics, QualityRecord};
