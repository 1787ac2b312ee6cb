//! Trait definitions for the quality scan pipeline.
//!
//! `standard` holds the corpus-level traits (sampling and image reading);
//! `block` holds the analysis-stage interface implemented by engine backends.

pub mod block;
pub mod standard;

pub use block::{BlockConfig, EngineService, ProcessingBlock, UnitType};
pub use standard::{ImageReader, Sampler};
