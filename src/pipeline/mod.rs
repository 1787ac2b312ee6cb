//! The quality scan pipeline.
//!
//! This module wires the corpus scanner, sampler, analysis stages and CSV
//! report into a single batch run.

pub mod batch;
pub mod context;
pub mod orchestrator;
pub mod sampler;
pub mod sink;
pub mod stats;

pub use batch::{BatchRunner, process_all};
pub use context::PipelineContext;
pub use orchestrator::QualityPipeline;
pub use sampler::BoundedSampler;
pub use sink::CsvSink;
pub use stats::{FailedInput, RunStats};
