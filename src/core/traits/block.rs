//! Processing block definitions for the analysis engine.
//!
//! The engine exposes detection, fitting and quality estimation as
//! interchangeable blocks. Every block takes a [`PipelineContext`] and
//! mutates it in place, so the orchestrator only depends on this one
//! interface and tests can substitute their own blocks.

use crate::core::EngineError;
use crate::pipeline::PipelineContext;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

/// The kind of analysis unit a block implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitType {
    /// Face detection, populates the detected objects.
    FaceDetector,
    /// Landmark fitting on detected faces.
    FaceFitter,
    /// Quality assessment on fitted faces.
    QualityAssessmentEstimator,
}

impl UnitType {
    /// Returns the identifier the engine uses for this unit.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitType::FaceDetector => "FACE_DETECTOR",
            UnitType::FaceFitter => "FACE_FITTER",
            UnitType::QualityAssessmentEstimator => "QUALITY_ASSESSMENT_ESTIMATOR",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration used to create a processing block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockConfig {
    /// Unit implemented by the block.
    pub unit_type: UnitType,
    /// Optional engine configuration file for the unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_name: Option<String>,
}

impl BlockConfig {
    /// Creates a configuration for the given unit.
    pub fn new(unit_type: UnitType) -> Self {
        Self {
            unit_type,
            config_name: None,
        }
    }

    /// Sets the engine configuration file.
    pub fn with_config_name(mut self, config_name: impl Into<String>) -> Self {
        self.config_name = Some(config_name.into());
        self
    }
}

/// A configured analysis stage.
pub trait ProcessingBlock: Debug {
    /// Returns the unit this block implements.
    fn unit_type(&self) -> UnitType;

    /// Runs the stage, reading prior keys from `ctx` and writing new ones.
    fn process(&self, ctx: &mut PipelineContext<'_>) -> Result<(), EngineError>;
}

impl<B: ProcessingBlock + ?Sized> ProcessingBlock for Box<B> {
    fn unit_type(&self) -> UnitType {
        (**self).unit_type()
    }

    fn process(&self, ctx: &mut PipelineContext<'_>) -> Result<(), EngineError> {
        (**self).process(ctx)
    }
}

/// Factory for processing blocks, the entry point of an engine backend.
pub trait EngineService {
    /// Creates a block for the given configuration.
    fn create_processing_block(
        &self,
        config: &BlockConfig,
    ) -> Result<Box<dyn ProcessingBlock>, EngineError>;
}
