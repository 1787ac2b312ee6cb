//! Per-image orchestration of the analysis stages.
//!
//! Each image goes through decode, marshalling, detection and, when a face
//! was found, fitting and quality assessment. The resulting context is then
//! flattened into a [`QualityRecord`].

use crate::core::constants::{IMAGE_NAME_KEY, QUALITY_CONFIG_NAME};
use crate::core::errors::{EngineError, ScanResult};
use crate::core::traits::{BlockConfig, EngineService, ImageReader, ProcessingBlock, UnitType};
use crate::domain::QualityRecord;
use crate::pipeline::PipelineContext;
use crate::utils::image::DefaultImageReader;
use crate::utils::scan::InputRecord;
use crate::utils::tensor::{rgb_view, to_tensor};
use tracing::debug;

/// Detector, fitter and quality estimator wired into one pipeline.
#[derive(Debug)]
pub struct QualityPipeline<R = DefaultImageReader> {
    reader: R,
    detector: Box<dyn ProcessingBlock>,
    fitter: Box<dyn ProcessingBlock>,
    quality: Box<dyn ProcessingBlock>,
}

impl QualityPipeline<DefaultImageReader> {
    /// Creates the three stages from an engine service.
    pub fn from_service(service: &dyn EngineService) -> ScanResult<Self> {
        Self::from_service_with_reader(service, DefaultImageReader::new())
    }
}

impl<R: ImageReader> QualityPipeline<R> {
    /// Creates the three stages from an engine service, decoding with `reader`.
    pub fn from_service_with_reader(service: &dyn EngineService, reader: R) -> ScanResult<Self> {
        let detector = service.create_processing_block(&BlockConfig::new(UnitType::FaceDetector))?;
        let fitter = service.create_processing_block(&BlockConfig::new(UnitType::FaceFitter))?;
        let quality = service.create_processing_block(
            &BlockConfig::new(UnitType::QualityAssessmentEstimator)
                .with_config_name(QUALITY_CONFIG_NAME),
        )?;
        Ok(Self::new(reader, detector, fitter, quality))
    }

    /// Assembles a pipeline from already created blocks.
    pub fn new(
        reader: R,
        detector: Box<dyn ProcessingBlock>,
        fitter: Box<dyn ProcessingBlock>,
        quality: Box<dyn ProcessingBlock>,
    ) -> Self {
        Self {
            reader,
            detector,
            fitter,
            quality,
        }
    }

    /// Processes one image.
    ///
    /// Returns `Ok(None)` when no face was detected; fitting and quality
    /// assessment are skipped in that case.
    ///
    /// # Errors
    ///
    /// Propagates decode, marshalling, engine and extraction failures.
    pub fn process(&self, input: &InputRecord) -> ScanResult<Option<QualityRecord>> {
        let image = self.reader.read_single(&input.path)?;
        let tensor = to_tensor(rgb_view(&image)?, false);
        debug!(
            "Marshalled {} as {:?} {} ({} bytes, shared: {})",
            input.file_name,
            tensor.shape(),
            tensor.element_type(),
            tensor.byte_len(),
            tensor.is_borrowed()
        );

        let mut ctx = PipelineContext::with_image(tensor);
        ctx.insert(IMAGE_NAME_KEY, input.file_name.as_str());

        if !self.run_stages(&mut ctx)? {
            debug!("No face detected in {}", input.path.display());
            return Ok(None);
        }

        QualityRecord::from_context(&ctx).map(Some)
    }

    /// Runs detection and, if anything was detected, fitting and quality.
    ///
    /// Returns whether any object was detected.
    pub fn run_stages(&self, ctx: &mut PipelineContext<'_>) -> Result<bool, EngineError> {
        self.detector.process(ctx)?;

        let detected = ctx.object_count();
        if detected == 0 {
            return Ok(false);
        }
        debug!("{detected} object(s) detected");

        self.fitter.process(ctx)?;
        self.quality.process(ctx)?;
        Ok(true)
    }
}
