//! Replay backend for previously exported analysis results.
//!
//! A recording maps image file names to the objects the engine reported for
//! them:
//!
//! ```json
//! {
//!   "images": {
//!     "face.png": {
//!       "objects": [
//!         { "confidence": 0.98, "bbox": [0.1, 0.1, 0.6, 0.7],
//!           "keypoints": [[12, 40], [30, 41]],
//!           "quality": { "total_score": 0.81, "...": "..." } }
//!       ]
//!     },
//!     "landscape.jpg": { "objects": [] }
//!   }
//! }
//! ```
//!
//! Each block contributes only its own keys: the detector writes the objects
//! without fitting and quality data, the fitter adds `keypoints` and
//! `fitter`, the quality estimator adds `quality`.

use super::SdkLayout;
use crate::core::constants::{
    BAD_CONTEXT_CODE, IMAGE_NAME_KEY, OBJECTS_KEY, QUALITY_KEY, RECORDING_MISS_CODE,
};
use crate::core::errors::{EngineError, ScanResult};
use crate::core::traits::{BlockConfig, EngineService, ProcessingBlock, UnitType};
use crate::pipeline::PipelineContext;
use crate::utils::tensor::ElementType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const IMAGE_DTYPE_POINTER: &str = "/image/dtype";
const FITTER_KEYS: [&str; 2] = ["keypoints", "fitter"];
const QUALITY_KEYS: [&str; 1] = [QUALITY_KEY];

fn is_stage_key(key: &str) -> bool {
    FITTER_KEYS.contains(&key) || QUALITY_KEYS.contains(&key)
}

/// Analysis output recorded for one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedImage {
    /// Detected objects with all stage outputs merged.
    #[serde(default)]
    pub objects: Vec<Map<String, Value>>,
}

/// Recorded analysis output keyed by image file name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    #[serde(default)]
    pub images: BTreeMap<String, RecordedImage>,
}

impl Recording {
    /// Reads a recording from a JSON file.
    pub fn from_path(path: &Path) -> ScanResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Returns the recorded output for `file_name`.
    pub fn get(&self, file_name: &str) -> Option<&RecordedImage> {
        self.images.get(file_name)
    }

    /// Number of recorded images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Returns true when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Engine service replaying a [`Recording`].
#[derive(Debug, Clone)]
pub struct RecordedService {
    layout: SdkLayout,
    recording: Arc<Recording>,
}

impl RecordedService {
    /// Creates a service from an in-memory recording.
    pub fn new(layout: SdkLayout, recording: Recording) -> Self {
        Self {
            layout,
            recording: Arc::new(recording),
        }
    }

    /// Loads the recording at `path`.
    pub fn open(layout: SdkLayout, path: &Path) -> ScanResult<Self> {
        let recording = Recording::from_path(path)?;
        info!(
            "Loaded recording {} with {} image(s)",
            path.display(),
            recording.len()
        );
        Ok(Self::new(layout, recording))
    }

    /// The SDK layout used to resolve block configuration files.
    pub fn layout(&self) -> &SdkLayout {
        &self.layout
    }
}

impl EngineService for RecordedService {
    fn create_processing_block(
        &self,
        config: &BlockConfig,
    ) -> Result<Box<dyn ProcessingBlock>, EngineError> {
        let config_path = config
            .config_name
            .as_deref()
            .map(|name| self.layout.config_file(name));
        debug!(
            "Creating {} block (config: {:?})",
            config.unit_type, config_path
        );
        Ok(Box::new(RecordedBlock {
            unit_type: config.unit_type,
            recording: Arc::clone(&self.recording),
            config_path,
        }))
    }
}

/// One stage of the replay backend.
#[derive(Debug)]
pub struct RecordedBlock {
    unit_type: UnitType,
    recording: Arc<Recording>,
    config_path: Option<PathBuf>,
}

impl RecordedBlock {
    /// Configuration file the block was created with.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    fn lookup(&self, ctx: &PipelineContext<'_>) -> Result<&RecordedImage, EngineError> {
        let name = ctx
            .get(IMAGE_NAME_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| EngineError::new(BAD_CONTEXT_CODE, "context has no image name"))?;
        self.recording.get(name).ok_or_else(|| {
            EngineError::new(RECORDING_MISS_CODE, format!("no recorded result for {name}"))
        })
    }

    fn check_image(ctx: &PipelineContext<'_>) -> Result<(), EngineError> {
        let image = ctx
            .image()
            .ok_or_else(|| EngineError::new(BAD_CONTEXT_CODE, "context has no image"))?;
        let dtype = ctx
            .pointer(IMAGE_DTYPE_POINTER)
            .and_then(Value::as_str)
            .ok_or_else(|| EngineError::new(BAD_CONTEXT_CODE, "image has no dtype"))?;
        let element_type = dtype
            .parse::<ElementType>()
            .map_err(|e| EngineError::new(BAD_CONTEXT_CODE, e.to_string()))?;
        if element_type != image.element_type() {
            return Err(EngineError::new(
                BAD_CONTEXT_CODE,
                format!(
                    "image dtype {element_type} does not match {} pixels",
                    image.element_type()
                ),
            ));
        }
        if element_type != ElementType::U8 {
            return Err(EngineError::new(
                BAD_CONTEXT_CODE,
                format!("expected uint8_t pixels, got {element_type}"),
            ));
        }
        if image.shape().len() != 3 || image.shape()[2] != 3 {
            return Err(EngineError::new(
                BAD_CONTEXT_CODE,
                format!("expected a 3-channel image, got shape {:?}", image.shape()),
            ));
        }
        Ok(())
    }

    fn detect(&self, ctx: &mut PipelineContext<'_>) -> Result<(), EngineError> {
        Self::check_image(ctx)?;
        let recorded = self.lookup(ctx)?;
        let objects = ctx.sequence_mut(OBJECTS_KEY)?;
        for object in &recorded.objects {
            let detection: Map<String, Value> = object
                .iter()
                .filter(|(key, _)| !is_stage_key(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            objects.push(Value::Object(detection));
        }
        Ok(())
    }

    fn annotate(&self, ctx: &mut PipelineContext<'_>, keys: &[&str]) -> Result<(), EngineError> {
        let recorded = self.lookup(ctx)?;
        let objects = ctx.sequence_mut(OBJECTS_KEY)?;
        if objects.len() != recorded.objects.len() {
            return Err(EngineError::new(
                BAD_CONTEXT_CODE,
                format!(
                    "context holds {} object(s), recording has {}",
                    objects.len(),
                    recorded.objects.len()
                ),
            ));
        }
        for (target, source) in objects.iter_mut().zip(&recorded.objects) {
            let target = target
                .as_object_mut()
                .ok_or_else(|| EngineError::new(BAD_CONTEXT_CODE, "object is not a context"))?;
            for key in keys {
                if let Some(value) = source.get(*key) {
                    target.insert((*key).to_string(), value.clone());
                }
            }
        }
        Ok(())
    }
}

impl ProcessingBlock for RecordedBlock {
    fn unit_type(&self) -> UnitType {
        self.unit_type
    }

    fn process(&self, ctx: &mut PipelineContext<'_>) -> Result<(), EngineError> {
        match self.unit_type {
            UnitType::FaceDetector => self.detect(ctx),
            UnitType::FaceFitter => self.annotate(ctx, &FITTER_KEYS),
            UnitType::QualityAssessmentEstimator => self.annotate(ctx, &QUALITY_KEYS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ScanError;
    use crate::domain::quality::tests::sample_quality;
    use crate::pipeline::QualityPipeline;
    use crate::pipeline::orchestrator::tests::SolidReader;
    use crate::utils::scan::InputRecord;
    use crate::utils::tensor::to_tensor;
    use ndarray::Array3;
    use serde_json::json;

    fn recording() -> Recording {
        serde_json::from_value(json!({
            "images": {
                "face.png": {"objects": [{
                    "confidence": 0.93,
                    "bbox": [0.1, 0.2, 0.5, 0.6],
                    "keypoints": [[1, 2]],
                    "quality": sample_quality()
                }]},
                "empty.png": {"objects": []}
            }
        }))
        .unwrap()
    }

    fn service() -> RecordedService {
        RecordedService::new(SdkLayout::new("/opt/sdk"), recording())
    }

    fn context_for<'a>(name: &str, img: &'a image::RgbImage) -> PipelineContext<'a> {
        let view = crate::utils::tensor::rgb_view(img).unwrap();
        let mut ctx = PipelineContext::with_image(to_tensor(view, false));
        ctx.insert(IMAGE_NAME_KEY, name);
        ctx
    }

    #[test]
    fn test_detector_omits_stage_keys() {
        let block = service()
            .create_processing_block(&BlockConfig::new(UnitType::FaceDetector))
            .unwrap();
        let img = image::RgbImage::new(4, 4);
        let mut ctx = context_for("face.png", &img);

        block.process(&mut ctx).unwrap();
        assert_eq!(ctx.object_count(), 1);
        assert_eq!(ctx.pointer("/objects/0/confidence"), Some(&json!(0.93)));
        assert!(ctx.pointer("/objects/0/keypoints").is_none());
        assert!(ctx.pointer("/objects/0/quality").is_none());
    }

    #[test]
    fn test_stages_fill_in_their_keys() {
        let service = service();
        let img = image::RgbImage::new(4, 4);
        let mut ctx = context_for("face.png", &img);
        for unit in [
            UnitType::FaceDetector,
            UnitType::FaceFitter,
            UnitType::QualityAssessmentEstimator,
        ] {
            let block = service
                .create_processing_block(&BlockConfig::new(unit))
                .unwrap();
            block.process(&mut ctx).unwrap();
        }
        assert_eq!(ctx.pointer("/objects/0/keypoints"), Some(&json!([[1, 2]])));
        assert_eq!(ctx.pointer("/objects/0/quality/eyes_distance"), Some(&json!(64)));
    }

    #[test]
    fn test_empty_detection_creates_empty_objects() {
        let block = service()
            .create_processing_block(&BlockConfig::new(UnitType::FaceDetector))
            .unwrap();
        let img = image::RgbImage::new(4, 4);
        let mut ctx = context_for("empty.png", &img);

        block.process(&mut ctx).unwrap();
        assert!(ctx.contains_key(OBJECTS_KEY));
        assert_eq!(ctx.object_count(), 0);
    }

    #[test]
    fn test_unrecorded_image_is_engine_error() {
        let block = service()
            .create_processing_block(&BlockConfig::new(UnitType::FaceDetector))
            .unwrap();
        let img = image::RgbImage::new(4, 4);
        let mut ctx = context_for("unknown.png", &img);

        let err = block.process(&mut ctx).unwrap_err();
        assert_eq!(err.code, RECORDING_MISS_CODE);
    }

    #[test]
    fn test_detector_rejects_non_u8_image() {
        let block = service()
            .create_processing_block(&BlockConfig::new(UnitType::FaceDetector))
            .unwrap();
        let pixels = Array3::<f32>::zeros((2, 2, 3));
        let mut ctx = PipelineContext::with_image(to_tensor(pixels.view(), false));
        ctx.insert(IMAGE_NAME_KEY, "face.png");

        let err = block.process(&mut ctx).unwrap_err();
        assert_eq!(err.code, BAD_CONTEXT_CODE);
    }

    #[test]
    fn test_detector_rejects_unknown_dtype() {
        let block = service()
            .create_processing_block(&BlockConfig::new(UnitType::FaceDetector))
            .unwrap();
        let img = image::RgbImage::new(4, 4);
        let mut ctx = context_for("face.png", &img);
        ctx.insert(
            crate::core::constants::IMAGE_KEY,
            json!({"format": "NDARRAY", "dtype": "uint64_t", "shape": [4, 4, 3]}),
        );

        let err = block.process(&mut ctx).unwrap_err();
        assert_eq!(err.code, BAD_CONTEXT_CODE);
        assert!(err.message.contains("unsupported element type: uint64_t"));
    }

    #[test]
    fn test_detector_rejects_mismatched_dtype() {
        let block = service()
            .create_processing_block(&BlockConfig::new(UnitType::FaceDetector))
            .unwrap();
        let img = image::RgbImage::new(4, 4);
        let mut ctx = context_for("face.png", &img);
        ctx.insert(
            crate::core::constants::IMAGE_KEY,
            json!({"format": "NDARRAY", "dtype": "float", "shape": [4, 4, 3]}),
        );

        let err = block.process(&mut ctx).unwrap_err();
        assert_eq!(err.code, BAD_CONTEXT_CODE);
        assert!(err.message.contains("does not match"));
    }

    #[test]
    fn test_quality_block_resolves_config_file() {
        let block = RecordedBlock {
            unit_type: UnitType::QualityAssessmentEstimator,
            recording: Arc::new(Recording::default()),
            config_path: Some(SdkLayout::new("/opt/sdk").config_file("quality_assessment.xml")),
        };
        assert_eq!(
            block.config_path(),
            Some(Path::new("/opt/sdk/conf/facerec/quality_assessment.xml"))
        );
    }

    #[test]
    fn test_pipeline_over_recording() {
        let pipeline =
            QualityPipeline::from_service_with_reader(&service(), SolidReader).unwrap();

        let face = InputRecord::new(Path::new("/corpus"), "face.png");
        let record = pipeline.process(&face).unwrap().unwrap();
        assert_eq!(record.confidence, 0.93);

        let empty = InputRecord::new(Path::new("/corpus"), "empty.png");
        assert_eq!(pipeline.process(&empty).unwrap(), None);

        let unknown = InputRecord::new(Path::new("/corpus"), "unknown.png");
        let err = pipeline.process(&unknown).unwrap_err();
        assert!(matches!(err, ScanError::Engine(e) if e.code == RECORDING_MISS_CODE));
    }

    #[test]
    fn test_open_reads_json_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), serde_json::to_string(&recording()).unwrap()).unwrap();

        let service = RecordedService::open(SdkLayout::new("/opt/sdk"), file.path()).unwrap();
        assert_eq!(service.recording.len(), 2);
        assert_eq!(service.layout().root(), Path::new("/opt/sdk"));
    }

    #[test]
    fn test_open_rejects_malformed_json() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{ not json").unwrap();
        let err = RecordedService::open(SdkLayout::new("/opt/sdk"), file.path()).unwrap_err();
        assert!(matches!(err, ScanError::Json(_)));
    }
}
