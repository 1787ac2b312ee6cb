//! Batch runner: scan, sample, process and report.

use crate::core::config::{ConfigValidator, ScanConfig};
use crate::core::errors::ScanResult;
use crate::core::traits::{EngineService, ImageReader, Sampler};
use crate::pipeline::orchestrator::QualityPipeline;
use crate::pipeline::sampler::BoundedSampler;
use crate::pipeline::sink::CsvSink;
use crate::pipeline::stats::{FailedInput, RunStats};
use crate::utils::scan::{InputRecord, scan_dir};
use std::io::Write;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Drives one batch run over a directory.
#[derive(Debug)]
pub struct BatchRunner {
    config: ScanConfig,
    sampler: BoundedSampler,
}

impl BatchRunner {
    /// Validates `config` and prepares the sampler.
    pub fn new(config: ScanConfig) -> ScanResult<Self> {
        config.validate()?;
        let sampler = BoundedSampler::from_seed_option(config.seed);
        Ok(Self { config, sampler })
    }

    /// The run configuration.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scans the input directory and draws the images to process.
    ///
    /// Returns the number of candidates found and the selected records.
    pub fn select_inputs(&mut self) -> (usize, Vec<InputRecord>) {
        let candidates = scan_dir(&self.config.dir);
        let found = candidates.len();
        let selected = self.sampler.sample(candidates, self.config.num_processed);
        if selected.len() < found {
            info!("Sampled {} of {} images", selected.len(), found);
        }
        (found, selected)
    }

    /// Runs the batch against `service`, writing the report to the configured output.
    ///
    /// Per-image failures are logged and recorded in the returned stats. Only
    /// failures to create the engine blocks or to write the report abort the run.
    pub fn run(&mut self, service: &dyn EngineService) -> ScanResult<RunStats> {
        let (found, inputs) = self.select_inputs();
        let mut sink = CsvSink::create(&self.config.output)?;
        let pipeline = QualityPipeline::from_service(service)?;

        let mut stats = process_all(&pipeline, &inputs, &mut sink)?;
        stats.candidates = found;
        info!(
            "Wrote {} row(s) to {}",
            sink.rows_written(),
            self.config.output.display()
        );
        sink.finish()?;
        Ok(stats)
    }
}

/// Processes `inputs` in order, appending one row per image with a face.
pub fn process_all<R: ImageReader, W: Write>(
    pipeline: &QualityPipeline<R>,
    inputs: &[InputRecord],
    sink: &mut CsvSink<W>,
) -> ScanResult<RunStats> {
    let start = Instant::now();
    let mut stats = RunStats {
        candidates: inputs.len(),
        selected: inputs.len(),
        ..RunStats::default()
    };

    for (i, input) in inputs.iter().enumerate() {
        info!(
            "Processing: {} ({}/{})",
            input.path.display(),
            i + 1,
            inputs.len()
        );

        match pipeline.process(input) {
            Ok(Some(record)) => {
                sink.write(&record)?;
                stats.written += 1;
            }
            Ok(None) => {
                debug!("Skipping {}: no face", input.file_name);
                stats.no_face += 1;
            }
            Err(e) => {
                match e.engine_code() {
                    Some(code) => warn!(
                        "Failed to process {} (engine code {code:#x}): {e}",
                        input.path.display()
                    ),
                    None => warn!("Failed to process {}: {e}", input.path.display()),
                }
                stats.failures.push(FailedInput {
                    path: input.path.clone(),
                    error: error_chain(&e),
                    engine_code: e.engine_code(),
                });
            }
        }
    }

    stats.elapsed = start.elapsed();
    info!(
        "Processed {} image(s): {} written, {} without face, {} failed",
        stats.total_processed(),
        stats.written,
        stats.no_face,
        stats.failures.len()
    );
    Ok(stats)
}

/// Renders an error with its sources, outermost first.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ScanError;
    use crate::engine::{RecordedService, Recording, SdkLayout};
    use crate::pipeline::orchestrator::tests::SolidReader;
    use image::{Rgb, RgbImage};
    use serde_json::json;
    use std::path::Path;

    fn recording(faces: &[&str], empty: &[&str]) -> Recording {
        let mut images = serde_json::Map::new();
        for name in faces {
            images.insert(
                name.to_string(),
                json!({"objects": [{
                    "confidence": 0.5,
                    "quality": crate::domain::quality::tests::sample_quality()
                }]}),
            );
        }
        for name in empty {
            images.insert(name.to_string(), json!({"objects": []}));
        }
        serde_json::from_value(json!({ "images": images })).unwrap()
    }

    #[test]
    fn test_failures_are_isolated() {
        let service = RecordedService::new(
            SdkLayout::new("/opt/sdk"),
            recording(&["a.png", "c.png"], &["b.png"]),
        );
        let pipeline = QualityPipeline::from_service_with_reader(&service, SolidReader).unwrap();
        let dir = Path::new("/corpus");
        let inputs: Vec<InputRecord> = ["a.png", "b.png", "broken.png", "c.png", "missing.png"]
            .iter()
            .map(|name| InputRecord::new(dir, *name))
            .collect();

        let mut sink = CsvSink::new(Vec::new()).unwrap();
        let stats = process_all(&pipeline, &inputs, &mut sink).unwrap();

        assert_eq!(stats.written, 2);
        assert_eq!(stats.no_face, 1);
        assert_eq!(stats.failures.len(), 2);
        assert_eq!(stats.failures[0].path, dir.join("broken.png"));
        assert_eq!(stats.failures[0].engine_code, None);
        assert_eq!(stats.failures[1].engine_code, Some(0x1001));

        let out = String::from_utf8(sink.finish().unwrap()).unwrap();
        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn test_run_writes_report_and_samples() {
        let dir = tempfile::tempdir().unwrap();
        let names = ["1.png", "2.png", "3.png", "4.png", "5.png"];
        for name in names {
            RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]))
                .save(dir.path().join(name))
                .unwrap();
        }
        let output = dir.path().join("out.csv");
        let config = ScanConfig::new(dir.path())
            .with_num_processed(3)
            .with_output(&output)
            .with_seed(11);
        let service = RecordedService::new(SdkLayout::new("/opt/sdk"), recording(&names, &[]));

        let mut runner = BatchRunner::new(config).unwrap();
        let stats = runner.run(&service).unwrap();

        assert_eq!(stats.candidates, 5);
        assert_eq!(stats.selected, 3);
        assert_eq!(stats.written, 3);
        let report = std::fs::read_to_string(&output).unwrap();
        assert_eq!(report.lines().count(), 4);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = BatchRunner::new(ScanConfig::default()).unwrap_err();
        assert!(matches!(err, ScanError::Config { .. }));
    }

    #[test]
    fn test_error_chain_includes_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = ScanError::from(io);
        assert_eq!(error_chain(&err), "io: gone");
    }
}
