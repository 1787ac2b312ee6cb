//! Run-wide statistics.
//!
//! This module defines the `RunStats` structure summarizing one batch run:
//! how many images were selected, how many produced a row, how many had no
//! face and which ones failed.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// An image that could not be processed.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedInput {
    /// Path of the image.
    pub path: PathBuf,
    /// Rendered error.
    pub error: String,
    /// Engine error code, when the failure came from an analysis stage.
    pub engine_code: Option<u32>,
}

/// Statistics for a batch run.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Number of candidate images found by the scanner.
    pub candidates: usize,
    /// Number of images selected for processing.
    pub selected: usize,
    /// Number of rows written to the report.
    pub written: usize,
    /// Number of images where no face was detected.
    pub no_face: usize,
    /// Images that failed to decode or to run through the engine.
    pub failures: Vec<FailedInput>,
    /// Wall time of the processing loop.
    pub elapsed: Duration,
}

impl RunStats {
    /// Creates a new RunStats instance with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of selected images that were handled, successfully or not.
    pub fn total_processed(&self) -> usize {
        self.written + self.no_face + self.failures.len()
    }

    /// Returns the share of processed images that produced a row (0.0 to 100.0).
    pub fn success_rate(&self) -> f64 {
        let total = self.total_processed();
        if total == 0 {
            0.0
        } else {
            (self.written as f64 / total as f64) * 100.0
        }
    }

    /// Returns the average processing speed in images per second.
    pub fn images_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.total_processed() as f64 / secs
        }
    }

    /// Returns true when every selected image was handled without error.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run Statistics:")?;
        writeln!(f, "  Candidates: {}", self.candidates)?;
        writeln!(f, "  Selected: {}", self.selected)?;
        writeln!(
            f,
            "  Written: {} ({:.1}%)",
            self.written,
            self.success_rate()
        )?;
        writeln!(f, "  No face: {}", self.no_face)?;
        writeln!(f, "  Failed: {}", self.failures.len())?;
        for failure in &self.failures {
            writeln!(f, "    {}: {}", failure.path.display(), failure.error)?;
        }
        writeln!(
            f,
            "  Processing speed: {:.2} images/sec",
            self.images_per_second()
        )?;
        Ok(())
    }
}
