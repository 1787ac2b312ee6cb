//! Core traits for sampling and image reading.
//!
//! This module provides the traits used by the batch runner to reduce the
//! corpus and to decode the selected images.

use crate::core::errors::ScanResult;
use image::RgbImage;
use std::path::Path;

/// Trait for reducing a candidate list to a bounded subset.
pub trait Sampler<T> {
    /// Returns at most `n` elements of `data`.
    ///
    /// `n == 0` or `n >= data.len()` keeps everything.
    fn sample(&mut self, data: Vec<T>, n: usize) -> Vec<T>;
}

/// Trait for reading images.
///
/// Readers return pixels in the channel order the analysis engine expects
/// (8-bit RGB).
pub trait ImageReader {
    /// Reads a single image from the given path.
    fn read_single(&self, img_path: &Path) -> ScanResult<RgbImage>;
}
