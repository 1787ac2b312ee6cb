//! Image decoding for the analysis pipeline.
//!
//! The engine consumes 8-bit RGB pixels. Whatever the file holds (grayscale,
//! alpha, 16-bit or float samples) is converted to that layout right after
//! decoding.

use crate::core::errors::{ScanError, ScanResult};
use crate::core::traits::ImageReader;
use image::{DynamicImage, ImageError, RgbImage};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Converts a DynamicImage to an RgbImage.
pub fn dynamic_to_rgb(img: DynamicImage) -> RgbImage {
    img.to_rgb8()
}

/// Loads an image from a file path and converts it to RgbImage.
///
/// The `image` crate guesses the decoder from the file extension first; when
/// that fails the content is sniffed instead, so JPEG bytes stored in a
/// `.png` file still decode.
///
/// # Errors
///
/// Returns `ScanError::ImageLoad` when the file cannot be decoded and
/// `ScanError::EmptyImage` when it decodes to zero pixels.
pub fn load_image(path: &Path) -> ScanResult<RgbImage> {
    let img = load_dynamic_image(path).map_err(|e| ScanError::image_load(path, e))?;
    if img.width() == 0 || img.height() == 0 {
        return Err(ScanError::empty_image(path));
    }
    Ok(dynamic_to_rgb(img))
}

fn load_dynamic_image(path: &Path) -> Result<DynamicImage, ImageError> {
    match image::open(path) {
        Ok(img) => Ok(img),
        Err(err) if should_retry(&err) => {
            debug!(
                "Standard decode failed for {} ({err}). Retrying with format sniffing.",
                path.display()
            );
            decode_with_guessed_format(path)
        }
        Err(err) => Err(err),
    }
}

fn should_retry(err: &ImageError) -> bool {
    matches!(err, ImageError::Decoding(_) | ImageError::Unsupported(_))
}

fn decode_with_guessed_format(path: &Path) -> Result<DynamicImage, ImageError> {
    let file = File::open(path)?;
    let reader = image::ImageReader::new(BufReader::new(file)).with_guessed_format()?;
    reader.decode()
}

/// Image reader backed by the `image` crate decoders.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultImageReader;

impl DefaultImageReader {
    /// Creates a new DefaultImageReader.
    pub fn new() -> Self {
        Self
    }
}

impl ImageReader for DefaultImageReader {
    fn read_single(&self, img_path: &Path) -> ScanResult<RgbImage> {
        load_image(img_path)
    }
}
