//! Utility functions for the quality scan pipeline.
//!
//! This module provides image decoding, tensor marshalling, corpus scanning
//! and logging setup.

pub mod image;
pub mod scan;
pub mod tensor;

pub use self::image::{DefaultImageReader, dynamic_to_rgb, load_image};
pub use scan::{InputRecord, has_image_extension, scan_dir};
pub use tensor::{ElementType, TensorData, TensorDescriptor, TensorElement, rgb_view, to_tensor};

/// Initializes the tracing subscriber for logging.
///
/// Honors `RUST_LOG`; falls back to `info` when it is unset or invalid.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
