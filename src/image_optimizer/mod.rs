//! Image processing module
//!
//! Provides the pixel work behind the transform pipeline:
//! - Resize with aspect-ratio preservation (Lanczos3)
//! - Center and smart (edge-energy) cropping
//! - JPEG, WebP and AVIF encoding
//! - Overlay compositing for watermarks
//! - Image bomb protection on decode

// Core modules
pub mod config;
pub mod encoder;
pub mod error;
pub mod params;
pub mod processor;

// Re-export commonly used types
pub use config::ImageConfig;
pub use encoder::{encoder_for, FormatEncoder};
pub use error::ImageError;
pub use params::{
    CompositeParams, CropStrategy, ImageDimensions, OutputFormat, OutputLimits, TransformParams,
};
pub use processor::{ImageProcessor, RasterProcessor};
