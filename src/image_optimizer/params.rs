//! Image transformation parameters
//!
//! Plain data handed to the `ImageProcessor`: target size, crop behavior,
//! output format and quality.

use std::str::FromStr;

use super::error::ImageError;
use crate::constants::{DEFAULT_MAX_OUTPUT_HEIGHT, DEFAULT_MAX_OUTPUT_WIDTH};

/// Output image format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Jpeg,
    WebP,
    Avif,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::WebP => "webp",
            Self::Avif => "avif",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Avif => "image/avif",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "webp" => Ok(OutputFormat::WebP),
            "avif" => Ok(OutputFormat::Avif),
            _ => Err(ImageError::invalid_param(
                "format",
                format!("unknown format: {}", s),
            )),
        }
    }
}

/// How the image is fitted to the requested box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CropStrategy {
    /// Scale to fit inside the box, preserving aspect ratio
    None,
    /// Fill the box, cropping the overflow around the center (default)
    #[default]
    Fit,
    /// Fill the box, keeping the most detailed region
    Smart,
}

impl CropStrategy {
    /// Lenient parse: anything that is not `smart` or `none` means Fit
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "smart" => CropStrategy::Smart,
            "none" => CropStrategy::None,
            _ => CropStrategy::Fit,
        }
    }

    pub fn crops(&self) -> bool {
        !matches!(self, CropStrategy::None)
    }

    pub fn is_smart(&self) -> bool {
        matches!(self, CropStrategy::Smart)
    }
}

/// Width and height of an image in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixels(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Largest output box a request may ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputLimits {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for OutputLimits {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_OUTPUT_WIDTH,
            max_height: DEFAULT_MAX_OUTPUT_HEIGHT,
        }
    }
}

impl OutputLimits {
    /// Reject a requested size over the limits (0 means unset and always passes)
    pub fn check(&self, width: u32, height: u32) -> Result<(), ImageError> {
        if width > self.max_width {
            return Err(ImageError::invalid_param(
                "width",
                format!("{} exceeds the maximum of {}", width, self.max_width),
            ));
        }
        if height > self.max_height {
            return Err(ImageError::invalid_param(
                "height",
                format!("{} exceeds the maximum of {}", height, self.max_height),
            ));
        }
        Ok(())
    }
}

/// Parameters for resizing and re-encoding a source image
///
/// A zero width or height means "derive from the aspect ratio".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformParams {
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    pub crop: bool,
    pub smart_crop: bool,
    pub format: OutputFormat,
}

/// Parameters for blending an overlay onto a base image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeParams {
    /// Overlay offset from the top edge (may be negative)
    pub top: i32,
    /// Overlay offset from the left edge (may be negative)
    pub left: i32,
    /// Extra opacity applied on top of the overlay's alpha (0.0 - 1.0)
    pub opacity: f32,
    pub format: OutputFormat,
    pub quality: u8,
}
