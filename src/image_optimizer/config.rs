use serde::{Deserialize, Serialize};

use super::params::OutputLimits;
use crate::constants::{
    DEFAULT_MAX_OUTPUT_HEIGHT, DEFAULT_MAX_OUTPUT_WIDTH, DEFAULT_MAX_SOURCE_PIXELS,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Largest source image accepted, in decoded pixels (image bomb protection)
    #[serde(default = "default_max_source_pixels")]
    pub max_source_pixels: u64,

    /// Largest output width a request may ask for
    #[serde(default = "default_max_width")]
    pub max_width: u32,

    /// Largest output height a request may ask for
    #[serde(default = "default_max_height")]
    pub max_height: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_source_pixels: default_max_source_pixels(),
            max_width: default_max_width(),
            max_height: default_max_height(),
        }
    }
}

fn default_max_source_pixels() -> u64 {
    DEFAULT_MAX_SOURCE_PIXELS
}

fn default_max_width() -> u32 {
    DEFAULT_MAX_OUTPUT_WIDTH
}

fn default_max_height() -> u32 {
    DEFAULT_MAX_OUTPUT_HEIGHT
}

impl ImageConfig {
    pub fn output_limits(&self) -> OutputLimits {
        OutputLimits {
            max_width: self.max_width,
            max_height: self.max_height,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_source_pixels == 0 {
            return Err("image.max_source_pixels must be greater than 0".to_string());
        }
        if self.max_width == 0 || self.max_height == 0 {
            return Err("image.max_width and image.max_height must be greater than 0".to_string());
        }
        Ok(())
    }
}
