//! Output encoders, one per `OutputFormat`.
//!
//! Encoders take the final RGBA canvas. JPEG drops the alpha channel, WebP is
//! always lossy, AVIF runs through ravif at a fixed speed preset.

use image::RgbaImage;

use super::error::ImageError;
use super::params::OutputFormat;
use crate::constants::DEFAULT_AVIF_SPEED;

/// Turns an RGBA canvas into the bytes of one output format
pub trait FormatEncoder: Send + Sync {
    fn format(&self) -> OutputFormat;

    /// `quality` is clamped to 1..=100 before use
    fn encode(&self, canvas: &RgbaImage, quality: u8) -> Result<Vec<u8>, ImageError>;
}

/// Pick the encoder for a format
pub fn encoder_for(format: OutputFormat) -> Box<dyn FormatEncoder> {
    match format {
        OutputFormat::Jpeg => Box::new(JpegEncoder),
        OutputFormat::WebP => Box::new(WebPEncoder),
        OutputFormat::Avif => Box::new(AvifEncoder::default()),
    }
}

fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(1, 100)
}

pub struct JpegEncoder;

impl FormatEncoder for JpegEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Jpeg
    }

    fn encode(&self, canvas: &RgbaImage, quality: u8) -> Result<Vec<u8>, ImageError> {
        use image::codecs::jpeg::JpegEncoder as CodecJpeg;

        let opaque = image::DynamicImage::ImageRgba8(canvas.clone()).into_rgb8();
        let mut out = Vec::new();
        CodecJpeg::new_with_quality(&mut out, clamp_quality(quality))
            .encode_image(&opaque)
            .map_err(|e| ImageError::encode_failed("jpeg", e.to_string()))?;
        Ok(out)
    }
}

pub struct WebPEncoder;

impl FormatEncoder for WebPEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::WebP
    }

    fn encode(&self, canvas: &RgbaImage, quality: u8) -> Result<Vec<u8>, ImageError> {
        webp::Encoder::from_rgba(canvas.as_raw(), canvas.width(), canvas.height())
            .encode_simple(false, f32::from(clamp_quality(quality)))
            .map(|memory| memory.to_vec())
            .map_err(|e| ImageError::encode_failed("webp", format!("{:?}", e)))
    }
}

pub struct AvifEncoder {
    /// ravif speed preset, 1 (slow, smallest) to 10 (fast)
    pub speed: u8,
}

impl Default for AvifEncoder {
    fn default() -> Self {
        Self {
            speed: DEFAULT_AVIF_SPEED,
        }
    }
}

impl FormatEncoder for AvifEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Avif
    }

    fn encode(&self, canvas: &RgbaImage, quality: u8) -> Result<Vec<u8>, ImageError> {
        let pixels: Vec<rgb::RGBA8> = canvas
            .pixels()
            .map(|p| rgb::RGBA8::new(p[0], p[1], p[2], p[3]))
            .collect();
        let frame = imgref::Img::new(
            pixels.as_slice(),
            canvas.width() as usize,
            canvas.height() as usize,
        );

        ravif::Encoder::new()
            .with_quality(f32::from(clamp_quality(quality)))
            .with_speed(self.speed)
            .encode_rgba(frame)
            .map(|encoded| encoded.avif_file)
            .map_err(|e| ImageError::encode_failed("avif", e.to_string()))
    }
}
