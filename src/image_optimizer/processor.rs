//! Image processing implementation
//!
//! Handles the actual pixel work: decode → (bomb check) → resize → crop → encode,
//! and overlay compositing for watermarks.

use fast_image_resize::{FilterType, Image, PixelType, ResizeAlg, Resizer};
use image::io::Reader as ImageReader;
use image::{DynamicImage, RgbaImage};
use std::io::Cursor;
use std::num::NonZeroU32;

use super::config::ImageConfig;
use super::encoder::encoder_for;
use super::error::ImageError;
use super::params::{
    CompositeParams, ImageDimensions, OutputFormat, OutputLimits, TransformParams,
};
use crate::constants::DEFAULT_MAX_SOURCE_PIXELS;
use crate::watermark::{blend_onto, Placement};

/// CPU-bound image operations used by the transform pipeline
///
/// Implementations are synchronous; callers run them on the blocking pool.
pub trait ImageProcessor: Send + Sync {
    /// Resize/crop `source` and encode it in the requested format
    fn transform(&self, source: &[u8], params: &TransformParams) -> Result<Vec<u8>, ImageError>;

    /// Read the pixel dimensions of an encoded image without decoding it
    fn dimensions(&self, data: &[u8]) -> Result<ImageDimensions, ImageError>;

    /// Blend `overlay` onto `base` and re-encode the result
    fn composite(
        &self,
        base: &[u8],
        overlay: &[u8],
        params: &CompositeParams,
    ) -> Result<Vec<u8>, ImageError>;
}

/// Raster image processor built on `image` and `fast_image_resize`
#[derive(Debug, Clone)]
pub struct RasterProcessor {
    max_source_pixels: u64,
    limits: OutputLimits,
}

impl Default for RasterProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SOURCE_PIXELS)
    }
}

impl RasterProcessor {
    pub fn new(max_source_pixels: u64) -> Self {
        Self {
            max_source_pixels,
            limits: OutputLimits::default(),
        }
    }

    pub fn with_output_limits(mut self, limits: OutputLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn from_config(config: &ImageConfig) -> Self {
        Self::new(config.max_source_pixels).with_output_limits(config.output_limits())
    }

    /// Decode image data, refusing anything larger than the pixel limit
    ///
    /// The header is probed first so an image bomb is rejected before its
    /// pixel buffer is allocated.
    fn decode_checked(&self, data: &[u8]) -> Result<DynamicImage, ImageError> {
        let dims = probe_dimensions(data)?;
        if dims.pixels() > self.max_source_pixels {
            return Err(ImageError::image_bomb(
                dims.width,
                dims.height,
                self.max_source_pixels,
            ));
        }
        decode_image(data)
    }
}

impl ImageProcessor for RasterProcessor {
    fn transform(&self, source: &[u8], params: &TransformParams) -> Result<Vec<u8>, ImageError> {
        let img = self.decode_checked(source)?;
        let src = ImageDimensions::new(img.width(), img.height());

        let plan = plan_resize(
            src,
            params.width,
            params.height,
            params.crop,
            self.limits,
            self.max_source_pixels,
        )?;

        let resized = if plan.resize != src {
            resize_image(&img, plan.resize.width, plan.resize.height)?
        } else {
            img.to_rgba8()
        };

        let output = match plan.crop {
            Some(window) => {
                let (x, y) = if params.smart_crop {
                    smart_crop_origin(&resized, window)
                } else {
                    center_crop_origin(plan.resize, window)
                };
                image::imageops::crop_imm(&resized, x, y, window.width, window.height).to_image()
            }
            None => resized,
        };

        encode(&output, params.format, params.quality)
    }

    fn dimensions(&self, data: &[u8]) -> Result<ImageDimensions, ImageError> {
        probe_dimensions(data)
    }

    fn composite(
        &self,
        base: &[u8],
        overlay: &[u8],
        params: &CompositeParams,
    ) -> Result<Vec<u8>, ImageError> {
        let mut base_img = self.decode_checked(base)?.to_rgba8();
        let overlay_img = self.decode_checked(overlay)?.to_rgba8();

        blend_onto(
            &mut base_img,
            &overlay_img,
            Placement::new(params.top, params.left),
            params.opacity,
        );

        encode(&base_img, params.format, params.quality)
    }
}

/// Read dimensions from the image header
fn probe_dimensions(data: &[u8]) -> Result<ImageDimensions, ImageError> {
    let (width, height) = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ImageError::decode_failed(e.to_string()))?
        .into_dimensions()
        .map_err(|e| ImageError::decode_failed(e.to_string()))?;
    Ok(ImageDimensions::new(width, height))
}

/// Decode image data into a DynamicImage
fn decode_image(data: &[u8]) -> Result<DynamicImage, ImageError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ImageError::decode_failed(e.to_string()))?
        .decode()
        .map_err(|e| ImageError::decode_failed(e.to_string()))
}

fn encode(img: &RgbaImage, format: OutputFormat, quality: u8) -> Result<Vec<u8>, ImageError> {
    encoder_for(format).encode(img, quality)
}

/// Resize target and optional crop window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResizePlan {
    resize: ImageDimensions,
    crop: Option<ImageDimensions>,
}

/// Work out the resize target for a requested box
///
/// - both sides set, crop: cover the box, then crop it out
/// - both sides set, no crop: fit inside the box
/// - one side set: derive the other from the aspect ratio
///
/// The requested box must be within `limits`, and the resize target may not
/// hold more than `max_pixels` (a cover resize of a very thin source can be
/// far larger than the box).
fn plan_resize(
    src: ImageDimensions,
    width: u32,
    height: u32,
    crop: bool,
    limits: OutputLimits,
    max_pixels: u64,
) -> Result<ResizePlan, ImageError> {
    limits.check(width, height)?;
    let plan = plan_unbounded(src, width, height, crop)?;
    if plan.resize.pixels() > max_pixels {
        return Err(ImageError::invalid_param(
            "size",
            format!(
                "resizing to {}x{} exceeds the {} pixel limit",
                plan.resize.width, plan.resize.height, max_pixels
            ),
        ));
    }
    Ok(plan)
}

fn plan_unbounded(
    src: ImageDimensions,
    width: u32,
    height: u32,
    crop: bool,
) -> Result<ResizePlan, ImageError> {
    let sw = src.width as f64;
    let sh = src.height as f64;
    let scaled = |value: f64| (value.round() as u32).max(1);

    match (width, height) {
        (0, 0) => Err(ImageError::invalid_param(
            "size",
            "width or height must be set",
        )),
        (w, 0) => Ok(ResizePlan {
            resize: ImageDimensions::new(w, scaled(sh * w as f64 / sw)),
            crop: None,
        }),
        (0, h) => Ok(ResizePlan {
            resize: ImageDimensions::new(scaled(sw * h as f64 / sh), h),
            crop: None,
        }),
        (w, h) if crop => {
            let scale = (w as f64 / sw).max(h as f64 / sh);
            let resize = ImageDimensions::new(scaled(sw * scale).max(w), scaled(sh * scale).max(h));
            let window = ImageDimensions::new(w, h);
            Ok(ResizePlan {
                resize,
                crop: (resize != window).then_some(window),
            })
        }
        (w, h) => {
            let scale = (w as f64 / sw).min(h as f64 / sh);
            Ok(ResizePlan {
                resize: ImageDimensions::new(scaled(sw * scale).min(w), scaled(sh * scale).min(h)),
                crop: None,
            })
        }
    }
}

fn center_crop_origin(resized: ImageDimensions, window: ImageDimensions) -> (u32, u32) {
    (
        (resized.width - window.width) / 2,
        (resized.height - window.height) / 2,
    )
}

/// Pick the crop window with the most edge energy
///
/// Energy is the absolute luma gradient per pixel; a summed-area table makes
/// each candidate window O(1) to score.
fn smart_crop_origin(img: &RgbaImage, window: ImageDimensions) -> (u32, u32) {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let luma: Vec<i32> = img
        .pixels()
        .map(|p| (299 * p[0] as i32 + 587 * p[1] as i32 + 114 * p[2] as i32) / 1000)
        .collect();

    // table[(y + 1) * (w + 1) + (x + 1)] = energy sum over [0..=x] x [0..=y]
    let stride = w + 1;
    let mut table = vec![0u64; stride * (h + 1)];
    for y in 0..h {
        let mut row_sum = 0u64;
        for x in 0..w {
            let here = luma[y * w + x];
            let right = if x + 1 < w { luma[y * w + x + 1] } else { here };
            let below = if y + 1 < h { luma[(y + 1) * w + x] } else { here };
            row_sum += ((right - here).abs() + (below - here).abs()) as u64;
            table[(y + 1) * stride + x + 1] = table[y * stride + x + 1] + row_sum;
        }
    }

    let (ww, wh) = (window.width as usize, window.height as usize);
    let window_energy = |x: usize, y: usize| {
        table[(y + wh) * stride + x + ww] + table[y * stride + x]
            - table[y * stride + x + ww]
            - table[(y + wh) * stride + x]
    };

    let mut best = (0usize, 0usize);
    let mut best_energy = 0u64;
    for y in 0..=(h - wh) {
        for x in 0..=(w - ww) {
            let energy = window_energy(x, y);
            if energy > best_energy {
                best_energy = energy;
                best = (x, y);
            }
        }
    }

    if best_energy == 0 {
        // Flat image: nothing to prefer, fall back to the center
        return center_crop_origin(ImageDimensions::new(w as u32, h as u32), window);
    }

    (best.0 as u32, best.1 as u32)
}

/// Resize image using fast-image-resize with Lanczos3 filter
fn resize_image(img: &DynamicImage, target_w: u32, target_h: u32) -> Result<RgbaImage, ImageError> {
    let src_width =
        NonZeroU32::new(img.width()).ok_or_else(|| ImageError::resize_failed("Source width is 0"))?;
    let src_height = NonZeroU32::new(img.height())
        .ok_or_else(|| ImageError::resize_failed("Source height is 0"))?;
    let dst_width =
        NonZeroU32::new(target_w).ok_or_else(|| ImageError::resize_failed("Target width is 0"))?;
    let dst_height =
        NonZeroU32::new(target_h).ok_or_else(|| ImageError::resize_failed("Target height is 0"))?;

    let src_image = Image::from_vec_u8(
        src_width,
        src_height,
        img.to_rgba8().into_raw(),
        PixelType::U8x4,
    )
    .map_err(|e| ImageError::resize_failed(format!("Failed to create source image: {:?}", e)))?;

    let mut dst_image = Image::new(dst_width, dst_height, PixelType::U8x4);

    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3));

    resizer
        .resize(&src_image.view(), &mut dst_image.view_mut())
        .map_err(|e| ImageError::resize_failed(format!("Resize operation failed: {:?}", e)))?;

    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| ImageError::resize_failed("Failed to create output image buffer"))
}
