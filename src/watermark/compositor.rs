//! Watermark compositor for blending an overlay onto an image.
//!
//! Blending uses the Porter-Duff "over" operator with an extra opacity
//! factor, and only touches the region where the overlay and the base
//! actually overlap.

use super::position::Placement;
use image::{Rgba, RgbaImage};

/// Blend `overlay` onto `base` with its top-left corner at `placement`.
pub fn blend_onto(base: &mut RgbaImage, overlay: &RgbaImage, placement: Placement, opacity: f32) {
    let base_width = base.width() as i64;
    let base_height = base.height() as i64;

    let left = placement.left as i64;
    let top = placement.top as i64;

    // Calculate the visible region (clamp to base bounds)
    let x_start = left.max(0);
    let y_start = top.max(0);
    let x_end = (left + overlay.width() as i64).min(base_width);
    let y_end = (top + overlay.height() as i64).min(base_height);

    for by in y_start..y_end {
        for bx in x_start..x_end {
            let overlay_pixel = overlay.get_pixel((bx - left) as u32, (by - top) as u32);
            let base_pixel = base.get_pixel(bx as u32, by as u32);

            let blended = blend_pixels(*base_pixel, *overlay_pixel, opacity);
            base.put_pixel(bx as u32, by as u32, blended);
        }
    }
}

/// Blend two pixels using alpha compositing with additional opacity.
///
/// Uses the "over" operator: result = foreground + background * (1 - foreground.alpha)
fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let fg_alpha = (foreground[3] as f32 / 255.0) * opacity.clamp(0.0, 1.0);
    let bg_alpha = background[3] as f32 / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}
