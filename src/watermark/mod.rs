//! Image watermarks.
//!
//! A request may name a watermark asset in the object store. After the
//! source is transformed, the asset is placed by gravity and blended on top
//! with the requested opacity.
//!
//! - `position`: gravity-based placement geometry
//! - `compositor`: alpha blending of the overlay onto the base image

pub mod compositor;
pub mod position;

pub use compositor::blend_onto;
pub use position::{calculate_position, Gravity, Placement};
