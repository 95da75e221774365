//! Position calculation for watermark placement.
//!
//! A watermark is anchored by gravity: centered along the edge it gravitates
//! to, or centered on the image. Offsets are not clamped; a watermark larger
//! than the image gets negative offsets and the compositor blends only the
//! part that overlaps.
//!
//! # Example
//!
//! ```
//! use kitsune::image_optimizer::ImageDimensions;
//! use kitsune::watermark::position::{calculate_position, Gravity};
//!
//! let base = ImageDimensions::new(800, 600);
//! let mark = ImageDimensions::new(100, 50);
//!
//! let placement = calculate_position(&base, &mark, Gravity::South);
//! assert_eq!((placement.left, placement.top), (350, 550));
//! ```

use crate::image_optimizer::ImageDimensions;

/// Where the watermark gravitates on the base image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gravity {
    North,
    South,
    East,
    West,
    #[default]
    Center,
}

impl Gravity {
    /// Lenient parse: unrecognized text means Center
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "north" => Gravity::North,
            "south" => Gravity::South,
            "east" => Gravity::East,
            "west" => Gravity::West,
            _ => Gravity::Center,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gravity::North => "north",
            Gravity::South => "south",
            Gravity::East => "east",
            Gravity::West => "west",
            Gravity::Center => "center",
        }
    }
}

/// Offset of the watermark's top-left corner on the base image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub top: i32,
    pub left: i32,
}

impl Placement {
    pub fn new(top: i32, left: i32) -> Self {
        Self { top, left }
    }
}

/// Calculate where a watermark goes on a base image.
///
/// Integer division truncates toward zero, so odd differences round the
/// offset toward the top-left.
pub fn calculate_position(
    base: &ImageDimensions,
    watermark: &ImageDimensions,
    gravity: Gravity,
) -> Placement {
    let dx = base.width as i32 - watermark.width as i32;
    let dy = base.height as i32 - watermark.height as i32;

    match gravity {
        Gravity::North => Placement::new(0, dx / 2),
        Gravity::South => Placement::new(dy, dx / 2),
        Gravity::East => Placement::new(dy / 2, dx),
        Gravity::West => Placement::new(dy / 2, 0),
        Gravity::Center => Placement::new(dy / 2, dx / 2),
    }
}
