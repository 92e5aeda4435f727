//! Shared types for the retouch mask canvas.

use serde::{Deserialize, Serialize};

/// Re-export `RgbaImage` so downstream crates can hold decoded and
/// composited images without depending on `image` directly.
pub use image::RgbaImage;

/// A point in display space: CSS pixels relative to the drawing
/// surface's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayPoint {
    /// Horizontal position (pixels from the surface's left edge).
    pub x: f64,
    /// Vertical position (pixels from the surface's top edge).
    pub y: f64,
}

impl DisplayPoint {
    /// Create a new display-space point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A point in natural space: pixel coordinates of the decoded source
/// image, independent of how large it is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NaturalPoint {
    /// Horizontal position (pixels from the image's left edge).
    pub x: f64,
    /// Vertical position (pixels from the image's top edge).
    pub y: f64,
}

impl NaturalPoint {
    /// Create a new natural-space point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Integer pixel dimensions.
///
/// Used both for the natural size of an image and for the pixel size
/// of the display-resolution drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create new dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either side is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Dimensions of an existing image.
    #[must_use]
    pub fn of(image: &RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self { width, height }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Errors produced by mask authoring, compositing and the payload codecs.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    /// Failed to decode an input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    PngEncode(String),

    /// A raster buffer could not be allocated (zero or oversized extent).
    #[error("cannot allocate a {0} raster")]
    Raster(Dimensions),

    /// The display surface has no area, so no scale factor exists.
    #[error("display surface {0} has no area")]
    EmptySurface(Dimensions),

    /// A `data:` URL did not have the `data:<mime>;base64,<payload>` shape.
    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),

    /// The base64 payload of a data URL was malformed.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// An aspect ratio string was not of the form `W:H` with positive sides.
    #[error("invalid aspect ratio: {0}")]
    InvalidAspectRatio(String),

    /// Padding to an aspect ratio would produce an unreasonably large canvas.
    #[error("expanded canvas {width}x{height} is too large")]
    OversizedCanvas {
        /// Requested width in pixels.
        width: u64,
        /// Requested height in pixels.
        height: u64,
    },

    /// Brush configuration is out of range.
    #[error("invalid brush configuration: {0}")]
    InvalidConfig(String),

    /// A masked edit was requested but nothing has been drawn.
    #[error("draw on the image to select an area to edit")]
    MaskRequired,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_empty_when_either_side_is_zero() {
        assert!(Dimensions::new(0, 10).is_empty());
        assert!(Dimensions::new(10, 0).is_empty());
        assert!(!Dimensions::new(1, 1).is_empty());
    }

    #[test]
    fn dimensions_of_image() {
        let img = RgbaImage::new(17, 31);
        assert_eq!(Dimensions::of(&img), Dimensions::new(17, 31));
    }

    #[test]
    fn dimensions_display() {
        assert_eq!(Dimensions::new(1000, 750).to_string(), "1000x750");
    }

    #[test]
    fn error_display_messages() {
        assert_eq!(CanvasError::EmptyInput.to_string(), "input image data is empty");
        assert_eq!(
            CanvasError::Raster(Dimensions::new(0, 5)).to_string(),
            "cannot allocate a 0x5 raster",
        );
        assert_eq!(
            CanvasError::MaskRequired.to_string(),
            "draw on the image to select an area to edit",
        );
    }
}
