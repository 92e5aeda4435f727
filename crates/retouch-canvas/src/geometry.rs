//! Display-space geometry: overlay placement and the display → natural
//! coordinate transform.
//!
//! The drawing surface sits on top of the rendered image and must cover
//! exactly the image's bounding box. Every time that box changes (image
//! load, window resize, layout shift) the host re-measures both boxes and
//! calls [`OverlayPlacement::fit`]. Pointer positions arrive in viewport
//! coordinates and are made surface-local with [`Rect::to_local`].
//!
//! Stroke points stay in display space until rasterization, where
//! [`SpaceTransform`] maps them onto the image's natural resolution.

use serde::{Deserialize, Serialize};

use crate::types::{CanvasError, Dimensions, DisplayPoint, NaturalPoint};

/// An axis-aligned box in viewport coordinates (CSS pixels), as reported
/// by `getBoundingClientRect`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Translate a viewport position into coordinates local to this box.
    #[must_use]
    pub fn to_local(self, client_x: f64, client_y: f64) -> DisplayPoint {
        DisplayPoint::new(client_x - self.left, client_y - self.top)
    }

    /// Pixel size of a surface covering this box.
    ///
    /// Fractional sizes truncate and negative or non-finite sizes clamp
    /// to zero, matching how a canvas element's integer `width`/`height`
    /// attributes absorb a CSS size.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pixel_dimensions(self) -> Dimensions {
        let side = |v: f64| {
            if v.is_finite() && v > 0.0 {
                v.min(f64::from(u32::MAX)) as u32
            } else {
                0
            }
        };
        Dimensions::new(side(self.width), side(self.height))
    }
}

/// Where the drawing surface goes, relative to its container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayPlacement {
    /// Offset of the surface's left edge from the container's left edge.
    pub offset_left: f64,
    /// Offset of the surface's top edge from the container's top edge.
    pub offset_top: f64,
    /// Pixel size the surface must take.
    pub surface: Dimensions,
}

impl OverlayPlacement {
    /// Compute the placement that makes the surface cover `image` exactly.
    ///
    /// Both boxes are viewport-relative. The surface takes the image's
    /// rendered size and is offset by the difference of the two top-left
    /// corners.
    #[must_use]
    pub fn fit(image: Rect, container: Rect) -> Self {
        Self {
            offset_left: image.left - container.left,
            offset_top: image.top - container.top,
            surface: image.pixel_dimensions(),
        }
    }
}

/// Per-axis scale from display space into natural space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpaceTransform {
    /// `natural.width / display.width`.
    pub scale_x: f64,
    /// `natural.height / display.height`.
    pub scale_y: f64,
}

impl SpaceTransform {
    /// Derive the transform from the surface size strokes were drawn on
    /// and the natural size of the image under it.
    ///
    /// The two axes scale independently; a non-uniform layout stretches
    /// strokes the same way it stretches the image.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::EmptySurface`] if `display` has no area.
    pub fn between(display: Dimensions, natural: Dimensions) -> Result<Self, CanvasError> {
        if display.is_empty() {
            return Err(CanvasError::EmptySurface(display));
        }
        Ok(Self {
            scale_x: f64::from(natural.width) / f64::from(display.width),
            scale_y: f64::from(natural.height) / f64::from(display.height),
        })
    }

    /// The identity transform (display and natural sizes agree).
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Map a display-space point into natural space.
    #[must_use]
    pub fn apply(self, p: DisplayPoint) -> NaturalPoint {
        NaturalPoint::new(p.x * self.scale_x, p.y * self.scale_y)
    }

    /// Same transform as a `tiny-skia` matrix for rendering.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_skia(self) -> tiny_skia::Transform {
        tiny_skia::Transform::from_scale(self.scale_x as f32, self.scale_y as f32)
    }
}
