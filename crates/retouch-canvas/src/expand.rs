//! Canvas expansion for generative fill.
//!
//! Pads an image with transparent pixels until it reaches a target aspect
//! ratio, keeping the original centred. The edit service is then asked to
//! fill the transparent area.

use std::fmt;
use std::str::FromStr;

use image::imageops;
use serde::{Deserialize, Serialize};

use crate::types::{CanvasError, RgbaImage};

/// A `width:height` aspect ratio with positive integer sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AspectRatio {
    width: u32,
    height: u32,
}

impl AspectRatio {
    /// `1:1`.
    pub const SQUARE: Self = Self::new_unchecked(1, 1);
    /// `16:9`.
    pub const WIDESCREEN: Self = Self::new_unchecked(16, 9);
    /// `9:16`.
    pub const PORTRAIT_WIDESCREEN: Self = Self::new_unchecked(9, 16);
    /// `4:3`.
    pub const STANDARD: Self = Self::new_unchecked(4, 3);
    /// `3:4`.
    pub const PORTRAIT_STANDARD: Self = Self::new_unchecked(3, 4);

    /// The ratios the image generator accepts.
    pub const PRESETS: [Self; 5] = [
        Self::SQUARE,
        Self::WIDESCREEN,
        Self::PORTRAIT_WIDESCREEN,
        Self::STANDARD,
        Self::PORTRAIT_STANDARD,
    ];

    const fn new_unchecked(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Create a ratio.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidAspectRatio`] if either side is zero.
    pub fn new(width: u32, height: u32) -> Result<Self, CanvasError> {
        if width == 0 || height == 0 {
            return Err(CanvasError::InvalidAspectRatio(format!("{width}:{height}")));
        }
        Ok(Self { width, height })
    }

    /// Width divided by height.
    #[must_use]
    pub fn ratio(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Returns `true` if this is one of [`Self::PRESETS`].
    #[must_use]
    pub fn is_preset(self) -> bool {
        Self::PRESETS.contains(&self)
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

impl FromStr for AspectRatio {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CanvasError::InvalidAspectRatio(s.to_string());
        let (w, h) = s.trim().split_once(':').ok_or_else(invalid)?;
        let w: u32 = w.trim().parse().map_err(|_| invalid())?;
        let h: u32 = h.trim().parse().map_err(|_| invalid())?;
        Self::new(w, h)
    }
}

impl TryFrom<String> for AspectRatio {
    type Error = CanvasError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AspectRatio> for String {
    fn from(value: AspectRatio) -> Self {
        value.to_string()
    }
}

/// Largest canvas [`expand_to_aspect_ratio`] will allocate, in pixels
/// (256 MiB of RGBA).
pub const MAX_EXPANDED_PIXELS: u64 = 1 << 26;

/// Pad `image` with transparency to `target`, original centred.
///
/// If the target is wider than the image, the height is kept and the
/// width grows to `height * ratio`; otherwise the width is kept and the
/// height grows to `width / ratio`. The grown side is truncated to whole
/// pixels and never shrinks below the original.
///
/// # Errors
///
/// Returns [`CanvasError::EmptyInput`] if `image` has no pixels.
/// Returns [`CanvasError::OversizedCanvas`] if the padded canvas would
/// exceed [`MAX_EXPANDED_PIXELS`].
pub fn expand_to_aspect_ratio(
    image: &RgbaImage,
    target: AspectRatio,
) -> Result<RgbaImage, CanvasError> {
    let (iw, ih) = image.dimensions();
    if iw == 0 || ih == 0 {
        return Err(CanvasError::EmptyInput);
    }
    let (iw64, ih64) = (u64::from(iw), u64::from(ih));
    let (rw, rh) = (u64::from(target.width), u64::from(target.height));

    // Cross-multiplied comparison and floor division: exact, no float drift.
    let (width, height) = if rw * ih64 > rh * iw64 {
        (ih64 * rw / rh, ih64)
    } else {
        (iw64, iw64 * rh / rw)
    };
    let (width, height) = (width.max(iw64), height.max(ih64));

    let oversized = || CanvasError::OversizedCanvas { width, height };
    if width.checked_mul(height).is_none_or(|px| px > MAX_EXPANDED_PIXELS) {
        return Err(oversized());
    }
    let width = u32::try_from(width).map_err(|_| oversized())?;
    let height = u32::try_from(height).map_err(|_| oversized())?;

    let mut canvas = RgbaImage::new(width, height);
    let x = i64::from((width - iw) / 2);
    let y = i64::from((height - ih) / 2);
    imageops::replace(&mut canvas, image, x, y);

    tracing::debug!(from = ?(iw, ih), to = ?(width, height), %target, "expanded canvas");
    Ok(canvas)
}
