//! Mask images: rasterizing strokes at natural resolution and classifying
//! mask pixels.
//!
//! Polarity contract: black is background (left alone), anything whose
//! red channel reaches [`MASK_THRESHOLD`] is foreground (selected for
//! editing, kept opaque in a cutout). Edit services that expect the
//! opposite polarity need an inverted mask.

use tiny_skia::{Color, Pixmap};

use crate::codec;
use crate::data_url::DataUrl;
use crate::geometry::SpaceTransform;
use crate::stroke::StrokeLayer;
use crate::types::{CanvasError, Dimensions, RgbaImage};

/// Red-channel value at which a mask pixel stops being background.
///
/// `red < MASK_THRESHOLD` is background; `red >= MASK_THRESHOLD` is
/// foreground.
pub const MASK_THRESHOLD: u8 = 128;

/// Classification of a single mask pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaskClass {
    /// Not selected; transparent in a cutout.
    Background,
    /// Selected; opaque in a cutout.
    Foreground,
}

impl MaskClass {
    /// Classify by red channel value.
    #[must_use]
    pub const fn classify(red: u8) -> Self {
        if red < MASK_THRESHOLD {
            Self::Background
        } else {
            Self::Foreground
        }
    }

    /// Classify an RGBA mask pixel. Fully transparent pixels carry no
    /// color and count as background.
    #[must_use]
    pub const fn of_pixel(px: image::Rgba<u8>) -> Self {
        if px.0[3] == 0 {
            Self::Background
        } else {
            Self::classify(px.0[0])
        }
    }

    /// Output alpha for this class.
    #[must_use]
    pub const fn alpha(self) -> u8 {
        match self {
            Self::Background => 0,
            Self::Foreground => 255,
        }
    }
}

/// A rasterized mask at the source image's natural resolution.
///
/// Black background, stroke color wherever the user painted. Every
/// extraction produces a fresh `MaskImage`; it is never updated in place.
#[derive(Debug, Clone)]
pub struct MaskImage(RgbaImage);

impl MaskImage {
    /// Wrap an existing mask raster (e.g. one decoded from a file).
    #[must_use]
    pub const fn from_image(image: RgbaImage) -> Self {
        Self(image)
    }

    /// Pixel dimensions of the mask.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::of(&self.0)
    }

    /// Borrow the underlying raster.
    #[must_use]
    pub const fn as_image(&self) -> &RgbaImage {
        &self.0
    }

    /// Consume the mask and return the raster.
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.0
    }

    /// Classify the pixel at `(x, y)`, or `None` if out of bounds.
    #[must_use]
    pub fn class_at(&self, x: u32, y: u32) -> Option<MaskClass> {
        self.0.get_pixel_checked(x, y).map(|px| MaskClass::of_pixel(*px))
    }

    /// Number of foreground pixels.
    #[must_use]
    pub fn foreground_count(&self) -> usize {
        self.0
            .pixels()
            .filter(|px| MaskClass::of_pixel(**px) == MaskClass::Foreground)
            .count()
    }

    /// Encode as a lossless PNG.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::PngEncode`] if encoding fails.
    pub fn to_png(&self) -> Result<Vec<u8>, CanvasError> {
        codec::encode_png(&self.0)
    }

    /// Encode as a PNG data URL.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::PngEncode`] if encoding fails.
    pub fn to_data_url(&self) -> Result<DataUrl, CanvasError> {
        Ok(DataUrl::png(self.to_png()?))
    }
}

impl StrokeLayer {
    /// Rasterize all strokes into a mask of size `natural`.
    ///
    /// Returns `Ok(None)` when nothing has been drawn: callers treat that
    /// as "no mask", not as a failure. Otherwise the mask is filled black
    /// and every stroke is drawn scaled by `natural / extent`, where
    /// `extent` is the surface size that stroke was captured on.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Raster`] if a `natural`-sized raster cannot
    /// be allocated.
    pub fn rasterize_to(&self, natural: Dimensions) -> Result<Option<MaskImage>, CanvasError> {
        if !self.has_content() {
            return Ok(None);
        }
        let mut pixmap =
            Pixmap::new(natural.width, natural.height).ok_or(CanvasError::Raster(natural))?;
        pixmap.fill(Color::BLACK);

        for stroke in self.strokes() {
            let transform = SpaceTransform::between(stroke.extent, natural)?;
            stroke.paint(&mut pixmap, transform.to_skia());
        }

        tracing::debug!(
            %natural,
            display = %self.extent(),
            strokes = self.stroke_count(),
            "rasterized mask"
        );
        Ok(Some(MaskImage(codec::pixmap_to_rgba(&pixmap))))
    }

    /// Rasterize and PNG-encode the mask; `Ok(None)` when nothing is drawn.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::rasterize_to`] and PNG encoding failures.
    pub fn mask_png(&self, natural: Dimensions) -> Result<Option<Vec<u8>>, CanvasError> {
        self.rasterize_to(natural)?
            .map(|mask| mask.to_png())
            .transpose()
    }
}
