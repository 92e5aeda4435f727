//! Mask-to-alpha compositing: turn a painted selection into a
//! transparency cutout.
//!
//! The output always has the original's natural size. RGB is copied
//! verbatim from the original; alpha is 0 where the mask is background
//! and 255 where it is foreground (see [`MaskClass`]). There are no
//! intermediate alpha values.

use std::borrow::Cow;

use image::imageops::{self, FilterType};

use crate::codec::{self, ImageSource};
use crate::data_url::DataUrl;
use crate::mask::{MaskClass, MaskImage};
use crate::types::{CanvasError, Dimensions, RgbaImage};

/// A transparency cutout at the original image's natural resolution.
#[derive(Debug, Clone)]
pub struct CompositeResult(RgbaImage);

impl CompositeResult {
    /// Pixel dimensions of the cutout.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::of(&self.0)
    }

    /// Borrow the cutout raster.
    #[must_use]
    pub const fn as_image(&self) -> &RgbaImage {
        &self.0
    }

    /// Consume the result and return the raster.
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.0
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

/// Cut `original` out along `mask`.
///
/// A mask of a different size is resampled onto the original's size
/// (scaled to fit, never cropped) before classification.
#[must_use = "returns the composited cutout"]
pub fn apply_mask(original: &RgbaImage, mask: &MaskImage) -> CompositeResult {
    let (width, height) = original.dimensions();
    let mask = fit_to(mask.as_image(), width, height);

    let mut out = RgbaImage::new(width, height);
    for ((src, m), dst) in original.pixels().zip(mask.pixels()).zip(out.pixels_mut()) {
        let alpha = MaskClass::of_pixel(*m).alpha();
        *dst = image::Rgba([src[0], src[1], src[2], alpha]);
    }
    CompositeResult(out)
}

/// Decode both sources and composite them.
///
/// # Errors
///
/// Returns any decode error from either source (see
/// [`ImageSource::decode`]).
pub fn composite_sources(
    original: ImageSource<'_>,
    mask: ImageSource<'_>,
) -> Result<CompositeResult, CanvasError> {
    let mask = MaskImage::from_image(mask.decode()?);
    let original = original.decode()?;
    Ok(apply_mask(&original, &mask))
}

/// Composite two sources into a PNG data URL, absorbing failures.
///
/// Any decode or encode failure is logged at `warn` and turned into
/// `None`, so a bad source never aborts the caller's flow.
#[must_use]
pub fn apply_mask_to_image(original: ImageSource<'_>, mask: ImageSource<'_>) -> Option<String> {
    match composite_sources(original, mask).and_then(|result| result.to_data_url()) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "error applying mask to image");
            None
        }
    }
}

fn fit_to(mask: &RgbaImage, width: u32, height: u32) -> Cow<'_, RgbaImage> {
    if mask.dimensions() == (width, height) {
        Cow::Borrowed(mask)
    } else {
        Cow::Owned(imageops::resize(mask, width, height, FilterType::Triangle))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        #[allow(clippy::cast_possible_truncation)]
        RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x * 7) as u8, (y * 11) as u8, ((x + y) * 3) as u8, 200])
        })
    }

    fn uniform_mask(width: u32, height: u32, value: u8) -> MaskImage {
        MaskImage::from_image(RgbaImage::from_pixel(
            width,
            height,
            image::Rgba([value, value, value, 255]),
        ))
    }

    #[test]
    fn black_mask_makes_everything_transparent() {
        let original = gradient(16, 9);
        let result = apply_mask(&original, &uniform_mask(16, 9, 0));
        for (src, out) in original.pixels().zip(result.as_image().pixels()) {
            assert_eq!(&out.0[..3], &src.0[..3]);
            assert_eq!(out.0[3], 0);
        }
    }

    #[test]
    fn white_mask_makes_everything_opaque() {
        let original = gradient(16, 9);
        let result = apply_mask(&original, &uniform_mask(16, 9, 255));
        for (src, out) in original.pixels().zip(result.as_image().pixels()) {
            assert_eq!(&out.0[..3], &src.0[..3]);
            assert_eq!(out.0[3], 255);
        }
    }

    #[test]
    fn red_127_is_transparent_and_128_is_opaque() {
        let original = gradient(2, 1);
        let mut mask = RgbaImage::new(2, 1);
        mask.put_pixel(0, 0, image::Rgba([127, 255, 255, 255]));
        mask.put_pixel(1, 0, image::Rgba([128, 0, 0, 255]));
        let result = apply_mask(&original, &MaskImage::from_image(mask));
        assert_eq!(result.as_image().get_pixel(0, 0).0[3], 0);
        assert_eq!(result.as_image().get_pixel(1, 0).0[3], 255);
    }

    #[test]
    fn only_the_red_channel_matters() {
        let original = gradient(1, 1);
        let mask = RgbaImage::from_pixel(1, 1, image::Rgba([0, 255, 255, 255]));
        let result = apply_mask(&original, &MaskImage::from_image(mask));
        assert_eq!(result.as_image().get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn smaller_mask_is_scaled_to_fit() {
        let original = gradient(40, 20);
        // Left half white, right half black, at quarter resolution.
        let mask = RgbaImage::from_fn(10, 5, |x, _| {
            if x < 5 {
                image::Rgba([255, 255, 255, 255])
            } else {
                image::Rgba([0, 0, 0, 255])
            }
        });
        let result = apply_mask(&original, &MaskImage::from_image(mask));
        assert_eq!(result.dimensions(), Dimensions::new(40, 20));
        assert_eq!(result.as_image().get_pixel(2, 10).0[3], 255);
        assert_eq!(result.as_image().get_pixel(37, 10).0[3], 0);
    }

    #[test]
    fn output_takes_original_dimensions() {
        let original = gradient(33, 17);
        let result = apply_mask(&original, &uniform_mask(64, 64, 255));
        assert_eq!(result.dimensions(), Dimensions::new(33, 17));
    }

    #[test]
    fn sources_round_trip_through_png() {
        let original = gradient(8, 8);
        let original_png = codec::encode_png(&original).unwrap();
        let mask_png = uniform_mask(8, 8, 255).to_png().unwrap();
        let result =
            composite_sources(ImageSource::Bytes(&original_png), ImageSource::Bytes(&mask_png))
                .unwrap();
        assert_eq!(&result.as_image().get_pixel(3, 4).0[..3], &original.get_pixel(3, 4).0[..3]);
    }

    #[test]
    fn undecodable_source_yields_none() {
        let mask_png = uniform_mask(2, 2, 255).to_png().unwrap();
        let result = apply_mask_to_image(
            ImageSource::Bytes(&[0xDE, 0xAD]),
            ImageSource::Bytes(&mask_png),
        );
        assert!(result.is_none());
    }

    #[test]
    fn empty_source_yields_none() {
        let original_png = codec::encode_png(&gradient(2, 2)).unwrap();
        let result = apply_mask_to_image(ImageSource::Bytes(&original_png), ImageSource::Bytes(&[]));
        assert!(result.is_none());
    }

    #[test]
    fn success_yields_png_data_url() {
        let original_png = codec::encode_png(&gradient(4, 4)).unwrap();
        let mask_url = uniform_mask(4, 4, 0).to_data_url().unwrap().to_string();
        let url = apply_mask_to_image(
            ImageSource::Bytes(&original_png),
            ImageSource::DataUrl(&mask_url),
        )
        .unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        let decoded = ImageSource::DataUrl(&url).decode().unwrap();
        assert!(decoded.pixels().all(|px| px.0[3] == 0));
    }
}
