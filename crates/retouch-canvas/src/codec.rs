//! Image decoding and lossless PNG encoding.

use image::ImageEncoder;
use tiny_skia::Pixmap;

use crate::data_url::DataUrl;
use crate::types::{CanvasError, RgbaImage};

/// Where an input image comes from.
///
/// Filesystem paths and network URLs are resolved by the caller; the
/// canvas crate stays free of I/O.
#[derive(Debug, Clone, Copy)]
pub enum ImageSource<'a> {
    /// Encoded image bytes (PNG, JPEG, WebP).
    Bytes(&'a [u8]),
    /// A `data:<mime>;base64,<payload>` URL.
    DataUrl(&'a str),
}

impl ImageSource<'_> {
    /// Decode the source into straight RGBA at its natural resolution.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidDataUrl`] or [`CanvasError::Base64`]
    /// for a malformed data URL, [`CanvasError::EmptyInput`] for an empty
    /// payload and [`CanvasError::ImageDecode`] for undecodable bytes.
    pub fn decode(self) -> Result<RgbaImage, CanvasError> {
        match self {
            Self::Bytes(bytes) => decode_rgba(bytes),
            Self::DataUrl(url) => decode_rgba(DataUrl::parse(url)?.data()),
        }
    }
}

/// Decode raw image bytes into an RGBA buffer.
///
/// # Errors
///
/// Returns [`CanvasError::EmptyInput`] if `bytes` is empty.
/// Returns [`CanvasError::ImageDecode`] if the format is unrecognized
/// or the data is corrupt.
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage, CanvasError> {
    if bytes.is_empty() {
        return Err(CanvasError::EmptyInput);
    }
    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgba8())
}

/// Encode an RGBA buffer as PNG bytes.
///
/// # Errors
///
/// Returns [`CanvasError::PngEncode`] if the encoder rejects the buffer.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CanvasError> {
    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| CanvasError::PngEncode(e.to_string()))?;
    Ok(png_bytes)
}

/// Copy a premultiplied `tiny-skia` pixmap into a straight-alpha `RgbaImage`.
pub(crate) fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (src, dst) in pixmap.pixels().iter().zip(img.pixels_mut()) {
        let c = src.demultiply();
        *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    img
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_returns_error() {
        assert!(matches!(decode_rgba(&[]), Err(CanvasError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_return_decode_error() {
        let result = decode_rgba(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(CanvasError::ImageDecode(_))));
    }

    #[test]
    fn png_encoding_is_lossless() {
        let img = RgbaImage::from_fn(7, 5, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            image::Rgba([(x * 30) as u8, (y * 40) as u8, 127, (x * y) as u8])
        });
        let png = encode_png(&img).unwrap();
        let decoded = decode_rgba(&png).unwrap();
        assert_eq!(decoded.as_raw(), img.as_raw());
    }

    #[test]
    fn data_url_source_decodes() {
        let img = RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]));
        let url = DataUrl::png(encode_png(&img).unwrap()).to_string();
        let decoded = ImageSource::DataUrl(&url).decode().unwrap();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(0, 0).0, [1, 2, 3, 255]);
    }

    #[test]
    fn malformed_data_url_source_fails() {
        let result = ImageSource::DataUrl("http://example.com/a.png").decode();
        assert!(matches!(result, Err(CanvasError::InvalidDataUrl(_))));
    }

    #[test]
    fn pixmap_conversion_demultiplies() {
        let mut pixmap = Pixmap::new(1, 1).unwrap();
        pixmap.fill(tiny_skia::Color::from_rgba8(200, 100, 50, 128));
        let img = pixmap_to_rgba(&pixmap);
        let px = img.get_pixel(0, 0).0;
        assert_eq!(px[3], 128);
        // Premultiply/demultiply round trip loses at most one step.
        assert!(px[0].abs_diff(200) <= 2, "red was {}", px[0]);
        assert!(px[1].abs_diff(100) <= 2, "green was {}", px[1]);
    }
}
