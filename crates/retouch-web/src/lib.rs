//! Browser bindings for the retouch mask canvas and compositor.
//!
//! The host page owns the DOM: it measures the displayed image and its
//! container, forwards pointer and touch events in viewport coordinates,
//! positions the overlay `<canvas>` where [`MaskCanvas::sync_geometry`]
//! says, and blits [`MaskCanvas::preview_pixels`] into it with
//! `putImageData`. Everything else (stroke capture, mask rasterization at
//! natural resolution, cutout compositing) runs in the canvas core.
//!
//! Image bytes are passed in as `Uint8Array`s. Fetching a remote image
//! (and any CORS handling that involves) stays on the JS side.

pub mod blob;

use retouch_canvas::{
    AspectRatio, BrushConfig, DataUrl, Dimensions, EditRequest, ImageSource, MaskSurface, Rect,
};
use wasm_bindgen::prelude::*;

pub use blob::{BlobUrlSlot, WebError, png_to_blob_url, revoke_blob_url};

/// Parse an optional `BrushConfig` JSON string, falling back to defaults.
///
/// Missing fields take their defaults as well.
///
/// # Errors
///
/// Returns [`WebError::Json`] for malformed JSON and
/// [`WebError::Canvas`] if the config fails validation.
pub fn parse_brush_config(config_json: Option<&str>) -> Result<BrushConfig, WebError> {
    let config: BrushConfig = match config_json {
        Some(json) => serde_json::from_str(json)?,
        None => BrushConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// The mask-authoring overlay for one displayed image.
///
/// Owns at most one mask object URL at a time: issuing a new one, clearing,
/// switching images and freeing the handle each revoke the previous URL.
#[wasm_bindgen]
pub struct MaskCanvas {
    surface: MaskSurface,
    mask_url: BlobUrlSlot,
}

#[wasm_bindgen]
impl MaskCanvas {
    /// Create an overlay. `config_json` is a serialized `BrushConfig`.
    ///
    /// # Errors
    ///
    /// Throws if the config is malformed or invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<Self, JsError> {
        let config = parse_brush_config(config_json.as_deref())?;
        Ok(Self {
            surface: MaskSurface::new(config)?,
            mask_url: BlobUrlSlot::default(),
        })
    }

    /// Change the brush width for subsequent strokes.
    ///
    /// # Errors
    ///
    /// Throws if `size` is outside the supported range.
    #[wasm_bindgen(js_name = setBrushSize)]
    pub fn set_brush_size(&mut self, size: f64) -> Result<(), JsError> {
        let config = self.surface.layer().config().with_brush_size(size);
        self.surface.set_brush(config)?;
        Ok(())
    }

    /// Bind to a newly loaded image of the given natural size. Clears
    /// all strokes.
    #[wasm_bindgen(js_name = setImage)]
    pub fn set_image(&mut self, natural_width: u32, natural_height: u32) {
        self.surface
            .set_image(Dimensions::new(natural_width, natural_height));
        self.release_mask_url();
    }

    /// Drop the current image, e.g. when the editor is reset. Clears all
    /// strokes. Pointer input is ignored until the next `syncGeometry`, and
    /// no mask is produced until the next `setImage`.
    #[wasm_bindgen(js_name = unsetImage)]
    pub fn unset_image(&mut self) {
        self.surface.unset_image();
        self.release_mask_url();
    }

    /// Re-measure after image load or window resize.
    ///
    /// Arguments are the `getBoundingClientRect()` of the image and of
    /// the overlay's positioned container. Returns
    /// `[offsetLeft, offsetTop, width, height]` for the overlay canvas.
    #[wasm_bindgen(js_name = syncGeometry)]
    #[allow(clippy::too_many_arguments)]
    pub fn sync_geometry(
        &mut self,
        image_left: f64,
        image_top: f64,
        image_width: f64,
        image_height: f64,
        container_left: f64,
        container_top: f64,
        container_width: f64,
        container_height: f64,
    ) -> Vec<f64> {
        let placement = self.surface.sync_geometry(
            Rect::new(image_left, image_top, image_width, image_height),
            Rect::new(
                container_left,
                container_top,
                container_width,
                container_height,
            ),
        );
        vec![
            placement.offset_left,
            placement.offset_top,
            f64::from(placement.surface.width),
            f64::from(placement.surface.height),
        ]
    }

    /// `mousedown` / `touchstart` at viewport coordinates.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, client_x: f64, client_y: f64) {
        self.surface.pointer_down(client_x, client_y);
    }

    /// `mousemove` / `touchmove` at viewport coordinates.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, client_x: f64, client_y: f64) {
        self.surface.pointer_move(client_x, client_y);
    }

    /// `mouseup` / `touchend`.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) {
        self.surface.pointer_up();
    }

    /// `mouseleave`.
    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&mut self) {
        self.surface.pointer_leave();
    }

    /// Erase all strokes.
    pub fn clear(&mut self) {
        self.surface.clear();
        self.release_mask_url();
    }

    /// Whether anything has been drawn since the last clear.
    #[wasm_bindgen(js_name = hasContent)]
    #[must_use]
    pub fn has_content(&self) -> bool {
        self.surface.has_content()
    }

    /// Show or hide the overlay (before/after peek).
    #[wasm_bindgen(js_name = setVisible)]
    pub fn set_visible(&mut self, visible: bool) {
        self.surface.set_visible(visible);
    }

    /// Whether the overlay should be shown.
    #[wasm_bindgen(js_name = isVisible)]
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.surface.is_visible()
    }

    /// Straight RGBA preview pixels at the overlay's current size, or
    /// `undefined` before the first geometry sync.
    #[wasm_bindgen(js_name = previewPixels)]
    #[must_use]
    pub fn preview_pixels(&self) -> Option<Vec<u8>> {
        self.surface
            .layer()
            .preview_image()
            .map(retouch_canvas::RgbaImage::into_raw)
    }

    /// The mask as PNG bytes at natural resolution, or `undefined` if
    /// nothing has been drawn.
    ///
    /// # Errors
    ///
    /// Throws if rasterization or encoding fails.
    #[wasm_bindgen(js_name = maskPng)]
    pub fn mask_png(&self) -> Result<Option<Vec<u8>>, JsError> {
        Ok(self.surface.mask_png()?)
    }

    /// The mask as a PNG object URL, or `undefined` if nothing has been
    /// drawn.
    ///
    /// The canvas keeps ownership: the URL stays valid until the next
    /// `maskBlobUrl`, `clear`, `setImage`, `unsetImage` or `free`, which revoke it.
    ///
    /// # Errors
    ///
    /// Throws if rasterization, encoding, or Blob creation fails.
    #[wasm_bindgen(js_name = maskBlobUrl)]
    pub fn mask_blob_url(&mut self) -> Result<Option<String>, JsError> {
        let Some(png) = self.surface.mask_png()? else {
            self.release_mask_url();
            return Ok(None);
        };
        let url = png_to_blob_url(&png)?;
        if let Some(previous) = self.mask_url.replace(url.clone()) {
            revoke_blob_url(&previous);
        }
        Ok(Some(url))
    }

    /// The mask as a PNG data URL, ready for an edit request.
    ///
    /// # Errors
    ///
    /// Throws if rasterization or encoding fails.
    #[wasm_bindgen(js_name = maskDataUrl)]
    pub fn mask_data_url(&self) -> Result<Option<String>, JsError> {
        Ok(self
            .surface
            .extract_mask()?
            .map(|mask| mask.to_data_url())
            .transpose()?
            .map(String::from))
    }
}

impl MaskCanvas {
    fn release_mask_url(&mut self) {
        if let Some(url) = self.mask_url.take() {
            revoke_blob_url(&url);
        }
    }
}

impl Drop for MaskCanvas {
    fn drop(&mut self) {
        self.release_mask_url();
    }
}

/// Cut an image out along a mask, both given as encoded bytes.
///
/// Returns a PNG data URL, or `undefined` after logging a console
/// warning if either input cannot be decoded.
#[wasm_bindgen(js_name = applyMaskToImage)]
#[must_use]
pub fn apply_mask_to_image(original: &[u8], mask: &[u8]) -> Option<String> {
    composite_or_warn(ImageSource::Bytes(original), ImageSource::Bytes(mask))
}

/// As [`apply_mask_to_image`], with both inputs as data URLs.
#[wasm_bindgen(js_name = applyMaskToDataUrl)]
#[must_use]
pub fn apply_mask_to_data_url(original: &str, mask: &str) -> Option<String> {
    composite_or_warn(ImageSource::DataUrl(original), ImageSource::DataUrl(mask))
}

fn composite_or_warn(original: ImageSource<'_>, mask: ImageSource<'_>) -> Option<String> {
    match retouch_canvas::composite_sources(original, mask).and_then(|r| r.to_data_url()) {
        Ok(url) => Some(url.into()),
        Err(e) => {
            web_sys::console::warn_1(&format!("error applying mask to image: {e}").into());
            None
        }
    }
}

/// Pad an encoded image with transparency to `ratio` (`"16:9"` etc.).
/// Returns PNG bytes.
///
/// # Errors
///
/// Throws on an undecodable image or malformed ratio.
#[wasm_bindgen(js_name = expandToAspectRatio)]
pub fn expand_to_aspect_ratio(image: &[u8], ratio: &str) -> Result<Vec<u8>, JsError> {
    let ratio: AspectRatio = ratio.parse()?;
    let decoded = retouch_canvas::codec::decode_rgba(image)?;
    let expanded = retouch_canvas::expand_to_aspect_ratio(&decoded, ratio)?;
    Ok(retouch_canvas::codec::encode_png(&expanded)?)
}

/// Build the JSON body for an edit request.
///
/// With a mask the request is a masked edit; without one it edits the
/// whole image. Set `require_mask` for tools that only work on a
/// selection.
///
/// # Errors
///
/// See [`build_edit_request`].
#[wasm_bindgen(js_name = editRequestJson)]
pub fn edit_request_json(
    image_data_url: &str,
    mask_data_url: Option<String>,
    prompt: &str,
    require_mask: bool,
) -> Result<String, JsError> {
    Ok(build_edit_request(
        image_data_url,
        mask_data_url.as_deref(),
        prompt,
        require_mask,
    )?)
}

/// Build and serialize an edit request.
///
/// # Errors
///
/// Returns [`WebError::Canvas`] for a malformed data URL or a missing
/// required mask, and [`WebError::Json`] if serialization fails.
pub fn build_edit_request(
    image_data_url: &str,
    mask_data_url: Option<&str>,
    prompt: &str,
    require_mask: bool,
) -> Result<String, WebError> {
    let image = DataUrl::parse(image_data_url)?;
    let mask = mask_data_url.map(DataUrl::parse).transpose()?;
    let request = if require_mask {
        EditRequest::masked_edit(image, mask, prompt)?
    } else {
        EditRequest::edit(image, mask, prompt)
    };
    Ok(serde_json::to_string(&request)?)
}
