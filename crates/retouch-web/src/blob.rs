//! PNG Blob URLs for `<img src>` and edit-service uploads.

use wasm_bindgen::prelude::*;
use web_sys::BlobPropertyBag;

/// Errors raised by the browser glue.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// The canvas core rejected the operation.
    #[error(transparent)]
    Canvas(#[from] retouch_canvas::CanvasError),

    /// A config or request JSON string could not be parsed or produced.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for WebError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

impl From<WebError> for JsValue {
    fn from(err: WebError) -> Self {
        JsError::new(&err.to_string()).into()
    }
}

/// Wrap already-encoded PNG bytes in an object URL.
///
/// The returned URL must be revoked via [`revoke_blob_url`] once the
/// image it backs is replaced or dropped.
///
/// # Errors
///
/// Returns [`WebError::JsError`] if Blob or URL creation fails.
#[wasm_bindgen(js_name = pngToBlobUrl)]
pub fn png_to_blob_url(png_bytes: &[u8]) -> Result<String, WebError> {
    let uint8_array = js_sys::Uint8Array::from(png_bytes);
    let parts = js_sys::Array::new();
    parts.push(&uint8_array);

    let opts = BlobPropertyBag::new();
    opts.set_type(retouch_canvas::data_url::PNG_MIME);
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts)?;

    Ok(web_sys::Url::create_object_url_with_blob(&blob)?)
}

/// Release an object URL created by [`png_to_blob_url`].
///
/// Failures are ignored; the URL is unusable either way.
#[wasm_bindgen(js_name = revokeBlobUrl)]
pub fn revoke_blob_url(url: &str) {
    let _ = web_sys::Url::revoke_object_url(url);
}

/// The one object URL an owner currently has outstanding.
///
/// Issuing a new URL hands back the one it replaces so the caller can
/// revoke it; at most one URL is live per slot.
#[derive(Debug, Default)]
pub struct BlobUrlSlot {
    current: Option<String>,
}

impl BlobUrlSlot {
    /// Record `url` as current and return the URL it supersedes.
    #[must_use = "the superseded URL must be revoked"]
    pub fn replace(&mut self, url: String) -> Option<String> {
        self.current.replace(url)
    }

    /// Forget the current URL and return it for revocation.
    #[must_use = "the released URL must be revoked"]
    pub const fn take(&mut self) -> Option<String> {
        self.current.take()
    }

    /// The URL currently outstanding.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slot_has_nothing_to_revoke() {
        let mut slot = BlobUrlSlot::default();
        assert_eq!(slot.current(), None);
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn replacing_hands_back_the_previous_url() {
        let mut slot = BlobUrlSlot::default();
        assert_eq!(slot.replace("blob:a".into()), None);
        assert_eq!(slot.replace("blob:b".into()), Some("blob:a".into()));
        assert_eq!(slot.current(), Some("blob:b"));
    }

    #[test]
    fn take_releases_the_current_url() {
        let mut slot = BlobUrlSlot::default();
        let _ = slot.replace("blob:a".into());
        assert_eq!(slot.take(), Some("blob:a".into()));
        assert_eq!(slot.current(), None);
        assert_eq!(slot.take(), None);
    }
}
