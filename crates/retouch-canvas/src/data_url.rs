//! `data:` URL payloads.
//!
//! Images travel to the edit service, and composite results travel back
//! to the page, as base64 data URLs: `data:<mime>;base64,<payload>`.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::types::CanvasError;

/// MIME type of every image this crate produces.
pub const PNG_MIME: &str = "image/png";

/// A decoded base64 `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DataUrl {
    mime_type: String,
    data: Vec<u8>,
}

impl DataUrl {
    /// Wrap raw bytes with a MIME type.
    #[must_use]
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Wrap PNG bytes.
    #[must_use]
    pub fn png(data: Vec<u8>) -> Self {
        Self::new(PNG_MIME, data)
    }

    /// Parse a `data:<mime>;base64,<payload>` string.
    ///
    /// The MIME part is everything between `data:` and the last
    /// `;base64,` marker.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidDataUrl`] if the prefix or the
    /// `;base64,` marker is missing, or the URL spans several lines.
    /// Returns [`CanvasError::Base64`] if the payload is not valid base64.
    pub fn parse(s: &str) -> Result<Self, CanvasError> {
        let invalid = || {
            let head: String = s.chars().take(32).collect();
            CanvasError::InvalidDataUrl(head)
        };
        if s.contains(['\n', '\r']) {
            return Err(invalid());
        }
        let rest = s.strip_prefix("data:").ok_or_else(invalid)?;
        let (mime_type, payload) = rest.rsplit_once(";base64,").ok_or_else(invalid)?;
        let data = STANDARD.decode(payload)?;
        Ok(Self::new(mime_type, data))
    }

    /// The MIME type, e.g. `image/png`.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The decoded payload.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the URL and return the decoded payload.
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "data:{};base64,{}",
            self.mime_type,
            STANDARD.encode(&self.data)
        )
    }
}

impl FromStr for DataUrl {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DataUrl {
    type Error = CanvasError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DataUrl> for String {
    fn from(value: DataUrl) -> Self {
        value.to_string()
    }
}
