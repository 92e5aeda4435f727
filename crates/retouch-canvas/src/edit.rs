//! Wire types for the remote image-edit service.
//!
//! The service itself is opaque: it takes an image, an optional mask and
//! an instruction, and returns an image, a text explanation, or nothing.
//! Requests are JSON objects tagged by `action`; image payloads are
//! [`DataUrl`] strings.

use serde::{Deserialize, Serialize};

use crate::data_url::DataUrl;
use crate::expand::AspectRatio;
use crate::types::CanvasError;

/// Explanation used when the service returns neither image nor text.
pub const BLOCKED_MESSAGE: &str = "No content was generated. The request may have been blocked.";

/// A request to the edit service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum EditRequest {
    /// Edit the whole image according to `prompt`.
    EditImage {
        /// Source image.
        image: DataUrl,
        /// Instruction.
        prompt: String,
    },
    /// Edit the masked area of the image according to `prompt`.
    EditImageWithMask {
        /// Source image.
        image: DataUrl,
        /// Black background, non-black foreground, same size as `image`.
        mask: DataUrl,
        /// Instruction.
        prompt: String,
    },
    /// Ask for short editing suggestions for the image.
    GetCreativeIdeas {
        /// Source image.
        image: DataUrl,
    },
    /// Generate new images from text alone.
    #[serde(rename_all = "camelCase")]
    GenerateImages {
        /// Description of the images.
        prompt: String,
        /// How many images to generate.
        number_of_images: u32,
        /// Output aspect ratio.
        aspect_ratio: AspectRatio,
    },
}

impl EditRequest {
    /// Build an edit, masked if a mask is present.
    ///
    /// A missing mask is not an error here: the request falls back to a
    /// whole-image edit.
    #[must_use]
    pub fn edit(image: DataUrl, mask: Option<DataUrl>, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        match mask {
            Some(mask) => Self::EditImageWithMask {
                image,
                mask,
                prompt,
            },
            None => Self::EditImage { image, prompt },
        }
    }

    /// Build an edit that only makes sense with a selection (inpainting,
    /// object removal).
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::MaskRequired`] if `mask` is `None`.
    pub fn masked_edit(
        image: DataUrl,
        mask: Option<DataUrl>,
        prompt: impl Into<String>,
    ) -> Result<Self, CanvasError> {
        let mask = mask.ok_or(CanvasError::MaskRequired)?;
        Ok(Self::edit(image, Some(mask), prompt))
    }

    /// The `action` tag this request serializes with.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::EditImage { .. } => "editImage",
            Self::EditImageWithMask { .. } => "editImageWithMask",
            Self::GetCreativeIdeas { .. } => "getCreativeIdeas",
            Self::GenerateImages { .. } => "generateImages",
        }
    }
}

/// Response to [`EditRequest::EditImage`] and [`EditRequest::EditImageWithMask`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditResponse {
    /// The edited image, if one was produced.
    #[serde(default)]
    pub image: Option<DataUrl>,
    /// Text returned alongside (or instead of) the image.
    #[serde(default)]
    pub text: Option<String>,
}

/// What an [`EditResponse`] amounts to.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// An image came back.
    Image(DataUrl),
    /// No image; the service explained why.
    Explanation(String),
    /// Neither image nor text.
    Blocked,
}

impl EditResponse {
    /// Classify the response.
    ///
    /// Text that is empty or only whitespace counts as [`EditOutcome::Blocked`]
    /// rather than an explanation, so the user never sees a blank message.
    #[must_use]
    pub fn outcome(self) -> EditOutcome {
        match (self.image, self.text) {
            (Some(image), _) => EditOutcome::Image(image),
            (None, Some(text)) if !text.trim().is_empty() => EditOutcome::Explanation(text),
            (None, _) => EditOutcome::Blocked,
        }
    }

    /// Fill in [`BLOCKED_MESSAGE`] when the response carries nothing.
    #[must_use]
    pub fn normalized(self) -> Self {
        if self.image.is_none() && self.text.is_none() {
            Self {
                image: None,
                text: Some(BLOCKED_MESSAGE.to_string()),
            }
        } else {
            self
        }
    }
}

impl EditOutcome {
    /// Message to show the user when no image was produced.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Image(_) => None,
            Self::Explanation(text) => Some(text),
            Self::Blocked => Some(BLOCKED_MESSAGE),
        }
    }
}

/// Response to [`EditRequest::GetCreativeIdeas`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeasResponse {
    /// Suggested prompts.
    #[serde(default)]
    pub ideas: Option<Vec<String>>,
}

/// Response to [`EditRequest::GenerateImages`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImages {
    /// Generated PNGs.
    #[serde(default)]
    pub images: Vec<DataUrl>,
}

/// Error body returned with a non-success status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
}
