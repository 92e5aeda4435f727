//! retouch-canvas: mask authoring and mask-to-alpha compositing (sans-IO).
//!
//! Two pieces of pixel work sit between the photo editor's UI and the
//! remote edit service:
//!
//! - **Mask authoring** ([`MaskSurface`], [`StrokeLayer`]): freehand
//!   strokes captured over an image shown at display resolution, turned
//!   on demand into a black/foreground mask at the image's *natural*
//!   resolution and encoded as PNG.
//! - **Compositing** ([`apply_mask`], [`apply_mask_to_image`]): a source
//!   image plus a mask become a cutout whose alpha is 0 on mask background
//!   and 255 on mask foreground.
//!
//! This crate has **no I/O dependencies**: it operates on in-memory
//! bytes and `data:` URLs. Browser bindings live in `retouch-web` and the
//! command-line driver in `retouch`.

pub mod codec;
pub mod composite;
pub mod config;
pub mod data_url;
pub mod edit;
pub mod expand;
pub mod geometry;
pub mod mask;
pub mod stroke;
pub mod surface;
pub mod types;

pub use codec::ImageSource;
pub use composite::{CompositeResult, apply_mask, apply_mask_to_image, composite_sources};
pub use config::BrushConfig;
pub use data_url::DataUrl;
pub use edit::{EditOutcome, EditRequest, EditResponse};
pub use expand::{AspectRatio, MAX_EXPANDED_PIXELS, expand_to_aspect_ratio};
pub use geometry::{OverlayPlacement, Rect, SpaceTransform};
pub use mask::{MASK_THRESHOLD, MaskClass, MaskImage};
pub use stroke::{DrawState, PointerEvent, StrokeLayer};
pub use surface::MaskSurface;
pub use types::{CanvasError, Dimensions, DisplayPoint, NaturalPoint, RgbaImage};
