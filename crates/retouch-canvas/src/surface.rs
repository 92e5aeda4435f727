//! The mask-authoring component: a [`StrokeLayer`] bound to one displayed
//! image.
//!
//! [`MaskSurface`] tracks where the drawing surface sits in the viewport
//! and the natural size of the image under it, translates viewport
//! pointer positions into surface-local points, and extracts masks at
//! the image's natural resolution.

use crate::config::BrushConfig;
use crate::geometry::{OverlayPlacement, Rect};
use crate::mask::MaskImage;
use crate::stroke::StrokeLayer;
use crate::types::{CanvasError, Dimensions};

/// A freehand mask over one image.
#[derive(Debug, Clone)]
pub struct MaskSurface {
    layer: StrokeLayer,
    bounds: Option<Rect>,
    natural: Option<Dimensions>,
    visible: bool,
}

impl MaskSurface {
    /// Create a surface with no image yet.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: BrushConfig) -> Result<Self, CanvasError> {
        Ok(Self {
            layer: StrokeLayer::new(config)?,
            bounds: None,
            natural: None,
            visible: true,
        })
    }

    /// The underlying stroke layer.
    #[must_use]
    pub const fn layer(&self) -> &StrokeLayer {
        &self.layer
    }

    /// Mutable access to the stroke layer, for surface-local event replay.
    pub const fn layer_mut(&mut self) -> &mut StrokeLayer {
        &mut self.layer
    }

    /// Natural size of the current image, once known.
    #[must_use]
    pub const fn natural(&self) -> Option<Dimensions> {
        self.natural
    }

    /// Switch to a new image. Clears all strokes.
    pub fn set_image(&mut self, natural: Dimensions) {
        tracing::debug!(%natural, "mask surface bound to new image");
        self.natural = Some(natural);
        self.layer.clear();
    }

    /// Forget the current image. Clears all strokes.
    pub fn unset_image(&mut self) {
        self.natural = None;
        self.bounds = None;
        self.layer.clear();
    }

    /// Re-measure after load or layout change.
    ///
    /// `image` and `container` are the viewport bounding boxes of the
    /// rendered image and of the element the surface is positioned in.
    /// Returns where the host must place the surface. Must run before any
    /// further pointer events are interpreted.
    pub fn sync_geometry(&mut self, image: Rect, container: Rect) -> OverlayPlacement {
        let placement = OverlayPlacement::fit(image, container);
        self.bounds = Some(image);
        self.layer.resize(placement.surface);
        placement
    }

    /// Pointer or touch pressed at a viewport position.
    pub fn pointer_down(&mut self, client_x: f64, client_y: f64) {
        if let Some(bounds) = self.bounds {
            self.layer.begin_stroke(bounds.to_local(client_x, client_y));
        }
    }

    /// Pointer or touch moved to a viewport position.
    pub fn pointer_move(&mut self, client_x: f64, client_y: f64) {
        if let Some(bounds) = self.bounds {
            self.layer.extend_stroke(bounds.to_local(client_x, client_y));
        }
    }

    /// Pointer released or touch ended.
    pub fn pointer_up(&mut self) {
        self.layer.end_stroke();
    }

    /// Pointer left the surface mid-stroke.
    pub fn pointer_leave(&mut self) {
        self.layer.end_stroke();
    }

    /// Erase all strokes. Call on tool change as well as from a
    /// "clear mask" action.
    pub fn clear(&mut self) {
        self.layer.clear();
    }

    /// Whether anything has been drawn since the last clear.
    #[must_use]
    pub fn has_content(&self) -> bool {
        self.layer.has_content()
    }

    /// Hide or show the overlay (before/after peek). Strokes are kept.
    pub const fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Whether the overlay is shown.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Change the brush for subsequent strokes.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidConfig`] if `config` fails validation.
    pub fn set_brush(&mut self, config: BrushConfig) -> Result<(), CanvasError> {
        self.layer.set_config(config)
    }

    /// Rasterize the mask at the image's natural size.
    ///
    /// `Ok(None)` if no image is bound or nothing has been drawn.
    ///
    /// # Errors
    ///
    /// Propagates [`StrokeLayer::rasterize_to`] failures.
    pub fn extract_mask(&self) -> Result<Option<MaskImage>, CanvasError> {
        match self.natural {
            Some(natural) => self.layer.rasterize_to(natural),
            None => Ok(None),
        }
    }

    /// Rasterize and PNG-encode the mask; `Ok(None)` as for [`Self::extract_mask`].
    ///
    /// # Errors
    ///
    /// Propagates rasterization and encoding failures.
    pub fn mask_png(&self) -> Result<Option<Vec<u8>>, CanvasError> {
        self.extract_mask()?.map(|mask| mask.to_png()).transpose()
    }
}
