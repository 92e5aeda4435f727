//! Freehand stroke capture.
//!
//! [`StrokeLayer`] owns everything the user has painted during one
//! editing session: the display-resolution preview raster the host shows
//! over the image, and the strokes themselves as display-space polylines.
//! Each stroke remembers the surface size it was drawn on, so layout
//! changes never move earlier strokes relative to the image.
//!
//! Capture is a two-state machine driven by pointer events:
//!
//! ```text
//!            down                    up / leave
//!   Idle ──────────▶ Drawing ──────────────────▶ Idle
//!                    │    ▲
//!                    └────┘ move (append segment)
//! ```
//!
//! Moves while idle are ignored. A tap without a drag still records a
//! stroke and renders as a round dot.

use serde::{Deserialize, Serialize};
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::config::BrushConfig;
use crate::geometry::SpaceTransform;
use crate::types::{CanvasError, Dimensions, DisplayPoint, RgbaImage};

/// Capture state of a [`StrokeLayer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawState {
    /// No pointer is pressed over the surface.
    #[default]
    Idle,
    /// A stroke is in progress.
    Drawing,
}

/// A pointer or touch event in surface-local coordinates.
///
/// This is the replayable input format for a [`StrokeLayer`]; hosts that
/// receive viewport coordinates translate them with
/// [`crate::geometry::Rect::to_local`] first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    /// Pointer or first touch pressed.
    Down {
        /// Surface-local x.
        x: f64,
        /// Surface-local y.
        y: f64,
    },
    /// Pointer or touch moved.
    Move {
        /// Surface-local x.
        x: f64,
        /// Surface-local y.
        y: f64,
    },
    /// Pointer released or touch ended.
    Up,
    /// Pointer left the surface.
    Leave,
    /// The surface was resized to match the image's new rendered size.
    Resize {
        /// New surface width in pixels.
        width: u32,
        /// New surface height in pixels.
        height: u32,
    },
    /// Erase everything.
    Clear,
}

/// One connected stroke.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StrokePath {
    pub(crate) points: Vec<DisplayPoint>,
    pub(crate) width: f64,
    pub(crate) color: [u8; 4],
    /// Surface size the points were captured against.
    pub(crate) extent: Dimensions,
}

impl StrokePath {
    /// Render onto `pixmap`, mapping display space through `transform`.
    pub(crate) fn paint(&self, pixmap: &mut Pixmap, transform: Transform) {
        paint_polyline(pixmap, &self.points, self.width, self.color, transform);
    }
}

/// Freehand strokes over one displayed image.
#[derive(Debug, Clone)]
pub struct StrokeLayer {
    config: BrushConfig,
    extent: Dimensions,
    preview: Option<Pixmap>,
    strokes: Vec<StrokePath>,
    state: DrawState,
}

impl StrokeLayer {
    /// Create an empty layer. It has no surface until the first
    /// [`Self::resize`]; pointer events before that are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: BrushConfig) -> Result<Self, CanvasError> {
        config.validate()?;
        Ok(Self {
            config,
            extent: Dimensions::new(0, 0),
            preview: None,
            strokes: Vec::new(),
            state: DrawState::Idle,
        })
    }

    /// The active brush configuration.
    #[must_use]
    pub const fn config(&self) -> &BrushConfig {
        &self.config
    }

    /// Change the brush for subsequent strokes.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidConfig`] if `config` fails validation;
    /// the previous brush stays active.
    pub fn set_config(&mut self, config: BrushConfig) -> Result<(), CanvasError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Current surface size in pixels.
    #[must_use]
    pub const fn extent(&self) -> Dimensions {
        self.extent
    }

    /// Current capture state.
    #[must_use]
    pub const fn state(&self) -> DrawState {
        self.state
    }

    /// Returns `true` while a stroke is in progress.
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.state == DrawState::Drawing
    }

    /// Returns `true` once anything has been drawn since the last clear.
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.strokes.is_empty()
    }

    /// Number of strokes recorded since the last clear.
    #[must_use]
    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    /// Resize the surface to a new pixel size.
    ///
    /// Existing strokes are kept and the preview is re-rendered at the
    /// new size. A zero-area size drops the preview raster until the next
    /// non-empty resize.
    pub fn resize(&mut self, extent: Dimensions) {
        if extent == self.extent {
            return;
        }
        tracing::debug!(from = %self.extent, to = %extent, "resizing stroke surface");
        self.extent = extent;
        self.preview = Pixmap::new(extent.width, extent.height);
        if let Some(preview) = self.preview.as_mut() {
            for stroke in &self.strokes {
                if let Ok(t) = SpaceTransform::between(stroke.extent, extent) {
                    stroke.paint(preview, t.to_skia());
                }
            }
        }
    }

    /// Start a stroke at `point` (`Idle → Drawing`).
    ///
    /// Ignored while the surface has no area. Starting a new stroke while
    /// one is in progress ends the previous one first.
    pub fn begin_stroke(&mut self, point: DisplayPoint) {
        let Some(preview) = self.preview.as_mut() else {
            tracing::debug!("ignoring stroke start on an empty surface");
            return;
        };
        let stroke = StrokePath {
            points: vec![point],
            width: self.config.brush_size,
            color: self.config.stroke_color,
            extent: self.extent,
        };
        stroke.paint(preview, Transform::identity());
        self.strokes.push(stroke);
        self.state = DrawState::Drawing;
    }

    /// Extend the current stroke to `point` (`Drawing → Drawing`).
    ///
    /// Ignored while idle. Repeated positions add nothing.
    pub fn extend_stroke(&mut self, point: DisplayPoint) {
        if self.state != DrawState::Drawing {
            return;
        }
        let (Some(preview), Some(stroke)) = (self.preview.as_mut(), self.strokes.last_mut())
        else {
            return;
        };
        let Some(&last) = stroke.points.last() else {
            return;
        };
        if last == point {
            return;
        }
        stroke.points.push(point);
        paint_polyline(
            preview,
            &[last, point],
            stroke.width,
            stroke.color,
            Transform::identity(),
        );
    }

    /// Finish the current stroke (`Drawing → Idle`). Safe to call while idle.
    pub fn end_stroke(&mut self) {
        self.state = DrawState::Idle;
    }

    /// Erase all strokes and the preview raster.
    ///
    /// Call whenever the active image or tool changes.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.state = DrawState::Idle;
        if let Some(preview) = self.preview.as_mut() {
            preview.fill(tiny_skia::Color::TRANSPARENT);
        }
    }

    /// Feed one pointer event through the state machine.
    pub fn apply(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { x, y } => self.begin_stroke(DisplayPoint::new(x, y)),
            PointerEvent::Move { x, y } => self.extend_stroke(DisplayPoint::new(x, y)),
            PointerEvent::Up | PointerEvent::Leave => self.end_stroke(),
            PointerEvent::Resize { width, height } => {
                self.resize(Dimensions::new(width, height));
            }
            PointerEvent::Clear => self.clear(),
        }
    }

    /// The display-resolution preview raster, if the surface has area.
    #[must_use]
    pub const fn preview(&self) -> Option<&Pixmap> {
        self.preview.as_ref()
    }

    /// The preview raster as straight RGBA, ready for `putImageData`.
    #[must_use]
    pub fn preview_image(&self) -> Option<RgbaImage> {
        self.preview.as_ref().map(crate::codec::pixmap_to_rgba)
    }

    pub(crate) fn strokes(&self) -> &[StrokePath] {
        &self.strokes
    }
}

/// Stroke `points` with round caps and joins. A single point renders as
/// a filled dot of the brush diameter.
#[allow(clippy::cast_possible_truncation)]
fn paint_polyline(
    pixmap: &mut Pixmap,
    points: &[DisplayPoint],
    width: f64,
    color: [u8; 4],
    transform: Transform,
) {
    let mut paint = Paint::default();
    let [r, g, b, a] = color;
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;

    match points {
        [] => {}
        [dot] => {
            let radius = (width / 2.0).max(0.5) as f32;
            if let Some(path) = PathBuilder::from_circle(dot.x as f32, dot.y as f32, radius) {
                pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
            }
        }
        [first, rest @ ..] => {
            let mut pb = PathBuilder::new();
            pb.move_to(first.x as f32, first.y as f32);
            for p in rest {
                pb.line_to(p.x as f32, p.y as f32);
            }
            let Some(path) = pb.finish() else {
                return;
            };
            let stroke = Stroke {
                width: width as f32,
                line_cap: LineCap::Round,
                line_join: LineJoin::Round,
                ..Stroke::default()
            };
            pixmap.stroke_path(&path, &paint, &stroke, transform, None);
        }
    }
}
