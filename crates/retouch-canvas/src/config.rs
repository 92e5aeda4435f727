//! Brush configuration.

use serde::{Deserialize, Serialize};

use crate::mask::MaskClass;
use crate::types::CanvasError;

/// How strokes are drawn on the surface.
///
/// Strokes render with round caps and joins. The stroke color is only
/// visual feedback, but the mask is rasterized with the same paint over
/// a black background, so the color must land on the foreground side of
/// [`crate::MASK_THRESHOLD`]; [`BrushConfig::validate`] checks this.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    /// Stroke width in display pixels.
    pub brush_size: f64,

    /// Stroke color as straight (non-premultiplied) RGBA.
    pub stroke_color: [u8; 4],
}

impl BrushConfig {
    /// Default brush width in display pixels.
    pub const DEFAULT_BRUSH_SIZE: f64 = 20.0;

    /// Smallest brush width the editor offers.
    pub const MIN_BRUSH_SIZE: f64 = 5.0;

    /// Largest brush width the editor offers.
    pub const MAX_BRUSH_SIZE: f64 = 50.0;

    /// Semi-transparent red: `rgba(239, 68, 68, 0.7)`.
    pub const DEFAULT_STROKE_COLOR: [u8; 4] = [239, 68, 68, 179];

    /// Copy of this config with a different brush size.
    #[must_use]
    pub const fn with_brush_size(self, brush_size: f64) -> Self {
        Self { brush_size, ..self }
    }

    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidConfig`] if `brush_size` is outside
    /// [`Self::MIN_BRUSH_SIZE`]..=[`Self::MAX_BRUSH_SIZE`], or if
    /// `stroke_color` painted over black would classify as mask background.
    pub fn validate(&self) -> Result<(), CanvasError> {
        if !(Self::MIN_BRUSH_SIZE..=Self::MAX_BRUSH_SIZE).contains(&self.brush_size) {
            return Err(CanvasError::InvalidConfig(format!(
                "brush_size {} is outside {}..={}",
                self.brush_size,
                Self::MIN_BRUSH_SIZE,
                Self::MAX_BRUSH_SIZE,
            )));
        }
        let [r, _, _, a] = self.stroke_color;
        #[allow(clippy::cast_possible_truncation)]
        let red_over_black = (u16::from(r) * u16::from(a) / 255) as u8;
        if MaskClass::classify(red_over_black) == MaskClass::Background {
            return Err(CanvasError::InvalidConfig(format!(
                "stroke_color {:?} is indistinguishable from the mask background",
                self.stroke_color,
            )));
        }
        Ok(())
    }
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            brush_size: Self::DEFAULT_BRUSH_SIZE,
            stroke_color: Self::DEFAULT_STROKE_COLOR,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = BrushConfig::default();
        assert!((config.brush_size - 20.0).abs() < f64::EPSILON);
        assert_eq!(config.stroke_color, [239, 68, 68, 179]);
        config.validate().unwrap();
    }

    #[test]
    fn brush_size_bounds_are_inclusive() {
        let config = BrushConfig::default();
        config.with_brush_size(5.0).validate().unwrap();
        config.with_brush_size(50.0).validate().unwrap();
        assert!(config.with_brush_size(4.9).validate().is_err());
        assert!(config.with_brush_size(50.1).validate().is_err());
        assert!(config.with_brush_size(f64::NAN).validate().is_err());
    }

    #[test]
    fn dark_stroke_color_is_rejected() {
        let config = BrushConfig {
            stroke_color: [0, 0, 255, 255],
            ..BrushConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CanvasError::InvalidConfig(_))
        ));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: BrushConfig = serde_json::from_str(r#"{"brush_size": 35.0}"#).unwrap();
        assert!((config.brush_size - 35.0).abs() < f64::EPSILON);
        assert_eq!(config.stroke_color, BrushConfig::DEFAULT_STROKE_COLOR);
    }
}
