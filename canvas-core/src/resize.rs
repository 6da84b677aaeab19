//! Square canvas sizing.

use serde::{Deserialize, Serialize};

/// Host layout measurements that drive the canvas side length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width of the element containing the canvas, in CSS pixels.
    pub container_width: f32,
    /// Width of the window, in CSS pixels.
    pub viewport_width: f32,
}

impl Viewport {
    /// Create a measurement.
    #[must_use]
    pub const fn new(container_width: f32, viewport_width: f32) -> Self {
        Self {
            container_width,
            viewport_width,
        }
    }
}

/// Bounds used to derive the square side from a [`Viewport`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResizePolicy {
    /// Lower bound on the side.
    pub min_side: f32,
    /// Upper bound on the side regardless of viewport.
    pub max_side: f32,
    /// Fraction of the viewport width the canvas may occupy.
    pub viewport_fraction: f32,
}

impl Default for ResizePolicy {
    fn default() -> Self {
        Self {
            min_side: 200.0,
            max_side: 500.0,
            viewport_fraction: 0.8,
        }
    }
}

impl ResizePolicy {
    /// Side length in whole pixels.
    ///
    /// `max(min_side, min(min(fraction × viewport, max_side), container))`.
    /// The minimum wins when the viewport is too narrow for it.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn side_for(&self, viewport: Viewport) -> u32 {
        let upper = (viewport.viewport_width * self.viewport_fraction).min(self.max_side);
        let container = if viewport.container_width.is_finite() {
            viewport.container_width
        } else {
            0.0
        };
        let side = container.min(upper).max(self.min_side);
        side.floor().max(1.0) as u32
    }
}
