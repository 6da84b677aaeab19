//! Pointer input and its translation into surface pixel space.
//!
//! Hosts deliver mouse and touch events in CSS pixel space (client
//! coordinates). The drawing surfaces have their own backing resolution, so
//! every position is rescaled against the element's on-screen rectangle
//! before it reaches the stroke recorder or the text layer.

use serde::{Deserialize, Serialize};

/// A position in surface (backing pixel) coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X position.
    pub x: f32,
    /// Y position.
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Multiply both coordinates by the given factors.
    #[must_use]
    pub fn scaled(self, sx: f32, sy: f32) -> Self {
        Self::new(self.x * sx, self.y * sy)
    }
}

/// Phase of a pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed or finger down.
    Down,
    /// Pointer moved or finger dragged.
    Move,
    /// Button released or finger lifted.
    Up,
    /// Pointer left the element.
    Leave,
}

/// A single touch point in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    /// Touch identifier (for multi-touch).
    #[serde(default)]
    pub id: u32,
    /// Client X position.
    pub client_x: f32,
    /// Client Y position.
    pub client_y: f32,
}

impl TouchPoint {
    /// Create a touch point with id 0.
    #[must_use]
    pub fn new(client_x: f32, client_y: f32) -> Self {
        Self {
            id: 0,
            client_x,
            client_y,
        }
    }
}

/// The raw event shape delivered by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PointerSource {
    /// Mouse (or pen) event with a single client position.
    Mouse {
        /// Client X position.
        client_x: f32,
        /// Client Y position.
        client_y: f32,
    },
    /// Touch event; only the first touch point is used.
    Touch {
        /// Current touch points (empty on touch end).
        touches: Vec<TouchPoint>,
    },
}

impl PointerSource {
    /// Whether this is a touch-shaped event.
    #[must_use]
    pub fn is_touch(&self) -> bool {
        matches!(self, Self::Touch { .. })
    }

    /// The primary client position, if the event carries one.
    #[must_use]
    pub fn client_position(&self) -> Option<(f32, f32)> {
        match self {
            Self::Mouse { client_x, client_y } => Some((*client_x, *client_y)),
            Self::Touch { touches } => touches.first().map(|t| (t.client_x, t.client_y)),
        }
    }
}

/// A pointer event as delivered to the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    /// Interaction phase.
    pub phase: PointerPhase,
    /// Raw event shape.
    pub source: PointerSource,
}

impl PointerInput {
    /// Build a mouse event.
    #[must_use]
    pub fn mouse(phase: PointerPhase, client_x: f32, client_y: f32) -> Self {
        Self {
            phase,
            source: PointerSource::Mouse { client_x, client_y },
        }
    }

    /// Build a single-finger touch event.
    #[must_use]
    pub fn touch(phase: PointerPhase, client_x: f32, client_y: f32) -> Self {
        Self {
            phase,
            source: PointerSource::Touch {
                touches: vec![TouchPoint::new(client_x, client_y)],
            },
        }
    }

    /// Build a touch event that carries no touch points (finger lifted).
    #[must_use]
    pub fn touch_end() -> Self {
        Self {
            phase: PointerPhase::Up,
            source: PointerSource::Touch {
                touches: Vec::new(),
            },
        }
    }
}

/// On-screen rectangle of the drawing element in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementBounds {
    /// Left edge in client coordinates.
    pub left: f32,
    /// Top edge in client coordinates.
    pub top: f32,
    /// Displayed width.
    pub width: f32,
    /// Displayed height.
    pub height: f32,
}

impl ElementBounds {
    /// Create bounds from a client rectangle.
    #[must_use]
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Bounds at the client origin displaying a square surface 1:1.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn unscaled(side: u32) -> Self {
        Self::new(0.0, 0.0, side as f32, side as f32)
    }
}

/// Backing pixel dimensions of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl SurfaceSize {
    /// A square surface.
    #[must_use]
    pub const fn square(side: u32) -> Self {
        Self {
            width: side,
            height: side,
        }
    }
}

/// Result of translating a pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranslatedPointer {
    /// Position in surface pixels.
    pub position: Point,
    /// Whether the host must suppress default scrolling/zooming.
    pub prevent_default: bool,
}

/// Map a pointer event into surface pixel coordinates.
///
/// The client-relative offset is scaled by `backing / displayed` on each
/// axis. Returns `None` when the event carries no position (touch end) or
/// the element has no displayed area.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn translate(
    source: &PointerSource,
    bounds: &ElementBounds,
    backing: SurfaceSize,
) -> Option<TranslatedPointer> {
    if !(bounds.width > 0.0 && bounds.height > 0.0) {
        return None;
    }

    let (client_x, client_y) = source.client_position()?;
    let scale_x = backing.width as f32 / bounds.width;
    let scale_y = backing.height as f32 / bounds.height;

    Some(TranslatedPointer {
        position: Point::new(
            (client_x - bounds.left) * scale_x,
            (client_y - bounds.top) * scale_y,
        ),
        prevent_default: source.is_touch(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_translation_scales_by_backing_ratio() {
        let bounds = ElementBounds::new(10.0, 20.0, 150.0, 150.0);
        let source = PointerSource::Mouse {
            client_x: 85.0,
            client_y: 95.0,
        };

        let t = translate(&source, &bounds, SurfaceSize::square(300)).expect("position");
        assert!((t.position.x - 150.0).abs() < 1e-4);
        assert!((t.position.y - 150.0).abs() < 1e-4);
        assert!(!t.prevent_default);
    }

    #[test]
    fn test_touch_uses_first_point_and_prevents_default() {
        let bounds = ElementBounds::new(0.0, 0.0, 100.0, 100.0);
        let source = PointerSource::Touch {
            touches: vec![TouchPoint::new(10.0, 20.0), TouchPoint::new(90.0, 90.0)],
        };

        let t = translate(&source, &bounds, SurfaceSize::square(200)).expect("position");
        assert_eq!(t.position, Point::new(20.0, 40.0));
        assert!(t.prevent_default);
    }

    #[test]
    fn test_touch_without_points_has_no_position() {
        let bounds = ElementBounds::unscaled(300);
        let source = PointerSource::Touch {
            touches: Vec::new(),
        };
        assert!(translate(&source, &bounds, SurfaceSize::square(300)).is_none());
    }

    #[test]
    fn test_degenerate_bounds_are_ignored() {
        let bounds = ElementBounds::new(0.0, 0.0, 0.0, 100.0);
        let source = PointerSource::Mouse {
            client_x: 1.0,
            client_y: 1.0,
        };
        assert!(translate(&source, &bounds, SurfaceSize::square(300)).is_none());
    }

    #[test]
    fn test_pointer_input_json_shape() {
        let json = r#"{"phase":"move","source":{"kind":"touch","touches":[{"client_x":1.0,"client_y":2.0}]}}"#;
        let input: PointerInput = serde_json::from_str(json).expect("parse");
        assert_eq!(input, PointerInput::touch(PointerPhase::Move, 1.0, 2.0));
    }
}
