//! Browser event adapters for canvas-core.
//!
//! Converts DOM mouse and touch events into [`PointerInput`] and reads the
//! drawing element's client rectangle so the host page can feed
//! [`CanvasState::handle_pointer`](crate::CanvasState::handle_pointer)
//! directly from its event listeners.

use wasm_bindgen::prelude::*;
use web_sys::{Element, MouseEvent, TouchEvent};

use crate::event::{ElementBounds, PointerInput, PointerPhase, PointerSource, TouchPoint};

/// Initialize the canvas WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Build a pointer input from a DOM mouse event.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn pointer_from_mouse(phase: PointerPhase, event: &MouseEvent) -> PointerInput {
    PointerInput::mouse(phase, event.client_x() as f32, event.client_y() as f32)
}

/// Build a pointer input from a DOM touch event.
///
/// Calls `preventDefault` so the browser does not scroll or zoom while the
/// user is drawing.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
pub fn pointer_from_touch(phase: PointerPhase, event: &TouchEvent) -> PointerInput {
    event.prevent_default();

    let list = event.touches();
    let touches = (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|t| TouchPoint {
            id: t.identifier() as u32,
            client_x: t.client_x() as f32,
            client_y: t.client_y() as f32,
        })
        .collect();

    PointerInput {
        phase,
        source: PointerSource::Touch { touches },
    }
}

/// Client rectangle of the drawing element.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn bounds_of(element: &Element) -> ElementBounds {
    let rect = element.get_bounding_client_rect();
    ElementBounds::new(
        rect.left() as f32,
        rect.top() as f32,
        rect.width() as f32,
        rect.height() as f32,
    )
}
