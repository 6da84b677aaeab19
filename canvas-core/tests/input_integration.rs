//! Pointer Input Integration Tests
//!
//! Drives `CanvasState` with full pointer sequences and checks:
//! - Translated paths match client coordinates when CSS size equals backing size
//! - Mouse and touch sequences produce identical paths
//! - Text placement, selection and stroking interact correctly

use canvas_core::{
    ApproximateMetrics, CanvasState, ElementBounds, InputOutcome, Point, PointerInput,
    PointerPhase, TextStyle,
};
use proptest::prelude::*;

/// Replay a down, move..., up sequence against the state.
fn replay(state: &mut CanvasState, bounds: &ElementBounds, points: &[(f32, f32)], touch: bool) {
    let metrics = ApproximateMetrics::default();
    let make = |phase, (x, y): (f32, f32)| {
        if touch {
            PointerInput::touch(phase, x, y)
        } else {
            PointerInput::mouse(phase, x, y)
        }
    };

    let mut iter = points.iter().copied();
    if let Some(first) = iter.next() {
        state.handle_pointer(&make(PointerPhase::Down, first), bounds, &metrics);
    }
    for p in iter {
        state.handle_pointer(&make(PointerPhase::Move, p), bounds, &metrics);
    }
    let up = if touch {
        PointerInput::touch_end()
    } else {
        PointerInput::mouse(PointerPhase::Up, 0.0, 0.0)
    };
    state.handle_pointer(&up, bounds, &metrics);
}

// ============================================================================
// Coordinate fidelity
// ============================================================================

proptest! {
    #[test]
    fn prop_unscaled_paths_have_no_drift(
        side in 200u32..=500u32,
        points in prop::collection::vec((0u16..500u16, 0u16..500u16), 1..40)
    ) {
        let mut state = CanvasState::new(side);
        let bounds = ElementBounds::unscaled(side);
        let points: Vec<(f32, f32)> = points
            .into_iter()
            .map(|(x, y)| (f32::from(x), f32::from(y)))
            .collect();

        replay(&mut state, &bounds, &points, false);

        let path = state.strokes().path();
        prop_assert_eq!(path.len(), points.len());
        for (recorded, (x, y)) in path.iter().zip(points.iter()) {
            prop_assert_eq!(*recorded, Point::new(*x, *y));
        }
    }

    #[test]
    fn prop_offset_bounds_subtract_exactly(
        left in 0u16..1000u16,
        top in 0u16..1000u16,
        x in 0u16..300u16,
        y in 0u16..300u16,
    ) {
        let mut state = CanvasState::new(300);
        let bounds = ElementBounds::new(f32::from(left), f32::from(top), 300.0, 300.0);
        let client = (f32::from(left) + f32::from(x), f32::from(top) + f32::from(y));

        replay(&mut state, &bounds, &[client], false);
        prop_assert_eq!(state.strokes().path()[0], Point::new(f32::from(x), f32::from(y)));
    }
}

#[test]
fn test_mouse_and_touch_record_identical_paths() {
    let points = [(10.0, 10.0), (40.0, 12.0), (80.0, 60.0), (81.0, 61.0)];
    let bounds = ElementBounds::new(5.0, 5.0, 150.0, 150.0);

    let mut mouse = CanvasState::new(300);
    replay(&mut mouse, &bounds, &points, false);

    let mut touch = CanvasState::new(300);
    replay(&mut touch, &bounds, &points, true);

    assert_eq!(mouse.strokes().path(), touch.strokes().path());
    assert_eq!(mouse.strokes().path()[0], Point::new(10.0, 10.0));
}

// ============================================================================
// Text and strokes together
// ============================================================================

#[test]
fn test_placement_consumes_exactly_one_click() {
    let mut state = CanvasState::new(300);
    let bounds = ElementBounds::unscaled(300);
    let metrics = ApproximateMetrics::default();

    state.set_pending_text("gm");
    state.toggle_text_placement();

    let placed = state.handle_pointer(
        &PointerInput::mouse(PointerPhase::Down, 100.0, 100.0),
        &bounds,
        &metrics,
    );
    assert!(matches!(placed.outcome, InputOutcome::TextPlaced(_)));
    assert!(!state.strokes().is_drawing());

    // Moving after placement does not draw.
    let moved = state.handle_pointer(
        &PointerInput::mouse(PointerPhase::Move, 120.0, 120.0),
        &bounds,
        &metrics,
    );
    assert_eq!(moved.outcome, InputOutcome::Ignored);

    // The next click away from the text draws.
    let next = state.handle_pointer(
        &PointerInput::mouse(PointerPhase::Down, 10.0, 250.0),
        &bounds,
        &metrics,
    );
    assert!(matches!(next.outcome, InputOutcome::StrokeBegan { .. }));
}

#[test]
fn test_style_edits_follow_selection() {
    let mut state = CanvasState::new(300);
    let bounds = ElementBounds::unscaled(300);
    let metrics = ApproximateMetrics::default();

    state.set_pending_text("meme");
    state.toggle_text_placement();
    let InputOutcome::TextPlaced(id) = state
        .handle_pointer(
            &PointerInput::mouse(PointerPhase::Down, 20.0, 20.0),
            &bounds,
            &metrics,
        )
        .outcome
    else {
        panic!("text should be placed");
    };

    // No selection yet: style edits only touch the controls.
    let underline = TextStyle {
        underline: true,
        ..TextStyle::default()
    };
    assert!(!state.set_text_style(underline.clone()));
    assert!(!state.text().get(id).expect("exists").style.underline);

    state.handle_pointer(
        &PointerInput::mouse(PointerPhase::Down, 25.0, 25.0),
        &bounds,
        &metrics,
    );
    assert_eq!(state.text().selected(), Some(id));
    assert!(state.set_text_style(underline));
    assert!(state.text().get(id).expect("exists").style.underline);

    state.clear();
    assert!(state.text().is_empty());
    assert!(state.text().selected().is_none());
}
