//! Canvas interaction state.
//!
//! [`CanvasState`] owns everything about the canvas that is not pixels: the
//! surface size, pen and background settings, the stroke recorder and the
//! text layer. Input is routed through [`CanvasState::handle_pointer`], which
//! returns an [`InputOutcome`] telling the raster side what to draw.

use crate::event::{translate, ElementBounds, PointerInput, PointerPhase, SurfaceSize};
use crate::stroke::{Segment, StrokeRecorder};
use crate::text::{TextLayer, TextMeasure, TextObjectId};
use crate::{PenStyle, Point, Rgb, TextStyle};

/// What a pointer event did to the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputOutcome {
    /// Nothing changed.
    Ignored,
    /// A new stroke started.
    StrokeBegan {
        /// Start point.
        at: Point,
        /// A text selection was dropped to start the stroke.
        cleared_selection: bool,
    },
    /// The active stroke grew by one segment.
    StrokeExtended(Segment),
    /// The active stroke ended.
    StrokeFinished,
    /// Pending text was placed.
    TextPlaced(TextObjectId),
    /// An existing text object was selected.
    TextSelected(TextObjectId),
}

impl InputOutcome {
    /// Whether the composite must be redrawn.
    #[must_use]
    pub fn needs_redraw(&self) -> bool {
        match self {
            Self::Ignored => false,
            Self::StrokeBegan {
                cleared_selection, ..
            } => *cleared_selection,
            Self::StrokeExtended(_)
            | Self::StrokeFinished
            | Self::TextPlaced(_)
            | Self::TextSelected(_) => true,
        }
    }
}

/// Response to a pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerResponse {
    /// What changed.
    pub outcome: InputOutcome,
    /// Whether the host must suppress default touch scrolling/zooming.
    pub prevent_default: bool,
}

/// The complete non-raster canvas state.
#[derive(Debug, Clone)]
pub struct CanvasState {
    side: u32,
    pen: PenStyle,
    background: Rgb,
    strokes: StrokeRecorder,
    text: TextLayer,
    text_style: TextStyle,
    text_enabled: bool,
}

impl CanvasState {
    /// Create state for a square surface of `side` pixels.
    #[must_use]
    pub fn new(side: u32) -> Self {
        Self {
            side: side.max(1),
            pen: PenStyle::default(),
            background: Rgb::WHITE,
            strokes: StrokeRecorder::new(),
            text: TextLayer::new(),
            text_style: TextStyle::default(),
            text_enabled: true,
        }
    }

    /// Enable or disable the text feature. Disabling drops placed text.
    #[must_use]
    pub fn with_text_enabled(mut self, enabled: bool) -> Self {
        self.text_enabled = enabled;
        if !enabled {
            self.text.clear();
        }
        self
    }

    /// Whether text placement and hit-testing are active.
    #[must_use]
    pub fn text_enabled(&self) -> bool {
        self.text_enabled
    }

    /// Current square side.
    #[must_use]
    pub fn side(&self) -> u32 {
        self.side
    }

    /// Backing size of both surfaces.
    #[must_use]
    pub fn surface_size(&self) -> SurfaceSize {
        SurfaceSize::square(self.side)
    }

    /// Record a new side and rescale text objects to match.
    ///
    /// An active stroke ends here; its last point belongs to the old size.
    /// Returns `false` if the side did not change.
    #[allow(clippy::cast_precision_loss)]
    pub fn set_side(&mut self, side: u32) -> bool {
        let side = side.max(1);
        if side == self.side {
            return false;
        }
        if self.strokes.end() {
            tracing::debug!("Resize to {side}px ended the active stroke");
        }
        let factor = side as f32 / self.side as f32;
        self.text.rescale(factor);
        self.side = side;
        true
    }

    /// Current pen.
    #[must_use]
    pub fn pen(&self) -> PenStyle {
        self.pen
    }

    /// Replace the pen (width is clamped).
    pub fn set_pen(&mut self, pen: PenStyle) {
        self.pen = PenStyle::new(pen.color, pen.width);
    }

    /// Background fill color.
    #[must_use]
    pub fn background(&self) -> Rgb {
        self.background
    }

    /// Set the background fill color.
    pub fn set_background(&mut self, color: Rgb) {
        self.background = color;
    }

    /// Stroke recorder.
    #[must_use]
    pub fn strokes(&self) -> &StrokeRecorder {
        &self.strokes
    }

    /// Text layer.
    #[must_use]
    pub fn text(&self) -> &TextLayer {
        &self.text
    }

    /// Active text style controls.
    #[must_use]
    pub fn text_style(&self) -> &TextStyle {
        &self.text_style
    }

    /// Toggle text placement mode. Returns the new armed state.
    pub fn toggle_text_placement(&mut self) -> bool {
        if !self.text_enabled {
            return false;
        }
        self.text.toggle_placement()
    }

    /// Set the text for the next placement.
    pub fn set_pending_text(&mut self, text: impl Into<String>) {
        self.text.set_pending_text(text);
    }

    /// Update the style controls; a selected object takes the new style.
    ///
    /// Returns `true` if a placed object changed (redraw needed).
    pub fn set_text_style(&mut self, style: TextStyle) -> bool {
        self.text_style = style;
        self.text_enabled && self.text.restyle_selected(&self.text_style)
    }

    /// Drop the current text selection. Returns `true` if one existed.
    pub fn deselect_text(&mut self) -> bool {
        self.text.deselect()
    }

    /// Forget all text objects and end any stroke.
    pub fn clear(&mut self) {
        self.strokes.end();
        self.text.clear();
    }

    /// Route a pointer event through placement, selection and stroking.
    pub fn handle_pointer(
        &mut self,
        input: &PointerInput,
        bounds: &ElementBounds,
        measure: &dyn TextMeasure,
    ) -> PointerResponse {
        let translated = translate(&input.source, bounds, self.surface_size());
        let prevent_default = input.source.is_touch();
        let position = translated.map(|t| t.position);

        let outcome = match (input.phase, position) {
            (PointerPhase::Down, Some(at)) => self.pointer_down(at, measure),
            (PointerPhase::Move, Some(to)) => self
                .strokes
                .extend(to)
                .map_or(InputOutcome::Ignored, InputOutcome::StrokeExtended),
            (PointerPhase::Up | PointerPhase::Leave, _) => {
                if self.strokes.end() {
                    InputOutcome::StrokeFinished
                } else {
                    InputOutcome::Ignored
                }
            }
            (PointerPhase::Down | PointerPhase::Move, None) => InputOutcome::Ignored,
        };

        PointerResponse {
            outcome,
            prevent_default,
        }
    }

    fn pointer_down(&mut self, at: Point, measure: &dyn TextMeasure) -> InputOutcome {
        if self.text_enabled {
            if self.text.is_placement_armed() {
                return match self.text.place(at, &self.text_style) {
                    Some(id) => InputOutcome::TextPlaced(id),
                    None => {
                        tracing::debug!("Placement armed without pending text, ignoring click");
                        InputOutcome::Ignored
                    }
                };
            }

            if let Some(id) = self.text.hit_test(at, measure) {
                if let Ok(style) = self.text.select(id) {
                    self.text_style = style;
                    tracing::debug!("Selected text object {id}");
                    return InputOutcome::TextSelected(id);
                }
            }
        }

        let cleared_selection = self.text.deselect();
        self.strokes.begin(at);
        tracing::trace!("Stroke began at ({}, {})", at.x, at.y);
        InputOutcome::StrokeBegan {
            at,
            cleared_selection,
        }
    }
}

impl Default for CanvasState {
    fn default() -> Self {
        Self::new(300)
    }
}
