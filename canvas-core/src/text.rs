//! Placed text objects and their hit-testing.
//!
//! Text objects are vector state: they are never rasterized into the stroke
//! surface, but re-rendered onto the composite on every redraw. Their
//! bounding boxes depend on measured glyph widths, which come from whatever
//! font engine the host provides through [`TextMeasure`].

use serde::{Deserialize, Serialize};

use crate::{CanvasError, CanvasResult, Point, TextStyle};

/// Session-unique, monotonically assigned text object id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextObjectId(u64);

impl TextObjectId {
    /// Raw numeric value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TextObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A piece of text placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextObject {
    /// Unique identifier.
    pub id: TextObjectId,
    /// Text content.
    pub text: String,
    /// Top-left corner in surface pixels.
    pub position: Point,
    /// Font and decoration.
    pub style: TextStyle,
}

/// Axis-aligned rectangle in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextBounds {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl TextBounds {
    /// Inclusive containment check.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Measures the rendered advance width of a text object.
pub trait TextMeasure {
    /// Width in surface pixels of `text` rendered with `style`.
    fn measure_width(&self, text: &str, style: &TextStyle) -> f32;
}

/// Font-independent width estimate.
///
/// Used when no font engine is available and in tests, where exact glyph
/// metrics would make assertions platform-dependent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproximateMetrics {
    /// Average advance as a fraction of the font size.
    pub advance_ratio: f32,
    /// Extra width factor for bold text.
    pub bold_factor: f32,
}

impl Default for ApproximateMetrics {
    fn default() -> Self {
        Self {
            advance_ratio: 0.55,
            bold_factor: 1.1,
        }
    }
}

impl TextMeasure for ApproximateMetrics {
    #[allow(clippy::cast_precision_loss)]
    fn measure_width(&self, text: &str, style: &TextStyle) -> f32 {
        let chars = text.chars().count() as f32;
        let weight = if style.bold { self.bold_factor } else { 1.0 };
        chars * style.font_size_px * self.advance_ratio * weight
    }
}

impl TextObject {
    /// Bounding box `[x, x + width] × [y, y + font_size]`.
    #[must_use]
    pub fn bounds(&self, measure: &dyn TextMeasure) -> TextBounds {
        TextBounds {
            x: self.position.x,
            y: self.position.y,
            width: measure.measure_width(&self.text, &self.style),
            height: self.style.font_size_px,
        }
    }
}

/// Ordered list of text objects plus placement and selection state.
#[derive(Debug, Clone, Default)]
pub struct TextLayer {
    objects: Vec<TextObject>,
    next_id: u64,
    selected: Option<TextObjectId>,
    placement_armed: bool,
    pending_text: String,
}

impl TextLayer {
    /// Create an empty layer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All objects in paint order.
    #[must_use]
    pub fn objects(&self) -> &[TextObject] {
        &self.objects
    }

    /// Number of placed objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether no text has been placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Look up an object by id.
    #[must_use]
    pub fn get(&self, id: TextObjectId) -> Option<&TextObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Text that the next placement will use.
    #[must_use]
    pub fn pending_text(&self) -> &str {
        &self.pending_text
    }

    /// Set the text for the next placement.
    pub fn set_pending_text(&mut self, text: impl Into<String>) {
        self.pending_text = text.into();
    }

    /// Whether the next click places text.
    #[must_use]
    pub fn is_placement_armed(&self) -> bool {
        self.placement_armed
    }

    /// Toggle "place on next click". Returns the new state.
    pub fn toggle_placement(&mut self) -> bool {
        self.placement_armed = !self.placement_armed;
        self.placement_armed
    }

    /// Place the pending text at `at`.
    ///
    /// Only succeeds while armed with non-empty pending text; placement
    /// disarms the layer. Returns the new object's id.
    pub fn place(&mut self, at: Point, style: &TextStyle) -> Option<TextObjectId> {
        if !self.placement_armed || self.pending_text.trim().is_empty() {
            return None;
        }

        let id = TextObjectId(self.next_id);
        self.next_id += 1;
        self.objects.push(TextObject {
            id,
            text: self.pending_text.clone(),
            position: at,
            style: style.clone(),
        });
        self.placement_armed = false;
        tracing::debug!("Placed text object {id} at ({}, {})", at.x, at.y);
        Some(id)
    }

    /// First object (in list order) whose bounding box contains `point`.
    #[must_use]
    pub fn hit_test(&self, point: Point, measure: &dyn TextMeasure) -> Option<TextObjectId> {
        self.objects
            .iter()
            .find(|o| o.bounds(measure).contains(point))
            .map(|o| o.id)
    }

    /// Currently selected object id.
    #[must_use]
    pub fn selected(&self) -> Option<TextObjectId> {
        self.selected
    }

    /// Currently selected object.
    #[must_use]
    pub fn selected_object(&self) -> Option<&TextObject> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Select an object and return a copy of its style.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is unknown.
    pub fn select(&mut self, id: TextObjectId) -> CanvasResult<TextStyle> {
        let style = self
            .get(id)
            .map(|o| o.style.clone())
            .ok_or(CanvasError::TextObjectNotFound(id.get()))?;
        self.selected = Some(id);
        Ok(style)
    }

    /// Clear the selection. Returns `true` if something was selected.
    pub fn deselect(&mut self) -> bool {
        self.selected.take().is_some()
    }

    /// Replace the style of the selected object.
    ///
    /// Returns `true` if an object was mutated.
    pub fn restyle_selected(&mut self, style: &TextStyle) -> bool {
        let Some(id) = self.selected else {
            return false;
        };
        match self.objects.iter_mut().find(|o| o.id == id) {
            Some(object) => {
                object.style = style.clone();
                true
            }
            None => false,
        }
    }

    /// Scale positions and font sizes, e.g. after the surfaces are resized.
    pub fn rescale(&mut self, factor: f32) {
        for object in &mut self.objects {
            object.position = object.position.scaled(factor, factor);
            object.style.font_size_px *= factor;
        }
    }

    /// Remove every object and reset placement and selection.
    ///
    /// Ids keep increasing so they stay unique for the session.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.selected = None;
        self.placement_armed = false;
    }
}
