//! Freehand stroke state machine.

use serde::{Deserialize, Serialize};

use crate::Point;

/// A straight piece of ink between two consecutive pointer positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start of the segment.
    pub from: Point,
    /// End of the segment.
    pub to: Point,
}

/// Recorder state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeState {
    /// No stroke in progress.
    Idle,
    /// A stroke is in progress; `last` is the most recent path point.
    Drawing {
        /// Most recent point of the active path.
        last: Point,
    },
}

/// Tracks the active stroke and the points of its path.
#[derive(Debug, Clone)]
pub struct StrokeRecorder {
    state: StrokeState,
    path: Vec<Point>,
}

impl StrokeRecorder {
    /// Create an idle recorder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: StrokeState::Idle,
            path: Vec::new(),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> StrokeState {
        self.state
    }

    /// Whether a stroke is in progress.
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        matches!(self.state, StrokeState::Drawing { .. })
    }

    /// Points of the active (or most recently finished) path.
    #[must_use]
    pub fn path(&self) -> &[Point] {
        &self.path
    }

    /// Start a new path at `at`. Any unfinished path is discarded.
    pub fn begin(&mut self, at: Point) {
        self.path.clear();
        self.path.push(at);
        self.state = StrokeState::Drawing { last: at };
    }

    /// Append `to` to the active path.
    ///
    /// Returns the new segment, or `None` when idle.
    pub fn extend(&mut self, to: Point) -> Option<Segment> {
        let StrokeState::Drawing { last } = self.state else {
            return None;
        };
        self.path.push(to);
        self.state = StrokeState::Drawing { last: to };
        Some(Segment { from: last, to })
    }

    /// Finish the active stroke. Returns `true` if one was in progress.
    pub fn end(&mut self) -> bool {
        let was_drawing = self.is_drawing();
        self.state = StrokeState::Idle;
        was_drawing
    }
}

impl Default for StrokeRecorder {
    fn default() -> Self {
        Self::new()
    }
}
