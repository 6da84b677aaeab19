//! Input scripts.
//!
//! A script is a JSON document listing the host events to replay:
//!
//! ```json
//! {
//!   "steps": [
//!     { "action": "mount", "container_width": 400, "viewport_width": 1024 },
//!     { "action": "pen_color", "color": "#ff0000" },
//!     { "action": "stroke", "points": [[10, 10], [120, 80]] },
//!     { "action": "wait", "ms": 150 }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use canvas_core::{ElementBounds, PointerInput, PointerPhase, Rgb, TextStyle, TouchPoint};
use serde::{Deserialize, Serialize};

/// A parsed input script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Where the canvas sits on screen. Defaults to the origin, unscaled.
    #[serde(default)]
    pub bounds: Option<ElementBounds>,
    /// Events in order.
    pub steps: Vec<Step>,
}

impl Script {
    /// Parse a script from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a script.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid script")
    }

    /// Read and parse a script file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        Self::from_json(&json)
    }
}

/// One host event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// First layout pass; applied immediately.
    Mount {
        /// Width of the containing element.
        container_width: f32,
        /// Width of the window.
        viewport_width: f32,
    },
    /// Later layout change; debounced.
    Resize {
        /// Width of the containing element.
        container_width: f32,
        /// Width of the window.
        viewport_width: f32,
    },
    /// A single mouse event.
    Pointer {
        /// Event phase.
        phase: PointerPhase,
        /// Client X.
        x: f32,
        /// Client Y.
        y: f32,
    },
    /// A touch event; no touches means the finger lifted.
    Touch {
        /// Event phase.
        phase: PointerPhase,
        /// Active touch points.
        #[serde(default)]
        touches: Vec<TouchPoint>,
    },
    /// Mouse down at the first point, a move to each later point, then up.
    Stroke {
        /// Client positions.
        points: Vec<[f32; 2]>,
    },
    /// Change the pen color.
    PenColor {
        /// New color.
        color: Rgb,
    },
    /// Change the pen width.
    PenWidth {
        /// New width.
        width: f32,
    },
    /// Change the background fill.
    BackgroundColor {
        /// New color.
        color: Rgb,
    },
    /// Load a background image. Neither field set means no file selected.
    BackgroundImage {
        /// Image file, relative to the script.
        #[serde(default)]
        path: Option<PathBuf>,
        /// Inline `data:` URI.
        #[serde(default)]
        data_uri: Option<String>,
    },
    /// Drop the background image.
    RemoveBackgroundImage,
    /// Dismiss the ingestion error.
    DismissError,
    /// Toggle text placement.
    TextMode,
    /// Set the text used by the next placement.
    PendingText {
        /// Text content.
        text: String,
    },
    /// Update the text style controls.
    TextStyle {
        /// New style; missing fields take defaults.
        #[serde(default)]
        style: TextStyle,
    },
    /// Deselect the selected text object.
    DeselectText,
    /// Wipe strokes and text.
    Clear,
    /// Let timers run.
    Wait {
        /// Milliseconds.
        ms: u64,
    },
}

impl Step {
    /// Pointer events this step expands to, if it is a pointer step.
    #[must_use]
    pub fn pointer_inputs(&self) -> Vec<PointerInput> {
        match self {
            Self::Pointer { phase, x, y } => vec![PointerInput::mouse(*phase, *x, *y)],
            Self::Touch { phase, touches } => vec![PointerInput {
                phase: *phase,
                source: canvas_core::PointerSource::Touch {
                    touches: touches.clone(),
                },
            }],
            Self::Stroke { points } => {
                let (Some([x0, y0]), Some([x1, y1])) = (points.first(), points.last()) else {
                    return Vec::new();
                };
                let mut inputs = vec![PointerInput::mouse(PointerPhase::Down, *x0, *y0)];
                inputs.extend(
                    points
                        .iter()
                        .skip(1)
                        .map(|[x, y]| PointerInput::mouse(PointerPhase::Move, *x, *y)),
                );
                inputs.push(PointerInput::mouse(PointerPhase::Up, *x1, *y1));
                inputs
            }
            _ => Vec::new(),
        }
    }
}
