//! # Meme Canvas Core
//!
//! Pixel-free logic for the layered meme canvas.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 canvas-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Input           │  Canvas State            │
//! │  - Mouse / touch │  - Stroke recorder       │
//! │  - CSS → surface │  - Text layer            │
//! │    translation   │  - Pen / background      │
//! ├─────────────────────────────────────────────┤
//! │  Timing          │  Layout                  │
//! │  - Debouncer     │  - Square resize policy  │
//! │  - Clock         │                          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Rasterization lives in `canvas-renderer`; this crate only decides what
//! should be drawn.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod debounce;
pub mod error;
pub mod event;
pub mod resize;
pub mod state;
pub mod stroke;
pub mod style;
pub mod text;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use debounce::{Clock, Debouncer, ManualClock, SystemClock};
pub use error::{CanvasError, CanvasResult};
pub use event::{
    translate, ElementBounds, Point, PointerInput, PointerPhase, PointerSource, SurfaceSize,
    TouchPoint, TranslatedPointer,
};
pub use resize::{ResizePolicy, Viewport};
pub use state::{CanvasState, InputOutcome, PointerResponse};
pub use stroke::{Segment, StrokeRecorder, StrokeState};
pub use style::{PenStyle, Rgb, TextStyle, MAX_PEN_WIDTH, MIN_PEN_WIDTH};
pub use text::{
    ApproximateMetrics, TextBounds, TextLayer, TextMeasure, TextObject, TextObjectId,
};

/// Canvas core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
