//! # Meme Canvas Renderer
//!
//! Raster side of the meme canvas, built on tiny-skia.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │          Composite (rebuilt each redraw)    │
//! ├─────────────────────────────────────────────┤
//! │ Text overlay   (feature `text`, usvg/resvg) │
//! │ Stroke surface (persistent ink)             │
//! │ Background     (color + fitted image)       │
//! └─────────────────────────────────────────────┘
//!                      │
//!                      ▼
//!        debounced JPEG/PNG → on_image_ready
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod background;
pub mod canvas;
pub mod compositor;
pub mod error;
pub mod export;
pub mod surface;

#[cfg(feature = "text")]
pub mod text;

use std::path::PathBuf;
use std::time::Duration;

use canvas_core::{PenStyle, ResizePolicy, Rgb, TextStyle};

pub use background::{Background, BackgroundImage, ImageFormat, ImageSource};
pub use canvas::{DrawingCanvas, TickReport};
pub use compositor::{compose, Overlay};
pub use error::{ErrorCategory, RenderError, RenderResult};
pub use export::{EncodedImage, ExportConfig, ExportFormat, ImageExporter};
pub use surface::{Layer, StrokeSurface};

#[cfg(feature = "text")]
pub use text::{FontEngine, TextOverlay};

/// Configuration for a [`DrawingCanvas`].
#[derive(Debug, Clone)]
pub struct CanvasConfig {
    /// Side length before the first mount.
    pub initial_side: u32,
    /// How host layout maps to the side length.
    pub resize_policy: ResizePolicy,
    /// Quiet period before a resize is applied.
    pub resize_debounce: Duration,
    /// Quiet period before the composite is exported.
    pub export_debounce: Duration,
    /// Export format and quality.
    pub export: ExportConfig,
    /// Initial pen.
    pub pen: PenStyle,
    /// Initial background color.
    pub background: Rgb,
    /// Initial text style controls.
    pub text_style: TextStyle,
    /// Enable text placement (requires the `text` feature).
    pub text_enabled: bool,
    /// Load the system font database.
    pub system_fonts: bool,
    /// Extra font files to load.
    pub font_files: Vec<PathBuf>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            initial_side: 300,
            resize_policy: ResizePolicy::default(),
            resize_debounce: Duration::from_millis(100),
            export_debounce: Duration::from_millis(100),
            export: ExportConfig::default(),
            pen: PenStyle::default(),
            background: Rgb::WHITE,
            text_style: TextStyle::default(),
            text_enabled: true,
            system_fonts: true,
            font_files: Vec::new(),
        }
    }
}

/// Renderer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
