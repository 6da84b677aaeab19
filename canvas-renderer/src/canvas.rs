//! The drawing canvas component.
//!
//! [`DrawingCanvas`] owns the stroke surface, the composite surface, the
//! background and the interaction state. Every mutating call recomposes the
//! composite synchronously and re-arms the export timer. Timers are polled:
//! the host calls [`DrawingCanvas::tick`] from its loop.

use std::time::Instant;

use canvas_core::{
    CanvasState, Clock, Debouncer, ElementBounds, InputOutcome, PenStyle, PointerInput,
    PointerResponse, Rgb, SystemClock, TextLayer, TextMeasure, TextStyle, Viewport,
};
use tiny_skia::Pixmap;

use crate::background::{self, Background, ImageSource};
use crate::compositor::{compose, Overlay};
use crate::error::{ErrorCategory, RenderError, RenderResult};
use crate::export::{EncodedImage, ImageExporter};
use crate::surface::{Layer, StrokeSurface};
use crate::CanvasConfig;

#[cfg(feature = "text")]
use crate::text::{FontEngine, TextOverlay};

type ImageCallback = Box<dyn FnMut(Option<EncodedImage>)>;
type SizeCallback = Box<dyn FnMut(u32)>;

/// Which timers fired during a [`DrawingCanvas::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// New side, if a debounced resize was applied.
    pub resized: Option<u32>,
    /// Whether an image was delivered.
    pub exported: bool,
}

impl TickReport {
    /// Whether anything fired.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.resized.is_none() && !self.exported
    }
}

/// Layered freehand canvas with debounced export.
pub struct DrawingCanvas<C: Clock = SystemClock> {
    state: CanvasState,
    strokes: StrokeSurface,
    composite: Layer,
    background: Background,
    exporter: ImageExporter,
    config: CanvasConfig,
    export_timer: Debouncer<()>,
    resize_timer: Debouncer<Viewport>,
    #[cfg(feature = "text")]
    fonts: FontEngine,
    error: Option<&'static str>,
    on_image_ready: Option<ImageCallback>,
    on_size_ready: Option<SizeCallback>,
    reported_side: Option<u32>,
    unmounted: bool,
    clock: C,
}

impl<C: Clock> std::fmt::Debug for DrawingCanvas<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawingCanvas")
            .field("side", &self.state.side())
            .field("text_objects", &self.state.text().len())
            .field("export_pending", &self.export_timer.is_pending())
            .field("resize_pending", &self.resize_timer.is_pending())
            .field("error", &self.error)
            .field("unmounted", &self.unmounted)
            .finish_non_exhaustive()
    }
}

impl DrawingCanvas<SystemClock> {
    /// Create a canvas driven by the wall clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the surfaces cannot be allocated.
    pub fn new(config: CanvasConfig) -> RenderResult<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> DrawingCanvas<C> {
    /// Create a canvas driven by `clock`.
    ///
    /// # Errors
    ///
    /// Returns an error if the surfaces cannot be allocated.
    pub fn with_clock(config: CanvasConfig, clock: C) -> RenderResult<Self> {
        let side = config.initial_side.max(1);
        let text_enabled = text_feature_available(config.text_enabled);

        let mut state = CanvasState::new(side).with_text_enabled(text_enabled);
        state.set_pen(config.pen);
        state.set_background(config.background);
        state.set_text_style(config.text_style.clone());

        #[cfg(feature = "text")]
        let fonts = {
            let mut fonts = if config.system_fonts {
                FontEngine::system()
            } else {
                FontEngine::empty()
            };
            for path in &config.font_files {
                fonts.load_font_file(path);
            }
            fonts
        };

        let mut canvas = Self {
            strokes: StrokeSurface::new(side, config.pen)?,
            composite: Layer::new(side)?,
            background: Background::new(config.background),
            exporter: ImageExporter::new(config.export.clone()),
            export_timer: Debouncer::new(config.export_debounce),
            resize_timer: Debouncer::new(config.resize_debounce),
            #[cfg(feature = "text")]
            fonts,
            state,
            config,
            error: None,
            on_image_ready: None,
            on_size_ready: None,
            reported_side: None,
            unmounted: false,
            clock,
        };
        canvas.recompose();
        tracing::debug!("Canvas created at {side}px (text: {text_enabled})");
        Ok(canvas)
    }

    // ------------------------------------------------------------------
    // Callbacks and lifecycle
    // ------------------------------------------------------------------

    /// Register the debounced export callback.
    pub fn on_image_ready(&mut self, callback: impl FnMut(Option<EncodedImage>) + 'static) {
        self.on_image_ready = Some(Box::new(callback));
    }

    /// Register the size callback, invoked whenever the side changes.
    pub fn on_size_ready(&mut self, callback: impl FnMut(u32) + 'static) {
        self.on_size_ready = Some(Box::new(callback));
    }

    /// Size the canvas immediately from the host layout.
    pub fn mount(&mut self, viewport: Viewport) {
        if self.unmounted {
            return;
        }
        self.resize_timer.cancel();
        self.apply_viewport(viewport);
    }

    /// Schedule a resize; bursts within the debounce window coalesce.
    pub fn request_resize(&mut self, viewport: Viewport) {
        if self.unmounted {
            return;
        }
        self.resize_timer.request(viewport, self.clock.now());
    }

    /// Cancel both timers and drop the surfaces' callbacks. Every later call
    /// is a no-op.
    pub fn unmount(&mut self) {
        if self.unmounted {
            return;
        }
        self.export_timer.cancel();
        self.resize_timer.cancel();
        self.on_image_ready = None;
        self.on_size_ready = None;
        self.unmounted = true;
        tracing::debug!("Canvas unmounted");
    }

    /// Whether [`unmount`](Self::unmount) has been called.
    #[must_use]
    pub fn is_unmounted(&self) -> bool {
        self.unmounted
    }

    /// Fire every timer whose deadline has passed.
    pub fn tick(&mut self) -> TickReport {
        if self.unmounted {
            return TickReport::default();
        }
        let now = self.clock.now();
        let mut report = TickReport::default();

        if let Some(viewport) = self.resize_timer.poll(now) {
            report.resized = Some(self.apply_viewport(viewport));
        }
        // A resize re-arms the export timer; it is polled afterwards so the
        // delivered frame is never older than the resize.
        if self.export_timer.poll(now).is_some() {
            self.deliver_image();
            report.exported = true;
        }
        report
    }

    /// Fire pending timers immediately, regardless of deadline.
    pub fn flush(&mut self) -> TickReport {
        if self.unmounted {
            return TickReport::default();
        }
        let mut report = TickReport::default();
        if let Some(viewport) = self.resize_timer.flush() {
            report.resized = Some(self.apply_viewport(viewport));
        }
        if self.export_timer.flush().is_some() {
            self.deliver_image();
            report.exported = true;
        }
        report
    }

    /// Earliest pending timer deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.resize_timer.deadline(), self.export_timer.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Route a pointer event. The response tells touch hosts to suppress
    /// scrolling.
    pub fn handle_pointer(
        &mut self,
        input: &PointerInput,
        bounds: &ElementBounds,
    ) -> PointerResponse {
        if self.unmounted {
            return PointerResponse {
                outcome: InputOutcome::Ignored,
                prevent_default: input.source.is_touch(),
            };
        }

        #[cfg(feature = "text")]
        let measure: &dyn TextMeasure = &self.fonts;
        #[cfg(not(feature = "text"))]
        let measure: &dyn TextMeasure = &canvas_core::ApproximateMetrics::default();

        let response = self.state.handle_pointer(input, bounds, measure);

        if let InputOutcome::StrokeExtended(segment) = response.outcome {
            tracing::trace!(
                "Segment ({}, {}) -> ({}, {})",
                segment.from.x,
                segment.from.y,
                segment.to.x,
                segment.to.y
            );
            self.strokes.draw_segment(&segment);
        }
        if response.outcome.needs_redraw() {
            self.redraw();
        }
        response
    }

    // ------------------------------------------------------------------
    // Pen and background
    // ------------------------------------------------------------------

    /// Change the pen color for subsequent segments.
    pub fn set_pen_color(&mut self, color: Rgb) {
        self.set_pen(PenStyle::new(color, self.state.pen().width));
    }

    /// Change the pen width for subsequent segments (clamped to 1..=50).
    pub fn set_pen_width(&mut self, width: f32) {
        self.set_pen(PenStyle::new(self.state.pen().color, width));
    }

    fn set_pen(&mut self, pen: PenStyle) {
        if self.unmounted {
            return;
        }
        self.state.set_pen(pen);
        self.strokes.set_pen(pen);
        tracing::debug!("Pen set to {} width {}", pen.color, pen.width);
    }

    /// Change the background fill color.
    pub fn set_background_color(&mut self, color: Rgb) {
        if self.unmounted {
            return;
        }
        self.state.set_background(color);
        self.background.set_color(color);
        self.redraw();
    }

    /// Ingest a background image. On failure the previous background stays
    /// and [`error`](Self::error) holds the message.
    ///
    /// # Errors
    ///
    /// Returns the ingestion error, or [`RenderError::Unmounted`].
    pub fn load_background(&mut self, source: Option<ImageSource<'_>>) -> RenderResult<()> {
        if self.unmounted {
            return Err(RenderError::Unmounted);
        }
        match background::ingest(source, self.state.side()) {
            Ok(image) => {
                self.background.set_image(image);
                self.error = None;
                self.redraw();
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Background ingestion failed: {e}");
                if e.category() != ErrorCategory::Environment {
                    self.error = Some(e.user_message());
                }
                Err(e)
            }
        }
    }

    /// Drop the background image, keeping the fill color.
    pub fn remove_background_image(&mut self) {
        if self.unmounted {
            return;
        }
        if self.background.clear_image() {
            self.redraw();
        }
    }

    /// Current inline error message.
    #[must_use]
    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    /// Dismiss the inline error.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Erase all ink and text. The background is kept.
    pub fn clear(&mut self) {
        if self.unmounted {
            return;
        }
        self.strokes.clear();
        self.state.clear();
        self.error = None;
        self.redraw();
        tracing::debug!("Canvas cleared");
    }

    // ------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------

    /// Arm or disarm text placement. Returns the new armed state.
    pub fn toggle_text_placement(&mut self) -> bool {
        if self.unmounted {
            return false;
        }
        self.state.toggle_text_placement()
    }

    /// Set the text for the next placement.
    pub fn set_pending_text(&mut self, text: impl Into<String>) {
        if self.unmounted {
            return;
        }
        self.state.set_pending_text(text);
    }

    /// Update the style controls, restyling the selected object if any.
    pub fn set_text_style(&mut self, style: TextStyle) {
        if self.unmounted {
            return;
        }
        if self.state.set_text_style(style) {
            self.redraw();
        }
    }

    /// Drop the current text selection.
    pub fn deselect_text(&mut self) {
        if self.unmounted {
            return;
        }
        if self.state.deselect_text() {
            self.redraw();
        }
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Recompose the composite and re-arm the export timer.
    pub fn redraw(&mut self) {
        if self.unmounted {
            return;
        }
        self.recompose();
        self.export_timer.request((), self.clock.now());
    }

    fn recompose(&mut self) {
        #[cfg(feature = "text")]
        let text_overlay = TextOverlay::new(self.state.text(), &self.fonts);
        #[cfg(feature = "text")]
        let overlay: Option<&dyn Overlay> = Some(&text_overlay);
        #[cfg(not(feature = "text"))]
        let overlay: Option<&dyn Overlay> = None;

        compose(
            self.composite.pixmap_mut(),
            &self.background,
            self.strokes.pixmap(),
            overlay,
        );
    }

    /// Encode the current composite without going through the timer.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Encode`] if encoding fails.
    pub fn export_now(&self) -> RenderResult<EncodedImage> {
        self.exporter.encode(self.composite.pixmap())
    }

    fn deliver_image(&mut self) {
        let image = match self.export_now() {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!("Export failed: {e}");
                None
            }
        };
        tracing::debug!(
            "Delivering image ({} bytes)",
            image.as_ref().map_or(0, |i| i.bytes.len())
        );
        if let Some(callback) = self.on_image_ready.as_mut() {
            callback(image);
        }
    }

    /// Apply a viewport measurement. Returns the resulting side.
    fn apply_viewport(&mut self, viewport: Viewport) -> u32 {
        let side = self.config.resize_policy.side_for(viewport);

        if side != self.state.side() {
            let resized = Layer::new(side).and_then(|composite| {
                self.strokes.resize_preserving(side)?;
                Ok(composite)
            });
            match resized {
                Ok(composite) => self.composite = composite,
                Err(e) => {
                    tracing::warn!("Resize to {side}px failed: {e}");
                    return self.state.side();
                }
            }
            self.state.set_side(side);
            tracing::debug!("Canvas resized to {side}px");
        }

        if self.reported_side != Some(side) {
            self.reported_side = Some(side);
            if let Some(callback) = self.on_size_ready.as_mut() {
                callback(side);
            }
        }

        self.redraw();
        side
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Current side length in pixels.
    #[must_use]
    pub fn side(&self) -> u32 {
        self.state.side()
    }

    /// Interaction state.
    #[must_use]
    pub fn state(&self) -> &CanvasState {
        &self.state
    }

    /// Placed text objects and selection.
    #[must_use]
    pub fn text(&self) -> &TextLayer {
        self.state.text()
    }

    /// Active text style controls.
    #[must_use]
    pub fn text_style(&self) -> &TextStyle {
        self.state.text_style()
    }

    /// The composite surface.
    #[must_use]
    pub fn composite(&self) -> &Pixmap {
        self.composite.pixmap()
    }

    /// Straight-alpha RGBA of a composite pixel.
    #[must_use]
    pub fn composite_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.composite.pixel(x, y)
    }

    /// The stroke surface.
    #[must_use]
    pub fn strokes(&self) -> &StrokeSurface {
        &self.strokes
    }

    /// The background layer.
    #[must_use]
    pub fn background(&self) -> &Background {
        &self.background
    }

    /// Whether an export is waiting on its timer.
    #[must_use]
    pub fn export_pending(&self) -> bool {
        self.export_timer.is_pending()
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }
}

#[cfg(feature = "text")]
fn text_feature_available(requested: bool) -> bool {
    requested
}

#[cfg(not(feature = "text"))]
fn text_feature_available(requested: bool) -> bool {
    if requested {
        tracing::warn!("Text requested but the `text` feature is disabled");
    }
    false
}
