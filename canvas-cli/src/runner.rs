//! Replays a [`Script`] against a [`DrawingCanvas`].

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use canvas_core::{ElementBounds, Viewport};
use canvas_renderer::{DrawingCanvas, EncodedImage, ImageSource};

use crate::script::{Script, Step};

/// What a replay produced.
#[derive(Debug, Default)]
pub struct RunOutcome {
    /// The last delivered export.
    pub image: Option<EncodedImage>,
    /// Number of `on_image_ready` deliveries.
    pub exports: usize,
    /// Sides reported through `on_size_ready`.
    pub sizes: Vec<u32>,
    /// User-facing messages raised by ingestion steps.
    pub errors: Vec<String>,
}

/// Drives a canvas through a script, sleeping on the tokio timer while
/// debounce windows run.
pub struct ScriptRunner<'a> {
    canvas: DrawingCanvas,
    base_dir: &'a Path,
    images: Rc<RefCell<Vec<Option<EncodedImage>>>>,
    sizes: Rc<RefCell<Vec<u32>>>,
    errors: Vec<String>,
}

impl<'a> ScriptRunner<'a> {
    /// Wire callbacks onto `canvas`. Relative image paths resolve against
    /// `base_dir`.
    #[must_use]
    pub fn new(mut canvas: DrawingCanvas, base_dir: &'a Path) -> Self {
        let images = Rc::new(RefCell::new(Vec::new()));
        let sizes = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&images);
        canvas.on_image_ready(move |image| sink.borrow_mut().push(image));
        let sink = Rc::clone(&sizes);
        canvas.on_size_ready(move |side| sink.borrow_mut().push(side));

        Self {
            canvas,
            base_dir,
            images,
            sizes,
            errors: Vec::new(),
        }
    }

    /// The canvas being driven.
    #[must_use]
    pub fn canvas(&self) -> &DrawingCanvas {
        &self.canvas
    }

    /// Replay every step, flush pending timers and tear the canvas down.
    ///
    /// If no export was delivered during the run the composite is encoded
    /// once at the end so there is always an image to write.
    pub async fn run(mut self, script: &Script) -> RunOutcome {
        for (index, step) in script.steps.iter().enumerate() {
            tracing::debug!("Step {index}: {step:?}");
            self.apply(step, script.bounds).await;
            self.tick();
        }

        self.canvas.flush();
        if self.images.borrow().is_empty() {
            match self.canvas.export_now() {
                Ok(image) => self.images.borrow_mut().push(Some(image)),
                Err(e) => tracing::warn!("Final export failed: {e}"),
            }
        }
        self.canvas.unmount();

        let images = self.images.take();
        RunOutcome {
            exports: images.len(),
            image: images.into_iter().rev().flatten().next(),
            sizes: self.sizes.take(),
            errors: self.errors,
        }
    }

    async fn apply(&mut self, step: &Step, bounds: Option<ElementBounds>) {
        let canvas = &mut self.canvas;
        match step {
            Step::Mount {
                container_width,
                viewport_width,
            } => canvas.mount(Viewport::new(*container_width, *viewport_width)),
            Step::Resize {
                container_width,
                viewport_width,
            } => canvas.request_resize(Viewport::new(*container_width, *viewport_width)),
            Step::Pointer { .. } | Step::Touch { .. } | Step::Stroke { .. } => {
                for input in step.pointer_inputs() {
                    let at = bounds.unwrap_or_else(|| ElementBounds::unscaled(canvas.side()));
                    let response = canvas.handle_pointer(&input, &at);
                    tracing::trace!("{:?} -> {:?}", input.phase, response.outcome);
                }
            }
            Step::PenColor { color } => canvas.set_pen_color(*color),
            Step::PenWidth { width } => canvas.set_pen_width(*width),
            Step::BackgroundColor { color } => canvas.set_background_color(*color),
            Step::BackgroundImage { path, data_uri } => {
                let resolved = path.as_ref().map(|p| self.base_dir.join(p));
                let source = match (&resolved, data_uri) {
                    (Some(path), _) => Some(ImageSource::Path(path)),
                    (None, Some(uri)) => Some(ImageSource::DataUri(uri)),
                    (None, None) => None,
                };
                if canvas.load_background(source).is_err() {
                    if let Some(message) = canvas.error() {
                        tracing::warn!("{message}");
                        self.errors.push(message.to_string());
                    }
                }
            }
            Step::RemoveBackgroundImage => canvas.remove_background_image(),
            Step::DismissError => canvas.dismiss_error(),
            Step::TextMode => {
                let armed = canvas.toggle_text_placement();
                tracing::debug!("Text placement armed: {armed}");
            }
            Step::PendingText { text } => canvas.set_pending_text(text.clone()),
            Step::TextStyle { style } => canvas.set_text_style(style.clone()),
            Step::DeselectText => canvas.deselect_text(),
            Step::Clear => canvas.clear(),
            Step::Wait { ms } => self.wait(Duration::from_millis(*ms)).await,
        }
    }

    async fn wait(&mut self, duration: Duration) {
        let end = Instant::now() + duration;
        loop {
            self.tick();
            if Instant::now() >= end {
                break;
            }
            let wake = self
                .canvas
                .next_deadline()
                .map_or(end, |deadline| deadline.min(end));
            tokio::time::sleep_until(tokio::time::Instant::from_std(wake)).await;
        }
    }

    fn tick(&mut self) {
        let report = self.canvas.tick();
        if let Some(side) = report.resized {
            tracing::debug!("Resized to {side}px");
        }
        if report.exported {
            tracing::debug!("Export delivered");
        }
    }
}
