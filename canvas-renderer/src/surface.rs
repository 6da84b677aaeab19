//! Owned pixel surfaces.
//!
//! A [`Layer`] is a square premultiplied RGBA pixmap. The [`StrokeSurface`]
//! wraps one with the brush derived from the current pen, and keeps its ink
//! across resizes by rescaling through an intermediate copy.

use canvas_core::{PenStyle, Segment};
use tiny_skia::{
    Color, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke,
    Transform,
};

use crate::error::{RenderError, RenderResult};

/// Allocate a transparent pixmap.
pub(crate) fn alloc_pixmap(width: u32, height: u32) -> RenderResult<Pixmap> {
    Pixmap::new(width, height)
        .ok_or_else(|| RenderError::Surface(format!("cannot allocate {width}x{height} surface")))
}

/// A square raster buffer.
#[derive(Debug, Clone)]
pub struct Layer {
    pixmap: Pixmap,
}

impl Layer {
    /// Create a transparent layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the side is zero or too large to allocate.
    pub fn new(side: u32) -> RenderResult<Self> {
        Ok(Self {
            pixmap: alloc_pixmap(side, side)?,
        })
    }

    /// Side length in pixels.
    #[must_use]
    pub fn side(&self) -> u32 {
        self.pixmap.width()
    }

    /// Underlying pixmap.
    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Mutable access to the underlying pixmap.
    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// Make every pixel transparent.
    pub fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    /// Straight-alpha RGBA value at `(x, y)`.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
    }

    /// Reallocate at a new side and redraw the old content scaled to fit.
    ///
    /// # Errors
    ///
    /// Returns an error if the new surface cannot be allocated; the layer is
    /// left untouched in that case.
    #[allow(clippy::cast_precision_loss)]
    pub fn resize_preserving(&mut self, side: u32) -> RenderResult<()> {
        let intermediate = self.pixmap.clone();
        let mut resized = alloc_pixmap(side, side)?;

        let sx = side as f32 / intermediate.width() as f32;
        let sy = side as f32 / intermediate.height() as f32;
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        resized.draw_pixmap(
            0,
            0,
            intermediate.as_ref(),
            &paint,
            Transform::from_scale(sx, sy),
            None,
        );

        self.pixmap = resized;
        Ok(())
    }
}

/// Paint and stroke settings derived from a [`PenStyle`].
#[derive(Debug, Clone)]
struct Brush {
    paint: Paint<'static>,
    stroke: Stroke,
}

impl Brush {
    fn from_pen(pen: &PenStyle) -> Self {
        let mut paint = Paint::default();
        paint.set_color_rgba8(pen.color.r, pen.color.g, pen.color.b, 255);
        paint.anti_alias = true;

        let stroke = Stroke {
            width: pen.width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };

        Self { paint, stroke }
    }
}

/// The layer holding committed freehand ink.
#[derive(Debug, Clone)]
pub struct StrokeSurface {
    layer: Layer,
    pen: PenStyle,
    brush: Brush,
}

impl StrokeSurface {
    /// Create an empty stroke surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be allocated.
    pub fn new(side: u32, pen: PenStyle) -> RenderResult<Self> {
        Ok(Self {
            layer: Layer::new(side)?,
            pen,
            brush: Brush::from_pen(&pen),
        })
    }

    /// The ink layer.
    #[must_use]
    pub fn layer(&self) -> &Layer {
        &self.layer
    }

    /// Ink pixmap.
    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        self.layer.pixmap()
    }

    /// Pen used for new segments.
    #[must_use]
    pub fn pen(&self) -> PenStyle {
        self.pen
    }

    /// Switch the pen for subsequent segments.
    pub fn set_pen(&mut self, pen: PenStyle) {
        self.pen = pen;
        self.brush = Brush::from_pen(&pen);
    }

    /// Draw one segment with the current pen.
    pub fn draw_segment(&mut self, segment: &Segment) {
        if segment.from == segment.to {
            return;
        }

        let mut pb = PathBuilder::new();
        pb.move_to(segment.from.x, segment.from.y);
        pb.line_to(segment.to.x, segment.to.y);
        let Some(path) = pb.finish() else {
            return;
        };

        self.layer.pixmap_mut().stroke_path(
            &path,
            &self.brush.paint,
            &self.brush.stroke,
            Transform::identity(),
            None,
        );
    }

    /// Erase all ink.
    pub fn clear(&mut self) {
        self.layer.clear();
    }

    /// Rescale the ink into a new side and re-apply the pen.
    ///
    /// # Errors
    ///
    /// Returns an error if the new surface cannot be allocated.
    pub fn resize_preserving(&mut self, side: u32) -> RenderResult<()> {
        self.layer.resize_preserving(side)?;
        self.brush = Brush::from_pen(&self.pen);
        tracing::debug!(
            "Stroke surface resized to {side}px, pen {} width {}",
            self.pen.color,
            self.pen.width
        );
        Ok(())
    }
}
