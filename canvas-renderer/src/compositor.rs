//! Layer compositing.
//!
//! The visible surface is rebuilt from scratch on every redraw:
//! background color, background image stretched to fill, stroke layer at 1:1,
//! then an optional overlay (text). Nothing drawn on the composite survives to
//! the next redraw.

use tiny_skia::{Color, FilterQuality, Pixmap, PixmapPaint, Transform};

use crate::background::Background;

/// Something painted over the stroke layer.
pub trait Overlay {
    /// Paint onto the composite.
    fn paint(&self, target: &mut Pixmap);
}

/// Rebuild `target` from the layers.
#[allow(clippy::cast_precision_loss)]
pub fn compose(
    target: &mut Pixmap,
    background: &Background,
    strokes: &Pixmap,
    overlay: Option<&dyn Overlay>,
) {
    let color = background.color();
    target.fill(Color::from_rgba8(color.r, color.g, color.b, 255));

    if let Some(image) = background.image() {
        let image = image.pixmap();
        let sx = target.width() as f32 / image.width() as f32;
        let sy = target.height() as f32 / image.height() as f32;
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        target.draw_pixmap(
            0,
            0,
            image.as_ref(),
            &paint,
            Transform::from_scale(sx, sy),
            None,
        );
    }

    target.draw_pixmap(
        0,
        0,
        strokes.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );

    if let Some(overlay) = overlay {
        overlay.paint(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Layer, StrokeSurface};
    use canvas_core::{PenStyle, Point, Rgb, Segment};
    use tiny_skia::{Paint, Rect};

    struct Marker;

    impl Overlay for Marker {
        fn paint(&self, target: &mut Pixmap) {
            let mut paint = Paint::default();
            paint.set_color_rgba8(0, 0, 255, 255);
            if let Some(rect) = Rect::from_xywh(0.0, 0.0, 4.0, 4.0) {
                target.fill_rect(rect, &paint, Transform::identity(), None);
            }
        }
    }

    fn rgba(layer: &Layer, x: u32, y: u32) -> [u8; 4] {
        layer.pixel(x, y).expect("in bounds")
    }

    #[test]
    fn test_empty_strokes_show_background_color() {
        let mut target = Layer::new(20).expect("layer");
        let strokes = Layer::new(20).expect("layer");
        let background = Background::new(Rgb::new(10, 20, 30));

        compose(target.pixmap_mut(), &background, strokes.pixmap(), None);
        assert_eq!(rgba(&target, 0, 0), [10, 20, 30, 255]);
        assert_eq!(rgba(&target, 19, 19), [10, 20, 30, 255]);
    }

    #[test]
    fn test_layer_order() {
        let mut target = Layer::new(20).expect("layer");
        let mut strokes = StrokeSurface::new(20, PenStyle::new(Rgb::new(255, 0, 0), 4.0))
            .expect("surface");
        strokes.draw_segment(&Segment {
            from: Point::new(0.0, 2.0),
            to: Point::new(20.0, 2.0),
        });

        compose(
            target.pixmap_mut(),
            &Background::default(),
            strokes.pixmap(),
            Some(&Marker),
        );

        // Overlay wins over ink, ink wins over background.
        assert_eq!(rgba(&target, 2, 2), [0, 0, 255, 255]);
        assert_eq!(rgba(&target, 10, 2), [255, 0, 0, 255]);
        assert_eq!(rgba(&target, 10, 15), [255, 255, 255, 255]);
    }
}
