//! Text rendering and measurement through usvg/resvg.
//!
//! Each text object is emitted as an SVG `<text>` element, so glyph shaping
//! and font fallback are handled by usvg's font database. Underlines and the
//! selection outline are drawn directly with tiny-skia.

use std::fmt::Write;
use std::path::Path;

use canvas_core::{ApproximateMetrics, TextLayer, TextMeasure, TextObject, TextStyle};
use tiny_skia::{Paint, PathBuilder, Pixmap, Rect, Stroke, StrokeDash, Transform};
use usvg::fontdb::{Database, Family, Query};

use crate::compositor::Overlay;

/// Baseline offset below the top of the text box, as a fraction of font size.
const BASELINE_RATIO: f32 = 0.8;

/// Selection outline color (`#3b82f6`).
const SELECTION_RGB: (u8, u8, u8) = (0x3b, 0x82, 0xf6);

/// Tried in order when the database's `sans-serif` family is not installed.
const SANS_SERIF_CANDIDATES: &[&str] = &[
    "Arial",
    "Helvetica",
    "Liberation Sans",
    "DejaVu Sans",
    "Noto Sans",
    "Roboto",
];

/// Font database plus the usvg options used to lay text out.
pub struct FontEngine {
    options: usvg::Options<'static>,
    fallback: ApproximateMetrics,
}

impl std::fmt::Debug for FontEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontEngine")
            .field("faces", &self.face_count())
            .finish_non_exhaustive()
    }
}

impl Default for FontEngine {
    fn default() -> Self {
        Self::empty()
    }
}

impl FontEngine {
    /// An engine with no fonts. Measurement falls back to [`ApproximateMetrics`]
    /// and nothing is painted for glyphs.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            options: usvg::Options::default(),
            fallback: ApproximateMetrics::default(),
        }
    }

    /// An engine loaded with the system fonts.
    #[must_use]
    pub fn system() -> Self {
        let mut engine = Self::empty();
        engine.options.fontdb_mut().load_system_fonts();
        tracing::debug!("Loaded {} system font faces", engine.face_count());
        engine.resolve_sans_serif();
        engine
    }

    /// Add a font file. Unreadable files are logged and skipped.
    pub fn load_font_file(&mut self, path: &Path) {
        match self.options.fontdb_mut().load_font_file(path) {
            Ok(()) => self.resolve_sans_serif(),
            Err(e) => tracing::warn!("Failed to load font {}: {e}", path.display()),
        }
    }

    /// Family that `sans-serif` currently resolves to.
    #[must_use]
    pub fn sans_serif_family(&self) -> &str {
        self.options.fontdb.family_name(&Family::SansSerif)
    }

    /// Point `sans-serif` at an installed family. Every text element falls
    /// back to it, and usvg drops text whose families all fail to resolve.
    fn resolve_sans_serif(&mut self) {
        let db = self.options.fontdb_mut();
        if has_family(db, db.family_name(&Family::SansSerif)) {
            return;
        }

        let substitute = SANS_SERIF_CANDIDATES
            .iter()
            .find(|name| has_family(db, name))
            .map(|name| (*name).to_string())
            .or_else(|| {
                db.faces()
                    .find_map(|face| face.families.first())
                    .map(|(name, _)| name.clone())
            });

        if let Some(name) = substitute {
            tracing::debug!("Using {name} as the sans-serif family");
            db.set_sans_serif_family(name);
        }
    }

    /// Number of loaded font faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.options.fontdb.len()
    }

    fn parse(&self, svg: &str) -> Option<usvg::Tree> {
        match usvg::Tree::from_str(svg, &self.options) {
            Ok(tree) => Some(tree),
            Err(e) => {
                tracing::warn!("Text SVG parsing failed: {e}");
                None
            }
        }
    }

    /// Paint the glyphs of every object in the layer onto `target`.
    #[allow(clippy::cast_precision_loss)]
    pub fn paint_glyphs(&self, target: &mut Pixmap, objects: &[TextObject]) {
        if objects.is_empty() || self.face_count() == 0 {
            return;
        }

        let mut svg = svg_header(target.width() as f32, target.height() as f32);
        for object in objects {
            write_text_element(
                &mut svg,
                &object.text,
                object.position.x,
                object.position.y,
                &object.style,
            );
        }
        svg.push_str("</svg>");

        if let Some(tree) = self.parse(&svg) {
            resvg::render(&tree, Transform::default(), &mut target.as_mut());
        }
    }
}

impl TextMeasure for FontEngine {
    fn measure_width(&self, text: &str, style: &TextStyle) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        if self.face_count() == 0 {
            return self.fallback.measure_width(text, style);
        }

        let fallback_width = self.fallback.measure_width(text, style);
        let canvas = (fallback_width + style.font_size_px) * 2.0 + 16.0;
        let mut svg = svg_header(canvas, style.font_size_px * 2.0 + 16.0);
        write_text_element(&mut svg, text, 0.0, 0.0, style);
        svg.push_str("</svg>");

        match self.parse(&svg) {
            Some(tree) if !tree.root().children().is_empty() => {
                tree.root().bounding_box().right().max(0.0)
            }
            _ => fallback_width,
        }
    }
}

/// Overlay that paints a text layer with decorations and selection outline.
pub struct TextOverlay<'a> {
    layer: &'a TextLayer,
    engine: &'a FontEngine,
}

impl<'a> TextOverlay<'a> {
    /// Paint `layer` with glyphs from `engine`.
    #[must_use]
    pub fn new(layer: &'a TextLayer, engine: &'a FontEngine) -> Self {
        Self { layer, engine }
    }
}

impl Overlay for TextOverlay<'_> {
    fn paint(&self, target: &mut Pixmap) {
        let objects = self.layer.objects();
        self.engine.paint_glyphs(target, objects);

        for object in objects.iter().filter(|o| o.style.underline) {
            draw_underline(target, object, self.engine);
        }

        if let Some(selected) = self.layer.selected_object() {
            draw_selection(target, selected, self.engine);
        }
    }
}

fn draw_underline(target: &mut Pixmap, object: &TextObject, measure: &dyn TextMeasure) {
    let bounds = object.bounds(measure);
    let size = object.style.font_size_px;
    let y = bounds.y + size * (BASELINE_RATIO + 0.08);

    let mut pb = PathBuilder::new();
    pb.move_to(bounds.x, y);
    pb.line_to(bounds.x + bounds.width, y);
    let Some(path) = pb.finish() else {
        return;
    };

    let mut paint = Paint::default();
    let color = object.style.color;
    paint.set_color_rgba8(color.r, color.g, color.b, 255);
    let stroke = Stroke {
        width: (size / 15.0).max(1.0),
        ..Stroke::default()
    };
    target.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

fn draw_selection(target: &mut Pixmap, object: &TextObject, measure: &dyn TextMeasure) {
    let bounds = object.bounds(measure);
    let Some(rect) = Rect::from_xywh(
        bounds.x - 2.0,
        bounds.y - 2.0,
        bounds.width.max(1.0) + 4.0,
        bounds.height + 4.0,
    ) else {
        return;
    };

    let mut paint = Paint::default();
    let (r, g, b) = SELECTION_RGB;
    paint.set_color_rgba8(r, g, b, 255);
    let stroke = Stroke {
        width: 1.5,
        dash: StrokeDash::new(vec![4.0, 3.0], 0.0),
        ..Stroke::default()
    };
    target.stroke_path(
        &PathBuilder::from_rect(rect),
        &paint,
        &stroke,
        Transform::identity(),
        None,
    );
}

fn svg_header(width: f32, height: f32) -> String {
    let mut svg = String::with_capacity(512);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    );
    svg
}

fn write_text_element(svg: &mut String, text: &str, x: f32, top: f32, style: &TextStyle) {
    let baseline = top + style.font_size_px * BASELINE_RATIO;
    let weight = if style.bold { "bold" } else { "normal" };
    let slant = if style.italic { "italic" } else { "normal" };
    let _ = write!(
        svg,
        "<text x=\"{x}\" y=\"{baseline}\" font-size=\"{}\" font-family=\"{}, sans-serif\" font-weight=\"{weight}\" font-style=\"{slant}\" fill=\"{}\" xml:space=\"preserve\">{}</text>",
        style.font_size_px,
        escape_xml(&style.font_family),
        style.color,
        escape_xml(text),
    );
}

fn has_family(db: &Database, name: &str) -> bool {
    db.query(&Query {
        families: &[Family::Name(name)],
        ..Query::default()
    })
    .is_some()
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_core::{Point, Rgb};

    fn layer_with(text: &str, underline: bool) -> TextLayer {
        let mut layer = TextLayer::new();
        layer.set_pending_text(text);
        layer.toggle_placement();
        let style = TextStyle {
            underline,
            color: Rgb::new(255, 0, 0),
            ..TextStyle::default()
        };
        layer
            .place(Point::new(10.0, 10.0), &style)
            .expect("placed");
        layer
    }

    #[test]
    fn test_xml_escaping() {
        assert_eq!(escape_xml("A < B & C > D"), "A &lt; B &amp; C &gt; D");
    }

    #[test]
    fn test_text_element_markup() {
        let mut svg = String::new();
        let style = TextStyle {
            bold: true,
            italic: true,
            font_size_px: 10.0,
            ..TextStyle::default()
        };
        write_text_element(&mut svg, "gm <3", 5.0, 0.0, &style);

        assert!(svg.contains("font-weight=\"bold\""));
        assert!(svg.contains("font-style=\"italic\""));
        assert!(svg.contains("font-family=\"Arial, sans-serif\""));
        assert!(svg.contains("fill=\"#000000\""));
        assert!(svg.contains("gm &lt;3"));
        assert!(svg.contains("y=\"8\""));
    }

    #[test]
    fn test_empty_engine_uses_fallback_metrics() {
        let engine = FontEngine::empty();
        let style = TextStyle::default();
        assert_eq!(engine.face_count(), 0);
        assert_eq!(
            engine.measure_width("meme", &style),
            ApproximateMetrics::default().measure_width("meme", &style)
        );
        assert!(engine.measure_width("", &style).abs() < f32::EPSILON);
    }

    #[test]
    fn test_underline_is_drawn_without_fonts() {
        let engine = FontEngine::empty();
        let layer = layer_with("meme", true);
        let mut target = Pixmap::new(200, 100).expect("pixmap");

        TextOverlay::new(&layer, &engine).paint(&mut target);

        // Baseline sits at 10 + 0.88 * 24 = 31.12.
        let px = target.pixel(20, 31).expect("pixel").demultiply();
        assert!(px.alpha() > 0);
        assert_eq!(px.green(), 0);
    }

    #[test]
    fn test_selection_outline_follows_selected_object() {
        let engine = FontEngine::empty();
        let mut layer = layer_with("meme", false);
        let mut target = Pixmap::new(200, 100).expect("pixmap");

        TextOverlay::new(&layer, &engine).paint(&mut target);
        assert!(target.data().iter().all(|&b| b == 0));

        let id = layer.objects()[0].id;
        layer.select(id).expect("select");
        TextOverlay::new(&layer, &engine).paint(&mut target);
        assert!(target.data().iter().any(|&b| b != 0));
    }

    fn tuffy() -> FontEngine {
        let mut engine = FontEngine::empty();
        engine.load_font_file(Path::new(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fonts/Tuffy.ttf"
        )));
        engine
    }

    #[test]
    fn test_sans_serif_falls_back_to_loaded_face() {
        let engine = tuffy();
        assert_eq!(engine.face_count(), 1);
        assert_eq!(engine.sans_serif_family(), "Tuffy");
    }

    #[test]
    fn test_unreadable_font_file_is_skipped() {
        let mut engine = FontEngine::empty();
        engine.load_font_file(Path::new("/nonexistent/font.ttf"));
        assert_eq!(engine.face_count(), 0);
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn test_glyphs_paint_inside_measured_box() {
        let engine = tuffy();
        let layer = layer_with("HELLO", false);
        let mut target = Pixmap::new(300, 100).expect("pixmap");

        TextOverlay::new(&layer, &engine).paint(&mut target);

        let bounds = layer.objects()[0].bounds(&engine);
        assert!(bounds.width > 0.0);

        let width = target.width() as usize;
        let inked: Vec<(f32, f32)> = target
            .pixels()
            .iter()
            .enumerate()
            .filter(|(_, px)| px.alpha() > 0)
            .map(|(i, _)| ((i % width) as f32, (i / width) as f32))
            .collect();
        assert!(!inked.is_empty(), "no glyph pixels painted");
        for (x, y) in inked {
            assert!(
                x >= bounds.x - 2.0
                    && x <= bounds.x + bounds.width + 2.0
                    && y >= bounds.y - 2.0
                    && y <= bounds.y + bounds.height + 2.0,
                "pixel ({x}, {y}) outside {bounds:?}"
            );
        }
    }
}
