//! Background layer: a solid color plus an optional ingested image.
//!
//! Ingestion runs in stages so that each failure maps to its own user-facing
//! message:
//!
//! 1. read the bytes (file, memory or data URI)
//! 2. decode them as an image
//! 3. draw the image stretched onto a canvas-sized square
//! 4. re-encode that square as PNG
//! 5. load the PNG back as the background raster
//!
//! A failure at any stage leaves the current background untouched.

use std::borrow::Cow;
use std::path::Path;

use canvas_core::Rgb;
use image::{codecs::png::PngEncoder, imageops::FilterType, ExtendedColorType, ImageEncoder};
use tiny_skia::Pixmap;

use crate::error::{RenderError, RenderResult};

/// Image container formats recognised by their magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// GIF (first frame only).
    Gif,
    /// WebP.
    WebP,
    /// Windows bitmap.
    Bmp,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from MIME type.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        match mime.to_lowercase().as_str() {
            "image/png" => Self::Png,
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/gif" => Self::Gif,
            "image/webp" => Self::WebP,
            "image/bmp" => Self::Bmp,
            _ => Self::Unknown,
        }
    }

    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        if data.starts_with(b"GIF8") {
            return Self::Gif;
        }

        if data.starts_with(b"BM") {
            return Self::Bmp;
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }

        Self::Unknown
    }
}

/// Where a background image comes from.
#[derive(Debug, Clone, Copy)]
pub enum ImageSource<'a> {
    /// A file on disk.
    Path(&'a Path),
    /// Raw file contents already in memory.
    Bytes(&'a [u8]),
    /// A `data:` URI, base64 or percent-encoded.
    DataUri(&'a str),
}

/// A background image already fitted to the canvas square.
#[derive(Debug, Clone)]
pub struct BackgroundImage {
    pixmap: Pixmap,
    format: ImageFormat,
}

impl BackgroundImage {
    /// Fitted raster.
    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Format of the file the image was ingested from.
    #[must_use]
    pub fn source_format(&self) -> ImageFormat {
        self.format
    }

    /// Side length the image was fitted to.
    #[must_use]
    pub fn side(&self) -> u32 {
        self.pixmap.width()
    }
}

/// The bottom layer of the composite.
#[derive(Debug, Clone)]
pub struct Background {
    color: Rgb,
    image: Option<BackgroundImage>,
}

impl Default for Background {
    fn default() -> Self {
        Self::new(Rgb::WHITE)
    }
}

impl Background {
    /// Solid background with no image.
    #[must_use]
    pub fn new(color: Rgb) -> Self {
        Self { color, image: None }
    }

    /// Fill color.
    #[must_use]
    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Change the fill color.
    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    /// Current image, if one was ingested.
    #[must_use]
    pub fn image(&self) -> Option<&BackgroundImage> {
        self.image.as_ref()
    }

    /// Install a new image, replacing any previous one.
    pub fn set_image(&mut self, image: BackgroundImage) {
        self.image = Some(image);
    }

    /// Drop the image, keeping the fill color.
    pub fn clear_image(&mut self) -> bool {
        self.image.take().is_some()
    }
}

/// Run the full ingestion pipeline for a canvas of `side` pixels.
///
/// # Errors
///
/// Returns the stage-specific [`RenderError`]; see [`RenderError::user_message`].
pub fn ingest(source: Option<ImageSource<'_>>, side: u32) -> RenderResult<BackgroundImage> {
    let source = source.ok_or(RenderError::NoFileSelected)?;
    let bytes = read_source(source)?;
    let format = ImageFormat::from_magic_bytes(&bytes);

    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| RenderError::Decode(e.to_string()))?;
    tracing::debug!(
        "Decoded {:?} background {}x{}",
        format,
        decoded.width(),
        decoded.height()
    );

    if side == 0 {
        return Err(RenderError::Draw("canvas has no area".to_string()));
    }
    let fitted = image::imageops::resize(&decoded.to_rgba8(), side, side, FilterType::Triangle);

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(fitted.as_raw(), side, side, ExtendedColorType::Rgba8)
        .map_err(|e| RenderError::Encode(e.to_string()))?;

    let pixmap = Pixmap::decode_png(&png).map_err(|e| RenderError::Reload(e.to_string()))?;

    tracing::info!("Background image ingested at {side}px ({} bytes)", bytes.len());
    Ok(BackgroundImage { pixmap, format })
}

fn read_source(source: ImageSource<'_>) -> RenderResult<Cow<'_, [u8]>> {
    match source {
        ImageSource::Path(path) => std::fs::read(path)
            .map(Cow::Owned)
            .map_err(|e| RenderError::FileRead(format!("{}: {e}", path.display()))),
        ImageSource::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
        ImageSource::DataUri(uri) => decode_data_uri(uri).map(Cow::Owned),
    }
}

/// Extract the payload of a data URI.
///
/// Supports formats like: `data:image/png;base64,iVBORw0KGgo...`
///
/// # Errors
///
/// Returns [`RenderError::FileRead`] if the URI is malformed.
pub fn decode_data_uri(uri: &str) -> RenderResult<Vec<u8>> {
    let uri_data = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::FileRead("Not a data URI".to_string()))?;

    let (metadata, encoded_data) = uri_data
        .split_once(',')
        .ok_or_else(|| RenderError::FileRead("Invalid data URI: missing comma".to_string()))?;

    if metadata.contains(";base64") {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(encoded_data)
            .map_err(|e| RenderError::FileRead(format!("Failed to decode base64: {e}")))
    } else {
        percent_decode(encoded_data)
    }
}

fn percent_decode(input: &str) -> RenderResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = input
                .get(i + 1..i + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| RenderError::FileRead("Invalid URL encoding".to_string()))?;
            result.push(byte);
            i += 3;
        } else {
            result.push(bytes[i]);
            i += 1;
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .expect("encode");
        buf
    }

    #[test]
    fn test_format_detection_from_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            ImageFormat::Png
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            ImageFormat::Jpeg
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a"), ImageFormat::Gif);
        assert_eq!(
            ImageFormat::from_magic_bytes(b"RIFF\x00\x00\x00\x00WEBP"),
            ImageFormat::WebP
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"hello"), ImageFormat::Unknown);
    }

    #[test]
    fn test_format_detection_from_mime() {
        assert_eq!(ImageFormat::from_mime("image/PNG"), ImageFormat::Png);
        assert_eq!(ImageFormat::from_mime("image/jpg"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_mime("text/plain"), ImageFormat::Unknown);
    }

    #[test]
    fn test_missing_source_is_input_error() {
        let err = ingest(None, 300).expect_err("no source");
        assert!(matches!(err, RenderError::NoFileSelected));
        assert_eq!(err.user_message(), "No file selected.");
    }

    #[test]
    fn test_non_image_bytes_fail_decode() {
        let err = ingest(Some(ImageSource::Bytes(b"just some text")), 300).expect_err("text");
        assert_eq!(err.user_message(), "Failed to load image.");
    }

    #[test]
    fn test_unreadable_path_fails_read() {
        let err = ingest(
            Some(ImageSource::Path(Path::new("/nonexistent/meme.png"))),
            300,
        )
        .expect_err("missing file");
        assert_eq!(err.user_message(), "Failed to read file.");
    }

    #[test]
    fn test_image_is_stretched_to_canvas() {
        let bytes = png_bytes(40, 10, [255, 0, 0, 255]);
        let image = ingest(Some(ImageSource::Bytes(&bytes)), 120).expect("ingest");

        assert_eq!(image.side(), 120);
        assert_eq!(image.pixmap().height(), 120);
        assert_eq!(image.source_format(), ImageFormat::Png);

        let corner = image.pixmap().pixel(119, 119).expect("pixel").demultiply();
        assert_eq!((corner.red(), corner.green(), corner.alpha()), (255, 0, 255));
    }

    #[test]
    fn test_data_uri_parsing() {
        let png_base64 = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";
        let data_uri = format!("data:image/png;base64,{png_base64}");

        let bytes = decode_data_uri(&data_uri).expect("valid data uri");
        assert_eq!(ImageFormat::from_magic_bytes(&bytes), ImageFormat::Png);

        let image = ingest(Some(ImageSource::DataUri(&data_uri)), 10).expect("ingest");
        assert_eq!(image.side(), 10);
    }

    #[test]
    fn test_invalid_data_uri() {
        assert!(decode_data_uri("not a data uri").is_err());
        assert!(decode_data_uri("data:image/png").is_err());
        assert!(decode_data_uri("data:text/plain,%zz").is_err());
        assert_eq!(
            decode_data_uri("data:text/plain,a%20b").expect("decodes"),
            b"a b".to_vec()
        );
    }

    #[test]
    fn test_clear_image_keeps_color() {
        let bytes = png_bytes(2, 2, [0, 0, 0, 255]);
        let mut background = Background::new(Rgb::new(1, 2, 3));
        background.set_image(ingest(Some(ImageSource::Bytes(&bytes)), 4).expect("ingest"));

        assert!(background.clear_image());
        assert!(!background.clear_image());
        assert_eq!(background.color(), Rgb::new(1, 2, 3));
    }
}
