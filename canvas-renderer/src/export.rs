//! Raster export.
//!
//! Encodes the composite to JPEG (the default, quality 70) or PNG and wraps
//! the result so callers can hand it on as bytes or a data URI.

use base64::Engine;
use image::ImageEncoder;
use tiny_skia::Pixmap;

use crate::error::{RenderError, RenderResult};

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// PNG image.
    Png,
    /// JPEG image.
    #[default]
    Jpeg,
}

impl ExportFormat {
    /// MIME type of the encoded bytes.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Conventional file extension.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

/// Configuration for image export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Output format.
    pub format: ExportFormat,
    /// JPEG quality 1-100 (default: 70).
    pub jpeg_quality: u8,
    /// Color behind transparent pixels when flattening for JPEG.
    pub matte: [u8; 3],
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Jpeg,
            jpeg_quality: 70,
            matte: [255, 255, 255],
        }
    }
}

/// An encoded frame of the composite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Format of `bytes`.
    pub format: ExportFormat,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Encoded file contents.
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    /// MIME type of the encoded bytes.
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Base64 `data:` URI of the image.
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type(),
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Encodes pixmaps according to an [`ExportConfig`].
#[derive(Debug, Clone, Default)]
pub struct ImageExporter {
    config: ExportConfig,
}

impl ImageExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Encode a pixmap in the configured format.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Encode`] if the encoder fails.
    pub fn encode(&self, pixmap: &Pixmap) -> RenderResult<EncodedImage> {
        let bytes = match self.config.format {
            ExportFormat::Png => Self::encode_png(pixmap)?,
            ExportFormat::Jpeg => self.encode_jpeg(pixmap)?,
        };

        Ok(EncodedImage {
            format: self.config.format,
            width: pixmap.width(),
            height: pixmap.height(),
            bytes,
        })
    }

    fn encode_png(pixmap: &Pixmap) -> RenderResult<Vec<u8>> {
        pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}")))
    }

    /// Flatten premultiplied pixels over the matte and encode as JPEG.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn encode_jpeg(&self, pixmap: &Pixmap) -> RenderResult<Vec<u8>> {
        let (width, height) = (pixmap.width(), pixmap.height());
        let matte = &self.config.matte;
        let mut rgb_data = Vec::with_capacity((width * height * 3) as usize);
        for pixel in pixmap.data().chunks_exact(4) {
            let inv = 1.0 - f32::from(pixel[3]) / 255.0;
            for (&channel, &under) in pixel[..3].iter().zip(matte) {
                let value = f32::from(under).mul_add(inv, f32::from(channel));
                rgb_data.push(value.round().clamp(0.0, 255.0) as u8);
            }
        }

        let quality = self.config.jpeg_quality.clamp(1, 100);
        let mut buf = std::io::Cursor::new(Vec::new());
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
        encoder
            .write_image(&rgb_data, width, height, image::ExtendedColorType::Rgb8)
            .map_err(|e| RenderError::Encode(format!("JPEG encoding failed: {e}")))?;

        Ok(buf.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::Color;

    fn solid(side: u32, color: Color) -> Pixmap {
        let mut pixmap = Pixmap::new(side, side).expect("pixmap");
        pixmap.fill(color);
        pixmap
    }

    #[test]
    fn test_default_is_jpeg_quality_70() {
        let config = ExportConfig::default();
        assert_eq!(config.format, ExportFormat::Jpeg);
        assert_eq!(config.jpeg_quality, 70);
    }

    #[test]
    fn test_jpeg_export_produces_valid_bytes() {
        let exporter = ImageExporter::default();
        let image = exporter
            .encode(&solid(32, Color::from_rgba8(200, 10, 10, 255)))
            .expect("jpeg export");

        assert_eq!(image.mime_type(), "image/jpeg");
        assert_eq!((image.width, image.height), (32, 32));
        assert_eq!(&image.bytes[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_png_export_produces_valid_bytes() {
        let exporter = ImageExporter::new(ExportConfig {
            format: ExportFormat::Png,
            ..ExportConfig::default()
        });
        let image = exporter
            .encode(&solid(8, Color::TRANSPARENT))
            .expect("png export");

        assert_eq!(&image.bytes[0..4], &[137, 80, 78, 71]);
        assert_eq!(image.format.extension(), "png");
    }

    #[test]
    fn test_transparent_jpeg_is_flattened_onto_matte() {
        let exporter = ImageExporter::new(ExportConfig {
            matte: [0, 0, 0],
            jpeg_quality: 100,
            ..ExportConfig::default()
        });
        let image = exporter
            .encode(&solid(16, Color::TRANSPARENT))
            .expect("jpeg export");

        let decoded = image::load_from_memory(&image.bytes)
            .expect("decodes")
            .to_rgb8();
        let px = decoded.get_pixel(8, 8);
        assert!(px.0.iter().all(|&c| c < 8), "expected black, got {px:?}");
    }

    #[test]
    fn test_data_uri_prefix() {
        let image = EncodedImage {
            format: ExportFormat::Png,
            width: 1,
            height: 1,
            bytes: vec![1, 2, 3],
        };
        assert_eq!(image.to_data_uri(), "data:image/png;base64,AQID");
    }
}
