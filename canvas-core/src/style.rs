//! Colors and drawing styles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CanvasError, CanvasResult};

/// Smallest pen width the size slider allows.
pub const MIN_PEN_WIDTH: f32 = 1.0;

/// Largest pen width the size slider allows.
pub const MAX_PEN_WIDTH: f32 = 50.0;

/// An opaque RGB color, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Pure white.
    pub const WHITE: Self = Self::new(0xff, 0xff, 0xff);
    /// Pure black.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Create a color from its channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or the short `#rgb` form.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidColor`] for anything else.
    pub fn from_hex(hex: &str) -> CanvasResult<Self> {
        let invalid = || CanvasError::InvalidColor(hex.to_string());
        let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match digits.len() {
            6 => Ok(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let short = |s: &str| channel(s).map(|v| v * 17);
                Ok(Self::new(
                    short(&digits[0..1])?,
                    short(&digits[1..2])?,
                    short(&digits[2..3])?,
                ))
            }
            _ => Err(invalid()),
        }
    }

    /// Format as lowercase `#rrggbb`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Rgb {
    type Error = CanvasError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_hex()
    }
}

/// Pen settings applied to new stroke segments.
///
/// Caps and joins are always round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenStyle {
    /// Ink color.
    pub color: Rgb,
    /// Line width in surface pixels.
    pub width: f32,
}

impl PenStyle {
    /// Create a pen, clamping the width into the slider range.
    #[must_use]
    pub fn new(color: Rgb, width: f32) -> Self {
        Self {
            color,
            width: clamp_pen_width(width),
        }
    }
}

impl Default for PenStyle {
    fn default() -> Self {
        Self {
            color: Rgb::BLACK,
            width: 5.0,
        }
    }
}

/// Clamp a pen width into `MIN_PEN_WIDTH..=MAX_PEN_WIDTH`.
///
/// Non-finite widths fall back to the minimum.
#[must_use]
pub fn clamp_pen_width(width: f32) -> f32 {
    if width.is_finite() {
        width.clamp(MIN_PEN_WIDTH, MAX_PEN_WIDTH)
    } else {
        MIN_PEN_WIDTH
    }
}

/// Font and decoration settings for a text object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct TextStyle {
    /// CSS-style font family name.
    pub font_family: String,
    /// Font size in surface pixels.
    pub font_size_px: f32,
    /// Bold weight.
    pub bold: bool,
    /// Italic slant.
    pub italic: bool,
    /// Underline decoration.
    pub underline: bool,
    /// Fill color.
    pub color: Rgb,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size_px: 24.0,
            bold: false,
            italic: false,
            underline: false,
            color: Rgb::BLACK,
        }
    }
}
