//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// How an error should be surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad or missing user input; shown inline, nothing changes.
    Input,
    /// Image read/decode/encode failure; shown inline, background unchanged.
    Codec,
    /// Missing surface or torn-down component; silently ignored.
    Environment,
}

/// Errors that can occur during rendering and image handling.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No background file was chosen.
    #[error("No file selected")]
    NoFileSelected,

    /// The chosen file could not be read.
    #[error("Failed to read file: {0}")]
    FileRead(String),

    /// The file is not a decodable image.
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Drawing the image into the intermediate surface failed.
    #[error("Failed to draw image: {0}")]
    Draw(String),

    /// Re-encoding a raster failed.
    #[error("Failed to encode image: {0}")]
    Encode(String),

    /// The re-encoded image could not be loaded back.
    #[error("Failed to reload image: {0}")]
    Reload(String),

    /// A pixel surface could not be allocated.
    #[error("Surface unavailable: {0}")]
    Surface(String),

    /// The component was unmounted.
    #[error("Canvas is unmounted")]
    Unmounted,
}

impl RenderError {
    /// Classify the error for presentation.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NoFileSelected => ErrorCategory::Input,
            Self::FileRead(_)
            | Self::Decode(_)
            | Self::Draw(_)
            | Self::Encode(_)
            | Self::Reload(_) => ErrorCategory::Codec,
            Self::Surface(_) | Self::Unmounted => ErrorCategory::Environment,
        }
    }

    /// Short message suitable for the inline error line.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoFileSelected => "No file selected.",
            Self::FileRead(_) => "Failed to read file.",
            Self::Decode(_) => "Failed to load image.",
            Self::Draw(_) | Self::Encode(_) => "Failed to resize image.",
            Self::Reload(_) => "Failed to load resized image.",
            Self::Surface(_) => "Canvas context not supported.",
            Self::Unmounted => "Canvas is not available.",
        }
    }
}
