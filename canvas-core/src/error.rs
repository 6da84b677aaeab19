//! Error types for canvas operations.

use thiserror::Error;

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in canvas operations.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// A color string was not `#rgb` or `#rrggbb`.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Surface dimensions were zero or otherwise unusable.
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSize {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// A text object id does not exist in the layer.
    #[error("Text object not found: {0}")]
    TextObjectNotFound(u64),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
