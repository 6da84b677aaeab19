//! NFT metadata document.

use serde::{Deserialize, Serialize};

use crate::error::{MintError, MintResult};

/// The JSON document a token's metadata URI points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftMetadata {
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Image location: a gateway URL or a `data:` URI.
    pub image: String,
}

impl NftMetadata {
    /// Build metadata for a freshly drawn meme.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            image: image.into(),
        }
    }

    /// Serialize as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`MintError::Json`] if serialization fails.
    pub fn to_json(&self) -> MintResult<String> {
        serde_json::to_string_pretty(self).map_err(MintError::from)
    }

    /// Parse a metadata document. Unknown fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`MintError::Json`] if the document is malformed or lacks
    /// `name`/`image`.
    pub fn from_json(json: &str) -> MintResult<Self> {
        serde_json::from_str(json).map_err(MintError::from)
    }
}
