//! Mint error types.

use thiserror::Error;

/// Result type for mint operations.
pub type MintResult<T> = Result<T, MintError>;

/// A rejected mint form field. The display text is shown inline next to
/// the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Name is blank.
    #[error("Name is required")]
    NameRequired,
    /// Price is empty or zero.
    #[error("Price must be greater than 0")]
    PriceNotPositive,
    /// Price contains something other than digits and one decimal point.
    #[error("Only numeric values allowed")]
    PriceNotNumeric,
    /// Price does not fit in wei.
    #[error("Price is too large")]
    PriceTooLarge,
    /// Supply is empty or below two.
    #[error("Supply must be an integer ≥ 2")]
    SupplyTooSmall,
    /// Supply contains something other than digits.
    #[error("Only whole numbers allowed")]
    SupplyNotInteger,
}

/// Errors raised by the mint contract.
#[derive(Debug, Error)]
pub enum MintError {
    /// A form field failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The RPC endpoint URL is invalid.
    #[error("invalid RPC URL: {0}")]
    InvalidUrl(String),

    /// HTTP layer failed (connection, timeout, etc.).
    #[error("RPC HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed unexpectedly.
    #[error("failed to parse payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The node returned a JSON-RPC error.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Human readable error message.
        message: String,
    },

    /// The response did not match the expected structure.
    #[error("unexpected RPC response: {0}")]
    UnexpectedResponse(String),

    /// No receipt appeared within the polling budget.
    #[error("Mint transaction receipt not found after {attempts} retries. Check: {explorer_url}")]
    ReceiptNotFound {
        /// Attempts made.
        attempts: u32,
        /// Explorer link for the transaction.
        explorer_url: String,
    },

    /// The transaction was mined but reverted.
    #[error("Mint transaction reverted.")]
    Reverted {
        /// Transaction hash.
        tx_hash: String,
    },

    /// A record with the same key already exists.
    #[error("NFT with this ca already exists: {0}")]
    Conflict(String),

    /// A required record field is missing.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

impl MintError {
    /// Returns true if polling again may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::UnexpectedResponse(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ValidationError::PriceNotPositive.to_string(),
            "Price must be greater than 0"
        );
        assert_eq!(
            ValidationError::SupplyTooSmall.to_string(),
            "Supply must be an integer ≥ 2"
        );
        assert_eq!(
            MintError::from(ValidationError::SupplyNotInteger).to_string(),
            "Only whole numbers allowed"
        );
    }

    #[test]
    fn test_receipt_not_found_names_explorer() {
        let err = MintError::ReceiptNotFound {
            attempts: 10,
            explorer_url: "https://explorer.example/tx/0xabc".into(),
        };
        assert!(err.to_string().contains("after 10 retries"));
        assert!(err.to_string().ends_with("https://explorer.example/tx/0xabc"));
        assert!(!err.is_retryable());
    }
}
