//! Mint form validation.
//!
//! Prices are decimal strings in the chain's native unit and are converted
//! to wei (18 decimals) with integer arithmetic only.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Decimals of the native currency.
pub const WEI_DECIMALS: u32 = 18;

/// Smallest supply a collection may have.
pub const MIN_SUPPLY: u64 = 2;

/// An amount in wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Wei(pub u128);

impl std::fmt::Display for Wei {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate a price field and convert it to wei.
///
/// Accepts `^\d*\.?\d*$`. Digits past the eighteenth decimal are dropped.
///
/// # Errors
///
/// [`ValidationError::PriceNotNumeric`] for any other character,
/// [`ValidationError::PriceNotPositive`] for empty or zero input and
/// [`ValidationError::PriceTooLarge`] on overflow.
pub fn validate_price(input: &str) -> Result<Wei, ValidationError> {
    let (whole, fraction) = input.split_once('.').unwrap_or((input, ""));
    let numeric = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !numeric(whole) || !numeric(fraction) {
        return Err(ValidationError::PriceNotNumeric);
    }

    let scale = 10u128.pow(WEI_DECIMALS);
    let whole_wei = parse_digits(whole)?
        .checked_mul(scale)
        .ok_or(ValidationError::PriceTooLarge)?;

    let kept = &fraction[..fraction.len().min(WEI_DECIMALS as usize)];
    let padding = WEI_DECIMALS - u32::try_from(kept.len()).unwrap_or(WEI_DECIMALS);
    let fraction_wei = parse_digits(kept)? * 10u128.pow(padding);

    let wei = whole_wei
        .checked_add(fraction_wei)
        .ok_or(ValidationError::PriceTooLarge)?;
    if wei == 0 {
        return Err(ValidationError::PriceNotPositive);
    }
    Ok(Wei(wei))
}

fn parse_digits(digits: &str) -> Result<u128, ValidationError> {
    digits.bytes().try_fold(0u128, |acc, b| {
        acc.checked_mul(10)
            .and_then(|v| v.checked_add(u128::from(b - b'0')))
            .ok_or(ValidationError::PriceTooLarge)
    })
}

/// Validate a total-supply field.
///
/// # Errors
///
/// [`ValidationError::SupplyNotInteger`] for non-digits,
/// [`ValidationError::SupplyTooSmall`] for empty input or values below
/// [`MIN_SUPPLY`].
pub fn validate_supply(input: &str) -> Result<u64, ValidationError> {
    if !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::SupplyNotInteger);
    }
    if input.is_empty() {
        return Err(ValidationError::SupplyTooSmall);
    }
    // All digits: overflow is the only parse failure, and it is ≥ 2.
    let supply = input.parse::<u64>().unwrap_or(u64::MAX);
    if supply < MIN_SUPPLY {
        return Err(ValidationError::SupplyTooSmall);
    }
    Ok(supply)
}

/// Raw mint form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintDraft {
    /// Collection name.
    pub name: String,
    /// Token symbol.
    #[serde(default)]
    pub symbol: String,
    /// Price per token, decimal string.
    pub price: String,
    /// Total supply, integer string.
    pub supply: String,
}

/// A draft that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedDraft {
    /// Collection name, trimmed.
    pub name: String,
    /// Token symbol, trimmed.
    pub symbol: String,
    /// Price per token in wei.
    pub price: Wei,
    /// Total supply.
    pub supply: u64,
}

impl MintDraft {
    /// Validate every field, collecting all errors.
    ///
    /// # Errors
    ///
    /// Returns every failing field's error in form order.
    pub fn validate(&self) -> Result<ValidatedDraft, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::NameRequired);
        }
        let price = validate_price(&self.price).map_err(|e| errors.push(e)).ok();
        let supply = validate_supply(&self.supply).map_err(|e| errors.push(e)).ok();

        match (price, supply) {
            (Some(price), Some(supply)) if errors.is_empty() => Ok(ValidatedDraft {
                name: name.to_string(),
                symbol: self.symbol.trim().to_string(),
                price,
                supply,
            }),
            _ => Err(errors),
        }
    }
}
