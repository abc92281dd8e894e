//! Token amounts in the chain's base unit, with display-unit conversion.
//!
//! On-chain prices and transaction values are stored and transmitted in the
//! smallest indivisible unit of the native currency (wei). Humans see the
//! display unit (tRBTC), a fixed power-of-ten multiple. Conversion happens
//! only at the edges: parsing user input and rendering.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decimal places between the base unit and the display unit.
pub const DISPLAY_DECIMALS: u32 = 18;

/// Errors from token amount conversion or arithmetic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    /// The amount does not fit the supported numeric range.
    #[error("amount overflows the supported range")]
    Overflow,

    /// The input string is not a decimal number.
    #[error("invalid amount: {0}")]
    Invalid(String),

    /// More fractional digits than the base unit can represent.
    #[error("amount has more than {DISPLAY_DECIMALS} decimal places")]
    TooPrecise,

    /// Negative amounts have no meaning on this chain.
    #[error("amount must not be negative")]
    Negative,
}

/// An amount of the chain's native currency, held in base units.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct TokenAmount(u128);

impl TokenAmount {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Create an amount from base units (wei).
    #[must_use]
    pub const fn from_base_units(base_units: u128) -> Self {
        Self(base_units)
    }

    /// The raw value in base units.
    #[must_use]
    pub const fn base_units(&self) -> u128 {
        self.0
    }

    /// True for the zero amount.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition in base units.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(sum) => Some(Self(sum)),
            None => None,
        }
    }

    /// Convert to the display unit as a decimal with trailing zeros trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Overflow`] if the value exceeds the decimal
    /// range (amounts above roughly 1.7e38 base units).
    pub fn to_display(&self) -> Result<Decimal, AmountError> {
        let mantissa = i128::try_from(self.0).map_err(|_| AmountError::Overflow)?;
        Decimal::try_from_i128_with_scale(mantissa, DISPLAY_DECIMALS)
            .map(|d| d.normalize())
            .map_err(|_| AmountError::Overflow)
    }

    /// Parse a user-entered display-unit amount (e.g. `"1.5"`) into base
    /// units.
    ///
    /// # Errors
    ///
    /// Returns an error for non-numeric input, negative values, more than
    /// [`DISPLAY_DECIMALS`] fractional digits, or values that overflow the
    /// base-unit range.
    pub fn from_display_str(input: &str) -> Result<Self, AmountError> {
        let amount: Decimal = input
            .trim()
            .parse()
            .map_err(|_| AmountError::Invalid(input.trim().to_string()))?;

        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(AmountError::Negative);
        }

        let normalized = amount.normalize();
        let scale = normalized.scale();
        if scale > DISPLAY_DECIMALS {
            return Err(AmountError::TooPrecise);
        }

        let mantissa =
            u128::try_from(normalized.mantissa()).map_err(|_| AmountError::Negative)?;
        let factor = 10u128
            .checked_pow(DISPLAY_DECIMALS - scale)
            .ok_or(AmountError::Overflow)?;
        mantissa
            .checked_mul(factor)
            .map(Self)
            .ok_or(AmountError::Overflow)
    }
}

impl fmt::Display for TokenAmount {
    /// Renders the display-unit value; falls back to raw base units for
    /// amounts beyond the decimal range.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_display() {
            Ok(display) => write!(f, "{display}"),
            Err(_) => write!(f, "{} wei", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn test_to_display_whole_unit() {
        let amount = TokenAmount::from_base_units(ONE);
        assert_eq!(amount.to_display().unwrap().to_string(), "1");
    }

    #[test]
    fn test_to_display_fractional() {
        let amount = TokenAmount::from_base_units(ONE / 2);
        assert_eq!(amount.to_display().unwrap().to_string(), "0.5");
    }

    #[test]
    fn test_display_trims_trailing_zeros() {
        let amount = TokenAmount::from_base_units(1_500_000_000_000_000_000);
        assert_eq!(amount.to_string(), "1.5");
    }

    #[test]
    fn test_from_display_str_whole() {
        assert_eq!(
            TokenAmount::from_display_str("2").unwrap().base_units(),
            2 * ONE
        );
    }

    #[test]
    fn test_from_display_str_fractional() {
        assert_eq!(
            TokenAmount::from_display_str("1.5").unwrap().base_units(),
            1_500_000_000_000_000_000
        );
    }

    #[test]
    fn test_from_display_str_small() {
        assert_eq!(
            TokenAmount::from_display_str("0.00000001")
                .unwrap()
                .base_units(),
            10_000_000_000
        );
    }

    #[test]
    fn test_from_display_str_rejects_garbage() {
        assert!(matches!(
            TokenAmount::from_display_str("abc"),
            Err(AmountError::Invalid(_))
        ));
    }

    #[test]
    fn test_from_display_str_rejects_negative() {
        assert_eq!(
            TokenAmount::from_display_str("-1"),
            Err(AmountError::Negative)
        );
    }

    #[test]
    fn test_from_display_str_rejects_excess_precision() {
        assert_eq!(
            TokenAmount::from_display_str("0.0000000000000000001"),
            Err(AmountError::TooPrecise)
        );
    }

    #[test]
    fn test_roundtrip_through_display() {
        let amount = TokenAmount::from_display_str("123.456").unwrap();
        assert_eq!(amount.to_string(), "123.456");
    }

    #[test]
    fn test_checked_add_overflow() {
        let max = TokenAmount::from_base_units(u128::MAX);
        assert!(max.checked_add(TokenAmount::from_base_units(1)).is_none());
    }
}
