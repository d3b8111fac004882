//! Lossless conversion between decimal amounts and the mantissa/exponent pair
//! they are stored as.
//!
//! A stored amount is the integer `mantissa` scaled by `10^exponent`. Encoding
//! keeps the exact digits and scale of the decimal, so `1234.50` is stored as
//! `123450e-2` rather than being normalised to `12345e-1`.

use std::fmt::Display;

use rust_decimal::Decimal;

/// The largest scale (number of fractional digits) a [Decimal] can hold.
const MAX_SCALE: u32 = 28;

/// Errors that occur when turning a stored amount back into a decimal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    /// The stored mantissa is not a base-10 integer.
    #[error("the stored mantissa \"{0}\" is not an integer")]
    InvalidMantissa(String),

    /// The stored amount needs more precision or range than a decimal provides.
    ///
    /// The amount is rejected instead of being rounded.
    #[error("the stored amount {0} is outside the supported decimal range")]
    OutOfRange(String),
}

/// A monetary amount in its persisted form: `mantissa * 10^exponent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredAmount {
    /// The significand, including the sign of the amount.
    pub mantissa: i128,
    /// The base-10 exponent, zero or negative for amounts created by [encode].
    pub exponent: i32,
}

impl StoredAmount {
    /// Build a stored amount from the textual mantissa kept in the database.
    ///
    /// # Errors
    ///
    /// Returns [MoneyError::InvalidMantissa] if `mantissa` is not an integer
    /// that fits in 128 bits.
    pub fn from_parts(mantissa: &str, exponent: i32) -> Result<Self, MoneyError> {
        let mantissa = mantissa
            .trim()
            .parse()
            .map_err(|_| MoneyError::InvalidMantissa(mantissa.to_owned()))?;

        Ok(Self { mantissa, exponent })
    }
}

/// Formats as `"<mantissa>e<exponent>"`, or just `"<mantissa>"` when the
/// exponent is zero.
impl Display for StoredAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.exponent == 0 {
            write!(f, "{}", self.mantissa)
        } else {
            write!(f, "{}e{}", self.mantissa, self.exponent)
        }
    }
}

/// Split `value` into its mantissa and exponent without changing its digits
/// or scale.
pub fn encode(value: Decimal) -> StoredAmount {
    // The scale of a decimal never exceeds 28, so the cast cannot wrap.
    let exponent = -(value.scale() as i32);

    StoredAmount {
        mantissa: value.mantissa(),
        exponent,
    }
}

/// Rebuild the decimal `stored.mantissa * 10^stored.exponent`.
///
/// # Errors
///
/// Returns [MoneyError::OutOfRange] if the amount cannot be represented
/// exactly as a [Decimal].
pub fn decode(stored: StoredAmount) -> Result<Decimal, MoneyError> {
    let out_of_range = || MoneyError::OutOfRange(stored.to_string());

    if stored.exponent > 0 {
        let value = 10_i128
            .checked_pow(stored.exponent.unsigned_abs())
            .and_then(|factor| stored.mantissa.checked_mul(factor))
            .ok_or_else(out_of_range)?;

        return Decimal::try_from_i128_with_scale(value, 0).map_err(|_| out_of_range());
    }

    let mut mantissa = stored.mantissa;
    let mut scale = stored.exponent.unsigned_abs();

    // Dropping trailing zeros is lossless and may bring the scale into range.
    while scale > MAX_SCALE && mantissa % 10 == 0 {
        mantissa /= 10;
        scale -= 1;
    }

    Decimal::try_from_i128_with_scale(mantissa, scale).map_err(|_| out_of_range())
}

/// Decode an amount that may be missing from storage.
///
/// A missing amount decodes to zero; callers that require an amount must
/// check for `None` themselves.
///
/// # Errors
///
/// Returns the same errors as [decode].
pub fn decode_or_zero(stored: Option<StoredAmount>) -> Result<Decimal, MoneyError> {
    match stored {
        Some(stored) => decode(stored),
        None => Ok(Decimal::ZERO),
    }
}
