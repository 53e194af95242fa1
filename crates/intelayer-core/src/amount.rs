//! USD amount scaling.
//!
//! Amounts travel on the wire as integers in micro-units (6 decimals). The
//! conversion is exact: inputs with more precision are rejected rather than
//! rounded, since a rounded amount would be signed as something the caller
//! never asked for.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{CoreError, Result};
use crate::protocol::USD_DECIMALS;

/// Scale a signed USD amount to micro-units.
///
/// # Errors
/// Returns `CoreError::InvalidAmount` if the amount has more than 6
/// fractional digits or does not fit in an `i64` once scaled.
pub fn to_micros(amount: Decimal) -> Result<i64> {
    let normalized = amount.normalize();
    if normalized.scale() > USD_DECIMALS {
        return Err(CoreError::InvalidAmount(format!(
            "{amount} has more than {USD_DECIMALS} decimal places"
        )));
    }

    normalized
        .checked_mul(Decimal::from(10_i64.pow(USD_DECIMALS)))
        .and_then(|scaled| scaled.to_i64())
        .ok_or_else(|| CoreError::InvalidAmount(format!("{amount} is out of range")))
}

/// Scale a non-negative USD amount to micro-units.
///
/// # Errors
/// Returns `CoreError::InvalidAmount` for negative amounts, and for the same
/// precision and range failures as [`to_micros`].
pub fn usd_to_micros(amount: Decimal) -> Result<u64> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(CoreError::InvalidAmount(format!("{amount} is negative")));
    }
    let micros = to_micros(amount)?;
    u64::try_from(micros).map_err(|_| CoreError::InvalidAmount(format!("{amount} is negative")))
}
