//! Decimal helpers for monetary values.
//!
//! Amounts are carried as `Decimal` through every sum and only rounded when
//! converted to `f64` for presentation.

use rust_decimal::prelude::*;

use crate::error::{EngineError, EngineResult};

const DECIMAL_PLACES: u32 = 2;

/// Largest amount accepted for a single booking or fee (one billion).
/// Sums of such amounts stay far below `Decimal::MAX`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Converts a wire amount, rejecting NaN, infinities and amounts beyond
/// `MAX_AMOUNT`.
pub fn to_decimal(value: f64, field_name: &str, record_id: &str) -> EngineResult<Decimal> {
    if !value.is_finite() {
        return Err(EngineError::BadRequest(format!(
            "{field_name} of {record_id} must be a finite number, got {value}."
        )));
    }
    let amount = Decimal::from_f64(value).ok_or_else(|| {
        EngineError::BadRequest(format!(
            "{field_name} of {record_id} is out of range, got {value}."
        ))
    })?;
    require_amount_in_range(amount, field_name, record_id)?;
    Ok(amount)
}

pub fn require_amount_in_range(
    amount: Decimal,
    field_name: &str,
    record_id: &str,
) -> EngineResult<()> {
    if amount.abs() > MAX_AMOUNT {
        return Err(EngineError::BadRequest(format!(
            "{field_name} of {record_id} exceeds maximum allowed ({MAX_AMOUNT}), got {amount}."
        )));
    }
    Ok(())
}

/// Rounded to cents, for display only.
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// `numerator / denominator * 100`, clamped to [0, 100]; 0 when the
/// denominator is not positive.
pub fn percentage(numerator: i64, denominator: i64) -> f64 {
    if denominator <= 0 || numerator <= 0 {
        return 0.0;
    }
    let rate = (numerator as f64) / (denominator as f64) * 100.0;
    round2(rate.min(100.0))
}

/// Amount per unit (ADR, RevPAR); zero when there are no units.
pub fn per_unit(amount: Decimal, units: i64) -> Decimal {
    if units <= 0 {
        return Decimal::ZERO;
    }
    amount / Decimal::from(units)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
