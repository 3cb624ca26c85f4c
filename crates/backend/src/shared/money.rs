//! Currency arithmetic. Values are stored as f64 but every calculation runs on `Decimal`.

use rust_decimal::prelude::*;

const DECIMAL_PLACES: u32 = 2;

/// Convert f64 from storage into Decimal
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in money math, using zero");
        Decimal::ZERO
    })
}

/// Round to cents, half away from zero
#[inline]
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert Decimal back to f64 for storage, rounded to cents
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_currency(value).to_f64().unwrap_or_else(|| {
        tracing::error!(value = %value, "Decimal out of f64 range, defaulting to zero");
        0.0
    })
}

/// `amount * percent / 100`, unrounded
#[inline]
pub fn percent_of(amount: Decimal, percent: Decimal) -> Decimal {
    amount * percent / Decimal::ONE_HUNDRED
}
