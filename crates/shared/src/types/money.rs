//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All monetary amounts are `rust_decimal::Decimal` values denominated in
//! the society's currency and rounded to its minor unit (2 decimal places).

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Number of minor-unit decimal places (e.g., kobo in a naira amount).
pub const MINOR_UNIT_PLACES: u32 = 2;

/// Rounds an amount to the currency minor unit using round-half-up.
///
/// Half-up is the posting rule for member-facing charges: 0.005 rounds to
/// 0.01, away from zero.
#[must_use]
pub fn round_minor_unit(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MINOR_UNIT_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns true if the amount is a valid money movement: strictly
/// positive and already at minor-unit precision.
#[must_use]
pub fn is_valid_amount(amount: Decimal) -> bool {
    amount > Decimal::ZERO && amount == round_minor_unit(amount)
}
