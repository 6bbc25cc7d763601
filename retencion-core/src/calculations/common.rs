//! Common utility functions for withholding calculations.
//!
//! Rounding helpers are for presentation only: the engine itself carries full
//! `Decimal` precision from input to result.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Used for UVT figures and percentages.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use retencion_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(195.4691)), dec!(195.47));
/// assert_eq!(round_half_up(dec!(22.735)), dec!(22.74));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a peso amount to whole pesos using half-up rounding.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use retencion_core::calculations::common::round_pesos;
///
/// assert_eq!(round_pesos(dec!(1190531.5)), dec!(1190532));
/// assert_eq!(round_pesos(dec!(1190531.49)), dec!(1190531));
/// ```
pub fn round_pesos(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Floors a value at zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use retencion_core::calculations::common::floor_zero;
///
/// assert_eq!(floor_zero(dec!(-350000)), dec!(0));
/// assert_eq!(floor_zero(dec!(350000)), dec!(350000));
/// ```
pub fn floor_zero(value: Decimal) -> Decimal {
    if value > Decimal::ZERO { value } else { Decimal::ZERO }
}
