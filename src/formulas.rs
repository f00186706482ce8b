//! Scalar body-composition formulas and range predicates
//!
//! Everything here is a pure function over `f64`. Division by zero is not
//! guarded: it yields the usual non-finite IEEE results, which callers treat
//! as "cannot display" at the presentation boundary.
//!
//! # Example
//!
//! ```rust
//! use bodytrack::formulas::{bmi, is_in_range, skeletal_muscle_range};
//!
//! let value = bmi(70.0, 175.0);
//! assert!(is_in_range(value, &[18.5, 24.0]));
//!
//! let band = skeletal_muscle_range(70.0);
//! assert_eq!(band.as_bounds(), [28.0, 35.0]);
//! ```

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::ReferenceRange;

/// Lower bound of the skeletal muscle band as a fraction of body weight
pub const SKELETAL_MUSCLE_LOW_RATIO: f64 = 0.4;

/// Upper bound of the skeletal muscle band as a fraction of body weight
pub const SKELETAL_MUSCLE_HIGH_RATIO: f64 = 0.5;

/// Closed-interval membership.
///
/// A range with fewer than two bounds, or with `low > high`, gives no verdict
/// and is reported as `false` rather than an error.
pub fn is_in_range(value: f64, range: &[f64]) -> bool {
    match range {
        [low, high, ..] => low <= high && value >= *low && value <= *high,
        _ => false,
    }
}

/// Body fat as a percentage of total weight
pub fn body_fat_percentage(body_fat_mass: f64, weight: f64) -> f64 {
    body_fat_mass / weight * 100.0
}

/// Body mass index from weight (kg) and height (cm)
pub fn bmi(weight: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight / (height_m * height_m)
}

/// Normative skeletal muscle band, 40-50% of the current body weight.
///
/// Unlike the profile ranges this band moves with the record's weight.
pub fn skeletal_muscle_range(weight: f64) -> ReferenceRange {
    ReferenceRange::new(
        round_dp(weight * SKELETAL_MUSCLE_LOW_RATIO, 2),
        round_dp(weight * SKELETAL_MUSCLE_HIGH_RATIO, 2),
    )
}

fn to_rounded_decimal(value: f64, dp: u32) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero))
}

/// Round to `dp` decimal places, halves away from zero (fixed-point display rounding).
///
/// Non-finite values, and values outside the decimal range, pass through untouched.
/// The input is first taken at its shortest decimal form, so a binary value
/// just below a tie (1.005 is stored as 1.00499...) rounds up to 1.01, where
/// rounding the exact binary value would give 1.00.
pub fn round_dp(value: f64, dp: u32) -> f64 {
    to_rounded_decimal(value, dp)
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// Fixed-point text with exactly `dp` decimals, or `None` when the value is not displayable
pub fn format_fixed(value: f64, dp: u32) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    let precision = dp as usize;
    Some(match to_rounded_decimal(value, dp) {
        Some(d) => format!("{:.*}", precision, d),
        None => format!("{:.*}", precision, value),
    })
}

/// Display text for a value: fixed-point when `decimal_places` is set,
/// shortest round-trip form otherwise
pub fn format_value(value: f64, decimal_places: Option<u32>) -> Option<String> {
    match decimal_places {
        Some(dp) => format_fixed(value, dp),
        None if value.is_finite() => Some(value.to_string()),
        None => None,
    }
}
