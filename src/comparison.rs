//! Period-over-period comparison of a single metric
//!
//! Colours are deliberately metric-agnostic: every increase is rendered in the
//! alert tone and every decrease in the good tone, even for metrics such as
//! muscle mass where a rise is usually welcome.

use serde::{Deserialize, Serialize};

use crate::formulas::format_fixed;

/// Deltas smaller than this are floating-point noise from stored decimals, not change
pub const UNCHANGED_THRESHOLD: f64 = 0.001;

/// Below this magnitude a delta is shown with three decimals instead of two
pub const FINE_DELTA_THRESHOLD: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increase,
    Decrease,
}

impl Direction {
    pub fn tone(&self) -> Tone {
        match self {
            Direction::Increase => Tone::Alert,
            Direction::Decrease => Tone::Good,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Increase => "↑",
            Direction::Decrease => "↓",
        }
    }
}

/// Semantic colour of a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Alert,
    Good,
}

impl Tone {
    pub fn color(&self) -> &'static str {
        match self {
            Tone::Alert => "#cf1322",
            Tone::Good => "#3f8600",
        }
    }
}

/// Signed change of a metric against the immediately preceding record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub delta: f64,
    pub direction: Direction,
    pub tone: Tone,
    /// e.g. `+1.20kg`, `-0.010kg`
    pub display_text: String,
}

/// Compare `current` against `previous`.
///
/// Returns `None` when there is no previous value, when the change is below
/// [`UNCHANGED_THRESHOLD`], or when the delta is not a finite number.
pub fn compare(current: f64, previous: Option<f64>, unit: Option<&str>) -> Option<Comparison> {
    let previous = previous?;
    let delta = current - previous;

    if !delta.is_finite() || delta.abs() < UNCHANGED_THRESHOLD {
        return None;
    }

    let direction = if delta > 0.0 {
        Direction::Increase
    } else {
        Direction::Decrease
    };

    let places = if delta.abs() < FINE_DELTA_THRESHOLD { 3 } else { 2 };
    let magnitude = format_fixed(delta, places)?;
    let sign = match direction {
        Direction::Increase => "+",
        Direction::Decrease => "",
    };

    Some(Comparison {
        delta,
        direction,
        tone: direction.tone(),
        display_text: format!("{}{}{}", sign, magnitude, unit.unwrap_or("")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_no_previous_value() {
        assert_eq!(compare(50.0, None, Some("kg")), None);
    }

    #[test]
    fn test_noise_is_unchanged() {
        assert_eq!(compare(50.0005, Some(50.0), Some("kg")), None);
        assert_eq!(compare(50.0, Some(50.0), Some("kg")), None);
    }

    #[test]
    fn test_increase() {
        let cmp = compare(51.2, Some(50.0), Some("kg")).unwrap();
        assert!((cmp.delta - 1.2).abs() < 1e-9);
        assert_eq!(cmp.direction, Direction::Increase);
        assert_eq!(cmp.tone, Tone::Alert);
        assert_eq!(cmp.display_text, "+1.20kg");
    }

    #[test]
    fn test_small_decrease_uses_three_decimals() {
        let cmp = compare(49.99, Some(50.0), Some("kg")).unwrap();
        assert!((cmp.delta + 0.01).abs() < 1e-9);
        assert_eq!(cmp.direction, Direction::Decrease);
        assert_eq!(cmp.tone, Tone::Good);
        assert_eq!(cmp.display_text, "-0.010kg");
    }

    #[test]
    fn test_missing_unit_renders_bare_number() {
        let cmp = compare(23.1, Some(22.6), None).unwrap();
        assert_eq!(cmp.display_text, "+0.50");
    }

    #[test]
    fn test_non_finite_delta_is_not_compared() {
        assert_eq!(compare(f64::INFINITY, Some(20.0), Some("%")), None);
        assert_eq!(compare(f64::NAN, Some(20.0), Some("%")), None);
        assert_eq!(compare(20.0, Some(f64::NAN), Some("%")), None);
    }

    #[test]
    fn test_tone_colors() {
        assert_eq!(Direction::Increase.tone().color(), "#cf1322");
        assert_eq!(Direction::Decrease.tone().color(), "#3f8600");
    }

    proptest! {
        #[test]
        fn test_comparison_sign_matches_delta(
            previous in 0.0f64..200.0,
            delta in prop_oneof![-50.0f64..-0.001, 0.001f64..50.0],
        ) {
            let current = previous + delta;
            if let Some(cmp) = compare(current, Some(previous), Some("kg")) {
                prop_assert_eq!(cmp.delta > 0.0, cmp.direction == Direction::Increase);
                prop_assert_eq!(cmp.display_text.starts_with('+'), cmp.delta > 0.0);
                prop_assert!(cmp.display_text.ends_with("kg"));
            }
        }
    }
}
