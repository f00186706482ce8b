//! Horizontal range bar geometry for a single value
//!
//! Positions are percentages of the bar width. The visible window pads the
//! reference range by 10% of its span on each side and stretches to include
//! a value that falls outside the range.

use serde::{Deserialize, Serialize};

use crate::models::ReferenceRange;

/// Padding on each side of the window as a fraction of the range span
pub const PADDING_RATIO: f64 = 0.1;

const CENTER: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeGauge {
    pub value: f64,
    pub range: ReferenceRange,
    pub in_range: bool,
    /// Value at the left edge of the bar
    pub window_min: f64,
    /// Value at the right edge of the bar
    pub window_max: f64,
    pub range_start: f64,
    pub range_end: f64,
    /// Marker position, clamped to the bar
    pub value_position: f64,
}

impl RangeGauge {
    pub fn new(value: f64, range: ReferenceRange) -> Self {
        let padding = range.span() * PADDING_RATIO;
        let (window_min, window_max) = if range.contains(value) {
            (range.low - padding, range.high + padding)
        } else if value < range.low {
            (value - padding, range.high + padding)
        } else {
            (range.low - padding, value + padding)
        };
        Self::with_window(value, range, window_min, window_max)
    }

    /// Gauge over an explicit window instead of the padded range
    pub fn with_window(value: f64, range: ReferenceRange, window_min: f64, window_max: f64) -> Self {
        let width = window_max - window_min;
        let position = |x: f64| {
            if width == 0.0 {
                CENTER
            } else {
                (x - window_min) / width * 100.0
            }
        };

        RangeGauge {
            value,
            range,
            in_range: range.contains(value),
            window_min,
            window_max,
            range_start: position(range.low),
            range_end: position(range.high),
            value_position: position(value).clamp(0.0, 100.0),
        }
    }

    /// Width of the highlighted band in percent
    pub fn range_width(&self) -> f64 {
        self.range_end - self.range_start
    }

    /// Fixed-width text bar such as `--===|=----`: `=` marks the range, `|` the value
    pub fn render(&self, width: usize) -> String {
        if width == 0 {
            return String::new();
        }
        let cell = |percent: f64| -> usize {
            let idx = (percent / 100.0 * (width - 1) as f64).round();
            idx.clamp(0.0, (width - 1) as f64) as usize
        };
        let start = cell(self.range_start);
        let end = cell(self.range_end);
        let marker = cell(self.value_position);

        (0..width)
            .map(|i| {
                if i == marker {
                    '|'
                } else if i >= start && i <= end {
                    '='
                } else {
                    '-'
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_value_inside_range() {
        let gauge = RangeGauge::new(15.0, ReferenceRange::new(10.0, 20.0));
        assert!(gauge.in_range);
        assert!(approx(gauge.window_min, 9.0));
        assert!(approx(gauge.window_max, 21.0));
        assert!(approx(gauge.range_start, 1.0 / 12.0 * 100.0));
        assert!(approx(gauge.range_end, 11.0 / 12.0 * 100.0));
        assert!(approx(gauge.value_position, 50.0));
    }

    #[test]
    fn test_value_below_range_extends_window() {
        let gauge = RangeGauge::new(5.0, ReferenceRange::new(10.0, 20.0));
        assert!(!gauge.in_range);
        assert!(approx(gauge.window_min, 4.0));
        assert!(approx(gauge.window_max, 21.0));
        assert!(gauge.value_position > 0.0 && gauge.value_position < gauge.range_start);
    }

    #[test]
    fn test_value_above_range_extends_window() {
        let gauge = RangeGauge::new(30.0, ReferenceRange::new(10.0, 20.0));
        assert!(approx(gauge.window_min, 9.0));
        assert!(approx(gauge.window_max, 31.0));
        assert!(gauge.value_position > gauge.range_end);
    }

    #[test]
    fn test_zero_width_window_is_centered() {
        let gauge = RangeGauge::new(7.0, ReferenceRange::new(7.0, 7.0));
        assert!(gauge.in_range);
        assert_eq!(gauge.range_start, 50.0);
        assert_eq!(gauge.range_end, 50.0);
        assert_eq!(gauge.value_position, 50.0);
    }

    #[test]
    fn test_custom_window_clamps_marker() {
        let gauge = RangeGauge::with_window(50.0, ReferenceRange::new(10.0, 20.0), 0.0, 40.0);
        assert_eq!(gauge.value_position, 100.0);
        assert!(approx(gauge.range_start, 25.0));
        assert!(approx(gauge.range_width(), 25.0));
    }

    #[test]
    fn test_render() {
        let gauge = RangeGauge::with_window(5.0, ReferenceRange::new(2.0, 6.0), 0.0, 10.0);
        // cells at 0..=10: range 2..=6, marker at 5
        assert_eq!(gauge.render(11), "--===|=----");
        assert_eq!(gauge.render(0), "");
    }
}
