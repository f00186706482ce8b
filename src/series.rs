//! Per-metric time series for trend charts
//!
//! The builders reshape per-record data into one chronologically ordered
//! series per metric. Input records must already be sorted ascending by date;
//! the builders keep that order and emit exactly one point per record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{Metric, Profile, Record, ReferenceRange, Region};
use crate::projector::range_verdict;

/// Reference line drawn on percent-of-standard charts
pub const STANDARD_PERCENT: f64 = 100.0;

/// Y-axis padding as a fraction of |min|
const AXIS_PADDING_RATIO: f64 = 0.05;

/// Y-axis bounds snap to multiples of this step
const AXIS_STEP: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
    /// Verdict against the series range, `None` when the series has no range
    /// or the value is not finite
    pub in_range: Option<bool>,
}

/// One chartable metric: ordered points plus the context a renderer needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSeries {
    pub key: String,
    pub title: String,
    pub unit: Option<String>,
    pub range: Option<ReferenceRange>,
    /// Fixed display precision for derived values
    pub decimal_places: Option<u32>,
    /// Horizontal marker such as the 100% standard line
    pub reference_line: Option<f64>,
    pub points: Vec<SeriesPoint>,
}

impl NamedSeries {
    fn new(
        key: impl Into<String>,
        title: impl Into<String>,
        unit: Option<String>,
        range: Option<ReferenceRange>,
        values: impl Iterator<Item = (NaiveDate, f64)>,
    ) -> Self {
        let points = values
            .map(|(date, value)| SeriesPoint {
                date,
                value,
                in_range: range_verdict(range, value),
            })
            .collect();

        NamedSeries {
            key: key.into(),
            title: title.into(),
            unit,
            range,
            decimal_places: None,
            reference_line: None,
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Finite values only
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value).filter(|v| v.is_finite())
    }

    pub fn first(&self) -> Option<&SeriesPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&SeriesPoint> {
        self.points.last()
    }

    pub fn min(&self) -> Option<f64> {
        self.values().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.values().reduce(f64::max)
    }

    /// Number of points with a negative range verdict
    pub fn out_of_range_count(&self) -> usize {
        self.points
            .iter()
            .filter(|p| p.in_range == Some(false))
            .count()
    }
}

/// Weight and percent-of-standard series for one muscle-balance region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSeries {
    pub region: Region,
    pub weight: NamedSeries,
    pub percentage: NamedSeries,
}

/// Everything the trend view renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSet {
    pub main: Vec<NamedSeries>,
    pub muscle_balance: Vec<RegionSeries>,
}

impl SeriesSet {
    /// Main series followed by each region's weight and percentage series
    pub fn iter(&self) -> impl Iterator<Item = &NamedSeries> {
        self.main.iter().chain(
            self.muscle_balance
                .iter()
                .flat_map(|r| [&r.weight, &r.percentage]),
        )
    }

    pub fn find(&self, key: &str) -> Option<&NamedSeries> {
        self.iter().find(|s| s.key == key)
    }
}

/// Build the eleven main metric series.
///
/// Body-fat % and BMI are derived per record; extracellular water is scaled
/// to a percentage along with its range.
pub fn build_series(records: &[Record], profile: &Profile) -> Vec<NamedSeries> {
    let series: Vec<NamedSeries> = Metric::CHART_ORDER
        .iter()
        .map(|metric| build_metric_series(*metric, records, profile))
        .collect();

    debug!(
        records = records.len(),
        series = series.len(),
        "Built metric series"
    );
    series
}

/// Series for a single metric
pub fn build_metric_series(metric: Metric, records: &[Record], profile: &Profile) -> NamedSeries {
    // Unit comes from the first record and is assumed constant
    let unit = match metric.static_unit() {
        Some(unit) => Some(unit.to_string()),
        None => records.first().and_then(|r| metric.unit(r)).map(str::to_string),
    };

    let values = records.iter().map(|record| {
        let value = metric.value(record, profile);
        if !value.is_finite() {
            warn!(metric = metric.key(), date = %record.date, "Non-finite derived value");
        }
        (record.date, value)
    });

    let mut series = NamedSeries::new(
        metric.key(),
        metric.title(),
        unit,
        metric.profile_range(profile),
        values,
    );
    series.decimal_places = metric.decimal_places();
    series
}

/// Build weight and percent-of-standard series for each body region
pub fn build_muscle_balance_series(records: &[Record]) -> Vec<RegionSeries> {
    Region::ALL
        .iter()
        .map(|&region| {
            let unit = records
                .first()
                .map(|r| r.muscle_balance.get(region).weight.unit.clone());

            let weight = NamedSeries::new(
                format!("{}_weight", region.key()),
                region.title(),
                unit,
                None,
                records
                    .iter()
                    .map(|r| (r.date, r.muscle_balance.get(region).weight.value)),
            );

            let mut percentage = NamedSeries::new(
                format!("{}_percentage", region.key()),
                format!("{} (% of standard)", region.title()),
                Some("%".to_string()),
                None,
                records
                    .iter()
                    .map(|r| (r.date, r.muscle_balance.get(region).percent_of_standard)),
            );
            percentage.reference_line = Some(STANDARD_PERCENT);

            RegionSeries {
                region,
                weight,
                percentage,
            }
        })
        .collect()
}

/// Main and muscle-balance series together
pub fn build_all(records: &[Record], profile: &Profile) -> SeriesSet {
    SeriesSet {
        main: build_series(records, profile),
        muscle_balance: build_muscle_balance_series(records),
    }
}

/// Y-axis window for a line chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisBounds {
    pub min: f64,
    pub max: f64,
}

impl AxisBounds {
    /// Covers both the data and the reference range, padded by 5% of the
    /// smaller end and snapped outward to multiples of 5.
    ///
    /// Returns `None` when the series has no finite values.
    pub fn for_series(series: &NamedSeries) -> Option<AxisBounds> {
        let data_min = series.min()?;
        let data_max = series.max()?;

        let (range_min, range_max) = match series.range {
            Some(range) => (range.low, range.high),
            None => (data_min, data_max),
        };

        let min_value = data_min.min(range_min);
        let max_value = data_max.max(range_max);
        let padding = min_value.abs() * AXIS_PADDING_RATIO;

        Some(AxisBounds {
            min: ((min_value - padding) / AXIS_STEP).floor() * AXIS_STEP,
            max: ((max_value + padding) / AXIS_STEP).ceil() * AXIS_STEP,
        })
    }
}
