//! Single-record detail projection
//!
//! Turns one scan plus its chronological predecessor into display-ready
//! metrics: value, unit, applicable range, range verdict and the change since
//! the previous scan.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::comparison::{compare, Comparison};
use crate::formulas::{self, format_value};
use crate::models::{Metric, Profile, Record, ReferenceRange, Region};

/// Stars shown for a perfect score
pub const MAX_STARS: f64 = 5.0;

/// Composite score bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    NeedsImprovement,
}

impl ScoreBand {
    /// 80 and above is excellent, 60 and above good
    pub fn classify(score: u8) -> ScoreBand {
        match score {
            80.. => ScoreBand::Excellent,
            60..=79 => ScoreBand::Good,
            _ => ScoreBand::NeedsImprovement,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Good => "Good",
            ScoreBand::NeedsImprovement => "Needs Improvement",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "#52c41a",
            ScoreBand::Good => "#faad14",
            ScoreBand::NeedsImprovement => "#ff4d4f",
        }
    }
}

impl std::fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Score on a five-star scale (20 points per star)
pub fn star_rating(score: u8) -> f64 {
    (f64::from(score) / 20.0).clamp(0.0, MAX_STARS)
}

/// One displayable metric of a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricView {
    pub key: String,
    pub title: String,
    pub value: f64,
    pub unit: Option<String>,
    pub range: Option<ReferenceRange>,
    /// `None` when no range applies or the value cannot be displayed
    pub in_range: Option<bool>,
    /// `None` for the earliest record or an unchanged value
    pub comparison: Option<Comparison>,
    pub decimal_places: Option<u32>,
}

impl MetricView {
    fn new(
        key: impl Into<String>,
        title: impl Into<String>,
        value: f64,
        unit: Option<&str>,
        range: Option<ReferenceRange>,
        previous: Option<f64>,
    ) -> Self {
        MetricView {
            key: key.into(),
            title: title.into(),
            value,
            unit: unit.map(str::to_string),
            range,
            in_range: range_verdict(range, value),
            comparison: compare(value, previous, unit),
            decimal_places: None,
        }
    }

    /// Value as text, or `None` when it cannot be displayed (division by zero upstream)
    pub fn display_value(&self) -> Option<String> {
        format_value(self.value, self.decimal_places)
    }

    pub fn is_displayable(&self) -> bool {
        self.value.is_finite()
    }
}

/// Muscle-balance entry for one body region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionView {
    pub region: Region,
    pub title: String,
    pub weight: MetricView,
    /// Percent of the population standard
    pub percentage: MetricView,
}

/// Everything the detail view shows for a single scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordView {
    pub date: NaiveDate,
    pub previous_date: Option<NaiveDate>,
    pub score: u8,
    pub score_band: ScoreBand,
    pub stars: f64,
    pub metrics: Vec<MetricView>,
    pub muscle_balance: Vec<RegionView>,
}

impl RecordView {
    pub fn metric(&self, key: &str) -> Option<&MetricView> {
        self.metrics.iter().find(|m| m.key == key)
    }

    pub fn region(&self, region: Region) -> Option<&RegionView> {
        self.muscle_balance.iter().find(|r| r.region == region)
    }

    /// Drop the range and verdict of one metric
    pub fn clear_range(&mut self, key: &str) {
        if let Some(metric) = self.metrics.iter_mut().find(|m| m.key == key) {
            metric.range = None;
            metric.in_range = None;
        }
    }

    /// Metrics with a range whose value falls outside it
    pub fn out_of_range(&self) -> impl Iterator<Item = &MetricView> {
        self.metrics.iter().filter(|m| m.in_range == Some(false))
    }
}

/// Non-finite values get no verdict
pub(crate) fn range_verdict(range: Option<ReferenceRange>, value: f64) -> Option<bool> {
    if !value.is_finite() {
        return None;
    }
    range.map(|r| r.contains(value))
}

/// Range used by the detail view: the profile range, or the weight-scaled
/// band for skeletal muscle
fn detail_range(metric: Metric, record: &Record, profile: &Profile) -> Option<ReferenceRange> {
    match metric {
        Metric::SkeletalMuscle => Some(formulas::skeletal_muscle_range(record.weight.value)),
        _ => metric.profile_range(profile),
    }
}

/// Project one record for display.
///
/// `previous` must be the chronologically adjacent earlier record (see
/// [`previous_record`]); without it no comparisons are produced.
pub fn project_record(record: &Record, profile: &Profile, previous: Option<&Record>) -> RecordView {
    let metrics = Metric::DETAIL_ORDER
        .iter()
        .map(|&metric| {
            let mut view = MetricView::new(
                metric.key(),
                metric.title(),
                metric.value(record, profile),
                metric.unit(record),
                detail_range(metric, record, profile),
                previous.map(|p| metric.value(p, profile)),
            );
            view.decimal_places = metric.decimal_places();
            view
        })
        .collect();

    let muscle_balance = Region::ALL
        .iter()
        .map(|&region| {
            let current = record.muscle_balance.get(region);
            let before = previous.map(|p| p.muscle_balance.get(region));

            RegionView {
                region,
                title: region.title().to_string(),
                weight: MetricView::new(
                    format!("{}_weight", region.key()),
                    region.title(),
                    current.weight.value,
                    Some(current.weight.unit.as_str()),
                    None,
                    before.map(|b| b.weight.value),
                ),
                percentage: MetricView::new(
                    format!("{}_percentage", region.key()),
                    "Relative to standard",
                    current.percent_of_standard,
                    Some("%"),
                    None,
                    before.map(|b| b.percent_of_standard),
                ),
            }
        })
        .collect();

    debug!(
        date = %record.date,
        previous = ?previous.map(|p| p.date),
        "Projected record"
    );

    RecordView {
        date: record.date,
        previous_date: previous.map(|p| p.date),
        score: record.score,
        score_band: ScoreBand::classify(record.score),
        stars: star_rating(record.score),
        metrics,
        muscle_balance,
    }
}

/// The record one date-step earlier than `record`.
///
/// `records_desc` is the full set ordered most recent first; the predecessor
/// is the element right after `record` in that ordering.
pub fn previous_record<'a>(records_desc: &'a [Record], record: &Record) -> Option<&'a Record> {
    let index = records_desc.iter().position(|r| r.date == record.date)?;
    records_desc.get(index + 1)
}
