//! Read-only dataset: one profile plus its scan records
//!
//! This is the data-source boundary. Documents are parsed and validated here
//! once; after construction the dataset is immutable and handed by reference
//! to the series builder and the record projector.

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

use crate::error::DatasetError;
use crate::models::{Profile, Record};
use crate::projector::{self, RecordView};
use crate::series::{self, SeriesSet};

/// Schema version of the profile and records documents
pub const SCHEMA_VERSION: u32 = 1;

/// Fallback when a configured date format is not a valid strftime pattern
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// On-disk profile document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDocument {
    pub schema_version: u32,
    pub profile: Profile,
}

/// On-disk records document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordsDocument {
    pub schema_version: u32,
    pub records: Vec<Record>,
}

/// Tab entry for the record selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTab {
    /// Record date, used as the tab key
    pub key: NaiveDate,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    profile: Profile,
    /// Ascending by date
    records: Vec<Record>,
}

impl Dataset {
    /// Validate and assemble a dataset
    pub fn new(profile: Profile, mut records: Vec<Record>) -> Result<Self, DatasetError> {
        validate_profile(&profile)?;
        validate_records(&records)?;

        records.sort_by_key(|r| r.date);
        debug!(records = records.len(), "Dataset assembled");

        Ok(Dataset { profile, records })
    }

    /// Load profile and records from JSON documents
    pub fn load<P: AsRef<Path>, R: AsRef<Path>>(
        profile_path: P,
        records_path: R,
    ) -> Result<Self, DatasetError> {
        let profile_doc: ProfileDocument = read_document(profile_path.as_ref())?;
        check_schema(profile_doc.schema_version)?;

        let records_doc: RecordsDocument = read_document(records_path.as_ref())?;
        check_schema(records_doc.schema_version)?;

        let dataset = Self::new(profile_doc.profile, records_doc.records)?;
        info!(
            profile = %profile_path.as_ref().display(),
            records = dataset.len(),
            "Dataset loaded"
        );
        Ok(dataset)
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records oldest first (chart order)
    pub fn sorted_ascending(&self) -> &[Record] {
        &self.records
    }

    /// Records most recent first (tab order)
    pub fn sorted_descending(&self) -> impl Iterator<Item = &Record> + '_ {
        self.records.iter().rev()
    }

    pub fn find(&self, date: NaiveDate) -> Option<&Record> {
        self.records
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|i| &self.records[i])
    }

    pub fn latest(&self) -> Option<&Record> {
        self.records.last()
    }

    /// Detail view for the record on `date`
    pub fn project(&self, date: NaiveDate) -> Result<RecordView, DatasetError> {
        let index = self
            .records
            .binary_search_by_key(&date, |r| r.date)
            .map_err(|_| DatasetError::RecordNotFound { date })?;
        Ok(self.project_at(index))
    }

    /// Detail views for every record, most recent first
    pub fn project_all(&self) -> Vec<RecordView> {
        (0..self.records.len())
            .rev()
            .map(|index| self.project_at(index))
            .collect()
    }

    /// Records are stored ascending, so the predecessor sits one slot earlier
    fn project_at(&self, index: usize) -> RecordView {
        let previous = index.checked_sub(1).and_then(|i| self.records.get(i));
        projector::project_record(&self.records[index], &self.profile, previous)
    }

    /// Trend series over all records
    pub fn series(&self) -> SeriesSet {
        series::build_all(&self.records, &self.profile)
    }

    /// Tab labels, most recent first: `"<date> (<score> pts)"`
    pub fn record_tabs(&self, date_format: &str) -> Vec<RecordTab> {
        self.sorted_descending()
            .map(|r| RecordTab {
                key: r.date,
                label: format!("{} ({} pts)", format_date(r.date, date_format), r.score),
            })
            .collect()
    }
}

/// Format a date, falling back to ISO format for an invalid pattern
pub fn format_date(date: NaiveDate, format: &str) -> String {
    let valid = StrftimeItems::new(format).all(|item| !matches!(item, Item::Error));
    let format = if valid { format } else { DEFAULT_DATE_FORMAT };
    date.format(format).to_string()
}

fn read_document<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, DatasetError> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DatasetError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => DatasetError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;

    serde_json::from_str(&content).map_err(|e| DatasetError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn check_schema(version: u32) -> Result<(), DatasetError> {
    if version != SCHEMA_VERSION {
        return Err(DatasetError::UnsupportedSchema {
            found: version,
            supported: SCHEMA_VERSION,
        });
    }
    Ok(())
}

fn validate_profile(profile: &Profile) -> Result<(), DatasetError> {
    if !profile.height_cm.is_finite() || profile.height_cm <= 0.0 {
        return Err(DatasetError::InvalidHeight {
            height: profile.height_cm,
        });
    }

    for (field, range) in profile.ranges.entries() {
        let finite = range.low.is_finite() && range.high.is_finite();
        if !finite || !range.is_well_formed() {
            return Err(DatasetError::MalformedRange {
                field: field.to_string(),
                low: range.low,
                high: range.high,
            });
        }
    }

    Ok(())
}

fn validate_records(records: &[Record]) -> Result<(), DatasetError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.date) {
            return Err(DatasetError::DuplicateDate { date: record.date });
        }
        if record.score > 100 {
            return Err(DatasetError::ScoreOutOfRange {
                date: record.date,
                score: record.score,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{profile, record};
    use crate::models::ReferenceRange;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn dataset() -> Dataset {
        Dataset::new(
            profile(),
            vec![
                record("2024-02-03", 71.0, 77),
                record("2024-03-02", 69.8, 81),
                record("2024-01-05", 72.4, 58),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_records_sorted_both_ways() {
        let ds = dataset();
        let asc: Vec<NaiveDate> = ds.sorted_ascending().iter().map(|r| r.date).collect();
        assert_eq!(asc, vec![date("2024-01-05"), date("2024-02-03"), date("2024-03-02")]);

        let desc: Vec<NaiveDate> = ds.sorted_descending().map(|r| r.date).collect();
        assert_eq!(desc, vec![date("2024-03-02"), date("2024-02-03"), date("2024-01-05")]);

        assert_eq!(ds.latest().unwrap().date, date("2024-03-02"));
    }

    #[test]
    fn test_duplicate_dates_rejected() {
        let result = Dataset::new(
            profile(),
            vec![record("2024-01-05", 72.4, 58), record("2024-01-05", 71.0, 60)],
        );
        assert!(matches!(result, Err(DatasetError::DuplicateDate { .. })));
    }

    #[test]
    fn test_malformed_profile_rejected() {
        let mut bad = profile();
        bad.ranges.bmi = Some(ReferenceRange::new(24.0, 18.5));
        match Dataset::new(bad, vec![]) {
            Err(DatasetError::MalformedRange { field, .. }) => assert_eq!(field, "bmi"),
            other => panic!("unexpected: {:?}", other),
        }

        let mut bad = profile();
        bad.height_cm = 0.0;
        assert!(matches!(
            Dataset::new(bad, vec![]),
            Err(DatasetError::InvalidHeight { .. })
        ));
    }

    #[test]
    fn test_score_over_100_rejected() {
        let result = Dataset::new(profile(), vec![record("2024-01-05", 72.4, 101)]);
        assert!(matches!(result, Err(DatasetError::ScoreOutOfRange { score: 101, .. })));
    }

    #[test]
    fn test_project_uses_chronological_predecessor() {
        let ds = dataset();
        let view = ds.project(date("2024-02-03")).unwrap();
        assert_eq!(view.previous_date, Some(date("2024-01-05")));

        let missing = ds.project(date("2020-01-01"));
        assert!(matches!(missing, Err(DatasetError::RecordNotFound { .. })));
    }

    #[test]
    fn test_project_all() {
        let views = dataset().project_all();
        assert_eq!(views.len(), 3);
        assert_eq!(views[0].date, date("2024-03-02"));
        assert_eq!(views[0].previous_date, Some(date("2024-02-03")));
        assert!(views[2].metrics.iter().all(|m| m.comparison.is_none()));
    }

    #[test]
    fn test_project_all_matches_previous_record_lookup() {
        let ds = dataset();
        let descending: Vec<Record> = ds.sorted_descending().cloned().collect();

        for (view, record) in ds.project_all().iter().zip(&descending) {
            let previous = projector::previous_record(&descending, record);
            assert_eq!(view, &projector::project_record(record, ds.profile(), previous));
            assert_eq!(view, &ds.project(record.date).unwrap());
        }
    }

    #[test]
    fn test_record_tabs() {
        let tabs = dataset().record_tabs("%b %-d, %Y");
        assert_eq!(tabs.len(), 3);
        assert_eq!(tabs[0].key, date("2024-03-02"));
        assert_eq!(tabs[0].label, "Mar 2, 2024 (81 pts)");
    }

    #[test]
    fn test_format_date_fallback() {
        let d = date("2024-03-02");
        assert_eq!(format_date(d, "%d/%m/%Y"), "02/03/2024");
        assert_eq!(format_date(d, "%Q"), "2024-03-02");
    }

    #[test]
    fn test_series_from_dataset() {
        let set = dataset().series();
        let weight = set.find("weight").unwrap();
        assert_eq!(weight.points.len(), 3);
        assert_eq!(weight.points[0].date, date("2024-01-05"));
    }

    #[test]
    fn test_schema_version_check() {
        assert!(check_schema(SCHEMA_VERSION).is_ok());
        assert!(matches!(
            check_schema(2),
            Err(DatasetError::UnsupportedSchema { found: 2, supported: 1 })
        ));
    }
}
