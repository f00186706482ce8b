//! Error hierarchy for bodytrack
//!
//! The computation core (formulas, comparison, series, projector) never
//! fails: missing data is expressed with `Option`. Errors only arise at the
//! edges, when data files are loaded and validated or output is written.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

use crate::export::ExportError;

/// Top-level error type for all bodytrack operations
#[derive(Debug, Error)]
pub enum BodyTrackError {
    /// Profile / record loading and schema validation errors
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// Output rendering errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Config file that exists but cannot be read or parsed
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Errors raised at the data-source boundary
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Data file not found at the given path
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Data file exists but could not be read
    #[error("Failed to read {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    /// Document is not valid JSON for the expected schema
    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// Schema version this build cannot read
    #[error("Unsupported schema version {found} (supported: {supported})")]
    UnsupportedSchema { found: u32, supported: u32 },

    /// Two records share a date
    #[error("Duplicate record date: {date}")]
    DuplicateDate { date: NaiveDate },

    /// Range with its bounds reversed or not a number
    #[error("Malformed range for {field}: [{low}, {high}]")]
    MalformedRange { field: String, low: f64, high: f64 },

    /// Height must be a positive number of centimeters
    #[error("Invalid height: {height}cm")]
    InvalidHeight { height: f64 },

    /// Score outside 0-100
    #[error("Score {score} out of range on {date}")]
    ScoreOutOfRange { date: NaiveDate, score: u8 },

    /// No record for the requested date
    #[error("No record for {date}")]
    RecordNotFound { date: NaiveDate },
}

/// Result type alias for bodytrack operations
pub type Result<T> = std::result::Result<T, BodyTrackError>;

impl BodyTrackError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BodyTrackError::Dataset(DatasetError::RecordNotFound { .. }) => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            BodyTrackError::Dataset(DatasetError::FileNotFound { path }) => {
                format!("Could not find data file: {}", path.display())
            }
            BodyTrackError::Dataset(DatasetError::DuplicateDate { date }) => {
                format!(
                    "More than one scan is recorded for {}. Each date may appear only once.",
                    date
                )
            }
            BodyTrackError::Dataset(DatasetError::RecordNotFound { date }) => {
                format!("There is no scan recorded on {}.", date)
            }
            BodyTrackError::Dataset(DatasetError::UnsupportedSchema { found, .. }) => {
                format!(
                    "This data file uses schema version {}, which this version of bodytrack cannot read.",
                    found
                )
            }
            BodyTrackError::Configuration(reason) => {
                format!("Could not load the config file: {}", reason)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents the requested operation
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
