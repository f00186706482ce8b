use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::dataset::Dataset;
use crate::projector::MetricView;

pub mod csv;
pub mod json;
pub mod text;

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Csv,
    Json,
    Text,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Result<Self, ExportError> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }

    /// Guess the format from a file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?;
        Self::from_str(ext).ok()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Text => "text",
        };
        write!(f, "{}", name)
    }
}

/// What gets exported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportTarget {
    /// Trend series, oldest first
    Series,
    /// Projected record views, most recent first
    Records,
}

impl ExportTarget {
    pub fn from_str(s: &str) -> Result<Self, ExportError> {
        match s.to_lowercase().as_str() {
            "series" | "trends" => Ok(ExportTarget::Series),
            "records" | "overview" => Ok(ExportTarget::Records),
            _ => Err(ExportError::UnsupportedTarget(s.to_string())),
        }
    }
}

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Unsupported export target: {0}")]
    UnsupportedTarget(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] ::csv::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Write `target` from `dataset` to `output_path` in the given format
pub fn export_dataset<P: AsRef<Path>>(
    dataset: &Dataset,
    format: ExportFormat,
    target: ExportTarget,
    output_path: P,
) -> Result<(), ExportError> {
    let output_path = output_path.as_ref();

    match (format, target) {
        (ExportFormat::Json, ExportTarget::Series) => {
            json::export_json(&dataset.series(), output_path)?
        }
        (ExportFormat::Json, ExportTarget::Records) => {
            json::export_json(&dataset.project_all(), output_path)?
        }
        (ExportFormat::Csv, ExportTarget::Series) => {
            csv::export_series(&dataset.series(), output_path)?
        }
        (ExportFormat::Csv, ExportTarget::Records) => {
            csv::export_records(&dataset.project_all(), output_path)?
        }
        (ExportFormat::Text, ExportTarget::Series) => {
            let rendered = text::render_series_summary(&dataset.series());
            fs::write(output_path, rendered)?
        }
        (ExportFormat::Text, ExportTarget::Records) => {
            let rendered = dataset
                .project_all()
                .iter()
                .map(|view| text::render_record_view(view, false))
                .collect::<Vec<_>>()
                .join("\n");
            fs::write(output_path, rendered)?
        }
    }

    info!(
        format = %format,
        target = ?target,
        path = %output_path.display(),
        "Export completed"
    );
    Ok(())
}

/// Plain value text for file output; empty when not displayable
pub(crate) fn value_cell(view: &MetricView) -> String {
    view.display_value().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!(ExportFormat::from_str("CSV").unwrap(), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_str("txt").unwrap(), ExportFormat::Text);
        assert!(matches!(
            ExportFormat::from_str("pdf"),
            Err(ExportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ExportFormat::from_path("out/trends.json"), Some(ExportFormat::Json));
        assert_eq!(ExportFormat::from_path("out/trends"), None);
    }

    #[test]
    fn test_target_from_str() {
        assert_eq!(ExportTarget::from_str("trends").unwrap(), ExportTarget::Series);
        assert_eq!(ExportTarget::from_str("records").unwrap(), ExportTarget::Records);
        assert!(ExportTarget::from_str("workouts").is_err());
    }
}
