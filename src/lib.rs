// Library interface for bodytrack
// The binary and the integration tests both go through these modules

pub mod comparison;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod formulas;
pub mod gauge;
pub mod logging;
pub mod models;
pub mod projector;
pub mod series;

// Re-export commonly used types for convenience
pub use models::*;
pub use comparison::{compare, Comparison, Direction, Tone};
pub use dataset::{Dataset, RecordTab};
pub use gauge::RangeGauge;
pub use projector::{previous_record, project_record, MetricView, RecordView, RegionView, ScoreBand};
pub use series::{build_all, build_series, AxisBounds, NamedSeries, SeriesPoint, SeriesSet};
pub use error::{BodyTrackError, DatasetError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
