use super::{value_cell, ExportError};
use crate::formulas::format_value;
use crate::projector::{MetricView, RecordView};
use crate::series::{NamedSeries, SeriesSet};
use ::csv::Writer;
use std::io;
use std::path::Path;

const SERIES_HEADER: [&str; 7] = [
    "date",
    "metric",
    "value",
    "unit",
    "range_low",
    "range_high",
    "in_range",
];

const RECORDS_HEADER: [&str; 9] = [
    "date",
    "score",
    "metric",
    "value",
    "unit",
    "range_low",
    "range_high",
    "in_range",
    "change",
];

/// Export every trend series as long-format rows, one per point
pub fn export_series<P: AsRef<Path>>(set: &SeriesSet, output_path: P) -> Result<(), ExportError> {
    let file = std::fs::File::create(output_path)?;
    write_series(set, file)
}

/// Write trend series rows to any writer
pub fn write_series<W: io::Write>(set: &SeriesSet, out: W) -> Result<(), ExportError> {
    let mut writer = Writer::from_writer(out);
    writer.write_record(SERIES_HEADER)?;

    for series in set.iter() {
        write_series_rows(&mut writer, series)?;
    }

    writer.flush()?;
    Ok(())
}

fn write_series_rows<W: io::Write>(
    writer: &mut Writer<W>,
    series: &NamedSeries,
) -> Result<(), ExportError> {
    let (low, high) = range_cells(series.range.map(|r| (r.low, r.high)));

    for point in &series.points {
        let value = format_value(point.value, series.decimal_places).unwrap_or_default();

        writer.write_record([
            point.date.format("%Y-%m-%d").to_string(),
            series.key.clone(),
            value,
            series.unit.clone().unwrap_or_default(),
            low.clone(),
            high.clone(),
            bool_cell(point.in_range),
        ])?;
    }
    Ok(())
}

/// Export projected records, one row per metric and muscle-balance entry
pub fn export_records<P: AsRef<Path>>(
    views: &[RecordView],
    output_path: P,
) -> Result<(), ExportError> {
    let file = std::fs::File::create(output_path)?;
    write_records(views, file)
}

pub fn write_records<W: io::Write>(views: &[RecordView], out: W) -> Result<(), ExportError> {
    let mut writer = Writer::from_writer(out);
    writer.write_record(RECORDS_HEADER)?;

    for view in views {
        let date = view.date.format("%Y-%m-%d").to_string();
        let score = view.score.to_string();

        let regions = view
            .muscle_balance
            .iter()
            .flat_map(|r| [&r.weight, &r.percentage]);

        for metric in view.metrics.iter().chain(regions) {
            writer.write_record(metric_row(&date, &score, metric))?;
        }
    }

    writer.flush()?;
    Ok(())
}

fn metric_row(date: &str, score: &str, metric: &MetricView) -> [String; 9] {
    let (low, high) = range_cells(metric.range.map(|r| (r.low, r.high)));
    [
        date.to_string(),
        score.to_string(),
        metric.key.clone(),
        value_cell(metric),
        metric.unit.clone().unwrap_or_default(),
        low,
        high,
        bool_cell(metric.in_range),
        metric
            .comparison
            .as_ref()
            .map(|c| c.display_text.clone())
            .unwrap_or_default(),
    ]
}

fn range_cells(range: Option<(f64, f64)>) -> (String, String) {
    match range {
        Some((low, high)) => (low.to_string(), high.to_string()),
        None => (String::new(), String::new()),
    }
}

fn bool_cell(flag: Option<bool>) -> String {
    match flag {
        Some(true) => "1".to_string(),
        Some(false) => "0".to_string(),
        None => String::new(),
    }
}
