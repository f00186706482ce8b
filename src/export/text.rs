use colored::*;
use std::fmt::{self, Write};
use tabled::{settings::Style, Table, Tabled};

use crate::comparison::Tone;
use crate::dataset::format_date;
use crate::formulas::format_value;
use crate::gauge::RangeGauge;
use crate::models::Profile;
use crate::projector::{MetricView, RecordView, ScoreBand, MAX_STARS};
use crate::series::{AxisBounds, NamedSeries, SeriesSet};

/// Width of the text range bar in the detail table
pub const GAUGE_WIDTH: usize = 20;

const MISSING: &str = "-";

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Change")]
    change: String,
    #[tabled(rename = "Range")]
    range: String,
    #[tabled(rename = "")]
    gauge: String,
}

#[derive(Tabled)]
struct RegionRow {
    #[tabled(rename = "Region")]
    region: String,
    #[tabled(rename = "Muscle")]
    weight: String,
    #[tabled(rename = "Change")]
    weight_change: String,
    #[tabled(rename = "% of standard")]
    percentage: String,
    #[tabled(rename = "Change")]
    percentage_change: String,
}

#[derive(Tabled)]
struct SeriesRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "First")]
    first: String,
    #[tabled(rename = "Latest")]
    latest: String,
    #[tabled(rename = "Min")]
    min: String,
    #[tabled(rename = "Max")]
    max: String,
    #[tabled(rename = "Range")]
    range: String,
    #[tabled(rename = "Axis")]
    axis: String,
    #[tabled(rename = "Out of range")]
    out_of_range: String,
}

/// Subject header shown above the scan list
pub fn render_profile(profile: &Profile, date_format: &str, color: bool) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_profile(&mut out, profile, date_format, color);
    out
}

fn write_profile(
    out: &mut String,
    profile: &Profile,
    date_format: &str,
    color: bool,
) -> fmt::Result {
    writeln!(out, "{}", heading("BASIC INFO", color))?;
    writeln!(out, "Name:     {}", profile.name)?;
    writeln!(
        out,
        "Birthday: {}",
        format_date(profile.birthday, date_format)
    )?;
    writeln!(out, "Sex:      {}", profile.sex)?;
    writeln!(out, "Height:   {} cm", profile.height_cm)?;
    Ok(())
}

/// Detail view of one scan as a text report
pub fn render_record_view(view: &RecordView, color: bool) -> String {
    let mut out = String::new();
    let _ = write_record_view(&mut out, view, color);
    out
}

fn write_record_view(out: &mut String, view: &RecordView, color: bool) -> fmt::Result {
    let title = format!("BODY COMPOSITION - {}", view.date.format("%Y-%m-%d"));
    writeln!(out, "{}", heading(&title, color))?;
    match view.previous_date {
        Some(date) => writeln!(out, "Compared with: {}", date.format("%Y-%m-%d"))?,
        None => writeln!(out, "Compared with: (first scan)")?,
    }

    let score = format!("{} pts ({})", view.score, view.score_band);
    writeln!(
        out,
        "Score: {}  {} {:.1}/{}",
        paint_band(&score, view.score_band, color),
        stars(view.stars),
        view.stars,
        MAX_STARS
    )?;
    writeln!(out)?;

    let rows: Vec<MetricRow> = view
        .metrics
        .iter()
        .map(|m| MetricRow {
            metric: m.title.clone(),
            value: value_with_unit(m),
            change: change_text(m),
            range: m
                .range
                .map(|r| format!("{}-{}", r.low, r.high))
                .unwrap_or_default(),
            gauge: gauge_text(m),
        })
        .collect();
    writeln!(out, "{}", Table::new(rows).with(Style::rounded()))?;
    writeln!(out)?;

    writeln!(out, "{}", heading("MUSCLE BALANCE", color))?;
    let rows: Vec<RegionRow> = view
        .muscle_balance
        .iter()
        .map(|r| RegionRow {
            region: r.title.clone(),
            weight: value_with_unit(&r.weight),
            weight_change: change_text(&r.weight),
            percentage: value_with_unit(&r.percentage),
            percentage_change: change_text(&r.percentage),
        })
        .collect();
    writeln!(out, "{}", Table::new(rows).with(Style::rounded()))?;

    let flagged: Vec<&MetricView> = view.out_of_range().collect();
    if !flagged.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", heading("OUTSIDE REFERENCE RANGE", color))?;
        for m in flagged {
            let line = format!("• {}: {}", m.title, value_with_unit(m));
            writeln!(out, "{}", paint_tone(&line, Tone::Alert, color))?;
        }
    }

    Ok(())
}

/// One summary row per trend series
pub fn render_series_summary(set: &SeriesSet) -> String {
    let mut out = String::new();
    let _ = write_series_summary(&mut out, set);
    out
}

fn write_series_summary(out: &mut String, set: &SeriesSet) -> fmt::Result {
    let points = set.main.first().map(NamedSeries::len).unwrap_or(0);
    writeln!(out, "TRENDS ({} scans)", points)?;
    writeln!(out, "{:-<40}", "")?;

    let rows: Vec<SeriesRow> = set.iter().map(series_row).collect();
    writeln!(out, "{}", Table::new(rows).with(Style::rounded()))?;
    Ok(())
}

fn series_row(series: &NamedSeries) -> SeriesRow {
    let fmt = |value: Option<f64>| -> String {
        value
            .and_then(|v| format_value(v, series.decimal_places))
            .map(|v| format!("{}{}", v, series.unit.as_deref().unwrap_or("")))
            .unwrap_or_else(|| MISSING.to_string())
    };

    let out_of_range = if series.range.is_some() {
        series.out_of_range_count().to_string()
    } else {
        String::new()
    };

    SeriesRow {
        metric: series.title.clone(),
        first: fmt(series.first().map(|p| p.value)),
        latest: fmt(series.last().map(|p| p.value)),
        min: fmt(series.min()),
        max: fmt(series.max()),
        range: series
            .range
            .map(|r| format!("{}-{}", r.low, r.high))
            .unwrap_or_default(),
        axis: AxisBounds::for_series(series)
            .map(|b| format!("{}..{}", b.min, b.max))
            .unwrap_or_default(),
        out_of_range,
    }
}

fn value_with_unit(view: &MetricView) -> String {
    match view.display_value() {
        Some(value) => format!("{}{}", value, view.unit.as_deref().unwrap_or("")),
        None => MISSING.to_string(),
    }
}

fn change_text(view: &MetricView) -> String {
    view.comparison
        .as_ref()
        .map(|c| format!("{} {}", c.direction.arrow(), c.display_text))
        .unwrap_or_default()
}

fn gauge_text(view: &MetricView) -> String {
    match view.range {
        Some(range) if view.is_displayable() => {
            RangeGauge::new(view.value, range).render(GAUGE_WIDTH)
        }
        _ => String::new(),
    }
}

fn stars(rating: f64) -> String {
    let full = rating.floor() as usize;
    let empty = (MAX_STARS as usize).saturating_sub(full);
    format!("{}{}", "★".repeat(full), "☆".repeat(empty))
}

fn heading(text: &str, color: bool) -> String {
    if color {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

fn paint_tone(text: &str, tone: Tone, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    match tone {
        Tone::Alert => text.red().to_string(),
        Tone::Good => text.green().to_string(),
    }
}

fn paint_band(text: &str, band: ScoreBand, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    match band {
        ScoreBand::Excellent => text.green().to_string(),
        ScoreBand::Good => text.yellow().to_string(),
        ScoreBand::NeedsImprovement => text.red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{profile, record};
    use crate::projector::project_record;
    use crate::series::build_all;

    #[test]
    fn test_render_record_view_plain() {
        let current = record("2024-02-03", 71.0, 77);
        let previous = record("2024-01-05", 72.4, 58);
        let view = project_record(&current, &profile(), Some(&previous));

        let text = render_record_view(&view, false);
        assert!(text.starts_with("BODY COMPOSITION - 2024-02-03"));
        assert!(text.contains("Compared with: 2024-01-05"));
        assert!(text.contains("77 pts (Good)"));
        assert!(text.contains("★★★☆☆"));
        assert!(text.contains("-1.40kg"));
        assert!(text.contains("MUSCLE BALANCE"));
        assert!(text.contains("Left Upper Arm"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn test_first_scan_has_no_changes() {
        let view = project_record(&record("2024-01-05", 72.4, 58), &profile(), None);
        let text = render_record_view(&view, false);
        assert!(text.contains("(first scan)"));
        assert!(!text.contains('↑'));
        assert!(!text.contains('↓'));
    }

    #[test]
    fn test_out_of_range_section() {
        // body fat mass 17.0 exceeds 15.3
        let view = project_record(&record("2024-01-05", 73.0, 58), &profile(), None);
        let text = render_record_view(&view, false);
        assert!(text.contains("OUTSIDE REFERENCE RANGE"));
        assert!(text.contains("• Body Fat Mass: 17kg"));
    }

    #[test]
    fn test_undisplayable_value_not_listed_as_out_of_range() {
        let mut broken = record("2024-05-01", 70.0, 70);
        broken.weight.value = 0.0;
        let view = project_record(&broken, &profile(), None);
        let text = render_record_view(&view, false);

        assert!(text.contains("OUTSIDE REFERENCE RANGE"));
        assert!(text.contains("• Weight: 0kg"));
        assert!(!text.contains("• Body Fat %"));
    }

    #[test]
    fn test_render_profile() {
        let text = render_profile(&profile(), "%Y-%m-%d", false);
        assert!(text.starts_with("BASIC INFO"));
        assert!(text.contains("Test Subject"));
        assert!(text.contains("1990-05-17"));
        assert!(text.contains("Male"));
        assert!(text.contains("175 cm"));
    }

    #[test]
    fn test_render_series_summary() {
        let records = vec![record("2024-01-05", 72.4, 58), record("2024-02-03", 71.0, 77)];
        let text = render_series_summary(&build_all(&records, &profile()));
        assert!(text.starts_with("TRENDS (2 scans)"));
        assert!(text.contains("Weight"));
        assert!(text.contains("72.4kg"));
        assert!(text.contains("23.64"));
    }

    #[test]
    fn test_stars() {
        assert_eq!(stars(3.85), "★★★☆☆");
        assert_eq!(stars(5.0), "★★★★★");
        assert_eq!(stars(0.0), "☆☆☆☆☆");
    }
}
