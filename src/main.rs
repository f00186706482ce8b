use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

use bodytrack::config::AppConfig;
use bodytrack::export::{self, ExportFormat, ExportTarget};
use bodytrack::formulas::format_value;
use bodytrack::logging::init_logging;
use bodytrack::{AxisBounds, BodyTrackError, Dataset, Metric};

/// bodytrack - Body Composition Tracker
///
/// Turns body-composition scan records into range-checked, trend-annotated
/// metrics: a per-scan overview with changes since the previous scan, and
/// per-metric trend series.
#[derive(Parser)]
#[command(name = "bodytrack")]
#[command(version)]
#[command(about = "Body composition metrics and trends", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Profile document (overrides config)
    #[arg(long, value_name = "FILE", global = true)]
    profile: Option<PathBuf>,

    /// Records document (overrides config)
    #[arg(long, value_name = "FILE", global = true)]
    records: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one scan with changes since the previous scan
    Overview {
        /// Scan date (YYYY-MM-DD), latest if omitted
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Summarize trend series across all scans
    Trends {
        /// Only this metric (e.g. weight, bmi, trunk_percentage)
        #[arg(short, long)]
        metric: Option<String>,
    },

    /// Export series or projected records
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Export format (csv, json, text); guessed from the extension if omitted
        #[arg(short = 'f', long)]
        format: Option<String>,

        /// What to export (series, records)
        #[arg(short, long, default_value = "series")]
        what: String,
    },

    /// Configure application settings
    Config {
        /// List all configuration options
        #[arg(short, long)]
        list: bool,

        /// Set a configuration value (KEY=VALUE)
        #[arg(short, long)]
        set: Option<String>,

        /// Get a configuration value
        #[arg(short, long)]
        get: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(AppConfig::default_config_path);
    let mut config =
        AppConfig::load_or_default(&config_path).map_err(|e| anyhow::anyhow!(e.user_message()))?;

    let mut log_config = config.logging.clone();
    log_config.level = log_config.level.raised_by(cli.verbose);
    init_logging(&log_config)?;

    if !config.display.color {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Overview { date } => {
            let dataset = load_dataset(&config, &cli.profile, &cli.records)?;
            run_overview(&dataset, &config, date.as_deref())?;
        }

        Commands::Trends { metric } => {
            let dataset = load_dataset(&config, &cli.profile, &cli.records)?;
            run_trends(&dataset, metric.as_deref())?;
        }

        Commands::Export {
            output,
            format,
            what,
        } => {
            let dataset = load_dataset(&config, &cli.profile, &cli.records)?;
            let format = match format {
                Some(f) => ExportFormat::from_str(&f)?,
                None => ExportFormat::from_path(&output).unwrap_or(ExportFormat::Csv),
            };
            let target = ExportTarget::from_str(&what)?;

            export::export_dataset(&dataset, format, target, &output)
                .with_context(|| format!("Failed to export to {}", output.display()))?;
            println!(
                "{} {}",
                "✓ Exported to".green(),
                output.display().to_string().bold()
            );
        }

        Commands::Config { list, set, get } => {
            if list {
                println!("{} {}", "Config file:".bold(), config_path.display());
                for (key, value) in config.entries() {
                    println!("  {} = {}", key.cyan(), value);
                }
            } else if let Some(key_value) = set {
                let (key, value) = key_value
                    .split_once('=')
                    .with_context(|| format!("Expected KEY=VALUE, got '{}'", key_value))?;
                config.set_value(key.trim(), value.trim())?;
                config.save_to_file(&config_path)?;
                println!("{} {} = {}", "✓ Set".green(), key.trim(), value.trim());
            } else if let Some(key) = get {
                println!("{}", config.get_value(&key)?);
            } else {
                println!("Use --list, --get KEY or --set KEY=VALUE");
            }
        }
    }

    Ok(())
}

fn load_dataset(
    config: &AppConfig,
    profile: &Option<PathBuf>,
    records: &Option<PathBuf>,
) -> Result<Dataset> {
    let profile_path = profile.as_ref().unwrap_or(&config.data.profile_path);
    let records_path = records.as_ref().unwrap_or(&config.data.records_path);

    Dataset::load(profile_path, records_path).map_err(report)
}

/// Log a library error at its severity and turn it into a user-facing message
fn report(err: impl Into<BodyTrackError>) -> anyhow::Error {
    let err = err.into();
    let severity = err.severity();
    if severity.to_tracing_level() == tracing::Level::WARN {
        tracing::warn!(?severity, "{}", err);
    } else {
        tracing::error!(?severity, "{}", err);
    }
    anyhow::anyhow!(err.user_message())
}

fn run_overview(dataset: &Dataset, config: &AppConfig, date: Option<&str>) -> Result<()> {
    let selected = match date {
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", text))?,
        None => match dataset.latest() {
            Some(record) => record.date,
            None => {
                println!("{}", "No scans recorded yet.".yellow());
                return Ok(());
            }
        },
    };

    print!(
        "{}",
        export::text::render_profile(
            dataset.profile(),
            &config.display.date_format,
            config.display.color
        )
    );
    println!();

    let tabs = dataset.record_tabs(&config.display.date_format);
    for tab in &tabs {
        if tab.key == selected {
            println!("{} {}", "▸".bold(), tab.label.bold());
        } else {
            println!("  {}", tab.label.dimmed());
        }
    }
    println!();

    let mut view = dataset.project(selected).map_err(report)?;
    if !config.display.show_skeletal_range {
        view.clear_range(Metric::SkeletalMuscle.key());
    }

    print!(
        "{}",
        export::text::render_record_view(&view, config.display.color)
    );
    Ok(())
}

fn run_trends(dataset: &Dataset, metric: Option<&str>) -> Result<()> {
    let set = dataset.series();

    let Some(key) = metric else {
        print!("{}", export::text::render_series_summary(&set));
        return Ok(());
    };

    let Some(series) = set.find(key) else {
        let known: Vec<&str> = set.iter().map(|s| s.key.as_str()).collect();
        bail!("Unknown metric '{}'. Known metrics: {}", key, known.join(", "));
    };

    println!("{}", series.title.bold());
    if let Some(range) = series.range {
        println!("  Range: {}-{}", range.low, range.high);
    }
    if let Some(line) = series.reference_line {
        println!("  Standard: {}", line);
    }
    if let Some(bounds) = AxisBounds::for_series(series) {
        println!("  Axis: {}..{}", bounds.min, bounds.max);
    }
    println!();

    let unit = series.unit.as_deref().unwrap_or("");
    for point in &series.points {
        let text = match format_value(point.value, series.decimal_places) {
            Some(v) => format!("{}{}", v, unit),
            None => "-".to_string(),
        };
        let text = match point.in_range {
            Some(true) => text.green(),
            Some(false) => text.red(),
            None => text.normal(),
        };
        println!("  {}  {}", point.date.format("%Y-%m-%d"), text);
    }

    Ok(())
}
