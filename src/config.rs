use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::dataset::DEFAULT_DATE_FORMAT;
use crate::error::BodyTrackError;
use crate::logging::{LogConfig, LogFormat, LogLevel};

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// Where the profile and records documents live
    #[serde(default)]
    pub data: DataSettings,

    /// Report presentation
    #[serde(default)]
    pub display: DisplaySettings,

    /// Logging setup
    #[serde(default)]
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub profile_path: PathBuf,
    pub records_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// strftime pattern for record tab labels
    pub date_format: String,

    /// Colour terminal output
    pub color: bool,

    /// Show the weight-scaled skeletal muscle band in the detail view
    pub show_skeletal_range: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            data: DataSettings::default(),
            display: DisplaySettings::default(),
            logging: LogConfig::default(),
        }
    }
}

impl Default for DataSettings {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bodytrack");

        DataSettings {
            profile_path: data_dir.join("profile.json"),
            records_path: data_dir.join("records.json"),
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            color: true,
            show_skeletal_range: true,
        }
    }
}

/// Keys accepted by [`AppConfig::get_value`] and [`AppConfig::set_value`]
pub const CONFIG_KEYS: [&str; 9] = [
    "data.profile_path",
    "data.records_path",
    "display.date_format",
    "display.color",
    "display.show_skeletal_range",
    "logging.level",
    "logging.format",
    "logging.file_path",
    "logging.rotation",
];

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bodytrack")
            .join("config.toml")
    }

    /// Load configuration from `path`, falling back to defaults when the file
    /// does not exist. A file that exists but fails to parse is an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_file(path).map_err(|e| BodyTrackError::Configuration(format!("{:#}", e)))
    }

    /// Read a setting by dotted key, e.g. `display.date_format`
    pub fn get_value(&self, key: &str) -> Result<String> {
        let value = match key {
            "data.profile_path" => self.data.profile_path.display().to_string(),
            "data.records_path" => self.data.records_path.display().to_string(),
            "display.date_format" => self.display.date_format.clone(),
            "display.color" => self.display.color.to_string(),
            "display.show_skeletal_range" => self.display.show_skeletal_range.to_string(),
            "logging.level" => self.logging.level.to_filter().to_string(),
            "logging.format" => format!("{:?}", self.logging.format).to_lowercase(),
            "logging.file_path" => self
                .logging
                .file_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            "logging.rotation" => self.logging.rotation.to_string(),
            _ => bail!("Unknown configuration key: {}", key),
        };
        Ok(value)
    }

    /// Update a setting by dotted key. Values are parsed per key.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "data.profile_path" => self.data.profile_path = PathBuf::from(value),
            "data.records_path" => self.data.records_path = PathBuf::from(value),
            "display.date_format" => self.display.date_format = value.to_string(),
            "display.color" => self.display.color = parse_bool(key, value)?,
            "display.show_skeletal_range" => {
                self.display.show_skeletal_range = parse_bool(key, value)?
            }
            "logging.level" => {
                self.logging.level = value.parse::<LogLevel>().map_err(anyhow::Error::msg)?
            }
            "logging.format" => {
                self.logging.format = value.parse::<LogFormat>().map_err(anyhow::Error::msg)?
            }
            "logging.file_path" => {
                self.logging.file_path = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                }
            }
            "logging.rotation" => self.logging.rotation = parse_bool(key, value)?,
            _ => bail!("Unknown configuration key: {}", key),
        }
        Ok(())
    }

    /// All settings as `(key, value)` pairs
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        CONFIG_KEYS
            .iter()
            .filter_map(|key| self.get_value(key).ok().map(|v| (*key, v)))
            .collect()
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => bail!("Expected true or false for {}, got '{}'", key, value),
    }
}
