//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/pulseboard/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/pulseboard/` (~/.config/pulseboard/)
//! - Data: `$XDG_DATA_HOME/pulseboard/` (~/.local/share/pulseboard/)
//! - State/Logs: `$XDG_STATE_HOME/pulseboard/` (~/.local/state/pulseboard/),
//!   one `pulseboard.YYYY-MM-DD.log` per day

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Report defaults
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Where session records come from
    #[serde(default)]
    pub source: SourceConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Defaults applied by the reporting operations
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MetricsConfig {
    /// Days of history analyzed by the trends report
    #[serde(default = "default_trend_days")]
    pub trend_days: u32,

    /// Sessions returned by the top-sessions report
    #[serde(default = "default_top_sessions_limit")]
    pub top_sessions_limit: usize,

    /// Projects listed in the team summary
    #[serde(default = "default_top_projects_limit")]
    pub top_projects_limit: usize,

    /// Sessions listed by the duration report
    #[serde(default = "default_longest_sessions_limit")]
    pub longest_sessions_limit: usize,

    /// Sessions listed as approaching their token limit
    #[serde(default = "default_approaching_limit_count")]
    pub approaching_limit_count: usize,

    /// Usage ratio above which a session counts as approaching its limit
    #[serde(default = "default_approaching_limit_ratio")]
    pub approaching_limit_ratio: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            trend_days: default_trend_days(),
            top_sessions_limit: default_top_sessions_limit(),
            top_projects_limit: default_top_projects_limit(),
            longest_sessions_limit: default_longest_sessions_limit(),
            approaching_limit_count: default_approaching_limit_count(),
            approaching_limit_ratio: default_approaching_limit_ratio(),
        }
    }
}

impl MetricsConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.trend_days == 0 {
            return Err(Error::Config(
                "metrics.trend_days must be at least 1".to_string(),
            ));
        }
        let limits = [
            ("top_sessions_limit", self.top_sessions_limit),
            ("top_projects_limit", self.top_projects_limit),
            ("longest_sessions_limit", self.longest_sessions_limit),
            ("approaching_limit_count", self.approaching_limit_count),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(Error::Config(format!("metrics.{name} must be at least 1")));
            }
        }
        if !(self.approaching_limit_ratio > 0.0 && self.approaching_limit_ratio <= 1.0) {
            return Err(Error::Config(
                "metrics.approaching_limit_ratio must be in (0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_trend_days() -> u32 {
    7
}

fn default_top_sessions_limit() -> usize {
    10
}

fn default_top_projects_limit() -> usize {
    10
}

fn default_longest_sessions_limit() -> usize {
    10
}

fn default_approaching_limit_count() -> usize {
    10
}

fn default_approaching_limit_ratio() -> f64 {
    0.8
}

/// Record source configuration
#[derive(Debug, Deserialize, Default, Clone)]
pub struct SourceConfig {
    /// Dashboard SQLite database (defaults to [`Config::database_path`])
    pub database: Option<PathBuf>,

    /// JSON snapshot file; takes precedence over `database` when set
    pub snapshot: Option<PathBuf>,
}

impl SourceConfig {
    /// Database path to read, falling back to the XDG default.
    pub fn database_path(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(Config::database_path)
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.metrics.validate()?;
        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/pulseboard/config.toml` (~/.config/pulseboard/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("pulseboard").join("config.toml")
    }

    /// Returns the data directory path (for the dashboard database)
    ///
    /// `$XDG_DATA_HOME/pulseboard/` (~/.local/share/pulseboard/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("pulseboard")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/pulseboard/` (~/.local/state/pulseboard/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("pulseboard")
    }

    /// Returns the database file path
    ///
    /// `$XDG_DATA_HOME/pulseboard/sessions.db` (~/.local/share/pulseboard/sessions.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("sessions.db")
    }

    /// Returns the log file written on `date`
    ///
    /// Logs rotate daily, so each UTC day gets its own file:
    /// `$XDG_STATE_HOME/pulseboard/pulseboard.YYYY-MM-DD.log`
    pub fn log_path_for(date: NaiveDate) -> PathBuf {
        Self::state_dir().join(format!("pulseboard.{}.log", date.format("%Y-%m-%d")))
    }
}
