//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/leadboard/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/leadboard/` (~/.config/leadboard/)
//! - Data: `$XDG_DATA_HOME/leadboard/` (~/.local/share/leadboard/)
//! - State/Logs: `$XDG_STATE_HOME/leadboard/` (~/.local/state/leadboard/)

use crate::error::{Error, Result};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Prefix of the daily log files. Each file gets a `.YYYY-MM-DD` suffix.
pub const LOG_FILE_PREFIX: &str = "leadboard.log";

/// Environment variable that overrides `source.api_key`.
pub const API_KEY_ENV: &str = "LEADBOARD_API_KEY";

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
    /// Where leads come from
    #[serde(default)]
    pub source: SourceConfig,

    /// Dashboard layout options
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Kind of lead source
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Local SQLite file
    #[default]
    Sqlite,
    /// Hosted table behind a PostgREST-style API
    Rest,
}

/// Lead source configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,

    /// Project URL of the hosted API (e.g., `https://xyz.supabase.co`)
    pub rest_url: Option<String>,

    /// API key (can also use the LEADBOARD_API_KEY env var)
    pub api_key: Option<String>,

    /// Table holding the leads
    #[serde(default = "default_table")]
    pub table: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Override for the SQLite file
    pub sqlite_path: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            rest_url: None,
            api_key: None,
            table: default_table(),
            timeout_secs: default_timeout(),
            sqlite_path: None,
        }
    }
}

impl SourceConfig {
    /// API key, preferring the environment over the file.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.api_key.clone())
    }

    /// SQLite file to open for the local source.
    pub fn sqlite_path(&self) -> PathBuf {
        self.sqlite_path
            .clone()
            .unwrap_or_else(Config::database_path)
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.kind != SourceKind::Rest {
            return Ok(());
        }
        if self.rest_url.is_none() {
            return Err(Error::Config(
                "source.rest_url is required when source.kind = \"rest\"".to_string(),
            ));
        }
        if self.api_key().is_none() {
            return Err(Error::Config(format!(
                "source.api_key (or {}) is required when source.kind = \"rest\"",
                API_KEY_ENV
            )));
        }
        if self.table.trim().is_empty() {
            return Err(Error::Config("source.table must not be empty".to_string()));
        }
        Ok(())
    }
}

fn default_table() -> String {
    "power_lpbr".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Dashboard configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    /// Days shown in the evolution chart when no date range is set
    #[serde(default = "default_history_days")]
    pub history_days: u32,

    /// Entries in the tag bar chart
    #[serde(default = "default_top_tags")]
    pub top_tags: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            history_days: default_history_days(),
            top_tags: default_top_tags(),
        }
    }
}

fn default_history_days() -> u32 {
    30
}

fn default_top_tags() -> usize {
    crate::analytics::TOP_TAGS
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

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/leadboard/config.toml` (~/.config/leadboard/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("leadboard").join("config.toml")
    }

    /// Returns the data directory path (for the local lead store)
    ///
    /// `$XDG_DATA_HOME/leadboard/` (~/.local/share/leadboard/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("leadboard")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/leadboard/` (~/.local/state/leadboard/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("leadboard")
    }

    /// Returns the local lead store path
    ///
    /// `$XDG_DATA_HOME/leadboard/leads.db` (~/.local/share/leadboard/leads.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("leads.db")
    }

    /// Returns the log file being written today
    ///
    /// `$XDG_STATE_HOME/leadboard/leadboard.log.YYYY-MM-DD`, dated in UTC like
    /// the daily appender
    pub fn log_path() -> PathBuf {
        Self::log_path_on(Utc::now().date_naive())
    }

    /// Returns the log file for one UTC day
    pub fn log_path_on(day: NaiveDate) -> PathBuf {
        Self::state_dir().join(format!("{}.{}", LOG_FILE_PREFIX, day.format("%Y-%m-%d")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.source.kind, SourceKind::Sqlite);
        assert_eq!(config.source.table, "power_lpbr");
        assert_eq!(config.source.timeout_secs, 30);
        assert_eq!(config.dashboard.history_days, 30);
        assert_eq!(config.dashboard.top_tags, 10);
        assert_eq!(config.logging.level, "info");
        assert!(config.source.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[source]
kind = "rest"
rest_url = "https://example.supabase.co"
api_key = "anon"
table = "leads"

[dashboard]
history_days = 7

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.source.kind, SourceKind::Rest);
        assert_eq!(
            config.source.rest_url.as_deref(),
            Some("https://example.supabase.co")
        );
        assert_eq!(config.source.table, "leads");
        assert_eq!(config.dashboard.history_days, 7);
        assert_eq!(config.dashboard.top_tags, 10);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_rest_source_validation() {
        let config = SourceConfig {
            kind: SourceKind::Rest,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SourceConfig {
            kind: SourceKind::Rest,
            rest_url: Some("https://example.supabase.co".to_string()),
            api_key: Some("anon".to_string()),
            table: " ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sqlite_path_override() {
        let config = SourceConfig {
            sqlite_path: Some(PathBuf::from("/tmp/leads.db")),
            ..Default::default()
        };
        assert_eq!(config.sqlite_path(), PathBuf::from("/tmp/leads.db"));
        assert!(SourceConfig::default().sqlite_path().ends_with("leads.db"));
    }
}
