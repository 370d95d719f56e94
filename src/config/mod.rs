//! Configuration loading and management

mod io;

pub use io::DEFAULT_CONFIG;

use std::path::PathBuf;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Record store location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Report export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Timer defaults
    #[serde(default)]
    pub timer: TimerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Hide internal error details from API responses
    pub production: bool,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5001,
            production: false,
            max_body_bytes: 2 * 1024 * 1024, // 2 MiB
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Defaults to ~/.donow/donow.db
    pub db_path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| Config::global_config_dir().join("donow.db"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Where report files are written before download
    pub temp_dir: Option<PathBuf>,
    /// Single ASCII character
    pub csv_delimiter: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            csv_delimiter: ",".to_string(),
        }
    }
}

impl ExportConfig {
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("donow-export"))
    }

    pub fn delimiter(&self) -> u8 {
        match self.csv_delimiter.as_bytes() {
            [b] if b.is_ascii() => *b,
            _ => b',',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Open actions older than this are closed by `POST /api/timer/cleanup`
    pub cleanup_after_minutes: i64,
    pub default_note: String,
    /// Daily goal given to new habit tasks
    pub default_daily_goal: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            cleanup_after_minutes: 30,
            default_note: crate::domain::DEFAULT_NOTE.to_string(),
            default_daily_goal: crate::domain::DEFAULT_DAILY_GOAL,
        }
    }
}

impl Config {
    /// Create a config with sensible defaults
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.server.max_body_bytes == 0 {
            bail!("server.max_body_bytes must be greater than 0");
        }
        let delimiter = self.export.csv_delimiter.as_bytes();
        if delimiter.len() != 1 || !delimiter[0].is_ascii() {
            bail!(
                "export.csv_delimiter must be a single ASCII character, got {:?}",
                self.export.csv_delimiter
            );
        }
        if self.timer.cleanup_after_minutes <= 0 {
            bail!("timer.cleanup_after_minutes must be positive");
        }
        if self.timer.default_daily_goal == 0 {
            bail!("timer.default_daily_goal must be at least 1");
        }
        Ok(())
    }
}
