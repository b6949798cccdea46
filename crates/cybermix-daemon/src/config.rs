//! Daemon configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use cybermix_core::EngineConfig;
use cybermix_core::protocol::BAUD_RATE;
use cybermix_core::transport::DEFAULT_SIGNATURES;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Daemon settings
    #[serde(default)]
    pub daemon: DaemonConfig,
    /// Device settings
    #[serde(default)]
    pub device: DeviceConfig,
    /// Sync loop settings
    #[serde(default)]
    pub sync: SyncConfig,
    /// Settings file location
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Daemon-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self { log_level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Device settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Substrings that identify the board's serial port
    #[serde(default = "default_signatures")]
    pub signatures: Vec<String>,
    /// Serial line speed
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Serial read timeout in milliseconds
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            signatures: default_signatures(),
            baud_rate: default_baud_rate(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl DeviceConfig {
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

fn default_signatures() -> Vec<String> {
    DEFAULT_SIGNATURES.iter().map(ToString::to_string).collect()
}

fn default_baud_rate() -> u32 {
    BAUD_RATE
}

fn default_read_timeout_ms() -> u64 {
    100
}

/// Sync loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Poll period in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Ticks between reconnect attempts while the board is absent
    #[serde(default = "default_reconnect_interval_ticks")]
    pub reconnect_interval_ticks: u32,
    /// Seconds between channel directory refreshes (0 disables)
    #[serde(default = "default_directory_refresh_secs")]
    pub directory_refresh_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            reconnect_interval_ticks: default_reconnect_interval_ticks(),
            directory_refresh_secs: default_directory_refresh_secs(),
        }
    }
}

fn default_tick_ms() -> u64 {
    500
}

fn default_reconnect_interval_ticks() -> u32 {
    20
}

fn default_directory_refresh_secs() -> u64 {
    30
}

/// Settings file location.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Settings file path (optional, uses default if not set)
    pub path: Option<PathBuf>,
}

impl Config {
    /// Engine tuning derived from the device and sync sections.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            baud_rate: self.device.baud_rate,
            // A zero tick would spin the engine thread.
            tick: Duration::from_millis(self.sync.tick_ms.max(10)),
            reconnect_interval_ticks: self.sync.reconnect_interval_ticks.max(1),
        }
    }

    /// Period of the background directory refresh, if enabled.
    #[must_use]
    pub fn directory_refresh(&self) -> Option<Duration> {
        (self.sync.directory_refresh_secs > 0)
            .then(|| Duration::from_secs(self.sync.directory_refresh_secs))
    }
}

/// Load configuration from file or defaults.
pub fn load_config() -> Result<Config> {
    load_from(&config_path()?)
}

/// Load configuration from a specific file, falling back to defaults when
/// the file does not exist.
pub fn load_from(config_path: &Path) -> Result<Config> {
    if config_path.exists() {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {config_path:?}"))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {config_path:?}"))?;
        Ok(config)
    } else {
        info!(?config_path, "Config file not found, using defaults");
        Ok(Config::default())
    }
}

/// Get the configuration file path.
fn config_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("com", "cybermix", "CyberMix")
        .context("Could not determine config directory")?;
    Ok(dirs.config_dir().join("config.toml"))
}
