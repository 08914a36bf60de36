//! Configuration management for the Waypath mission planner.
//!
//! This module provides a configuration system that supports:
//! - Loading from YAML files
//! - Environment variable overrides (`WAYPATH__SECTION__KEY`)
//! - Validation of all settings
//! - Local frame, interaction, export, receiver, tile and logging settings

use crate::error::{ConfigError, Result};
use crate::types::GeoPoint;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

/// Highest zoom level accepted for the local frame.
pub const MAX_ZOOM: u8 = 25;

/// Main application configuration.
///
/// # Examples
///
/// ```no_run
/// use waypath_core::config::AppConfig;
///
/// let config = AppConfig::from_file("waypath.yaml").unwrap();
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Local planar frame settings
    #[serde(default)]
    pub frame: FrameConfig,

    /// Pointer interaction tolerances
    #[serde(default)]
    pub interaction: InteractionConfig,

    /// Mission export transport
    #[serde(default)]
    pub export: ExportConfig,

    /// Mission receiver
    #[serde(default)]
    pub receiver: ReceiverConfig,

    /// Local tile source
    #[serde(default)]
    pub tiles: TileConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path.display().to_string()).into());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Self::from_yaml(&contents)
    }

    /// Loads configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be parsed.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            ConfigError::InvalidFormat {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Loads configuration using the `config` crate, layering `WAYPATH__*`
    /// environment variables over the YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or merged.
    pub fn from_config_builder<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let config = config::Config::builder()
            .add_source(config::File::from(path).required(true))
            .add_source(
                config::Environment::with_prefix("WAYPATH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::LoadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        config.try_deserialize().map_err(|e| {
            ConfigError::InvalidFormat {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<()> {
        self.frame.validate()?;
        self.interaction.validate()?;
        self.export.validate()?;
        self.receiver.validate()?;
        self.logging.parse_level()?;
        Ok(())
    }
}

/// Local planar frame settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameConfig {
    /// Origin latitude in decimal degrees
    #[serde(default = "default_origin_lat")]
    pub origin_lat: f64,

    /// Origin longitude in decimal degrees
    #[serde(default = "default_origin_lon")]
    pub origin_lon: f64,

    /// Tile zoom level the frame is computed at
    #[serde(default = "default_zoom")]
    pub zoom: u8,

    /// Planar units per tile
    #[serde(default = "default_unit_scale")]
    pub unit_scale: f64,
}

fn default_origin_lat() -> f64 {
    38.4063
}

fn default_origin_lon() -> f64 {
    -110.7918
}

fn default_zoom() -> u8 {
    18
}

fn default_unit_scale() -> f64 {
    10.0
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            origin_lat: default_origin_lat(),
            origin_lon: default_origin_lon(),
            zoom: default_zoom(),
            unit_scale: default_unit_scale(),
        }
    }
}

impl FrameConfig {
    /// Returns the configured origin as a validated point.
    pub fn origin(&self) -> Result<GeoPoint> {
        Ok(GeoPoint::new(self.origin_lat, self.origin_lon)?)
    }

    /// Validates the frame configuration.
    pub fn validate(&self) -> Result<()> {
        self.origin()?;

        if self.zoom > MAX_ZOOM {
            return Err(ConfigError::invalid_value(
                "frame.zoom",
                format!("must be at most {}", MAX_ZOOM),
            )
            .into());
        }

        if !self.unit_scale.is_finite() || self.unit_scale <= 0.0 {
            return Err(
                ConfigError::invalid_value("frame.unit_scale", "must be positive").into(),
            );
        }

        Ok(())
    }
}

/// Pointer tolerances at view magnification 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionConfig {
    /// Radius for picking an existing waypoint, in planar units
    #[serde(default = "default_pick_radius")]
    pub pick_radius: f64,

    /// Maximum distance to a segment for a press to insert rather than append
    #[serde(default = "default_insert_threshold")]
    pub insert_threshold: f64,
}

fn default_pick_radius() -> f64 {
    0.5
}

fn default_insert_threshold() -> f64 {
    0.3
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            pick_radius: default_pick_radius(),
            insert_threshold: default_insert_threshold(),
        }
    }
}

impl InteractionConfig {
    /// Returns `(pick_radius, insert_threshold)` for the given view magnification.
    ///
    /// Zooming in (larger magnification) shrinks both tolerances in planar units.
    pub fn thresholds_at(&self, magnification: f64) -> (f64, f64) {
        let magnification = if magnification > 0.0 { magnification } else { 1.0 };
        (
            self.pick_radius / magnification,
            self.insert_threshold / magnification,
        )
    }

    /// Validates the interaction configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.pick_radius > 0.0) {
            return Err(
                ConfigError::invalid_value("interaction.pick_radius", "must be positive").into(),
            );
        }

        if !(self.insert_threshold > 0.0) {
            return Err(ConfigError::invalid_value(
                "interaction.insert_threshold",
                "must be positive",
            )
            .into());
        }

        Ok(())
    }
}

/// Mission export transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Receiver hostname or IP address
    #[serde(default = "default_export_host")]
    pub host: String,

    /// Receiver port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Send timeout in seconds
    #[serde(default = "default_write_timeout")]
    pub write_timeout_secs: u64,

    /// Connection attempts before giving up (1 = no retry)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff before the first retry, in milliseconds
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Backoff ceiling, in milliseconds
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
}

fn default_export_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5005
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_write_timeout() -> u64 {
    5
}

fn default_max_attempts() -> u32 {
    1
}

fn default_initial_backoff() -> u64 {
    500
}

fn default_max_backoff() -> u64 {
    5_000
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            host: default_export_host(),
            port: default_port(),
            connect_timeout_secs: default_connect_timeout(),
            write_timeout_secs: default_write_timeout(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
        }
    }
}

impl ExportConfig {
    /// Returns the `host:port` address of the receiver.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    /// Validates the export configuration.
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(ConfigError::invalid_value("export.host", "cannot be empty").into());
        }

        if self.port == 0 {
            return Err(ConfigError::invalid_value("export.port", "Port cannot be 0").into());
        }

        if self.max_attempts == 0 {
            return Err(
                ConfigError::invalid_value("export.max_attempts", "must be at least 1").into(),
            );
        }

        Ok(())
    }
}

/// Mission receiver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiverConfig {
    /// Bind address
    #[serde(default = "default_bind_host")]
    pub bind_host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub bind_port: u16,

    /// Per-connection read timeout in seconds
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
}

fn default_bind_host() -> String {
    "127.0.0.1".to_string()
}

fn default_read_timeout() -> u64 {
    10
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            bind_host: default_bind_host(),
            bind_port: default_port(),
            read_timeout_secs: default_read_timeout(),
        }
    }
}

impl ReceiverConfig {
    /// Returns the receiver bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.bind_port)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Validates the receiver configuration.
    pub fn validate(&self) -> Result<()> {
        if self.read_timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "receiver.read_timeout_secs",
                "must be at least 1",
            )
            .into());
        }

        Ok(())
    }
}

/// Local tile source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileConfig {
    /// Directory laid out as `{z}/{x}/{y}.png`
    #[serde(default = "default_tile_root")]
    pub root: PathBuf,

    /// Number of tiles loaded on each side of the origin tile
    #[serde(default = "default_tile_radius")]
    pub radius: u32,
}

fn default_tile_root() -> PathBuf {
    PathBuf::from("./tiles")
}

fn default_tile_radius() -> u32 {
    2
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            root: default_tile_root(),
            radius: default_tile_radius(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "text" or "json"
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Text
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Parses the log level string to a tracing Level.
    pub fn parse_level(&self) -> Result<Level> {
        self.level.parse().map_err(|_| {
            ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Invalid log level: {}", self.level),
            }
            .into()
        })
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    Text,
    /// JSON format for structured logging
    Json,
}
