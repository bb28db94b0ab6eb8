//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::crsf::protocol::BatterySensor;
use crate::error::{CrsfReceiverError, Result};

/// Baud rates ExpressLRS receivers can be configured for
const VALID_BAUD_RATES: [u32; 6] = [115200, 400000, 420000, 921600, 1870000, 3750000];

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub receiver: ReceiverConfig,
    #[serde(default)]
    pub battery: BatteryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    /// Tried in order when `port` cannot be opened
    #[serde(default)]
    pub fallback_ports: Vec<String>,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,
}

/// Polling and reporting configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ReceiverConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_report_interval_ms")]
    pub report_interval_ms: u64,
}

/// Static battery telemetry sent back to the transmitter
#[derive(Debug, Deserialize, Clone)]
pub struct BatteryConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_battery_voltage")]
    pub voltage: f64,

    #[serde(default)]
    pub current: f64,

    #[serde(default)]
    pub capacity_mah: u32,

    #[serde(default = "default_remaining_percent")]
    pub remaining_percent: u8,

    #[serde(default = "default_battery_interval_ms")]
    pub interval_ms: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Also write daily rotated log files here when set
    #[serde(default)]
    pub dir: Option<String>,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyS0".to_string() }
fn default_baud_rate() -> u32 { 420000 }
fn default_timeout_ms() -> u64 { 1000 }
fn default_reconnect_interval_ms() -> u64 { 1000 }

fn default_poll_interval_ms() -> u64 { 5 }
fn default_report_interval_ms() -> u64 { 1000 }

fn default_battery_voltage() -> f64 { 11.8 }
fn default_remaining_percent() -> u8 { 100 }
fn default_battery_interval_ms() -> u64 { 1000 }

fn default_log_level() -> String { "info".to_string() }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            fallback_ports: Vec::new(),
            baud_rate: default_baud_rate(),
            timeout_ms: default_timeout_ms(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
        }
    }
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            report_interval_ms: default_report_interval_ms(),
        }
    }
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            voltage: default_battery_voltage(),
            current: 0.0,
            capacity_mah: 0,
            remaining_percent: default_remaining_percent(),
            interval_ms: default_battery_interval_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

impl SerialConfig {
    /// `port` followed by every fallback
    pub fn candidate_ports(&self) -> Vec<&str> {
        std::iter::once(self.port.as_str())
            .chain(self.fallback_ports.iter().map(String::as_str))
            .collect()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }
}

impl BatteryConfig {
    pub fn sensor(&self) -> BatterySensor {
        BatterySensor {
            voltage: self.voltage,
            current: self.current,
            capacity_used: self.capacity_mah,
            remaining_percent: self.remaining_percent,
        }
    }
}

fn invalid(msg: impl std::fmt::Display) -> CrsfReceiverError {
    CrsfReceiverError::Config(toml::de::Error::custom(msg))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing sections and fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use crsf_receiver::config::Config;
    ///
    /// let config = Config::load("config/receiver.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() || self.serial.fallback_ports.iter().any(String::is_empty) {
            return Err(invalid("serial port cannot be empty"));
        }

        if !VALID_BAUD_RATES.contains(&self.serial.baud_rate) {
            return Err(invalid(
                "baud_rate must be one of: 115200, 400000, 420000, 921600, 1870000, 3750000",
            ));
        }

        for (name, value, max) in [
            ("timeout_ms", self.serial.timeout_ms, 10_000),
            ("reconnect_interval_ms", self.serial.reconnect_interval_ms, 60_000),
            ("poll_interval_ms", self.receiver.poll_interval_ms, 1_000),
            ("report_interval_ms", self.receiver.report_interval_ms, 60_000),
            ("battery interval_ms", self.battery.interval_ms, 60_000),
        ] {
            if value == 0 || value > max {
                return Err(invalid(format!("{} must be between 1 and {}", name, max)));
            }
        }

        if self.battery.remaining_percent > 100 {
            return Err(invalid("battery remaining_percent must be between 0 and 100"));
        }

        if self.battery.enabled {
            // Reject values the encoder could never send
            crate::crsf::encoder::encode_battery_sensor(&self.battery.sensor())
                .map_err(|e| invalid(format!("battery telemetry cannot be encoded: {}", e)))?;
        }

        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(invalid(format!(
                "logging level '{}' must be one of: trace, debug, info, warn, error",
                self.logging.level
            )));
        }

        if matches!(self.logging.dir.as_deref(), Some("")) {
            return Err(invalid("logging dir cannot be empty when set"));
        }

        Ok(())
    }
}
