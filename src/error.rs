//! # Error Types
//!
//! Custom error types for the CRSF receiver using `thiserror`.
//!
//! Corrupt frames on the wire are not errors: the synchronizer drops them
//! silently. Only transport problems, bad configuration and unencodable
//! telemetry values surface here.

use thiserror::Error;

/// Main error type for the CRSF receiver
#[derive(Debug, Error)]
pub enum CrsfReceiverError {
    /// CRSF protocol errors (frame construction)
    #[error("CRSF protocol error: {0}")]
    CrsfProtocol(String),

    /// Telemetry value does not fit its wire field
    #[error("Telemetry value out of range: {field} = {value} (max {max})")]
    TelemetryOverflow {
        field: &'static str,
        value: f64,
        max: u32,
    },

    /// Serial transport errors (open, read, write)
    #[error("Serial error: {0}")]
    Serial(String),

    /// None of the candidate serial devices could be opened
    #[error("No serial device found (tried: {0})")]
    SerialPortNotFound(String),

    /// Operation needs an open link
    #[error("Not connected")]
    NotConnected,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the CRSF receiver
pub type Result<T> = std::result::Result<T, CrsfReceiverError>;
