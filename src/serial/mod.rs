//! # Serial Communication Module
//!
//! Connects a [`CrsfReceiver`] to a byte transport.
//!
//! This module handles:
//! - Opening the receiver's UART at 420,000 baud
//! - Draining whatever bytes have arrived, without waiting for more
//! - Writing battery telemetry frames back to the receiver
//! - Explicit close and caller-driven reconnection

pub mod port_trait;

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::crsf::encoder::encode_battery_sensor;
use crate::crsf::protocol::{BatterySensor, ChannelState, LinkStats};
use crate::error::{CrsfReceiverError, Result};
use crate::receiver::{CrsfReceiver, ReceiverStats};
pub use port_trait::{SerialPortIO, TokioSerialPort};

/// CRSF baud rate for ELRS receivers (420,000 baud)
pub const CRSF_BAUD_RATE: u32 = 420_000;

/// Open the first serial device that works
///
/// # Arguments
///
/// * `paths` - Device paths to try, in order (e.g., &["/dev/ttyS0"])
/// * `baud_rate` - Line speed
/// * `timeout` - Port read/write timeout
///
/// # Errors
///
/// Returns `SerialPortNotFound` listing every path if none could be opened
pub fn open_with_paths<S: AsRef<str>>(
    paths: &[S],
    baud_rate: u32,
    timeout: Duration,
) -> Result<TokioSerialPort> {
    for path in paths {
        let path = path.as_ref();
        debug!("Trying to open serial port: {}", path);

        match TokioSerialPort::open(path, baud_rate, timeout) {
            Ok(port) => {
                info!("Opened CRSF receiver at {} ({} baud)", path, baud_rate);
                return Ok(port);
            }
            Err(e) => {
                warn!("Failed to open {}: {}", path, e);
            }
        }
    }

    let tried: Vec<&str> = paths.iter().map(|p| p.as_ref()).collect();
    Err(CrsfReceiverError::SerialPortNotFound(tried.join(", ")))
}

/// A CRSF receiver bound to a (possibly closed) transport
///
/// Decoded state lives in the [`CrsfReceiver`] and survives reconnects.
pub struct ReceiverLink<P: SerialPortIO> {
    port: Option<P>,
    receiver: CrsfReceiver,
}

impl<P: SerialPortIO> std::fmt::Debug for ReceiverLink<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiverLink")
            .field("connected", &self.port.is_some())
            .field("receiver", &self.receiver)
            .finish()
    }
}

impl<P: SerialPortIO> Default for ReceiverLink<P> {
    fn default() -> Self {
        Self {
            port: None,
            receiver: CrsfReceiver::new(),
        }
    }
}

impl<P: SerialPortIO> ReceiverLink<P> {
    /// A link with no transport attached yet
    pub fn new() -> Self {
        Self::default()
    }

    /// A link already attached to `port`
    pub fn with_port(port: P) -> Self {
        let mut link = Self::new();
        link.connect(port);
        link
    }

    /// Attach a transport, closing any previous one
    ///
    /// A partial frame left over from the old transport is dropped.
    pub fn connect(&mut self, port: P) {
        self.close();
        self.receiver.reset_buffer();
        self.port = Some(port);
    }

    /// Release the transport. Returns `false` if it was already closed.
    pub fn close(&mut self) -> bool {
        match self.port.take() {
            Some(port) => {
                drop(port);
                debug!("Serial link closed");
                true
            }
            None => false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    /// Read every byte that has already arrived and decode it
    ///
    /// # Returns
    ///
    /// * `Result<usize>` - Number of bytes read this cycle (0 if none waiting)
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` if no transport is attached. A transport failure
    /// closes the link and returns `Serial`; reconnecting is up to the caller.
    pub async fn update(&mut self) -> Result<usize> {
        let port = self.port.as_mut().ok_or(CrsfReceiverError::NotConnected)?;

        let read = match port.bytes_available() {
            Ok(0) => return Ok(0),
            Ok(available) => port.read_available(available).await,
            Err(e) => Err(e),
        };

        match read {
            Ok(data) => {
                self.receiver.process_incoming(&data);
                Ok(data.len())
            }
            Err(e) => {
                self.close();
                Err(CrsfReceiverError::Serial(format!("Failed to read: {}", e)))
            }
        }
    }

    /// Write a complete frame and flush it
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` without a transport, `Serial` on write failure
    pub async fn send_packet(&mut self, packet: &[u8]) -> Result<()> {
        let port = self.port.as_mut().ok_or(CrsfReceiverError::NotConnected)?;

        port.write_all(packet)
            .await
            .map_err(|e| CrsfReceiverError::Serial(format!("Failed to write packet: {}", e)))?;

        port.flush()
            .await
            .map_err(|e| CrsfReceiverError::Serial(format!("Failed to flush serial port: {}", e)))?;

        debug!("Sent CRSF packet ({} bytes)", packet.len());
        Ok(())
    }

    /// Encode and send a battery sensor telemetry frame
    ///
    /// # Errors
    ///
    /// Returns `TelemetryOverflow` for unencodable values (nothing is written),
    /// otherwise the errors of [`send_packet`](Self::send_packet)
    pub async fn send_battery_telemetry(&mut self, battery: &BatterySensor) -> Result<()> {
        let frame = encode_battery_sensor(battery)?;
        self.send_packet(&frame).await
    }

    pub fn channels(&self) -> ChannelState {
        self.receiver.channels()
    }

    pub fn link_stats(&self) -> Option<LinkStats> {
        self.receiver.link_stats()
    }

    pub fn stats(&self) -> ReceiverStats {
        self.receiver.stats()
    }

    pub fn receiver(&self) -> &CrsfReceiver {
        &self.receiver
    }
}
