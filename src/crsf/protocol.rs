//! # CRSF Protocol Constants and Types
//!
//! Core protocol definitions for CRSF (Crossfire) communication.
//!
//! Frame layout on the wire:
//!
//! ```text
//! [SYNC 0xC8] [LENGTH] [TYPE] [PAYLOAD ...] [CRC8]
//! ```
//!
//! `LENGTH` counts every byte after itself (type + payload + crc), so a whole
//! frame is `LENGTH + 2` bytes.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::Serialize;

use crate::error::{CrsfReceiverError, Result};

/// CRSF frame sync byte (always 0xC8)
pub const CRSF_SYNC_BYTE: u8 = 0xC8;

/// Smallest complete frame: sync + length + type + crc
pub const CRSF_MIN_FRAME_SIZE: usize = 4;

/// Largest complete frame
pub const CRSF_MAX_FRAME_SIZE: usize = 64;

/// Maximum CRSF payload size (64 - sync - length - type - crc)
pub const CRSF_MAX_PAYLOAD_SIZE: usize = CRSF_MAX_FRAME_SIZE - CRSF_MIN_FRAME_SIZE;

/// Offset of the first payload byte within a frame
pub const CRSF_PAYLOAD_OFFSET: usize = 3;

/// Number of RC channels
pub const CRSF_NUM_CHANNELS: usize = 16;

/// Bits per packed channel value
pub const CRSF_CHANNEL_BITS: usize = 11;

/// Mask for one packed channel value
pub const CRSF_CHANNEL_MASK: u32 = 0x07FF;

/// RC channels payload size (16 channels × 11 bits)
pub const CRSF_RC_CHANNELS_PAYLOAD_SIZE: usize = 22;

/// Pulse width reported for a channel before any RC frame arrives
pub const CHANNEL_DEFAULT_US: u16 = 1500;

/// Number of link statistics bytes this crate decodes
/// (rssi 1, rssi 2, link quality, snr)
pub const CRSF_LINK_STATS_DECODED_SIZE: usize = 4;

/// Battery Sensor payload size as sent by this crate
/// (voltage u16, current u16, capacity u16, remaining u8)
pub const CRSF_BATTERY_SENSOR_PAYLOAD_SIZE: usize = 7;

/// CRSF frame types
///
/// Only `RcChannelsPacked` and `LinkStatistics` are decoded; the others are
/// recognized so they can be skipped deliberately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum PacketType {
    Gps = 0x02,
    Vario = 0x07,
    BatterySensor = 0x08,
    BaroAlt = 0x09,
    Heartbeat = 0x0B,
    VideoTransmitter = 0x0F,
    LinkStatistics = 0x14,
    RcChannelsPacked = 0x16,
    Attitude = 0x1E,
    FlightMode = 0x21,
    DeviceInfo = 0x29,
}

/// Link statistics as reported by the receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkStats {
    /// Uplink RSSI, antenna 1, in dBm (negative)
    pub rssi1: i16,

    /// Uplink RSSI, antenna 2, in dBm (negative)
    pub rssi2: i16,

    /// Uplink link quality (0-100%)
    pub link_quality: u8,

    /// Uplink SNR in dB
    pub snr: i8,
}

/// Latest pulse width of each of the 16 RC channels, in microseconds
///
/// Channels are addressed 1..=16. Every channel starts at
/// [`CHANNEL_DEFAULT_US`] and is only ever overwritten, never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelState {
    values: [u16; CRSF_NUM_CHANNELS],
}

impl Default for ChannelState {
    fn default() -> Self {
        Self {
            values: [CHANNEL_DEFAULT_US; CRSF_NUM_CHANNELS],
        }
    }
}

impl ChannelState {
    /// Create a state with every channel at its default pulse width
    pub fn new() -> Self {
        Self::default()
    }

    /// Pulse width of a channel (1-based), or `None` outside 1..=16
    pub fn get(&self, channel: usize) -> Option<u16> {
        channel
            .checked_sub(1)
            .and_then(|index| self.values.get(index))
            .copied()
    }

    /// All channels in order, index 0 holding channel 1
    pub fn as_array(&self) -> &[u16; CRSF_NUM_CHANNELS] {
        &self.values
    }

    /// Iterate `(channel, microseconds)` pairs, channel numbers 1-based
    pub fn iter(&self) -> impl Iterator<Item = (usize, u16)> + '_ {
        self.values.iter().enumerate().map(|(i, &us)| (i + 1, us))
    }

    /// Replace every channel at once
    pub(crate) fn replace(&mut self, values: [u16; CRSF_NUM_CHANNELS]) {
        self.values = values;
    }
}

/// Battery sensor telemetry to send back to the transmitter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatterySensor {
    /// Battery voltage in volts
    pub voltage: f64,

    /// Current draw in amperes
    pub current: f64,

    /// Capacity used in mAh
    pub capacity_used: u32,

    /// Battery remaining percentage (0-100%)
    pub remaining_percent: u8,
}

impl BatterySensor {
    /// Voltage-only reading; current, capacity and remaining default to zero
    pub fn new(voltage: f64) -> Self {
        Self {
            voltage,
            current: 0.0,
            capacity_used: 0,
            remaining_percent: 0,
        }
    }
}

/// An outbound CRSF frame before serialization
#[derive(Debug, Clone)]
pub struct CrsfFrame {
    /// Frame type
    pub frame_type: u8,

    /// Payload data
    pub payload: Vec<u8>,
}

impl CrsfFrame {
    /// Create a new CRSF frame
    ///
    /// # Errors
    ///
    /// Returns error if payload exceeds CRSF_MAX_PAYLOAD_SIZE (60 bytes)
    pub fn new(frame_type: impl Into<u8>, payload: Vec<u8>) -> Result<Self> {
        if payload.len() > CRSF_MAX_PAYLOAD_SIZE {
            return Err(CrsfReceiverError::CrsfProtocol(format!(
                "Payload size {} exceeds maximum {}",
                payload.len(),
                CRSF_MAX_PAYLOAD_SIZE
            )));
        }

        Ok(Self {
            frame_type: frame_type.into(),
            payload,
        })
    }

    /// Value of the LENGTH byte (type + payload + crc)
    ///
    /// Cannot overflow since the payload is at most 60 bytes.
    pub fn length(&self) -> u8 {
        (1 + self.payload.len() + 1) as u8
    }
}
