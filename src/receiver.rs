//! # CRSF Receiver State
//!
//! Owns everything decoded from one serial link: the pending byte buffer,
//! the 16 channel values and the latest link statistics. Transport-free, so
//! it can be fed from a serial port, a capture file or a test.

use serde::Serialize;
use tracing::{debug, trace};

use crate::crsf::decoder::{decode_packet, validate_frame, Packet};
use crate::crsf::encoder::encode_battery_sensor;
use crate::crsf::protocol::{BatterySensor, ChannelState, LinkStats};
use crate::crsf::sync::FrameSynchronizer;
use crate::error::Result;

/// Running counters of what the receiver has seen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReceiverStats {
    /// Frames that passed CRC and were decoded into state
    pub frames_ok: u64,
    /// Candidate frames dropped for a CRC mismatch
    pub crc_errors: u64,
    /// Bytes thrown away while resynchronizing
    pub bytes_discarded: u64,
    /// Valid frames of a type (or shape) this receiver does not decode
    pub ignored_frames: u64,
}

/// Decoded CRSF state for a single link
#[derive(Debug, Default)]
pub struct CrsfReceiver {
    sync: FrameSynchronizer,
    channels: ChannelState,
    link_stats: Option<LinkStats>,
    stats: ReceiverStats,
}

impl CrsfReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed newly read bytes and apply every complete valid frame
    ///
    /// Partial frames stay buffered until the next call. Corrupt frames are
    /// dropped without error; the previous state simply persists.
    pub fn process_incoming(&mut self, data: &[u8]) {
        self.sync.push(data);

        while let Some(frame) = self.sync.next_frame() {
            if !validate_frame(&frame) {
                trace!("Dropping frame with bad CRC ({} bytes)", frame.len());
                self.stats.crc_errors += 1;
                continue;
            }

            self.apply(decode_packet(&frame));
        }

        let discarded = self.sync.take_discarded();
        if discarded > 0 {
            debug!("Discarded {} bytes while resynchronizing", discarded);
            self.stats.bytes_discarded += discarded as u64;
        }
    }

    fn apply(&mut self, packet: Packet) {
        match packet {
            Packet::RcChannels(values) => {
                self.channels.replace(values);
                self.stats.frames_ok += 1;
            }
            Packet::LinkStatistics(stats) => {
                self.link_stats = Some(stats);
                self.stats.frames_ok += 1;
            }
            Packet::Ignored(packet_type) | Packet::Malformed(packet_type) => {
                trace!("Skipping {:?} frame", packet_type);
                self.stats.ignored_frames += 1;
            }
            Packet::Unknown(type_byte) => {
                trace!("Skipping unknown frame type 0x{:02X}", type_byte);
                self.stats.ignored_frames += 1;
            }
        }
    }

    /// Copy of the current channel values
    pub fn channels(&self) -> ChannelState {
        self.channels
    }

    /// Last decoded link statistics, `None` until the first one arrives
    pub fn link_stats(&self) -> Option<LinkStats> {
        self.link_stats
    }

    /// Copy of the receive counters
    pub fn stats(&self) -> ReceiverStats {
        self.stats
    }

    /// Bytes buffered while waiting for the rest of a frame
    pub fn pending_bytes(&self) -> usize {
        self.sync.buffered()
    }

    /// Drop any partially received frame, keeping decoded state
    pub fn reset_buffer(&mut self) {
        self.sync.clear();
    }

    /// Encode a battery telemetry frame ready to be written to the link
    ///
    /// # Errors
    ///
    /// Returns `TelemetryOverflow` if voltage, current or capacity do not fit
    /// their 16-bit fields.
    pub fn encode_battery_telemetry(
        &self,
        voltage: f64,
        current: f64,
        mah: u32,
        remaining_percent: u8,
    ) -> Result<Vec<u8>> {
        encode_battery_sensor(&BatterySensor {
            voltage,
            current,
            capacity_used: mah,
            remaining_percent,
        })
    }
}
