//! # CRSF Packet Decoder
//!
//! Validates candidate frames and decodes RC channel and link statistics
//! payloads. Every other frame type is recognized and skipped.

use super::crc::crc8_dvb_s2;
use super::protocol::*;

/// Result of decoding one validated frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packet {
    /// Pulse widths in microseconds, index 0 holding channel 1
    RcChannels([u16; CRSF_NUM_CHANNELS]),

    /// Uplink link statistics
    LinkStatistics(LinkStats),

    /// Known frame type without a decoder
    Ignored(PacketType),

    /// Known decodable type whose payload is too short
    Malformed(PacketType),

    /// Type byte this crate does not know
    Unknown(u8),
}

/// Check a complete frame against its trailing CRC
///
/// The CRC covers the type byte and the payload (`frame[2..len - 1]`).
/// Anything shorter than a minimal frame is invalid.
pub fn validate_frame(frame: &[u8]) -> bool {
    match frame {
        [_, _, body @ .., crc] if frame.len() >= CRSF_MIN_FRAME_SIZE => crc8_dvb_s2(body) == *crc,
        _ => false,
    }
}

/// Decode a frame that already passed [`validate_frame`]
///
/// Dispatches on the type byte at `frame[2]`.
pub fn decode_packet(frame: &[u8]) -> Packet {
    if frame.len() < CRSF_MIN_FRAME_SIZE {
        return Packet::Unknown(frame.get(2).copied().unwrap_or_default());
    }

    let type_byte = frame[2];
    let payload = &frame[CRSF_PAYLOAD_OFFSET..frame.len() - 1];

    let packet_type = match PacketType::try_from(type_byte) {
        Ok(packet_type) => packet_type,
        Err(_) => return Packet::Unknown(type_byte),
    };

    match packet_type {
        PacketType::RcChannelsPacked => Packet::RcChannels(decode_rc_channels(payload)),
        PacketType::LinkStatistics => match decode_link_statistics(payload) {
            Some(stats) => Packet::LinkStatistics(stats),
            None => Packet::Malformed(packet_type),
        },
        PacketType::Gps
        | PacketType::Vario
        | PacketType::BatterySensor
        | PacketType::BaroAlt
        | PacketType::Heartbeat
        | PacketType::VideoTransmitter
        | PacketType::Attitude
        | PacketType::FlightMode
        | PacketType::DeviceInfo => Packet::Ignored(packet_type),
    }
}

/// Unpack sixteen 11-bit channels and convert them to microseconds
///
/// Channel `i` starts at bit `i * 11`, LSB first. A payload shorter than
/// 22 bytes is tolerated: missing bytes contribute zero bits.
///
/// ```text
/// Byte 0: Ch1[0:7]
/// Byte 1: Ch1[8:10] | Ch2[0:4]
/// Byte 2: Ch2[5:10] | Ch3[0:1]
/// ...
/// ```
pub fn decode_rc_channels(payload: &[u8]) -> [u16; CRSF_NUM_CHANNELS] {
    let mut channels = [0u16; CRSF_NUM_CHANNELS];

    for (i, channel) in channels.iter_mut().enumerate() {
        let bit = i * CRSF_CHANNEL_BITS;
        let byte_index = bit / 8;

        let raw = (0..3)
            .filter_map(|k| payload.get(byte_index + k).map(|&b| (b as u32) << (8 * k)))
            .fold(0u32, |acc, part| acc | part);

        let value = (raw >> (bit % 8)) & CRSF_CHANNEL_MASK;
        *channel = ticks_to_us(value as u16);
    }

    channels
}

/// Convert an 11-bit channel value to microseconds
///
/// `round(raw * 0.62 + 881)` in exact integer arithmetic, halves rounding up.
pub fn ticks_to_us(raw: u16) -> u16 {
    ((raw as u32 * 62 + 88_100 + 50) / 100) as u16
}

/// Decode the leading fields of a Link Statistics payload
///
/// Returns `None` when fewer than `CRSF_LINK_STATS_DECODED_SIZE` payload
/// bytes are present.
pub fn decode_link_statistics(payload: &[u8]) -> Option<LinkStats> {
    let fields = payload.get(..CRSF_LINK_STATS_DECODED_SIZE)?;

    Some(LinkStats {
        rssi1: -(fields[0] as i16),
        rssi2: -(fields[1] as i16),
        link_quality: fields[2],
        snr: fields[3] as i8,
    })
}
