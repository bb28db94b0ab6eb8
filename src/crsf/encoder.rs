//! # CRSF Packet Encoder
//!
//! Builds outbound frames. The only telemetry this crate originates is the
//! battery sensor packet.

use super::crc::crc8_update;
use super::protocol::*;
use crate::error::{CrsfReceiverError, Result};

/// Serialize a type byte and payload into a complete frame
///
/// # Returns
///
/// * `Result<Vec<u8>>` - `[sync, length, type, payload..., crc]`
///
/// # Errors
///
/// Returns error if the payload exceeds CRSF_MAX_PAYLOAD_SIZE (60 bytes)
pub fn build_frame(frame_type: impl Into<u8>, payload: &[u8]) -> Result<Vec<u8>> {
    let frame = CrsfFrame::new(frame_type, payload.to_vec())?;
    Ok(encode_frame(&frame))
}

/// Serialize an already validated [`CrsfFrame`]
pub fn encode_frame(frame: &CrsfFrame) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(frame.payload.len() + CRSF_MIN_FRAME_SIZE);
    bytes.push(CRSF_SYNC_BYTE);
    bytes.push(frame.length());
    bytes.push(frame.frame_type);
    bytes.extend_from_slice(&frame.payload);

    // CRC over type + payload
    let crc = crc8_update(0, frame.frame_type);
    let crc = frame.payload.iter().fold(crc, |crc, &b| crc8_update(crc, b));
    bytes.push(crc);

    bytes
}

/// Encode battery telemetry into a complete Battery Sensor frame
///
/// Voltage and current are sent in 0.1 units, rounded to nearest. Payload
/// layout (big-endian): voltage u16, current u16, capacity u16, remaining u8.
///
/// # Errors
///
/// Returns [`CrsfReceiverError::TelemetryOverflow`] if a scaled value is
/// negative, not a number, or does not fit in 16 bits. Nothing is encoded
/// in that case.
///
/// # Examples
///
/// ```
/// use crsf_receiver::crsf::encoder::encode_battery_sensor;
/// use crsf_receiver::crsf::protocol::BatterySensor;
///
/// let battery = BatterySensor { remaining_percent: 100, ..BatterySensor::new(11.8) };
/// let frame = encode_battery_sensor(&battery)?;
/// assert_eq!(&frame[..5], &[0xC8, 9, 0x08, 0x00, 118]);
/// # Ok::<(), crsf_receiver::error::CrsfReceiverError>(())
/// ```
pub fn encode_battery_sensor(battery: &BatterySensor) -> Result<Vec<u8>> {
    let voltage = scale_tenths("voltage", battery.voltage)?;
    let current = scale_tenths("current", battery.current)?;
    let capacity = u16::try_from(battery.capacity_used).map_err(|_| {
        CrsfReceiverError::TelemetryOverflow {
            field: "capacity_used",
            value: battery.capacity_used as f64,
            max: u16::MAX as u32,
        }
    })?;

    let mut payload = Vec::with_capacity(CRSF_BATTERY_SENSOR_PAYLOAD_SIZE);
    payload.extend_from_slice(&voltage.to_be_bytes());
    payload.extend_from_slice(&current.to_be_bytes());
    payload.extend_from_slice(&capacity.to_be_bytes());
    payload.push(battery.remaining_percent);

    build_frame(PacketType::BatterySensor, &payload)
}

/// Scale a reading to 0.1 resolution and check it fits a u16 field
fn scale_tenths(field: &'static str, value: f64) -> Result<u16> {
    let scaled = (value * 10.0).round();

    if !(0.0..=u16::MAX as f64).contains(&scaled) {
        return Err(CrsfReceiverError::TelemetryOverflow {
            field,
            value,
            max: u16::MAX as u32,
        });
    }

    Ok(scaled as u16)
}
