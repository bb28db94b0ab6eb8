//! # CRSF Protocol Module
//!
//! Implementation of the Crossfire (CRSF) protocol as seen from the flight
//! controller side of an ExpressLRS receiver.
//!
//! This module handles:
//! - CRC8-DVB-S2 checksum calculation
//! - Frame synchronization over an arbitrary byte stream
//! - Frame validation and payload decoding (RC channels, Link Statistics)
//! - Battery sensor telemetry encoding

pub mod crc;
pub mod decoder;
pub mod encoder;
pub mod protocol;
pub mod sync;
