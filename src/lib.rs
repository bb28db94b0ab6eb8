//! # CRSF Receiver Library
//!
//! Read RC channels and link statistics from an ExpressLRS/CRSF receiver and
//! send battery telemetry back to the transmitter.
//!
//! The protocol core ([`crsf`], [`receiver`]) is transport-free: feed it bytes
//! with [`receiver::CrsfReceiver::process_incoming`] and read back decoded
//! state. [`serial`] binds it to a UART.
//!
//! ```
//! use crsf_receiver::receiver::CrsfReceiver;
//!
//! let mut receiver = CrsfReceiver::new();
//! // Link statistics frame: rssi -50/-60 dBm, 90% LQ, 10 dB SNR
//! receiver.process_incoming(&[0xC8, 0x06, 0x14, 50, 60, 90, 10, 0x40]);
//!
//! let stats = receiver.link_stats().unwrap();
//! assert_eq!(stats.rssi1, -50);
//! assert_eq!(receiver.channels().get(1), Some(1500));
//! ```

pub mod config;
pub mod crsf;
pub mod error;
pub mod receiver;
pub mod serial;
pub mod telemetry;
