//! # Telemetry Module
//!
//! Point-in-time snapshots of decoded receiver state, formatted as JSON
//! Lines so they can be piped into other tools or appended to a file.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::crsf::protocol::{LinkStats, CRSF_NUM_CHANNELS};
use crate::receiver::{CrsfReceiver, ReceiverStats};

/// Decoded receiver state at one instant
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,

    /// Pulse widths in microseconds, index 0 holding channel 1
    pub channels: [u16; CRSF_NUM_CHANNELS],

    /// Absent until the first Link Statistics frame
    pub link_stats: Option<LinkStats>,

    pub stats: ReceiverStats,
}

impl Snapshot {
    /// Capture the receiver's current state
    pub fn capture(receiver: &CrsfReceiver) -> Self {
        Self::capture_at(receiver, Utc::now())
    }

    pub fn capture_at(receiver: &CrsfReceiver, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            channels: *receiver.channels().as_array(),
            link_stats: receiver.link_stats(),
            stats: receiver.stats(),
        }
    }

    /// Serialize as a single JSON line (no trailing newline)
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crsf::encoder::build_frame;
    use crate::crsf::protocol::PacketType;
    use chrono::TimeZone;

    #[test]
    fn test_snapshot_before_any_frame() {
        let receiver = CrsfReceiver::new();
        let timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let snapshot = Snapshot::capture_at(&receiver, timestamp);

        assert_eq!(snapshot.channels, [1500; CRSF_NUM_CHANNELS]);
        assert!(snapshot.link_stats.is_none());

        let line = snapshot.to_json_line().unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["timestamp"], "2024-05-01T12:00:00Z");
        assert_eq!(value["channels"][0], 1500);
        assert!(value["link_stats"].is_null());
        assert_eq!(value["stats"]["frames_ok"], 0);
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_snapshot_with_link_stats() {
        let mut receiver = CrsfReceiver::new();
        receiver.process_incoming(
            &build_frame(PacketType::LinkStatistics, &[50, 60, 90, 200]).unwrap(),
        );

        let snapshot = Snapshot::capture(&receiver);
        let value: serde_json::Value =
            serde_json::from_str(&snapshot.to_json_line().unwrap()).unwrap();

        assert_eq!(value["link_stats"]["rssi1"], -50);
        assert_eq!(value["link_stats"]["rssi2"], -60);
        assert_eq!(value["link_stats"]["link_quality"], 90);
        assert_eq!(value["link_stats"]["snr"], -56);
        assert_eq!(value["stats"]["frames_ok"], 1);
    }
}
