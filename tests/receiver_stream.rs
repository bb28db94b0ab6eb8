//! End-to-end decoding of raw byte streams through the public receiver API

use crsf_receiver::crsf::decoder::validate_frame;
use crsf_receiver::crsf::encoder::build_frame;
use crsf_receiver::crsf::protocol::{LinkStats, PacketType, CRSF_NUM_CHANNELS};
use crsf_receiver::receiver::CrsfReceiver;

/// Pack raw 11-bit channel values, LSB first
fn rc_channels_frame(raw: &[u16; CRSF_NUM_CHANNELS]) -> Vec<u8> {
    let mut bits: u128 = 0;
    let mut payload = Vec::with_capacity(22);
    let mut filled = 0;

    for &value in raw {
        bits |= ((value & 0x7FF) as u128) << filled;
        filled += 11;
        while filled >= 8 {
            payload.push(bits as u8);
            bits >>= 8;
            filled -= 8;
        }
    }

    build_frame(PacketType::RcChannelsPacked, &payload).unwrap()
}

fn link_stats_frame() -> Vec<u8> {
    build_frame(PacketType::LinkStatistics, &[50, 60, 90, 10]).unwrap()
}

fn sample_raw() -> [u16; CRSF_NUM_CHANNELS] {
    let mut raw = [992u16; CRSF_NUM_CHANNELS];
    raw[0] = 172;
    raw[2] = 1811;
    raw[5] = 0;
    raw[15] = 2047;
    raw
}

#[test]
fn garbage_prefix_decodes_like_clean_stream() {
    let frame = rc_channels_frame(&sample_raw());

    let mut clean = CrsfReceiver::new();
    clean.process_incoming(&frame);

    let mut noisy = CrsfReceiver::new();
    let mut data = vec![0x00, 0x00];
    data.extend_from_slice(&frame);
    noisy.process_incoming(&data);

    assert_eq!(noisy.channels(), clean.channels());
    assert_eq!(noisy.stats().frames_ok, 1);
    assert_eq!(noisy.stats().bytes_discarded, 2);
}

#[test]
fn split_frame_decodes_like_whole_frame() {
    let frame = rc_channels_frame(&sample_raw());

    let mut whole = CrsfReceiver::new();
    whole.process_incoming(&frame);

    for split in 0..=frame.len() {
        let mut parts = CrsfReceiver::new();
        parts.process_incoming(&frame[..split]);
        parts.process_incoming(&frame[split..]);

        assert_eq!(parts.channels(), whole.channels(), "split at {}", split);
        assert_eq!(parts.pending_bytes(), 0);
    }
}

#[test]
fn decoded_channel_values() {
    let mut receiver = CrsfReceiver::new();
    receiver.process_incoming(&rc_channels_frame(&sample_raw()));

    let channels = receiver.channels();
    assert_eq!(channels.get(1), Some(988));
    assert_eq!(channels.get(2), Some(1496));
    assert_eq!(channels.get(3), Some(2004));
    assert_eq!(channels.get(6), Some(881));
    assert_eq!(channels.get(16), Some(2150));
}

#[test]
fn interleaved_frames_and_noise() {
    let mut data = Vec::new();
    data.extend_from_slice(&[0xC8, 0xFF, 0x13]);
    data.extend(link_stats_frame());
    data.extend(build_frame(PacketType::Attitude, &[0u8; 6]).unwrap());
    data.extend(rc_channels_frame(&[0; CRSF_NUM_CHANNELS]));

    let mut corrupt = link_stats_frame();
    corrupt[4] ^= 0x80;
    data.extend(corrupt);

    let mut receiver = CrsfReceiver::new();
    for chunk in data.chunks(5) {
        receiver.process_incoming(chunk);
    }

    assert_eq!(
        receiver.link_stats(),
        Some(LinkStats {
            rssi1: -50,
            rssi2: -60,
            link_quality: 90,
            snr: 10,
        })
    );
    assert!(receiver.channels().iter().all(|(_, us)| us == 881));

    let stats = receiver.stats();
    assert_eq!(stats.frames_ok, 2);
    assert_eq!(stats.ignored_frames, 1);
    assert_eq!(stats.crc_errors, 1);
    assert_eq!(stats.bytes_discarded, 3);
}

#[test]
fn channels_read_is_idempotent() {
    let mut receiver = CrsfReceiver::new();
    receiver.process_incoming(&rc_channels_frame(&sample_raw()));

    assert_eq!(receiver.channels(), receiver.channels());
    assert_eq!(receiver.link_stats(), receiver.link_stats());
}

#[test]
fn battery_frame_is_accepted_by_validator() {
    let receiver = CrsfReceiver::new();
    let frame = receiver.encode_battery_telemetry(16.8, 12.5, 450, 73).unwrap();
    assert!(validate_frame(&frame));
}
