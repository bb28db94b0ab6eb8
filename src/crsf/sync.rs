//! # CRSF Frame Synchronizer
//!
//! Recovers frame boundaries from an arbitrary byte stream.
//!
//! Bytes are appended at the tail of a growable buffer and complete frames are
//! split off the head. Anything that cannot start a frame is dropped one byte
//! at a time until the stream lines up on a sync byte with a plausible length.
//! Frames produced here are only *candidates*: their CRC has not been checked.

use bytes::{Buf, Bytes, BytesMut};
use tracing::trace;

use super::protocol::{CRSF_MAX_FRAME_SIZE, CRSF_MIN_FRAME_SIZE, CRSF_SYNC_BYTE};

/// Initial buffer capacity, enough for a few back-to-back frames
const INITIAL_CAPACITY: usize = 4 * CRSF_MAX_FRAME_SIZE;

/// Splits a received byte stream into candidate CRSF frames
#[derive(Debug)]
pub struct FrameSynchronizer {
    /// Received bytes not yet consumed into a frame
    buffer: BytesMut,
    /// Bytes dropped while hunting for sync since the last `take_discarded`
    discarded: usize,
}

impl Default for FrameSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSynchronizer {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(INITIAL_CAPACITY),
            discarded: 0,
        }
    }

    /// Append newly received bytes to the tail of the buffer
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Split the next complete candidate frame off the head of the buffer
    ///
    /// Returns `None` once the buffer holds no complete frame; the partial
    /// remainder stays buffered for the next `push`.
    pub fn next_frame(&mut self) -> Option<Bytes> {
        while self.buffer.len() > 2 {
            if self.buffer[0] != CRSF_SYNC_BYTE {
                self.drop_head();
                continue;
            }

            let expected_len = self.buffer[1] as usize + 2;

            if !(CRSF_MIN_FRAME_SIZE..=CRSF_MAX_FRAME_SIZE).contains(&expected_len) {
                // A real sync byte is never followed by this length
                trace!("Dropping sync byte with invalid frame length {}", expected_len);
                self.drop_head();
                continue;
            }

            if self.buffer.len() < expected_len {
                return None;
            }

            return Some(self.buffer.split_to(expected_len).freeze());
        }

        None
    }

    /// Drain every complete candidate frame currently buffered
    pub fn frames(&mut self) -> impl Iterator<Item = Bytes> + '_ {
        std::iter::from_fn(move || self.next_frame())
    }

    /// Number of bytes waiting for the rest of their frame
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes dropped during resynchronization since the last call
    pub fn take_discarded(&mut self) -> usize {
        std::mem::take(&mut self.discarded)
    }

    /// Forget everything buffered (e.g. after the link was reopened)
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    fn drop_head(&mut self) {
        self.buffer.advance(1);
        self.discarded += 1;
    }
}
