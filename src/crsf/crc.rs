//! # CRC8-DVB-S2 Implementation
//!
//! CRC-8-DVB-S2 checksum used by every CRSF frame.
//!
//! **Polynomial**: 0xD5 (x^8 + x^7 + x^6 + x^4 + x^2 + 1)
//! **Initial Value**: 0x00
//!
//! The checksum covers the frame type byte and the payload, never the sync
//! or length bytes.

/// CRC-8-DVB-S2 polynomial
const CRC8_POLY: u8 = 0xD5;

/// Lookup table, one entry per possible accumulator value
const CRC8_TABLE: [u8; 256] = build_table();

const fn build_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;

    while i < 256 {
        table[i] = shift_byte(i as u8);
        i += 1;
    }

    table
}

/// Run eight polynomial division steps over an accumulator
const fn shift_byte(mut acc: u8) -> u8 {
    let mut bit = 0;

    while bit < 8 {
        acc = if acc & 0x80 != 0 {
            (acc << 1) ^ CRC8_POLY
        } else {
            acc << 1
        };
        bit += 1;
    }

    acc
}

/// Fold one more byte into a running CRC
///
/// Lets callers checksum data that is not contiguous (e.g. a type byte
/// followed by a separately owned payload) without copying it.
#[inline]
pub fn crc8_update(crc: u8, byte: u8) -> u8 {
    CRC8_TABLE[(crc ^ byte) as usize]
}

/// Calculate the CRC8-DVB-S2 checksum of a byte span
///
/// # Arguments
///
/// * `data` - Type byte followed by the payload
///
/// # Examples
///
/// ```
/// use crsf_receiver::crsf::crc::crc8_dvb_s2;
///
/// assert_eq!(crc8_dvb_s2(&[]), 0x00);
/// assert_eq!(crc8_dvb_s2(b"123456789"), 0xBC);
/// ```
pub fn crc8_dvb_s2(data: &[u8]) -> u8 {
    data.iter().fold(0, |crc, &byte| crc8_update(crc, byte))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bit-at-a-time reference, straight from the algorithm description
    fn crc8_bitwise(data: &[u8]) -> u8 {
        let mut crc: u8 = 0;

        for &byte in data {
            crc ^= byte;
            for _ in 0..8 {
                if crc & 0x80 != 0 {
                    crc = (crc << 1) ^ CRC8_POLY;
                } else {
                    crc <<= 1;
                }
            }
        }

        crc
    }

    #[test]
    fn test_crc8_empty() {
        assert_eq!(crc8_dvb_s2(&[]), 0x00);
    }

    #[test]
    fn test_crc8_check_value() {
        // Standard CRC-8/DVB-S2 check string
        assert_eq!(crc8_dvb_s2(b"123456789"), 0xBC);
    }

    #[test]
    fn test_crc8_battery_frame_vector() {
        // Type + payload of a 11.8V / 100% battery sensor frame
        let data = [0x08, 0x00, 0x76, 0x00, 0x00, 0x00, 0x00, 100];
        assert_eq!(crc8_dvb_s2(&data), 0xFB);
    }

    #[test]
    fn test_crc8_rc_channels_vectors() {
        let mut zeros = vec![0x16];
        zeros.extend_from_slice(&[0x00; 22]);
        assert_eq!(crc8_dvb_s2(&zeros), 0xEF);

        let mut ones = vec![0x16];
        ones.extend_from_slice(&[0xFF; 22]);
        assert_eq!(crc8_dvb_s2(&ones), 0x8F);
    }

    #[test]
    fn test_table_matches_bitwise_for_every_single_byte() {
        for byte in 0..=255u8 {
            assert_eq!(crc8_dvb_s2(&[byte]), crc8_bitwise(&[byte]), "byte 0x{:02X}", byte);
        }
    }

    #[test]
    fn test_table_matches_bitwise_for_sequences() {
        let test_data = [
            vec![0x01, 0x02, 0x03],
            vec![0xFF, 0xFE, 0xFD],
            vec![0x14, 50, 60, 90, 10],
            vec![0x00; 24],
            vec![0xFF; 61],
        ];

        for data in test_data.iter() {
            assert_eq!(crc8_dvb_s2(data), crc8_bitwise(data), "CRC mismatch for data: {:?}", data);
        }
    }

    #[test]
    fn test_crc8_update_is_incremental() {
        let data = [0x14, 50, 60, 90, 200];
        let split = crc8_update(crc8_dvb_s2(&data[..1]), data[1]);
        let rest = data[2..].iter().fold(split, |crc, &b| crc8_update(crc, b));

        assert_eq!(rest, crc8_dvb_s2(&data));
    }
}
