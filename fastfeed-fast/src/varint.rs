/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Stop-bit variable-length integer codec.
//!
//! Values are written as big-endian groups of 7 bits. The high bit of a byte
//! is set only on the last group. Signed values sign-extend from bit 6 of the
//! first group.

use crate::error::FastError;

/// High bit marking the last byte of a value.
pub const STOP_BIT: u8 = 0x80;

/// Maximum number of groups needed for a 64-bit value.
const MAX_GROUPS: usize = 10;

/// Decodes an unsigned integer using stop-bit encoding.
///
/// # Arguments
/// * `data` - The input bytes
/// * `offset` - Current position (will be updated)
///
/// # Errors
/// Returns `FastError::TruncatedInput` if the data ends before a stop bit and
/// `FastError::IntegerOverflow` if the value exceeds 64 bits.
pub fn decode_unsigned(data: &[u8], offset: &mut usize) -> Result<u64, FastError> {
    let mut result: u64 = 0;

    loop {
        let byte = *data.get(*offset).ok_or(FastError::TruncatedInput)?;
        *offset += 1;

        if result > (u64::MAX >> 7) {
            return Err(FastError::IntegerOverflow);
        }
        result = (result << 7) | u64::from(byte & 0x7F);

        if byte & STOP_BIT != 0 {
            return Ok(result);
        }
    }
}

/// Decodes a two's-complement signed integer using stop-bit encoding.
///
/// # Arguments
/// * `data` - The input bytes
/// * `offset` - Current position (will be updated)
///
/// # Errors
/// Returns `FastError::TruncatedInput` if the data ends before a stop bit and
/// `FastError::IntegerOverflow` if the value exceeds 64 bits.
pub fn decode_signed(data: &[u8], offset: &mut usize) -> Result<i64, FastError> {
    let first = *data.get(*offset).ok_or(FastError::TruncatedInput)?;
    let mut result: i64 = if first & 0x40 != 0 { -1 } else { 0 };

    loop {
        let byte = *data.get(*offset).ok_or(FastError::TruncatedInput)?;
        *offset += 1;

        if result > (i64::MAX >> 7) || result < (i64::MIN >> 7) {
            return Err(FastError::IntegerOverflow);
        }
        result = (result << 7) | i64::from(byte & 0x7F);

        if byte & STOP_BIT != 0 {
            return Ok(result);
        }
    }
}

/// Decodes a stop-bit terminated ASCII string.
///
/// A lone `0x80` byte is the empty string.
///
/// # Errors
/// Returns `FastError::TruncatedInput` if the data ends before a stop bit.
pub fn decode_ascii(data: &[u8], offset: &mut usize) -> Result<String, FastError> {
    let start = *offset;
    let len = data
        .get(start..)
        .and_then(|rest| rest.iter().position(|b| b & STOP_BIT != 0))
        .ok_or(FastError::TruncatedInput)?;
    *offset = start + len + 1;

    let raw = &data[start..=start + len];
    if raw == [STOP_BIT].as_slice() {
        return Ok(String::new());
    }

    let bytes: Vec<u8> = raw.iter().map(|b| b & 0x7F).collect();
    String::from_utf8(bytes).map_err(|_| FastError::InvalidString)
}

/// Appends the stop-bit encoding of an unsigned integer.
///
/// Zero encodes as the single byte `0x80`.
pub fn encode_unsigned(value: u64, out: &mut Vec<u8>) {
    let mut groups = [0u8; MAX_GROUPS];
    let mut start = MAX_GROUPS;
    let mut v = value;

    loop {
        start -= 1;
        groups[start] = (v & 0x7F) as u8;
        v >>= 7;
        if v == 0 {
            break;
        }
    }

    groups[MAX_GROUPS - 1] |= STOP_BIT;
    out.extend_from_slice(&groups[start..]);
}

/// Appends the stop-bit encoding of a signed integer.
///
/// Groups are emitted until the remaining value is pure sign extension of
/// bit 6 of the leading group.
pub fn encode_signed(value: i64, out: &mut Vec<u8>) {
    let mut groups = [0u8; MAX_GROUPS];
    let mut start = MAX_GROUPS;
    let mut v = value;

    loop {
        let group = (v & 0x7F) as u8;
        v >>= 7;
        start -= 1;
        groups[start] = group;

        let sign_set = group & 0x40 != 0;
        if (v == 0 && !sign_set) || (v == -1 && sign_set) {
            break;
        }
    }

    groups[MAX_GROUPS - 1] |= STOP_BIT;
    out.extend_from_slice(&groups[start..]);
}

/// Appends a stop-bit terminated ASCII string.
///
/// Bytes outside 7-bit ASCII are masked.
pub fn encode_ascii(value: &str, out: &mut Vec<u8>) {
    let bytes = value.as_bytes();
    let Some((last, head)) = bytes.split_last() else {
        out.push(STOP_BIT);
        return;
    };
    out.extend(head.iter().map(|b| b & 0x7F));
    out.push(last | STOP_BIT);
}

/// Returns the encoded length of an unsigned integer.
#[must_use]
pub const fn unsigned_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    if bits == 0 { 1 } else { bits.div_ceil(7) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn unsigned(value: u64) -> Vec<u8> {
        let mut out = Vec::new();
        encode_unsigned(value, &mut out);
        out
    }

    fn signed(value: i64) -> Vec<u8> {
        let mut out = Vec::new();
        encode_signed(value, &mut out);
        out
    }

    #[test]
    fn test_zero_is_single_stop_byte() {
        assert_eq!(unsigned(0), vec![0x80]);
        assert_eq!(signed(0), vec![0x80]);
    }

    #[test]
    fn test_decode_unsigned_multi_byte() {
        // 942 = 0b111_0101110 -> 0x07, 0xAE
        let data = [0x07, 0xAE];
        let mut offset = 0;
        assert_eq!(decode_unsigned(&data, &mut offset).unwrap(), 942);
        assert_eq!(offset, 2);
        assert_eq!(unsigned(942), data);
    }

    #[test]
    fn test_decode_signed_negative() {
        // -15: single group 0x71 with the stop bit.
        assert_eq!(signed(-15), vec![0xF1]);
        let mut offset = 0;
        assert_eq!(decode_signed(&[0xF1], &mut offset).unwrap(), -15);
    }

    #[test]
    fn test_signed_needs_extra_group_for_sign() {
        // 64 has bit 6 set in its only group, so a zero group leads.
        assert_eq!(signed(64), vec![0x00, 0xC0]);
        assert_eq!(signed(-65), vec![0x7F, 0xBF]);
    }

    #[test]
    fn test_truncated_input() {
        let mut offset = 0;
        assert_eq!(
            decode_unsigned(&[0x01, 0x02], &mut offset),
            Err(FastError::TruncatedInput)
        );
        let mut offset = 0;
        assert_eq!(decode_signed(&[], &mut offset), Err(FastError::TruncatedInput));
        let mut offset = 0;
        assert_eq!(
            decode_ascii(b"AB", &mut offset),
            Err(FastError::TruncatedInput)
        );
    }

    #[test]
    fn test_unsigned_overflow() {
        let data = [0x7F; 10].into_iter().chain([0xFF]).collect::<Vec<_>>();
        let mut offset = 0;
        assert_eq!(
            decode_unsigned(&data, &mut offset),
            Err(FastError::IntegerOverflow)
        );
    }

    #[test]
    fn test_ascii() {
        let mut out = Vec::new();
        encode_ascii("FNBB-EQ", &mut out);
        assert_eq!(out.last(), Some(&(b'Q' | 0x80)));

        let mut offset = 0;
        assert_eq!(decode_ascii(&out, &mut offset).unwrap(), "FNBB-EQ");
        assert_eq!(offset, out.len());
    }

    #[test]
    fn test_empty_ascii() {
        let mut out = Vec::new();
        encode_ascii("", &mut out);
        assert_eq!(out, vec![0x80]);
        let mut offset = 0;
        assert_eq!(decode_ascii(&out, &mut offset).unwrap(), "");
        assert_eq!(offset, 1);
    }

    #[test]
    fn test_unsigned_len() {
        assert_eq!(unsigned_len(0), 1);
        assert_eq!(unsigned_len(127), 1);
        assert_eq!(unsigned_len(128), 2);
        assert_eq!(unsigned_len(u64::MAX), 10);
    }

    proptest! {
        #[test]
        fn prop_unsigned_roundtrip(value in any::<u64>()) {
            let encoded = unsigned(value);
            prop_assert_eq!(encoded.len(), unsigned_len(value));
            let mut offset = 0;
            prop_assert_eq!(decode_unsigned(&encoded, &mut offset).unwrap(), value);
            prop_assert_eq!(offset, encoded.len());
        }

        #[test]
        fn prop_signed_roundtrip(value in prop_oneof![
            any::<i64>(),
            Just(i64::MIN),
            Just(i64::MAX),
            Just(-1i64),
            Just(-64i64),
            Just(63i64),
        ]) {
            let encoded = signed(value);
            let mut offset = 0;
            prop_assert_eq!(decode_signed(&encoded, &mut offset).unwrap(), value);
            prop_assert_eq!(offset, encoded.len());
        }
    }
}
