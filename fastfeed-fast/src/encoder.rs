/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! FAST payload encoder.
//!
//! Builds payloads field by field. The caller is responsible for writing
//! fields in template order and for presence bits matching the operators.

use crate::pmap::PresenceMap;
use crate::varint::{encode_ascii, encode_signed, encode_unsigned};
use bytes::Bytes;

/// FAST payload encoder.
#[derive(Debug, Default)]
pub struct FastEncoder {
    buffer: Vec<u8>,
}

impl FastEncoder {
    /// Creates a new encoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new encoder with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Encodes a presence map from the given bits.
    pub fn encode_pmap(&mut self, bits: &[bool]) {
        PresenceMap::from_bits(bits).encode(&mut self.buffer);
    }

    /// Encodes an unsigned integer using stop-bit encoding.
    pub fn encode_uint(&mut self, value: u64) {
        encode_unsigned(value, &mut self.buffer);
    }

    /// Encodes a signed integer using stop-bit encoding.
    pub fn encode_int(&mut self, value: i64) {
        encode_signed(value, &mut self.buffer);
    }

    /// Encodes an ASCII string using stop-bit encoding.
    pub fn encode_ascii(&mut self, value: &str) {
        encode_ascii(value, &mut self.buffer);
    }

    /// Returns the encoded payload.
    #[must_use]
    pub fn finish(self) -> Bytes {
        Bytes::from(self.buffer)
    }

    /// Returns the current buffer length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if nothing has been encoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clears the buffer for reuse.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_uint_one() {
        let mut encoder = FastEncoder::new();
        encoder.encode_uint(1);
        assert_eq!(encoder.finish().as_ref(), &[0x81]);
    }

    #[test]
    fn test_encode_ascii() {
        let mut encoder = FastEncoder::new();
        encoder.encode_ascii("Hi!");
        assert_eq!(encoder.finish().as_ref(), &[b'H', b'i', b'!' | 0x80]);
    }

    #[test]
    fn test_encode_payload_header() {
        let mut encoder = FastEncoder::with_capacity(16);
        encoder.encode_pmap(&[true]);
        encoder.encode_uint(64);
        assert_eq!(encoder.finish().as_ref(), &[0xC0, 0xC0]);
    }

    #[test]
    fn test_encoder_clear() {
        let mut encoder = FastEncoder::new();
        encoder.encode_int(-42);
        assert!(!encoder.is_empty());

        encoder.clear();
        assert!(encoder.is_empty());
    }
}
