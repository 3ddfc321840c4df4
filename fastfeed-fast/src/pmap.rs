/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! FAST presence map handling.
//!
//! The presence map (PMAP) leads every payload and tells the decoder which
//! operator-bearing fields are transmitted. Each byte contributes its low 7
//! bits, most significant first; the high bit marks the last byte.

use crate::error::FastError;
use crate::varint::STOP_BIT;
use smallvec::SmallVec;

/// FAST presence map.
///
/// Bits are consumed in order as fields are decoded. Reading past the
/// encoded bits yields `false`.
#[derive(Debug, Clone, Default)]
pub struct PresenceMap {
    /// Raw 7-bit groups, stop bit stripped.
    groups: SmallVec<[u8; 4]>,
    /// Next bit to consume.
    position: usize,
}

impl PresenceMap {
    /// Creates an empty presence map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a presence map from individual bits.
    #[must_use]
    pub fn from_bits(bits: &[bool]) -> Self {
        let groups = bits
            .chunks(7)
            .map(|chunk| {
                chunk
                    .iter()
                    .enumerate()
                    .fold(0u8, |acc, (i, &b)| acc | (u8::from(b) << (6 - i)))
            })
            .collect();
        Self {
            groups,
            position: 0,
        }
    }

    /// Decodes a presence map from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The input bytes
    /// * `offset` - Current position in the data (will be updated)
    ///
    /// # Errors
    /// Returns `FastError::TruncatedInput` if no stop bit is found.
    pub fn decode(data: &[u8], offset: &mut usize) -> Result<Self, FastError> {
        let mut groups = SmallVec::new();

        loop {
            let byte = *data.get(*offset).ok_or(FastError::TruncatedInput)?;
            *offset += 1;
            groups.push(byte & 0x7F);

            if byte & STOP_BIT != 0 {
                return Ok(Self {
                    groups,
                    position: 0,
                });
            }
        }
    }

    /// Consumes and returns the next bit.
    #[inline]
    pub fn next_bit(&mut self) -> bool {
        let bit = self.bit(self.position);
        self.position += 1;
        bit
    }

    /// Returns the bit at the specified position without consuming it.
    #[must_use]
    pub fn bit(&self, index: usize) -> bool {
        self.groups
            .get(index / 7)
            .is_some_and(|g| (g >> (6 - index % 7)) & 1 == 1)
    }

    /// Returns the number of encoded bits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len() * 7
    }

    /// Returns true if no bits were encoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Returns how many bits have been consumed.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Appends the encoded presence map to `out`.
    ///
    /// An empty map encodes as a single `0x80`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        match self.groups.split_last() {
            Some((last, head)) => {
                out.extend_from_slice(head);
                out.push(last | STOP_BIT);
            }
            None => out.push(STOP_BIT),
        }
    }
}
