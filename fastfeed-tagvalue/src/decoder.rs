/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Tag=value field scanner.
//!
//! Walks a payload field by field, returning tags and raw value slices that
//! borrow from the input.

use memchr::memchr;

/// SOH (Start of Header) delimiter used in FIX messages.
pub const SOH: u8 = 0x01;

/// Equals sign delimiter between tag and value.
pub const EQUALS: u8 = b'=';

/// Field scanner over a tag=value payload.
///
/// Fields whose tag is not a number are skipped. The last field may omit
/// its trailing SOH.
#[derive(Debug)]
pub struct Decoder<'a> {
    input: &'a [u8],
    offset: usize,
}

impl<'a> Decoder<'a> {
    /// Creates a new decoder for the given input buffer.
    #[inline]
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self { input, offset: 0 }
    }

    /// Parses the next field from the buffer.
    ///
    /// # Returns
    /// The next `(tag, value)` pair, or `None` once the buffer is exhausted.
    pub fn next_field(&mut self) -> Option<(u32, &'a [u8])> {
        while self.offset < self.input.len() {
            let remaining = &self.input[self.offset..];
            let end = memchr(SOH, remaining).unwrap_or(remaining.len());
            let field = &remaining[..end];
            self.offset += (end + 1).min(remaining.len());

            let Some(eq_pos) = memchr(EQUALS, field) else {
                continue;
            };
            if let Some(tag) = parse_tag(&field[..eq_pos]) {
                return Some((tag, &field[eq_pos + 1..]));
            }
        }
        None
    }

    /// Returns the current offset in the buffer.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Returns true if the buffer has been fully consumed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offset >= self.input.len()
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = (u32, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        self.next_field()
    }
}

/// Parses a tag number from ASCII bytes.
#[inline]
fn parse_tag(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || bytes.len() > 10 {
        return None;
    }

    let mut result: u32 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        result = result.checked_mul(10)?.checked_add(u32::from(b - b'0'))?;
    }

    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag() {
        assert_eq!(parse_tag(b"35"), Some(35));
        assert_eq!(parse_tag(b"1409"), Some(1409));
        assert_eq!(parse_tag(b""), None);
        assert_eq!(parse_tag(b"12a"), None);
        assert_eq!(parse_tag(b"99999999999"), None);
    }

    #[test]
    fn test_next_field() {
        let mut decoder = Decoder::new(b"35=A\x01108=30\x01");

        assert_eq!(decoder.next_field(), Some((35, &b"A"[..])));
        assert_eq!(decoder.next_field(), Some((108, &b"30"[..])));
        assert!(decoder.next_field().is_none());
        assert!(decoder.is_empty());
    }

    #[test]
    fn test_last_field_without_soh() {
        let fields: Vec<_> = Decoder::new(b"35=0\x01112=T1").collect();
        assert_eq!(fields, vec![(35, &b"0"[..]), (112, &b"T1"[..])]);
    }

    #[test]
    fn test_skips_malformed_fields() {
        let fields: Vec<_> = Decoder::new(b"garbage\x01x=1\x0135=5\x01\x01").collect();
        assert_eq!(fields, vec![(35, &b"5"[..])]);
    }

    #[test]
    fn test_empty_value() {
        let fields: Vec<_> = Decoder::new(b"58=\x01").collect();
        assert_eq!(fields, vec![(58, &b""[..])]);
    }
}
