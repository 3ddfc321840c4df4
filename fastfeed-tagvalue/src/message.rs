/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Ordered tag=value message.

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use bytes::{Bytes, BytesMut};
use fastfeed_core::{DecodeError, MsgType, tags};
use smallvec::SmallVec;
use std::fmt;

/// An ordered set of FIX fields with at most one value per tag.
///
/// Setting a tag that is already present overwrites the value in place,
/// keeping the field's original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixMessage {
    fields: SmallVec<[(u32, String); 12]>,
}

impl FixMessage {
    /// Creates an empty message.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a message with its MsgType (tag 35) set.
    #[must_use]
    pub fn new(msg_type: MsgType) -> Self {
        let mut msg = Self::empty();
        msg.set(tags::MSG_TYPE, msg_type.as_str());
        msg
    }

    /// Sets a field, replacing any existing value in place.
    pub fn set(&mut self, tag: u32, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match self.fields.iter_mut().find(|(t, _)| *t == tag) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((tag, value)),
        }
        self
    }

    /// Sets an unsigned integer field.
    pub fn set_uint(&mut self, tag: u32, value: u64) -> &mut Self {
        let mut buf = itoa::Buffer::new();
        self.set(tag, buf.format(value))
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, tag: u32, value: impl Into<String>) -> Self {
        self.set(tag, value);
        self
    }

    /// Builder form of [`set_uint`](Self::set_uint).
    #[must_use]
    pub fn with_uint(mut self, tag: u32, value: u64) -> Self {
        self.set_uint(tag, value);
        self
    }

    /// Gets a field value.
    #[must_use]
    pub fn get(&self, tag: u32) -> Option<&str> {
        self.fields
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, v)| v.as_str())
    }

    /// Gets a field value parsed as an unsigned integer.
    #[must_use]
    pub fn get_uint(&self, tag: u32) -> Option<u64> {
        self.get(tag).and_then(|v| v.parse().ok())
    }

    /// Returns true if the tag is present.
    #[must_use]
    pub fn contains(&self, tag: u32) -> bool {
        self.fields.iter().any(|(t, _)| *t == tag)
    }

    /// Returns the message type, if tag 35 is present.
    #[must_use]
    pub fn msg_type(&self) -> Option<MsgType> {
        self.get(tags::MSG_TYPE).and_then(|v| v.parse().ok())
    }

    /// Returns an iterator over fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.fields.iter().map(|(t, v)| (*t, v.as_str()))
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the message has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Appends the SOH-delimited wire form to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) {
        let mut encoder = Encoder::new(dst);
        for (tag, value) in &self.fields {
            encoder.put_str(*tag, value);
        }
    }

    /// Returns the SOH-delimited wire form.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.fields.len() * 12);
        self.encode(&mut buf);
        buf.freeze()
    }

    /// Parses a tag=value payload.
    ///
    /// A repeated tag keeps its first position and its last value.
    ///
    /// # Errors
    /// Returns `DecodeError::Empty` if no field is found,
    /// `DecodeError::MissingMsgType` if tag 35 is absent and
    /// `DecodeError::InvalidUtf8` if a value is not valid text.
    pub fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut msg = Self::empty();
        for (tag, value) in Decoder::new(payload) {
            msg.set(tag, std::str::from_utf8(value)?);
        }
        if msg.is_empty() {
            return Err(DecodeError::Empty);
        }
        if !msg.contains(tags::MSG_TYPE) {
            return Err(DecodeError::MissingMsgType);
        }
        Ok(msg)
    }
}

impl fmt::Display for FixMessage {
    /// Formats fields with `|` in place of SOH.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (tag, value) in &self.fields {
            write!(f, "{tag}={value}|")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overwrites_in_place() {
        let mut msg = FixMessage::new(MsgType::Logon);
        msg.set(108, "30").set(553, "user");
        msg.set(108, "60");

        let fields: Vec<_> = msg.iter().collect();
        assert_eq!(fields, vec![(35, "A"), (108, "60"), (553, "user")]);
    }

    #[test]
    fn test_encode() {
        let msg = FixMessage::new(MsgType::TestRequest).with(112, "TEST1");
        assert_eq!(&msg.to_bytes()[..], b"35=1\x01112=TEST1\x01");
    }

    #[test]
    fn test_parse() {
        let msg = FixMessage::parse(b"35=A\x0152=20240115-09:15:30\x011409=0").unwrap();
        assert_eq!(msg.msg_type(), Some(MsgType::Logon));
        assert_eq!(msg.get(1409), Some("0"));
        assert_eq!(msg.get_uint(1409), Some(0));
        assert_eq!(msg.len(), 3);
    }

    #[test]
    fn test_parse_roundtrip_preserves_order() {
        let msg = FixMessage::new(MsgType::MarketDataRequest)
            .with_uint(262, 7)
            .with(263, "0")
            .with(146, "1")
            .with(55, "FNBB-EQ");
        assert_eq!(FixMessage::parse(&msg.to_bytes()).unwrap(), msg);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(FixMessage::parse(b""), Err(DecodeError::Empty));
        assert_eq!(FixMessage::parse(b"\x01\x01"), Err(DecodeError::Empty));
        assert_eq!(
            FixMessage::parse(b"112=X\x01"),
            Err(DecodeError::MissingMsgType)
        );
        assert!(matches!(
            FixMessage::parse(b"35=0\x0158=\xff\x01"),
            Err(DecodeError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_display() {
        let msg = FixMessage::new(MsgType::Heartbeat).with(112, "T");
        assert_eq!(msg.to_string(), "35=0|112=T|");
    }
}
