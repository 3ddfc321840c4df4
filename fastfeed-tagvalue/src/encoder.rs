/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Tag=value field writer.

use crate::decoder::{EQUALS, SOH};
use bytes::{BufMut, BytesMut};

/// Appends fields in tag=value form to a buffer.
#[derive(Debug)]
pub struct Encoder<'a> {
    buf: &'a mut BytesMut,
}

impl<'a> Encoder<'a> {
    /// Creates an encoder writing into `buf`.
    #[must_use]
    pub fn new(buf: &'a mut BytesMut) -> Self {
        Self { buf }
    }

    /// Appends a field with a string value.
    #[inline]
    pub fn put_str(&mut self, tag: u32, value: &str) {
        self.put_raw(tag, value.as_bytes());
    }

    /// Appends a field with raw bytes.
    #[inline]
    pub fn put_raw(&mut self, tag: u32, value: &[u8]) {
        let mut tag_buf = itoa::Buffer::new();
        let tag_str = tag_buf.format(tag);

        self.buf.reserve(tag_str.len() + value.len() + 2);
        self.buf.put_slice(tag_str.as_bytes());
        self.buf.put_u8(EQUALS);
        self.buf.put_slice(value);
        self.buf.put_u8(SOH);
    }
}
