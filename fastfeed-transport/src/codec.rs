/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Length-prefixed frame codec.
//!
//! Every frame is a stop-bit varint payload length followed by the payload.
//! A prefix that runs past 5 bytes, or declares a length above the configured
//! maximum, means the stream is out of sync: one byte is dropped and
//! extraction retries from the next position.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

/// Maximum number of bytes in a length prefix.
pub const MAX_PREFIX_LEN: usize = 5;

/// Default maximum payload size in bytes.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024;

/// Errors that can occur during codec operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Length prefix has no stop bit within [`MAX_PREFIX_LEN`] bytes.
    #[error("length prefix exceeds {MAX_PREFIX_LEN} bytes")]
    PrefixTooLong,

    /// Declared payload length exceeds the maximum.
    #[error("frame too large: {size} bytes exceeds maximum {max_size}")]
    FrameTooLarge {
        /// Declared payload size.
        size: usize,
        /// Maximum allowed size.
        max_size: usize,
    },

    /// I/O error.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Frame codec with an internal accumulator.
///
/// [`feed`](Self::feed) serves datagram and test paths; the tokio
/// [`Decoder`]/[`Encoder`] impls serve `Framed` streams. Both share the same
/// extraction and resynchronization.
#[derive(Debug)]
pub struct FrameCodec {
    buffer: BytesMut,
    max_frame_size: usize,
    resyncs: u64,
}

impl FrameCodec {
    /// Creates a new codec with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(8 * 1024),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            resyncs: 0,
        }
    }

    /// Sets the maximum payload size.
    #[must_use]
    pub const fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Appends bytes and returns an iterator over the complete frames.
    ///
    /// Frames not pulled from the iterator stay buffered for the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> Frames<'_> {
        self.buffer.extend_from_slice(bytes);
        Frames { codec: self }
    }

    /// Returns the number of resynchronizations so far.
    #[must_use]
    pub const fn resyncs(&self) -> u64 {
        self.resyncs
    }

    /// Returns the number of buffered bytes not yet framed.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Discards buffered bytes, as after a reconnect.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    fn extract(&mut self, src: Option<&mut BytesMut>) -> Option<Bytes> {
        let max = self.max_frame_size;
        let buf = match src {
            Some(src) => src,
            None => &mut self.buffer,
        };
        loop {
            match parse_prefix(buf, max) {
                Ok(None) => return None,
                Ok(Some((prefix, len))) => {
                    if buf.len() < prefix + len {
                        buf.reserve(prefix + len - buf.len());
                        return None;
                    }
                    buf.advance(prefix);
                    return Some(buf.split_to(len).freeze());
                }
                Err(err) => {
                    warn!(error = %err, buffered = buf.len(), "frame resync, dropping one byte");
                    buf.advance(1);
                    self.resyncs += 1;
                }
            }
        }
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over frames extracted by [`FrameCodec::feed`].
#[derive(Debug)]
pub struct Frames<'a> {
    codec: &'a mut FrameCodec,
}

impl Iterator for Frames<'_> {
    type Item = Bytes;

    fn next(&mut self) -> Option<Self::Item> {
        self.codec.extract(None)
    }
}

impl Decoder for FrameCodec {
    type Item = Bytes;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        Ok(self.extract(Some(src)))
    }
}

impl Encoder<Bytes> for FrameCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.len() > self.max_frame_size {
            return Err(CodecError::FrameTooLarge {
                size: item.len(),
                max_size: self.max_frame_size,
            });
        }
        encode_frame(&item, dst);
        Ok(())
    }
}

/// Appends `payload` to `dst` behind its varint length prefix.
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) {
    let len = payload.len() as u64;
    let groups = (64 - len.leading_zeros() as usize).div_ceil(7).max(1);
    dst.reserve(groups + payload.len());
    for i in (0..groups).rev() {
        let group = ((len >> (7 * i)) & 0x7F) as u8;
        dst.put_u8(if i == 0 { group | 0x80 } else { group });
    }
    dst.put_slice(payload);
}

/// Reads the length prefix at the head of `src`.
///
/// Returns `(prefix_len, payload_len)`, or `None` if more bytes are needed.
fn parse_prefix(src: &[u8], max_frame_size: usize) -> Result<Option<(usize, usize)>, CodecError> {
    let mut len: u64 = 0;
    for (i, &byte) in src.iter().take(MAX_PREFIX_LEN).enumerate() {
        len = (len << 7) | u64::from(byte & 0x7F);
        if byte & 0x80 != 0 {
            let size = usize::try_from(len).unwrap_or(usize::MAX);
            if size > max_frame_size {
                return Err(CodecError::FrameTooLarge {
                    size,
                    max_size: max_frame_size,
                });
            }
            return Ok(Some((i + 1, size)));
        }
    }
    if src.len() >= MAX_PREFIX_LEN {
        return Err(CodecError::PrefixTooLong);
    }
    Ok(None)
}
