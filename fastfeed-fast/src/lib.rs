/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # FastFeed FAST
//!
//! FAST (FIX Adapted for Streaming) decoding for the FastFeed market-data handler.
//!
//! FAST is a binary encoding used for high-volume market data feeds. Payloads
//! combine stop-bit integers, a presence map and field operators that carry
//! values forward from earlier messages.
//!
//! ## Features
//!
//! - **Stop-bit encoding**: Unsigned, signed and ASCII values
//! - **Presence maps**: Track which operator-bearing fields are present
//! - **Field operators**: Constant, Copy, Tail and Delta
//! - **Template-driven decoding**: Payloads become [`fastfeed_core::MarketEvent`]s
//! - **Fallback scan**: Unknown templates still yield a partial event

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod operators;
pub mod pmap;
mod scan;
pub mod varint;

pub use decoder::{DecodeOutcome, DecoderConfig, MessageDecoder};
pub use encoder::FastEncoder;
pub use error::FastError;
pub use operators::{FieldDictionary, FieldValue};
pub use pmap::PresenceMap;
