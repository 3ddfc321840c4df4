/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # FastFeed Tag-Value
//!
//! FIX tag=value messages for the FastFeed reliable channel.
//!
//! Session-control messages (Logon, Heartbeat, TestRequest, Logout) and
//! snapshot/recovery messages travel as SOH-delimited tag=value text inside
//! length-prefixed frames. The frame already delimits the message, so no
//! BeginString, BodyLength or CheckSum fields are carried.
//!
//! ## Features
//!
//! - **Ordered fields**: At most one value per tag, insertion order preserved
//! - **Fast scanning**: Uses `memchr` for delimiter search
//! - **Allocation-light encoding**: `itoa` for integers, `BytesMut` output

pub mod decoder;
pub mod encoder;
pub mod message;

pub use decoder::{Decoder, SOH};
pub use message::FixMessage;
