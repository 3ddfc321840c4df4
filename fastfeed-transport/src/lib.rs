/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # FastFeed Transport
//!
//! Network transport layer for the FastFeed market-data handler.
//!
//! This crate provides:
//! - **Framing**: Varint length-prefixed frames with resynchronization
//! - **TCP transport**: Bounded connect for the reliable snapshot channel
//! - **UDP multicast**: Group membership for the incremental channel

pub mod codec;
pub mod multicast;
pub mod tcp;

pub use codec::{CodecError, FrameCodec, Frames, encode_frame};
pub use multicast::{MulticastConfig, bind_multicast};
pub use tcp::connect;
