/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # FastFeed Core
//!
//! Core types, tags, and error definitions for the FastFeed market-data handler.
//!
//! This crate provides the fundamental building blocks used across all FastFeed crates:
//! - **Error types**: Unified error handling with `thiserror`
//! - **Tags**: Well-known FIX tag numbers used by the feed
//! - **Message types**: `MsgType` and its session/application classification
//! - **Core types**: `Symbol` and the feed's timestamp format
//! - **Events**: `MarketEvent`, the decoded output of the feed

pub mod error;
pub mod event;
pub mod field;
pub mod message;
pub mod types;

pub use error::{ConfigError, DecodeError, SessionError, TransportError};
pub use event::{EntryType, MarketEvent};
pub use field::tags;
pub use message::MsgType;
pub use types::{Symbol, format_sending_time, parse_sending_time};
