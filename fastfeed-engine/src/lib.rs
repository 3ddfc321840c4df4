/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # FastFeed Engine
//!
//! Runtime for the FastFeed market-data handler.
//!
//! This crate provides:
//! - **Incremental channel**: Multicast receive, framing, decoding and gap detection
//! - **Reliable channel**: TCP session driving the session state machine
//! - **Recovery task**: Gap-triggered snapshot requests
//! - **Builder API**: Fluent configuration for starting a feed
//!
//! Channels run as independent tokio tasks connected by `mpsc` queues and
//! stopped through one shared cancellation token.

pub mod builder;
pub mod error;
pub mod event;
pub mod handler;
pub mod incremental;
pub mod recovery;
pub mod reliable;

pub use builder::FeedBuilder;
pub use error::{EngineError, Result};
pub use event::{Channel, FeedEvent, FeedStats};
pub use handler::{FeedHandler, ReconnectPolicy};
pub use incremental::{IncrementalPipeline, run_multicast};
pub use recovery::{RecoveryCommand, run_recovery};
pub use reliable::run_session;
