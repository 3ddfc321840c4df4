/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # FastFeed Session
//!
//! Session layer for the FastFeed market-data handler.
//!
//! This crate provides:
//! - **State machine**: Logon, heartbeat and liveness lifecycle of the reliable channel
//! - **Heartbeat handling**: Heartbeat/TestRequest timing
//! - **Sequence tracking**: Channel and per-instrument gap detection
//! - **Recovery**: Snapshot requests issued in response to gaps
//! - **Configuration**: Session configuration options
//!
//! Nothing here performs I/O. Every method takes the current time and
//! returns the actions the caller must carry out.

pub mod config;
pub mod heartbeat;
pub mod messages;
pub mod recovery;
pub mod sequence;
pub mod state;

pub use config::SessionConfig;
pub use heartbeat::HeartbeatManager;
pub use recovery::RecoveryCoordinator;
pub use sequence::{GapEvent, Observation, SequenceCheck, SequenceTracker};
pub use state::{DisconnectReason, SessionAction, SessionPhase, SessionStateMachine};
