/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Error types for the FastFeed market-data handler.
//!
//! Typed errors shared by the FastFeed crates, built with `thiserror`. Binary
//! payload errors live next to the FAST codec (`fastfeed_fast::FastError`);
//! why a session ended is reported as a `DisconnectReason`, not an error.

use thiserror::Error;

/// Errors that occur while decoding a FIX tag=value payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload contained no field at all.
    #[error("empty message")]
    Empty,

    /// Missing MsgType field (tag 35).
    #[error("missing msg type field (tag 35)")]
    MissingMsgType,

    /// Payload is not ASCII/UTF-8 text.
    #[error("invalid utf-8 in payload: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Errors in session layer operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Session is not in the correct state for the operation.
    #[error("invalid session state: expected {expected}, current {current}")]
    InvalidState {
        /// Expected state for the operation.
        expected: String,
        /// Current session state.
        current: String,
    },

    /// Reconnect attempts exhausted.
    #[error("gave up after {attempts} reconnect attempts")]
    ReconnectExhausted {
        /// Number of attempts made.
        attempts: u32,
    },
}

/// I/O failure on either transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connect did not complete in time.
    #[error("connect to {addr} timed out")]
    ConnectTimeout {
        /// Remote address.
        addr: String,
    },

    /// Invalid multicast group or interface.
    #[error("invalid multicast address: {0}")]
    InvalidAddress(String),

    /// Underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Invalid configuration supplied by the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting was not provided.
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    /// A setting has an unusable value.
    #[error("invalid value for {name}: {reason}")]
    Invalid {
        /// Setting name.
        name: &'static str,
        /// Why the value is rejected.
        reason: String,
    },
}
