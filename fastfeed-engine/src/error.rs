/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Engine error types.

use fastfeed_core::{ConfigError, SessionError, TransportError};
use fastfeed_fast::FastError;
use thiserror::Error;

/// Errors raised while starting or running the feed handler.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid builder configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Decoder could not be built from the configuration.
    #[error("decoder error: {0}")]
    Decoder(#[from] FastError),

    /// Transport setup failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Session lifecycle error.
    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;
