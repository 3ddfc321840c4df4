/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Feed builder for fluent configuration.
//!
//! This module provides a builder API for configuring and starting a feed
//! handler.

use crate::error::{EngineError, Result};
use crate::event::FeedEvent;
use crate::handler::{FeedHandler, ReconnectPolicy, supervise_session};
use crate::incremental::{IncrementalPipeline, run_multicast};
use crate::recovery::run_recovery;
use fastfeed_core::ConfigError;
use fastfeed_dictionary::TemplateCatalog;
use fastfeed_fast::{DecoderConfig, MessageDecoder};
use fastfeed_session::SessionConfig;
use fastfeed_transport::{MulticastConfig, bind_multicast};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Default capacity of the event and request channels.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Builder for configuring a feed handler.
#[derive(Debug, Clone)]
pub struct FeedBuilder {
    /// Template catalog for the incremental channel.
    catalog: Option<Arc<TemplateCatalog>>,
    /// Decoder settings.
    decoder: DecoderConfig,
    /// Incremental channel.
    multicast: Option<MulticastConfig>,
    /// Reliable channel.
    session: Option<SessionConfig>,
    /// Reconnect interval.
    reconnect_interval: Duration,
    /// Maximum reconnect attempts.
    max_reconnect_attempts: u32,
    /// Channel capacity.
    channel_capacity: usize,
}

impl Default for FeedBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedBuilder {
    /// Creates a new feed builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            catalog: None,
            decoder: DecoderConfig::default(),
            multicast: None,
            session: None,
            reconnect_interval: Duration::from_secs(5),
            max_reconnect_attempts: 10,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Sets the template catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: impl Into<Arc<TemplateCatalog>>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Sets the decoder settings.
    #[must_use]
    pub fn with_decoder_config(mut self, config: DecoderConfig) -> Self {
        self.decoder = config;
        self
    }

    /// Enables the incremental multicast channel.
    #[must_use]
    pub const fn with_multicast(mut self, config: MulticastConfig) -> Self {
        self.multicast = Some(config);
        self
    }

    /// Enables the reliable snapshot/recovery session.
    #[must_use]
    pub fn with_session(mut self, config: SessionConfig) -> Self {
        self.session = Some(config);
        self
    }

    /// Sets the reconnect interval.
    #[must_use]
    pub const fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Sets the maximum reconnect attempts; 0 retries forever.
    #[must_use]
    pub const fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    /// Sets the capacity of the event and request channels.
    #[must_use]
    pub const fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Returns the reconnect interval.
    #[must_use]
    pub const fn reconnect_interval(&self) -> Duration {
        self.reconnect_interval
    }

    /// Returns the maximum reconnect attempts.
    #[must_use]
    pub const fn max_reconnect_attempts(&self) -> u32 {
        self.max_reconnect_attempts
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    /// Checks that the configuration can be started.
    ///
    /// # Errors
    /// Returns `ConfigError` if no channel is configured, the multicast channel
    /// has no catalog, or a setting is out of range.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.multicast.is_none() && self.session.is_none() {
            return Err(ConfigError::Missing("multicast or session channel"));
        }
        if self.multicast.is_some() && self.catalog.is_none() {
            return Err(ConfigError::Missing("template catalog"));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid {
                name: "channel_capacity",
                reason: "must be non-zero".to_string(),
            });
        }
        if let Some(session) = &self.session {
            session.validate()?;
        }
        Ok(())
    }

    /// Starts the configured channels.
    ///
    /// Returns the handle and the receiving end of the event channel.
    ///
    /// # Errors
    /// Returns `EngineError` if the configuration is invalid, the decoder
    /// cannot be built, or joining the multicast group fails.
    pub async fn start(self) -> Result<(FeedHandler, mpsc::Receiver<FeedEvent>)> {
        self.validate()?;

        let cancel = CancellationToken::new();
        let (events_tx, events_rx) = mpsc::channel(self.channel_capacity);
        let (recovery_tx, recovery_rx) = mpsc::channel(self.channel_capacity);
        let mut tasks = Vec::new();

        if let (Some(multicast), Some(catalog)) = (&self.multicast, &self.catalog) {
            let decoder = MessageDecoder::new(Arc::clone(catalog), &self.decoder)?;
            let pipeline = IncrementalPipeline::new(decoder).with_max_frame_size(multicast.max_frame_size);
            let socket = bind_multicast(multicast).await?;
            let events = events_tx.clone();
            let recovery = recovery_tx.clone();
            let cancel = cancel.clone();
            tasks.push(tokio::spawn(async move {
                run_multicast(socket, pipeline, events, recovery, cancel).await?;
                Ok::<(), EngineError>(())
            }));
        }

        let recovery = match self.session {
            Some(session) => {
                let (requests_tx, requests_rx) = mpsc::channel(self.channel_capacity);
                let recovery_cancel = cancel.clone();
                tasks.push(tokio::spawn(async move {
                    run_recovery(recovery_rx, requests_tx, recovery_cancel).await;
                    Ok::<(), EngineError>(())
                }));

                let policy = ReconnectPolicy {
                    interval: self.reconnect_interval,
                    max_attempts: self.max_reconnect_attempts,
                };
                tasks.push(tokio::spawn(supervise_session(
                    session,
                    policy,
                    requests_rx,
                    events_tx,
                    cancel.clone(),
                )));
                Some(recovery_tx)
            }
            None => None,
        };

        info!(tasks = tasks.len(), "feed handler started");
        Ok((FeedHandler::new(cancel, recovery, tasks), events_rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use fastfeed_core::{MsgType, tags};
    use fastfeed_session::SessionPhase;
    use fastfeed_tagvalue::FixMessage;
    use fastfeed_transport::{FrameCodec, encode_frame};
    use std::net::Ipv4Addr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    #[test]
    fn test_builder_defaults() {
        let builder = FeedBuilder::new();
        assert_eq!(builder.reconnect_interval(), Duration::from_secs(5));
        assert_eq!(builder.max_reconnect_attempts(), 10);
        assert_eq!(builder.channel_capacity(), DEFAULT_CHANNEL_CAPACITY);
    }

    #[test]
    fn test_validate() {
        assert_eq!(
            FeedBuilder::new().validate(),
            Err(ConfigError::Missing("multicast or session channel"))
        );

        let no_catalog =
            FeedBuilder::new().with_multicast(MulticastConfig::new(Ipv4Addr::new(239, 1, 1, 1), 5000));
        assert_eq!(
            no_catalog.validate(),
            Err(ConfigError::Missing("template catalog"))
        );

        let zero = FeedBuilder::new()
            .with_session(SessionConfig::new("127.0.0.1", 9000))
            .with_channel_capacity(0);
        assert!(zero.validate().is_err());

        let ok = FeedBuilder::new()
            .with_session(SessionConfig::new("127.0.0.1", 9000))
            .with_max_reconnect_attempts(0);
        assert!(ok.validate().is_ok());
    }

    #[tokio::test]
    async fn test_start_rejects_invalid_config() {
        let result = FeedBuilder::new().start().await;
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    async fn read_message(stream: &mut TcpStream, codec: &mut FrameCodec) -> Option<FixMessage> {
        let mut chunk = [0u8; 1024];
        let mut pending = codec.feed(&[]).next();
        loop {
            if let Some(frame) = pending {
                return Some(FixMessage::parse(&frame).unwrap());
            }
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                return None;
            }
            pending = codec.feed(&chunk[..n]).next();
        }
    }

    #[tokio::test]
    async fn test_session_logon_and_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let (handler, mut events) = FeedBuilder::new()
            .with_session(SessionConfig::new("127.0.0.1", port))
            .start()
            .await
            .unwrap();

        let (mut peer, _) = listener.accept().await.unwrap();
        let mut codec = FrameCodec::new();
        let logon = read_message(&mut peer, &mut codec).await.unwrap();
        assert_eq!(logon.msg_type(), Some(MsgType::Logon));

        let mut ack = BytesMut::new();
        encode_frame(&FixMessage::new(MsgType::Logon).to_bytes(), &mut ack);
        peer.write_all(&ack).await.unwrap();

        loop {
            match events.recv().await {
                Some(FeedEvent::Session(SessionPhase::LoggedIn)) => break,
                Some(_) => {}
                None => panic!("event channel closed before logon"),
            }
        }

        assert!(handler.request_security_definitions("3").await);
        let request = read_message(&mut peer, &mut codec).await.unwrap();
        assert_eq!(request.msg_type(), Some(MsgType::SecurityDefinitionRequest));
        assert_eq!(request.get(tags::SECURITY_REQUEST_TYPE), Some("3"));

        handler.shutdown().await.unwrap();
        let logout = read_message(&mut peer, &mut codec).await.unwrap();
        assert_eq!(logout.msg_type(), Some(MsgType::Logout));
    }
}
