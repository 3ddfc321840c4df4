/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Running feed handler.
//!
//! Owns the spawned channel tasks and the cancellation token that stops
//! them.

use crate::error::{EngineError, Result};
use crate::event::{Channel, FeedEvent};
use crate::recovery::RecoveryCommand;
use crate::reliable::{now, run_session};
use fastfeed_core::SessionError;
use fastfeed_session::{SessionConfig, SessionPhase, SessionStateMachine};
use fastfeed_tagvalue::FixMessage;
use fastfeed_transport::connect;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Reconnect settings for the reliable session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay between attempts.
    pub interval: Duration,
    /// Consecutive attempts allowed without a successful connect; 0 is unlimited.
    pub max_attempts: u32,
}

impl ReconnectPolicy {
    fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts > 0 && attempts > self.max_attempts
    }
}

/// Handle to a running feed.
#[derive(Debug)]
pub struct FeedHandler {
    cancel: CancellationToken,
    recovery: Option<mpsc::Sender<RecoveryCommand>>,
    tasks: Vec<JoinHandle<Result<()>>>,
}

impl FeedHandler {
    pub(crate) fn new(
        cancel: CancellationToken,
        recovery: Option<mpsc::Sender<RecoveryCommand>>,
        tasks: Vec<JoinHandle<Result<()>>>,
    ) -> Self {
        Self {
            cancel,
            recovery,
            tasks,
        }
    }

    /// Returns a token that stops the feed when cancelled.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Queues a SecurityDefinitionRequest on the reliable session.
    ///
    /// Returns false if there is no reliable session or it has stopped.
    pub async fn request_security_definitions(&self, request_type: &str) -> bool {
        match &self.recovery {
            Some(recovery) => recovery
                .send(RecoveryCommand::SecurityDefinitions(request_type.to_string()))
                .await
                .is_ok(),
            None => false,
        }
    }

    /// Stops every task, logging out of the reliable session first.
    ///
    /// # Errors
    /// Returns the error of the first channel that had already stopped on
    /// its own, the same failure reported as [`FeedEvent::ChannelClosed`].
    pub async fn shutdown(self) -> Result<()> {
        info!("shutting down feed handler");
        self.cancel.cancel();
        let mut first = None;
        for task in self.tasks {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    first.get_or_insert(err);
                }
                Err(err) => error!(error = %err, "feed task panicked"),
            }
        }
        first.map_or(Ok(()), Err)
    }
}

/// Keeps the reliable session connected until cancelled.
pub(crate) async fn supervise_session(
    config: SessionConfig,
    policy: ReconnectPolicy,
    mut requests: mpsc::Receiver<FixMessage>,
    events: mpsc::Sender<FeedEvent>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut machine = SessionStateMachine::new(config.clone(), now());
    let mut attempts: u32 = 0;

    loop {
        if let Err(err) = machine.begin_connect() {
            error!(error = %err, "session not disconnected");
            machine.on_transport_closed();
            continue;
        }
        let _ = events.send(FeedEvent::Session(SessionPhase::Connecting)).await;
        info!(host = %config.host, port = config.port, attempt = attempts + 1, "connecting");

        let connected = tokio::select! {
            () = cancel.cancelled() => {
                machine.on_transport_closed();
                break;
            }
            result = connect(&config.host, config.port, config.connect_timeout) => result,
        };

        match connected {
            Ok(stream) => {
                attempts = 0;
                match run_session(stream, &mut machine, &mut requests, &events, &cancel).await {
                    Ok(reason) if !reason.should_reconnect() => break,
                    Ok(reason) => info!(%reason, "session ended, reconnecting"),
                    Err(err) => warn!(error = %err, "session failed, reconnecting"),
                }
            }
            Err(err) => {
                warn!(error = %err, "connect failed");
                machine.on_transport_closed();
                let _ = events
                    .send(FeedEvent::Session(SessionPhase::Disconnected))
                    .await;
            }
        }

        attempts += 1;
        if policy.exhausted(attempts) {
            let err = SessionError::ReconnectExhausted {
                attempts: policy.max_attempts,
            };
            error!(error = %err, "giving up on reliable session");
            let closed = FeedEvent::ChannelClosed {
                channel: Channel::Reliable,
                reason: err.to_string(),
            };
            let _ = events.send(closed).await;
            return Err(EngineError::Session(err));
        }

        tokio::select! {
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(policy.interval) => {}
        }
    }
    info!("reliable session supervisor stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconnect_policy() {
        let limited = ReconnectPolicy {
            interval: Duration::from_secs(1),
            max_attempts: 3,
        };
        assert!(!limited.exhausted(3));
        assert!(limited.exhausted(4));

        let unlimited = ReconnectPolicy {
            interval: Duration::from_secs(1),
            max_attempts: 0,
        };
        assert!(!unlimited.exhausted(u32::MAX));
    }

    #[tokio::test]
    async fn test_reconnect_exhaustion_closes_reliable_channel() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let policy = ReconnectPolicy {
            interval: Duration::from_millis(10),
            max_attempts: 1,
        };
        let (_requests_tx, requests_rx) = mpsc::channel(4);
        let (events_tx, mut events_rx) = mpsc::channel(16);

        let result = supervise_session(
            SessionConfig::new("127.0.0.1", port),
            policy,
            requests_rx,
            events_tx,
            CancellationToken::new(),
        )
        .await;

        assert!(matches!(
            result,
            Err(EngineError::Session(SessionError::ReconnectExhausted { attempts: 1 }))
        ));
        let mut closed = None;
        while let Some(event) = events_rx.recv().await {
            if let FeedEvent::ChannelClosed { channel, reason } = event {
                closed = Some((channel, reason));
            }
        }
        let (channel, reason) = closed.unwrap();
        assert_eq!(channel, Channel::Reliable);
        assert_eq!(reason, "gave up after 1 reconnect attempts");
    }
}
