/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session state machine.
//!
//! Drives the reliable session through
//! `Disconnected -> Connecting -> AwaitingLogonAck -> LoggedIn` and back to
//! `Disconnected` on logout, liveness failure or transport loss.
//!
//! The machine never touches a socket. Inputs are events plus the current
//! time; outputs are [`SessionAction`]s the caller performs. It never retries
//! logon itself: after a `Disconnect` action the caller decides whether to
//! reconnect.

use crate::config::SessionConfig;
use crate::heartbeat::HeartbeatManager;
use crate::messages;
use fastfeed_core::{MsgType, SessionError, tags};
use fastfeed_tagvalue::FixMessage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

/// SessionStatus (tag 1409) value for an accepted logon.
const SESSION_STATUS_ACTIVE: &str = "0";

/// Lifecycle phase of the reliable session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SessionPhase {
    /// No connection.
    #[default]
    Disconnected,
    /// TCP connect in progress.
    Connecting,
    /// Logon sent, waiting for the acknowledgement.
    AwaitingLogonAck,
    /// Logon accepted.
    LoggedIn,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::AwaitingLogonAck => "AwaitingLogonAck",
            Self::LoggedIn => "LoggedIn",
        };
        f.write_str(s)
    }
}

/// Why the session went to `Disconnected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// TestRequest went unanswered.
    SessionTimeout,
    /// Peer sent Logout.
    PeerLogout,
    /// Logon acknowledged with a failure status.
    LogonRejected {
        /// SessionStatus (tag 1409) returned by the peer.
        status: String,
    },
    /// No Logon acknowledgement in time.
    LogonTimeout,
    /// Transport failed or closed.
    Transport,
    /// Local shutdown.
    Shutdown,
}

impl DisconnectReason {
    /// Returns true if the caller should re-establish the session.
    #[must_use]
    pub const fn should_reconnect(&self) -> bool {
        !matches!(self, Self::Shutdown)
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionTimeout => f.write_str("session timeout"),
            Self::PeerLogout => f.write_str("peer logout"),
            Self::LogonRejected { status } => write!(f, "logon rejected (status {status})"),
            Self::LogonTimeout => f.write_str("logon timeout"),
            Self::Transport => f.write_str("transport failure"),
            Self::Shutdown => f.write_str("shutdown"),
        }
    }
}

/// Something the caller must do on the machine's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Send this message on the reliable transport.
    Send(FixMessage),
    /// Close the transport.
    Disconnect(DisconnectReason),
}

/// Reliable session lifecycle.
#[derive(Debug)]
pub struct SessionStateMachine {
    config: SessionConfig,
    phase: SessionPhase,
    heartbeat: HeartbeatManager,
    logon_sent_at: Option<Instant>,
    next_test_req_id: u64,
}

impl SessionStateMachine {
    /// Creates a disconnected session.
    #[must_use]
    pub fn new(config: SessionConfig, now: Instant) -> Self {
        let heartbeat = HeartbeatManager::new(
            config.heartbeat_interval,
            config.test_request_grace,
            config.response_timeout,
            now,
        );
        Self {
            config,
            phase: SessionPhase::Disconnected,
            heartbeat,
            logon_sent_at: None,
            next_test_req_id: 1,
        }
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Returns the session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns true once the logon has been accepted.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.phase == SessionPhase::LoggedIn
    }

    /// Returns the outstanding TestRequest id, if any.
    #[must_use]
    pub fn pending_test_request(&self) -> Option<&str> {
        self.heartbeat.pending_test_request()
    }

    /// Marks the start of a transport connect.
    ///
    /// # Errors
    /// Returns `SessionError::InvalidState` unless the session is disconnected.
    pub fn begin_connect(&mut self) -> Result<(), SessionError> {
        self.expect_phase(SessionPhase::Disconnected)?;
        self.transition(SessionPhase::Connecting);
        Ok(())
    }

    /// Handles a completed transport connect by sending Logon.
    ///
    /// # Errors
    /// Returns `SessionError::InvalidState` unless a connect is in progress.
    pub fn on_connected(&mut self, now: Instant) -> Result<SessionAction, SessionError> {
        self.expect_phase(SessionPhase::Connecting)?;
        self.heartbeat.reset(now);
        self.logon_sent_at = Some(now);
        self.transition(SessionPhase::AwaitingLogonAck);
        Ok(SessionAction::Send(messages::logon(&self.config)))
    }

    /// Handles an inbound message.
    pub fn on_message(&mut self, msg: &FixMessage, now: Instant) -> Vec<SessionAction> {
        if matches!(self.phase, SessionPhase::Disconnected | SessionPhase::Connecting) {
            debug!(phase = %self.phase, "ignoring message outside a connected session");
            return Vec::new();
        }
        self.heartbeat.on_message_received(now);

        match (self.phase, msg.msg_type()) {
            (SessionPhase::AwaitingLogonAck, Some(MsgType::Logon)) => {
                match msg.get(tags::SESSION_STATUS) {
                    None | Some(SESSION_STATUS_ACTIVE) => {
                        self.logon_sent_at = None;
                        self.transition(SessionPhase::LoggedIn);
                        Vec::new()
                    }
                    Some(status) => {
                        warn!(status, "logon rejected");
                        self.disconnect(DisconnectReason::LogonRejected {
                            status: status.to_string(),
                        })
                    }
                }
            }
            (SessionPhase::AwaitingLogonAck, Some(MsgType::Logout)) => {
                let status = msg
                    .get(tags::SESSION_STATUS)
                    .or_else(|| msg.get(tags::TEXT))
                    .unwrap_or_default();
                warn!(status, "logout received instead of logon acknowledgement");
                self.disconnect(DisconnectReason::LogonRejected {
                    status: status.to_string(),
                })
            }
            (_, Some(MsgType::TestRequest)) => {
                let reply = messages::heartbeat(msg.get(tags::TEST_REQ_ID));
                self.heartbeat.on_message_sent(now);
                vec![SessionAction::Send(reply)]
            }
            (SessionPhase::LoggedIn, Some(MsgType::Logout)) => {
                info!("peer logged out");
                self.disconnect(DisconnectReason::PeerLogout)
            }
            _ => Vec::new(),
        }
    }

    /// Runs the periodic liveness checks.
    pub fn on_timer(&mut self, now: Instant) -> Vec<SessionAction> {
        match self.phase {
            SessionPhase::AwaitingLogonAck => {
                let overdue = self.logon_sent_at.is_some_and(|sent| {
                    now.saturating_duration_since(sent) > self.config.logon_timeout
                });
                if overdue {
                    warn!(timeout = ?self.config.logon_timeout, "no logon acknowledgement");
                    return self.disconnect(DisconnectReason::LogonTimeout);
                }
                Vec::new()
            }
            SessionPhase::LoggedIn => {
                if self.heartbeat.is_timed_out(now) {
                    warn!(
                        elapsed = ?self.heartbeat.test_request_elapsed(now),
                        "test request unanswered, session dead"
                    );
                    return self.disconnect(DisconnectReason::SessionTimeout);
                }
                if self.heartbeat.should_send_test_request(now) {
                    let id = format!("TEST{}", self.next_test_req_id);
                    self.next_test_req_id += 1;
                    debug!(test_req_id = %id, silence = ?self.heartbeat.time_since_last_received(now), "sending test request");
                    let msg = messages::test_request(&id);
                    self.heartbeat.on_test_request_sent(id, now);
                    return vec![SessionAction::Send(msg)];
                }
                if self.heartbeat.should_send_heartbeat(now) {
                    self.heartbeat.on_message_sent(now);
                    return vec![SessionAction::Send(messages::heartbeat(None))];
                }
                Vec::new()
            }
            SessionPhase::Disconnected | SessionPhase::Connecting => Vec::new(),
        }
    }

    /// Records a message sent outside the machine, such as a recovery request.
    pub fn on_message_sent(&mut self, now: Instant) {
        self.heartbeat.on_message_sent(now);
    }

    /// Handles a transport failure or close.
    pub fn on_transport_closed(&mut self) {
        if self.phase != SessionPhase::Disconnected {
            warn!(phase = %self.phase, "transport closed");
            self.logon_sent_at = None;
            self.transition(SessionPhase::Disconnected);
        }
    }

    /// Begins a local shutdown.
    ///
    /// A logged-in session sends Logout before closing.
    pub fn shutdown(&mut self) -> Vec<SessionAction> {
        match self.phase {
            SessionPhase::Disconnected => Vec::new(),
            SessionPhase::LoggedIn => {
                let mut actions = vec![SessionAction::Send(messages::logout(None))];
                actions.extend(self.disconnect(DisconnectReason::Shutdown));
                actions
            }
            SessionPhase::Connecting | SessionPhase::AwaitingLogonAck => {
                self.disconnect(DisconnectReason::Shutdown)
            }
        }
    }

    fn disconnect(&mut self, reason: DisconnectReason) -> Vec<SessionAction> {
        self.logon_sent_at = None;
        self.transition(SessionPhase::Disconnected);
        vec![SessionAction::Disconnect(reason)]
    }

    fn transition(&mut self, next: SessionPhase) {
        info!(from = %self.phase, to = %next, "session transition");
        self.phase = next;
    }

    fn expect_phase(&self, expected: SessionPhase) -> Result<(), SessionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                expected: expected.to_string(),
                current: self.phase.to_string(),
            })
        }
    }
}
