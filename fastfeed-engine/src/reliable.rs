/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Reliable (snapshot/recovery) channel.
//!
//! Drives one connection of the session state machine: reads framed FIX
//! messages, runs the liveness timer, sends queued recovery requests once
//! logged in, and performs the machine's actions on the stream.

use crate::error::Result;
use crate::event::FeedEvent;
use bytes::BytesMut;
use fastfeed_core::{MsgType, TransportError, tags};
use fastfeed_session::{DisconnectReason, SessionAction, SessionPhase, SessionStateMachine};
use fastfeed_tagvalue::FixMessage;
use fastfeed_transport::{FrameCodec, encode_frame};
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const READ_CHUNK: usize = 8 * 1024;

/// Current time on the runtime clock.
pub(crate) fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

/// Runs one connected session until it disconnects.
///
/// `machine` must be in the `Connecting` phase. Phase changes are published
/// on `events` as [`FeedEvent::Session`].
///
/// # Errors
/// Returns `EngineError::Transport` if reading or writing fails, or
/// `EngineError::Session` if the machine is not connecting. The machine is
/// left `Disconnected` either way.
pub async fn run_session<S>(
    mut stream: S,
    machine: &mut SessionStateMachine,
    requests: &mut mpsc::Receiver<FixMessage>,
    events: &mpsc::Sender<FeedEvent>,
    cancel: &CancellationToken,
) -> Result<DisconnectReason>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut seen = machine.phase();
    let result = drive(&mut stream, machine, requests, events, cancel, &mut seen).await;
    if let Err(err) = &result {
        warn!(error = %err, "reliable session failed");
        machine.on_transport_closed();
    }
    if let Err(err) = stream.shutdown().await {
        debug!(error = %err, "stream shutdown failed");
    }
    publish(events, &mut seen, machine.phase()).await;
    result
}

async fn drive<S>(
    stream: &mut S,
    machine: &mut SessionStateMachine,
    requests: &mut mpsc::Receiver<FixMessage>,
    events: &mpsc::Sender<FeedEvent>,
    cancel: &CancellationToken,
    seen: &mut SessionPhase,
) -> Result<DisconnectReason>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut codec = FrameCodec::new().with_max_frame_size(machine.config().max_frame_size);
    let logout_timeout = machine.config().logout_timeout;
    let mut ticker = tokio::time::interval(machine.config().timer_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut chunk = vec![0u8; READ_CHUNK];

    let logon = machine.on_connected(now())?;
    perform(stream, vec![logon]).await?;
    publish(events, seen, machine.phase()).await;

    loop {
        let actions = tokio::select! {
            () = cancel.cancelled() => {
                let actions = machine.shutdown();
                match tokio::time::timeout(logout_timeout, perform(stream, actions)).await {
                    Ok(Ok(_)) => {}
                    Ok(Err(err)) => warn!(error = %err, "logout not sent"),
                    Err(_) => warn!(timeout = ?logout_timeout, "logout timed out"),
                }
                return Ok(DisconnectReason::Shutdown);
            }
            read = stream.read(&mut chunk) => {
                let n = read.map_err(TransportError::from)?;
                if n == 0 {
                    info!("reliable channel closed by peer");
                    machine.on_transport_closed();
                    return Ok(DisconnectReason::Transport);
                }
                let mut actions = Vec::new();
                for frame in codec.feed(&chunk[..n]) {
                    let msg = match FixMessage::parse(&frame) {
                        Ok(msg) => msg,
                        Err(err) => {
                            warn!(error = %err, len = frame.len(), "discarding session message");
                            continue;
                        }
                    };
                    debug!(%msg, "received");
                    if msg.msg_type() == Some(MsgType::MarketDataSnapshotFullRefresh) {
                        info!(
                            symbol = msg.get(tags::SYMBOL).unwrap_or_default(),
                            last_price = msg.get(tags::MD_ENTRY_PX).unwrap_or_default(),
                            "snapshot received"
                        );
                        if events.send(FeedEvent::Snapshot(msg.clone())).await.is_err() {
                            debug!("event consumer closed, snapshot dropped");
                        }
                    }
                    actions.extend(machine.on_message(&msg, now()));
                }
                actions
            }
            _ = ticker.tick() => machine.on_timer(now()),
            Some(request) = requests.recv(), if machine.is_logged_in() => {
                machine.on_message_sent(now());
                vec![SessionAction::Send(request)]
            }
        };

        let disconnect = perform(stream, actions).await?;
        publish(events, seen, machine.phase()).await;
        if let Some(reason) = disconnect {
            info!(%reason, "session disconnected");
            return Ok(reason);
        }
    }
}

/// Writes the queued messages and reports a requested disconnect.
async fn perform<S>(
    stream: &mut S,
    actions: Vec<SessionAction>,
) -> std::result::Result<Option<DisconnectReason>, TransportError>
where
    S: AsyncWrite + Unpin,
{
    let mut out = BytesMut::new();
    let mut disconnect = None;
    for action in actions {
        match action {
            SessionAction::Send(msg) => {
                debug!(%msg, "sending");
                encode_frame(&msg.to_bytes(), &mut out);
            }
            SessionAction::Disconnect(reason) => {
                disconnect = Some(reason);
                break;
            }
        }
    }
    if !out.is_empty() {
        stream.write_all(&out).await?;
        stream.flush().await?;
    }
    Ok(disconnect)
}

async fn publish(events: &mpsc::Sender<FeedEvent>, seen: &mut SessionPhase, current: SessionPhase) {
    if *seen != current {
        *seen = current;
        let _ = events.send(FeedEvent::Session(current)).await;
    }
}
