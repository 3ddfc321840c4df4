/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Recovery task.
//!
//! Owns the [`RecoveryCoordinator`] and turns commands from the incremental
//! channel or the handler into requests queued for the reliable session.
//! Requests wait in the queue until the session is logged in.

use fastfeed_session::{GapEvent, RecoveryCoordinator};
use fastfeed_tagvalue::FixMessage;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Work for the recovery task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryCommand {
    /// Request a snapshot covering this gap.
    Gap(GapEvent),
    /// Request security definitions with this SecurityRequestType.
    SecurityDefinitions(String),
}

/// Runs until cancelled or either channel closes.
pub async fn run_recovery(
    mut commands: mpsc::Receiver<RecoveryCommand>,
    requests: mpsc::Sender<FixMessage>,
    cancel: CancellationToken,
) -> RecoveryCoordinator {
    let mut coordinator = RecoveryCoordinator::new();
    loop {
        let command = tokio::select! {
            () = cancel.cancelled() => break,
            command = commands.recv() => match command {
                Some(command) => command,
                None => break,
            },
        };
        let request = match command {
            RecoveryCommand::Gap(gap) => coordinator.on_gap(&gap),
            RecoveryCommand::SecurityDefinitions(request_type) => {
                coordinator.security_definition_request(&request_type)
            }
        };
        if requests.send(request).await.is_err() {
            break;
        }
    }
    info!(
        full_book = coordinator.full_book_requests(),
        instrument = coordinator.instrument_requests(),
        definitions = coordinator.definition_requests(),
        "recovery task stopped"
    );
    coordinator
}
