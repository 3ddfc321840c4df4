//! Feed client example.
//!
//! Joins the incremental multicast group, keeps a snapshot session with the
//! snapshot server and prints every event until Ctrl-C.
//!
//! Run `snapshot_server` and `incremental_publisher` alongside it.

mod common;

use common::{ExampleConfig, init_logging};
use fastfeed_dictionary::TemplateCatalog;
use fastfeed_engine::{FeedBuilder, FeedEvent};
use fastfeed_session::SessionConfig;
use fastfeed_transport::MulticastConfig;
use std::time::Duration;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cfg = ExampleConfig::from_env();

    let catalog = TemplateCatalog::from_path(&cfg.templates)?;
    info!(templates = catalog.len(), path = %cfg.templates, "loaded template catalog");

    let mut session = SessionConfig::new(cfg.host.clone(), cfg.port)
        .with_heartbeat_interval(Duration::from_secs(10))
        .with_test_request_grace(Duration::from_secs(5))
        .with_response_timeout(Duration::from_secs(5));
    if let (Some(user), Some(pass)) = (&cfg.username, &cfg.password) {
        session = session.with_credentials(user.as_str(), pass.as_str());
    }

    let (handler, mut events) = FeedBuilder::new()
        .with_catalog(catalog)
        .with_multicast(MulticastConfig::new(cfg.group, cfg.mcast_port))
        .with_session(session)
        .with_reconnect_interval(Duration::from_secs(2))
        .with_max_reconnect_attempts(0)
        .start()
        .await?;

    handler.request_security_definitions("3").await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Some(FeedEvent::Market(event)) => info!(
                    template = event.template_id,
                    symbol = event.symbol.as_ref().map(|s| s.as_str()).unwrap_or("-"),
                    entry = %event.entry_type,
                    price = ?event.price,
                    size = ?event.size,
                    seq = ?event.sequence_number,
                    recovered = event.recovered,
                    "market"
                ),
                Some(FeedEvent::Recovery(gap)) => warn!(%gap, "gap, snapshot requested"),
                Some(FeedEvent::Snapshot(msg)) => info!(%msg, "snapshot"),
                Some(FeedEvent::Session(phase)) => info!(%phase, "session"),
                Some(FeedEvent::ChannelClosed { channel, reason }) => {
                    error!(%channel, %reason, "channel stopped");
                }
                None => break,
            },
        }
    }

    handler.shutdown().await?;
    Ok(())
}
