//! Snapshot server example.
//!
//! A local stand-in for an exchange snapshot channel. It acknowledges Logon,
//! answers TestRequest, and replies to MarketDataRequest and
//! SecurityDefinitionRequest with canned data.

mod common;

use bytes::BytesMut;
use common::{ExampleConfig, init_logging};
use fastfeed_core::{MsgType, tags};
use fastfeed_session::messages;
use fastfeed_tagvalue::FixMessage;
use fastfeed_transport::{FrameCodec, encode_frame};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};

const SYMBOLS: [(&str, &str); 3] = [("FNBB-EQ", "101.25"), ("SOLB-EQ", "42.10"), ("MTN-EQ", "88.00")];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cfg = ExampleConfig::from_env();

    let listener = TcpListener::bind(cfg.addr()).await?;
    info!(addr = %cfg.addr(), "snapshot server listening");

    loop {
        let (socket, peer) = listener.accept().await?;
        info!(%peer, "connection");
        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket).await {
                error!(%peer, error = %e, "connection error");
            }
            info!(%peer, "connection closed");
        });
    }
}

async fn handle_connection(mut socket: TcpStream) -> anyhow::Result<()> {
    let mut codec = FrameCodec::new();
    let mut buf = vec![0u8; 4096];

    loop {
        let n = socket.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        let frames: Vec<_> = codec.feed(&buf[..n]).collect();
        for frame in frames {
            let msg = match FixMessage::parse(&frame) {
                Ok(msg) => msg,
                Err(e) => {
                    warn!(error = %e, "unparseable message");
                    continue;
                }
            };
            info!(%msg, "received");

            let (replies, close) = respond(&msg);
            let mut out = BytesMut::new();
            for reply in &replies {
                encode_frame(&reply.to_bytes(), &mut out);
            }
            socket.write_all(&out).await?;
            if close {
                return Ok(());
            }
        }
    }
}

fn respond(msg: &FixMessage) -> (Vec<FixMessage>, bool) {
    match msg.msg_type() {
        Some(MsgType::Logon) => {
            info!(user = msg.get(tags::USERNAME).unwrap_or("-"), "logon");
            (
                vec![FixMessage::new(MsgType::Logon).with(tags::SESSION_STATUS, "0")],
                false,
            )
        }
        Some(MsgType::TestRequest) => (vec![messages::heartbeat(msg.get(tags::TEST_REQ_ID))], false),
        Some(MsgType::Logout) => (vec![messages::logout(Some("bye"))], true),
        Some(MsgType::MarketDataRequest) => {
            let req_id = msg.get(tags::MD_REQ_ID).unwrap_or("0");
            let replies = SYMBOLS
                .iter()
                .filter(|(symbol, _)| msg.get(tags::SYMBOL).is_none_or(|s| s == *symbol))
                .map(|(symbol, price)| {
                    FixMessage::new(MsgType::MarketDataSnapshotFullRefresh)
                        .with(tags::MD_REQ_ID, req_id)
                        .with(tags::SYMBOL, *symbol)
                        .with_uint(tags::NO_MD_ENTRIES, 1)
                        .with(tags::MD_ENTRY_TYPE, "2")
                        .with(tags::MD_ENTRY_PX, *price)
                        .with_uint(tags::MD_ENTRY_SIZE, 100)
                })
                .collect();
            (replies, false)
        }
        Some(MsgType::SecurityDefinitionRequest) => {
            let req_id = msg.get(tags::SECURITY_REQ_ID).unwrap_or("0");
            let replies = SYMBOLS
                .iter()
                .map(|(symbol, _)| {
                    FixMessage::new(MsgType::SecurityDefinition)
                        .with(tags::SECURITY_REQ_ID, req_id)
                        .with(tags::SYMBOL, *symbol)
                })
                .collect();
            (replies, false)
        }
        _ => (Vec::new(), false),
    }
}
