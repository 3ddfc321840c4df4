//! Incremental publisher example.
//!
//! Sends FAST-encoded incremental refreshes (template 70 in
//! `templates.json`) to the multicast group. Every 25th update skips a few
//! sequence numbers so the client's gap recovery can be watched.

mod common;

use bytes::BytesMut;
use chrono::Utc;
use common::{ExampleConfig, init_logging};
use fastfeed_core::format_sending_time;
use fastfeed_fast::FastEncoder;
use fastfeed_transport::encode_frame;
use std::net::SocketAddrV4;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::info;

const TEMPLATE_ID: u64 = 70;
const SYMBOLS: [&str; 3] = ["FNBB-EQ", "SOLB-EQ", "MTN-EQ"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cfg = ExampleConfig::from_env();

    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.set_multicast_ttl_v4(1)?;
    let target = SocketAddrV4::new(cfg.group, cfg.mcast_port);
    info!(%target, "publishing incremental updates");

    let mut seq: u64 = 0;
    let mut prices = [10_125_i64, 4_210, 8_800];
    let mut rpt_seqs = [0_u64; 3];
    let mut last_symbol: Option<usize> = None;
    let mut last_side = "";
    let mut last_price: i64 = 0;
    let mut last_rpt_seq: u64 = 0;
    let mut ticker = tokio::time::interval(Duration::from_millis(200));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {}
        }

        seq += if seq > 0 && seq % 25 == 0 { 4 } else { 1 };
        let idx = (seq as usize) % SYMBOLS.len();
        let side = if seq % 2 == 0 { "0" } else { "1" };
        let step: i64 = if seq % 3 == 0 { -5 } else { 5 };
        prices[idx] += step;
        rpt_seqs[idx] += 1;

        let symbol_changed = last_symbol != Some(idx);
        let side_changed = last_side != side;

        let mut enc = FastEncoder::new();
        enc.encode_pmap(&[symbol_changed, side_changed, true, true]);
        enc.encode_uint(TEMPLATE_ID);
        enc.encode_uint(seq);
        enc.encode_ascii(&format_sending_time(Utc::now()));
        if symbol_changed {
            enc.encode_ascii(SYMBOLS[idx]);
        }
        if side_changed {
            enc.encode_ascii(side);
        }
        // Delta fields are relative to the last value sent, whatever the symbol.
        enc.encode_int(prices[idx] - last_price);
        enc.encode_int(100);
        enc.encode_int(rpt_seqs[idx] as i64 - last_rpt_seq as i64);

        let mut frame = BytesMut::new();
        encode_frame(&enc.finish(), &mut frame);
        socket.send_to(&frame, target).await?;

        last_symbol = Some(idx);
        last_side = side;
        last_price = prices[idx];
        last_rpt_seq = rpt_seqs[idx];
    }

    Ok(())
}
