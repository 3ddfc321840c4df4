/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Events delivered to the consumer.

use fastfeed_core::MarketEvent;
use fastfeed_session::{GapEvent, SessionPhase};
use fastfeed_tagvalue::FixMessage;
use std::fmt;

/// One of the two feed channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Incremental multicast channel.
    Incremental,
    /// Reliable snapshot/recovery session.
    Reliable,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incremental => f.write_str("incremental"),
            Self::Reliable => f.write_str("reliable"),
        }
    }
}

/// Everything the feed handler publishes on its event channel.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// A decoded incremental payload.
    Market(MarketEvent),
    /// A sequence gap; a recovery request has been queued for it.
    Recovery(GapEvent),
    /// A Market Data Snapshot (35=W) from the reliable channel.
    Snapshot(FixMessage),
    /// The reliable session changed phase.
    Session(SessionPhase),
    /// A channel stopped for good; the other channel keeps running.
    ChannelClosed {
        /// Channel that stopped.
        channel: Channel,
        /// Error that stopped it.
        reason: String,
    },
}

impl FeedEvent {
    /// Returns the market event, if this is one.
    #[must_use]
    pub const fn as_market(&self) -> Option<&MarketEvent> {
        match self {
            Self::Market(event) => Some(event),
            _ => None,
        }
    }
}

/// Counters kept by the incremental channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    /// Datagrams received.
    pub packets: u64,
    /// Framed payloads extracted.
    pub payloads: u64,
    /// Payloads decoded against a known template.
    pub decoded: u64,
    /// Payloads whose template was unknown.
    pub unknown_templates: u64,
    /// Payloads discarded because they failed to decode.
    pub discarded: u64,
    /// Events discarded as sequence duplicates.
    pub duplicates: u64,
    /// Frame resynchronizations.
    pub resyncs: u64,
}
