/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Decoded market-data events.

use crate::message::MsgType;
use crate::types::Symbol;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a decoded entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EntryType {
    /// Bid side (MDEntryType 0).
    Bid,
    /// Offer side (MDEntryType 1).
    Offer,
    /// Trade (MDEntryType 2).
    Trade,
    /// Session-level message (heartbeat, logon, ...).
    Admin,
    /// Any other update.
    #[default]
    Update,
}

impl EntryType {
    /// Maps an MDEntryType (tag 269) code to an entry type.
    #[must_use]
    pub fn from_md_entry_type(code: &str) -> Option<Self> {
        match code {
            "0" => Some(Self::Bid),
            "1" => Some(Self::Offer),
            "2" => Some(Self::Trade),
            _ => None,
        }
    }

    /// Derives the entry type from the message type and MDEntryType.
    ///
    /// Session-level message types win over any entry type code.
    #[must_use]
    pub fn classify(msg_type: Option<&str>, md_entry_type: Option<&str>) -> Self {
        if let Some(code) = msg_type
            && code.parse::<MsgType>().is_ok_and(|t| t.is_admin())
        {
            return Self::Admin;
        }
        md_entry_type
            .and_then(Self::from_md_entry_type)
            .unwrap_or(Self::Update)
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Bid => "Bid",
            Self::Offer => "Offer",
            Self::Trade => "Trade",
            Self::Admin => "Admin",
            Self::Update => "Update",
        };
        f.write_str(s)
    }
}

/// One decoded payload from the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEvent {
    /// Template the payload was encoded with.
    pub template_id: u32,
    /// Instrument symbol, if carried.
    pub symbol: Option<Symbol>,
    /// Entry classification.
    pub entry_type: EntryType,
    /// Raw MsgType code (tag 35), if carried.
    pub message_type_code: Option<String>,
    /// Sending time, or the decoder's wall clock when unavailable.
    pub sending_time: DateTime<Utc>,
    /// False when `sending_time` is the wall-clock fallback.
    pub timestamp_reliable: bool,
    /// Fixed-point price.
    pub price: Option<Decimal>,
    /// Entry size.
    pub size: Option<i64>,
    /// Channel-level sequence number.
    pub sequence_number: Option<u64>,
    /// Instrument-level sequence number (RptSeq).
    pub instrument_sequence: Option<u64>,
    /// True when produced by the best-effort scan for an unknown template.
    pub recovered: bool,
}

impl MarketEvent {
    /// Creates an event carrying only the template id.
    ///
    /// The sending time starts as `now` and is flagged unreliable until a
    /// timestamp field is decoded.
    #[must_use]
    pub fn new(template_id: u32, now: DateTime<Utc>) -> Self {
        Self {
            template_id,
            symbol: None,
            entry_type: EntryType::Update,
            message_type_code: None,
            sending_time: now,
            timestamp_reliable: false,
            price: None,
            size: None,
            sequence_number: None,
            instrument_sequence: None,
            recovered: false,
        }
    }
}
