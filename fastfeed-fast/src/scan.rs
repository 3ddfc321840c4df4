/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Best-effort field recovery for payloads with an unknown template.

use crate::decoder::DecoderConfig;
use crate::error::FastError;
use chrono::{DateTime, Utc};
use fastfeed_core::{MarketEvent, Symbol, parse_sending_time};
use regex::Regex;

/// Scans raw payload text for a symbol token and a sending time.
#[derive(Debug, Clone)]
pub(crate) struct FallbackScanner {
    symbol: Regex,
    timestamp: Regex,
    scan_limit: usize,
}

impl FallbackScanner {
    pub(crate) fn new(config: &DecoderConfig) -> Result<Self, FastError> {
        let suffixes = config
            .instrument_suffixes
            .iter()
            .map(|s| regex::escape(s))
            .collect::<Vec<_>>()
            .join("|");
        Ok(Self {
            symbol: Regex::new(&format!(
                "(?:^|[^A-Z0-9])([A-Z0-9]{{2,10}}-(?:{suffixes}))"
            ))?,
            timestamp: Regex::new(r"\d{8}-\d{2}:\d{2}:\d{2}")?,
            scan_limit: config.scan_limit,
        })
    }

    /// Builds a partially populated event from whatever the scan finds.
    pub(crate) fn scan(&self, template_id: u32, payload: &[u8], now: DateTime<Utc>) -> MarketEvent {
        let window = &payload[..payload.len().min(self.scan_limit)];
        let text: String = window.iter().map(|b| char::from(b & 0x7F)).collect();

        let mut event = MarketEvent::new(template_id, now);
        event.recovered = true;
        event.symbol = self
            .symbol
            .captures(&text)
            .and_then(|c| c.get(1))
            .and_then(|m| Symbol::new(m.as_str()));
        if let Some(time) = self
            .timestamp
            .find(&text)
            .and_then(|m| parse_sending_time(m.as_str()))
        {
            event.sending_time = time;
            event.timestamp_reliable = true;
        }
        event
    }
}
