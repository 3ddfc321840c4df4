/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Recovery requests.
//!
//! Turns gaps into snapshot requests for the reliable channel. Requests are
//! fire-and-forget; the incremental stream keeps flowing meanwhile.

use crate::messages;
use crate::sequence::GapEvent;
use fastfeed_tagvalue::FixMessage;
use tracing::info;

/// Builds recovery requests with monotonically increasing ids.
#[derive(Debug, Default)]
pub struct RecoveryCoordinator {
    next_req_id: u64,
    full_book_requests: u64,
    instrument_requests: u64,
    definition_requests: u64,
}

impl RecoveryCoordinator {
    /// Creates a new coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the MarketDataRequest that recovers `gap`.
    ///
    /// A channel gap asks for the full book; an instrument gap asks for that
    /// instrument only.
    pub fn on_gap(&mut self, gap: &GapEvent) -> FixMessage {
        let id = self.next_id("MDR");
        match &gap.symbol {
            Some(symbol) => {
                self.instrument_requests += 1;
                info!(md_req_id = %id, %symbol, from = gap.from_seq, to = gap.to_seq, "requesting instrument snapshot");
            }
            None => {
                self.full_book_requests += 1;
                info!(md_req_id = %id, from = gap.from_seq, to = gap.to_seq, "requesting full book snapshot");
            }
        }
        messages::market_data_request(&id, gap.symbol.as_ref())
    }

    /// Builds a SecurityDefinitionRequest.
    pub fn security_definition_request(&mut self, request_type: &str) -> FixMessage {
        let id = self.next_id("SDR");
        self.definition_requests += 1;
        info!(security_req_id = %id, request_type, "requesting security definitions");
        messages::security_definition_request(&id, request_type)
    }

    /// Returns the number of full-book requests issued.
    #[must_use]
    pub const fn full_book_requests(&self) -> u64 {
        self.full_book_requests
    }

    /// Returns the number of single-instrument requests issued.
    #[must_use]
    pub const fn instrument_requests(&self) -> u64 {
        self.instrument_requests
    }

    /// Returns the number of security definition requests issued.
    #[must_use]
    pub const fn definition_requests(&self) -> u64 {
        self.definition_requests
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_req_id += 1;
        format!("{prefix}{}", self.next_req_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::SECURITY_REQUEST_ALL;
    use fastfeed_core::{MsgType, Symbol, tags};

    #[test]
    fn test_channel_gap_requests_full_book() {
        let mut recovery = RecoveryCoordinator::new();
        let msg = recovery.on_gap(&GapEvent {
            symbol: None,
            from_seq: 4,
            to_seq: 6,
        });

        assert_eq!(msg.msg_type(), Some(MsgType::MarketDataRequest));
        assert_eq!(msg.get(tags::MD_REQ_ID), Some("MDR1"));
        assert_eq!(msg.get(tags::SUBSCRIPTION_REQUEST_TYPE), Some("0"));
        assert_eq!(msg.get(tags::MARKET_DEPTH), Some("0"));
        assert!(!msg.contains(tags::SYMBOL));
        assert_eq!(recovery.full_book_requests(), 1);
    }

    #[test]
    fn test_instrument_gap_requests_symbol() {
        let mut recovery = RecoveryCoordinator::new();
        let symbol = Symbol::new("FNBB-EQ").unwrap();
        let msg = recovery.on_gap(&GapEvent {
            symbol: Some(symbol),
            from_seq: 10,
            to_seq: 10,
        });

        assert_eq!(msg.get(tags::NO_RELATED_SYM), Some("1"));
        assert_eq!(msg.get(tags::SYMBOL), Some("FNBB-EQ"));
        assert_eq!(recovery.instrument_requests(), 1);
        assert_eq!(recovery.full_book_requests(), 0);
    }

    #[test]
    fn test_request_ids_increase() {
        let mut recovery = RecoveryCoordinator::new();
        let gap = GapEvent {
            symbol: None,
            from_seq: 1,
            to_seq: 1,
        };
        let first = recovery.on_gap(&gap);
        let second = recovery.security_definition_request(SECURITY_REQUEST_ALL);
        let third = recovery.on_gap(&gap);

        assert_eq!(first.get(tags::MD_REQ_ID), Some("MDR1"));
        assert_eq!(second.get(tags::SECURITY_REQ_ID), Some("SDR2"));
        assert_eq!(third.get(tags::MD_REQ_ID), Some("MDR3"));
        assert_eq!(recovery.definition_requests(), 1);
    }
}
