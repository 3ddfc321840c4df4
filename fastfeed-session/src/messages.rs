/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Builders for outgoing session and request messages.
//!
//! Every message carries SendingTime (tag 52) stamped at build time.

use crate::config::SessionConfig;
use chrono::Utc;
use fastfeed_core::{MsgType, Symbol, format_sending_time, tags};
use fastfeed_tagvalue::FixMessage;

/// SubscriptionRequestType for a one-off snapshot.
pub const SUBSCRIPTION_SNAPSHOT: &str = "0";

/// MarketDepth for the full book.
pub const DEPTH_FULL_BOOK: &str = "0";

/// SecurityRequestType asking for all securities.
pub const SECURITY_REQUEST_ALL: &str = "3";

fn stamped(msg_type: MsgType) -> FixMessage {
    FixMessage::new(msg_type).with(tags::SENDING_TIME, format_sending_time(Utc::now()))
}

/// Builds a Logon (35=A) from the session configuration.
#[must_use]
pub fn logon(config: &SessionConfig) -> FixMessage {
    let mut msg = stamped(MsgType::Logon);
    msg.set_uint(tags::HEART_BT_INT, config.heartbeat_interval_secs());
    if let Some(username) = &config.username {
        msg.set(tags::USERNAME, username.as_str());
    }
    if let Some(password) = &config.password {
        msg.set(tags::PASSWORD, password.as_str());
    }
    msg
}

/// Builds a Heartbeat (35=0), echoing a TestReqID when answering a TestRequest.
#[must_use]
pub fn heartbeat(test_req_id: Option<&str>) -> FixMessage {
    let mut msg = stamped(MsgType::Heartbeat);
    if let Some(id) = test_req_id {
        msg.set(tags::TEST_REQ_ID, id);
    }
    msg
}

/// Builds a TestRequest (35=1).
#[must_use]
pub fn test_request(test_req_id: &str) -> FixMessage {
    stamped(MsgType::TestRequest).with(tags::TEST_REQ_ID, test_req_id)
}

/// Builds a Logout (35=5).
#[must_use]
pub fn logout(text: Option<&str>) -> FixMessage {
    let mut msg = stamped(MsgType::Logout);
    if let Some(text) = text {
        msg.set(tags::TEXT, text);
    }
    msg
}

/// Builds a snapshot MarketDataRequest (35=V).
///
/// Without a symbol the request covers the full book; with one it is scoped
/// to that instrument.
#[must_use]
pub fn market_data_request(md_req_id: &str, symbol: Option<&Symbol>) -> FixMessage {
    let mut msg = stamped(MsgType::MarketDataRequest)
        .with(tags::MD_REQ_ID, md_req_id)
        .with(tags::SUBSCRIPTION_REQUEST_TYPE, SUBSCRIPTION_SNAPSHOT)
        .with(tags::MARKET_DEPTH, DEPTH_FULL_BOOK);
    if let Some(symbol) = symbol {
        msg.set(tags::NO_RELATED_SYM, "1").set(tags::SYMBOL, symbol.as_str());
    }
    msg
}

/// Builds a SecurityDefinitionRequest (35=c).
#[must_use]
pub fn security_definition_request(security_req_id: &str, request_type: &str) -> FixMessage {
    stamped(MsgType::SecurityDefinitionRequest)
        .with(tags::SECURITY_REQ_ID, security_req_id)
        .with(tags::SECURITY_REQUEST_TYPE, request_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastfeed_core::parse_sending_time;
    use std::time::Duration;

    #[test]
    fn test_logon_fields() {
        let config = SessionConfig::new("h", 1)
            .with_heartbeat_interval(Duration::from_secs(30))
            .with_credentials("user", "pw");
        let msg = logon(&config);

        assert_eq!(msg.msg_type(), Some(MsgType::Logon));
        assert_eq!(msg.get(tags::HEART_BT_INT), Some("30"));
        assert_eq!(msg.get(tags::USERNAME), Some("user"));
        assert_eq!(msg.get(tags::PASSWORD), Some("pw"));
        assert!(msg.get(tags::SENDING_TIME).and_then(parse_sending_time).is_some());
    }

    #[test]
    fn test_logon_without_credentials() {
        let msg = logon(&SessionConfig::new("h", 1));
        assert!(!msg.contains(tags::USERNAME));
        assert!(!msg.contains(tags::PASSWORD));
    }

    #[test]
    fn test_heartbeat_echo() {
        assert_eq!(heartbeat(Some("T1")).get(tags::TEST_REQ_ID), Some("T1"));
        assert!(!heartbeat(None).contains(tags::TEST_REQ_ID));
    }

    #[test]
    fn test_market_data_request_scopes() {
        let full = market_data_request("MDR1", None);
        assert_eq!(full.get(tags::SUBSCRIPTION_REQUEST_TYPE), Some("0"));
        assert_eq!(full.get(tags::MARKET_DEPTH), Some("0"));
        assert!(!full.contains(tags::SYMBOL));

        let symbol = Symbol::new("FNBB-EQ").unwrap();
        let single = market_data_request("MDR2", Some(&symbol));
        assert_eq!(single.get(tags::NO_RELATED_SYM), Some("1"));
        assert_eq!(single.get(tags::SYMBOL), Some("FNBB-EQ"));
    }

    #[test]
    fn test_security_definition_request() {
        let msg = security_definition_request("SDR1", SECURITY_REQUEST_ALL);
        assert_eq!(msg.msg_type(), Some(MsgType::SecurityDefinitionRequest));
        assert_eq!(msg.get(tags::SECURITY_REQ_ID), Some("SDR1"));
        assert_eq!(msg.get(tags::SECURITY_REQUEST_TYPE), Some("3"));
    }
}
