/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Field tags used by the feed.
//!
//! The FAST templates and the session-level tag=value messages share the FIX
//! tag numbering, so a single set of constants serves both.

/// Well-known FIX tag numbers.
pub mod tags {
    /// MsgSeqNum.
    pub const MSG_SEQ_NUM: u32 = 34;
    /// MsgType.
    pub const MSG_TYPE: u32 = 35;
    /// SendingTime.
    pub const SENDING_TIME: u32 = 52;
    /// Symbol.
    pub const SYMBOL: u32 = 55;
    /// Text.
    pub const TEXT: u32 = 58;
    /// RptSeq, the per-instrument sequence number.
    pub const RPT_SEQ: u32 = 83;
    /// HeartBtInt.
    pub const HEART_BT_INT: u32 = 108;
    /// TestReqID.
    pub const TEST_REQ_ID: u32 = 112;
    /// NoRelatedSym.
    pub const NO_RELATED_SYM: u32 = 146;
    /// MDReqID.
    pub const MD_REQ_ID: u32 = 262;
    /// SubscriptionRequestType.
    pub const SUBSCRIPTION_REQUEST_TYPE: u32 = 263;
    /// MarketDepth.
    pub const MARKET_DEPTH: u32 = 264;
    /// NoMDEntries.
    pub const NO_MD_ENTRIES: u32 = 268;
    /// MDEntryType.
    pub const MD_ENTRY_TYPE: u32 = 269;
    /// MDEntryPx.
    pub const MD_ENTRY_PX: u32 = 270;
    /// MDEntrySize.
    pub const MD_ENTRY_SIZE: u32 = 271;
    /// SecurityReqID.
    pub const SECURITY_REQ_ID: u32 = 320;
    /// SecurityRequestType.
    pub const SECURITY_REQUEST_TYPE: u32 = 321;
    /// Username.
    pub const USERNAME: u32 = 553;
    /// Password.
    pub const PASSWORD: u32 = 554;
    /// ApplSeqNum, the channel-level sequence number.
    pub const APPL_SEQ_NUM: u32 = 1181;
    /// SessionStatus.
    pub const SESSION_STATUS: u32 = 1409;
}
