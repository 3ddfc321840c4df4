/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Heartbeat and TestRequest management.
//!
//! This module handles session liveness:
//! - Sending heartbeats at the configured interval
//! - Sending a TestRequest when the peer goes quiet
//! - Declaring the session dead when the TestRequest goes unanswered
//!
//! All methods take `now` so the timing can be driven by any clock.

use std::time::{Duration, Instant};

/// Manages heartbeat timing for a session.
#[derive(Debug, Clone)]
pub struct HeartbeatManager {
    interval: Duration,
    grace: Duration,
    response_timeout: Duration,
    last_sent: Instant,
    last_received: Instant,
    /// Outstanding TestRequest id and when it was sent.
    test_request: Option<(String, Instant)>,
}

impl HeartbeatManager {
    /// Creates a new heartbeat manager.
    ///
    /// # Arguments
    /// * `interval` - The heartbeat interval
    /// * `grace` - Silence tolerated beyond the interval before a TestRequest
    /// * `response_timeout` - Time allowed for a reply to a TestRequest
    /// * `now` - Current time
    #[must_use]
    pub fn new(interval: Duration, grace: Duration, response_timeout: Duration, now: Instant) -> Self {
        Self {
            interval,
            grace,
            response_timeout,
            last_sent: now,
            last_received: now,
            test_request: None,
        }
    }

    /// Records that a message was sent.
    #[inline]
    pub fn on_message_sent(&mut self, now: Instant) {
        self.last_sent = now;
    }

    /// Records that a message was received.
    ///
    /// Any inbound message proves the peer alive and clears an outstanding
    /// TestRequest.
    pub fn on_message_received(&mut self, now: Instant) {
        self.last_received = now;
        self.test_request = None;
    }

    /// Checks if a heartbeat should be sent.
    #[must_use]
    pub fn should_send_heartbeat(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_sent) >= self.interval
    }

    /// Checks if a TestRequest should be sent.
    ///
    /// True once nothing has been received for longer than the interval plus
    /// the grace period, unless a TestRequest is already outstanding.
    #[must_use]
    pub fn should_send_test_request(&self, now: Instant) -> bool {
        self.test_request.is_none()
            && now.saturating_duration_since(self.last_received) > self.interval + self.grace
    }

    /// Checks if the outstanding TestRequest has gone unanswered too long.
    #[must_use]
    pub fn is_timed_out(&self, now: Instant) -> bool {
        self.test_request
            .as_ref()
            .is_some_and(|(_, sent_at)| now.saturating_duration_since(*sent_at) > self.response_timeout)
    }

    /// Records that a TestRequest was sent.
    pub fn on_test_request_sent(&mut self, test_req_id: String, now: Instant) {
        self.test_request = Some((test_req_id, now));
        self.last_sent = now;
    }

    /// Returns the pending TestRequest ID, if any.
    #[must_use]
    pub fn pending_test_request(&self) -> Option<&str> {
        self.test_request.as_ref().map(|(id, _)| id.as_str())
    }

    /// Returns the time the pending TestRequest has been outstanding.
    #[must_use]
    pub fn test_request_elapsed(&self, now: Instant) -> Option<Duration> {
        self.test_request
            .as_ref()
            .map(|(_, sent_at)| now.saturating_duration_since(*sent_at))
    }

    /// Returns the time since the last message was received.
    #[must_use]
    pub fn time_since_last_received(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_received)
    }

    /// Returns the heartbeat interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Resets the manager state.
    pub fn reset(&mut self, now: Instant) {
        self.last_sent = now;
        self.last_received = now;
        self.test_request = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn manager(now: Instant) -> HeartbeatManager {
        HeartbeatManager::new(secs(30), secs(30), secs(10), now)
    }

    #[test]
    fn test_heartbeat_due_after_interval() {
        let t0 = Instant::now();
        let mut hb = manager(t0);
        assert!(!hb.should_send_heartbeat(t0 + secs(29)));
        assert!(hb.should_send_heartbeat(t0 + secs(30)));

        hb.on_message_sent(t0 + secs(30));
        assert!(!hb.should_send_heartbeat(t0 + secs(31)));
    }

    #[test]
    fn test_test_request_after_interval_plus_grace() {
        let t0 = Instant::now();
        let mut hb = manager(t0);
        assert!(!hb.should_send_test_request(t0 + secs(60)));
        assert!(hb.should_send_test_request(t0 + secs(61)));

        hb.on_test_request_sent("TEST1".to_string(), t0 + secs(61));
        assert_eq!(hb.pending_test_request(), Some("TEST1"));
        assert!(!hb.should_send_test_request(t0 + secs(62)));
    }

    #[test]
    fn test_timeout_and_cancel() {
        let t0 = Instant::now();
        let mut hb = manager(t0);
        hb.on_test_request_sent("TEST1".to_string(), t0);

        assert!(!hb.is_timed_out(t0 + secs(10)));
        assert!(hb.is_timed_out(t0 + secs(11)));

        hb.on_message_received(t0 + secs(5));
        assert!(hb.pending_test_request().is_none());
        assert!(!hb.is_timed_out(t0 + secs(11)));
    }
}
