/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session configuration.
//!
//! This module provides configuration options for the reliable session.

use fastfeed_core::ConfigError;
use std::time::Duration;

/// Default maximum frame size on the reliable channel.
const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024;

/// Configuration for the reliable snapshot/recovery session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Remote host.
    pub host: String,
    /// Remote port.
    pub port: u16,
    /// Heartbeat interval, sent as HeartBtInt (tag 108).
    pub heartbeat_interval: Duration,
    /// Silence tolerated beyond the heartbeat interval before a TestRequest.
    pub test_request_grace: Duration,
    /// Time allowed for any reply to an outstanding TestRequest.
    pub response_timeout: Duration,
    /// Time allowed for the Logon acknowledgement.
    pub logon_timeout: Duration,
    /// Time allowed for sending Logout on shutdown.
    pub logout_timeout: Duration,
    /// Time allowed for the TCP connect.
    pub connect_timeout: Duration,
    /// Optional Username (tag 553).
    pub username: Option<String>,
    /// Optional Password (tag 554).
    pub password: Option<String>,
    /// Period of the liveness timer.
    pub timer_interval: Duration,
    /// Maximum frame size in bytes.
    pub max_frame_size: usize,
}

impl SessionConfig {
    /// Creates a new session configuration for `host:port`.
    ///
    /// # Arguments
    /// * `host` - The remote host
    /// * `port` - The remote port
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            heartbeat_interval: Duration::from_secs(30),
            test_request_grace: Duration::from_secs(30),
            response_timeout: Duration::from_secs(30),
            logon_timeout: Duration::from_secs(10),
            logout_timeout: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(10),
            username: None,
            password: None,
            timer_interval: Duration::from_secs(1),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub const fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Sets the TestRequest grace period.
    #[must_use]
    pub const fn with_test_request_grace(mut self, grace: Duration) -> Self {
        self.test_request_grace = grace;
        self
    }

    /// Sets the TestRequest response timeout.
    #[must_use]
    pub const fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Sets the logon timeout.
    #[must_use]
    pub const fn with_logon_timeout(mut self, timeout: Duration) -> Self {
        self.logon_timeout = timeout;
        self
    }

    /// Sets the logout timeout.
    #[must_use]
    pub const fn with_logout_timeout(mut self, timeout: Duration) -> Self {
        self.logout_timeout = timeout;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the logon credentials.
    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets the liveness timer period.
    #[must_use]
    pub const fn with_timer_interval(mut self, interval: Duration) -> Self {
        self.timer_interval = interval;
        self
    }

    /// Sets the maximum frame size.
    #[must_use]
    pub const fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Returns the heartbeat interval in seconds.
    #[must_use]
    pub const fn heartbeat_interval_secs(&self) -> u64 {
        self.heartbeat_interval.as_secs()
    }

    /// Checks that the settings are usable.
    ///
    /// # Errors
    /// Returns `ConfigError` naming the first offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::Missing("session host"));
        }
        if self.heartbeat_interval.as_secs() == 0 {
            return Err(ConfigError::Invalid {
                name: "heartbeat_interval",
                reason: "must be at least one second".to_string(),
            });
        }
        if self.timer_interval.is_zero() {
            return Err(ConfigError::Invalid {
                name: "timer_interval",
                reason: "must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::new("127.0.0.1", 9000);
        assert_eq!(config.heartbeat_interval_secs(), 30);
        assert_eq!(config.test_request_grace, Duration::from_secs(30));
        assert!(config.username.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = SessionConfig::new("feed.local", 9000)
            .with_heartbeat_interval(Duration::from_secs(5))
            .with_credentials("user", "secret")
            .with_response_timeout(Duration::from_secs(3));
        assert_eq!(config.heartbeat_interval_secs(), 5);
        assert_eq!(config.username.as_deref(), Some("user"));
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.response_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_validate() {
        assert_eq!(
            SessionConfig::new("", 1).validate(),
            Err(ConfigError::Missing("session host"))
        );
        let zero = SessionConfig::new("h", 1).with_heartbeat_interval(Duration::ZERO);
        assert!(matches!(
            zero.validate(),
            Err(ConfigError::Invalid {
                name: "heartbeat_interval",
                ..
            })
        ));
    }
}
