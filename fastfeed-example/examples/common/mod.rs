//! Shared helpers for the FastFeed examples.

#![allow(dead_code)]

use std::net::Ipv4Addr;
use tracing_subscriber::EnvFilter;

/// Multicast group used when `FASTFEED_GROUP` is unset.
pub const DEFAULT_GROUP: Ipv4Addr = Ipv4Addr::new(239, 255, 0, 1);
/// Multicast port used when `FASTFEED_MCAST_PORT` is unset.
pub const DEFAULT_MCAST_PORT: u16 = 30001;
/// Snapshot port used when `FASTFEED_PORT` is unset.
pub const DEFAULT_SNAPSHOT_PORT: u16 = 9880;

/// Example settings read from the environment.
#[derive(Debug, Clone)]
pub struct ExampleConfig {
    pub host: String,
    pub port: u16,
    pub group: Ipv4Addr,
    pub mcast_port: u16,
    pub templates: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ExampleConfig {
    pub fn from_env() -> Self {
        Self {
            host: env_or("FASTFEED_HOST", "127.0.0.1".to_string()),
            port: env_or("FASTFEED_PORT", DEFAULT_SNAPSHOT_PORT),
            group: env_or("FASTFEED_GROUP", DEFAULT_GROUP),
            mcast_port: env_or("FASTFEED_MCAST_PORT", DEFAULT_MCAST_PORT),
            templates: env_or(
                "FASTFEED_TEMPLATES",
                concat!(env!("CARGO_MANIFEST_DIR"), "/templates.json").to_string(),
            ),
            username: std::env::var("FASTFEED_USERNAME").ok(),
            password: std::env::var("FASTFEED_PASSWORD").ok(),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Initializes logging from `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();
}
