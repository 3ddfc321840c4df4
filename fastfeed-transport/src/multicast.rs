/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! UDP multicast membership for the incremental channel.

use crate::codec::DEFAULT_MAX_FRAME_SIZE;
use fastfeed_core::TransportError;
use std::net::{Ipv4Addr, SocketAddrV4};
use tokio::net::UdpSocket;
use tracing::info;

/// Largest UDP datagram.
pub const MAX_DATAGRAM_SIZE: usize = 65_535;

/// Multicast channel settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MulticastConfig {
    /// Multicast group address.
    pub group: Ipv4Addr,
    /// UDP port.
    pub port: u16,
    /// Local interface to join on; unspecified lets the OS choose.
    pub interface: Ipv4Addr,
    /// Maximum payload size accepted by the frame codec.
    pub max_frame_size: usize,
}

impl MulticastConfig {
    /// Creates a config for `group:port` on the default interface.
    #[must_use]
    pub const fn new(group: Ipv4Addr, port: u16) -> Self {
        Self {
            group,
            port,
            interface: Ipv4Addr::UNSPECIFIED,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Sets the local interface.
    #[must_use]
    pub const fn with_interface(mut self, interface: Ipv4Addr) -> Self {
        self.interface = interface;
        self
    }

    /// Sets the maximum payload size.
    #[must_use]
    pub const fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }
}

/// Binds the group's port and joins the multicast group.
///
/// # Errors
/// Returns `TransportError::InvalidAddress` if `group` is not a multicast
/// address, or `TransportError::Io` if binding or joining fails.
pub async fn bind_multicast(config: &MulticastConfig) -> Result<UdpSocket, TransportError> {
    if !config.group.is_multicast() {
        return Err(TransportError::InvalidAddress(config.group.to_string()));
    }

    let socket = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, config.port)).await?;
    socket.join_multicast_v4(config.group, config.interface)?;
    info!(group = %config.group, port = config.port, interface = %config.interface, "joined multicast group");
    Ok(socket)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_unicast_group() {
        let config = MulticastConfig::new(Ipv4Addr::new(10, 0, 0, 1), 0);
        let result = bind_multicast(&config).await;
        assert!(matches!(result, Err(TransportError::InvalidAddress(_))));
    }

    #[test]
    fn test_config_builder() {
        let config = MulticastConfig::new(Ipv4Addr::new(239, 1, 1, 1), 9001)
            .with_interface(Ipv4Addr::LOCALHOST)
            .with_max_frame_size(1500);
        assert_eq!(config.interface, Ipv4Addr::LOCALHOST);
        assert_eq!(config.max_frame_size, 1500);
    }
}
