/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! TCP connect for the reliable channel.

use fastfeed_core::TransportError;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::debug;

/// Connects to `host:port`, giving up after `timeout`.
///
/// Nagle's algorithm is disabled on the returned stream.
///
/// # Errors
/// Returns `TransportError::ConnectTimeout` if the connect does not complete
/// in time, or `TransportError::Io` if it fails.
pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<TcpStream, TransportError> {
    let addr = format!("{host}:{port}");
    debug!(%addr, ?timeout, "connecting");

    let stream = tokio::time::timeout(timeout, TcpStream::connect(&addr))
        .await
        .map_err(|_| TransportError::ConnectTimeout { addr: addr.clone() })??;
    stream.set_nodelay(true)?;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_connect_local() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let (client, server) = tokio::join!(
            connect("127.0.0.1", port, Duration::from_secs(5)),
            listener.accept()
        );
        let client = client.unwrap();
        assert!(client.nodelay().unwrap());
        assert_eq!(client.peer_addr().unwrap(), server.unwrap().0.local_addr().unwrap());
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = connect("127.0.0.1", port, Duration::from_secs(5)).await;
        assert!(matches!(result, Err(TransportError::Io(_))));
    }
}
