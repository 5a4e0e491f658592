//! Async UDP transport for the RDP sender.
//!
//! [`UdpTransport`] is the production [`DatagramTransport`]: a tokio UDP socket
//! with a bounded single-datagram wait.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use tokio::net::UdpSocket;

use crate::core::DatagramTransport;

/// Async UDP transport.
#[derive(Debug)]
pub struct UdpTransport {
    /// The underlying UDP socket.
    socket: UdpSocket,
}

impl UdpTransport {
    /// Bind to an ephemeral port on all IPv4 interfaces.
    pub async fn bind_any() -> io::Result<Self> {
        Self::bind(SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0))).await
    }

    /// Bind to the given address.
    pub async fn bind(addr: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self::from_socket(socket))
    }

    /// Wrap an existing tokio UDP socket.
    pub fn from_socket(socket: UdpSocket) -> Self {
        Self { socket }
    }
}

impl DatagramTransport for UdpTransport {
    async fn send_to(&mut self, datagram: &[u8], peer: SocketAddr) -> io::Result<usize> {
        self.socket.send_to(datagram, peer).await
    }

    async fn recv_timeout(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> io::Result<Option<(usize, SocketAddr)>> {
        match tokio::time::timeout(timeout, self.socket.recv_from(buf)).await {
            Ok(Ok(received)) => Ok(Some(received)),
            Ok(Err(e)) => Err(e),
            Err(_elapsed) => Ok(None),
        }
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn localhost() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    #[tokio::test]
    async fn test_transport_bind() {
        let transport = UdpTransport::bind_any().await.unwrap();
        let addr = DatagramTransport::local_addr(&transport).unwrap();
        assert!(addr.port() != 0);
        assert!(addr.is_ipv4());
    }

    #[tokio::test]
    async fn test_transport_send_recv() {
        let mut server = UdpTransport::bind(localhost()).await.unwrap();
        let server_addr = DatagramTransport::local_addr(&server).unwrap();
        let mut client = UdpTransport::bind(localhost()).await.unwrap();

        let data = b"hello RDP";
        let sent = client.send_to(data, server_addr).await.unwrap();
        assert_eq!(sent, data.len());

        let mut buf = [0u8; 64];
        let (len, from) = server
            .recv_timeout(&mut buf, Duration::from_secs(5))
            .await
            .unwrap()
            .expect("datagram within timeout");
        assert_eq!(&buf[..len], data);
        assert_eq!(from, DatagramTransport::local_addr(&client).unwrap());
    }

    #[tokio::test]
    async fn test_transport_recv_timeout() {
        let mut transport = UdpTransport::bind(localhost()).await.unwrap();
        let mut buf = [0u8; 16];
        let received = transport
            .recv_timeout(&mut buf, Duration::from_millis(20))
            .await
            .unwrap();
        assert!(received.is_none());
    }
}
