//! Core traits for the RDP sender.
//!
//! The sender never touches a socket directly; it talks to the network through
//! [`DatagramTransport`], which is what lets the state machine run against a
//! scripted transport in tests.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

/// An unreliable, unordered, at-most-once datagram transport.
///
/// # Requirements
///
/// - `send_to` MUST transmit the whole datagram or fail
/// - `recv_timeout` MUST read at most one datagram per call
/// - `recv_timeout` MUST return `Ok(None)` when nothing arrives within `timeout`,
///   and reserve `Err` for genuine transport failures
///
/// # Example
///
/// ```ignore
/// struct Loopback { queue: VecDeque<Vec<u8>>, addr: SocketAddr }
///
/// impl DatagramTransport for Loopback {
///     async fn send_to(&mut self, datagram: &[u8], _peer: SocketAddr) -> io::Result<usize> {
///         self.queue.push_back(datagram.to_vec());
///         Ok(datagram.len())
///     }
///
///     async fn recv_timeout(
///         &mut self,
///         buf: &mut [u8],
///         _timeout: Duration,
///     ) -> io::Result<Option<(usize, SocketAddr)>> {
///         Ok(self.queue.pop_front().map(|d| {
///             buf[..d.len()].copy_from_slice(&d);
///             (d.len(), self.addr)
///         }))
///     }
/// }
/// ```
pub trait DatagramTransport {
    /// Send one datagram to `peer`, returning the number of bytes sent.
    fn send_to(
        &mut self,
        datagram: &[u8],
        peer: SocketAddr,
    ) -> impl Future<Output = io::Result<usize>> + Send;

    /// Wait up to `timeout` for one datagram.
    ///
    /// Returns the datagram length and its source, or `None` on timeout.
    fn recv_timeout(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> impl Future<Output = io::Result<Option<(usize, SocketAddr)>>> + Send;

    /// Local address the transport is bound to, if it has one.
    fn local_addr(&self) -> io::Result<SocketAddr> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "transport has no local address",
        ))
    }
}
