//! High-level sender API.
//!
//! [`SenderSocket`] drives one logical connection through its lifecycle:
//!
//! ```text
//!            open (SYN acked)
//!   CLOSED ───────────────────▶ OPEN ──┐
//!     ▲                          │     │ send (unacknowledged)
//!     └──────────────────────────┘ ◀───┘
//!            close (FIN acked)
//! ```
//!
//! Failed `open` leaves the socket CLOSED and failed `close` leaves it OPEN,
//! so both can simply be called again.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tracing::{debug, info};

use crate::core::constants::{
    DATA_HEADER_SIZE, MAX_DATA_ATTEMPTS, MAX_PAYLOAD_SIZE, MAX_SYN_ATTEMPTS,
};
use crate::core::{DatagramTransport, RdpError, RdpResult, SenderConfig};
use crate::transport::{
    ConnectionPhase, ConnectionState, DataHeader, LinkProperties, Request, SynHeader,
    TransportError, UdpTransport, resolve_peer, try_send_n,
};

/// Sender side of an RDP connection.
///
/// Generic over the datagram transport so the state machine can run over
/// real UDP ([`UdpTransport`], the default) or a scripted transport.
///
/// # Example
///
/// ```ignore
/// use rdp_sender::prelude::*;
///
/// let mut socket = SenderSocket::bind().await?;
/// let link = LinkProperties::new(0.2, 1e6, 0.0, 0.0);
///
/// socket.open("receiver.example.net", MAGIC_PORT, 10, &link).await?;
/// socket.send(b"hello").await?;
/// socket.close().await?;
/// ```
#[derive(Debug)]
pub struct SenderSocket<T = UdpTransport> {
    transport: T,
    state: ConnectionState,
}

impl SenderSocket<UdpTransport> {
    /// Create a sender over a UDP socket bound to an ephemeral port.
    pub async fn bind() -> RdpResult<Self> {
        let transport = UdpTransport::bind_any().await.map_err(RdpError::Bind)?;
        Ok(Self::with_transport(transport))
    }
}

impl<T: DatagramTransport> SenderSocket<T> {
    /// Create a closed sender over an existing transport.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            state: ConnectionState::new(),
        }
    }

    /// Validate `config` and open the connection it describes.
    pub async fn open_config(&mut self, config: &SenderConfig) -> RdpResult<LinkProperties> {
        config.validate()?;
        self.open(&config.destination, config.port, config.window, &config.link)
            .await
    }

    /// Open a connection to `destination:port`.
    ///
    /// Resolves the destination, then sends a SYN carrying `link` with the
    /// buffer size set to `window + MAX_DATA_ATTEMPTS`, retrying up to
    /// [`MAX_SYN_ATTEMPTS`] times. On success the RTO becomes three times the
    /// accepted attempt's round trip. Returns the link properties as sent.
    pub async fn open(
        &mut self,
        destination: &str,
        port: u16,
        window: u32,
        link: &LinkProperties,
    ) -> RdpResult<LinkProperties> {
        self.state.ensure_closed()?;

        let peer = resolve_peer(destination, port).await?;

        let mut link = *link;
        link.buffer_size = window.saturating_add(MAX_DATA_ATTEMPTS);
        let seq = self.state.seq();
        let syn = SynHeader::new(seq, link).to_bytes();

        let acked = try_send_n(
            &mut self.transport,
            peer,
            &Request::handshake(seq, &syn),
            MAX_SYN_ATTEMPTS,
            self.state.rto(),
        )
        .await?;

        let rto = self.state.complete_handshake(peer, acked.rtt);
        info!(
            ack_seq = acked.ack.ack_seq,
            window = acked.ack.recv_window,
            attempt = acked.attempt,
            rtt = ?acked.rtt,
            rto = ?rto,
            %peer,
            "SYN-ACK; setting initial RTO"
        );

        Ok(link)
    }

    /// Send one data segment without waiting for acknowledgment.
    ///
    /// The datagram on the wire is not just `payload`: it is an 8-byte data
    /// header (current sequence number, no flags) followed by `payload`, so
    /// the receiver can tell data apart from SYN and FIN. Payloads over
    /// [`MAX_PAYLOAD_SIZE`] are rejected before anything is sent; chunking is
    /// the caller's job.
    pub async fn send(&mut self, payload: &[u8]) -> RdpResult<()> {
        let peer = self.state.ensure_open()?;

        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(RdpError::InvalidArguments(format!(
                "payload of {} bytes exceeds maximum of {MAX_PAYLOAD_SIZE}",
                payload.len()
            )));
        }

        let mut datagram = Vec::with_capacity(DATA_HEADER_SIZE + payload.len());
        datagram.extend_from_slice(&DataHeader::data(self.state.seq()).to_bytes());
        datagram.extend_from_slice(payload);

        self.transport
            .send_to(&datagram, peer)
            .await
            .map_err(TransportError::SendFailed)?;
        Ok(())
    }

    /// Close the connection.
    ///
    /// Sends a FIN and waits for its acknowledgment using the RTO derived in
    /// `open`, retrying up to [`MAX_DATA_ATTEMPTS`] times.
    pub async fn close(&mut self) -> RdpResult<()> {
        let peer = self.state.ensure_open()?;

        let seq = self.state.seq();
        let fin = DataHeader::fin(seq).to_bytes();

        let acked = try_send_n(
            &mut self.transport,
            peer,
            &Request::teardown(seq, &fin),
            MAX_DATA_ATTEMPTS,
            self.state.rto(),
        )
        .await?;

        self.state.complete_teardown();
        info!(
            ack_seq = acked.ack.ack_seq,
            window = acked.ack.recv_window,
            attempt = acked.attempt,
            "FIN-ACK"
        );

        Ok(())
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> ConnectionPhase {
        self.state.phase()
    }

    /// Check if the connection is open.
    pub fn is_connected(&self) -> bool {
        self.state.is_open()
    }

    /// Current retransmission timeout.
    pub fn rto(&self) -> Duration {
        self.state.rto().rto()
    }

    /// Peer address, present only while open.
    pub fn peer(&self) -> Option<SocketAddr> {
        self.state.peer()
    }

    /// Sequence number carried by outgoing packets.
    pub fn sequence(&self) -> u32 {
        self.state.seq()
    }

    /// Local address of the underlying transport.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Get a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T> Drop for SenderSocket<T> {
    fn drop(&mut self) {
        if self.state.is_open() {
            debug!(peer = ?self.state.peer(), "dropping open sender; no FIN sent");
        }
    }
}
