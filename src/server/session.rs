//! Per-sender session tracking for the responder.

use std::net::SocketAddr;

use tokio::time::Instant;

use crate::transport::LinkProperties;

/// State the responder keeps for one sender between SYN and FIN.
#[derive(Debug, Clone)]
pub struct PeerSession {
    /// Sender address.
    pub peer: SocketAddr,
    /// Link properties from the sender's SYN.
    pub link: LinkProperties,
    /// Receive window advertised to this sender.
    pub recv_window: u32,
    /// When the first SYN arrived.
    pub established: Instant,
    /// Data packets received.
    pub data_packets: u64,
    /// Data payload bytes received.
    pub data_bytes: u64,
}

impl PeerSession {
    /// Create a session from a SYN.
    pub fn new(peer: SocketAddr, link: LinkProperties, recv_window: u32) -> Self {
        Self {
            peer,
            link,
            recv_window,
            established: Instant::now(),
            data_packets: 0,
            data_bytes: 0,
        }
    }

    /// Record an arriving data segment.
    pub fn on_data(&mut self, payload_len: usize) {
        self.data_packets += 1;
        self.data_bytes += payload_len as u64;
    }
}
