//! Receiving peer for the RDP sender.
//!
//! [`Responder`] answers SYN and FIN packets with acknowledgments and counts
//! data segments. Loss is simulated with the probabilities each sender
//! negotiates in its SYN: forward loss drops arriving packets, return loss
//! drops outgoing ACKs.

use std::collections::HashMap;
use std::net::SocketAddr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

use super::session::PeerSession;
use crate::core::constants::MAX_PKT_SIZE;
use crate::transport::{AckHeader, Flags, SenderPacket};

/// Errors that can occur in the responder.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to address.
    #[error("bind failed: {0}")]
    Bind(#[source] std::io::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Responder configuration.
#[derive(Debug, Clone)]
pub struct ResponderConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,

    /// Receive window to advertise; `None` echoes the SYN's buffer size.
    pub recv_window: Option<u32>,

    /// Seed for the loss simulator; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], crate::core::constants::MAGIC_PORT)),
            recv_window: None,
            seed: None,
        }
    }
}

/// Builder for creating a [`ResponderConfig`].
#[derive(Debug, Default)]
pub struct ResponderBuilder {
    config: ResponderConfig,
}

impl ResponderBuilder {
    /// Create a new responder builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address.
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.config.bind_addr = addr;
        self
    }

    /// Advertise a fixed receive window.
    pub fn recv_window(mut self, window: u32) -> Self {
        self.config.recv_window = Some(window);
        self
    }

    /// Seed the loss simulator.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Build the responder configuration.
    pub fn build(self) -> ResponderConfig {
        self.config
    }
}

/// Counters kept by the responder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponderStats {
    /// SYN packets accepted (after forward loss).
    pub syns: u64,
    /// FIN packets accepted (after forward loss).
    pub fins: u64,
    /// Sessions closed by a FIN.
    pub sessions_closed: u64,
    /// Data segments received for a known session.
    pub data_packets: u64,
    /// Packets dropped by forward-loss simulation.
    pub dropped_forward: u64,
    /// ACKs dropped by return-loss simulation.
    pub dropped_return: u64,
    /// Datagrams that failed to decode or had no session.
    pub ignored: u64,
}

/// A loss-simulating receiver.
#[derive(Debug)]
pub struct Responder {
    socket: UdpSocket,
    config: ResponderConfig,
    sessions: HashMap<SocketAddr, PeerSession>,
    rng: StdRng,
    stats: ResponderStats,
}

impl Responder {
    /// Bind a responder.
    pub async fn bind(config: ResponderConfig) -> Result<Self, ServerError> {
        let socket = UdpSocket::bind(config.bind_addr)
            .await
            .map_err(ServerError::Bind)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            socket,
            config,
            sessions: HashMap::new(),
            rng,
            stats: ResponderStats::default(),
        })
    }

    /// Local address the responder is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Counters so far.
    pub fn stats(&self) -> ResponderStats {
        self.stats
    }

    /// Session for `peer`, if one is open.
    pub fn session(&self, peer: &SocketAddr) -> Option<&PeerSession> {
        self.sessions.get(peer)
    }

    /// Serve until `count` sessions have been closed by a FIN.
    ///
    /// Returns as soon as the last FIN-ACK is sent; if that ACK is lost the
    /// sender's retransmitted FIN goes unanswered.
    pub async fn serve_sessions(&mut self, count: u64) -> Result<ResponderStats, ServerError> {
        let target = self.stats.sessions_closed + count;
        let mut buf = vec![0u8; MAX_PKT_SIZE];
        while self.stats.sessions_closed < target {
            self.serve_one(&mut buf).await?;
        }
        Ok(self.stats)
    }

    /// Serve forever.
    pub async fn serve(&mut self) -> Result<(), ServerError> {
        let mut buf = vec![0u8; MAX_PKT_SIZE];
        loop {
            self.serve_one(&mut buf).await?;
        }
    }

    async fn serve_one(&mut self, buf: &mut [u8]) -> Result<(), ServerError> {
        let (len, from) = self.socket.recv_from(buf).await?;
        if let Some(ack) = self.handle_datagram(&buf[..len], from) {
            self.socket.send_to(&ack.to_bytes(), from).await?;
        }
        Ok(())
    }

    /// Process one datagram from `from`; returns the ACK to send, if any.
    pub fn handle_datagram(&mut self, datagram: &[u8], from: SocketAddr) -> Option<AckHeader> {
        let packet = match SenderPacket::decode(datagram) {
            Ok(packet) => packet,
            Err(e) => {
                debug!(%from, error = %e, "ignoring undecodable datagram");
                self.stats.ignored += 1;
                return None;
            }
        };

        let loss_forward = match &packet {
            SenderPacket::Syn(syn) => syn.link.loss_forward(),
            _ => self
                .sessions
                .get(&from)
                .map_or(0.0, |s| s.link.loss_forward()),
        };
        if lost(&mut self.rng, loss_forward) {
            debug!(%from, seq = packet.seq(), "simulated forward loss");
            self.stats.dropped_forward += 1;
            return None;
        }

        let (ack, loss_return) = match packet {
            SenderPacket::Syn(syn) => {
                let window = self.config.recv_window.unwrap_or(syn.link.buffer_size);
                let session = self
                    .sessions
                    .entry(from)
                    .or_insert_with(|| PeerSession::new(from, syn.link, window));
                info!(
                    %from,
                    seq = syn.header.seq,
                    window,
                    rtt = syn.link.rtt,
                    speed = syn.link.speed,
                    "SYN"
                );
                self.stats.syns += 1;
                let mut ack = AckHeader::new(syn.header.seq, session.recv_window);
                ack.flags = ack.flags.with(Flags::SYN);
                (ack, syn.link.loss_return())
            }
            SenderPacket::Fin(header) => {
                let (window, loss_return) = match self.sessions.remove(&from) {
                    Some(session) => {
                        info!(
                            %from,
                            seq = header.seq,
                            packets = session.data_packets,
                            bytes = session.data_bytes,
                            elapsed = ?session.established.elapsed(),
                            "FIN"
                        );
                        self.stats.sessions_closed += 1;
                        (session.recv_window, session.link.loss_return())
                    }
                    None => {
                        debug!(%from, seq = header.seq, "FIN for closed session, re-acknowledging");
                        (self.config.recv_window.unwrap_or(0), 0.0)
                    }
                };
                self.stats.fins += 1;
                let mut ack = AckHeader::new(header.seq, window);
                ack.flags = ack.flags.with(Flags::FIN);
                (ack, loss_return)
            }
            SenderPacket::Data { header, payload } => {
                match self.sessions.get_mut(&from) {
                    Some(session) => {
                        session.on_data(payload.len());
                        self.stats.data_packets += 1;
                    }
                    None => {
                        warn!(%from, seq = header.seq, "data without a session");
                        self.stats.ignored += 1;
                    }
                }
                return None;
            }
        };

        if lost(&mut self.rng, loss_return) {
            debug!(%from, ack_seq = ack.ack_seq, reply = ack.flags.label(), "simulated return loss");
            self.stats.dropped_return += 1;
            return None;
        }

        debug!(%from, ack_seq = ack.ack_seq, reply = ack.flags.label(), "replying");
        Some(ack)
    }
}

/// Draw a loss event with probability `p`; out-of-range values are clamped.
fn lost(rng: &mut StdRng, p: f32) -> bool {
    let p = f64::from(p);
    if !p.is_finite() || p <= 0.0 {
        return false;
    }
    rng.gen_bool(p.min(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{DataHeader, LinkProperties, SynHeader};

    async fn responder() -> Responder {
        Responder::bind(
            ResponderBuilder::new()
                .bind_addr("127.0.0.1:0".parse().unwrap())
                .seed(7)
                .build(),
        )
        .await
        .unwrap()
    }

    fn sender() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    fn syn(loss_forward: f32, loss_return: f32) -> [u8; 28] {
        let mut link = LinkProperties::new(0.1, 1e6, loss_forward, loss_return);
        link.buffer_size = 15;
        SynHeader::new(0, link).to_bytes()
    }

    #[tokio::test]
    async fn test_syn_acknowledged_with_buffer_size() {
        let mut responder = responder().await;
        let ack = responder.handle_datagram(&syn(0.0, 0.0), sender()).unwrap();

        assert_eq!(ack.ack_seq, 0);
        assert!(ack.flags.is_ack());
        assert!(ack.flags.is_syn());
        assert_eq!(ack.recv_window, 15);
        assert!(responder.session(&sender()).is_some());
        assert_eq!(responder.stats().syns, 1);
    }

    #[tokio::test]
    async fn test_fixed_recv_window() {
        let mut responder = Responder::bind(
            ResponderBuilder::new()
                .bind_addr("127.0.0.1:0".parse().unwrap())
                .recv_window(4)
                .build(),
        )
        .await
        .unwrap();
        let ack = responder.handle_datagram(&syn(0.0, 0.0), sender()).unwrap();
        assert_eq!(ack.recv_window, 4);
    }

    #[tokio::test]
    async fn test_data_then_fin_closes_session() {
        let mut responder = responder().await;
        responder.handle_datagram(&syn(0.0, 0.0), sender());

        let mut data = DataHeader::data(0).to_bytes().to_vec();
        data.extend_from_slice(&[0xAB; 100]);
        assert_eq!(responder.handle_datagram(&data, sender()), None);
        assert_eq!(responder.session(&sender()).unwrap().data_bytes, 100);

        let ack = responder
            .handle_datagram(&DataHeader::fin(0).to_bytes(), sender())
            .unwrap();
        assert!(ack.flags.is_fin());
        assert_eq!(ack.recv_window, 15);
        assert!(responder.session(&sender()).is_none());

        let stats = responder.stats();
        assert_eq!(stats.data_packets, 1);
        assert_eq!(stats.sessions_closed, 1);
    }

    #[tokio::test]
    async fn test_repeated_fin_reacknowledged() {
        let mut responder = responder().await;
        responder.handle_datagram(&syn(0.0, 0.0), sender());
        let fin = DataHeader::fin(0).to_bytes();

        assert!(responder.handle_datagram(&fin, sender()).is_some());
        assert!(responder.handle_datagram(&fin, sender()).is_some());
        assert_eq!(responder.stats().fins, 2);
        assert_eq!(responder.stats().sessions_closed, 1);
    }

    #[tokio::test]
    async fn test_forward_loss_drops_syn() {
        let mut responder = responder().await;
        assert_eq!(responder.handle_datagram(&syn(1.0, 0.0), sender()), None);
        assert_eq!(responder.stats().dropped_forward, 1);
        assert!(responder.session(&sender()).is_none());
    }

    #[tokio::test]
    async fn test_return_loss_drops_ack() {
        let mut responder = responder().await;
        assert_eq!(responder.handle_datagram(&syn(0.0, 1.0), sender()), None);
        assert_eq!(responder.stats().dropped_return, 1);
        assert!(responder.session(&sender()).is_some());
    }

    #[tokio::test]
    async fn test_garbage_ignored() {
        let mut responder = responder().await;
        assert_eq!(responder.handle_datagram(&[1, 2, 3], sender()), None);
        assert_eq!(
            responder.handle_datagram(&DataHeader::data(0).to_bytes(), sender()),
            None
        );
        assert_eq!(responder.stats().ignored, 2);
    }

    #[test]
    fn test_loss_draw_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(!lost(&mut rng, 0.0));
        assert!(!lost(&mut rng, f32::NAN));
        assert!(!lost(&mut rng, -0.5));
        assert!(lost(&mut rng, 1.0));
        assert!(lost(&mut rng, 3.0));
    }
}
