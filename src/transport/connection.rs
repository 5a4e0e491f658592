//! Connection state for the RDP sender.
//!
//! Tracks the lifecycle phase and everything bound to it: the peer address,
//! the operating RTO, and the sequence number.

use std::net::SocketAddr;
use std::time::Duration;

use super::timing::RtoEstimator;
use crate::core::{RdpError, RdpResult};

/// Connection lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionPhase {
    /// No peer bound; only `open` is allowed.
    #[default]
    Closed,
    /// Handshake acknowledged; `send` and `close` are allowed.
    Open,
}

/// Connection state.
///
/// Invariants:
/// - `Closed` has no peer
/// - `Open` has a peer and a measured RTO
#[derive(Debug, Clone, Default)]
pub struct ConnectionState {
    phase: ConnectionPhase,
    peer: Option<SocketAddr>,
    rto: RtoEstimator,
    seq: u32,
}

impl ConnectionState {
    /// Create a closed connection state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> ConnectionPhase {
        self.phase
    }

    /// Check if the connection is open.
    pub fn is_open(&self) -> bool {
        self.phase == ConnectionPhase::Open
    }

    /// Peer address, present only while open.
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// RTO estimator consulted for every attempt.
    pub fn rto(&self) -> &RtoEstimator {
        &self.rto
    }

    /// Sequence number carried by outgoing packets.
    ///
    /// Set once before the handshake and never advanced.
    pub fn seq(&self) -> u32 {
        self.seq
    }

    /// Fail with `AlreadyConnected` unless closed.
    pub fn ensure_closed(&self) -> RdpResult<()> {
        match self.phase {
            ConnectionPhase::Closed => Ok(()),
            ConnectionPhase::Open => Err(RdpError::AlreadyConnected),
        }
    }

    /// Fail with `NotConnected` unless open; returns the peer.
    pub fn ensure_open(&self) -> RdpResult<SocketAddr> {
        match (self.phase, self.peer) {
            (ConnectionPhase::Open, Some(peer)) => Ok(peer),
            _ => Err(RdpError::NotConnected),
        }
    }

    /// Complete the handshake: bind the peer, derive the RTO, open.
    ///
    /// Returns the derived RTO.
    pub fn complete_handshake(&mut self, peer: SocketAddr, rtt: Duration) -> Duration {
        let rto = self.rto.on_handshake_rtt(rtt);
        self.peer = Some(peer);
        self.phase = ConnectionPhase::Open;
        rto
    }

    /// Complete the teardown: unbind the peer and close.
    ///
    /// The derived RTO is kept so a later reopen starts from it.
    pub fn complete_teardown(&mut self) {
        self.peer = None;
        self.phase = ConnectionPhase::Closed;
    }
}
