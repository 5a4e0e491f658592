//! Request/acknowledge exchange with bounded retransmission.
//!
//! [`try_send_n`] sends a control packet, waits one RTO for a single reply,
//! and repeats up to a fixed number of attempts. Every outcome is classified:
//!
//! | Outcome | Result |
//! |---------|--------|
//! | send fails | abort, [`TransportError::SendFailed`] |
//! | receive fails | abort, [`TransportError::ReceiveFailed`] |
//! | nothing within RTO | next attempt, or [`TransportError::TimedOut`] |
//! | reply too short / bad flags | abort, [`TransportError::MalformedReply`] |
//! | reply without ACK | abort, [`TransportError::AckExpected`] |
//! | ACK for another seq | abort, [`TransportError::UnexpectedSequence`] |
//! | ACK for our seq | success |
//!
//! A reply that arrives but is wrong is never retried: it means the peer is
//! out of step with us, not that a packet was lost.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use super::error::{TransportError, TransportResult};
use super::header::AckHeader;
use super::timing::RtoEstimator;
use crate::core::DatagramTransport;
use crate::core::constants::MAX_PKT_SIZE;

/// Which control exchange is being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeKind {
    /// SYN handshake.
    Handshake,
    /// FIN teardown.
    Teardown,
}

impl fmt::Display for ExchangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeKind::Handshake => f.write_str("SYN"),
            ExchangeKind::Teardown => f.write_str("FIN"),
        }
    }
}

/// An encoded control packet awaiting acknowledgment.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    /// Exchange being performed.
    pub kind: ExchangeKind,
    /// Sequence number the acknowledgment must echo.
    pub seq: u32,
    /// Encoded packet.
    pub datagram: &'a [u8],
}

impl<'a> Request<'a> {
    /// A SYN handshake request.
    pub fn handshake(seq: u32, datagram: &'a [u8]) -> Self {
        Self {
            kind: ExchangeKind::Handshake,
            seq,
            datagram,
        }
    }

    /// A FIN teardown request.
    pub fn teardown(seq: u32, datagram: &'a [u8]) -> Self {
        Self {
            kind: ExchangeKind::Teardown,
            seq,
            datagram,
        }
    }
}

/// A successful exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acknowledged {
    /// The accepted acknowledgment.
    pub ack: AckHeader,
    /// Where the acknowledgment came from.
    pub from: SocketAddr,
    /// Time from the accepted attempt's send to its acknowledgment.
    pub rtt: Duration,
    /// 1-based attempt that was acknowledged.
    pub attempt: u32,
}

/// Send `request` to `peer` up to `max_attempts` times until it is acknowledged.
///
/// Each attempt waits the estimator's current RTO for exactly one datagram.
/// Attempts are strictly sequential.
pub async fn try_send_n<T: DatagramTransport>(
    transport: &mut T,
    peer: SocketAddr,
    request: &Request<'_>,
    max_attempts: u32,
    rto: &RtoEstimator,
) -> TransportResult<Acknowledged> {
    let mut buf = vec![0u8; MAX_PKT_SIZE];

    for attempt in 1..=max_attempts {
        let timeout = rto.rto();
        debug!(
            kind = %request.kind,
            seq = request.seq,
            attempt,
            max_attempts,
            rto = ?timeout,
            %peer,
            "sending"
        );

        if let Err(e) = transport.send_to(request.datagram, peer).await {
            warn!(kind = %request.kind, error = %e, "failed sendto");
            return Err(TransportError::SendFailed(e));
        }
        let sent_at = Instant::now();

        let (len, from) = match transport.recv_timeout(&mut buf, timeout).await {
            Ok(Some(received)) => received,
            Ok(None) => {
                debug!(kind = %request.kind, attempt, "timed out waiting for ACK");
                continue;
            }
            Err(e) => {
                warn!(kind = %request.kind, error = %e, "failed recvfrom");
                return Err(TransportError::ReceiveFailed(e));
            }
        };
        let rtt = sent_at.elapsed();

        let ack = AckHeader::from_bytes(&buf[..len]).inspect_err(|e| {
            warn!(kind = %request.kind, %from, error = %e, "malformed reply");
        })?;

        if !ack.flags.is_ack() {
            warn!(
                kind = %request.kind,
                %from,
                flags = ack.flags.label(),
                "ACK expected, not received"
            );
            return Err(TransportError::AckExpected { flags: ack.flags });
        }

        if ack.ack_seq != request.seq {
            warn!(
                kind = %request.kind,
                %from,
                expected = request.seq,
                actual = ack.ack_seq,
                "unexpected sequence number returned"
            );
            return Err(TransportError::UnexpectedSequence {
                expected: request.seq,
                actual: ack.ack_seq,
            });
        }

        return Ok(Acknowledged {
            ack,
            from,
            rtt,
            attempt,
        });
    }

    Err(TransportError::TimedOut {
        attempts: max_attempts,
    })
}
