//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use rdp_sender::DatagramTransport;
use rdp_sender::transport::{AckHeader, Flags, SenderPacket};

/// How the scripted peer answers one outgoing datagram.
#[derive(Debug, Clone)]
pub enum Reply {
    /// No answer; the receive times out.
    Silence,
    /// Answer with `bytes` after `delay`, or time out if `delay` is too long.
    After(Duration, Vec<u8>),
    /// The receive itself fails.
    Fail,
}

impl Reply {
    /// A well-formed ACK for `seq` after `delay`.
    pub fn ack(delay: Duration, seq: u32) -> Self {
        Self::After(delay, AckHeader::new(seq, 16).to_bytes().to_vec())
    }

    /// A SYN-ACK for `seq` after `delay`.
    pub fn syn_ack(delay: Duration, seq: u32) -> Self {
        let mut ack = AckHeader::new(seq, 16);
        ack.flags = ack.flags.with(Flags::SYN);
        Self::After(delay, ack.to_bytes().to_vec())
    }
}

/// In-memory transport driven by a script of replies.
///
/// Each `recv_timeout` consumes one scripted reply. Data segments are never
/// followed by a receive, so they consume nothing.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: VecDeque<Reply>,
    /// Every datagram handed to `send_to`, in order.
    pub sent: Vec<(Vec<u8>, SocketAddr)>,
    /// Number of datagrams accepted before every `send_to` fails.
    pub fail_send_after: Option<usize>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: replies.into(),
            sent: Vec::new(),
            fail_send_after: None,
        }
    }

    /// Accept `count` datagrams, then fail every later send.
    pub fn failing_after(mut self, count: usize) -> Self {
        self.fail_send_after = Some(count);
        self
    }

    /// Decoded packets sent so far.
    pub fn packets(&self) -> Vec<SenderPacket<'_>> {
        self.sent
            .iter()
            .map(|(bytes, _)| SenderPacket::decode(bytes).unwrap())
            .collect()
    }

    pub fn syn_count(&self) -> usize {
        self.packets()
            .iter()
            .filter(|p| matches!(p, SenderPacket::Syn(_)))
            .count()
    }

    pub fn fin_count(&self) -> usize {
        self.packets()
            .iter()
            .filter(|p| matches!(p, SenderPacket::Fin(_)))
            .count()
    }
}

impl DatagramTransport for ScriptedTransport {
    async fn send_to(&mut self, datagram: &[u8], peer: SocketAddr) -> io::Result<usize> {
        if self.fail_send_after.is_some_and(|n| self.sent.len() >= n) {
            return Err(io::Error::other("network unreachable"));
        }
        self.sent.push((datagram.to_vec(), peer));
        Ok(datagram.len())
    }

    async fn recv_timeout(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> io::Result<Option<(usize, SocketAddr)>> {
        match self.replies.pop_front().unwrap_or(Reply::Silence) {
            Reply::After(delay, bytes) if delay < timeout => {
                tokio::time::sleep(delay).await;
                buf[..bytes.len()].copy_from_slice(&bytes);
                Ok(Some((bytes.len(), receiver())))
            }
            Reply::Silence | Reply::After(..) => {
                tokio::time::sleep(timeout).await;
                Ok(None)
            }
            Reply::Fail => Err(io::Error::other("connection refused")),
        }
    }
}

/// Address the scripted peer claims to answer from.
pub fn receiver() -> SocketAddr {
    "127.0.0.1:22345".parse().unwrap()
}

/// The paused clock advances in whole-millisecond timer ticks.
pub fn assert_near(actual: Duration, expected: Duration, slack: Duration) {
    assert!(
        actual >= expected && actual <= expected + slack,
        "{actual:?} not within {slack:?} of {expected:?}"
    );
}
