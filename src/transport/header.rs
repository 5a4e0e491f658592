//! Wire header encoding and decoding.
//!
//! Three fixed-layout headers travel on the wire, all big-endian:
//!
//! ```text
//! DataHeader (8 bytes, sender -> receiver)
//! +------------------+------------------+
//! | Sequence (BE32)  | Flags (BE32)     |
//! +------------------+------------------+
//!
//! SynHeader (28 bytes, sender -> receiver)
//! +--------------+---------+---------+-----------+-----------+-------------+
//! | DataHeader   | RTT f32 | Speed   | Loss fwd  | Loss ret  | Buffer BE32 |
//! +--------------+---------+---------+-----------+-----------+-------------+
//!
//! AckHeader (12 bytes, receiver -> sender)
//! +------------------+------------------+------------------+
//! | Ack seq (BE32)   | Flags (BE32)     | Recv window BE32 |
//! +------------------+------------------+------------------+
//! ```
//!
//! Headers are never reinterpreted from raw memory; every decode checks the
//! buffer length and flag consistency before a typed header is produced.

use thiserror::Error;

use crate::core::constants::{
    ACK_HEADER_SIZE, DATA_HEADER_SIZE, FLAG_ACK, FLAG_FIN, FLAG_SYN, SYN_HEADER_SIZE,
};

/// Errors produced while decoding a header.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// Buffer too short for the header.
    #[error("header too short: expected {expected} bytes, got {actual}")]
    TooShort {
        /// Minimum bytes required.
        expected: usize,
        /// Bytes available.
        actual: usize,
    },

    /// SYN and FIN set together.
    #[error("inconsistent flags: {0:#x}")]
    InconsistentFlags(u32),
}

/// Flag word carried by every header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Flags(u32);

impl Flags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Connection establishment.
    pub const SYN: Self = Self(FLAG_SYN);
    /// Acknowledgment.
    pub const ACK: Self = Self(FLAG_ACK);
    /// Connection termination.
    pub const FIN: Self = Self(FLAG_FIN);

    const KNOWN: u32 = FLAG_SYN | FLAG_ACK | FLAG_FIN;

    /// Create flags from a raw word, dropping reserved bits.
    pub fn from_bits(bits: u32) -> Self {
        Self(bits & Self::KNOWN)
    }

    /// Get the raw word.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Check if SYN is set.
    pub fn is_syn(self) -> bool {
        self.0 & FLAG_SYN != 0
    }

    /// Check if ACK is set.
    pub fn is_ack(self) -> bool {
        self.0 & FLAG_ACK != 0
    }

    /// Check if FIN is set.
    pub fn is_fin(self) -> bool {
        self.0 & FLAG_FIN != 0
    }

    /// Combine with another set of flags.
    pub fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// SYN and FIN are mutually exclusive.
    pub fn is_consistent(self) -> bool {
        !(self.is_syn() && self.is_fin())
    }

    /// Short human-readable label used in logs.
    pub fn label(self) -> &'static str {
        match (self.is_syn(), self.is_fin(), self.is_ack()) {
            (true, _, true) => "SYN-ACK",
            (true, _, false) => "SYN",
            (_, true, true) => "FIN-ACK",
            (_, true, false) => "FIN",
            (_, _, true) => "ACK",
            _ => "DATA",
        }
    }
}

fn check_len(bytes: &[u8], expected: usize) -> Result<(), HeaderError> {
    if bytes.len() < expected {
        return Err(HeaderError::TooShort {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn read_f32(bytes: &[u8], at: usize) -> f32 {
    f32::from_bits(read_u32(bytes, at))
}

fn decode_flags(raw: u32) -> Result<Flags, HeaderError> {
    let flags = Flags::from_bits(raw);
    if !flags.is_consistent() {
        return Err(HeaderError::InconsistentFlags(raw));
    }
    Ok(flags)
}

/// Link and window parameters negotiated by the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LinkProperties {
    /// Round-trip propagation delay estimate, in seconds.
    pub rtt: f32,
    /// Bottleneck link speed, in bits per second.
    pub speed: f32,
    /// Loss probabilities: `[forward, return]`.
    pub loss: [f32; 2],
    /// Receiver buffer size requested by the sender, in packets.
    pub buffer_size: u32,
}

impl LinkProperties {
    /// Create link properties with no buffer size set yet.
    pub fn new(rtt: f32, speed: f32, loss_forward: f32, loss_return: f32) -> Self {
        Self {
            rtt,
            speed,
            loss: [loss_forward, loss_return],
            buffer_size: 0,
        }
    }

    /// Forward-path (sender to receiver) loss probability.
    pub fn loss_forward(&self) -> f32 {
        self.loss[0]
    }

    /// Return-path (receiver to sender) loss probability.
    pub fn loss_return(&self) -> f32 {
        self.loss[1]
    }
}

/// Sender data/control header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataHeader {
    /// Sequence number.
    pub seq: u32,
    /// Flags (SYN, FIN or none).
    pub flags: Flags,
}

impl DataHeader {
    /// Header for a data packet.
    pub fn data(seq: u32) -> Self {
        Self {
            seq,
            flags: Flags::NONE,
        }
    }

    /// Header for a connection termination packet.
    pub fn fin(seq: u32) -> Self {
        Self {
            seq,
            flags: Flags::FIN,
        }
    }

    /// Serialize to 8 bytes.
    pub fn to_bytes(&self) -> [u8; DATA_HEADER_SIZE] {
        let mut buf = [0u8; DATA_HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.seq.to_be_bytes());
        buf[4..8].copy_from_slice(&self.flags.bits().to_be_bytes());
        buf
    }

    /// Parse from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HeaderError> {
        check_len(bytes, DATA_HEADER_SIZE)?;
        Ok(Self {
            seq: read_u32(bytes, 0),
            flags: decode_flags(read_u32(bytes, 4))?,
        })
    }
}

/// Handshake header: a SYN data header followed by link properties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynHeader {
    /// Control header with SYN set.
    pub header: DataHeader,
    /// Negotiated link properties.
    pub link: LinkProperties,
}

impl SynHeader {
    /// Create a handshake header.
    pub fn new(seq: u32, link: LinkProperties) -> Self {
        Self {
            header: DataHeader {
                seq,
                flags: Flags::SYN,
            },
            link,
        }
    }

    /// Serialize to 28 bytes.
    pub fn to_bytes(&self) -> [u8; SYN_HEADER_SIZE] {
        let mut buf = [0u8; SYN_HEADER_SIZE];
        buf[0..8].copy_from_slice(&self.header.to_bytes());
        buf[8..12].copy_from_slice(&self.link.rtt.to_bits().to_be_bytes());
        buf[12..16].copy_from_slice(&self.link.speed.to_bits().to_be_bytes());
        buf[16..20].copy_from_slice(&self.link.loss[0].to_bits().to_be_bytes());
        buf[20..24].copy_from_slice(&self.link.loss[1].to_bits().to_be_bytes());
        buf[24..28].copy_from_slice(&self.link.buffer_size.to_be_bytes());
        buf
    }

    /// Parse from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HeaderError> {
        check_len(bytes, SYN_HEADER_SIZE)?;
        let header = DataHeader::from_bytes(bytes)?;
        Ok(Self {
            header,
            link: LinkProperties {
                rtt: read_f32(bytes, 8),
                speed: read_f32(bytes, 12),
                loss: [read_f32(bytes, 16), read_f32(bytes, 20)],
                buffer_size: read_u32(bytes, 24),
            },
        })
    }
}

/// Receiver acknowledgment header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckHeader {
    /// Sequence number being acknowledged.
    pub ack_seq: u32,
    /// Flags (ACK, possibly with SYN or FIN).
    pub flags: Flags,
    /// Advertised receive window, in packets.
    pub recv_window: u32,
}

impl AckHeader {
    /// Create an acknowledgment for `ack_seq`.
    pub fn new(ack_seq: u32, recv_window: u32) -> Self {
        Self {
            ack_seq,
            flags: Flags::ACK,
            recv_window,
        }
    }

    /// Serialize to 12 bytes.
    pub fn to_bytes(&self) -> [u8; ACK_HEADER_SIZE] {
        let mut buf = [0u8; ACK_HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.ack_seq.to_be_bytes());
        buf[4..8].copy_from_slice(&self.flags.bits().to_be_bytes());
        buf[8..12].copy_from_slice(&self.recv_window.to_be_bytes());
        buf
    }

    /// Parse from bytes.
    ///
    /// Only the length is checked. The flag word is taken as is, so the
    /// caller decides what a reply without ACK means.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HeaderError> {
        check_len(bytes, ACK_HEADER_SIZE)?;
        Ok(Self {
            ack_seq: read_u32(bytes, 0),
            flags: Flags::from_bits(read_u32(bytes, 4)),
            recv_window: read_u32(bytes, 8),
        })
    }
}

/// A decoded sender-to-receiver datagram, classified by its flags.
#[derive(Debug, Clone, PartialEq)]
pub enum SenderPacket<'a> {
    /// Connection establishment with link properties.
    Syn(SynHeader),
    /// Connection termination.
    Fin(DataHeader),
    /// Data segment.
    Data {
        /// Segment header.
        header: DataHeader,
        /// Bytes following the header.
        payload: &'a [u8],
    },
}

impl<'a> SenderPacket<'a> {
    /// Classify and decode a datagram sent by a sender.
    pub fn decode(bytes: &'a [u8]) -> Result<Self, HeaderError> {
        let header = DataHeader::from_bytes(bytes)?;
        if header.flags.is_syn() {
            SynHeader::from_bytes(bytes).map(SenderPacket::Syn)
        } else if header.flags.is_fin() {
            Ok(SenderPacket::Fin(header))
        } else {
            Ok(SenderPacket::Data {
                header,
                payload: &bytes[DATA_HEADER_SIZE..],
            })
        }
    }

    /// Sequence number of the packet.
    pub fn seq(&self) -> u32 {
        match self {
            SenderPacket::Syn(syn) => syn.header.seq,
            SenderPacket::Fin(header) | SenderPacket::Data { header, .. } => header.seq,
        }
    }
}
