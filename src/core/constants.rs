//! Protocol constants for the RDP sender.
//!
//! The wire-facing values are fixed by the protocol and MUST NOT be changed.

use std::time::Duration;

// =============================================================================
// ADDRESSING
// =============================================================================

/// Well-known UDP port the receiver listens on.
pub const MAGIC_PORT: u16 = 22345;

// =============================================================================
// PACKET SIZES
// =============================================================================

/// Maximum datagram size (Ethernet MTU minus IPv4 and UDP headers).
pub const MAX_PKT_SIZE: usize = 1500 - 28;

/// Sender data/control header size (seq + flags).
pub const DATA_HEADER_SIZE: usize = 4 + 4;

/// Link properties payload size (rtt + speed + 2 x loss + buffer size).
pub const LINK_PROPERTIES_SIZE: usize = 4 + 4 + 4 + 4 + 4;

/// Handshake header size (data header + link properties).
pub const SYN_HEADER_SIZE: usize = DATA_HEADER_SIZE + LINK_PROPERTIES_SIZE;

/// Receiver acknowledgment header size (ack seq + flags + receive window).
pub const ACK_HEADER_SIZE: usize = 4 + 4 + 4;

/// Largest payload a single `send` can carry.
pub const MAX_PAYLOAD_SIZE: usize = MAX_PKT_SIZE - DATA_HEADER_SIZE;

// =============================================================================
// FLAGS
// =============================================================================

/// Connection establishment request.
pub const FLAG_SYN: u32 = 0x1;

/// Acknowledgment.
pub const FLAG_ACK: u32 = 0x2;

/// Connection termination request.
pub const FLAG_FIN: u32 = 0x4;

// =============================================================================
// RETRANSMISSION POLICY
// =============================================================================

/// Attempts made for the SYN handshake before giving up.
pub const MAX_SYN_ATTEMPTS: u32 = 3;

/// Attempts made for FIN (and any acknowledged data) before giving up.
pub const MAX_DATA_ATTEMPTS: u32 = 5;

/// RTO used for the handshake, before any RTT sample exists.
pub const INITIAL_RTO: Duration = Duration::from_millis(1000);

/// Floor applied to a derived RTO; keeps the wait bound positive.
pub const MIN_RTO: Duration = Duration::from_millis(1);

/// Derived RTO = RTO_MULTIPLIER x handshake RTT.
pub const RTO_MULTIPLIER: u32 = 3;

// =============================================================================
// CONFIGURATION LIMITS
// =============================================================================

/// Largest sender window accepted by configuration validation.
pub const MAX_SENDER_WINDOW: u32 = 1_000_000;
