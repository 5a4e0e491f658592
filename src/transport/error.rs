//! Transport layer error types.
//!
//! These are the outcomes of a request/acknowledge exchange that are not a
//! matching acknowledgment. Only [`TransportError::TimedOut`] means "nothing
//! came back"; every other variant means something went wrong locally or the
//! peer answered with something the sender cannot accept.

use std::io;

use thiserror::Error;

use super::header::{Flags, HeaderError};

/// Transport layer errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The socket refused to send the datagram.
    #[error("send failed: {0}")]
    SendFailed(#[source] io::Error),

    /// The socket failed while waiting for or reading a reply.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] io::Error),

    /// A reply arrived without the ACK flag.
    #[error("ACK expected, not received (flags {:#x})", .flags.bits())]
    AckExpected {
        /// Flags carried by the reply.
        flags: Flags,
    },

    /// A reply acknowledged a different sequence number.
    #[error("unexpected sequence number returned: expected {expected}, got {actual}")]
    UnexpectedSequence {
        /// Sequence number of the request.
        expected: u32,
        /// Sequence number in the reply.
        actual: u32,
    },

    /// Every attempt elapsed without any reply.
    #[error("timed out after {attempts} attempts")]
    TimedOut {
        /// Number of attempts made.
        attempts: u32,
    },

    /// A reply arrived that does not decode as an acknowledgment header.
    #[error("malformed reply: {0}")]
    MalformedReply(#[from] HeaderError),
}

impl TransportError {
    /// Check if the exchange may succeed when repeated by the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::TimedOut { .. })
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_timeout_retryable() {
        assert!(TransportError::TimedOut { attempts: 3 }.is_retryable());

        assert!(!TransportError::AckExpected { flags: Flags::NONE }.is_retryable());
        assert!(
            !TransportError::UnexpectedSequence {
                expected: 0,
                actual: 1
            }
            .is_retryable()
        );
        assert!(!TransportError::SendFailed(io::Error::other("test")).is_retryable());
    }
}
