//! Error types for the RDP sender.

use std::io;

use thiserror::Error;

use crate::transport::TransportError;

/// Top-level sender errors.
///
/// Every public operation reports failure through this type. The connection
/// phase is left untouched on every error path.
#[derive(Debug, Error)]
pub enum RdpError {
    /// Caller-supplied configuration is malformed.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The destination host could not be resolved.
    #[error("target {host} is invalid")]
    NameResolutionFailed {
        /// Host string as supplied by the caller.
        host: String,
    },

    /// `open` called on a connection that is already open.
    #[error("already connected")]
    AlreadyConnected,

    /// `send` or `close` called on a connection that is not open.
    #[error("not connected")]
    NotConnected,

    /// The local UDP socket could not be created.
    #[error("socket setup failed: {0}")]
    Bind(#[source] io::Error),

    /// The request/acknowledge exchange failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl RdpError {
    /// Numeric status code for this error; zero is reserved for success.
    ///
    /// The driver uses these as process exit codes.
    pub fn status_code(&self) -> i32 {
        match self {
            RdpError::AlreadyConnected => 1,
            RdpError::NotConnected => 2,
            RdpError::NameResolutionFailed { .. } => 3,
            RdpError::Transport(TransportError::SendFailed(_)) => 4,
            RdpError::Transport(TransportError::TimedOut { .. }) => 5,
            RdpError::Transport(TransportError::ReceiveFailed(_)) => 6,
            RdpError::InvalidArguments(_) => 7,
            RdpError::Transport(TransportError::AckExpected { .. }) => 8,
            RdpError::Transport(TransportError::UnexpectedSequence { .. }) => 9,
            RdpError::Transport(TransportError::MalformedReply(_)) => 10,
            RdpError::Bind(_) => 11,
        }
    }

    /// Check if repeating the same call may succeed.
    ///
    /// Only a pure timeout qualifies; everything else is either a local
    /// precondition failure or evidence of a confused peer.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RdpError::Transport(e) if e.is_retryable())
    }
}

/// Result type for sender operations.
pub type RdpResult<T> = Result<T, RdpError>;
