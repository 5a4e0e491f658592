//! RDP Sender - Responder Library
//!
//! A receiving peer that acknowledges handshakes and teardowns and simulates
//! loss. Used to exercise the sender end to end.

mod responder;
mod session;

pub use responder::*;
pub use session::PeerSession;
