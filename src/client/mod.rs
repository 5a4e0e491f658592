//! RDP Sender - Client Library
//!
//! The connection state machine: open, send, close.

mod sender;

pub use sender::*;
