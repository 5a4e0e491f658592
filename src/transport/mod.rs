//! RDP Sender - Transport Layer
//!
//! Everything below the connection state machine:
//!
//! - **Header encoding/decoding**: [`DataHeader`], [`SynHeader`], [`AckHeader`]
//! - **Address resolution**: [`resolve_peer`]
//! - **RTO estimation**: [`RtoEstimator`], seeded once from the handshake
//! - **Retransmission**: [`try_send_n`], the bounded request/acknowledge loop
//! - **Connection state**: [`ConnectionState`] with phase guards
//! - **Async sockets**: [`UdpTransport`] wrapper for tokio UDP
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        SenderSocket (client)            │
//! │     open / send / close                 │
//! ├─────────────────────────────────────────┤
//! │         Transport Layer                 │  ← This module
//! │   headers, RTO, retransmission          │
//! ├─────────────────────────────────────────┤
//! │              UDP                        │
//! └─────────────────────────────────────────┘
//! ```

mod connection;
mod error;
mod header;
mod resolve;
mod retransmit;
mod socket;
mod timing;

pub use connection::*;
pub use error::*;
pub use header::*;
pub use resolve::resolve_peer;
pub use retransmit::{Acknowledged, ExchangeKind, Request, try_send_n};
pub use socket::*;
pub use timing::RtoEstimator;
