//! # RDP Sender
//!
//! **R**eliable **D**atagram **P**rotocol, sender side.
//!
//! RDP layers a connection lifecycle over plain UDP datagrams:
//!
//! - **Handshake**: a SYN carrying the link properties, retried until ACKed
//! - **Adaptive timeout**: the RTO becomes 3x the handshake round trip
//! - **Data**: header-prefixed segments, sent without acknowledgment
//! - **Teardown**: a FIN, retried with the derived RTO until ACKed
//!
//! Every acknowledgment must echo the request's sequence number. A reply that
//! arrives but is wrong ends the exchange immediately; only silence is retried.
//!
//! ## Feature Flags
//!
//! - `client` (default): [`SenderSocket`] state machine
//! - `server` (default): loss-simulating [`server::Responder`]
//!
//! ## Modules
//!
//! - [`core`]: Constants, configuration, errors, and the transport trait
//! - [`transport`]: Headers, RTO estimation, retransmission, UDP sockets
//! - [`client`]: The sender state machine (requires `client` feature)
//! - [`server`]: A receiving peer for testing (requires `server` feature)
//!
//! ## Example Usage
//!
//! ```no_run
//! use rdp_sender::prelude::*;
//!
//! # async fn run() -> Result<(), RdpError> {
//! let config = SenderConfigBuilder::new()
//!     .destination("127.0.0.1")
//!     .window(10)
//!     .rtt(0.1)
//!     .speed(1e6)
//!     .loss(0.0, 0.0)
//!     .build()?;
//!
//! let mut socket = SenderSocket::bind().await?;
//! socket.open_config(&config).await?;
//! println!("connected, RTO {:?}", socket.rto());
//!
//! socket.send(b"hello").await?;
//! socket.close().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included)
pub mod core;

// Transport layer (always included)
pub mod transport;

// Client API (feature-gated)
#[cfg(feature = "client")]
#[cfg_attr(docsrs, doc(cfg(feature = "client")))]
pub mod client;

// Server API (feature-gated)
#[cfg(feature = "server")]
#[cfg_attr(docsrs, doc(cfg(feature = "server")))]
pub mod server;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::constants::{MAGIC_PORT, MAX_PAYLOAD_SIZE, MAX_PKT_SIZE};
    pub use crate::core::*;

    pub use crate::transport::{
        AckHeader, ConnectionPhase, DataHeader, Flags, LinkProperties, RtoEstimator,
        SynHeader, TransportError, UdpTransport,
    };

    #[cfg(feature = "client")]
    pub use crate::client::SenderSocket;
}

// Re-export commonly used items at crate root
pub use self::core::{DatagramTransport, RdpError, RdpResult, SenderConfig, SenderConfigBuilder};

pub use self::transport::{ConnectionPhase, LinkProperties, TransportError, UdpTransport};

#[cfg(feature = "client")]
pub use self::client::SenderSocket;
