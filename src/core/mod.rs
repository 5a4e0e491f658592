//! Core types for the RDP sender.
//!
//! Constants, configuration, the error taxonomy, and the transport trait.
//! Always included.

pub mod config;
pub mod constants;
pub mod error;
pub mod traits;

pub use config::{SenderConfig, SenderConfigBuilder};
pub use error::{RdpError, RdpResult};
pub use traits::DatagramTransport;
