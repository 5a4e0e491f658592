//! Sender configuration.
//!
//! Everything the sender needs from its caller: where to connect, the window
//! to request, and the link properties to advertise in the handshake.

use crate::core::constants::{MAGIC_PORT, MAX_SENDER_WINDOW};
use crate::core::error::{RdpError, RdpResult};
use crate::transport::LinkProperties;

/// Sender configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SenderConfig {
    /// Destination host: dotted-quad or hostname.
    pub destination: String,

    /// Destination UDP port.
    pub port: u16,

    /// Sender window size, in packets.
    pub window: u32,

    /// Link properties advertised in the handshake.
    pub link: LinkProperties,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            destination: "127.0.0.1".to_string(),
            port: MAGIC_PORT,
            window: 1,
            link: LinkProperties::default(),
        }
    }
}

impl SenderConfig {
    /// Check the configuration for values the protocol cannot carry.
    pub fn validate(&self) -> RdpResult<()> {
        if self.destination.trim().is_empty() {
            return Err(invalid("destination must not be empty"));
        }

        if self.window == 0 || self.window > MAX_SENDER_WINDOW {
            return Err(invalid(format!(
                "window must be in 1..={MAX_SENDER_WINDOW}, got {}",
                self.window
            )));
        }

        let link = &self.link;
        if !link.rtt.is_finite() || link.rtt < 0.0 {
            return Err(invalid(format!("rtt must be a non-negative number, got {}", link.rtt)));
        }
        if !link.speed.is_finite() || link.speed <= 0.0 {
            return Err(invalid(format!("link speed must be positive, got {}", link.speed)));
        }
        for (direction, p) in [("forward", link.loss[0]), ("return", link.loss[1])] {
            if !p.is_finite() || !(0.0..1.0).contains(&p) {
                return Err(invalid(format!(
                    "{direction} loss probability must be in [0, 1), got {p}"
                )));
            }
        }

        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> RdpError {
    RdpError::InvalidArguments(msg.into())
}

/// Builder for creating a [`SenderConfig`].
#[derive(Debug, Default)]
pub struct SenderConfigBuilder {
    config: SenderConfig,
}

impl SenderConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the destination host.
    pub fn destination(mut self, host: impl Into<String>) -> Self {
        self.config.destination = host.into();
        self
    }

    /// Set the destination port.
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the sender window.
    pub fn window(mut self, window: u32) -> Self {
        self.config.window = window;
        self
    }

    /// Set the round-trip propagation delay estimate, in seconds.
    pub fn rtt(mut self, seconds: f32) -> Self {
        self.config.link.rtt = seconds;
        self
    }

    /// Set the bottleneck link speed, in bits per second.
    pub fn speed(mut self, bits_per_second: f32) -> Self {
        self.config.link.speed = bits_per_second;
        self
    }

    /// Set forward and return loss probabilities.
    pub fn loss(mut self, forward: f32, ret: f32) -> Self {
        self.config.link.loss = [forward, ret];
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> RdpResult<SenderConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> SenderConfigBuilder {
        SenderConfigBuilder::new()
            .destination("192.0.2.1")
            .window(10)
            .rtt(0.2)
            .speed(1e6)
            .loss(0.1, 0.05)
    }

    #[test]
    fn test_builder_valid() {
        let config = valid().build().unwrap();
        assert_eq!(config.destination, "192.0.2.1");
        assert_eq!(config.port, MAGIC_PORT);
        assert_eq!(config.window, 10);
        assert_eq!(config.link.loss, [0.1, 0.05]);
        assert_eq!(config.link.buffer_size, 0);
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = valid().window(0).build().unwrap_err();
        assert!(matches!(err, RdpError::InvalidArguments(_)));
    }

    #[test]
    fn test_window_upper_bound() {
        assert!(valid().window(MAX_SENDER_WINDOW).build().is_ok());
        assert!(valid().window(MAX_SENDER_WINDOW + 1).build().is_err());
    }

    #[test]
    fn test_loss_out_of_range() {
        assert!(valid().loss(1.0, 0.0).build().is_err());
        assert!(valid().loss(0.0, -0.1).build().is_err());
        assert!(valid().loss(f32::NAN, 0.0).build().is_err());
    }

    #[test]
    fn test_bad_link_values() {
        assert!(valid().rtt(-1.0).build().is_err());
        assert!(valid().rtt(f32::INFINITY).build().is_err());
        assert!(valid().speed(0.0).build().is_err());
    }

    #[test]
    fn test_empty_destination() {
        let err = valid().destination("  ").build().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid arguments: destination must not be empty"
        );
    }
}
