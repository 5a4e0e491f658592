//! Retransmission timeout estimation.
//!
//! The RTO starts at a fixed seed and is derived exactly once, from the round
//! trip of the accepted handshake attempt. There is no smoothing and no
//! backoff: every attempt of every later exchange waits the same RTO.

use std::time::Duration;

use crate::core::constants::{INITIAL_RTO, MIN_RTO, RTO_MULTIPLIER};

/// RTO estimator seeded once from the handshake round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtoEstimator {
    /// Current retransmission timeout.
    rto: Duration,
}

impl Default for RtoEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl RtoEstimator {
    /// Create an estimator holding the initial RTO.
    pub fn new() -> Self {
        Self::with_initial(INITIAL_RTO)
    }

    /// Create an estimator with a custom seed.
    ///
    /// A zero seed is raised to the minimum RTO.
    pub fn with_initial(rto: Duration) -> Self {
        Self {
            rto: rto.max(MIN_RTO),
        }
    }

    /// Record the handshake round trip and derive the operating RTO.
    ///
    /// RTO = 3 x sample, floored at [`MIN_RTO`]. Returns the new RTO.
    pub fn on_handshake_rtt(&mut self, sample: Duration) -> Duration {
        self.rto = sample.saturating_mul(RTO_MULTIPLIER).max(MIN_RTO);
        self.rto
    }

    /// Get the current retransmission timeout.
    pub fn rto(&self) -> Duration {
        self.rto
    }
}
