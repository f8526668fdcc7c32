//! # Engine Configuration
//!
//! Tunables for the order engine. Everything here has a sensible default;
//! a bare `EngineConfig::default()` runs the store the way it ran before
//! cashback existed.

use serde::{Deserialize, Serialize};

use lavka_core::{DEFAULT_CASHBACK_RATE_BPS, DEFAULT_SIGNUP_BONUS_POINTS};

/// Configuration for the order engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Cashback credited on fulfillment, in basis points of the order
    /// total (500 = 5%). 0 disables cashback.
    pub cashback_rate_bps: u32,

    /// Loyalty points granted at registration.
    pub signup_bonus_points: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            cashback_rate_bps: DEFAULT_CASHBACK_RATE_BPS,
            signup_bonus_points: DEFAULT_SIGNUP_BONUS_POINTS,
        }
    }
}

impl EngineConfig {
    /// Sets the cashback rate in basis points.
    pub fn cashback_rate_bps(mut self, bps: u32) -> Self {
        self.cashback_rate_bps = bps;
        self
    }

    /// Sets the signup bonus.
    pub fn signup_bonus_points(mut self, points: i64) -> Self {
        self.signup_bonus_points = points.max(0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.cashback_rate_bps, 0);
        assert_eq!(config.signup_bonus_points, 500);
    }

    #[test]
    fn test_builder_clamps_negative_bonus() {
        let config = EngineConfig::default().signup_bonus_points(-10);
        assert_eq!(config.signup_bonus_points, 0);
    }
}
