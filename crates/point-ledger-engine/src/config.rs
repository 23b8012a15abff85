//! Ledger configuration.

use point_ledger_core::MAX_BALANCE;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the balance cap.
pub const MAX_BALANCE_ENV: &str = "POINT_LEDGER_MAX_BALANCE";

/// Configuration for a [`PointLedger`](crate::PointLedger).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Highest balance a user may hold (default: 100,000).
    pub max_balance: i64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_balance: MAX_BALANCE,
        }
    }
}

impl LedgerConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Missing, unparsable or non-positive values fall back to the default.
    #[must_use]
    pub fn from_env() -> Self {
        let max_balance = std::env::var(MAX_BALANCE_ENV)
            .ok()
            .and_then(|raw| parse_max_balance(&raw))
            .unwrap_or(MAX_BALANCE);

        Self { max_balance }
    }

    /// Set the balance cap.
    #[must_use]
    pub fn with_max_balance(mut self, max_balance: i64) -> Self {
        self.max_balance = max_balance;
        self
    }
}

fn parse_max_balance(raw: &str) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(value) if value > 0 => Some(value),
        Ok(value) => {
            tracing::warn!(value, "{MAX_BALANCE_ENV} must be positive, using default");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "{MAX_BALANCE_ENV} is not an integer, using default");
            None
        }
    }
}
