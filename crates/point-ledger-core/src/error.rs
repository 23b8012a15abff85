//! Error types for the point ledger.

use crate::ids::IdError;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur in ledger operations.
///
/// Every variant except `Storage` is a deterministic rule violation detected
/// before any store is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The user id is below 1.
    #[error("invalid user: {user_id}")]
    InvalidUser {
        /// The rejected id.
        user_id: i64,
    },

    /// The amount is below 1.
    #[error("invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount.
        amount: i64,
    },

    /// A charge would push the balance above the configured maximum.
    #[error("balance limit exceeded: balance={balance}, amount={amount}, max={max}")]
    BalanceLimitExceeded {
        /// Balance before the charge.
        balance: i64,
        /// Requested charge.
        amount: i64,
        /// Configured maximum balance.
        max: i64,
    },

    /// A use would drive the balance below zero.
    #[error("insufficient balance: balance={balance}, required={required}")]
    InsufficientBalance {
        /// Balance before the use.
        balance: i64,
        /// Requested amount.
        required: i64,
    },

    /// A store collaborator failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidUser { .. } => "invalid_user",
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::BalanceLimitExceeded { .. } => "balance_limit_exceeded",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::Storage(_) => "storage",
        }
    }

    /// Whether the error is a caller-input or business-rule violation.
    #[must_use]
    pub const fn is_rule_violation(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

impl From<IdError> for LedgerError {
    fn from(err: IdError) -> Self {
        let IdError::NotPositive(user_id) = err;
        Self::InvalidUser { user_id }
    }
}
