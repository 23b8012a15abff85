//! Balance types for the point ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// Upper bound a user's balance may never exceed.
pub const MAX_BALANCE: i64 = 100_000;

/// The current point balance of a user.
///
/// Users that were never written are reported with a zero balance and an
/// `updated_at` at the UNIX epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPoint {
    /// The user this balance belongs to.
    pub user_id: UserId,

    /// Current balance. Never negative.
    pub balance: i64,

    /// When the balance was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl UserPoint {
    /// Zero balance for a user that has never been written.
    #[must_use]
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            balance: 0,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// Check if the balance covers a deduction.
    #[must_use]
    pub fn has_sufficient_points(&self, amount: i64) -> bool {
        self.balance >= amount
    }

    /// Balance after a charge, or `None` if it would exceed `max_balance`.
    #[must_use]
    pub fn charged(&self, amount: i64, max_balance: i64) -> Option<i64> {
        self.balance
            .checked_add(amount)
            .filter(|total| *total <= max_balance)
    }

    /// Balance after a deduction, or `None` if the balance is too low.
    #[must_use]
    pub fn used(&self, amount: i64) -> Option<i64> {
        if self.has_sufficient_points(amount) {
            Some(self.balance - amount)
        } else {
            None
        }
    }
}
