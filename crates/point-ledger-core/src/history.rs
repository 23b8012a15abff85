//! Point history types.
//!
//! Every committed balance change produces exactly one [`PointHistory`]
//! record. Records are immutable once written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{HistoryId, UserId};

/// A history record describing one committed balance change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointHistory {
    /// Store-assigned record id.
    pub id: HistoryId,

    /// The user whose balance changed.
    pub user_id: UserId,

    /// Requested magnitude. Always positive; `kind` carries the direction.
    pub amount: i64,

    /// Direction of the change.
    pub kind: TransactionKind,

    /// Commit instant, equal to the `updated_at` of the balance write.
    pub timestamp: DateTime<Utc>,
}

impl PointHistory {
    /// Signed balance delta of this record.
    #[must_use]
    pub const fn delta(&self) -> i64 {
        self.kind.signed(self.amount)
    }
}

/// Direction of a balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Points deposited.
    Charge,

    /// Points withdrawn.
    Use,
}

impl TransactionKind {
    /// Apply the direction to a positive magnitude.
    #[must_use]
    pub const fn signed(self, amount: i64) -> i64 {
        match self {
            Self::Charge => amount,
            Self::Use => -amount,
        }
    }

    /// Stable uppercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Charge => "CHARGE",
            Self::Use => "USE",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
