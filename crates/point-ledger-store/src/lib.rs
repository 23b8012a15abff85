//! Storage layer for the point ledger.
//!
//! The ledger engine talks to two collaborators:
//!
//! - a [`BalanceStore`] mapping each user to its current balance
//! - a [`HistoryStore`] holding the append-only record of every change
//!
//! Both are traits so the engine can be handed any backend. This crate ships
//! in-memory tables for each.
//!
//! # Example
//!
//! ```
//! use point_ledger_core::{TransactionKind, UserId};
//! use point_ledger_store::{BalanceStore, HistoryStore, MemoryBalanceTable, MemoryHistoryTable};
//!
//! let balances = MemoryBalanceTable::new();
//! let history = MemoryHistoryTable::new();
//! let user_id = UserId::new(1).unwrap();
//!
//! let point = balances.insert_or_update(user_id, 500).unwrap();
//! history
//!     .insert(user_id, 500, TransactionKind::Charge, point.updated_at)
//!     .unwrap();
//!
//! assert_eq!(balances.select_by_id(user_id).unwrap().balance, 500);
//! assert_eq!(history.select_all_by_user_id(user_id).unwrap().len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;

pub use error::{Result, StoreError};
pub use memory::{MemoryBalanceTable, MemoryHistoryTable};

use chrono::{DateTime, Utc};
use point_ledger_core::{PointHistory, TransactionKind, UserId, UserPoint};

/// Per-user balance storage.
///
/// Implementations only need single-call atomicity. Serializing
/// read-modify-write sequences for a user is the engine's job.
pub trait BalanceStore: Send + Sync {
    /// Get the balance of a user.
    ///
    /// Users that were never written yield [`UserPoint::empty`].
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn select_by_id(&self, user_id: UserId) -> Result<UserPoint>;

    /// Set the balance of a user, creating the entry if needed.
    ///
    /// Returns the written record. Its `updated_at` is fresh and never earlier
    /// than the previous value for the same user.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn insert_or_update(&self, user_id: UserId, balance: i64) -> Result<UserPoint>;

    /// Put back a record previously returned by [`select_by_id`](Self::select_by_id).
    ///
    /// The record is written as-is, `updated_at` included. Restoring
    /// [`UserPoint::empty`] removes the row, so the user reads as never
    /// written again.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn restore(&self, previous: &UserPoint) -> Result<()>;
}

/// Append-only history storage.
pub trait HistoryStore: Send + Sync {
    /// Append a record and assign it a new unique id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or no id can be assigned.
    fn insert(
        &self,
        user_id: UserId,
        amount: i64,
        kind: TransactionKind,
        timestamp: DateTime<Utc>,
    ) -> Result<PointHistory>;

    /// List every record of a user in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn select_all_by_user_id(&self, user_id: UserId) -> Result<Vec<PointHistory>>;
}
