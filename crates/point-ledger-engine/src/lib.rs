//! Point ledger engine.
//!
//! This crate provides [`PointLedger`], which owns the business rules of the
//! point ledger:
//!
//! - **Charge**: add points, never exceeding the configured maximum balance
//! - **Use**: withdraw points, never dropping below zero
//! - **Queries**: current balance and history, full or paged
//!
//! # Concurrency
//!
//! Mutations of the same user run one at a time. The critical section covers
//! the balance read, the limit check, the balance write and the history
//! append, so no two mutations ever compute from the same stale balance.
//! Mutations of different users run in parallel.
//!
//! # Example
//!
//! ```
//! use point_ledger_engine::{LedgerConfig, PointLedger};
//!
//! let ledger = PointLedger::in_memory(LedgerConfig::default());
//!
//! ledger.charge(1, 1000).unwrap();
//! ledger.use_points(1, 300).unwrap();
//!
//! assert_eq!(ledger.get_balance(1).unwrap().balance, 700);
//! assert_eq!(ledger.get_history(1).unwrap().len(), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod ledger;
pub mod locks;

pub use config::LedgerConfig;
pub use ledger::{HistoryPage, PointLedger, MAX_PAGE_LIMIT};
pub use locks::UserLockTable;

pub use point_ledger_core::{
    HistoryId, LedgerError, PointHistory, TransactionKind, UserId, UserPoint, MAX_BALANCE,
};
