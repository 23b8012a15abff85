//! Core types for the point ledger.
//!
//! This crate provides the types shared by the store and engine crates:
//!
//! - **Identifiers**: `UserId`, `HistoryId`
//! - **Balances**: `UserPoint`, `MAX_BALANCE`
//! - **History**: `PointHistory`, `TransactionKind`
//! - **Errors**: `LedgerError`, `IdError`
//!
//! Balances and amounts are plain `i64` points. A balance always stays within
//! `0..=MAX_BALANCE`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod history;
pub mod ids;
pub mod point;

pub use error::{LedgerError, Result};
pub use history::{PointHistory, TransactionKind};
pub use ids::{HistoryId, IdError, UserId};
pub use point::{UserPoint, MAX_BALANCE};
