//! The ledger engine.
//!
//! `PointLedger` validates requests, serializes mutations per user, and
//! commits the balance write together with its history record.

use std::sync::Arc;

use serde::Serialize;

use point_ledger_core::{
    LedgerError, PointHistory, Result, TransactionKind, UserId, UserPoint,
};
use point_ledger_store::{BalanceStore, HistoryStore, MemoryBalanceTable, MemoryHistoryTable};

use crate::config::LedgerConfig;
use crate::locks::UserLockTable;

/// Largest page `get_history_page` returns.
pub const MAX_PAGE_LIMIT: usize = 100;

/// One page of a user's history, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryPage {
    /// Records on this page.
    pub records: Vec<PointHistory>,
    /// Whether older records exist past this page.
    pub has_more: bool,
    /// Total records for the user.
    pub total: usize,
}

/// Per-user point ledger.
///
/// Share it behind an `Arc`; every method takes `&self`.
pub struct PointLedger {
    balances: Arc<dyn BalanceStore>,
    history: Arc<dyn HistoryStore>,
    locks: UserLockTable,
    config: LedgerConfig,
}

impl PointLedger {
    /// Create a ledger over the given stores.
    #[must_use]
    pub fn new(
        balances: Arc<dyn BalanceStore>,
        history: Arc<dyn HistoryStore>,
        config: LedgerConfig,
    ) -> Self {
        tracing::info!(max_balance = config.max_balance, "Point ledger initialized");

        Self {
            balances,
            history,
            locks: UserLockTable::new(),
            config,
        }
    }

    /// Create a ledger backed by fresh in-memory tables.
    #[must_use]
    pub fn in_memory(config: LedgerConfig) -> Self {
        Self::new(
            Arc::new(MemoryBalanceTable::new()),
            Arc::new(MemoryHistoryTable::new()),
            config,
        )
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// The per-user lock table.
    #[must_use]
    pub fn locks(&self) -> &UserLockTable {
        &self.locks
    }

    /// Get the current balance of a user.
    ///
    /// Waits for an in-flight mutation of the same user, so only committed
    /// balances are returned.
    ///
    /// # Errors
    ///
    /// - `LedgerError::InvalidUser` if `user_id < 1`.
    /// - `LedgerError::Storage` if the balance store fails.
    pub fn get_balance(&self, user_id: i64) -> Result<UserPoint> {
        let user_id = UserId::new(user_id)?;
        let point = self
            .locks
            .with_user(user_id, || self.balances.select_by_id(user_id))?;

        tracing::debug!(user_id = %user_id, balance = point.balance, "Balance read");

        Ok(point)
    }

    /// Get every history record of a user in commit order.
    ///
    /// # Errors
    ///
    /// - `LedgerError::InvalidUser` if `user_id < 1`.
    /// - `LedgerError::Storage` if the history store fails.
    pub fn get_history(&self, user_id: i64) -> Result<Vec<PointHistory>> {
        let user_id = UserId::new(user_id)?;
        let records = self.history.select_all_by_user_id(user_id)?;

        tracing::debug!(user_id = %user_id, count = records.len(), "History read");

        Ok(records)
    }

    /// Get a page of a user's history, newest first.
    ///
    /// `limit` is capped at [`MAX_PAGE_LIMIT`].
    ///
    /// # Errors
    ///
    /// - `LedgerError::InvalidUser` if `user_id < 1`.
    /// - `LedgerError::Storage` if the history store fails.
    pub fn get_history_page(
        &self,
        user_id: i64,
        limit: usize,
        offset: usize,
    ) -> Result<HistoryPage> {
        let all = self.get_history(user_id)?;
        let total = all.len();
        let limit = limit.min(MAX_PAGE_LIMIT);

        let records: Vec<_> = all.into_iter().rev().skip(offset).take(limit).collect();
        let has_more = offset.saturating_add(records.len()) < total;

        Ok(HistoryPage {
            records,
            has_more,
            total,
        })
    }

    /// Deposit points.
    ///
    /// Returns the balance as written.
    ///
    /// # Errors
    ///
    /// - `LedgerError::InvalidUser` if `user_id < 1`.
    /// - `LedgerError::InvalidAmount` if `amount < 1`.
    /// - `LedgerError::BalanceLimitExceeded` if the new balance would exceed
    ///   the configured maximum.
    /// - `LedgerError::Storage` if a store fails.
    pub fn charge(&self, user_id: i64, amount: i64) -> Result<UserPoint> {
        let user_id = UserId::new(user_id)?;
        let amount = validate_amount(amount)?;
        let max = self.config.max_balance;

        self.locks.with_user(user_id, || -> Result<UserPoint> {
            let current = self.balances.select_by_id(user_id)?;

            let Some(new_balance) = current.charged(amount, max) else {
                tracing::warn!(
                    user_id = %user_id,
                    balance = current.balance,
                    amount,
                    max,
                    "Charge rejected: balance limit exceeded"
                );
                return Err(LedgerError::BalanceLimitExceeded {
                    balance: current.balance,
                    amount,
                    max,
                });
            };

            let point = self.commit(&current, new_balance, amount, TransactionKind::Charge)?;

            tracing::info!(
                user_id = %user_id,
                amount,
                balance = point.balance,
                "Points charged"
            );

            Ok(point)
        })
    }

    /// Withdraw points.
    ///
    /// Returns the balance as written.
    ///
    /// # Errors
    ///
    /// - `LedgerError::InvalidUser` if `user_id < 1`.
    /// - `LedgerError::InvalidAmount` if `amount < 1`.
    /// - `LedgerError::InsufficientBalance` if `amount` exceeds the balance.
    /// - `LedgerError::Storage` if a store fails.
    pub fn use_points(&self, user_id: i64, amount: i64) -> Result<UserPoint> {
        let user_id = UserId::new(user_id)?;
        let amount = validate_amount(amount)?;

        self.locks.with_user(user_id, || -> Result<UserPoint> {
            let current = self.balances.select_by_id(user_id)?;

            let Some(new_balance) = current.used(amount) else {
                tracing::warn!(
                    user_id = %user_id,
                    balance = current.balance,
                    amount,
                    "Use rejected: insufficient balance"
                );
                return Err(LedgerError::InsufficientBalance {
                    balance: current.balance,
                    required: amount,
                });
            };

            let point = self.commit(&current, new_balance, amount, TransactionKind::Use)?;

            tracing::info!(
                user_id = %user_id,
                amount,
                balance = point.balance,
                "Points used"
            );

            Ok(point)
        })
    }

    /// Write the new balance and append its record. Caller holds the user lock.
    ///
    /// The record is stamped with the balance's `updated_at`. If the append
    /// fails the previous record is restored unchanged, `updated_at` included.
    fn commit(
        &self,
        current: &UserPoint,
        new_balance: i64,
        amount: i64,
        kind: TransactionKind,
    ) -> Result<UserPoint> {
        let user_id = current.user_id;
        let written = self.balances.insert_or_update(user_id, new_balance)?;

        if let Err(e) = self.history.insert(user_id, amount, kind, written.updated_at) {
            tracing::error!(
                user_id = %user_id,
                %kind,
                amount,
                error = %e,
                "History append failed, restoring previous balance"
            );

            if let Err(restore_err) = self.balances.restore(current) {
                tracing::error!(
                    user_id = %user_id,
                    balance = current.balance,
                    error = %restore_err,
                    "Failed to restore balance"
                );
            }

            return Err(e.into());
        }

        Ok(written)
    }
}

fn validate_amount(amount: i64) -> Result<i64> {
    if amount < 1 {
        return Err(LedgerError::InvalidAmount { amount });
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> PointLedger {
        PointLedger::in_memory(LedgerConfig::default())
    }

    #[test]
    fn new_user_has_zero_balance() {
        let point = ledger().get_balance(1).unwrap();
        assert_eq!(point.balance, 0);
        assert_eq!(point.user_id.get(), 1);
    }

    #[test]
    fn charge_adds_and_records() {
        let ledger = ledger();

        let point = ledger.charge(1, 1000).unwrap();
        assert_eq!(point.balance, 1000);

        let history = ledger.get_history(1).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, TransactionKind::Charge);
        assert_eq!(history[0].amount, 1000);
        assert_eq!(history[0].timestamp, point.updated_at);
    }

    #[test]
    fn charge_over_cap_is_rejected() {
        let ledger = ledger();
        ledger.charge(1, 1000).unwrap();

        let err = ledger.charge(1, 100_000).unwrap_err();
        assert_eq!(
            err,
            LedgerError::BalanceLimitExceeded {
                balance: 1000,
                amount: 100_000,
                max: 100_000,
            }
        );
        assert_eq!(ledger.get_balance(1).unwrap().balance, 1000);
        assert_eq!(ledger.get_history(1).unwrap().len(), 1);
    }

    #[test]
    fn charge_up_to_cap_is_allowed() {
        let ledger = ledger();
        assert_eq!(ledger.charge(1, 100_000).unwrap().balance, 100_000);
        assert!(matches!(
            ledger.charge(1, 1),
            Err(LedgerError::BalanceLimitExceeded { .. })
        ));
    }

    #[test]
    fn charge_near_i64_max_does_not_overflow() {
        let ledger = PointLedger::in_memory(LedgerConfig::new().with_max_balance(i64::MAX));
        ledger.charge(1, i64::MAX).unwrap();

        assert!(matches!(
            ledger.charge(1, 1),
            Err(LedgerError::BalanceLimitExceeded { .. })
        ));
    }

    #[test]
    fn use_subtracts_and_records() {
        let ledger = ledger();
        ledger.charge(1, 1000).unwrap();

        let point = ledger.use_points(1, 1000).unwrap();
        assert_eq!(point.balance, 0);

        let history = ledger.get_history(1).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].kind, TransactionKind::Use);
        assert_eq!(history[1].amount, 1000);
    }

    #[test]
    fn use_beyond_balance_is_rejected() {
        let ledger = ledger();

        let err = ledger.use_points(1, 1).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                balance: 0,
                required: 1,
            }
        );
        assert!(ledger.get_history(1).unwrap().is_empty());
    }

    #[test]
    fn validation_order_is_user_then_amount() {
        let ledger = ledger();

        assert_eq!(
            ledger.charge(-1, 0).unwrap_err(),
            LedgerError::InvalidUser { user_id: -1 }
        );
        assert_eq!(
            ledger.use_points(0, -5).unwrap_err(),
            LedgerError::InvalidUser { user_id: 0 }
        );
        assert_eq!(
            ledger.charge(1, 0).unwrap_err(),
            LedgerError::InvalidAmount { amount: 0 }
        );
        assert_eq!(
            ledger.use_points(1, -1).unwrap_err(),
            LedgerError::InvalidAmount { amount: -1 }
        );
    }

    #[test]
    fn reads_reject_invalid_user() {
        let ledger = ledger();
        assert!(matches!(
            ledger.get_balance(-1),
            Err(LedgerError::InvalidUser { user_id: -1 })
        ));
        assert!(matches!(
            ledger.get_history(0),
            Err(LedgerError::InvalidUser { user_id: 0 })
        ));
        assert!(matches!(
            ledger.get_history_page(-7, 10, 0),
            Err(LedgerError::InvalidUser { user_id: -7 })
        ));
    }

    #[test]
    fn history_page_is_newest_first() {
        let ledger = ledger();
        for amount in 1..=5 {
            ledger.charge(1, amount).unwrap();
        }

        let first = ledger.get_history_page(1, 2, 0).unwrap();
        assert_eq!(first.total, 5);
        assert!(first.has_more);
        assert_eq!(
            first.records.iter().map(|r| r.amount).collect::<Vec<_>>(),
            vec![5, 4]
        );

        let last = ledger.get_history_page(1, 2, 4).unwrap();
        assert!(!last.has_more);
        assert_eq!(last.records.len(), 1);
        assert_eq!(last.records[0].amount, 1);

        let past_end = ledger.get_history_page(1, 2, 10).unwrap();
        assert!(past_end.records.is_empty());
        assert!(!past_end.has_more);
    }

    #[test]
    fn history_page_limit_is_capped() {
        let ledger = ledger();
        for _ in 0..120 {
            ledger.charge(1, 1).unwrap();
        }

        let page = ledger.get_history_page(1, 1000, 0).unwrap();
        assert_eq!(page.records.len(), MAX_PAGE_LIMIT);
        assert!(page.has_more);
    }

    #[test]
    fn history_reads_create_no_lock_entries() {
        let ledger = ledger();
        ledger.get_history(1).unwrap();
        ledger.get_history_page(1, 10, 0).unwrap();
        assert!(ledger.locks().is_empty());

        ledger.get_balance(3).unwrap();
        ledger.charge(1, 10).unwrap();
        ledger.use_points(2, 10).unwrap_err();
        assert_eq!(ledger.locks().len(), 3);
        assert_eq!(ledger.locks().prune_idle(), 3);
    }

    #[test]
    fn balance_read_waits_for_in_flight_mutation() {
        let balances = Arc::new(MemoryBalanceTable::new());
        let ledger = PointLedger::new(
            balances.clone(),
            Arc::new(MemoryHistoryTable::new()),
            LedgerConfig::default(),
        );
        let user_id = UserId::new(1).unwrap();
        let barrier = std::sync::Barrier::new(2);

        std::thread::scope(|s| {
            s.spawn(|| {
                ledger.locks().with_user(user_id, || {
                    let before = balances.select_by_id(user_id).unwrap();
                    balances.insert_or_update(user_id, 999).unwrap();
                    barrier.wait();
                    std::thread::sleep(std::time::Duration::from_millis(30));
                    balances.restore(&before).unwrap();
                });
            });

            barrier.wait();
            assert_eq!(ledger.get_balance(1).unwrap(), UserPoint::empty(user_id));
        });
    }
}
