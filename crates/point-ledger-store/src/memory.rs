//! In-memory storage tables.
//!
//! Data lives for the lifetime of the table. Intended for single-process use
//! and for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use point_ledger_core::{HistoryId, PointHistory, TransactionKind, UserId, UserPoint};

use crate::error::{Result, StoreError};
use crate::{BalanceStore, HistoryStore};

/// In-memory balance table keyed by user id.
#[derive(Debug, Default)]
pub struct MemoryBalanceTable {
    rows: RwLock<HashMap<UserId, UserPoint>>,
}

impl MemoryBalanceTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users that have been written at least once.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Whether no user has been written yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

impl BalanceStore for MemoryBalanceTable {
    fn select_by_id(&self, user_id: UserId) -> Result<UserPoint> {
        Ok(self
            .rows
            .read()
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| UserPoint::empty(user_id)))
    }

    fn insert_or_update(&self, user_id: UserId, balance: i64) -> Result<UserPoint> {
        let mut rows = self.rows.write();
        let now = Utc::now();

        // Wall clock may step back; updated_at may not.
        let updated_at = rows
            .get(&user_id)
            .map_or(now, |prev| now.max(prev.updated_at));

        let point = UserPoint {
            user_id,
            balance,
            updated_at,
        };
        rows.insert(user_id, point.clone());

        tracing::trace!(user_id = %user_id, balance, "Balance row written");

        Ok(point)
    }

    fn restore(&self, previous: &UserPoint) -> Result<()> {
        let mut rows = self.rows.write();
        let user_id = previous.user_id;

        if *previous == UserPoint::empty(user_id) {
            rows.remove(&user_id);
        } else {
            rows.insert(user_id, previous.clone());
        }

        tracing::trace!(user_id = %user_id, balance = previous.balance, "Balance row restored");

        Ok(())
    }
}

/// In-memory append-only history table.
///
/// Record ids come from an atomic counter owned by the table.
#[derive(Debug)]
pub struct MemoryHistoryTable {
    next_id: AtomicU64,
    rows: RwLock<HashMap<UserId, Vec<PointHistory>>>,
}

impl MemoryHistoryTable {
    /// Create an empty table. The first record gets id 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            rows: RwLock::new(HashMap::new()),
        }
    }

    /// Total number of records across all users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.read().values().map(Vec::len).sum()
    }

    /// Whether the table holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn allocate_id(&self) -> Result<HistoryId> {
        self.next_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |id| id.checked_add(1))
            .map(HistoryId::from_raw)
            .map_err(|_| StoreError::IdSpaceExhausted)
    }
}

impl Default for MemoryHistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore for MemoryHistoryTable {
    fn insert(
        &self,
        user_id: UserId,
        amount: i64,
        kind: TransactionKind,
        timestamp: DateTime<Utc>,
    ) -> Result<PointHistory> {
        let id = self.allocate_id()?;
        let record = PointHistory {
            id,
            user_id,
            amount,
            kind,
            timestamp,
        };

        self.rows
            .write()
            .entry(user_id)
            .or_default()
            .push(record.clone());

        tracing::trace!(user_id = %user_id, history_id = %id, %kind, amount, "History row appended");

        Ok(record)
    }

    fn select_all_by_user_id(&self, user_id: UserId) -> Result<Vec<PointHistory>> {
        Ok(self
            .rows
            .read()
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}
