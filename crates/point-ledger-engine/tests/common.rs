//! Common test utilities for point ledger integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use point_ledger_engine::{LedgerConfig, PointHistory, PointLedger, TransactionKind, UserId, UserPoint};
use point_ledger_store::{
    BalanceStore, HistoryStore, MemoryBalanceTable, MemoryHistoryTable, Result, StoreError,
};

/// Install a test subscriber once. Honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Balance table that counts every call.
#[derive(Default)]
pub struct CountingBalanceStore {
    inner: MemoryBalanceTable,
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
}

impl BalanceStore for CountingBalanceStore {
    fn select_by_id(&self, user_id: UserId) -> Result<UserPoint> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.select_by_id(user_id)
    }

    fn insert_or_update(&self, user_id: UserId, balance: i64) -> Result<UserPoint> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_or_update(user_id, balance)
    }

    fn restore(&self, previous: &UserPoint) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.restore(previous)
    }
}

/// History table that counts every call and can be told to fail appends.
#[derive(Default)]
pub struct CountingHistoryStore {
    inner: MemoryHistoryTable,
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
    pub fail_inserts: AtomicBool,
}

impl HistoryStore for CountingHistoryStore {
    fn insert(
        &self,
        user_id: UserId,
        amount: i64,
        kind: TransactionKind,
        timestamp: DateTime<Utc>,
    ) -> Result<PointHistory> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("history unavailable".into()));
        }
        self.inner.insert(user_id, amount, kind, timestamp)
    }

    fn select_all_by_user_id(&self, user_id: UserId) -> Result<Vec<PointHistory>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.select_all_by_user_id(user_id)
    }
}

/// Test harness containing a ledger and handles to its stores.
pub struct TestHarness {
    /// The ledger under test.
    pub ledger: Arc<PointLedger>,
    /// The balance store the ledger writes to.
    pub balances: Arc<CountingBalanceStore>,
    /// The history store the ledger writes to.
    pub history: Arc<CountingHistoryStore>,
}

impl TestHarness {
    /// Create a harness with the default configuration.
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    /// Create a harness with a custom configuration.
    pub fn with_config(config: LedgerConfig) -> Self {
        init_tracing();

        let balances = Arc::new(CountingBalanceStore::default());
        let history = Arc::new(CountingHistoryStore::default());
        let balance_store: Arc<dyn BalanceStore> = balances.clone();
        let history_store: Arc<dyn HistoryStore> = history.clone();
        let ledger = PointLedger::new(balance_store, history_store, config);

        Self {
            ledger: Arc::new(ledger),
            balances,
            history,
        }
    }

    /// Total number of store calls made so far.
    pub fn store_calls(&self) -> usize {
        self.balances.reads.load(Ordering::SeqCst)
            + self.balances.writes.load(Ordering::SeqCst)
            + self.history.reads.load(Ordering::SeqCst)
            + self.history.writes.load(Ordering::SeqCst)
    }

    /// Number of store writes made so far.
    pub fn store_writes(&self) -> usize {
        self.balances.writes.load(Ordering::SeqCst) + self.history.writes.load(Ordering::SeqCst)
    }

    /// Charge a user and panic on failure.
    pub fn fund(&self, user_id: i64, amount: i64) {
        self.ledger
            .charge(user_id, amount)
            .expect("Failed to fund test user");
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
