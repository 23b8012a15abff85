//! Per-user lock table.
//!
//! Each user gets its own mutex, created on first use and reused afterwards.
//! Holding a user's guard serializes every mutation of that user while other
//! users proceed in parallel.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use point_ledger_core::UserId;

/// Keyed mutex table mapping users to their critical-section lock.
#[derive(Debug, Default)]
pub struct UserLockTable {
    locks: DashMap<UserId, Arc<Mutex<()>>>,
}

impl UserLockTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the lock handle for a user, creating it if needed.
    fn handle(&self, user_id: UserId) -> Arc<Mutex<()>> {
        // The shard guard is released at the end of this statement, before
        // the caller blocks on the user mutex.
        Arc::clone(self.locks.entry(user_id).or_default().value())
    }

    /// Run `f` while holding the user's lock.
    pub fn with_user<T>(&self, user_id: UserId, f: impl FnOnce() -> T) -> T {
        let lock = self.handle(user_id);
        let _guard = lock.lock();
        f()
    }

    /// Number of users with a lock entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no lock entry exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    /// Drop entries no caller currently holds or waits on.
    ///
    /// Returns the number of entries removed.
    pub fn prune_idle(&self) -> usize {
        let before = self.locks.len();
        // Handles are only cloned under the shard lock that `retain` holds,
        // so a count of one means nobody else can reach this mutex.
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        let removed = before.saturating_sub(self.locks.len());

        if removed > 0 {
            tracing::debug!(removed, remaining = self.locks.len(), "Pruned idle user locks");
        }

        removed
    }
}
