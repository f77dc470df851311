//! Debounce state store trait and record types

use crate::domain::PoolName;
use crate::error::StateError;

use serde::Serialize;
use std::fs::File;

/// Persisted time of the last alert sent for a pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebounceRecord {
    /// Pool the record belongs to
    pub pool: PoolName,
    /// Seconds since the Unix epoch
    pub last_notified_at: u64,
}

/// Guard returned by [`DebounceStore::lock`]
///
/// Holds the store's exclusive lock until dropped.
#[derive(Debug)]
pub struct StoreLock {
    _file: Option<File>,
}

impl StoreLock {
    /// A guard for stores that need no cross-process locking
    pub fn unlocked() -> Self {
        Self { _file: None }
    }

    pub(crate) fn from_file(file: File) -> Self {
        Self { _file: Some(file) }
    }
}

/// Durable per-pool alert timestamps
///
/// State must outlive the process so the next scheduled invocation sees it.
pub trait DebounceStore: Send + Sync {
    /// Whether a record exists for the pool
    fn exists(&self, pool: &PoolName) -> bool;

    /// Timestamp of the last alert for the pool
    ///
    /// # Errors
    /// Returns `StateError::NotFound` if there is no record, or another
    /// error if the record cannot be read.
    fn last_notified_at(&self, pool: &PoolName) -> Result<u64, StateError>;

    /// Create or overwrite the record for the pool
    fn record_notified(&self, pool: &PoolName, timestamp: u64) -> Result<(), StateError>;

    /// All records currently stored
    fn records(&self) -> Result<Vec<DebounceRecord>, StateError>;

    /// Remove the record for the pool, returning whether one existed
    fn clear(&self, pool: &PoolName) -> Result<bool, StateError>;

    /// Take the store-wide exclusive lock, blocking until it is available
    ///
    /// Holding the lock across a whole pass keeps two overlapping
    /// invocations from both deciding an alert is due.
    fn lock(&self) -> Result<StoreLock, StateError>;
}
