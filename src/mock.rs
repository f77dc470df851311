//! Mock implementations for testing
//!
//! Provides in-memory pools, debounce state, notifier and clock for unit
//! testing without ZFS, a mail system, or waiting for real time to pass.

use crate::alerts::{Notification, Notifier};
use crate::clock::Clock;
use crate::domain::{PoolHealth, PoolName};
use crate::error::{CommandError, NotifyError, StateError, ZpoolError};
use crate::state::{DebounceRecord, DebounceStore, StoreLock};
use crate::zpool::PoolQuery;

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Mock pool query service
#[derive(Debug, Default)]
pub struct MockPoolQuery {
    pools: Vec<(PoolName, PoolHealth, String)>,
    list_fails: bool,
    health_failures: Mutex<HashSet<PoolName>>,
    diagnostics_failures: Mutex<HashSet<PoolName>>,
    diagnostics_calls: AtomicUsize,
}

impl MockPoolQuery {
    /// Create a mock with no pools
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a pool
    ///
    /// # Panics
    /// Panics if `name` is not a valid pool name. Fixtures are written by
    /// hand, so a bad name is a bug in the test itself.
    pub fn with_pool(mut self, name: &str, health: PoolHealth, diagnostics: &str) -> Self {
        let name = PoolName::new(name).expect("mock pool name must be valid");
        self.pools.push((name, health, diagnostics.to_string()));
        self
    }

    /// Builder: make enumeration fail as if zpool were missing
    pub fn failing_list(mut self) -> Self {
        self.list_fails = true;
        self
    }

    /// Make health queries for `pool` fail
    pub fn fail_health(&self, pool: &PoolName) {
        self.health_failures.lock().unwrap().insert(pool.clone());
    }

    /// Make diagnostics queries for `pool` fail
    pub fn fail_diagnostics(&self, pool: &PoolName) {
        self.diagnostics_failures
            .lock()
            .unwrap()
            .insert(pool.clone());
    }

    /// Change the reported health of an existing pool
    pub fn set_health(&mut self, name: &str, health: PoolHealth) {
        if let Some(entry) = self.pools.iter_mut().find(|(p, _, _)| p.as_str() == name) {
            entry.1 = health;
        }
    }

    /// Number of diagnostics queries made so far
    pub fn diagnostics_calls(&self) -> usize {
        self.diagnostics_calls.load(Ordering::SeqCst)
    }

    fn find(&self, pool: &PoolName) -> Result<&(PoolName, PoolHealth, String), ZpoolError> {
        self.pools
            .iter()
            .find(|(p, _, _)| p == pool)
            .ok_or_else(|| failed(format!("zpool list {}", pool), "no such pool"))
    }
}

fn failed(command: String, stderr: &str) -> ZpoolError {
    CommandError::Failed {
        command,
        status: "exit status: 1".to_string(),
        stderr: stderr.to_string(),
    }
    .into()
}

impl PoolQuery for MockPoolQuery {
    fn list_pools(&self) -> Result<Vec<PoolName>, ZpoolError> {
        if self.list_fails {
            return Err(ZpoolError::BinaryNotFound("/sbin/zpool".to_string()));
        }
        Ok(self.pools.iter().map(|(p, _, _)| p.clone()).collect())
    }

    fn health(&self, pool: &PoolName) -> Result<PoolHealth, ZpoolError> {
        if self.health_failures.lock().unwrap().contains(pool) {
            return Err(failed(format!("zpool list -o health {}", pool), "I/O error"));
        }
        Ok(self.find(pool)?.1.clone())
    }

    fn diagnostics(&self, pool: &PoolName) -> Result<String, ZpoolError> {
        self.diagnostics_calls.fetch_add(1, Ordering::SeqCst);
        if self.diagnostics_failures.lock().unwrap().contains(pool) {
            return Err(failed(format!("zpool status {}", pool), "I/O error"));
        }
        Ok(self.find(pool)?.2.clone())
    }
}

/// In-memory debounce store that counts accesses
#[derive(Debug, Default)]
pub struct MemoryStore {
    // None marks a record that exists but cannot be read
    records: Mutex<BTreeMap<PoolName, Option<u64>>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the record for `pool` exist but be unreadable
    pub fn set_corrupt(&self, pool: &PoolName) {
        self.records.lock().unwrap().insert(pool.clone(), None);
    }

    /// Stored timestamp for `pool`, without counting as a read
    pub fn get(&self, pool: &PoolName) -> Option<u64> {
        self.records.lock().unwrap().get(pool).copied().flatten()
    }

    /// Number of exists/read calls
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of write calls
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl DebounceStore for MemoryStore {
    fn exists(&self, pool: &PoolName) -> bool {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.records.lock().unwrap().contains_key(pool)
    }

    fn last_notified_at(&self, pool: &PoolName) -> Result<u64, StateError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        match self.records.lock().unwrap().get(pool) {
            Some(Some(ts)) => Ok(*ts),
            Some(None) => Err(StateError::Corrupt {
                pool: pool.to_string(),
                content: "???".to_string(),
            }),
            None => Err(StateError::NotFound(pool.to_string())),
        }
    }

    fn record_notified(&self, pool: &PoolName, timestamp: u64) -> Result<(), StateError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.records
            .lock()
            .unwrap()
            .insert(pool.clone(), Some(timestamp));
        Ok(())
    }

    fn records(&self) -> Result<Vec<DebounceRecord>, StateError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(pool, ts)| {
                ts.map(|last_notified_at| DebounceRecord {
                    pool: pool.clone(),
                    last_notified_at,
                })
            })
            .collect())
    }

    fn clear(&self, pool: &PoolName) -> Result<bool, StateError> {
        Ok(self.records.lock().unwrap().remove(pool).is_some())
    }

    fn lock(&self) -> Result<StoreLock, StateError> {
        Ok(StoreLock::unlocked())
    }
}

/// Notifier that remembers what it was asked to send
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingNotifier {
    /// Create a notifier that always succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a notifier that always fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Notifications delivered so far
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Build("transport unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Manually driven clock
#[derive(Debug, Default)]
pub struct FixedClock {
    now: AtomicU64,
}

impl FixedClock {
    /// Create a clock frozen at `now`
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
