//! Trait definitions for pool queries
//!
//! This trait abstracts over the `zpool` utility so the check pass can be
//! exercised against in-memory pools in tests.

use crate::domain::{PoolHealth, PoolName};
use crate::error::ZpoolError;

/// Read-only access to the pool-management facility
pub trait PoolQuery: Send + Sync {
    /// List the names of all imported pools
    ///
    /// Returns an empty vector when no pools exist. Any error means the
    /// facility itself is unusable.
    fn list_pools(&self) -> Result<Vec<PoolName>, ZpoolError>;

    /// Get the current health of a pool
    fn health(&self, pool: &PoolName) -> Result<PoolHealth, ZpoolError>;

    /// Get the detailed, timestamped status text of a pool
    fn diagnostics(&self, pool: &PoolName) -> Result<String, ZpoolError>;
}
