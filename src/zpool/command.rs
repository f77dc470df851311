//! `zpool` command implementation
//!
//! Queries pools by running the `zpool` binary in scripted mode.

use crate::domain::{PoolHealth, PoolName};
use crate::error::ZpoolError;
use crate::zpool::process;
use crate::zpool::traits::PoolQuery;

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Pool query service backed by the `zpool` binary
#[derive(Debug, Clone)]
pub struct ZpoolCommand {
    path: PathBuf,
    timeout: Duration,
}

impl ZpoolCommand {
    /// Create a new query service for the binary at `path`
    ///
    /// # Errors
    /// Returns `ZpoolError::BinaryNotFound` if nothing exists at `path`.
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Result<Self, ZpoolError> {
        let path = path.into();
        if !path.exists() {
            return Err(ZpoolError::BinaryNotFound(path.display().to_string()));
        }
        Ok(Self { path, timeout })
    }

    /// Path of the zpool binary in use
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn zpool(&self, args: &[&str]) -> Result<String, ZpoolError> {
        Ok(process::run(&self.path, args, None, self.timeout)?)
    }
}

impl PoolQuery for ZpoolCommand {
    fn list_pools(&self) -> Result<Vec<PoolName>, ZpoolError> {
        let out = self.zpool(&["list", "-H", "-o", "name"])?;
        Ok(parse_pool_list(&out))
    }

    fn health(&self, pool: &PoolName) -> Result<PoolHealth, ZpoolError> {
        let out = self.zpool(&["list", "-H", "-o", "health", pool.as_str()])?;
        parse_health(&out)
    }

    fn diagnostics(&self, pool: &PoolName) -> Result<String, ZpoolError> {
        // -T d prefixes the report with the current date
        self.zpool(&["status", "-T", "d", pool.as_str()])
    }
}

/// Parse the output of `zpool list -H -o name`
///
/// Names that could not be used safely as state file names are skipped
/// with an error; the remaining pools are still checked.
pub fn parse_pool_list(output: &str) -> Vec<PoolName> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match PoolName::new(line) {
            Ok(name) => Some(name),
            Err(e) => {
                log::error!("Skipping pool: {}", e);
                None
            }
        })
        .collect()
}

/// Parse the output of `zpool list -H -o health <pool>`
pub fn parse_health(output: &str) -> Result<PoolHealth, ZpoolError> {
    let line = output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| ZpoolError::UnexpectedOutput {
            command: "zpool list -o health".to_string(),
            message: "no health value reported".to_string(),
        })?;
    Ok(line.parse::<PoolHealth>()?)
}
