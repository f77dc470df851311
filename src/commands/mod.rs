//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command.

pub mod check;
pub mod config;
pub mod state;
pub mod status;

pub use check::run_check;
pub use config::run_config;
pub use state::run_state;
pub use status::run_status;

use crate::config::Config;
use crate::error::Result;
use crate::state::FileStateStore;
use crate::zpool::{Platform, ZpoolCommand};

/// Resolve the zpool binary for this host
fn open_zpool(config: &Config, platform: Platform) -> Result<ZpoolCommand> {
    let path = platform.zpool_path(config.zpool.path.as_deref());
    log::debug!("Using zpool at {}", path.display());
    Ok(ZpoolCommand::new(path, config.zpool.timeout())?)
}

/// Open the configured state directory
fn open_store(config: &Config) -> Result<FileStateStore> {
    let store = FileStateStore::open(config.state.dir())?;
    Ok(store.with_lock_timeout(config.state.lock_timeout()))
}
