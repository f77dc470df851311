//! Status command implementation
//!
//! Shows the health of every pool without alerting or touching state.

use crate::cli::args::OutputFormat;
use crate::cli::output::{print_output, PoolStatusList};
use crate::config::Config;
use crate::error::Result;
use crate::services::PoolMonitor;
use crate::zpool::Platform;

use super::check::monitor_config;
use super::open_zpool;

/// Execute the status command
pub fn run_status(config: &Config, format: OutputFormat) -> Result<()> {
    let platform = Platform::detect()?;
    let zpool = open_zpool(config, platform)?;

    let settings = monitor_config(config, String::new())?;
    let expected = settings.expected_health.to_string();
    let pools = PoolMonitor::new(settings).survey(&zpool)?;

    print_output(&PoolStatusList { expected, pools }, format)?;
    Ok(())
}
