//! State command implementation
//!
//! Inspects and resets the per-pool alert records.

use crate::cli::args::{OutputFormat, StateArgs, StateCommands};
use crate::cli::output::{print_output, StateEntry, StateList};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::domain::PoolName;
use crate::error::Result;
use crate::state::DebounceStore;

use super::open_store;

/// Execute the state command
pub fn run_state(args: &StateArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let store = open_store(config)?;

    match &args.command {
        StateCommands::Show => show_state(&store, config, &SystemClock, format),
        StateCommands::Clear { pool } => clear_state(&store, pool, config.general.dry_run),
    }
}

fn show_state<S, C>(store: &S, config: &Config, clock: &C, format: OutputFormat) -> Result<()>
where
    S: DebounceStore + ?Sized,
    C: Clock + ?Sized,
{
    let now = clock.now();
    let records = store
        .records()?
        .into_iter()
        .map(|record| StateEntry::new(record, now))
        .collect();

    let list = StateList {
        dir: config.state.dir().display().to_string(),
        window_secs: config.alert.debounce_window_secs,
        records,
    };
    print_output(&list, format)?;
    Ok(())
}

fn clear_state<S: DebounceStore + ?Sized>(store: &S, pool: &str, dry_run: bool) -> Result<()> {
    let pool = PoolName::new(pool)?;

    if dry_run {
        println!("[DRY RUN] Would clear alert record for {}", pool);
        return Ok(());
    }

    let _lock = store.lock()?;
    if store.clear(&pool)? {
        println!("Cleared alert record for {}", pool);
    } else {
        println!("No alert record for {}", pool);
    }
    Ok(())
}
