//! Wall-clock abstraction
//!
//! Debounce decisions only need whole seconds since the Unix epoch.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch
    fn now(&self) -> u64;
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        // A clock set before 1970 is treated as the epoch itself
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Format a number of seconds as a short human-readable duration
pub fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;
    match (hours, mins) {
        (0, 0) => format!("{}s", secs),
        (0, _) => format!("{}m{:02}s", mins, secs),
        _ => format!("{}h{:02}m", hours, mins),
    }
}
