//! Debounce decision
//!
//! Decides whether an unhealthy pool is due for another alert, based on
//! the age of its last recorded alert.

use crate::domain::PoolName;
use crate::state::store::DebounceStore;

use serde::Serialize;
use std::fmt;

/// Why an alert is or is not due
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DueReason {
    /// No alert was ever recorded for the pool
    NoRecord,
    /// The last alert is at least one window old
    WindowElapsed { age_secs: u64 },
    /// The record could not be read, so we fail open
    RecordUnreadable { error: String },
    /// The last alert is younger than the window
    WithinWindow { age_secs: u64, remaining_secs: u64 },
}

impl fmt::Display for DueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use crate::clock::format_duration;
        match self {
            Self::NoRecord => write!(f, "no previous alert"),
            Self::WindowElapsed { age_secs } => {
                write!(f, "last alert {} ago", format_duration(*age_secs))
            }
            Self::RecordUnreadable { error } => write!(f, "alert record unreadable ({})", error),
            Self::WithinWindow {
                age_secs,
                remaining_secs,
            } => write!(
                f,
                "last alert {} ago, next in {}",
                format_duration(*age_secs),
                format_duration(*remaining_secs)
            ),
        }
    }
}

/// Outcome of the due check for one pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertDecision {
    /// Whether a notification should be sent now
    pub should_notify: bool,
    /// Explanation for operators
    #[serde(flatten)]
    pub reason: DueReason,
}

impl AlertDecision {
    fn due(reason: DueReason) -> Self {
        Self {
            should_notify: true,
            reason,
        }
    }
}

/// Decide whether `pool` is due for an alert at time `now`
///
/// A pool without a record is always due. Otherwise it is due once
/// `now - last_notified_at >= window_secs`; the boundary is inclusive. A
/// record stamped in the future counts as zero seconds old. An unreadable
/// record makes the pool due: missing an alert about failing storage is
/// worse than sending one too many.
pub fn check_due<S: DebounceStore + ?Sized>(
    store: &S,
    pool: &PoolName,
    now: u64,
    window_secs: u64,
) -> AlertDecision {
    if !store.exists(pool) {
        return AlertDecision::due(DueReason::NoRecord);
    }

    let last = match store.last_notified_at(pool) {
        Ok(last) => last,
        Err(e) => {
            log::warn!("Treating {} as due: {}", pool, e);
            return AlertDecision::due(DueReason::RecordUnreadable {
                error: e.to_string(),
            });
        }
    };

    let age_secs = now.saturating_sub(last);
    if age_secs >= window_secs {
        AlertDecision::due(DueReason::WindowElapsed { age_secs })
    } else {
        AlertDecision {
            should_notify: false,
            reason: DueReason::WithinWindow {
                age_secs,
                remaining_secs: window_secs - age_secs,
            },
        }
    }
}
