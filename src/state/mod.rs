//! Debounce state
//!
//! Remembers when each pool was last alerted on, across invocations.

pub mod debounce;
pub mod file;
pub mod store;

pub use debounce::{check_due, AlertDecision, DueReason};
pub use file::FileStateStore;
pub use store::{DebounceRecord, DebounceStore, StoreLock};
