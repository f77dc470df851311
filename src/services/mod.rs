//! Service layer
//!
//! Services encapsulate the check-pass business logic.

pub mod monitor;

pub use monitor::{MonitorConfig, PassReport, PoolMonitor, PoolOutcome, PoolReport};
