//! Domain models for zpoolwatch
//!
//! This module contains all domain types with validation.
//! Types are validated on construction (fail-fast pattern).

pub mod health;
pub mod pool;

pub use health::PoolHealth;
pub use pool::{PoolName, PoolStatus};
