//! zpoolwatch - ZFS pool health monitoring library
//!
//! This library checks the health of every ZFS pool on a host and sends
//! debounced alerts for pools that are not in the expected state. It is
//! meant to be driven once per invocation by an external scheduler.
//!
//! # Modules
//!
//! - [`alerts`]: Health evaluation, alert messages and notifiers
//! - [`cli`]: Command-line interface definitions
//! - [`clock`]: Wall clock abstraction
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`domain`]: Domain models with validation
//! - [`error`]: Error types
//! - [`services`]: The check pass
//! - [`state`]: Persistent debounce state
//! - [`zpool`]: Pool-management abstraction layer

pub mod alerts;
pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod state;
pub mod zpool;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{AppError, Result};
