//! Pool-management abstraction layer
//!
//! Provides trait-based abstractions over the `zpool` utility for testability.

pub mod command;
pub mod platform;
pub mod process;
pub mod traits;

pub use command::ZpoolCommand;
pub use platform::Platform;
pub use traits::PoolQuery;
