//! Unified error types for zpoolwatch
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from the pool-management facility
    #[error("zpool error: {0}")]
    Zpool(#[from] ZpoolError),

    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from domain type validation
    #[error("Domain validation error: {0}")]
    Domain(#[from] DomainError),

    /// Error from the debounce state store
    #[error("State store error: {0}")]
    State(#[from] StateError),

    /// Running on an operating system with no known ZFS tooling layout
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the pool-management facility (`zpool`)
#[derive(Error, Debug)]
pub enum ZpoolError {
    /// The zpool binary does not exist at the configured path
    #[error("zpool binary not found at {0}. Is ZFS installed?")]
    BinaryNotFound(String),

    /// Running the zpool command failed
    #[error(transparent)]
    Command(#[from] CommandError),

    /// The command produced output we could not interpret
    #[error("Unexpected output from {command}: {message}")]
    UnexpectedOutput { command: String, message: String },

    /// The facility reported a value that failed validation
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Errors from running an external program
#[derive(Error, Debug)]
pub enum CommandError {
    /// The command could not be started
    #[error("Failed to run {command}: {message}")]
    SpawnFailed { command: String, message: String },

    /// The command exited unsuccessfully
    #[error("{command} exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    /// The command did not finish in time and was killed
    #[error("{command} timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },
}

/// Errors from domain type validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Pool name contains characters ZFS does not allow
    #[error("Invalid pool name: {0:?}")]
    InvalidPoolName(String),

    /// Health token is empty
    #[error("Empty pool health token")]
    EmptyHealthToken,
}

/// Errors from the debounce state store
#[derive(Error, Debug)]
pub enum StateError {
    /// No record exists for the pool
    #[error("No alert record for pool '{0}'")]
    NotFound(String),

    /// The record exists but does not hold a timestamp
    #[error("Corrupt alert record for pool '{pool}': {content:?}")]
    Corrupt { pool: String, content: String },

    /// The state directory could not be locked
    #[error("Failed to lock state directory {path}: {source}")]
    Lock {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error while reading or writing a record
    #[error("State IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from notification channels
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Recipient or sender address could not be parsed
    #[error("Invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The message could not be assembled
    #[error("Failed to build message: {0}")]
    Build(String),

    /// SMTP relay rejected or failed the delivery
    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// The sendmail program failed
    #[error("sendmail failed: {0}")]
    Sendmail(#[from] CommandError),

    /// Writing to the terminal failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required config field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
