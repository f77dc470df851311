//! Pool-related domain types
//!
//! Provides the validated pool name and the per-pool snapshot gathered
//! during a check pass.

use crate::domain::PoolHealth;
use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a storage pool
///
/// Validated on construction against the characters ZFS permits in pool
/// names. Because of that, a name is always safe to use as a file name
/// inside the state directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PoolName(String);

impl PoolName {
    /// Create a new PoolName with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPoolName` if the name is empty, does not
    /// start with a letter, or contains anything other than alphanumerics,
    /// `_`, `-`, `.` and `:`.
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();

        let starts_with_letter = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic());
        let allowed = name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'));

        if !starts_with_letter || !allowed {
            return Err(DomainError::InvalidPoolName(name));
        }
        Ok(Self(name))
    }

    /// Get the name as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PoolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PoolName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PoolName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for PoolName {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PoolName> for String {
    fn from(name: PoolName) -> Self {
        name.0
    }
}

/// A pool as observed during one pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    /// Pool name
    pub name: PoolName,
    /// Reported health
    pub health: PoolHealth,
    /// Whether the health matches the expected token
    pub healthy: bool,
}
