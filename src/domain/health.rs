//! Pool health states
//!
//! Health is kept as an enum covering every state `zpool` reports, even
//! though alerting only distinguishes "expected" from "anything else".

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Health state reported for a pool
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PoolHealth {
    /// All devices are working normally
    Online,
    /// One or more devices failed but redundancy keeps the pool usable
    Degraded,
    /// The pool is inaccessible because of failed devices
    Faulted,
    /// The pool was taken offline by an administrator
    Offline,
    /// A device could not be opened
    Unavail,
    /// A device was physically removed
    Removed,
    /// I/O to the pool is suspended
    Suspended,
    /// Any token not covered above, kept verbatim (upper-cased)
    Other(String),
}

impl PoolHealth {
    /// Canonical upper-case token as printed by `zpool`
    pub fn as_token(&self) -> &str {
        match self {
            Self::Online => "ONLINE",
            Self::Degraded => "DEGRADED",
            Self::Faulted => "FAULTED",
            Self::Offline => "OFFLINE",
            Self::Unavail => "UNAVAIL",
            Self::Removed => "REMOVED",
            Self::Suspended => "SUSPENDED",
            Self::Other(token) => token,
        }
    }
}

impl FromStr for PoolHealth {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_uppercase();
        Ok(match token.as_str() {
            "" => return Err(DomainError::EmptyHealthToken),
            "ONLINE" => Self::Online,
            "DEGRADED" => Self::Degraded,
            "FAULTED" => Self::Faulted,
            "OFFLINE" => Self::Offline,
            "UNAVAIL" => Self::Unavail,
            "REMOVED" => Self::Removed,
            "SUSPENDED" => Self::Suspended,
            _ => Self::Other(token),
        })
    }
}

impl fmt::Display for PoolHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

impl TryFrom<String> for PoolHealth {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PoolHealth> for String {
    fn from(health: PoolHealth) -> Self {
        health.as_token().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_states() {
        assert_eq!("ONLINE".parse::<PoolHealth>().unwrap(), PoolHealth::Online);
        assert_eq!(
            "DEGRADED\n".parse::<PoolHealth>().unwrap(),
            PoolHealth::Degraded
        );
        assert_eq!("faulted".parse::<PoolHealth>().unwrap(), PoolHealth::Faulted);
        assert_eq!("UNAVAIL".parse::<PoolHealth>().unwrap(), PoolHealth::Unavail);
    }

    #[test]
    fn test_parse_unknown_state() {
        let health = "weird".parse::<PoolHealth>().unwrap();
        assert_eq!(health, PoolHealth::Other("WEIRD".to_string()));
        assert_eq!(health.to_string(), "WEIRD");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(
            "  ".parse::<PoolHealth>(),
            Err(DomainError::EmptyHealthToken)
        );
    }

    #[test]
    fn test_display_round_trips_token() {
        assert_eq!(PoolHealth::Removed.to_string(), "REMOVED");
        assert_eq!(PoolHealth::Online.as_token(), "ONLINE");
    }
}
