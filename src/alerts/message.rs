//! Alert message composition

use crate::domain::PoolName;
use serde::Serialize;

/// Default subject prefix
pub const DEFAULT_SUBJECT_PREFIX: &str = "ZFS pool alert";

/// Default first paragraph of the body
pub const DEFAULT_PREAMBLE: &str = "The following ZFS pool is not in the expected state:";

/// A message ready to be handed to a notification channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Destination address
    pub recipient: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
}

impl Notification {
    /// Build the alert for an unhealthy pool
    ///
    /// Diagnostics are copied into the body verbatim. They never go through
    /// a format string, so characters such as `%` arrive unchanged.
    pub fn pool_alert(
        recipient: &str,
        prefix: &str,
        preamble: &str,
        pool: &PoolName,
        hostname: &str,
        diagnostics: &str,
    ) -> Self {
        Self {
            recipient: recipient.to_string(),
            subject: subject(prefix, pool, hostname),
            body: body(preamble, diagnostics),
        }
    }
}

/// `"<prefix> for <pool> on <hostname>!"`
pub fn subject(prefix: &str, pool: &PoolName, hostname: &str) -> String {
    format!("{} for {} on {}!", prefix, pool, hostname)
}

/// `"<preamble>\n\n<diagnostics>\n"`
pub fn body(preamble: &str, diagnostics: &str) -> String {
    let diagnostics = diagnostics.trim_end_matches('\n');
    let mut body = String::with_capacity(preamble.len() + diagnostics.len() + 3);
    body.push_str(preamble);
    body.push_str("\n\n");
    body.push_str(diagnostics);
    body.push('\n');
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tank() -> PoolName {
        PoolName::new("tank").unwrap()
    }

    #[test]
    fn test_subject_format() {
        assert_eq!(
            subject(DEFAULT_SUBJECT_PREFIX, &tank(), "nas01"),
            "ZFS pool alert for tank on nas01!"
        );
    }

    #[test]
    fn test_body_format() {
        assert_eq!(
            body("Preamble:", "  pool: tank\n state: DEGRADED\n"),
            "Preamble:\n\n  pool: tank\n state: DEGRADED\n"
        );
    }

    #[test]
    fn test_body_keeps_literal_percent() {
        let diagnostics = "scan: resilver in progress, 42.5% done %s %d";
        let body = body(DEFAULT_PREAMBLE, diagnostics);
        assert!(body.contains("42.5% done %s %d"));
        assert_eq!(body.matches('%').count(), 3);
    }

    #[test]
    fn test_pool_alert() {
        let n = Notification::pool_alert(
            "root@example.com",
            "Pool alert",
            "Look:",
            &tank(),
            "nas01",
            "state: FAULTED",
        );
        assert_eq!(n.recipient, "root@example.com");
        assert_eq!(n.subject, "Pool alert for tank on nas01!");
        assert_eq!(n.body, "Look:\n\nstate: FAULTED\n");
    }
}
