//! Alert notification system
//!
//! Provides notification channels for alerts: local sendmail, an SMTP
//! relay, and the terminal.

use super::message::Notification;
use crate::error::NotifyError;
use crate::zpool::process;

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

/// Notification channel trait
pub trait Notifier: Send + Sync {
    /// Deliver a notification
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;

    /// Channel name for identification
    fn name(&self) -> &str;
}

/// Build an RFC 5322 plain-text message for a notification
///
/// Bare local names such as `root` are qualified with `host`.
pub fn build_message(
    from: &str,
    host: &str,
    notification: &Notification,
) -> Result<Message, NotifyError> {
    Message::builder()
        .from(qualify(from, host).parse()?)
        .to(qualify(&notification.recipient, host).parse()?)
        .subject(notification.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(notification.body.clone())
        .map_err(|e| NotifyError::Build(e.to_string()))
}

fn qualify(address: &str, host: &str) -> String {
    if address.contains('@') {
        address.to_string()
    } else {
        format!("{}@{}", address, host)
    }
}

/// Hands messages to the local mail system via a sendmail-compatible program
pub struct SendmailNotifier {
    program: PathBuf,
    from: String,
    host: String,
    timeout: Duration,
}

impl SendmailNotifier {
    /// Create a notifier running `program` as the sender `from` on `host`
    pub fn new(
        program: impl Into<PathBuf>,
        from: impl Into<String>,
        host: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            from: from.into(),
            host: host.into(),
            timeout,
        }
    }
}

impl Notifier for SendmailNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let message = build_message(&self.from, &self.host, notification)?;
        // -t: recipients from headers, -i: a lone "." is not end of input
        process::run(
            &self.program,
            &["-t", "-i"],
            Some(message.formatted().as_slice()),
            self.timeout,
        )?;
        Ok(())
    }

    fn name(&self) -> &str {
        "sendmail"
    }
}

/// Delivers messages through an SMTP relay
///
/// The connection is unencrypted, so this is meant for a relay on the
/// local host or a trusted network.
pub struct SmtpNotifier {
    transport: SmtpTransport,
    from: String,
    host: String,
}

impl SmtpNotifier {
    /// Create a notifier relaying through `relay:port`
    pub fn new(
        relay: &str,
        port: u16,
        credentials: Option<(String, String)>,
        from: impl Into<String>,
        host: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let mut builder = SmtpTransport::builder_dangerous(relay)
            .port(port)
            .timeout(Some(timeout));
        if let Some((user, password)) = credentials {
            builder = builder.credentials(Credentials::new(user, password));
        }

        Self {
            transport: builder.build(),
            from: from.into(),
            host: host.into(),
        }
    }
}

impl Notifier for SmtpNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let message = build_message(&self.from, &self.host, notification)?;
        self.transport.send(&message)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "smtp"
    }
}

/// Terminal/console notifier
///
/// Prints notifications instead of mailing them.
pub struct TerminalNotifier {
    /// Use stderr instead of stdout
    use_stderr: bool,
    /// Use colors (ANSI escape codes)
    use_colors: bool,
}

impl TerminalNotifier {
    /// Create a new terminal notifier writing to stdout
    pub fn new() -> Self {
        Self {
            use_stderr: false,
            use_colors: Self::supports_color(),
        }
    }

    /// Create a notifier that uses stderr
    pub fn stderr() -> Self {
        Self {
            use_stderr: true,
            use_colors: Self::supports_color(),
        }
    }

    /// Create a notifier without colors
    pub fn no_color() -> Self {
        Self {
            use_stderr: false,
            use_colors: false,
        }
    }

    /// Check if terminal supports colors
    fn supports_color() -> bool {
        std::env::var("TERM")
            .map(|term| term != "dumb")
            .unwrap_or(false)
    }

    fn format_notification(&self, notification: &Notification) -> String {
        let (start, end) = if self.use_colors {
            ("\x1b[31m\x1b[1m", "\x1b[0m") // Bold red
        } else {
            ("", "")
        };

        format!(
            "{}ALERT{} to {}: {}\n{}",
            start, end, notification.recipient, notification.subject, notification.body
        )
    }
}

impl Default for TerminalNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let message = self.format_notification(notification);

        if self.use_stderr {
            let stderr = io::stderr();
            let mut handle = stderr.lock();
            write!(handle, "{}", message)?;
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write!(handle, "{}", message)?;
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "terminal"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification() -> Notification {
        Notification {
            recipient: "root@example.com".to_string(),
            subject: "ZFS pool alert for tank on nas01!".to_string(),
            body: "Preamble\n\nscan: 12.5% done\n".to_string(),
        }
    }

    #[test]
    fn test_terminal_notifier_creation() {
        let notifier = TerminalNotifier::new();
        assert_eq!(notifier.name(), "terminal");
        assert!(!notifier.use_stderr);
        assert!(TerminalNotifier::stderr().use_stderr);
    }

    #[test]
    fn test_terminal_notifier_no_color() {
        let notifier = TerminalNotifier::no_color();
        assert!(!notifier.use_colors);
        assert_eq!(
            notifier.format_notification(&notification()),
            "ALERT to root@example.com: ZFS pool alert for tank on nas01!\nPreamble\n\nscan: 12.5% done\n"
        );
    }

    #[test]
    fn test_terminal_notify() {
        let notifier = TerminalNotifier::no_color();
        assert!(notifier.notify(&notification()).is_ok());
    }

    #[test]
    fn test_build_message_headers_and_body() {
        let message = build_message("zpoolwatch@nas01", "nas01", &notification()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: root@example.com"));
        assert!(raw.contains("Subject: ZFS pool alert for tank on nas01!"));
        assert!(raw.contains("scan: 12.5% done"));
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let mut n = notification();
        n.recipient = "not an address".to_string();
        assert!(matches!(
            build_message("zpoolwatch@nas01", "nas01", &n),
            Err(NotifyError::Address(_))
        ));
    }

    #[test]
    fn test_build_message_qualifies_local_recipient() {
        let mut n = notification();
        n.recipient = "root".to_string();
        let message = build_message("zpoolwatch", "nas01", &n).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: root@nas01"));
        assert!(raw.contains("From: zpoolwatch@nas01"));
    }

    #[cfg(unix)]
    #[test]
    fn test_sendmail_pipes_message() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let captured = dir.path().join("captured.eml");
        let script = dir.path().join("sendmail");
        std::fs::write(
            &script,
            format!("#!/bin/sh\ncat > '{}'\n", captured.display()),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let notifier =
            SendmailNotifier::new(&script, "zpoolwatch@nas01", "nas01", Duration::from_secs(5));
        notifier.notify(&notification()).unwrap();

        let raw = std::fs::read_to_string(&captured).unwrap();
        assert!(raw.contains("Subject: ZFS pool alert for tank on nas01!"));
        assert!(raw.contains("scan: 12.5% done"));
    }

    #[cfg(unix)]
    #[test]
    fn test_sendmail_failure_is_reported() {
        let notifier =
            SendmailNotifier::new("/bin/false", "zpoolwatch@nas01", "nas01", Duration::from_secs(5));
        assert!(matches!(
            notifier.notify(&notification()),
            Err(NotifyError::Sendmail(_))
        ));
    }
}
