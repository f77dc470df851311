//! Configuration system
//!
//! Handles TOML config file parsing and CLI argument merging. The result
//! is built once at startup and passed down by reference.

pub mod builder;
pub mod file;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::alerts::{DEFAULT_PREAMBLE, DEFAULT_SUBJECT_PREFIX};
use crate::domain::PoolHealth;
use crate::error::{ConfigError, DomainError};
use crate::services::monitor::DEFAULT_WINDOW_SECS;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Alerting policy
    pub alert: AlertConfig,
    /// Debounce state location
    pub state: StateConfig,
    /// Pool query settings
    pub zpool: ZpoolConfig,
    /// Mail delivery settings
    pub mail: MailConfig,
}

impl Config {
    /// Check values that serde cannot check on its own
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mail.transport != MailTransport::Terminal && self.alert.recipient.trim().is_empty()
        {
            return Err(ConfigError::MissingField("alert.recipient".to_string()));
        }

        self.expected_health()?;

        if self.zpool.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "zpool.timeout_secs".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.mail.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "mail.timeout_secs".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// The configured healthy state
    pub fn expected_health(&self) -> Result<PoolHealth, ConfigError> {
        self.alert
            .expected_health
            .parse()
            .map_err(|e: DomainError| ConfigError::InvalidValue {
                key: "alert.expected_health".to_string(),
                message: e.to_string(),
            })
    }
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,
    /// Dry run mode
    pub dry_run: bool,
    /// Host name used in alert subjects (detected when unset)
    pub hostname: Option<String>,
}

/// Alerting policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Notification target
    pub recipient: String,
    /// Minimum seconds between two alerts for the same pool
    pub debounce_window_secs: u64,
    /// Health token considered healthy
    pub expected_health: String,
    /// Subject prefix
    pub subject_prefix: String,
    /// First paragraph of the alert body
    pub preamble: String,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            recipient: "root".to_string(),
            debounce_window_secs: DEFAULT_WINDOW_SECS,
            expected_health: "ONLINE".to_string(),
            subject_prefix: DEFAULT_SUBJECT_PREFIX.to_string(),
            preamble: DEFAULT_PREAMBLE.to_string(),
        }
    }
}

/// Debounce state configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// Directory holding one record per pool
    pub dir: Option<PathBuf>,
    /// How long to wait for a concurrent run to release the state lock
    pub lock_timeout_secs: u64,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            dir: None,
            lock_timeout_secs: 60,
        }
    }
}

impl StateConfig {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.lock_timeout_secs)
    }

    /// Effective state directory, defaulting to a shared temp location
    pub fn dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("zpoolwatch"))
    }
}

/// Pool query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZpoolConfig {
    /// Path to the zpool binary (detected when unset)
    pub path: Option<PathBuf>,
    /// Timeout for each zpool invocation
    pub timeout_secs: u64,
}

impl Default for ZpoolConfig {
    fn default() -> Self {
        Self {
            path: None,
            timeout_secs: 30,
        }
    }
}

impl ZpoolConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// How alerts leave the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MailTransport {
    /// Pipe to a local sendmail-compatible program
    #[default]
    Sendmail,
    /// Relay through an SMTP server
    Smtp,
    /// Print to stdout
    Terminal,
}

/// Mail delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// Delivery mechanism
    pub transport: MailTransport,
    /// sendmail program (detected when unset)
    pub sendmail_path: Option<PathBuf>,
    /// Sender address (defaults to zpoolwatch@<hostname>)
    pub from: Option<String>,
    /// SMTP relay host
    pub smtp_host: String,
    /// SMTP relay port
    pub smtp_port: u16,
    /// Optional SMTP username
    pub smtp_user: Option<String>,
    /// Optional SMTP password
    pub smtp_password: Option<String>,
    /// Timeout for one delivery
    pub timeout_secs: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            transport: MailTransport::Sendmail,
            sendmail_path: None,
            from: None,
            smtp_host: "localhost".to_string(),
            smtp_port: 25,
            smtp_user: None,
            smtp_password: None,
            timeout_secs: 30,
        }
    }
}

impl MailConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Sender address for alerts sent from `hostname`
    pub fn from_address(&self, hostname: &str) -> String {
        self.from
            .clone()
            .unwrap_or_else(|| format!("zpoolwatch@{}", hostname))
    }

    /// SMTP credentials, when both parts are configured
    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.smtp_user, &self.smtp_password) {
            (Some(user), Some(password)) => Some((user.clone(), password.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.alert.debounce_window_secs, 21_600);
        assert_eq!(config.alert.expected_health, "ONLINE");
        assert_eq!(config.mail.transport, MailTransport::Sendmail);
        assert!(config.state.dir().ends_with("zpoolwatch"));
        assert_eq!(config.state.lock_timeout(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [alert]
            recipient = "storage@example.com"
            debounce_window_secs = 3600

            [mail]
            transport = "smtp"
            smtp_host = "relay.example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.alert.recipient, "storage@example.com");
        assert_eq!(config.alert.debounce_window_secs, 3600);
        assert_eq!(config.alert.expected_health, "ONLINE");
        assert_eq!(config.mail.transport, MailTransport::Smtp);
        assert_eq!(config.mail.smtp_port, 25);
    }

    #[test]
    fn test_validate_empty_recipient() {
        let mut config = Config::default();
        config.alert.recipient = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField(_))
        ));

        config.mail.transport = MailTransport::Terminal;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_expected_health() {
        let mut config = Config::default();
        config.alert.expected_health = "degraded".to_string();
        assert_eq!(config.expected_health().unwrap(), PoolHealth::Degraded);

        config.alert.expected_health = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.zpool.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mail_from_address() {
        let mut mail = MailConfig::default();
        assert_eq!(mail.from_address("nas01"), "zpoolwatch@nas01");
        mail.from = Some("alerts@example.com".to_string());
        assert_eq!(mail.from_address("nas01"), "alerts@example.com");
    }

    #[test]
    fn test_mail_credentials_need_both_parts() {
        let mut mail = MailConfig::default();
        mail.smtp_user = Some("user".to_string());
        assert!(mail.credentials().is_none());
        mail.smtp_password = Some("secret".to_string());
        assert_eq!(
            mail.credentials(),
            Some(("user".to_string(), "secret".to_string()))
        );
    }
}
