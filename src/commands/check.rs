//! Check command implementation
//!
//! Runs one full pass over every pool and sends whatever alerts are due.

use crate::alerts::{Notifier, SendmailNotifier, SmtpNotifier, TerminalNotifier};
use crate::cli::args::OutputFormat;
use crate::cli::output::print_output;
use crate::clock::SystemClock;
use crate::config::{Config, MailTransport};
use crate::error::Result;
use crate::services::{MonitorConfig, PoolMonitor};
use crate::state::FileStateStore;
use crate::zpool::{platform, Platform};

use super::open_zpool;

/// Execute the check command
pub fn run_check(config: &Config, format: OutputFormat) -> Result<()> {
    let platform = Platform::detect()?;
    let zpool = open_zpool(config, platform)?;
    let hostname = platform::hostname(config.general.hostname.as_deref(), config.zpool.timeout());

    let dir = config.state.dir();
    let store = match FileStateStore::open(&dir) {
        Ok(store) => store,
        Err(e) => {
            log::warn!("State directory {} unavailable: {}", dir.display(), e);
            FileStateStore::unchecked(dir)
        }
    }
    .with_lock_timeout(config.state.lock_timeout());

    let notifier = build_notifier(config, platform, &hostname, format);
    log::debug!("Delivering alerts via {}", notifier.name());

    let monitor = PoolMonitor::new(monitor_config(config, hostname)?);
    let report = monitor.run_pass(&zpool, &store, notifier.as_ref(), &SystemClock)?;

    print_output(&report, format)?;
    Ok(())
}

/// Monitor settings derived from the merged configuration
pub fn monitor_config(config: &Config, hostname: String) -> Result<MonitorConfig> {
    Ok(MonitorConfig {
        recipient: config.alert.recipient.clone(),
        window_secs: config.alert.debounce_window_secs,
        expected_health: config.expected_health()?,
        hostname,
        subject_prefix: config.alert.subject_prefix.clone(),
        preamble: config.alert.preamble.clone(),
        dry_run: config.general.dry_run,
    })
}

/// Pick the delivery channel named in the configuration
pub fn build_notifier(
    config: &Config,
    platform: Platform,
    hostname: &str,
    format: OutputFormat,
) -> Box<dyn Notifier> {
    let mail = &config.mail;
    let from = mail.from_address(hostname);

    match mail.transport {
        MailTransport::Sendmail => {
            let program = mail
                .sendmail_path
                .clone()
                .unwrap_or_else(|| platform.sendmail_path());
            Box::new(SendmailNotifier::new(program, from, hostname, mail.timeout()))
        }
        MailTransport::Smtp => Box::new(SmtpNotifier::new(
            &mail.smtp_host,
            mail.smtp_port,
            mail.credentials(),
            from,
            hostname,
            mail.timeout(),
        )),
        // Keep stdout clean for machine-readable output
        MailTransport::Terminal => match format {
            OutputFormat::Table => Box::new(TerminalNotifier::new()),
            _ => Box::new(TerminalNotifier::stderr()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PoolHealth;

    #[test]
    fn test_monitor_config_from_config() {
        let mut config = Config::default();
        config.alert.recipient = "ops@example.com".to_string();
        config.alert.debounce_window_secs = 60;
        config.alert.expected_health = "degraded".to_string();
        config.general.dry_run = true;

        let monitor = monitor_config(&config, "nas01".to_string()).unwrap();
        assert_eq!(monitor.recipient, "ops@example.com");
        assert_eq!(monitor.window_secs, 60);
        assert_eq!(monitor.expected_health, PoolHealth::Degraded);
        assert_eq!(monitor.hostname, "nas01");
        assert!(monitor.dry_run);
    }

    #[test]
    fn test_build_notifier_per_transport() {
        let mut config = Config::default();
        let notifier = build_notifier(&config, Platform::Linux, "nas01", OutputFormat::Table);
        assert_eq!(notifier.name(), "sendmail");

        config.mail.transport = MailTransport::Smtp;
        let notifier = build_notifier(&config, Platform::Linux, "nas01", OutputFormat::Table);
        assert_eq!(notifier.name(), "smtp");

        config.mail.transport = MailTransport::Terminal;
        let notifier = build_notifier(&config, Platform::Linux, "nas01", OutputFormat::Json);
        assert_eq!(notifier.name(), "terminal");
    }
}
