//! Config command implementation
//!
//! Prints the effective configuration after merging file and flags.

use crate::config::Config;
use crate::error::{ConfigError, Result};

/// Execute the config command
pub fn run_config(config: &Config) -> Result<()> {
    println!("{}", render(config)?);
    Ok(())
}

/// Render the configuration as TOML with secrets masked
fn render(config: &Config) -> std::result::Result<String, ConfigError> {
    let mut shown = config.clone();
    if shown.mail.smtp_password.is_some() {
        shown.mail.smtp_password = Some("********".to_string());
    }
    Ok(toml::to_string_pretty(&shown)?)
}
