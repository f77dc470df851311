//! Configuration builder
//!
//! Merges configuration from files and CLI arguments.

use crate::config::{Config, ConfigFile};
use crate::error::ConfigError;

use std::path::PathBuf;

/// Builder for merging configuration sources
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Load configuration from a file
    ///
    /// An explicit path must exist; without one the default locations are
    /// searched and the defaults kept if none exists.
    pub fn with_file(mut self, path: Option<&str>) -> Result<Self, ConfigError> {
        let file_config = match path {
            Some(path) => Some(ConfigFile::load(path)?),
            None => ConfigFile::load_default()?,
        };

        if let Some(cfg) = file_config {
            self.config = cfg;
        }

        Ok(self)
    }

    /// Override with CLI verbose flag
    pub fn with_verbose(mut self, verbose: Option<bool>) -> Self {
        if let Some(v) = verbose {
            self.config.general.verbose = v;
        }
        self
    }

    /// Override with CLI dry-run flag
    pub fn with_dry_run(mut self, dry_run: Option<bool>) -> Self {
        if let Some(d) = dry_run {
            self.config.general.dry_run = d;
        }
        self
    }

    /// Override with CLI recipient
    pub fn with_recipient(mut self, recipient: Option<String>) -> Self {
        if let Some(r) = recipient {
            self.config.alert.recipient = r;
        }
        self
    }

    /// Override with CLI debounce window
    pub fn with_window(mut self, window_secs: Option<u64>) -> Self {
        if let Some(w) = window_secs {
            self.config.alert.debounce_window_secs = w;
        }
        self
    }

    /// Override with CLI expected health
    pub fn with_expected_health(mut self, health: Option<String>) -> Self {
        if let Some(h) = health {
            self.config.alert.expected_health = h;
        }
        self
    }

    /// Override with CLI state directory
    pub fn with_state_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(d) = dir {
            self.config.state.dir = Some(d);
        }
        self
    }

    /// Build and validate the final configuration
    pub fn build(self) -> Result<Config, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
