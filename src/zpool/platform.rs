//! Platform detection
//!
//! Picks the default locations of the ZFS and mail tooling for the
//! operating system we are running on. Detection happens once at startup;
//! nothing else in the crate branches on the platform.

use crate::error::AppError;
use crate::zpool::process;

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Operating systems with a known ZFS tooling layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    FreeBsd,
    Illumos,
    Solaris,
    MacOs,
}

impl Platform {
    /// Detect the platform of the running process
    ///
    /// # Errors
    /// Returns `AppError::UnsupportedPlatform` on any other operating system.
    pub fn detect() -> Result<Self, AppError> {
        Self::from_os(std::env::consts::OS)
    }

    /// Map an OS identifier (as in `std::env::consts::OS`) to a platform
    pub fn from_os(os: &str) -> Result<Self, AppError> {
        match os {
            "linux" => Ok(Self::Linux),
            "freebsd" => Ok(Self::FreeBsd),
            "illumos" => Ok(Self::Illumos),
            "solaris" => Ok(Self::Solaris),
            "macos" => Ok(Self::MacOs),
            other => Err(AppError::UnsupportedPlatform(other.to_string())),
        }
    }

    /// Places the zpool binary is usually installed, most likely first
    pub fn zpool_candidates(&self) -> &'static [&'static str] {
        match self {
            Self::Linux => &["/usr/sbin/zpool", "/sbin/zpool", "/usr/local/sbin/zpool"],
            Self::FreeBsd => &["/sbin/zpool", "/usr/local/sbin/zpool"],
            Self::Illumos | Self::Solaris => &["/usr/sbin/zpool", "/sbin/zpool"],
            Self::MacOs => &[
                "/usr/local/zfs/bin/zpool",
                "/usr/local/bin/zpool",
                "/opt/homebrew/bin/zpool",
            ],
        }
    }

    /// Default sendmail-compatible program
    pub fn sendmail_path(&self) -> PathBuf {
        match self {
            Self::Illumos | Self::Solaris => PathBuf::from("/usr/lib/sendmail"),
            _ => PathBuf::from("/usr/sbin/sendmail"),
        }
    }

    /// Resolve the zpool binary to use
    ///
    /// An explicitly configured path always wins, even if it does not exist
    /// (the caller reports that). Otherwise the first existing candidate is
    /// returned, falling back to the first candidate.
    pub fn zpool_path(&self, configured: Option<&Path>) -> PathBuf {
        if let Some(path) = configured {
            return path.to_path_buf();
        }
        let candidates = self.zpool_candidates();
        candidates
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
            .unwrap_or_else(|| PathBuf::from(candidates[0]))
    }
}

/// Resolve the host name used in alert subjects
///
/// Uses the configured override when present, otherwise asks the
/// `hostname` program, and finally falls back to `localhost`.
pub fn hostname(configured: Option<&str>, timeout: Duration) -> String {
    if let Some(name) = configured.map(str::trim).filter(|n| !n.is_empty()) {
        return name.to_string();
    }

    match process::run(Path::new("hostname"), &[], None, timeout) {
        Ok(out) if !out.trim().is_empty() => out.trim().to_string(),
        Ok(_) => "localhost".to_string(),
        Err(e) => {
            log::warn!("Could not determine hostname: {}", e);
            "localhost".to_string()
        }
    }
}
