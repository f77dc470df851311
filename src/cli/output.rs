//! Output formatting utilities
//!
//! Provides table and JSON output formatting for CLI commands.

use crate::cli::args::OutputFormat;
use crate::clock::format_duration;
use crate::domain::{PoolName, PoolStatus};
use crate::services::{PassReport, PoolOutcome, PoolReport};
use crate::state::DebounceRecord;

use serde::Serialize;
use std::io::{self, Write};

/// Format and print output based on the selected format
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            writeln!(handle, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());
            writeln!(handle, "{}", json)?;
        }
        OutputFormat::Compact => {
            writeln!(handle, "{}", data.to_compact())?;
        }
    }

    Ok(())
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;

    /// Format as a compact single line
    fn to_compact(&self) -> String {
        self.to_table().replace('\n', " | ")
    }
}

impl TableDisplay for PoolReport {
    fn to_table(&self) -> String {
        let health = self
            .health
            .as_ref()
            .map(|h| h.to_string())
            .unwrap_or_else(|| "?".to_string());

        let detail = match &self.outcome {
            PoolOutcome::Healthy => "healthy".to_string(),
            PoolOutcome::Alerted { reason } => format!("alert sent ({})", reason),
            PoolOutcome::WouldAlert { reason } => format!("would alert ({})", reason),
            PoolOutcome::Suppressed { reason } => format!("alert suppressed ({})", reason),
            PoolOutcome::SendFailed { error } => format!("alert FAILED: {}", error),
            PoolOutcome::QueryFailed { error } => format!("query FAILED: {}", error),
        };

        format!("{:<16} {:<10} {}", self.pool.as_str(), health, detail)
    }

    fn to_compact(&self) -> String {
        let tag = match &self.outcome {
            PoolOutcome::Healthy => "ok",
            PoolOutcome::Alerted { .. } => "alerted",
            PoolOutcome::WouldAlert { .. } => "would-alert",
            PoolOutcome::Suppressed { .. } => "suppressed",
            PoolOutcome::SendFailed { .. } => "send-failed",
            PoolOutcome::QueryFailed { .. } => "query-failed",
        };
        format!("{}:{}", self.pool, tag)
    }
}

impl TableDisplay for PassReport {
    fn to_table(&self) -> String {
        if self.pools.is_empty() {
            return format!("No pools found on {}", self.hostname);
        }

        let mut output = String::new();
        if self.dry_run {
            output.push_str("Dry run: no alerts sent or recorded\n\n");
        }

        output.push_str(&format!("{:<16} {:<10} {}\n", "POOL", "HEALTH", "RESULT"));
        for pool in &self.pools {
            output.push_str(&pool.to_table());
            output.push('\n');
        }

        let suppressed = self.count(|o| matches!(o, PoolOutcome::Suppressed { .. }));
        let failed = self.count(|o| {
            matches!(
                o,
                PoolOutcome::SendFailed { .. } | PoolOutcome::QueryFailed { .. }
            )
        });
        output.push_str(&format!(
            "\n{} pool(s) checked on {}: {} alert(s) sent, {} suppressed, {} failed",
            self.pools.len(),
            self.hostname,
            self.alerts_sent(),
            suppressed,
            failed
        ));

        output
    }

    fn to_compact(&self) -> String {
        if self.pools.is_empty() {
            return "no pools".to_string();
        }
        self.pools
            .iter()
            .map(|p| p.to_compact())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Pool health listing for display
#[derive(Debug, Clone, Serialize)]
pub struct PoolStatusList {
    pub expected: String,
    pub pools: Vec<PoolStatus>,
}

impl TableDisplay for PoolStatusList {
    fn to_table(&self) -> String {
        if self.pools.is_empty() {
            return "No pools found".to_string();
        }

        let mut output = format!("Expected state: {}\n\n", self.expected);
        output.push_str(&format!("{:<16} {:<10} {}\n", "POOL", "HEALTH", "OK"));
        for pool in &self.pools {
            output.push_str(&format!(
                "{:<16} {:<10} {}\n",
                pool.name.as_str(),
                pool.health.as_token(),
                if pool.healthy { "yes" } else { "NO" }
            ));
        }
        output.trim_end().to_string()
    }

    fn to_compact(&self) -> String {
        self.pools
            .iter()
            .map(|p| format!("{}:{}", p.name, p.health))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One alert record with its age
#[derive(Debug, Clone, Serialize)]
pub struct StateEntry {
    pub pool: PoolName,
    pub last_notified_at: u64,
    pub age_secs: u64,
}

impl StateEntry {
    pub fn new(record: DebounceRecord, now: u64) -> Self {
        Self {
            age_secs: now.saturating_sub(record.last_notified_at),
            pool: record.pool,
            last_notified_at: record.last_notified_at,
        }
    }
}

/// Alert records for display
#[derive(Debug, Clone, Serialize)]
pub struct StateList {
    pub dir: String,
    pub window_secs: u64,
    pub records: Vec<StateEntry>,
}

impl TableDisplay for StateList {
    fn to_table(&self) -> String {
        let mut output = format!("State directory: {}\n", self.dir);
        if self.records.is_empty() {
            output.push_str("No alert records");
            return output;
        }

        output.push('\n');
        for entry in &self.records {
            let status = if entry.age_secs >= self.window_secs {
                "due if unhealthy".to_string()
            } else {
                format!(
                    "suppressed for {}",
                    format_duration(self.window_secs - entry.age_secs)
                )
            };
            output.push_str(&format!(
                "{:<16} last alert {} ago ({})\n",
                entry.pool.as_str(),
                format_duration(entry.age_secs),
                status
            ));
        }
        output.trim_end().to_string()
    }

    fn to_compact(&self) -> String {
        self.records
            .iter()
            .map(|r| format!("{}:{}", r.pool, r.last_notified_at))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
