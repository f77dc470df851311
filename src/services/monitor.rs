//! Check pass orchestration
//!
//! Runs one complete evaluation over all pools: enumerate, classify,
//! consult the debounce state, notify and record. The process is started
//! by an external scheduler; nothing here loops or sleeps.

use crate::alerts::{HealthEvaluator, Notification, Notifier, DEFAULT_PREAMBLE, DEFAULT_SUBJECT_PREFIX};
use crate::clock::Clock;
use crate::domain::{PoolHealth, PoolName, PoolStatus};
use crate::error::AppError;
use crate::state::{check_due, DebounceStore, DueReason};
use crate::zpool::PoolQuery;

use serde::Serialize;

/// Default debounce window: six hours
pub const DEFAULT_WINDOW_SECS: u64 = 21_600;

/// Configuration for the monitor
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Where alerts are sent
    pub recipient: String,
    /// Minimum seconds between two alerts for the same pool
    pub window_secs: u64,
    /// Health state considered healthy
    pub expected_health: PoolHealth,
    /// Host name used in alert subjects
    pub hostname: String,
    /// Subject prefix
    pub subject_prefix: String,
    /// First paragraph of the alert body
    pub preamble: String,
    /// Evaluate without sending or recording anything
    pub dry_run: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            recipient: "root".to_string(),
            window_secs: DEFAULT_WINDOW_SECS,
            expected_health: PoolHealth::Online,
            hostname: "localhost".to_string(),
            subject_prefix: DEFAULT_SUBJECT_PREFIX.to_string(),
            preamble: DEFAULT_PREAMBLE.to_string(),
            dry_run: false,
        }
    }
}

/// What happened to one pool during a pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PoolOutcome {
    /// Health matched the expected state; state was not touched
    Healthy,
    /// An alert was delivered and recorded
    Alerted { reason: DueReason },
    /// An alert would have been sent (dry run)
    WouldAlert { reason: DueReason },
    /// An alert was sent within the window; nothing done
    Suppressed { reason: DueReason },
    /// Delivery failed; nothing recorded so the next run retries
    SendFailed { error: String },
    /// Health or diagnostics could not be read for this pool
    QueryFailed { error: String },
}

/// Result for one pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolReport {
    pub pool: PoolName,
    pub health: Option<PoolHealth>,
    #[serde(flatten)]
    pub outcome: PoolOutcome,
}

/// Result of a full pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub hostname: String,
    pub dry_run: bool,
    pub pools: Vec<PoolReport>,
}

impl PassReport {
    /// Number of pools matching `predicate`
    pub fn count(&self, predicate: impl Fn(&PoolOutcome) -> bool) -> usize {
        self.pools.iter().filter(|p| predicate(&p.outcome)).count()
    }

    /// Number of alerts delivered
    pub fn alerts_sent(&self) -> usize {
        self.count(|o| matches!(o, PoolOutcome::Alerted { .. }))
    }
}

/// Drives check passes
pub struct PoolMonitor {
    config: MonitorConfig,
    evaluator: HealthEvaluator,
}

impl PoolMonitor {
    /// Create a new monitor with the given configuration
    pub fn new(config: MonitorConfig) -> Self {
        let evaluator = HealthEvaluator::new(config.expected_health.clone());
        Self { config, evaluator }
    }

    /// Get the monitor configuration
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Run one pass over every pool
    ///
    /// # Errors
    /// Only a failure to enumerate pools is fatal. Everything that goes
    /// wrong for a single pool is recorded in its [`PoolReport`].
    pub fn run_pass<Q, S, N, C>(
        &self,
        query: &Q,
        store: &S,
        notifier: &N,
        clock: &C,
    ) -> Result<PassReport, AppError>
    where
        Q: PoolQuery + ?Sized,
        S: DebounceStore + ?Sized,
        N: Notifier + ?Sized,
        C: Clock + ?Sized,
    {
        let pools = query.list_pools()?;
        let mut report = PassReport {
            hostname: self.config.hostname.clone(),
            dry_run: self.config.dry_run,
            pools: Vec::with_capacity(pools.len()),
        };

        if pools.is_empty() {
            log::info!("No pools found");
            return Ok(report);
        }

        // Serialise with concurrent invocations for the rest of the pass
        let _lock = match store.lock() {
            Ok(lock) => Some(lock),
            Err(e) => {
                log::warn!("Continuing without state lock: {}", e);
                None
            }
        };

        for pool in pools {
            let pool_report = self.check_pool(pool, query, store, notifier, clock);
            report.pools.push(pool_report);
        }

        log::info!(
            "Pass complete: {} pool(s), {} alert(s) sent",
            report.pools.len(),
            report.alerts_sent()
        );
        Ok(report)
    }

    fn check_pool<Q, S, N, C>(
        &self,
        pool: PoolName,
        query: &Q,
        store: &S,
        notifier: &N,
        clock: &C,
    ) -> PoolReport
    where
        Q: PoolQuery + ?Sized,
        S: DebounceStore + ?Sized,
        N: Notifier + ?Sized,
        C: Clock + ?Sized,
    {
        let health = match query.health(&pool) {
            Ok(health) => health,
            Err(e) => {
                log::error!("Could not read health of {}: {}", pool, e);
                return PoolReport {
                    pool,
                    health: None,
                    outcome: PoolOutcome::QueryFailed {
                        error: e.to_string(),
                    },
                };
            }
        };

        if self.evaluator.is_healthy(&health) {
            log::debug!("{} is {}", pool, health);
            return PoolReport {
                pool,
                health: Some(health),
                outcome: PoolOutcome::Healthy,
            };
        }

        let now = clock.now();
        let decision = check_due(store, &pool, now, self.config.window_secs);
        log::debug!(
            "{} is {} (expected {}): {}",
            pool,
            health,
            self.evaluator.expected(),
            decision.reason
        );

        let outcome = if !decision.should_notify {
            PoolOutcome::Suppressed {
                reason: decision.reason,
            }
        } else {
            self.alert(&pool, store, notifier, now, decision.reason, query)
        };

        PoolReport {
            pool,
            health: Some(health),
            outcome,
        }
    }

    fn alert<Q, S, N>(
        &self,
        pool: &PoolName,
        store: &S,
        notifier: &N,
        now: u64,
        reason: DueReason,
        query: &Q,
    ) -> PoolOutcome
    where
        Q: PoolQuery + ?Sized,
        S: DebounceStore + ?Sized,
        N: Notifier + ?Sized,
    {
        let diagnostics = match query.diagnostics(pool) {
            Ok(text) => text,
            Err(e) => {
                log::error!("Could not read status of {}: {}", pool, e);
                return PoolOutcome::QueryFailed {
                    error: e.to_string(),
                };
            }
        };

        if self.config.dry_run {
            log::info!("Dry run: would alert {} about {}", self.config.recipient, pool);
            return PoolOutcome::WouldAlert { reason };
        }

        let notification = Notification::pool_alert(
            &self.config.recipient,
            &self.config.subject_prefix,
            &self.config.preamble,
            pool,
            &self.config.hostname,
            &diagnostics,
        );

        if let Err(e) = notifier.notify(&notification) {
            log::error!("Failed to send alert for {} via {}: {}", pool, notifier.name(), e);
            return PoolOutcome::SendFailed {
                error: e.to_string(),
            };
        }
        log::info!(
            "Sent alert for {} to {} via {}",
            pool,
            self.config.recipient,
            notifier.name()
        );

        if let Err(e) = store.record_notified(pool, now) {
            log::warn!("Alert for {} sent but not recorded: {}", pool, e);
        }

        PoolOutcome::Alerted { reason }
    }

    /// Report every pool's health without alerting or touching state
    pub fn survey<Q: PoolQuery + ?Sized>(&self, query: &Q) -> Result<Vec<PoolStatus>, AppError> {
        let mut statuses = Vec::new();
        for pool in query.list_pools()? {
            match query.health(&pool) {
                Ok(health) => statuses.push(PoolStatus {
                    healthy: self.evaluator.is_healthy(&health),
                    name: pool,
                    health,
                }),
                Err(e) => log::error!("Could not read health of {}: {}", pool, e),
            }
        }
        Ok(statuses)
    }
}
