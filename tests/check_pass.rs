//! End-to-end check passes against the file-backed state store
//!
//! Pools, mail and time are faked; records live in a temporary directory
//! and are reopened between passes the way separate invocations would.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use zpoolwatch::alerts::{Notification, Notifier};
use zpoolwatch::clock::Clock;
use zpoolwatch::domain::{PoolHealth, PoolName};
use zpoolwatch::error::{CommandError, NotifyError, ZpoolError};
use zpoolwatch::services::{MonitorConfig, PoolMonitor, PoolOutcome};
use zpoolwatch::state::{DebounceStore, DueReason, FileStateStore};
use zpoolwatch::zpool::PoolQuery;

const T0: u64 = 1_700_000_000;
const WINDOW: u64 = 21_600;

struct FakePools {
    pools: Mutex<BTreeMap<PoolName, PoolHealth>>,
    diagnostics: String,
}

impl FakePools {
    fn new(pools: &[(&str, PoolHealth)]) -> Self {
        Self {
            pools: Mutex::new(
                pools
                    .iter()
                    .map(|(name, health)| (PoolName::new(*name).unwrap(), health.clone()))
                    .collect(),
            ),
            diagnostics: "  pool: tank\n state: DEGRADED\n".to_string(),
        }
    }

    fn with_diagnostics(mut self, text: &str) -> Self {
        self.diagnostics = text.to_string();
        self
    }

    fn set(&self, name: &str, health: PoolHealth) {
        self.pools
            .lock()
            .unwrap()
            .insert(PoolName::new(name).unwrap(), health);
    }
}

impl PoolQuery for FakePools {
    fn list_pools(&self) -> Result<Vec<PoolName>, ZpoolError> {
        Ok(self.pools.lock().unwrap().keys().cloned().collect())
    }

    fn health(&self, pool: &PoolName) -> Result<PoolHealth, ZpoolError> {
        self.pools
            .lock()
            .unwrap()
            .get(pool)
            .cloned()
            .ok_or_else(|| ZpoolError::UnexpectedOutput {
                command: "zpool list".to_string(),
                message: format!("no pool {}", pool),
            })
    }

    fn diagnostics(&self, _pool: &PoolName) -> Result<String, ZpoolError> {
        Ok(self.diagnostics.clone())
    }
}

#[derive(Default)]
struct Outbox {
    sent: Mutex<Vec<Notification>>,
    down: Mutex<bool>,
    delay: Duration,
}

impl Outbox {
    fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    fn set_down(&self, down: bool) {
        *self.down.lock().unwrap() = down;
    }
}

impl Notifier for Outbox {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        thread::sleep(self.delay);
        if *self.down.lock().unwrap() {
            return Err(NotifyError::Sendmail(CommandError::Failed {
                command: "sendmail".to_string(),
                status: "exit status: 75".to_string(),
                stderr: "queue unavailable".to_string(),
            }));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "outbox"
    }
}

struct TestClock(AtomicU64);

impl TestClock {
    fn at(now: u64) -> Self {
        Self(AtomicU64::new(now))
    }

    fn set(&self, now: u64) {
        self.0.store(now, Ordering::SeqCst);
    }
}

impl Clock for TestClock {
    fn now(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

fn monitor() -> PoolMonitor {
    PoolMonitor::new(MonitorConfig {
        recipient: "ops@example.com".to_string(),
        hostname: "nas01".to_string(),
        ..MonitorConfig::default()
    })
}

fn tank() -> PoolName {
    PoolName::new("tank").unwrap()
}

#[test]
fn healthy_pools_leave_no_state() {
    let dir = tempfile::tempdir().unwrap();
    let pools = FakePools::new(&[("tank", PoolHealth::Online), ("rpool", PoolHealth::Online)]);
    let outbox = Outbox::default();

    let store = FileStateStore::open(dir.path()).unwrap();
    let report = monitor()
        .run_pass(&pools, &store, &outbox, &TestClock::at(T0))
        .unwrap();

    assert_eq!(report.pools.len(), 2);
    assert!(report.pools.iter().all(|p| p.outcome == PoolOutcome::Healthy));
    assert!(outbox.sent().is_empty());
    assert!(store.records().unwrap().is_empty());
}

#[test]
fn degraded_pool_alerts_once_per_window_across_invocations() {
    let dir = tempfile::tempdir().unwrap();
    let pools = FakePools::new(&[("tank", PoolHealth::Degraded)]);
    let outbox = Outbox::default();
    let clock = TestClock::at(T0);

    // First invocation: no record, alert sent and recorded
    let store = FileStateStore::open(dir.path()).unwrap();
    let report = monitor().run_pass(&pools, &store, &outbox, &clock).unwrap();
    assert_eq!(
        report.pools[0].outcome,
        PoolOutcome::Alerted {
            reason: DueReason::NoRecord
        }
    );
    assert_eq!(outbox.sent().len(), 1);
    assert_eq!(
        outbox.sent()[0].subject,
        "ZFS pool alert for tank on nas01!"
    );
    assert_eq!(store.last_notified_at(&tank()).unwrap(), T0);

    // Ten minutes later in a fresh process: suppressed, record untouched
    clock.set(T0 + 600);
    let store = FileStateStore::open(dir.path()).unwrap();
    let report = monitor().run_pass(&pools, &store, &outbox, &clock).unwrap();
    assert!(matches!(
        report.pools[0].outcome,
        PoolOutcome::Suppressed { .. }
    ));
    assert_eq!(outbox.sent().len(), 1);
    assert_eq!(store.last_notified_at(&tank()).unwrap(), T0);

    // Exactly one window later: due again
    clock.set(T0 + WINDOW);
    let store = FileStateStore::open(dir.path()).unwrap();
    let report = monitor().run_pass(&pools, &store, &outbox, &clock).unwrap();
    assert_eq!(
        report.pools[0].outcome,
        PoolOutcome::Alerted {
            reason: DueReason::WindowElapsed { age_secs: WINDOW }
        }
    );
    assert_eq!(outbox.sent().len(), 2);
    assert_eq!(store.last_notified_at(&tank()).unwrap(), T0 + WINDOW);
}

#[test]
fn recovery_does_not_reset_the_window() {
    let dir = tempfile::tempdir().unwrap();
    let pools = FakePools::new(&[("tank", PoolHealth::Degraded)]);
    let outbox = Outbox::default();
    let clock = TestClock::at(T0);
    let store = FileStateStore::open(dir.path()).unwrap();

    monitor().run_pass(&pools, &store, &outbox, &clock).unwrap();

    pools.set("tank", PoolHealth::Online);
    clock.set(T0 + 60);
    monitor().run_pass(&pools, &store, &outbox, &clock).unwrap();
    assert_eq!(store.last_notified_at(&tank()).unwrap(), T0);

    pools.set("tank", PoolHealth::Faulted);
    clock.set(T0 + 120);
    let report = monitor().run_pass(&pools, &store, &outbox, &clock).unwrap();
    assert!(matches!(
        report.pools[0].outcome,
        PoolOutcome::Suppressed { .. }
    ));
    assert_eq!(outbox.sent().len(), 1);
}

#[test]
fn failed_delivery_is_retried_next_run() {
    let dir = tempfile::tempdir().unwrap();
    let pools = FakePools::new(&[("tank", PoolHealth::Degraded)]);
    let outbox = Outbox::default();
    let clock = TestClock::at(T0);
    let store = FileStateStore::open(dir.path()).unwrap();

    outbox.set_down(true);
    let report = monitor().run_pass(&pools, &store, &outbox, &clock).unwrap();
    assert!(matches!(
        report.pools[0].outcome,
        PoolOutcome::SendFailed { .. }
    ));
    assert!(!store.exists(&tank()));

    outbox.set_down(false);
    clock.set(T0 + 60);
    let report = monitor().run_pass(&pools, &store, &outbox, &clock).unwrap();
    assert!(matches!(report.pools[0].outcome, PoolOutcome::Alerted { .. }));
    assert_eq!(store.last_notified_at(&tank()).unwrap(), T0 + 60);
}

#[test]
fn corrupt_record_fails_open() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("tank.last-alert"), "garbage\n").unwrap();
    let pools = FakePools::new(&[("tank", PoolHealth::Degraded)]);
    let outbox = Outbox::default();
    let store = FileStateStore::open(dir.path()).unwrap();

    let report = monitor()
        .run_pass(&pools, &store, &outbox, &TestClock::at(T0))
        .unwrap();

    assert!(matches!(
        report.pools[0].outcome,
        PoolOutcome::Alerted {
            reason: DueReason::RecordUnreadable { .. }
        }
    ));
    assert_eq!(store.last_notified_at(&tank()).unwrap(), T0);
}

#[test]
fn missing_state_directory_still_alerts() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStateStore::unchecked(dir.path().join("does-not-exist"));
    let pools = FakePools::new(&[("tank", PoolHealth::Degraded)]);
    let outbox = Outbox::default();

    let report = monitor()
        .run_pass(&pools, &store, &outbox, &TestClock::at(T0))
        .unwrap();

    assert!(matches!(report.pools[0].outcome, PoolOutcome::Alerted { .. }));
    assert_eq!(outbox.sent().len(), 1);
}

#[test]
fn dry_run_sends_and_records_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let pools = FakePools::new(&[("tank", PoolHealth::Degraded)]);
    let outbox = Outbox::default();
    let store = FileStateStore::open(dir.path()).unwrap();

    let monitor = PoolMonitor::new(MonitorConfig {
        dry_run: true,
        ..MonitorConfig::default()
    });
    let report = monitor
        .run_pass(&pools, &store, &outbox, &TestClock::at(T0))
        .unwrap();

    assert!(report.dry_run);
    assert!(matches!(
        report.pools[0].outcome,
        PoolOutcome::WouldAlert { .. }
    ));
    assert!(outbox.sent().is_empty());
    assert!(!store.exists(&tank()));
}

#[test]
fn percent_signs_in_diagnostics_survive() {
    let dir = tempfile::tempdir().unwrap();
    let diagnostics = "  scan: resilver in progress, 45.2% done\n errors: 100%s %d %n\n";
    let pools =
        FakePools::new(&[("tank", PoolHealth::Degraded)]).with_diagnostics(diagnostics);
    let outbox = Outbox::default();
    let store = FileStateStore::open(dir.path()).unwrap();

    monitor()
        .run_pass(&pools, &store, &outbox, &TestClock::at(T0))
        .unwrap();

    let body = &outbox.sent()[0].body;
    assert!(body.contains("45.2% done"));
    assert!(body.contains("100%s %d %n"));
}

#[test]
fn overlapping_runs_alert_once() {
    let dir = tempfile::tempdir().unwrap();
    let pools = FakePools::new(&[("tank", PoolHealth::Degraded)]);
    let outbox = Outbox::slow(Duration::from_millis(300));
    let clock = TestClock::at(T0);

    let outcomes: Vec<PoolOutcome> = thread::scope(|scope| {
        let runs: Vec<_> = (0..2)
            .map(|_| {
                scope.spawn(|| {
                    let store = FileStateStore::open(dir.path()).unwrap();
                    let report = monitor().run_pass(&pools, &store, &outbox, &clock).unwrap();
                    report.pools[0].outcome.clone()
                })
            })
            .collect();
        runs.into_iter().map(|run| run.join().unwrap()).collect()
    });

    assert_eq!(outbox.sent().len(), 1);
    let alerted = outcomes
        .iter()
        .filter(|o| matches!(o, PoolOutcome::Alerted { .. }))
        .count();
    let suppressed = outcomes
        .iter()
        .filter(|o| matches!(o, PoolOutcome::Suppressed { .. }))
        .count();
    assert_eq!((alerted, suppressed), (1, 1));
}

#[test]
fn held_lock_times_out_and_pass_continues() {
    let dir = tempfile::tempdir().unwrap();
    let wedged = FileStateStore::open(dir.path()).unwrap();
    let _held = wedged.lock().unwrap();

    let store = FileStateStore::open(dir.path())
        .unwrap()
        .with_lock_timeout(Duration::from_millis(200));
    let pools = FakePools::new(&[("tank", PoolHealth::Degraded)]);
    let outbox = Outbox::default();

    let started = Instant::now();
    let report = monitor()
        .run_pass(&pools, &store, &outbox, &TestClock::at(T0))
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(matches!(report.pools[0].outcome, PoolOutcome::Alerted { .. }));
    assert_eq!(outbox.sent().len(), 1);
}
