//! File-backed debounce state
//!
//! One file per pool, `<dir>/<pool>.last-alert`, holding the decimal epoch
//! seconds of the last alert. Pool names are validated on construction so
//! they are always safe file names.

use crate::domain::PoolName;
use crate::error::StateError;
use crate::state::store::{DebounceRecord, DebounceStore, StoreLock};

use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

/// File name suffix of a record
const RECORD_SUFFIX: &str = ".last-alert";

/// File name of the store-wide lock
const LOCK_FILE: &str = ".lock";

/// Default time to wait for another invocation to release the lock
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(60);

/// Delay between two attempts to take the lock
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Debounce store keeping one small file per pool
#[derive(Debug, Clone)]
pub struct FileStateStore {
    dir: PathBuf,
    lock_timeout: Duration,
}

impl FileStateStore {
    /// Open the store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StateError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self::unchecked(dir))
    }

    /// A store rooted at `dir` without touching the filesystem
    ///
    /// Every read of a missing directory reports "no record", so a store
    /// whose directory could not be created still lets alerts through.
    pub fn unchecked(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Give up on [`DebounceStore::lock`] after `timeout`
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Directory holding the records
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, pool: &PoolName) -> PathBuf {
        self.dir.join(format!("{}{}", pool, RECORD_SUFFIX))
    }

    fn parse_record(pool: &PoolName, content: &str) -> Result<u64, StateError> {
        content.trim().parse().map_err(|_| StateError::Corrupt {
            pool: pool.to_string(),
            content: content.to_string(),
        })
    }
}

impl DebounceStore for FileStateStore {
    fn exists(&self, pool: &PoolName) -> bool {
        self.record_path(pool).is_file()
    }

    fn last_notified_at(&self, pool: &PoolName) -> Result<u64, StateError> {
        let content = fs::read_to_string(self.record_path(pool)).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StateError::NotFound(pool.to_string()),
            _ => StateError::Io(e),
        })?;
        Self::parse_record(pool, &content)
    }

    fn record_notified(&self, pool: &PoolName, timestamp: u64) -> Result<(), StateError> {
        let path = self.record_path(pool);
        let tmp = self.dir.join(format!(".{}{}.tmp", pool, RECORD_SUFFIX));

        {
            let mut file = fs::File::create(&tmp)?;
            writeln!(file, "{}", timestamp)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;

        log::debug!("Recorded alert for {} at {} in {}", pool, timestamp, path.display());
        Ok(())
    }

    fn records(&self) -> Result<Vec<DebounceRecord>, StateError> {
        let mut records = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(stem) = file_name
                .to_str()
                .and_then(|name| name.strip_suffix(RECORD_SUFFIX))
            else {
                continue;
            };
            let Ok(pool) = PoolName::new(stem) else {
                continue;
            };

            match self.last_notified_at(&pool) {
                Ok(last_notified_at) => records.push(DebounceRecord {
                    pool,
                    last_notified_at,
                }),
                Err(e) => log::warn!("Skipping unreadable record: {}", e),
            }
        }

        records.sort_by(|a, b| a.pool.cmp(&b.pool));
        Ok(records)
    }

    fn clear(&self, pool: &PoolName) -> Result<bool, StateError> {
        match fs::remove_file(self.record_path(pool)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn lock(&self) -> Result<StoreLock, StateError> {
        let path = self.dir.join(LOCK_FILE);
        let lock_err = |source| StateError::Lock {
            path: path.display().to_string(),
            source,
        };

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(lock_err)?;

        // Poll rather than block, and give up at the deadline
        let deadline = Instant::now() + self.lock_timeout;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => break,
                Err(e) if Instant::now() >= deadline => return Err(lock_err(e)),
                Err(_) => thread::sleep(LOCK_RETRY_INTERVAL),
            }
        }

        log::debug!("Acquired state lock at {}", path.display());
        Ok(StoreLock::from_file(file))
    }
}
