//! # Cache Module
//!
//! Persists the last successful usage response so frequent statusline
//! refreshes don't hit the usage endpoint more than once per TTL.
//!
//! On disk the record is two parts: the capture time as epoch seconds on the
//! first line, then the response body exactly as received. Stale records are
//! never deleted; they remain the last-known-good fallback when a fetch fails.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Records younger than this many seconds are served without a network call.
pub const CACHE_TTL_SECONDS: i64 = 60;

/// The last successful response plus when it was captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRecord {
    pub captured_at: i64,
    pub payload: String,
}

impl CacheRecord {
    pub fn new(captured_at: i64, payload: impl Into<String>) -> Self {
        CacheRecord {
            captured_at,
            payload: payload.into(),
        }
    }

    pub fn age(&self, now: i64) -> i64 {
        now - self.captured_at
    }

    /// Serialized form: timestamp line followed by the raw payload.
    pub fn encode(&self) -> String {
        format!("{}\n{}", self.captured_at, self.payload)
    }

    /// Inverse of [`CacheRecord::encode`]. Anything without a leading integer
    /// timestamp line is rejected.
    pub fn decode(raw: &str) -> Option<Self> {
        let (ts, payload) = raw.split_once('\n')?;
        let captured_at = ts.trim().parse::<i64>().ok()?;
        Some(CacheRecord::new(captured_at, payload))
    }
}

/// Storage for the single usage record.
pub trait CacheStore {
    /// `None` when nothing (readable) has been stored.
    fn read(&self) -> Option<CacheRecord>;

    /// Replace the stored record. Readers must see either the old or the new
    /// record in full.
    fn write(&self, record: &CacheRecord) -> Result<()>;

    /// A record stamped in the future (clock stepped back) is stale, not fresh.
    fn is_fresh(&self, record: &CacheRecord, now: i64) -> bool {
        (0..CACHE_TTL_SECONDS).contains(&record.age(now))
    }
}

/// Record kept in a file at a fixed path, replaced via write-then-rename.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    path: PathBuf,
}

impl FileCacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileCacheStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }
}

impl CacheStore for FileCacheStore {
    fn read(&self) -> Option<CacheRecord> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let record = CacheRecord::decode(&raw);
        if record.is_none() {
            debug!(path = %self.path.display(), "ignoring malformed usage cache");
        }
        record
    }

    fn write(&self, record: &CacheRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create cache dir {}", parent.display()))?;
            }
        }
        let staging = self.staging_path();
        fs::write(&staging, record.encode())
            .with_context(|| format!("write {}", staging.display()))?;
        if let Err(e) = fs::rename(&staging, &self.path) {
            let _ = fs::remove_file(&staging);
            return Err(e).with_context(|| format!("replace {}", self.path.display()));
        }
        Ok(())
    }
}

/// In-process store, for callers that don't want anything on disk.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    record: Mutex<Option<CacheRecord>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: CacheRecord) -> Self {
        MemoryCacheStore {
            record: Mutex::new(Some(record)),
        }
    }
}

impl CacheStore for MemoryCacheStore {
    fn read(&self) -> Option<CacheRecord> {
        self.record.lock().ok()?.clone()
    }

    fn write(&self, record: &CacheRecord) -> Result<()> {
        let mut slot = self
            .record
            .lock()
            .map_err(|_| anyhow::anyhow!("usage cache lock poisoned"))?;
        *slot = Some(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freshness_boundary() {
        let store = MemoryCacheStore::new();
        let now = 1_700_000_000;
        assert!(store.is_fresh(&CacheRecord::new(now - 59, "{}"), now));
        assert!(!store.is_fresh(&CacheRecord::new(now - 60, "{}"), now));
        assert!(!store.is_fresh(&CacheRecord::new(now - 61, "{}"), now));
    }

    #[test]
    fn future_capture_time_is_stale() {
        let store = MemoryCacheStore::new();
        let now = 1_700_000_000;
        assert!(store.is_fresh(&CacheRecord::new(now, "{}"), now));
        assert!(!store.is_fresh(&CacheRecord::new(now + 1, "{}"), now));
        assert!(!store.is_fresh(&CacheRecord::new(now + 86_400, "{}"), now));
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCacheStore::new(dir.path().join("nested").join("usage.cache"));
        assert!(store.read().is_none());

        let body = "{\"five_hour\":{\"utilization\":12.0}}\n";
        store.write(&CacheRecord::new(1_700_000_123, body)).unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with("1700000123\n{\"five_hour\""));

        let back = store.read().unwrap();
        assert_eq!(back.captured_at, 1_700_000_123);
        assert_eq!(back.payload, body);
    }

    #[test]
    fn file_store_overwrites_and_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCacheStore::new(dir.path().join("usage.cache"));
        store.write(&CacheRecord::new(1, "old")).unwrap();
        store.write(&CacheRecord::new(2, "new")).unwrap();
        assert_eq!(store.read(), Some(CacheRecord::new(2, "new")));
        let files = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, 1);
    }

    #[test]
    fn malformed_file_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.cache");
        let store = FileCacheStore::new(&path);

        fs::write(&path, "not-a-timestamp\n{}").unwrap();
        assert!(store.read().is_none());
        fs::write(&path, "").unwrap();
        assert!(store.read().is_none());
        fs::write(&path, "1700000000").unwrap();
        assert!(store.read().is_none());
    }

    #[test]
    fn memory_store_replaces_record() {
        let store = MemoryCacheStore::with_record(CacheRecord::new(5, "a"));
        store.write(&CacheRecord::new(9, "b")).unwrap();
        assert_eq!(store.read(), Some(CacheRecord::new(9, "b")));
    }
}
