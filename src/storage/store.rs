//! Expiring Key-Value Store
//!
//! TTL-aware Put/Get/Delete over any [`Backend`], serialized by one
//! store-wide reader/writer lock. Expiry is lazy: an expired entry stays in
//! the backend until a read or delete touches its key.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use super::{Backend, Clock, Entry, MemoryBackend, RedbBackend, SystemClock};
use crate::config::{BackendKind, StoreConfig};
use crate::error::{Result, StoreError};
use crate::metrics::{StatsSnapshot, StoreStats};

/// Key-value store whose entries expire after a per-entry TTL
///
/// `put` and `delete` hold the lock exclusively. `get` holds it shared for the
/// lookup and, when it finds an expired entry, releases it and takes it
/// exclusively for the removal. The two are never held at once.
pub struct ExpiringStore<B> {
    backend: B,
    lock: RwLock<()>,
    clock: Arc<dyn Clock>,
    stats: StoreStats,
}

impl ExpiringStore<MemoryBackend> {
    /// Create a volatile store
    pub fn memory() -> Self {
        Self::from_parts(MemoryBackend::new(), Arc::new(SystemClock))
    }
}

impl ExpiringStore<Box<dyn Backend>> {
    /// Build the backend named by `config` and bootstrap it.
    ///
    /// Fails with `BackendUnavailable` if the durable file cannot be opened
    /// within the configured timeout.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let backend: Box<dyn Backend> = match config.backend {
            BackendKind::Memory => Box::new(MemoryBackend::new()),
            BackendKind::Durable => Box::new(RedbBackend::open(
                &config.path,
                config.bucket.clone(),
                config.open_timeout,
            )?),
        };
        Self::new(backend)
    }
}

impl<B: Backend> ExpiringStore<B> {
    /// Wrap `backend`, making sure its namespace exists
    pub fn new(backend: B) -> Result<Self> {
        Self::with_clock(backend, Arc::new(SystemClock))
    }

    pub fn with_clock(backend: B, clock: Arc<dyn Clock>) -> Result<Self> {
        backend.ensure_namespace()?;
        debug!(backend = backend.name(), "Store ready");
        Ok(Self::from_parts(backend, clock))
    }

    fn from_parts(backend: B, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            lock: RwLock::new(()),
            clock,
            stats: StoreStats::new(),
        }
    }

    /// Store `value` under `key` for `ttl_secs` seconds, replacing any
    /// previous entry.
    ///
    /// A zero or negative TTL stores an entry that is already expired. An
    /// entry that cannot be encoded is rejected before the backend is touched.
    pub fn put(&self, key: &str, value: impl Into<String>, ttl_secs: i64) -> Result<()> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey("key must not be empty".to_string()));
        }
        let started = Instant::now();

        let result = {
            let _guard = self.lock.write();
            let entry = Entry::with_ttl(value, ttl_secs, self.clock.now());
            match entry.encode() {
                Ok(raw) => self.backend.put(key, raw),
                Err(e) => {
                    warn!(key, error = %e, "Failed to encode entry, write rejected");
                    Err(e)
                }
            }
        };

        if result.is_ok() {
            self.stats.record_put();
        }
        self.stats.record_latency(started.elapsed());
        result
    }

    /// Value stored under `key` if it has not expired.
    ///
    /// Returns `NotFound` on a miss and `Expired` when the entry is past its
    /// TTL; in the latter case the entry is removed before returning.
    pub fn get(&self, key: &str) -> Result<String> {
        let started = Instant::now();
        let result = self.lookup(key);
        self.stats.record_latency(started.elapsed());
        result
    }

    fn lookup(&self, key: &str) -> Result<String> {
        let raw = {
            let _guard = self.lock.read();
            self.backend.get(key)?
        };

        let Some(raw) = raw else {
            self.stats.record_miss();
            return Err(StoreError::not_found(key));
        };

        let entry = self.decode(key, &raw);
        if entry.is_live_at(self.clock.now()) {
            self.stats.record_hit();
            return Ok(entry.value);
        }

        self.stats.record_expired();
        self.expire(key)?;
        Err(StoreError::expired(key))
    }

    /// Remove `key` if it is still expired. Returns true if something was removed.
    ///
    /// Runs as its own critical section after the reader has let go of the
    /// shared lock, so the key may have been replaced or removed in between.
    fn expire(&self, key: &str) -> Result<bool> {
        let _guard = self.lock.write();

        let Some(raw) = self.backend.get(key)? else {
            return Ok(false);
        };
        let current = Entry::decode(&raw).unwrap_or_default();
        if current.is_live_at(self.clock.now()) {
            return Ok(false);
        }

        let removed = self.backend.delete(key)?;
        if removed {
            self.stats.record_lazy_removal();
            debug!(key, "Removed expired entry");
        }
        Ok(removed)
    }

    fn decode(&self, key: &str, raw: &[u8]) -> Entry {
        Entry::decode(raw).unwrap_or_else(|e| {
            self.stats.record_decode_failure();
            warn!(key, error = %e, "Failed to decode entry, treating as expired");
            Entry::default()
        })
    }

    /// Remove `key`, expired or not. Returns `NotFound` if it was absent.
    pub fn delete(&self, key: &str) -> Result<()> {
        let started = Instant::now();

        let result = {
            let _guard = self.lock.write();
            self.backend.delete(key)
        };

        self.stats.record_latency(started.elapsed());
        match result? {
            true => {
                self.stats.record_delete();
                Ok(())
            }
            false => Err(StoreError::not_found(key)),
        }
    }

    /// Check if `key` holds a live entry. Same side effects as [`get`](Self::get).
    pub fn contains(&self, key: &str) -> Result<bool> {
        match self.get(key) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Number of stored entries, including expired ones not yet removed
    pub fn len(&self) -> Result<usize> {
        let _guard = self.lock.read();
        self.backend.len()
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn stats(&self) -> &StoreStats {
        &self.stats
    }

    pub fn stats_snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Underlying backend, for raw inspection
    pub fn backend(&self) -> &B {
        &self.backend
    }
}
