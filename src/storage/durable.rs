//! Durable Backend
//!
//! Single-file redb database with one table (the bucket) of
//! key -> encoded entry. Every call runs in its own transaction; a write
//! transaction that hits an error is dropped, which aborts it.

use bytes::Bytes;
use redb::{
    Database, DatabaseError, ReadOnlyTable, ReadableTableMetadata, StorageError,
    Table, TableDefinition, TableError,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::Backend;
use crate::error::{Result, StoreError};

/// Poll interval while another handle holds the file lock
const OPEN_RETRY_INTERVAL: Duration = Duration::from_millis(25);

type Key = &'static str;
type Raw = &'static [u8];

/// On-disk backend, survives restarts
pub struct RedbBackend {
    db: Database,
    path: PathBuf,
    bucket: String,
}

impl std::fmt::Debug for RedbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbBackend")
            .field("path", &self.path)
            .field("bucket", &self.bucket)
            .finish()
    }
}

impl RedbBackend {
    /// Open or create the database file and bootstrap the bucket.
    ///
    /// If another handle holds the file, keeps trying for `open_timeout` and
    /// then fails with `BackendUnavailable` instead of hanging.
    pub fn open(
        path: impl AsRef<Path>,
        bucket: impl Into<String>,
        open_timeout: Duration,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let bucket = bucket.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::BackendUnavailable {
                path: path.clone(),
                source: DatabaseError::Storage(StorageError::Io(e)),
            })?;
        }

        let started = Instant::now();
        let db = loop {
            match Database::create(&path) {
                Ok(db) => break db,
                Err(DatabaseError::DatabaseAlreadyOpen) if started.elapsed() < open_timeout => {
                    thread::sleep(OPEN_RETRY_INTERVAL);
                }
                Err(source) => return Err(StoreError::BackendUnavailable { path, source }),
            }
        };

        let backend = Self { db, path, bucket };
        backend.ensure_namespace()?;
        info!(
            path = %backend.path.display(),
            bucket = %backend.bucket,
            "Opened durable store"
        );
        Ok(backend)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn table(&self) -> TableDefinition<'_, Key, Raw> {
        TableDefinition::new(&self.bucket)
    }

    fn read<T>(
        &self,
        f: impl FnOnce(&ReadOnlyTable<Key, Raw>) -> std::result::Result<T, redb::Error>,
    ) -> Result<T> {
        let txn = self.db.begin_read().map_err(redb::Error::from)?;
        let table = match txn.open_table(self.table()) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => {
                return Err(StoreError::MissingBucket {
                    bucket: self.bucket.clone(),
                })
            }
            Err(e) => return Err(redb::Error::from(e).into()),
        };
        Ok(f(&table)?)
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut Table<'_, Key, Raw>) -> std::result::Result<T, redb::Error>,
    ) -> Result<T> {
        let txn = self.db.begin_write().map_err(redb::Error::from)?;
        let out = {
            let mut table = txn.open_table(self.table()).map_err(redb::Error::from)?;
            f(&mut table)?
        };
        txn.commit().map_err(redb::Error::from)?;
        Ok(out)
    }
}

impl Backend for RedbBackend {
    fn name(&self) -> &'static str {
        "redb"
    }

    fn ensure_namespace(&self) -> Result<()> {
        // Opening a table inside a write transaction creates it if missing
        self.write(|_| Ok(()))?;
        debug!(bucket = %self.bucket, "Bucket ready");
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Bytes>> {
        self.read(|table| {
            Ok(table
                .get(key)?
                .map(|guard| Bytes::copy_from_slice(guard.value())))
        })
    }

    fn put(&self, key: &str, raw: Bytes) -> Result<()> {
        self.write(|table| {
            table.insert(key, raw.as_ref())?;
            Ok(())
        })
    }

    fn delete(&self, key: &str) -> Result<bool> {
        self.write(|table| Ok(table.remove(key)?.is_some()))
    }

    fn len(&self) -> Result<usize> {
        self.read(|table| Ok(table.len()? as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const TIMEOUT: Duration = Duration::from_secs(1);

    #[test]
    fn test_basic_operations() {
        let dir = tempdir().unwrap();
        let backend = RedbBackend::open(dir.path().join("store.redb"), "entries", TIMEOUT).unwrap();

        assert_eq!(backend.get("key").unwrap(), None);
        backend.put("key", Bytes::from_static(b"raw")).unwrap();
        assert_eq!(backend.get("key").unwrap(), Some(Bytes::from_static(b"raw")));
        assert_eq!(backend.len().unwrap(), 1);

        assert!(backend.delete("key").unwrap());
        assert!(!backend.delete("key").unwrap());
        assert!(backend.is_empty().unwrap());
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("store.redb");
        let backend = RedbBackend::open(&path, "entries", TIMEOUT).unwrap();
        assert_eq!(backend.path(), path.as_path());
        assert!(path.exists());
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.redb");

        {
            let backend = RedbBackend::open(&path, "entries", TIMEOUT).unwrap();
            backend.put("name1", Bytes::from_static(b"john")).unwrap();
        }

        let backend = RedbBackend::open(&path, "entries", TIMEOUT).unwrap();
        // Bootstrapping an existing bucket leaves its contents alone
        backend.ensure_namespace().unwrap();
        assert_eq!(backend.get("name1").unwrap(), Some(Bytes::from_static(b"john")));
    }

    #[test]
    fn test_buckets_are_isolated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.redb");

        {
            let backend = RedbBackend::open(&path, "first", TIMEOUT).unwrap();
            backend.put("key", Bytes::from_static(b"one")).unwrap();
        }

        let backend = RedbBackend::open(&path, "second", TIMEOUT).unwrap();
        assert_eq!(backend.bucket(), "second");
        assert_eq!(backend.get("key").unwrap(), None);
    }

    #[test]
    fn test_locked_file_times_out() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.redb");
        let _holder = RedbBackend::open(&path, "entries", TIMEOUT).unwrap();

        let timeout = Duration::from_millis(100);
        let started = Instant::now();
        let err = RedbBackend::open(&path, "entries", timeout).unwrap_err();

        assert!(matches!(err, StoreError::BackendUnavailable { .. }));
        assert!(started.elapsed() >= timeout);
    }
}
