//! Store Configuration

use std::path::PathBuf;
use std::time::Duration;

/// Which storage medium backs the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Process memory, lost on restart
    Memory,
    /// Single redb file
    #[default]
    Durable,
}

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Backend selection
    pub backend: BackendKind,

    /// Database file (durable backend only)
    pub path: PathBuf,

    /// Table entries are stored under (durable backend only)
    pub bucket: String,

    /// How long to wait for a file held by another process
    pub open_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Durable,
            path: PathBuf::from("./data/expirekv.redb"),
            bucket: "entries".to_string(),
            open_timeout: Duration::from_secs(1),
        }
    }
}

impl StoreConfig {
    /// Config for a volatile store
    pub fn memory() -> Self {
        Self::default().with_backend(BackendKind::Memory)
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    pub fn with_open_timeout(mut self, timeout: Duration) -> Self {
        self.open_timeout = timeout;
        self
    }
}
