//! EXPIREKV - Embedded Expiring Key-Value Store
//!
//! Every entry carries a time-to-live and is treated as absent once expired.
//! Expiry is lazy: it is detected, and the entry removed, when the key is next
//! read. Entries live either in process memory or in a single redb file.

pub mod config;
pub mod error;
pub mod metrics;
pub mod storage;

pub use config::{BackendKind, StoreConfig};
pub use error::{Result, StoreError};
pub use metrics::{StatsSnapshot, StoreStats};
pub use storage::{Backend, Entry, ExpiringStore, MemoryBackend, RedbBackend};
