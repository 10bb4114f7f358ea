//! Backend Contract
//!
//! The storage medium behind an `ExpiringStore`. Every call is one bounded
//! transaction against the backend; the store never holds a transaction open
//! across calls.

use bytes::Bytes;

use crate::error::Result;

pub trait Backend: Send + Sync {
    /// Short name for logs ("memory", "redb")
    fn name(&self) -> &'static str;

    /// Make sure the namespace entries live in exists.
    ///
    /// Idempotent: calling it on an initialized backend is a no-op.
    fn ensure_namespace(&self) -> Result<()>;

    /// Raw encoded entry for `key`, `None` if absent
    fn get(&self, key: &str) -> Result<Option<Bytes>>;

    /// Insert or overwrite `key`
    fn put(&self, key: &str, raw: Bytes) -> Result<()>;

    /// Remove `key`, returns true if it was present
    fn delete(&self, key: &str) -> Result<bool>;

    /// Number of stored entries, expired ones included
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn ensure_namespace(&self) -> Result<()> {
        (**self).ensure_namespace()
    }

    fn get(&self, key: &str) -> Result<Option<Bytes>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, raw: Bytes) -> Result<()> {
        (**self).put(key, raw)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        (**self).delete(key)
    }

    fn len(&self) -> Result<usize> {
        (**self).len()
    }
}
