//! Volatile Backend
//!
//! Process-memory hashmap, lost on restart.

use bytes::Bytes;
use hashbrown::HashMap;
use parking_lot::RwLock;

use super::Backend;
use crate::error::Result;

/// In-memory backend
///
/// Never fails. The inner lock only protects the map itself; ordering between
/// store operations is provided by the store's own lock.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    inner: RwLock<HashMap<String, Bytes>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn ensure_namespace(&self) -> Result<()> {
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Bytes>> {
        Ok(self.inner.read().get(key).cloned())
    }

    fn put(&self, key: &str, raw: Bytes) -> Result<()> {
        self.inner.write().insert(key.to_string(), raw);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.inner.write().remove(key).is_some())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.inner.read().len())
    }
}
