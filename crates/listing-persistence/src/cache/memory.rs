//! In-memory cache, used in tests and when no durable storage is wanted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{DEFAULT_QUOTA_BYTES, LocalCache};
use crate::error::{LocalCacheError, Result};

/// Cache held in memory with a quota over the total size of all values.
///
/// Clones share the same entries.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    entries: Arc<Mutex<HashMap<String, String>>>,
    quota: usize,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_quota(DEFAULT_QUOTA_BYTES)
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            quota,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Total bytes currently stored.
    pub fn used_bytes(&self) -> usize {
        self.lock().values().map(String::len).sum()
    }
}

impl LocalCache for MemoryCache {
    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.lock();
        let others: usize = entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(_, v)| v.len())
            .sum();
        if others + value.len() > self.quota {
            return Err(LocalCacheError::QuotaExceeded {
                key: key.to_string(),
                size: value.len(),
                quota: self.quota.saturating_sub(others),
            });
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}
