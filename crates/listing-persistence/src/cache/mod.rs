//! Local durable cache for the in-progress draft.
//!
//! The draft is stored as a versioned JSON envelope under a single fixed
//! key. Attachments are never part of it.

mod file;
mod memory;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use listing_model::{FormRecord, OpaqueId};
use serde::{Deserialize, Serialize};

use crate::error::{LocalCacheError, Result};

pub use file::FileCache;
pub use memory::MemoryCache;

/// Key the draft is cached under.
pub const DRAFT_CACHE_KEY: &str = "property-listing-draft";

/// Current envelope version.
///
/// Increment this when making breaking changes to the cached format.
pub const CURRENT_CACHE_VERSION: u32 = 1;

/// Default size limit of a cache, in bytes.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Synchronous key/value store that survives restarts.
pub trait LocalCache: Send + Sync + 'static {
    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<C: LocalCache> LocalCache for Arc<C> {
    fn put(&self, key: &str, value: &str) -> Result<()> {
        (**self).put(key, value)
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// A draft as read back from the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedDraft {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<OpaqueId>,
    pub record: FormRecord,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CachedDraftRef<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    remote_id: Option<OpaqueId>,
    record: &'a FormRecord,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

impl CachedDraft {
    /// Envelope a record at the current version.
    pub fn new(record: FormRecord, remote_id: Option<OpaqueId>) -> Self {
        Self {
            version: CURRENT_CACHE_VERSION,
            saved_at: Utc::now(),
            remote_id,
            record,
        }
    }

    /// Serialize a record without taking ownership of it.
    pub fn encode_record(record: &FormRecord, remote_id: Option<OpaqueId>) -> Result<String> {
        let envelope = CachedDraftRef {
            version: CURRENT_CACHE_VERSION,
            saved_at: Utc::now(),
            remote_id,
            record,
        };
        serde_json::to_string(&envelope).map_err(|source| LocalCacheError::Serialization { source })
    }

    pub fn encode(&self) -> Result<String> {
        Self::encode_record(&self.record, self.remote_id)
    }

    /// Parse an envelope, rejecting versions newer than this build knows.
    pub fn decode(text: &str) -> Result<Self> {
        let probe: VersionProbe = serde_json::from_str(text)
            .map_err(|source| LocalCacheError::Deserialization { source })?;
        if probe.version > CURRENT_CACHE_VERSION {
            return Err(LocalCacheError::UnsupportedVersion {
                found: probe.version,
                max_supported: CURRENT_CACHE_VERSION,
            });
        }

        serde_json::from_str(text).map_err(|source| LocalCacheError::Deserialization { source })
    }
}

/// Read the cached draft. Missing or unreadable entries yield `None`.
pub fn read_cached_draft<C: LocalCache>(cache: &C) -> Option<CachedDraft> {
    let text = match cache.get(DRAFT_CACHE_KEY) {
        Ok(Some(text)) => text,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("Could not read cached draft: {e}");
            return None;
        }
    };

    match CachedDraft::decode(&text) {
        Ok(draft) => Some(draft),
        Err(e) => {
            tracing::warn!("Ignoring cached draft: {e}");
            None
        }
    }
}
