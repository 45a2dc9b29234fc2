//! File-backed cache, one JSON file per key.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use super::{DEFAULT_QUOTA_BYTES, LocalCache};
use crate::error::{LocalCacheError, Result};

/// Cache that stores each key as `<dir>/<key>.json`.
///
/// Writes are atomic (temp file + rename), so a crash never leaves a
/// half-written draft behind.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
    quota: usize,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            quota: DEFAULT_QUOTA_BYTES,
        }
    }

    /// Limit the size of a single entry.
    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = quota;
        self
    }

    /// Platform data directory for cached drafts.
    ///
    /// Falls back to a relative `drafts` directory when no home
    /// directory can be determined.
    pub fn default_dir() -> PathBuf {
        ProjectDirs::from("com", "listing-form", "Listing Form")
            .map(|dirs| dirs.data_local_dir().join("drafts"))
            .unwrap_or_else(|| PathBuf::from("drafts"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(LocalCacheError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

/// Write `value` to `temp_path`, then rename it over `path`.
fn write_replacing(temp_path: &Path, path: &Path, value: &str) -> Result<()> {
    let mut file = File::create(temp_path).map_err(|e| LocalCacheError::Io {
        operation: "create",
        path: temp_path.to_path_buf(),
        source: e,
    })?;

    file.write_all(value.as_bytes())
        .map_err(|e| LocalCacheError::Io {
            operation: "write",
            path: temp_path.to_path_buf(),
            source: e,
        })?;

    file.sync_all().map_err(|e| LocalCacheError::Io {
        operation: "sync",
        path: temp_path.to_path_buf(),
        source: e,
    })?;

    fs::rename(temp_path, path).map_err(|e| LocalCacheError::AtomicWriteFailed {
        temp_path: temp_path.to_path_buf(),
        target_path: path.to_path_buf(),
        source: e,
    })
}

impl LocalCache for FileCache {
    fn put(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if value.len() > self.quota {
            return Err(LocalCacheError::QuotaExceeded {
                key: key.to_string(),
                size: value.len(),
                quota: self.quota,
            });
        }

        fs::create_dir_all(&self.dir).map_err(|e| LocalCacheError::Io {
            operation: "create directory",
            path: self.dir.clone(),
            source: e,
        })?;

        let temp_path = path.with_extension("json.tmp");
        if let Err(e) = write_replacing(&temp_path, &path, value) {
            // A partial temp file must not outlive a failed write.
            if let Err(cleanup) = fs::remove_file(&temp_path)
                && cleanup.kind() != ErrorKind::NotFound
            {
                tracing::warn!("Could not remove {}: {cleanup}", temp_path.display());
            }
            return Err(e);
        }

        tracing::trace!("Cached {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LocalCacheError::Io {
                operation: "read",
                path,
                source: e,
            }),
        }
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LocalCacheError::Io {
                operation: "remove",
                path,
                source: e,
            }),
        }
    }
}
