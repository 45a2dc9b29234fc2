//! Application settings - persisted user preferences.
//!
//! Settings are loaded from disk at startup and saved when changed.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use listing_api::ApiSettings;
use listing_persistence::AutoSaveConfig;
use listing_persistence::cache::{DEFAULT_QUOTA_BYTES, FileCache};
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Application settings.
///
/// Serialized to TOML and stored in the user's config directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Backend connection.
    pub api: ApiSettings,

    /// Auto-save behavior.
    pub autosave: AutoSaveConfig,

    /// Local draft cache.
    pub cache: CacheSettings,
}

/// Where and how much the local draft cache may store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Cache directory; the platform data directory when unset.
    pub dir: Option<PathBuf>,

    /// Size limit of the cached draft in bytes.
    pub quota_bytes: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            dir: None,
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

impl CacheSettings {
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(FileCache::default_dir)
    }

    /// Build the file cache these settings describe.
    pub fn file_cache(&self) -> FileCache {
        FileCache::new(self.resolved_dir()).with_quota(self.quota_bytes)
    }
}

impl Settings {
    /// Load settings from the default path.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from a specific path.
    ///
    /// A missing or unreadable file yields the defaults.
    pub fn load_from(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("Using default settings ({}: {e})", path.display());
                return Self::default();
            }
        };

        toml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Ignoring invalid settings file {}: {e}", path.display());
            Self::default()
        })
    }

    /// Save settings to the default path.
    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&Self::config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SettingsError::Io {
                operation: "create directory for",
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        std::fs::write(path, content).map_err(|source| SettingsError::Io {
            operation: "write",
            path: path.to_path_buf(),
            source,
        })
    }

    /// Get the default config file path.
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "listing-form", "Listing Form")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
            .unwrap_or_else(|| PathBuf::from("settings.toml"))
    }
}
