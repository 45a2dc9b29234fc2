//! Auto-save configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for auto-save behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSaveConfig {
    /// Whether edits schedule a save automatically.
    ///
    /// Manual saves and publishing work either way.
    pub enabled: bool,

    /// Debounce delay in milliseconds.
    ///
    /// After an edit, the engine waits this long before saving.
    /// Additional edits restart the timer.
    pub debounce_ms: u64,

    /// How long a `saved` or `error` status stays visible before
    /// reverting to `idle`, in milliseconds.
    pub status_display_ms: u64,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 2000,       // 2 seconds
            status_display_ms: 3000, // 3 seconds
        }
    }
}

impl AutoSaveConfig {
    /// Create a disabled auto-save config.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Debounce delay as a duration.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Status display window as a duration.
    pub fn status_display(&self) -> Duration {
        Duration::from_millis(self.status_display_ms)
    }
}
