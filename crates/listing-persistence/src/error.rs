//! Persistence error types.
//!
//! None of these errors reach the caller of an edit or a save: local cache
//! and remote save failures are absorbed into the save status. Only
//! [`PublishError`] is returned to the caller, and its message is kept for
//! display until the next publish attempt.

use std::path::PathBuf;

use listing_api::ApiError;
use thiserror::Error;

/// Local durable cache error.
#[derive(Debug, Error)]
pub enum LocalCacheError {
    /// File I/O error.
    #[error("Failed to {operation} cache file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The value does not fit the cache's size limit.
    #[error("Cache entry '{key}' of {size} bytes exceeds the {quota} byte quota")]
    QuotaExceeded {
        key: String,
        size: usize,
        quota: usize,
    },

    /// The key cannot be mapped to a storage location.
    #[error("Invalid cache key: {key}")]
    InvalidKey { key: String },

    /// Serialization error.
    #[error("Failed to serialize draft")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization error.
    #[error("Failed to deserialize cached draft")]
    Deserialization {
        #[source]
        source: serde_json::Error,
    },

    /// Cached draft written by a newer version.
    #[error("Cached draft version {found} is not supported (maximum: {max_supported})")]
    UnsupportedVersion { found: u32, max_supported: u32 },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to complete cache write")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LocalCacheError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io { operation, .. } => {
                format!("Could not {operation} the locally saved draft.")
            }
            Self::QuotaExceeded { .. } => {
                "Local storage is full, so the draft could not be saved on this device."
                    .to_string()
            }
            Self::InvalidKey { .. } | Self::Serialization { .. } => {
                "An error occurred while saving the draft on this device.".to_string()
            }
            Self::Deserialization { .. } | Self::UnsupportedVersion { .. } => {
                "The draft saved on this device could not be read and was ignored.".to_string()
            }
            Self::AtomicWriteFailed { target_path, .. } => {
                format!(
                    "Could not save the draft to {}. Please check disk space and permissions.",
                    target_path.display()
                )
            }
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::QuotaExceeded { .. } => {
                Some("Remove large attachments or clear old drafts to free up space.".into())
            }
            Self::Io { .. } | Self::AtomicWriteFailed { .. } => {
                Some("Free up disk space or check permissions of the data directory.".into())
            }
            Self::UnsupportedVersion { .. } => {
                Some("Update the application to continue this draft.".into())
            }
            Self::InvalidKey { .. } | Self::Serialization { .. } | Self::Deserialization { .. } => {
                None
            }
        }
    }
}

/// The remote draft store rejected or failed a save.
#[derive(Debug, Error)]
#[error("Failed to save draft to the server")]
pub struct RemoteSaveError {
    #[from]
    source: ApiError,
}

impl RemoteSaveError {
    /// The underlying backend error.
    pub fn api_error(&self) -> &ApiError {
        &self.source
    }

    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> &str {
        self.source.user_message()
    }
}

/// The final submission failed; the draft is left intact for a retry.
#[derive(Debug, Error)]
#[error("Failed to publish listing")]
pub struct PublishError {
    #[from]
    source: ApiError,
}

impl PublishError {
    /// The underlying backend error.
    pub fn api_error(&self) -> &ApiError {
        &self.source
    }

    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        format!(
            "Your listing could not be published. {}",
            self.source.user_message()
        )
    }
}

/// Result type alias for local cache operations.
pub type Result<T> = std::result::Result<T, LocalCacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_message_and_suggestion() {
        let err = LocalCacheError::QuotaExceeded {
            key: "draft".to_string(),
            size: 10,
            quota: 5,
        };
        assert!(err.user_message().contains("storage is full"));
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_publish_error_message_includes_cause() {
        let err = PublishError::from(ApiError::Network("reset".to_string()));
        let message = err.user_message();
        assert!(message.contains("could not be published"));
        assert!(message.contains("internet connection"));
    }
}
