//! Session setup errors.

use std::path::PathBuf;

use listing_api::ApiError;
use thiserror::Error;

/// Settings file error.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to {operation} settings file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize settings")]
    Serialize(#[from] toml::ser::Error),
}

/// Failure to build a [`FormSession`](crate::FormSession).
#[derive(Debug, Error)]
pub enum FormError {
    #[error("Failed to create the backend client")]
    Client(#[from] ApiError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl FormError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Client(source) => {
                format!("The listing service is not configured correctly. {}", source.user_message())
            }
            Self::Settings(SettingsError::Io { path, .. }) => {
                format!("Could not access settings at {}.", path.display())
            }
            Self::Settings(SettingsError::Serialize(_)) => {
                "An error occurred while saving settings.".to_string()
            }
        }
    }
}

/// Result type alias for session setup.
pub type Result<T> = std::result::Result<T, FormError>;
