//! Backend connection settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the listing backend lives and how to reach its endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL every path below is joined onto.
    pub base_url: String,

    /// Path of the draft upsert endpoint.
    pub draft_path: String,

    /// Path of the publish endpoint.
    pub publish_path: String,

    /// Prefix for option-list endpoints (`{options_path}/{tier endpoint}`).
    pub options_path: String,

    /// Query parameter carrying the parent id of an option-list request.
    pub parent_param: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/".to_string(),
            draft_path: "listings/draft".to_string(),
            publish_path: "listings".to_string(),
            options_path: "options".to_string(),
            parent_param: "parent_id".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiSettings {
    /// Settings pointing at a different backend, other fields default.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
