//! Option loading errors.

use listing_api::ApiError;
use listing_model::OpaqueId;
use thiserror::Error;

/// Failure to load the options of a tier.
///
/// The store has already absorbed the failure (the tier is no longer
/// loading and its list is empty) by the time a caller sees this value.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The option-list service call failed.
    #[error("failed to load {tier} options")]
    Api {
        tier: &'static str,
        parent: Option<OpaqueId>,
        #[source]
        source: ApiError,
    },

    /// A non-root tier was requested without a selected parent.
    #[error("cannot load {tier} options without a parent selection")]
    UnsetParent { tier: &'static str },
}

impl FetchError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { tier, source, .. } => {
                format!("Could not load the {tier} list. {}", source.user_message())
            }
            Self::UnsetParent { tier } => {
                format!("Select the level above before choosing a {tier}.")
            }
        }
    }
}

/// Result type alias for option loading.
pub type Result<T> = std::result::Result<T, FetchError>;
