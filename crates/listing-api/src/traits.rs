//! Contracts of the backend collaborators.
//!
//! The form core only depends on these traits; [`ListingClient`] is the
//! HTTP implementation and tests substitute in-process fakes.
//!
//! [`ListingClient`]: crate::ListingClient

use std::future::Future;

use listing_model::{FormRecord, OpaqueId, OptionRecord, Tier};

use crate::error::Result;
use crate::payload::DraftReceipt;

/// Option-list service: one list per tier, keyed by the parent's id.
pub trait OptionSource<T: Tier>: Send + Sync + 'static {
    /// Fetch the options of `tier`.
    ///
    /// `parent` is `None` only for the root tier. Callers never pass an
    /// unset parent id.
    fn fetch_options(
        &self,
        tier: T,
        parent: Option<OpaqueId>,
    ) -> impl Future<Output = Result<Vec<OptionRecord>>> + Send;
}

/// Remote draft store.
pub trait DraftStore: Send + Sync + 'static {
    /// Create or update a draft.
    ///
    /// With `remote_id` present the backend updates that draft in place;
    /// without it a new draft is created. The receipt carries the
    /// (possibly newly assigned) draft id.
    fn upsert_draft(
        &self,
        record: &FormRecord,
        remote_id: Option<OpaqueId>,
    ) -> impl Future<Output = Result<DraftReceipt>> + Send;
}

/// Final submission of a listing.
pub trait PublishStore: Send + Sync + 'static {
    /// Publish the complete record including every attachment.
    fn publish(&self, record: &FormRecord) -> impl Future<Output = Result<()>> + Send;
}
