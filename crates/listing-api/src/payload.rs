//! Response payloads and their decoding.
//!
//! The backend is not consistent about envelopes: some endpoints answer
//! with a bare value, others wrap it in `{"data": ...}`. Both shapes are
//! accepted everywhere.

use listing_model::{OpaqueId, OptionRecord};
use serde::Deserialize;

use crate::error::Result;

/// Result of a draft upsert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DraftReceipt {
    /// Draft id assigned or confirmed by the backend, if it sent one.
    #[serde(default, alias = "draftId", alias = "draft_id")]
    pub id: Option<OpaqueId>,
}

impl DraftReceipt {
    /// A receipt confirming the given id.
    #[must_use]
    pub fn with_id(id: OpaqueId) -> Self {
        Self { id: Some(id) }
    }

    /// The id, ignoring an explicit `0`.
    #[must_use]
    pub fn assigned_id(&self) -> Option<OpaqueId> {
        self.id.and_then(OpaqueId::non_zero)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

/// Decode an option-list response body.
pub fn decode_options(body: &[u8]) -> Result<Vec<OptionRecord>> {
    let envelope: Envelope<Vec<OptionRecord>> = serde_json::from_slice(body)?;
    Ok(envelope.into_inner())
}

/// Decode a draft upsert response body.
///
/// An empty body is a valid receipt without an id.
pub fn decode_receipt(body: &[u8]) -> Result<DraftReceipt> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(DraftReceipt::default());
    }
    let envelope: Envelope<DraftReceipt> = serde_json::from_slice(body)?;
    Ok(envelope.into_inner())
}
