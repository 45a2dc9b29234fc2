//! Remote identity of the draft.

use listing_model::OpaqueId;

/// Server-assigned draft id, absent until the first successful save.
///
/// Once established, the id only changes through [`DraftIdentity::clear`]
/// (after publishing or discarding). A save response without an id never
/// takes an established id away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DraftIdentity {
    remote_id: Option<OpaqueId>,
}

impl DraftIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity restored from a cached draft.
    pub fn restored(remote_id: Option<OpaqueId>) -> Self {
        Self {
            remote_id: remote_id.filter(|id| id.is_set()),
        }
    }

    pub fn remote_id(&self) -> Option<OpaqueId> {
        self.remote_id
    }

    pub fn is_established(&self) -> bool {
        self.remote_id.is_some()
    }

    /// Adopt the id reported by a save response.
    ///
    /// Returns `true` if the stored id changed.
    pub fn establish(&mut self, reported: Option<OpaqueId>) -> bool {
        match reported.filter(|id| id.is_set()) {
            Some(id) if self.remote_id != Some(id) => {
                if let Some(previous) = self.remote_id {
                    tracing::warn!("Server reassigned draft id {previous} to {id}");
                }
                self.remote_id = Some(id);
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.remote_id = None;
    }
}
