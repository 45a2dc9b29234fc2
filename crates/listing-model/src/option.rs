//! Selectable options returned by the option-list service.

use serde::{Deserialize, Serialize};

use crate::id::OpaqueId;

/// One entry of a tier's option list.
///
/// Lists are kept in server order and never re-sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionRecord {
    /// Identifier of the option.
    pub id: OpaqueId,
    /// Display name.
    pub name: String,
}

impl OptionRecord {
    /// Create a new option.
    pub fn new(id: impl Into<OpaqueId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
