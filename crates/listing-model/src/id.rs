//! Server-assigned identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier assigned by the backend.
///
/// The value `0` is reserved: for a tier selection it means "nothing
/// selected", and for the leaf location tier it means "free-text mode".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OpaqueId(u64);

impl OpaqueId {
    /// The reserved "unset" sentinel.
    pub const UNSET: Self = Self(0);

    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Whether this id refers to an actual record.
    #[inline]
    #[must_use]
    pub const fn is_set(self) -> bool {
        self.0 != 0
    }

    /// `Some(self)` when set, `None` for the sentinel.
    #[must_use]
    pub const fn non_zero(self) -> Option<Self> {
        if self.is_set() { Some(self) } else { None }
    }
}

impl From<u64> for OpaqueId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for OpaqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
