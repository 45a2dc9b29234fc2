//! Persisted selections of a hierarchy.

use std::marker::PhantomData;

use crate::id::OpaqueId;
use crate::tier::Tier;

/// One selected id per tier plus the leaf's free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSnapshot<T: Tier> {
    ids: Vec<OpaqueId>,
    leaf_text: String,
    _tier: PhantomData<T>,
}

impl<T: Tier> Default for SelectionSnapshot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Tier> SelectionSnapshot<T> {
    /// A snapshot with every tier unset.
    pub fn new() -> Self {
        Self {
            ids: vec![OpaqueId::UNSET; T::ALL.len()],
            leaf_text: String::new(),
            _tier: PhantomData,
        }
    }

    /// Builder-style [`SelectionSnapshot::set`].
    #[must_use]
    pub fn with(mut self, tier: T, id: OpaqueId) -> Self {
        self.set(tier, id);
        self
    }

    /// Builder-style [`SelectionSnapshot::set_leaf_text`].
    #[must_use]
    pub fn with_leaf_text(mut self, text: impl Into<String>) -> Self {
        self.set_leaf_text(text);
        self
    }

    pub fn set(&mut self, tier: T, id: OpaqueId) {
        self.ids[tier.index()] = id;
    }

    pub fn set_leaf_text(&mut self, text: impl Into<String>) {
        self.leaf_text = text.into();
    }

    pub fn id(&self, tier: T) -> OpaqueId {
        self.ids[tier.index()]
    }

    pub fn leaf_text(&self) -> &str {
        &self.leaf_text
    }

    /// Whether no tier below an unset tier holds a selection.
    pub fn is_consistent(&self) -> bool {
        let mut parent_set = true;
        for id in &self.ids {
            if id.is_set() && !parent_set {
                return false;
            }
            parent_set = id.is_set();
        }
        true
    }
}
