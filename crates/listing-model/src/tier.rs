//! Selection hierarchies.
//!
//! A hierarchy is an ordered sequence of tiers where every non-root tier has
//! exactly one parent. Options of a tier are always fetched for the id that
//! is selected in its parent.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// One level of an ordered selection hierarchy.
///
/// Implementors only provide the ordered tier list, their own position and
/// the naming data; navigation is derived from the ordering.
pub trait Tier: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Every tier of the hierarchy, root first.
    const ALL: &'static [Self];

    /// Position of this tier in [`Tier::ALL`].
    fn index(self) -> usize;

    /// Human-readable label.
    fn label(self) -> &'static str;

    /// Path segment of the option-list service for this tier.
    fn endpoint(self) -> &'static str;

    /// The first tier of the hierarchy.
    fn root() -> Self {
        Self::ALL[0]
    }

    /// The last tier of the hierarchy.
    fn leaf() -> Self {
        Self::ALL[Self::ALL.len() - 1]
    }

    /// The tier directly above this one.
    fn parent(self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    /// The tier directly below this one.
    fn child(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// All tiers below this one, nearest first.
    fn descendants(self) -> &'static [Self] {
        &Self::ALL[self.index() + 1..]
    }

    #[inline]
    fn is_root(self) -> bool {
        self.index() == 0
    }

    #[inline]
    fn is_leaf(self) -> bool {
        self.index() + 1 == Self::ALL.len()
    }
}

/// Country, State, City, Locality.
///
/// The locality tier accepts free text when no option matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationTier {
    Country,
    State,
    City,
    Locality,
}

impl Tier for LocationTier {
    const ALL: &'static [Self] = &[Self::Country, Self::State, Self::City, Self::Locality];

    fn index(self) -> usize {
        self as usize
    }

    fn label(self) -> &'static str {
        match self {
            Self::Country => "country",
            Self::State => "state",
            Self::City => "city",
            Self::Locality => "locality",
        }
    }

    fn endpoint(self) -> &'static str {
        match self {
            Self::Country => "countries",
            Self::State => "states",
            Self::City => "cities",
            Self::Locality => "localities",
        }
    }
}

impl fmt::Display for LocationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Category and sub-category of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryTier {
    Category,
    SubCategory,
}

impl Tier for CategoryTier {
    const ALL: &'static [Self] = &[Self::Category, Self::SubCategory];

    fn index(self) -> usize {
        self as usize
    }

    fn label(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::SubCategory => "sub-category",
        }
    }

    fn endpoint(self) -> &'static str {
        match self {
            Self::Category => "categories",
            Self::SubCategory => "sub-categories",
        }
    }
}

impl fmt::Display for CategoryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
