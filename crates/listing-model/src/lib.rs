//! Core data types for the property listing form.
//!
//! This crate defines the vocabulary shared by every other listing crate:
//!
//! - [`OpaqueId`] - server-assigned identifiers, with `0` reserved as "unset"
//! - [`Tier`] - an ordered selection hierarchy ([`LocationTier`], [`CategoryTier`])
//! - [`OptionRecord`] - one selectable entry of a tier
//! - [`FormRecord`] - the full mutable field set of a listing
//! - [`FieldEdit`] - a typed mutation of exactly one [`FormRecord`] field
//! - [`SelectionSnapshot`] - persisted ids of every tier in a hierarchy
//!
//! The types here carry no I/O and no async machinery; they are plain
//! serde-serializable values.

mod edit;
mod id;
mod option;
mod record;
mod snapshot;
mod tier;

pub use edit::FieldEdit;
pub use id::OpaqueId;
pub use option::OptionRecord;
pub use record::{Attachment, FormRecord, ListingPurpose};
pub use snapshot::SelectionSnapshot;
pub use tier::{CategoryTier, LocationTier, Tier};
