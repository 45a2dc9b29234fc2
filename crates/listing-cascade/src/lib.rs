//! Cascading hierarchical selection for the property listing form.
//!
//! Two components cooperate here:
//!
//! - [`TieredOptionStore`] caches the option list of every tier, keyed by
//!   the parent selection, and tracks a loading flag per tier. Responses
//!   that arrive after their parent selection was superseded are discarded.
//! - [`CascadeSelector`] holds the selected id of every tier (plus the
//!   leaf's free text) and keeps the hierarchy consistent: changing a tier
//!   resets all descendants and triggers the child's fetch.
//!
//! Both are instance-owned; a page or session constructs one selector per
//! hierarchy and hands clones to whoever needs to read it.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use listing_api::{ApiSettings, ListingClient};
//! use listing_cascade::CascadeSelector;
//! use listing_model::{LocationTier, OpaqueId};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(ListingClient::new(ApiSettings::default())?);
//! let location = CascadeSelector::<LocationTier, _>::with_source(client);
//!
//! location.load_roots().await??;
//! location.select_tier(LocationTier::Country, OpaqueId::new(1));
//! location.settled().await;
//! println!("{} states", location.tier_state(LocationTier::State).options.len());
//! # Ok(())
//! # }
//! ```

mod error;
mod selector;
mod store;

pub use error::{FetchError, Result};
pub use selector::{CascadeSelector, TierState};
pub use store::TieredOptionStore;
