//! Draft persistence for the property listing form.
//!
//! This crate keeps an in-progress listing safe while the user edits it:
//!
//! - **Debounced auto-save**: edits are coalesced and saved after a quiet
//!   period (2 seconds by default)
//! - **Two-layer storage**: a local durable cache first, then the remote
//!   draft store, which assigns a draft id on the first save
//! - **Status reporting**: `idle`, `saving`, `saved` and `error`, with the
//!   terminal statuses reverting to `idle` after a display window
//! - **Publishing**: final submission with attachments, clearing the draft
//!   on success
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use listing_api::{ApiSettings, ListingClient};
//! use listing_model::FieldEdit;
//! use listing_persistence::{AutoSaveConfig, DraftEngine, FileCache};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(ListingClient::new(ApiSettings::default())?);
//! let cache = FileCache::new(FileCache::default_dir());
//! let engine = DraftEngine::new(client, cache, AutoSaveConfig::default());
//!
//! engine.resume();
//! engine.set(FieldEdit::Price("500000".to_string()));
//! let status = engine.manual_save().await;
//! println!("{status}");
//! # Ok(())
//! # }
//! ```

pub mod autosave;
pub mod cache;
mod engine;
pub mod error;
mod identity;

pub use autosave::{AutoSaveConfig, SaveStatus, StatusTracker};
pub use cache::{
    CURRENT_CACHE_VERSION, CachedDraft, DRAFT_CACHE_KEY, FileCache, LocalCache, MemoryCache,
};
pub use engine::{DraftEngine, SaveTrigger};
pub use error::{LocalCacheError, PublishError, RemoteSaveError};
pub use identity::DraftIdentity;
