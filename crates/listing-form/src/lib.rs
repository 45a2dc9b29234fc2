//! Property listing form session.
//!
//! [`FormSession`] ties the pieces together for one editing session:
//!
//! - a location selector (country, state, city, locality)
//! - a category selector (category, sub-category)
//! - a [`DraftEngine`](listing_persistence::DraftEngine) that auto-saves
//!   the record and publishes it
//!
//! Every selection is written to the draft record as a single edit, so one
//! user action never schedules more than one save.
//!
//! # Example
//!
//! ```no_run
//! use listing_form::{FormSession, Settings};
//! use listing_form::logging::{LogConfig, init_logging};
//! use listing_model::{LocationTier, OpaqueId};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! init_logging(&LogConfig::default())?;
//!
//! let session = FormSession::from_settings(&Settings::load())?;
//! session.resume();
//! session.settled().await;
//!
//! session.select_location(LocationTier::Country, OpaqueId::new(1));
//! session.save_now().await;
//! # Ok(())
//! # }
//! ```

mod error;
pub mod logging;
mod session;
mod settings;

pub use error::{FormError, Result, SettingsError};
pub use session::{FormSession, ListingBackend};
pub use settings::{CacheSettings, Settings};
