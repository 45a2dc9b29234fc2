//! Auto-save functionality for drafts.
//!
//! Provides:
//! - `StatusTracker` - Save status with unsaved-edit tracking
//! - `AutoSaveConfig` - User settings for auto-save behavior

mod config;
mod tracker;

pub use config::AutoSaveConfig;
pub use tracker::{SaveStatus, StatusTracker};
