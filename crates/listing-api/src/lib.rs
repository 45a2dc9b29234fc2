//! REST collaborators of the property listing form.
//!
//! The listing core talks to three backend services:
//!
//! - an **option-list service** returning `{id, name}` lists per tier, keyed
//!   by the parent tier's id ([`OptionSource`])
//! - a **draft store** that upserts the form record and assigns a draft id
//!   ([`DraftStore`])
//! - a **publish store** receiving the final record with all attachments
//!   ([`PublishStore`])
//!
//! [`ListingClient`] implements all three over HTTP with `reqwest`. Draft
//! and publish requests are sent as `multipart/form-data`: the record as a
//! JSON `payload` field, the draft id as `id`, and one `images[]` part per
//! attachment.

pub mod client;
pub mod config;
pub mod error;
pub mod payload;
pub mod traits;

pub use client::ListingClient;
pub use config::ApiSettings;
pub use error::{ApiError, Result};
pub use payload::{DraftReceipt, decode_options, decode_receipt};
pub use traits::{DraftStore, OptionSource, PublishStore};
