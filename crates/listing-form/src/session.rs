//! The form orchestrator: selectors and draft engine behind one facade.

use std::sync::Arc;

use listing_api::{DraftStore, ListingClient, OptionSource, PublishStore};
use listing_cascade::{CascadeSelector, TierState};
use listing_model::{CategoryTier, FieldEdit, FormRecord, LocationTier, OpaqueId, Tier};
use listing_persistence::{
    AutoSaveConfig, DraftEngine, FileCache, LocalCache, PublishError, SaveStatus,
};
use tokio::sync::broadcast;

use crate::error::Result;
use crate::settings::Settings;

/// Everything the form needs from the backend.
pub trait ListingBackend:
    OptionSource<LocationTier> + OptionSource<CategoryTier> + DraftStore + PublishStore
{
}

impl<B> ListingBackend for B where
    B: OptionSource<LocationTier> + OptionSource<CategoryTier> + DraftStore + PublishStore
{
}

/// One editing session of a listing.
///
/// Selector changes are mirrored into the draft record, so the record's
/// location and category ids always describe a consistent hierarchy.
/// Cloning is cheap and yields a handle to the same session.
pub struct FormSession<B, C> {
    engine: DraftEngine<B, C>,
    location: CascadeSelector<LocationTier, B>,
    category: CascadeSelector<CategoryTier, B>,
}

impl<B, C> Clone for FormSession<B, C> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            location: self.location.clone(),
            category: self.category.clone(),
        }
    }
}

impl FormSession<ListingClient, FileCache> {
    /// Build a session against the configured backend and cache directory.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = Arc::new(ListingClient::new(settings.api.clone())?);
        tracing::debug!(
            base_url = %settings.api.base_url,
            cache_dir = %settings.cache.resolved_dir().display(),
            "Creating form session"
        );
        Ok(Self::new(
            client,
            settings.cache.file_cache(),
            settings.autosave.clone(),
        ))
    }
}

impl<B, C> FormSession<B, C>
where
    B: ListingBackend,
    C: LocalCache,
{
    pub fn new(backend: Arc<B>, cache: C, autosave: AutoSaveConfig) -> Self {
        Self {
            engine: DraftEngine::new(Arc::clone(&backend), cache, autosave),
            location: CascadeSelector::with_source(Arc::clone(&backend)),
            category: CascadeSelector::with_source(backend),
        }
    }

    pub fn engine(&self) -> &DraftEngine<B, C> {
        &self.engine
    }

    pub fn location(&self) -> &CascadeSelector<LocationTier, B> {
        &self.location
    }

    pub fn category(&self) -> &CascadeSelector<CategoryTier, B> {
        &self.category
    }

    /// Resume a cached draft, or start empty.
    ///
    /// Either way the root option lists start loading; a resumed draft
    /// also reloads every tier below its restored selections. Returns
    /// whether a draft was resumed.
    pub fn resume(&self) -> bool {
        if self.engine.resume() {
            let record = self.engine.record();
            self.location.restore(&record.location_snapshot());
            self.category.restore(&record.category_snapshot());
            true
        } else {
            self.location.store().request(LocationTier::root(), None);
            self.category.store().request(CategoryTier::root(), None);
            false
        }
    }

    pub fn record(&self) -> Arc<FormRecord> {
        self.engine.record()
    }

    pub fn status(&self) -> SaveStatus {
        self.engine.status()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SaveStatus> {
        self.engine.subscribe()
    }

    pub fn publish_error(&self) -> Option<String> {
        self.engine.publish_error()
    }

    pub fn clear_publish_error(&self) {
        self.engine.clear_publish_error();
    }

    pub fn location_state(&self, tier: LocationTier) -> TierState {
        self.location.tier_state(tier)
    }

    pub fn category_state(&self, tier: CategoryTier) -> TierState {
        self.category.tier_state(tier)
    }

    /// Edit one field.
    ///
    /// Location and category ids should go through the `select_*`
    /// methods so the selectors stay in sync.
    pub fn set(&self, edit: FieldEdit) {
        self.engine.set(edit);
    }

    pub fn set_many(&self, edits: impl IntoIterator<Item = FieldEdit>) {
        self.engine.set_many(edits);
    }

    /// Select a location tier, clearing everything below it in both the
    /// selector and the record with a single edit.
    pub fn select_location(&self, tier: LocationTier, id: OpaqueId) {
        if tier.is_leaf() {
            self.select_locality_option(id);
            return;
        }
        if !self.location.select_tier(tier, id) {
            return;
        }

        let mut edits = vec![FieldEdit::location(tier, id)];
        edits.extend(
            tier.descendants()
                .iter()
                .map(|descendant| FieldEdit::location(*descendant, OpaqueId::UNSET)),
        );
        edits.push(FieldEdit::LocalityText(String::new()));
        self.engine.set_many(edits);
    }

    /// Pick a locality from the loaded list; the free text follows the
    /// option's name.
    pub fn select_locality_option(&self, id: OpaqueId) {
        if !self.location.select_leaf_option(id) {
            return;
        }
        self.engine.set_many([
            FieldEdit::LocalityId(id),
            FieldEdit::LocalityText(self.location.leaf_text()),
        ]);
    }

    /// Type a locality that is not in the list.
    pub fn set_locality_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.location.select_leaf_text(text.clone());
        self.engine.set_many([
            FieldEdit::LocalityId(OpaqueId::UNSET),
            FieldEdit::LocalityText(text),
        ]);
    }

    /// Select a category tier, clearing its sub-tiers.
    pub fn select_category(&self, tier: CategoryTier, id: OpaqueId) {
        if !self.category.select_tier(tier, id) {
            return;
        }

        let mut edits = vec![FieldEdit::category(tier, id)];
        edits.extend(
            tier.descendants()
                .iter()
                .map(|descendant| FieldEdit::category(*descendant, OpaqueId::UNSET)),
        );
        self.engine.set_many(edits);
    }

    pub async fn save_now(&self) -> SaveStatus {
        self.engine.manual_save().await
    }

    pub async fn publish(&self) -> std::result::Result<(), PublishError> {
        self.engine.publish().await
    }

    /// Throw the draft away and start over with empty selections.
    pub fn discard(&self) {
        self.engine.discard();
        self.location.select_tier(LocationTier::root(), OpaqueId::UNSET);
        self.category.select_tier(CategoryTier::root(), OpaqueId::UNSET);
    }

    /// Wait until every option load started so far has finished.
    pub async fn settled(&self) {
        self.location.settled().await;
        self.category.settled().await;
    }
}
