//! Cascading selection across the tiers of one hierarchy.
//!
//! Invariant: no tier holds a selection or options while any of its
//! ancestors is unset. Every operation that changes a tier resets all of
//! its descendants before any fetch for the new selection starts.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use listing_api::OptionSource;
use listing_model::{OpaqueId, OptionRecord, SelectionSnapshot, Tier};
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::store::TieredOptionStore;

/// Observable state of one tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierState {
    pub selected_id: OpaqueId,
    /// Options in server order.
    pub options: Vec<OptionRecord>,
    pub loading: bool,
    /// Leaf tier only: the display/API value while `selected_id` is unset.
    pub free_text: Option<String>,
}

#[derive(Debug)]
struct Selection {
    ids: Vec<OpaqueId>,
    leaf_text: String,
}

/// Whether the tier's parent holds a selection; always true for the root.
fn parent_selected<T: Tier>(selection: &Selection, tier: T) -> bool {
    tier.parent()
        .is_none_or(|parent| selection.ids[parent.index()].is_set())
}

/// Selected ids of every tier, driving a [`TieredOptionStore`].
///
/// Cloning is cheap and yields a handle to the same selection.
pub struct CascadeSelector<T: Tier, S> {
    store: TieredOptionStore<T, S>,
    selection: Arc<Mutex<Selection>>,
}

impl<T: Tier, S> Clone for CascadeSelector<T, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            selection: Arc::clone(&self.selection),
        }
    }
}

impl<T: Tier, S: OptionSource<T>> CascadeSelector<T, S> {
    /// Create a selector with every tier unset.
    pub fn new(store: TieredOptionStore<T, S>) -> Self {
        Self {
            store,
            selection: Arc::new(Mutex::new(Selection {
                ids: vec![OpaqueId::UNSET; T::ALL.len()],
                leaf_text: String::new(),
            })),
        }
    }

    /// Create a selector with its own store over `source`.
    pub fn with_source(source: Arc<S>) -> Self {
        Self::new(TieredOptionStore::new(source))
    }

    /// The underlying option store.
    pub fn store(&self) -> &TieredOptionStore<T, S> {
        &self.store
    }

    fn lock(&self) -> MutexGuard<'_, Selection> {
        self.selection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start loading the root tier's options.
    pub fn load_roots(&self) -> JoinHandle<Result<Vec<OptionRecord>>> {
        self.store.spawn_load(T::root(), None)
    }

    /// Select `id` at `tier` and reset every descendant.
    ///
    /// When `id` is set, the immediate child's options start loading;
    /// grandchildren load only once their own parent gets selected.
    /// Selecting under an unset parent is ignored and returns `false`.
    ///
    /// The child request is issued under the selection lock, so requests
    /// reach the store in the same order as the selections they serve.
    pub fn select_tier(&self, tier: T, id: OpaqueId) -> bool {
        let mut selection = self.lock();
        if id.is_set() && !parent_selected(&selection, tier) {
            tracing::warn!("Ignoring {} selection {} without a parent", tier.label(), id);
            return false;
        }

        selection.ids[tier.index()] = id;
        for descendant in tier.descendants() {
            selection.ids[descendant.index()] = OpaqueId::UNSET;
            self.store.reset(*descendant);
        }
        if !tier.is_leaf() {
            selection.leaf_text.clear();
        }

        tracing::debug!("Selected {} {}", tier.label(), id);

        if let (Some(child), Some(parent)) = (tier.child(), id.non_zero()) {
            self.store.request(child, Some(parent));
        }
        true
    }

    /// Switch the leaf tier to free-text mode with `text`.
    pub fn select_leaf_text(&self, text: impl Into<String>) {
        let mut selection = self.lock();
        selection.ids[T::leaf().index()] = OpaqueId::UNSET;
        selection.leaf_text = text.into();
    }

    /// Select a leaf option; the free text mirrors the option's name.
    ///
    /// An id that is not (yet) among the loaded options is still recorded,
    /// leaving the free text untouched. Returns `false` if the selection
    /// was ignored because the leaf's parent is unset.
    pub fn select_leaf_option(&self, id: OpaqueId) -> bool {
        let matched = self.store.find(T::leaf(), id);
        let mut selection = self.lock();
        if id.is_set() && !parent_selected(&selection, T::leaf()) {
            tracing::warn!("Ignoring {} selection {} without a parent", T::leaf().label(), id);
            return false;
        }
        selection.ids[T::leaf().index()] = id;
        if let Some(option) = matched {
            selection.leaf_text = option.name;
        }
        true
    }

    /// Set every tier from a persisted snapshot, then reload each tier's
    /// options from its restored parent.
    ///
    /// No cascade reset is applied. A snapshot with a selection below an
    /// unset tier is truncated at the first unset tier.
    pub fn restore(&self, snapshot: &SelectionSnapshot<T>) {
        if !snapshot.is_consistent() {
            tracing::warn!("Restoring inconsistent selection snapshot; truncating at first unset tier");
        }

        let mut ids = Vec::with_capacity(T::ALL.len());
        let mut parent_set = true;
        for tier in T::ALL {
            let id = if parent_set {
                snapshot.id(*tier)
            } else {
                OpaqueId::UNSET
            };
            parent_set = id.is_set();
            ids.push(id);
        }

        let mut selection = self.lock();
        selection.ids.clone_from(&ids);
        selection.leaf_text = snapshot.leaf_text().to_string();

        // Lists loaded for the previous parents must not show while the
        // restored parents' lists are in flight.
        self.store.request(T::root(), None);
        for tier in T::ALL.iter().skip(1) {
            self.store.reset(*tier);
            if let Some(parent) = ids[tier.index() - 1].non_zero() {
                self.store.request(*tier, Some(parent));
            }
        }
    }

    /// Selected id of a tier.
    pub fn selected(&self, tier: T) -> OpaqueId {
        self.lock().ids[tier.index()]
    }

    /// Free text of the leaf tier.
    pub fn leaf_text(&self) -> String {
        self.lock().leaf_text.clone()
    }

    /// Full observable state of a tier.
    pub fn tier_state(&self, tier: T) -> TierState {
        let selection = self.lock();
        TierState {
            selected_id: selection.ids[tier.index()],
            options: self.store.options(tier),
            loading: self.store.is_loading(tier),
            free_text: tier.is_leaf().then(|| selection.leaf_text.clone()),
        }
    }

    /// Current selections as a snapshot.
    pub fn snapshot(&self) -> SelectionSnapshot<T> {
        let selection = self.lock();
        let mut snapshot = SelectionSnapshot::new().with_leaf_text(selection.leaf_text.clone());
        for tier in T::ALL {
            snapshot.set(*tier, selection.ids[tier.index()]);
        }
        snapshot
    }

    /// Wait until every option load started so far has finished.
    pub async fn settled(&self) {
        self.store.settled().await;
    }
}
