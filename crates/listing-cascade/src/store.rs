//! Per-tier option cache with stale-response discarding.
//!
//! Every request is tagged with the parent id it was issued for and a
//! per-tier generation. A response is applied to the tier only while that
//! tag is still the tier's live tag; anything else is a stale response from
//! a superseded parent selection and is dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use listing_api::OptionSource;
use listing_model::{OpaqueId, OptionRecord, Tier};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{FetchError, Result};

/// Identity of one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RequestTag {
    parent: Option<OpaqueId>,
    generation: u64,
}

#[derive(Debug, Default)]
struct TierSlot {
    options: Vec<OptionRecord>,
    loading: bool,
    live: Option<RequestTag>,
    generation: u64,
}

#[derive(Debug)]
struct StoreState<T: Tier> {
    slots: Vec<TierSlot>,
    /// Successful responses by `(tier, parent)`.
    memo: HashMap<(T, Option<OpaqueId>), Vec<OptionRecord>>,
}

impl<T: Tier> StoreState<T> {
    fn slot(&self, tier: T) -> &TierSlot {
        &self.slots[tier.index()]
    }

    fn slot_mut(&mut self, tier: T) -> &mut TierSlot {
        &mut self.slots[tier.index()]
    }
}

struct StoreInner<T: Tier, S> {
    source: Arc<S>,
    state: Mutex<StoreState<T>>,
    /// Number of requests that have been issued but not finished.
    pending: watch::Sender<usize>,
}

impl<T: Tier, S> StoreInner<T, S> {
    fn lock(&self) -> MutexGuard<'_, StoreState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A request that reached the network.
///
/// Dropping it, whether after completion or because the awaiting task was
/// cancelled, releases the tier's loading flag if the request is still the
/// live one.
struct InFlight<T: Tier, S> {
    inner: Arc<StoreInner<T, S>>,
    tier: T,
    tag: RequestTag,
}

impl<T: Tier, S> Drop for InFlight<T, S> {
    fn drop(&mut self) {
        {
            let mut state = self.inner.lock();
            let slot = state.slot_mut(self.tier);
            if slot.live == Some(self.tag) {
                slot.loading = false;
            }
        }
        self.inner.pending.send_modify(|n| *n = n.saturating_sub(1));
    }
}

enum Ticket<T: Tier, S> {
    /// Served from the memo, already applied.
    Ready(Vec<OptionRecord>),
    /// Needs a call to the option source.
    Pending(InFlight<T, S>),
}

/// Option lists of every tier of one hierarchy.
///
/// Cloning is cheap and yields a handle to the same store.
pub struct TieredOptionStore<T: Tier, S> {
    inner: Arc<StoreInner<T, S>>,
}

impl<T: Tier, S> Clone for TieredOptionStore<T, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Tier, S: OptionSource<T>> TieredOptionStore<T, S> {
    /// Create an empty store backed by `source`.
    pub fn new(source: Arc<S>) -> Self {
        let (pending, _) = watch::channel(0);
        Self {
            inner: Arc::new(StoreInner {
                source,
                state: Mutex::new(StoreState {
                    slots: T::ALL.iter().map(|_| TierSlot::default()).collect(),
                    memo: HashMap::new(),
                }),
                pending,
            }),
        }
    }

    /// Load the options of `tier` for `parent` and apply them if still current.
    ///
    /// Returns the fetched list even when it arrived too late to be applied.
    pub async fn load(&self, tier: T, parent: Option<OpaqueId>) -> Result<Vec<OptionRecord>> {
        match self.begin(tier, parent)? {
            Ticket::Ready(options) => Ok(options),
            Ticket::Pending(flight) => self.complete(flight).await,
        }
    }

    /// Start a load on the runtime and return its handle.
    ///
    /// The tier is marked loading before this returns, so [`settled`]
    /// observes the request even if the task has not been polled yet.
    ///
    /// [`settled`]: TieredOptionStore::settled
    pub fn spawn_load(
        &self,
        tier: T,
        parent: Option<OpaqueId>,
    ) -> JoinHandle<Result<Vec<OptionRecord>>> {
        let ticket = self.begin(tier, parent);
        let store = self.clone();
        tokio::spawn(async move {
            match ticket? {
                Ticket::Ready(options) => Ok(options),
                Ticket::Pending(flight) => store.complete(flight).await,
            }
        })
    }

    /// Fire-and-forget variant of [`spawn_load`](TieredOptionStore::spawn_load).
    ///
    /// Failures are absorbed by the store and logged.
    pub fn request(&self, tier: T, parent: Option<OpaqueId>) {
        drop(self.spawn_load(tier, parent));
    }

    fn begin(&self, tier: T, parent: Option<OpaqueId>) -> Result<Ticket<T, S>> {
        if !tier.is_root() && !parent.is_some_and(OpaqueId::is_set) {
            return Err(FetchError::UnsetParent { tier: tier.label() });
        }

        let mut state = self.inner.lock();
        let cached = state.memo.get(&(tier, parent)).cloned();

        let slot = state.slot_mut(tier);
        slot.generation += 1;
        let tag = RequestTag {
            parent,
            generation: slot.generation,
        };
        slot.live = Some(tag);

        if let Some(options) = cached {
            tracing::debug!("Serving {} options for {:?} from cache", tier.label(), parent);
            slot.options.clone_from(&options);
            slot.loading = false;
            return Ok(Ticket::Ready(options));
        }

        slot.loading = true;
        drop(state);

        self.inner.pending.send_modify(|n| *n += 1);
        Ok(Ticket::Pending(InFlight {
            inner: Arc::clone(&self.inner),
            tier,
            tag,
        }))
    }

    async fn complete(&self, flight: InFlight<T, S>) -> Result<Vec<OptionRecord>> {
        let tier = flight.tier;
        let tag = flight.tag;
        let result = self.inner.source.fetch_options(tier, tag.parent).await;

        let mut state = self.inner.lock();
        let current = state.slot(tier).live == Some(tag);

        let outcome = match result {
            Ok(options) => {
                state.memo.insert((tier, tag.parent), options.clone());
                if current {
                    tracing::debug!(
                        "Loaded {} {} options for {:?}",
                        options.len(),
                        tier.label(),
                        tag.parent
                    );
                    let slot = state.slot_mut(tier);
                    slot.options.clone_from(&options);
                    slot.loading = false;
                } else {
                    tracing::debug!(
                        "Discarding stale {} options for {:?}",
                        tier.label(),
                        tag.parent
                    );
                }
                Ok(options)
            }
            Err(source) => {
                if current {
                    let slot = state.slot_mut(tier);
                    slot.options.clear();
                    slot.loading = false;
                }
                tracing::warn!(
                    "Failed to load {} options for {:?}: {}",
                    tier.label(),
                    tag.parent,
                    source
                );
                Err(FetchError::Api {
                    tier: tier.label(),
                    parent: tag.parent,
                    source,
                })
            }
        };

        drop(state);
        drop(flight);
        outcome
    }

    /// Clear a tier: no options, not loading, and any in-flight response
    /// for it becomes stale.
    pub fn reset(&self, tier: T) {
        let mut state = self.inner.lock();
        let slot = state.slot_mut(tier);
        slot.options.clear();
        slot.loading = false;
        slot.live = None;
    }

    /// Forget every memoised response.
    pub fn clear_cache(&self) {
        self.inner.lock().memo.clear();
    }

    /// Current options of a tier, in server order.
    pub fn options(&self, tier: T) -> Vec<OptionRecord> {
        self.inner.lock().slot(tier).options.clone()
    }

    /// Whether the tier's live request is outstanding.
    pub fn is_loading(&self, tier: T) -> bool {
        self.inner.lock().slot(tier).loading
    }

    /// Look up an option of a tier by id.
    pub fn find(&self, tier: T, id: OpaqueId) -> Option<OptionRecord> {
        self.inner
            .lock()
            .slot(tier)
            .options
            .iter()
            .find(|option| option.id == id)
            .cloned()
    }

    /// Number of requests issued but not yet finished.
    pub fn pending(&self) -> usize {
        *self.inner.pending.borrow()
    }

    /// Wait until no request is outstanding.
    pub async fn settled(&self) {
        let mut pending = self.inner.pending.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = pending.wait_for(|n| *n == 0).await;
    }
}
