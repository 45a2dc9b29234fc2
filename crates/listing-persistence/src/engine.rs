//! Debounced draft persistence.
//!
//! [`DraftEngine`] owns the in-progress [`FormRecord`] and keeps it saved:
//!
//! 1. every edit restarts a debounce timer;
//! 2. when the timer fires (or on [`DraftEngine::manual_save`]) the record
//!    is written to the local cache, then upserted remotely, carrying the
//!    draft id once one was assigned;
//! 3. the resulting `saved` or `error` status is shown for a while, then
//!    reverts to `idle` unless something else happened meanwhile.
//!
//! Saves and publishes run one at a time, so a save always carries the id
//! assigned by any save that finished before it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use listing_api::{DraftStore, PublishStore};
use listing_model::{FieldEdit, FormRecord, OpaqueId};
use tokio::sync::{Mutex as AsyncMutex, broadcast};
use tokio::task::JoinHandle;

use crate::autosave::{AutoSaveConfig, SaveStatus, StatusTracker};
use crate::cache::{CachedDraft, DRAFT_CACHE_KEY, LocalCache, read_cached_draft};
use crate::error::{LocalCacheError, PublishError, RemoteSaveError};
use crate::identity::DraftIdentity;

const STATUS_CHANNEL_CAPACITY: usize = 64;

/// What started a save cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTrigger {
    Debounce,
    Manual,
}

struct PendingTimer {
    cycle: u64,
    handle: JoinHandle<()>,
}

struct EngineState {
    record: Arc<FormRecord>,
    identity: DraftIdentity,
    tracker: StatusTracker,
    timer: Option<PendingTimer>,
    next_cycle: u64,
    /// Bumped whenever the draft is discarded or published.
    epoch: u64,
    publish_error: Option<String>,
}

struct EngineInner<R, C> {
    config: AutoSaveConfig,
    backend: Arc<R>,
    cache: C,
    state: Mutex<EngineState>,
    io_lock: AsyncMutex<()>,
    status_tx: broadcast::Sender<SaveStatus>,
}

/// Draft persistence engine.
///
/// Cloning is cheap and yields a handle to the same draft. Timers run as
/// tokio tasks, so the engine must be used inside a tokio runtime.
pub struct DraftEngine<R, C> {
    inner: Arc<EngineInner<R, C>>,
}

impl<R, C> Clone for DraftEngine<R, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

fn cancel_timer(state: &mut EngineState) {
    if let Some(timer) = state.timer.take() {
        tracing::trace!("Cancelled save cycle {}", timer.cycle);
        timer.handle.abort();
    }
}

impl<R, C> DraftEngine<R, C>
where
    R: DraftStore + PublishStore,
    C: LocalCache,
{
    /// Create an engine holding an empty record.
    pub fn new(backend: Arc<R>, cache: C, config: AutoSaveConfig) -> Self {
        let (status_tx, _) = broadcast::channel(STATUS_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(EngineInner {
                config,
                backend,
                cache,
                state: Mutex::new(EngineState {
                    record: Arc::new(FormRecord::default()),
                    identity: DraftIdentity::new(),
                    tracker: StatusTracker::new(),
                    timer: None,
                    next_cycle: 0,
                    epoch: 0,
                    publish_error: None,
                }),
                io_lock: AsyncMutex::new(()),
                status_tx,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Broadcast a status. Called with the state lock held so receivers
    /// observe transitions in order.
    fn emit(&self, status: SaveStatus) {
        // No receivers is fine.
        let _ = self.inner.status_tx.send(status);
    }

    pub fn config(&self) -> &AutoSaveConfig {
        &self.inner.config
    }

    /// The current record.
    pub fn record(&self) -> Arc<FormRecord> {
        Arc::clone(&self.lock().record)
    }

    pub fn remote_id(&self) -> Option<OpaqueId> {
        self.lock().identity.remote_id()
    }

    pub fn status(&self) -> SaveStatus {
        self.lock().tracker.status()
    }

    /// Whether edits exist that no successful save covered yet.
    pub fn is_dirty(&self) -> bool {
        self.lock().tracker.is_dirty()
    }

    pub fn is_saving(&self) -> bool {
        self.lock().tracker.is_saving()
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.lock().tracker.last_saved()
    }

    /// Subscribe to status transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<SaveStatus> {
        self.inner.status_tx.subscribe()
    }

    /// Message of the last failed publish, kept until the next attempt.
    pub fn publish_error(&self) -> Option<String> {
        self.lock().publish_error.clone()
    }

    pub fn clear_publish_error(&self) {
        self.lock().publish_error = None;
    }

    /// Apply one edit and schedule an auto-save.
    pub fn set(&self, edit: FieldEdit) {
        self.set_many([edit]);
    }

    /// Apply several edits as one change: one new record, one debounce
    /// cycle.
    pub fn set_many(&self, edits: impl IntoIterator<Item = FieldEdit>) {
        let edits: Vec<FieldEdit> = edits.into_iter().collect();
        if edits.is_empty() {
            return;
        }
        let fields: Vec<&'static str> = edits.iter().map(FieldEdit::field_name).collect();

        let mut state = self.lock();
        state.record = Arc::new(state.record.with_edits(edits));
        cancel_timer(&mut state);
        state.tracker.mark_dirty();
        self.emit(SaveStatus::Idle);

        if self.inner.config.enabled {
            let cycle = state.next_cycle;
            state.next_cycle += 1;
            let handle = self.arm(cycle);
            state.timer = Some(PendingTimer { cycle, handle });
        }
        tracing::trace!(?fields, "Draft edited");
    }

    fn arm(&self, cycle: u64) -> JoinHandle<()> {
        let engine = self.clone();
        let delay = self.inner.config.debounce();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if engine.claim_timer(cycle) {
                engine.persist(SaveTrigger::Debounce).await;
            }
        })
    }

    /// Take ownership of the pending timer if it is still `cycle`.
    fn claim_timer(&self, cycle: u64) -> bool {
        let mut state = self.lock();
        if state.timer.as_ref().is_some_and(|timer| timer.cycle == cycle) {
            state.timer = None;
            true
        } else {
            false
        }
    }

    /// Save now, cancelling any pending auto-save.
    ///
    /// Failures are absorbed into the returned (and broadcast) status.
    pub async fn manual_save(&self) -> SaveStatus {
        cancel_timer(&mut self.lock());
        self.persist(SaveTrigger::Manual).await
    }

    async fn persist(&self, trigger: SaveTrigger) -> SaveStatus {
        let _io = self.inner.io_lock.lock().await;

        let (record, remote_id, covered, epoch) = {
            let mut state = self.lock();
            let covered = state.tracker.start_save();
            self.emit(SaveStatus::Saving);
            (
                Arc::clone(&state.record),
                state.identity.remote_id(),
                covered,
                state.epoch,
            )
        };
        tracing::debug!(?trigger, ?remote_id, "Saving draft");

        let local = self.write_local(&record, remote_id);
        if let Err(e) = &local {
            tracing::warn!("Could not cache draft locally: {e}");
        }

        let remote = self
            .inner
            .backend
            .upsert_draft(&record, remote_id)
            .await
            .map_err(RemoteSaveError::from);
        if let Err(e) = &remote {
            tracing::warn!("Could not save draft remotely: {}", e.api_error());
        }

        let mut state = self.lock();
        if state.epoch != epoch {
            tracing::debug!("Draft was replaced while saving; dropping the save result");
            state.tracker.abandon_save();
            return state.tracker.status();
        }

        let established = match &remote {
            Ok(receipt) => state.identity.establish(receipt.assigned_id()),
            Err(_) => false,
        };
        let current_id = state.identity.remote_id();

        let (status, generation) = if local.is_ok() && remote.is_ok() {
            (SaveStatus::Saved, state.tracker.save_complete(covered))
        } else {
            (SaveStatus::Error, state.tracker.save_failed())
        };
        self.emit(status);
        drop(state);

        if established {
            tracing::info!("Draft registered remotely as {:?}", current_id);
            if local.is_ok()
                && let Err(e) = self.write_local(&record, current_id)
            {
                tracing::warn!("Could not cache draft id locally: {e}");
            }
        }

        self.schedule_revert(generation);
        status
    }

    fn write_local(
        &self,
        record: &FormRecord,
        remote_id: Option<OpaqueId>,
    ) -> Result<(), LocalCacheError> {
        let text = CachedDraft::encode_record(record, remote_id)?;
        self.inner.cache.put(DRAFT_CACHE_KEY, &text)
    }

    fn schedule_revert(&self, generation: u64) {
        let engine = self.clone();
        let delay = self.inner.config.status_display();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut state = engine.lock();
            if state.tracker.revert(generation) {
                engine.emit(SaveStatus::Idle);
            }
        });
    }

    /// Submit the record with all attachments.
    ///
    /// A pending auto-save is cancelled and an in-flight save is waited
    /// for. On success the draft identity and the cached draft are
    /// cleared; on failure the draft is left intact and the error message
    /// is kept for [`DraftEngine::publish_error`].
    pub async fn publish(&self) -> Result<(), PublishError> {
        {
            let mut state = self.lock();
            cancel_timer(&mut state);
            state.publish_error = None;
        }

        let _io = self.inner.io_lock.lock().await;
        let record = self.record();
        tracing::debug!(attachments = record.attachments.len(), "Publishing listing");

        match self.inner.backend.publish(&record).await {
            Ok(()) => {
                {
                    let mut state = self.lock();
                    state.identity.clear();
                    state.tracker.reset();
                    state.epoch += 1;
                    self.emit(SaveStatus::Idle);
                }
                if let Err(e) = self.inner.cache.remove(DRAFT_CACHE_KEY) {
                    tracing::warn!("Could not clear cached draft: {e}");
                }
                tracing::info!("Listing published");
                Ok(())
            }
            Err(source) => {
                let error = PublishError::from(source);
                tracing::warn!("Publish failed: {}", error.api_error());
                self.lock().publish_error = Some(error.user_message());
                Err(error)
            }
        }
    }

    /// Restore the record and draft id from the local cache.
    ///
    /// Returns `false` (leaving the engine untouched) when nothing usable
    /// is cached. Attachments are never cached, so a resumed record has
    /// none.
    pub fn resume(&self) -> bool {
        let Some(draft) = read_cached_draft(&self.inner.cache) else {
            return false;
        };

        let mut state = self.lock();
        cancel_timer(&mut state);
        state.record = Arc::new(draft.record);
        state.identity = DraftIdentity::restored(draft.remote_id);
        tracing::info!(
            saved_at = %draft.saved_at,
            remote_id = ?state.identity.remote_id(),
            "Resumed cached draft"
        );
        true
    }

    /// Drop the draft: empty record, no identity, no cached copy.
    pub fn discard(&self) {
        {
            let mut state = self.lock();
            cancel_timer(&mut state);
            state.record = Arc::new(FormRecord::default());
            state.identity.clear();
            state.tracker.reset();
            state.epoch += 1;
            state.publish_error = None;
            self.emit(SaveStatus::Idle);
        }
        if let Err(e) = self.inner.cache.remove(DRAFT_CACHE_KEY) {
            tracing::warn!("Could not clear cached draft: {e}");
        }
        tracing::info!("Draft discarded");
    }
}
