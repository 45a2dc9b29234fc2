mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{FIRST_ID, FakeBackend};
use listing_model::{Attachment, FieldEdit, FormRecord, OpaqueId};
use listing_persistence::{
    AutoSaveConfig, CachedDraft, DRAFT_CACHE_KEY, DraftEngine, LocalCache, MemoryCache,
    SaveStatus,
};
use tokio::sync::broadcast;
use tokio::time::sleep;

type Engine = DraftEngine<FakeBackend, MemoryCache>;

fn setup() -> (Engine, Arc<FakeBackend>, MemoryCache) {
    setup_with(AutoSaveConfig::default(), MemoryCache::new())
}

fn setup_with(config: AutoSaveConfig, cache: MemoryCache) -> (Engine, Arc<FakeBackend>, MemoryCache) {
    let backend = Arc::new(FakeBackend::new());
    let engine = DraftEngine::new(Arc::clone(&backend), cache.clone(), config);
    (engine, backend, cache)
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn price(value: &str) -> FieldEdit {
    FieldEdit::Price(value.to_string())
}

fn drain(events: &mut broadcast::Receiver<SaveStatus>) -> Vec<SaveStatus> {
    let mut seen = Vec::new();
    while let Ok(status) = events.try_recv() {
        seen.push(status);
    }
    seen
}

#[tokio::test(start_paused = true)]
async fn price_edit_goes_through_full_status_cycle() {
    let (engine, backend, cache) = setup();
    let mut events = engine.subscribe();

    engine.set(price("500000"));
    assert_eq!(engine.status(), SaveStatus::Idle);

    sleep(ms(1999)).await;
    assert!(backend.upserts().is_empty());
    assert_eq!(engine.status(), SaveStatus::Idle);

    sleep(ms(2)).await;
    assert_eq!(engine.status(), SaveStatus::Saved);
    let cached = cache.get(DRAFT_CACHE_KEY).unwrap().unwrap();
    assert!(cached.contains(r#""price":"500000""#));
    assert!(cached.contains(&format!(r#""remoteId":{FIRST_ID}"#)));
    assert_eq!(backend.sent_ids(), vec![None]);
    assert_eq!(engine.remote_id(), Some(OpaqueId::new(FIRST_ID)));

    sleep(ms(2998)).await;
    assert_eq!(engine.status(), SaveStatus::Saved);
    sleep(ms(2)).await;
    assert_eq!(engine.status(), SaveStatus::Idle);

    assert_eq!(
        drain(&mut events),
        vec![SaveStatus::Idle, SaveStatus::Saving, SaveStatus::Saved, SaveStatus::Idle]
    );
}

#[tokio::test(start_paused = true)]
async fn rapid_edits_coalesce_into_one_save() {
    let (engine, backend, _cache) = setup();
    let mut events = engine.subscribe();

    engine.set(price("1"));
    sleep(ms(500)).await;
    engine.set(price("2"));
    sleep(ms(500)).await;
    engine.set(price("3"));

    sleep(ms(1999)).await;
    assert!(backend.upserts().is_empty());

    sleep(ms(2)).await;
    let upserts = backend.upserts();
    assert_eq!(upserts.len(), 1);
    assert_eq!(upserts[0].0.price, "3");

    let seen = drain(&mut events);
    let saving = seen.iter().filter(|s| **s == SaveStatus::Saving).count();
    assert_eq!(saving, 1);
    assert_eq!(
        seen,
        vec![
            SaveStatus::Idle,
            SaveStatus::Idle,
            SaveStatus::Idle,
            SaveStatus::Saving,
            SaveStatus::Saved,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn set_many_is_one_change() {
    let (engine, backend, _cache) = setup();
    let mut events = engine.subscribe();

    engine.set_many([FieldEdit::Title("Villa".to_string()), price("9")]);
    sleep(ms(2001)).await;

    let upserts = backend.upserts();
    assert_eq!(upserts.len(), 1);
    assert_eq!(upserts[0].0.title, "Villa");
    assert_eq!(upserts[0].0.price, "9");
    assert_eq!(
        drain(&mut events),
        vec![SaveStatus::Idle, SaveStatus::Saving, SaveStatus::Saved]
    );
}

#[tokio::test(start_paused = true)]
async fn concurrent_manual_saves_share_one_identity() {
    let (engine, backend, _cache) = setup();
    backend.set_latency(ms(300));
    engine.set(FieldEdit::Title("Flat".to_string()));

    let (first, second) = tokio::join!(engine.manual_save(), engine.manual_save());
    assert_eq!(first, SaveStatus::Saved);
    assert_eq!(second, SaveStatus::Saved);
    assert_eq!(backend.sent_ids(), vec![None, Some(FIRST_ID)]);
    assert_eq!(engine.remote_id(), Some(OpaqueId::new(FIRST_ID)));
}

#[tokio::test(start_paused = true)]
async fn manual_save_cancels_pending_auto_save() {
    let (engine, backend, _cache) = setup();
    engine.set(price("1"));
    sleep(ms(1000)).await;

    assert_eq!(engine.manual_save().await, SaveStatus::Saved);
    sleep(ms(5000)).await;
    assert_eq!(backend.upserts().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn manual_save_during_auto_save_carries_new_id() {
    let (engine, backend, _cache) = setup();
    backend.set_latency(ms(500));

    engine.set(price("1"));
    sleep(ms(2100)).await;
    assert_eq!(engine.status(), SaveStatus::Saving);

    assert_eq!(engine.manual_save().await, SaveStatus::Saved);
    assert_eq!(backend.sent_ids(), vec![None, Some(FIRST_ID)]);
}

#[tokio::test(start_paused = true)]
async fn identity_never_regresses() {
    let (engine, backend, _cache) = setup();
    backend.echo_id(false);

    engine.manual_save().await;
    engine.set(price("2"));
    engine.manual_save().await;

    assert_eq!(backend.sent_ids(), vec![None, Some(FIRST_ID)]);
    assert_eq!(engine.remote_id(), Some(OpaqueId::new(FIRST_ID)));
}

#[tokio::test(start_paused = true)]
async fn edit_during_save_triggers_follow_up_save() {
    let (engine, backend, _cache) = setup();
    backend.set_latency(ms(1000));

    engine.set(price("A"));
    sleep(ms(2500)).await;
    assert_eq!(engine.status(), SaveStatus::Saving);

    engine.set(price("B"));
    assert_eq!(engine.status(), SaveStatus::Idle);

    sleep(ms(600)).await;
    assert_eq!(engine.status(), SaveStatus::Saved);
    assert!(engine.is_dirty());

    sleep(ms(1500)).await;
    assert_eq!(engine.status(), SaveStatus::Saving);
    let upserts = backend.upserts();
    assert_eq!(upserts.len(), 2);
    assert_eq!(upserts[1].0.price, "B");
    assert_eq!(upserts[1].1, Some(OpaqueId::new(FIRST_ID)));

    sleep(ms(1000)).await;
    assert_eq!(engine.status(), SaveStatus::Saved);
    assert!(!engine.is_dirty());
}

#[tokio::test(start_paused = true)]
async fn newer_status_outlives_older_display_window() {
    let (engine, _backend, _cache) = setup();

    engine.set(price("1"));
    sleep(ms(3000)).await;
    assert_eq!(engine.status(), SaveStatus::Saved);

    engine.set(price("2"));
    assert_eq!(engine.status(), SaveStatus::Idle);

    // Second save completes at 5000; the first window also ends there.
    sleep(ms(2001)).await;
    assert_eq!(engine.status(), SaveStatus::Saved);
    sleep(ms(2998)).await;
    assert_eq!(engine.status(), SaveStatus::Saved);
    sleep(ms(2)).await;
    assert_eq!(engine.status(), SaveStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn remote_failure_reports_error_and_keeps_record() {
    let (engine, backend, cache) = setup();
    backend.fail_upserts(true);

    engine.set(price("42"));
    sleep(ms(2001)).await;

    assert_eq!(engine.status(), SaveStatus::Error);
    assert_eq!(engine.record().price, "42");
    assert_eq!(engine.remote_id(), None);
    assert!(engine.is_dirty());
    assert!(cache.get(DRAFT_CACHE_KEY).unwrap().is_some());

    sleep(ms(3000)).await;
    assert_eq!(engine.status(), SaveStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn local_cache_failure_still_saves_remotely() {
    let (engine, backend, cache) = setup_with(AutoSaveConfig::default(), MemoryCache::with_quota(16));

    engine.set(FieldEdit::Description("far too long for the tiny quota".to_string()));
    let status = engine.manual_save().await;

    assert_eq!(status, SaveStatus::Error);
    assert_eq!(backend.upserts().len(), 1);
    assert_eq!(engine.remote_id(), Some(OpaqueId::new(FIRST_ID)));
    assert_eq!(engine.record().description, "far too long for the tiny quota");
    assert_eq!(cache.get(DRAFT_CACHE_KEY).unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn publish_sends_attachments_and_clears_draft() {
    let (engine, backend, cache) = setup();
    engine.set_many([
        FieldEdit::Title("House".to_string()),
        FieldEdit::AddAttachment(Attachment::new("front.jpg", "image/jpeg", vec![1u8, 2, 3])),
    ]);
    engine.manual_save().await;
    assert!(cache.get(DRAFT_CACHE_KEY).unwrap().is_some());

    engine.publish().await.unwrap();

    let published = backend.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].title, "House");
    assert_eq!(published[0].attachments.len(), 1);
    assert_eq!(engine.remote_id(), None);
    assert_eq!(cache.get(DRAFT_CACHE_KEY).unwrap(), None);
    assert_eq!(engine.status(), SaveStatus::Idle);
    assert!(engine.publish_error().is_none());
}

#[tokio::test(start_paused = true)]
async fn publish_failure_keeps_draft_and_message() {
    let (engine, backend, cache) = setup();
    engine.set(price("1"));
    engine.manual_save().await;

    backend.fail_publish(true);
    assert!(engine.publish().await.is_err());

    let message = engine.publish_error().unwrap();
    assert!(message.contains("could not be published"));
    sleep(ms(10_000)).await;
    assert!(engine.publish_error().is_some());
    assert_eq!(engine.remote_id(), Some(OpaqueId::new(FIRST_ID)));
    assert!(cache.get(DRAFT_CACHE_KEY).unwrap().is_some());

    backend.fail_publish(false);
    engine.publish().await.unwrap();
    assert!(engine.publish_error().is_none());
}

#[tokio::test(start_paused = true)]
async fn publish_cancels_pending_auto_save() {
    let (engine, backend, _cache) = setup();
    engine.set(price("1"));
    engine.publish().await.unwrap();

    sleep(ms(5000)).await;
    assert!(backend.upserts().is_empty());
    assert_eq!(backend.published().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn resume_restores_record_and_identity() {
    let cache = MemoryCache::new();
    let record = FormRecord {
        price: "750000".to_string(),
        ..FormRecord::default()
    };
    let text = CachedDraft::new(record, Some(OpaqueId::new(42)))
        .encode()
        .unwrap();
    cache.put(DRAFT_CACHE_KEY, &text).unwrap();

    let (engine, backend, _cache) = setup_with(AutoSaveConfig::default(), cache);
    assert!(engine.resume());
    assert_eq!(engine.record().price, "750000");
    assert_eq!(engine.remote_id(), Some(OpaqueId::new(42)));

    engine.manual_save().await;
    assert_eq!(backend.sent_ids(), vec![Some(42)]);
}

#[tokio::test(start_paused = true)]
async fn resume_ignores_corrupt_cache() {
    let cache = MemoryCache::new();
    cache.put(DRAFT_CACHE_KEY, "{\"version\":").unwrap();

    let (engine, _backend, _cache) = setup_with(AutoSaveConfig::default(), cache);
    assert!(!engine.resume());
    assert_eq!(*engine.record(), FormRecord::default());
    assert_eq!(engine.remote_id(), None);
}

#[tokio::test(start_paused = true)]
async fn disabled_auto_save_only_saves_on_demand() {
    let (engine, backend, _cache) = setup_with(AutoSaveConfig::disabled(), MemoryCache::new());

    engine.set(price("1"));
    sleep(ms(10_000)).await;
    assert!(backend.upserts().is_empty());
    assert_eq!(engine.status(), SaveStatus::Idle);

    assert_eq!(engine.manual_save().await, SaveStatus::Saved);
    assert_eq!(backend.upserts().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn discard_starts_a_new_draft() {
    let (engine, backend, cache) = setup();
    engine.set(price("1"));
    engine.manual_save().await;

    engine.discard();
    assert_eq!(*engine.record(), FormRecord::default());
    assert_eq!(engine.remote_id(), None);
    assert_eq!(cache.get(DRAFT_CACHE_KEY).unwrap(), None);

    engine.set(price("2"));
    engine.manual_save().await;
    assert_eq!(backend.sent_ids(), vec![None, None]);
    assert_eq!(engine.remote_id(), Some(OpaqueId::new(FIRST_ID + 1)));
}

#[tokio::test(start_paused = true)]
async fn save_finishing_after_discard_is_dropped() {
    let (engine, backend, cache) = setup();
    backend.set_latency(ms(1000));
    engine.set(price("1"));

    let saving = tokio::spawn({
        let engine = engine.clone();
        async move { engine.manual_save().await }
    });
    sleep(ms(100)).await;
    assert!(engine.is_saving());

    engine.discard();
    assert_eq!(saving.await.unwrap(), SaveStatus::Idle);
    assert_eq!(engine.remote_id(), None);
    assert!(!engine.is_saving());
    assert_eq!(cache.get(DRAFT_CACHE_KEY).unwrap(), None);
}
