//! In-process draft and publish stores with controllable responses.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use listing_api::{ApiError, DraftReceipt, DraftStore, PublishStore};
use listing_model::{FormRecord, OpaqueId};

pub const FIRST_ID: u64 = 100;

pub struct FakeBackend {
    upserts: Mutex<Vec<(FormRecord, Option<OpaqueId>)>>,
    published: Mutex<Vec<FormRecord>>,
    next_id: AtomicU64,
    latency_ms: AtomicU64,
    fail_upserts: AtomicBool,
    fail_publish: AtomicBool,
    /// Whether updates of an existing draft report its id back.
    echo_id: AtomicBool,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            upserts: Mutex::new(Vec::new()),
            published: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(FIRST_ID),
            latency_ms: AtomicU64::new(0),
            fail_upserts: AtomicBool::new(false),
            fail_publish: AtomicBool::new(false),
            echo_id: AtomicBool::new(true),
        }
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn fail_upserts(&self, fail: bool) {
        self.fail_upserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_publish(&self, fail: bool) {
        self.fail_publish.store(fail, Ordering::SeqCst);
    }

    pub fn echo_id(&self, echo: bool) {
        self.echo_id.store(echo, Ordering::SeqCst);
    }

    pub fn upserts(&self) -> Vec<(FormRecord, Option<OpaqueId>)> {
        self.upserts.lock().unwrap().clone()
    }

    /// Ids sent with each upsert, in order.
    pub fn sent_ids(&self) -> Vec<Option<u64>> {
        self.upserts()
            .iter()
            .map(|(_, id)| id.map(OpaqueId::get))
            .collect()
    }

    pub fn published(&self) -> Vec<FormRecord> {
        self.published.lock().unwrap().clone()
    }

    async fn delay(&self) {
        let ms = self.latency_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    fn unavailable() -> ApiError {
        ApiError::Status {
            status: 503,
            body: "unavailable".to_string(),
        }
    }
}

impl DraftStore for FakeBackend {
    async fn upsert_draft(
        &self,
        record: &FormRecord,
        remote_id: Option<OpaqueId>,
    ) -> listing_api::Result<DraftReceipt> {
        self.upserts
            .lock()
            .unwrap()
            .push((record.clone(), remote_id));
        self.delay().await;

        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let id = match remote_id {
            Some(id) if self.echo_id.load(Ordering::SeqCst) => Some(id),
            Some(_) => None,
            None => Some(OpaqueId::new(self.next_id.fetch_add(1, Ordering::SeqCst))),
        };
        Ok(DraftReceipt { id })
    }
}

impl PublishStore for FakeBackend {
    async fn publish(&self, record: &FormRecord) -> listing_api::Result<()> {
        self.delay().await;
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.published.lock().unwrap().push(record.clone());
        Ok(())
    }
}
