//! In-process backend serving option lists and recording drafts.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use listing_api::{ApiError, DraftReceipt, DraftStore, OptionSource, PublishStore};
use listing_model::{FormRecord, OpaqueId, OptionRecord, Tier};

type Key = (&'static str, Option<u64>);

pub struct FakeBackend {
    lists: HashMap<Key, Vec<OptionRecord>>,
    fetches: Mutex<Vec<Key>>,
    upserts: Mutex<Vec<(FormRecord, Option<OpaqueId>)>>,
    published: Mutex<Vec<FormRecord>>,
    next_id: AtomicU64,
}

impl FakeBackend {
    /// Locations: India (1) and UAE (2) with a few levels below India;
    /// categories: Residential (1) and Commercial (2).
    pub fn seeded() -> Self {
        let mut lists = HashMap::new();
        let mut add = |endpoint: &'static str, parent: Option<u64>, items: &[(u64, &str)]| {
            let options = items
                .iter()
                .map(|(id, name)| OptionRecord::new(*id, *name))
                .collect();
            lists.insert((endpoint, parent), options);
        };
        add("countries", None, &[(1, "India"), (2, "UAE")]);
        add("states", Some(1), &[(5, "Haryana"), (6, "Punjab")]);
        add("states", Some(2), &[(20, "Dubai")]);
        add("cities", Some(5), &[(50, "Gurugram")]);
        add("localities", Some(50), &[(500, "DLF Phase 1"), (501, "Sector 56")]);
        add("categories", None, &[(1, "Residential"), (2, "Commercial")]);
        add("sub-categories", Some(1), &[(11, "Apartment"), (12, "Villa")]);
        add("sub-categories", Some(2), &[(21, "Office")]);

        Self {
            lists,
            fetches: Mutex::new(Vec::new()),
            upserts: Mutex::new(Vec::new()),
            published: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(100),
        }
    }

    pub fn fetches(&self) -> Vec<Key> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn upserts(&self) -> Vec<(FormRecord, Option<OpaqueId>)> {
        self.upserts.lock().unwrap().clone()
    }

    pub fn published(&self) -> Vec<FormRecord> {
        self.published.lock().unwrap().clone()
    }
}

impl<T: Tier> OptionSource<T> for FakeBackend {
    async fn fetch_options(
        &self,
        tier: T,
        parent: Option<OpaqueId>,
    ) -> listing_api::Result<Vec<OptionRecord>> {
        let key = (tier.endpoint(), parent.map(OpaqueId::get));
        self.fetches.lock().unwrap().push(key);
        tokio::task::yield_now().await;
        self.lists.get(&key).cloned().ok_or_else(|| ApiError::Status {
            status: 404,
            body: "not found".to_string(),
        })
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
        let id = remote_id
            .unwrap_or_else(|| OpaqueId::new(self.next_id.fetch_add(1, Ordering::SeqCst)));
        Ok(DraftReceipt { id: Some(id) })
    }
}

impl PublishStore for FakeBackend {
    async fn publish(&self, record: &FormRecord) -> listing_api::Result<()> {
        self.published.lock().unwrap().push(record.clone());
        Ok(())
    }
}
