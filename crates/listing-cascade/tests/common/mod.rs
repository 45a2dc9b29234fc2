//! In-process option source with controllable responses.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use listing_api::{ApiError, OptionSource};
use listing_model::{OpaqueId, OptionRecord, Tier};
use tokio::sync::Notify;

type Key = (&'static str, Option<u64>);

#[derive(Default)]
pub struct FakeSource {
    lists: Mutex<HashMap<Key, Vec<OptionRecord>>>,
    gates: Mutex<HashMap<Key, Arc<Notify>>>,
    failing: Mutex<HashSet<Key>>,
    calls: Mutex<Vec<Key>>,
    /// Answer unknown keys with two options derived from the parent id.
    generate: bool,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generating() -> Self {
        Self {
            generate: true,
            ..Self::default()
        }
    }

    pub fn with_list(self, endpoint: &'static str, parent: Option<u64>, items: &[(u64, &str)]) -> Self {
        let options = items
            .iter()
            .map(|(id, name)| OptionRecord::new(*id, *name))
            .collect();
        self.lists.lock().unwrap().insert((endpoint, parent), options);
        self
    }

    /// Block responses for a key until the returned gate is notified.
    pub fn hold(&self, endpoint: &'static str, parent: Option<u64>) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert((endpoint, parent), Arc::clone(&gate));
        gate
    }

    pub fn fail(&self, endpoint: &'static str, parent: Option<u64>) {
        self.failing.lock().unwrap().insert((endpoint, parent));
    }

    pub fn calls(&self) -> Vec<Key> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, endpoint: &'static str, parent: Option<u64>) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|key| **key == (endpoint, parent))
            .count()
    }
}

impl<T: Tier> OptionSource<T> for FakeSource {
    async fn fetch_options(
        &self,
        tier: T,
        parent: Option<OpaqueId>,
    ) -> listing_api::Result<Vec<OptionRecord>> {
        let key = (tier.endpoint(), parent.map(OpaqueId::get));
        self.calls.lock().unwrap().push(key);

        let gate = self.gates.lock().unwrap().get(&key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.failing.lock().unwrap().contains(&key) {
            return Err(ApiError::Status {
                status: 500,
                body: "boom".to_string(),
            });
        }

        let known = self.lists.lock().unwrap().get(&key).cloned();
        Ok(known.unwrap_or_else(|| {
            if self.generate {
                let base = parent.map_or(0, OpaqueId::get) * 10;
                vec![
                    OptionRecord::new(base + 1, format!("{} {}", tier.label(), base + 1)),
                    OptionRecord::new(base + 2, format!("{} {}", tier.label(), base + 2)),
                ]
            } else {
                Vec::new()
            }
        }))
    }
}

/// Location data used across scenarios.
pub fn india_uae() -> FakeSource {
    FakeSource::new()
        .with_list("countries", None, &[(1, "India"), (2, "UAE")])
        .with_list("states", Some(1), &[(5, "Haryana"), (6, "Punjab")])
        .with_list("states", Some(2), &[(20, "Dubai"), (21, "Sharjah")])
        .with_list("cities", Some(5), &[(50, "Gurugram"), (51, "Faridabad")])
        .with_list("localities", Some(50), &[(500, "DLF Phase 1"), (501, "Sector 56")])
}

/// Let every runnable task make progress.
///
/// With a paused clock the runtime only advances time once all tasks are
/// idle, so a short sleep drains everything that is ready.
pub async fn drain() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
