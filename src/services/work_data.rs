use crate::core::config::Config;
use crate::models::work::{NewWork, WorkData};
use crate::stores::blob::{read_user_works, write_user_works};
use crate::stores::kv::KeyValueStore;
use crate::utils::ids::work_id;
use crate::utils::latency::Latency;
use crate::utils::time::Clock;
use chrono::SubsecRound;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Per-user work records held in one shared work document
pub struct WorkDataService {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    latency: Latency,
    save_delay: Duration,
    load_delay: Duration,
    delete_delay: Duration,
    work_data_key: String,
}

impl WorkDataService {
    pub fn new(
        config: &Config,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        latency: Latency,
    ) -> Self {
        Self {
            store,
            clock,
            latency,
            save_delay: config.latency.save(),
            load_delay: config.latency.load(),
            delete_delay: config.latency.delete(),
            work_data_key: config.storage.work_data_key.clone(),
        }
    }

    /// Store a new work record for `username` and return it with its generated id and timestamp
    pub async fn save_work(&self, username: &str, work: NewWork) -> WorkData {
        self.latency.wait(self.save_delay).await;

        // Stored timestamps carry millisecond precision
        let saved_at = self.clock.now().trunc_subsecs(3);
        let id = work_id(&mut rand::rng(), saved_at.timestamp_millis());
        let saved = WorkData::from_new(work, id, saved_at);

        let mut works = read_user_works(self.store.as_ref(), &self.work_data_key, username);
        works.insert(saved.id.clone(), saved.clone());
        let count = works.len();
        write_user_works(self.store.as_ref(), &self.work_data_key, username, works);

        debug!(
            username = %username,
            work_id = %saved.id,
            name = %saved.name,
            works = count,
            "Work saved"
        );

        saved
    }

    /// All of `username`'s work records, most recently saved first
    ///
    /// Records saved within the same millisecond have no specified order
    /// relative to each other.
    pub async fn load_user_works(&self, username: &str) -> Vec<WorkData> {
        self.latency.wait(self.load_delay).await;

        let mut works: Vec<WorkData> =
            read_user_works(self.store.as_ref(), &self.work_data_key, username)
                .into_values()
                .collect();
        works.sort_by(|a, b| b.saved_at.cmp(&a.saved_at).then_with(|| b.id.cmp(&a.id)));

        debug!(username = %username, works = works.len(), "Works loaded");
        works
    }

    /// Remove one work record; unknown ids are ignored
    pub async fn delete_work(&self, username: &str, work_id: &str) {
        self.latency.wait(self.delete_delay).await;

        let mut works = read_user_works(self.store.as_ref(), &self.work_data_key, username);
        let removed = works.remove(work_id).is_some();
        write_user_works(self.store.as_ref(), &self.work_data_key, username, works);

        debug!(username = %username, work_id = %work_id, removed, "Work deleted");
    }
}
