// Backend composition (store, clock, latency and both services)

use crate::core::config::{Config, StorageBackend};
use crate::services::auth::AuthService;
use crate::services::work_data::WorkDataService;
use crate::stores::file_store::FileStore;
use crate::stores::kv::KeyValueStore;
use crate::stores::memory_store::MemoryStore;
use crate::utils::latency::Latency;
use crate::utils::time::{Clock, SystemClock};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Shared backend state
///
/// Both services read and write the same store. All fields are wrapped in
/// Arc so the backend can be cloned into tasks.
#[derive(Clone)]
pub struct Backend {
    /// Account login and signup
    pub auth: Arc<AuthService>,

    /// Per-user work records
    pub works: Arc<WorkDataService>,

    /// Underlying key-value store
    pub store: Arc<dyn KeyValueStore>,
}

impl Backend {
    /// Build the store and services described by `config`
    pub fn from_config(config: Config) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = match config.storage.backend {
            StorageBackend::Memory => match config.storage.quota_bytes {
                Some(quota) => Arc::new(MemoryStore::with_quota(quota)),
                None => Arc::new(MemoryStore::new()),
            },
            StorageBackend::File => {
                let path = config
                    .storage
                    .path
                    .clone()
                    .context("storage.path must be set when the file backend is selected")?;
                Arc::new(
                    FileStore::open(path.clone())
                        .context(format!("Failed to open file store at {}", path.display()))?,
                )
            }
        };

        let latency = Latency::from_config(&config.latency);

        info!(
            backend = ?config.storage.backend,
            path = ?config.storage.path,
            latency_enabled = config.latency.enabled,
            "Backend initialized"
        );

        Ok(Self::with_parts(&config, store, Arc::new(SystemClock), latency))
    }

    /// Assemble a backend from explicit collaborators
    pub fn with_parts(
        config: &Config,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        latency: Latency,
    ) -> Self {
        let auth = AuthService::new(config, Arc::clone(&store), Arc::clone(&clock), latency.clone());
        let works = WorkDataService::new(config, Arc::clone(&store), clock, latency);

        Self {
            auth: Arc::new(auth),
            works: Arc::new(works),
            store,
        }
    }

    /// In-memory backend with no simulated latency
    pub fn in_memory() -> Self {
        Self::with_parts(
            &Config::default(),
            Arc::new(MemoryStore::new()),
            Arc::new(SystemClock),
            Latency::none(),
        )
    }
}
