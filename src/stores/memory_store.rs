use crate::core::error::StoreError;
use crate::stores::kv::KeyValueStore;
use dashmap::DashMap;
use std::sync::Mutex;

/// In-memory key-value store
///
/// With a quota set, a write is rejected when the total size of all keys
/// and values after the write would exceed it. Quota-checked writes are
/// serialized so concurrent writers cannot jointly overshoot the quota.
pub struct MemoryStore {
    entries: DashMap<String, String>,
    quota_bytes: Option<usize>,
    write_lock: Mutex<()>,
}

impl MemoryStore {
    /// Create a new MemoryStore instance
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            quota_bytes: None,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: DashMap::new(),
            quota_bytes: Some(quota_bytes),
            write_lock: Mutex::new(()),
        }
    }

    /// Total bytes used by keys and values
    pub fn used_bytes(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| entry.key().len() + entry.value().len())
            .sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(quota) = self.quota_bytes {
            // Held until the insert below so the size check stays valid
            let _guard = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

            let existing = self
                .entries
                .get(key)
                .map(|entry| key.len() + entry.value().len())
                .unwrap_or(0);
            let needed = self.used_bytes().saturating_sub(existing) + key.len() + value.len();

            if needed > quota {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }

            self.entries.insert(key.to_string(), value.to_string());
            return Ok(());
        }

        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
