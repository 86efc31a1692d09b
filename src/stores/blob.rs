//! Whole-document JSON access over a [`KeyValueStore`].
//!
//! Reads never fail: a missing key or a malformed document reads as the
//! default value. Writes never fail either; errors are logged and dropped.

use crate::core::error::StoreError;
use crate::models::work::WorkData;
use crate::stores::kv::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{error, warn};

/// Credential map: username to password
pub type Credentials = HashMap<String, String>;

/// One user's work namespace: work id to record
pub type WorkNamespace = HashMap<String, WorkData>;

/// All work namespaces keyed by username, left undecoded
///
/// Only the namespace being read or written is decoded, so a bad entry under
/// one username never hides or blocks another user's works.
pub type WorkByUser = HashMap<String, Value>;

/// Read and decode the document under `key`
pub fn try_read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key) {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Read the document under `key`, falling back to the default when absent or corrupt
pub fn read_json<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    match try_read_json(store, key) {
        Ok(value) => value.unwrap_or_default(),
        Err(e) => {
            warn!(key = %key, error = %e, "Failed to parse stored document, treating as empty");
            T::default()
        }
    }
}

/// Encode and store `value` under `key`
pub fn try_write_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|e| StoreError::Serialize(e.to_string()))?;
    store.set(key, &raw)
}

/// Store `value` under `key`, logging and swallowing any failure
pub fn write_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    if let Err(e) = try_write_json(store, key, value) {
        error!(key = %key, error = %e, "Failed to write stored document, change dropped");
    }
}

/// Read one user's work namespace out of the global work document
///
/// Records that do not decode are skipped with a warning.
pub fn read_user_works(store: &dyn KeyValueStore, key: &str, username: &str) -> WorkNamespace {
    let mut all: WorkByUser = read_json(store, key);
    let records = match all.remove(username) {
        Some(Value::Object(records)) => records,
        Some(Value::Null) | None => return WorkNamespace::new(),
        Some(_) => {
            warn!(key = %key, username = %username, "Work namespace is not an object, treating as empty");
            return WorkNamespace::new();
        }
    };

    records
        .into_iter()
        .filter_map(|(id, record)| match serde_json::from_value::<WorkData>(record) {
            Ok(work) => Some((id, work)),
            Err(e) => {
                warn!(
                    key = %key,
                    username = %username,
                    work_id = %id,
                    error = %e,
                    "Skipping unreadable work record"
                );
                None
            }
        })
        .collect()
}

/// Replace one user's work namespace inside the global work document
///
/// Other users' entries are written back exactly as read. A global document
/// that is not a JSON object is left as is and the write is dropped.
pub fn write_user_works(
    store: &dyn KeyValueStore,
    key: &str,
    username: &str,
    works: WorkNamespace,
) {
    let mut all: WorkByUser = match try_read_json(store, key) {
        Ok(all) => all.unwrap_or_default(),
        Err(e) => {
            error!(
                key = %key,
                username = %username,
                error = %e,
                "Failed to save work data, stored document is unreadable"
            );
            return;
        }
    };

    let namespace = match serde_json::to_value(works) {
        Ok(namespace) => namespace,
        Err(e) => {
            error!(key = %key, username = %username, error = %e, "Failed to encode work data");
            return;
        }
    };
    all.insert(username.to_string(), namespace);
    write_json(store, key, &all);
}
