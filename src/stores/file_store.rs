use crate::core::error::StoreError;
use crate::stores::kv::KeyValueStore;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Persistent key-value store backed by a single JSON document
///
/// Every `set` rewrites the whole document through a temporary file and a
/// rename, so a crash leaves either the old or the new document on disk.
pub struct FileStore {
    entries: Mutex<BTreeMap<String, String>>,
    path: PathBuf,
}

impl FileStore {
    /// Open the store at `path`, creating it on first write if missing
    pub fn open(path: PathBuf) -> Result<Self> {
        let entries: BTreeMap<String, String> = if path.exists() {
            let content = fs::read_to_string(&path)
                .context(format!("Failed to read store file: {}", path.display()))?;

            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)
                    .context(format!("Store file is not a JSON object: {}", path.display()))?
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!(
            path = %path.display(),
            keys = entries.len(),
            "File store opened"
        );

        Ok(FileStore {
            entries: Mutex::new(entries),
            path,
        })
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // A panic while holding the lock cannot leave the map half-written
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let document =
            serde_json::to_string(entries).map_err(|e| StoreError::Serialize(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = temp_path(&self.path);
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(document.as_bytes())?;
        file.flush()?;
        file.sync_all()?;
        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }
}

/// Sibling of `path` with `.tmp` appended to the full file name
fn temp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.lock();

        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;

        *entries = next;
        Ok(())
    }
}
