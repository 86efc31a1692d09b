use crate::core::error::StoreError;

/// Synchronous string-keyed storage shared by both services
///
/// Implementations hold whole JSON documents per key; callers always read
/// and write a key's full value.
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`, if any
    fn get(&self, key: &str) -> Option<String>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
