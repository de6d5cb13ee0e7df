//! Key/value storage backends
//!
//! All persisted state is a string stored under a [`StorageKey`]. The
//! [`KeyValueStore`] trait abstracts the substrate so the same collection
//! logic runs against files on disk or an in-memory map.

use std::collections::BTreeMap;

use super::error::StorageResult;
use super::keys::StorageKey;

/// A flat string key/value store
pub trait KeyValueStore {
    /// Read the value under `key`, or `None` if absent
    fn get(&self, key: &StorageKey) -> StorageResult<Option<String>>;

    /// Replace the value under `key`
    fn set(&mut self, key: &StorageKey, value: &str) -> StorageResult<()>;

    /// Delete `key`; deleting an absent key is not an error
    fn remove(&mut self, key: &StorageKey) -> StorageResult<()>;

    /// Check whether `key` holds a value
    fn contains(&self, key: &StorageKey) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Size in bytes of the value under `key`
    fn size_of(&self, key: &StorageKey) -> StorageResult<Option<u64>> {
        Ok(self.get(key)?.map(|v| v.len() as u64))
    }
}

/// In-memory backend
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<StorageKey, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all stored keys
    pub fn keys(&self) -> impl Iterator<Item = &StorageKey> {
        self.entries.keys()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &StorageKey) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &StorageKey, value: &str) -> StorageResult<()> {
        self.entries.insert(key.clone(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &StorageKey) -> StorageResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}
