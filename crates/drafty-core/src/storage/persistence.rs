//! File-backed key/value persistence
//!
//! Each storage key is one file under the data directory. Writes are
//! atomic (write to temp file, then rename) to prevent corruption.
//!
//! Storage location: `~/.local/share/drafty/` (configurable via `Config`)
//!
//! Files:
//! - `drafty-books-{uid}.json` and friends, one per collection and user
//! - `drafty-theme.json` and friends, one per global preference

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Config;

use super::backend::KeyValueStore;
use super::error::{StorageError, StorageResult};
use super::keys::StorageKey;

/// Key/value store backed by one file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed
    pub fn open(data_dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).map_err(|source| StorageError::CreateDirectory {
            path: data_dir.clone(),
            source,
        })?;
        Ok(Self { data_dir })
    }

    /// Open the store in the configured data directory
    pub fn from_config(config: &Config) -> StorageResult<Self> {
        Self::open(&config.data_dir)
    }

    /// Directory holding the stored files
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &StorageKey) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.data_dir.join(format!("{}.json", key.as_str())))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &StorageKey) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                Err(StorageError::PermissionDenied { path, source: e })
            }
            Err(e) => Err(StorageError::ReadError { path, source: e }),
        }
    }

    fn set(&mut self, key: &StorageKey, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        atomic_write(&path, value.as_bytes())?;
        debug!(key = %key, bytes = value.len(), "wrote storage key");
        Ok(())
    }

    fn remove(&mut self, key: &StorageKey) -> StorageResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::from_io(e, path)),
        }
    }

    fn contains(&self, key: &StorageKey) -> StorageResult<bool> {
        Ok(self.path_for(key)?.is_file())
    }

    fn size_of(&self, key: &StorageKey) -> StorageResult<Option<u64>> {
        let path = self.path_for(key)?;
        match fs::metadata(&path) {
            Ok(meta) => Ok(Some(meta.len())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadError { path, source: e }),
        }
    }
}

/// Reject keys that would escape the data directory or map to odd files
fn validate_key(key: &StorageKey) -> StorageResult<()> {
    let k = key.as_str();
    let bad = k.is_empty()
        || k.starts_with('.')
        || k.contains("..")
        || k.chars().any(|c| matches!(c, '/' | '\\' | ':' | '\0') || c.is_control());
    if bad {
        return Err(StorageError::InvalidKey { key: k.to_string() });
    }
    Ok(())
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// This ensures the target file is never left in a partially-written state.
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::keys::CollectionKind;
    use tempfile::TempDir;

    #[test]
    fn test_set_get_remove() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileStore::open(temp_dir.path()).unwrap();
        let key = StorageKey::user(CollectionKind::Books, "u1");

        assert!(store.get(&key).unwrap().is_none());
        assert!(!store.contains(&key).unwrap());

        store.set(&key, "[]").unwrap();
        assert_eq!(store.get(&key).unwrap().as_deref(), Some("[]"));
        assert!(store.contains(&key).unwrap());
        assert_eq!(store.size_of(&key).unwrap(), Some(2));
        assert!(temp_dir.path().join("drafty-books-u1.json").exists());

        store.remove(&key).unwrap();
        assert!(store.get(&key).unwrap().is_none());
        assert_eq!(store.size_of(&key).unwrap(), None);
        store.remove(&key).unwrap();
    }

    #[test]
    fn test_values_persist_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let key = StorageKey::global("theme");

        {
            let mut store = FileStore::open(temp_dir.path()).unwrap();
            store.set(&key, "latte").unwrap();
        }

        let store = FileStore::open(temp_dir.path()).unwrap();
        assert_eq!(store.get(&key).unwrap().as_deref(), Some("latte"));
    }

    #[test]
    fn test_overwrite_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileStore::open(temp_dir.path()).unwrap();
        let key = StorageKey::global("accent");

        store.set(&key, "#ff0000").unwrap();
        store.set(&key, "#00ff00").unwrap();

        assert_eq!(store.get(&key).unwrap().as_deref(), Some("#00ff00"));
        let entries: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["drafty-accent.json".to_string()]);
    }

    #[test]
    fn test_open_creates_nested_dir() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        let store = FileStore::open(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.data_dir(), nested.as_path());
    }

    #[test]
    fn test_invalid_keys_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileStore::open(temp_dir.path()).unwrap();

        for uid in ["../escape", "a/b", "a\\b"] {
            let key = StorageKey::user(CollectionKind::Books, uid);
            let err = store.set(&key, "[]").unwrap_err();
            assert!(matches!(err, StorageError::InvalidKey { .. }), "{}", uid);
        }
    }
}
