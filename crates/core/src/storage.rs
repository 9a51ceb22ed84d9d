//! Key/value persistence standing in for browser local storage.
//!
//! Values are opaque text (serialized JSON). Two backends:
//! - [`MemoryStorage`] - a mutex-guarded map, for tests and throwaway sessions
//! - [`FileStorage`] - one `<key>.json` file per key in a directory
//!
//! Writes replace the whole value. There is no versioning: two writers on
//! the same key race and the last write wins.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

/// Well-known storage keys.
pub mod keys {
    pub const CATALOG_BEATS: &str = "catalogBeats";
    pub const CATALOG_PACKS: &str = "catalogPacks";
    pub const CATALOG_PRESETS: &str = "catalogPresets";
    pub const CATALOG_MUSIC: &str = "catalogMusic";
    /// Unified list tagged by category.
    pub const CATALOG_PRODUCTS: &str = "catalogProducts";
    pub const CART: &str = "cart";
}

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// A string-keyed text store.
pub trait Storage {
    /// Read the raw value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: Storage + ?Sized> Storage for &T {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }
}

impl<T: Storage + ?Sized> Storage for Arc<T> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }
}

// =============================================================================
// In-memory backend
// =============================================================================

/// In-memory storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// =============================================================================
// File backend
// =============================================================================

/// Directory-backed storage, one `<key>.json` file per key.
///
/// ```text
/// root/
/// ├── catalogBeats.json
/// ├── catalogPacks.json
/// └── cart.json
/// ```
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Open storage rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Get the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_read_missing() {
        let storage = MemoryStorage::new();
        assert!(storage.read("cart").unwrap().is_none());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_memory_write_overwrites() {
        let storage = MemoryStorage::new();
        storage.write("cart", "[1]").unwrap();
        storage.write("cart", "[]").unwrap();
        assert_eq!(storage.read("cart").unwrap().as_deref(), Some("[]"));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_file_storage_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("store");
        let storage = FileStorage::open(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(storage.root(), root.as_path());
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        assert!(storage.read(keys::CART).unwrap().is_none());
        storage.write(keys::CART, "[]").unwrap();

        assert_eq!(storage.read(keys::CART).unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("cart.json").exists());
        assert!(!dir.path().join("cart.json.tmp").exists());
    }

    #[test]
    fn test_file_storage_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        for key in ["../escape", "a/b", "", "with space"] {
            assert!(matches!(
                storage.write(key, "x"),
                Err(StorageError::InvalidKey(_))
            ));
        }
    }

    #[test]
    fn test_storage_through_reference() {
        fn write_via<S: Storage>(storage: S) {
            storage.write("k", "v").unwrap();
        }

        let storage = MemoryStorage::new();
        write_via(&storage);
        assert_eq!(storage.read("k").unwrap().as_deref(), Some("v"));
    }
}
