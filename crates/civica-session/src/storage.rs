//! Durable key/value storage backends.
//!
//! This module defines the trait that decouples the session store and the
//! TTL cache from a specific storage medium. Keys are short stable
//! strings; values are JSON-encoded strings. Only the session store
//! writes the session keys and only the cache writes cache keys, so no
//! cross-component coordination is needed beyond each backend's own lock.

use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::RwLock;
use tracing::trace;

use crate::error::{Error, Result};

/// Trait for durable key/value backends.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Returns `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, overwriting any prior one.
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// File-backed store: one file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at the given directory. The directory is
    /// created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The backing directory.
    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are fixed names or `{name}_{id}`; anything else is mapped
        // onto the filename-safe alphabet.
        let sanitized: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", sanitized))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Storage(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            Error::Storage(format!(
                "failed to create {}: {}",
                self.dir.display(),
                e
            ))
        })?;
        let path = self.path_for(key);
        std::fs::write(&path, value)
            .map_err(|e| Error::Storage(format!("failed to write {}: {}", path.display(), e)))?;
        trace!(key = %key, path = %path.display(), "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!(
                "failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

/// In-memory store for tests and ephemeral use.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("login").unwrap(), None);

        store.put("login", "{\"isAuth\":true}").unwrap();
        assert_eq!(store.get("login").unwrap().as_deref(), Some("{\"isAuth\":true}"));

        store.remove("login").unwrap();
        assert_eq!(store.get("login").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_remove_absent_is_ok() {
        let store = MemoryStore::new();
        store.remove("nothing").unwrap();
    }

    #[test]
    fn test_file_roundtrip() {
        let temp = tempdir().unwrap();
        let store = FileStore::new(temp.path());

        assert_eq!(store.get("token").unwrap(), None);

        store.put("token", "Bearer abc").unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("Bearer abc"));

        store.put("token", "Bearer def").unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("Bearer def"));

        store.remove("token").unwrap();
        assert_eq!(store.get("token").unwrap(), None);
    }

    #[test]
    fn test_file_key_sanitization() {
        let temp = tempdir().unwrap();
        let store = FileStore::new(temp.path());

        store.put("userTermsStatus_7", "true").unwrap();
        store.put("weird/../key", "x").unwrap();

        assert_eq!(store.get("userTermsStatus_7").unwrap().as_deref(), Some("true"));
        assert_eq!(store.get("weird/../key").unwrap().as_deref(), Some("x"));
        // Sanitized name stays inside the data directory.
        assert!(temp.path().join("weird-..-key.json").exists());
    }
}
