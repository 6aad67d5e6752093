//! TTL cache over a durable key/value store.
//!
//! Entries are JSON `{ value, expiry }` blobs with an absolute
//! epoch-millisecond expiry. An entry is valid only while `now < expiry`;
//! an expired entry behaves as absent and is purged from the store on the
//! access that finds it.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::storage::KeyValueStore;

/// A cached value with its expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    value: serde_json::Value,
    expiry: u64,
}

/// Current time as epoch milliseconds.
fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

/// TTL cache in front of read-mostly endpoints.
///
/// Cloning is cheap; clones share the backing store.
#[derive(Clone)]
pub struct TtlCache {
    store: Arc<dyn KeyValueStore>,
}

impl TtlCache {
    /// Create a cache over the given store.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Look up an entry. Expired or unreadable entries are purged and
    /// reported as absent.
    pub fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let Some(raw) = self.store.get(key)? else {
            trace!(key = %key, "cache miss");
            return Ok(None);
        };

        let entry: StoredEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(key = %key, error = %e, "purging unreadable cache entry");
                self.store.remove(key)?;
                return Ok(None);
            }
        };

        if now_ms() >= entry.expiry {
            debug!(key = %key, "purging expired cache entry");
            self.store.remove(key)?;
            return Ok(None);
        }

        trace!(key = %key, "cache hit");
        Ok(Some(entry.value))
    }

    /// Typed lookup.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            Some(value) => {
                let typed = serde_json::from_value(value)
                    .map_err(|e| Error::Storage(format!("cache entry for {}: {}", key, e)))?;
                Ok(Some(typed))
            }
            None => Ok(None),
        }
    }

    /// Store a value with a time-to-live, overwriting any prior entry.
    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let entry = StoredEntry {
            value: serde_json::to_value(value)
                .map_err(|e| Error::Storage(format!("cache value for {}: {}", key, e)))?,
            expiry: now_ms() + ttl.as_millis() as u64,
        };
        let raw = serde_json::to_string(&entry)
            .map_err(|e| Error::Storage(format!("cache entry for {}: {}", key, e)))?;
        self.store.put(key, &raw)?;
        trace!(key = %key, ttl_ms = ttl.as_millis() as u64, "cached value");
        Ok(())
    }

    /// Drop an entry immediately, regardless of expiry.
    pub fn invalidate(&self, key: &str) -> Result<()> {
        self.store.remove(key)?;
        debug!(key = %key, "cache entry invalidated");
        Ok(())
    }
}
