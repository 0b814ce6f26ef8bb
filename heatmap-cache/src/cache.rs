//! Namespaced TTL cache over a key-value store.
//!
//! Entries are stored as `{"data": <payload>, "writtenAt": <unix millis>}`.
//! The stale time is supplied at read time, so changing it takes effect
//! for entries that are already stored.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use heatmap_core::constants::CACHE_NAMESPACE;
use heatmap_core::traits::{Clock, KeyValueStore};
use heatmap_core::SystemClock;

#[derive(Serialize)]
struct EntryRef<'a, T> {
    data: &'a T,
    #[serde(rename = "writtenAt")]
    written_at: u64,
}

#[derive(Deserialize)]
struct Entry {
    data: Value,
    #[serde(rename = "writtenAt", alias = "timestamp")]
    written_at: u64,
}

impl Entry {
    fn is_stale(&self, now: u64, stale_time: Duration) -> bool {
        u128::from(now.saturating_sub(self.written_at)) > stale_time.as_millis()
    }
}

/// Cache that never fails its caller.
///
/// Read errors are misses, write errors are dropped; both are logged.
pub struct TtlCache<S, C = SystemClock> {
    store: S,
    clock: C,
    namespace: String,
}

impl<S: KeyValueStore> TtlCache<S> {
    /// Creates a cache in the default namespace using the wall clock.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> TtlCache<S, C> {
    /// Creates a cache in the default namespace with a custom clock.
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            namespace: CACHE_NAMESPACE.to_string(),
        }
    }

    /// Replaces the namespace prepended to every key.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Returns the namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn prefix(&self) -> String {
        format!("{}_", self.namespace)
    }

    fn cache_key(&self, key: &str) -> String {
        format!("{}_{}", self.namespace, key)
    }

    /// Gets a cached value if present and no older than `stale_time`.
    ///
    /// A stale entry is deleted before returning `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str, stale_time: Duration) -> Option<T> {
        let cache_key = self.cache_key(key);

        let raw = match self.store.get_item(&cache_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %cache_key, "Cache miss");
                return None;
            }
            Err(e) => {
                warn!(key = %cache_key, error = %e, "Error reading from cache");
                return None;
            }
        };

        let entry: Entry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = %cache_key, error = %e, "Corrupt cache entry");
                return None;
            }
        };

        if entry.is_stale(self.clock.now_millis(), stale_time) {
            debug!(key = %cache_key, "Cache entry stale, evicting");
            if let Err(e) = self.store.remove_item(&cache_key) {
                warn!(key = %cache_key, error = %e, "Failed to evict stale cache entry");
            }
            return None;
        }

        match serde_json::from_value(entry.data) {
            Ok(value) => {
                debug!(key = %cache_key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(key = %cache_key, error = %e, "Cached payload has unexpected shape");
                None
            }
        }
    }

    /// Stores a value stamped with the current time.
    ///
    /// Failures (quota, serialization, I/O) are logged and the value is
    /// simply not cached.
    pub fn set<T: Serialize>(&self, key: &str, data: &T) {
        let cache_key = self.cache_key(key);
        let entry = EntryRef {
            data,
            written_at: self.clock.now_millis(),
        };

        let serialized = match serde_json::to_string(&entry) {
            Ok(s) => s,
            Err(e) => {
                warn!(key = %cache_key, error = %e, "Failed to serialize cache entry");
                return;
            }
        };

        match self.store.set_item(&cache_key, &serialized) {
            Ok(()) => debug!(key = %cache_key, bytes = serialized.len(), "Cached"),
            Err(e) => warn!(key = %cache_key, error = %e, "Error writing to cache, continuing without caching"),
        }
    }

    /// Removes one entry.
    pub fn remove(&self, key: &str) {
        let cache_key = self.cache_key(key);
        if let Err(e) = self.store.remove_item(&cache_key) {
            warn!(key = %cache_key, error = %e, "Failed to remove cache entry");
        }
    }

    /// Removes every entry in this namespace. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let prefix = self.prefix();
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "Failed to enumerate cache keys");
                return 0;
            }
        };

        let mut removed = 0;
        for key in keys.iter().filter(|k| k.starts_with(&prefix)) {
            match self.store.remove_item(key) {
                Ok(()) => removed += 1,
                Err(e) => warn!(key = %key, error = %e, "Failed to remove cache entry"),
            }
        }
        debug!(removed, namespace = %self.namespace, "Cache cleared");
        removed
    }

    /// Counts entries in this namespace by freshness under `stale_time`.
    ///
    /// Unreadable entries count as expired. Nothing is evicted.
    pub fn stats(&self, stale_time: Duration) -> CacheStats {
        let prefix = self.prefix();
        let now = self.clock.now_millis();
        let keys = self.store.keys().unwrap_or_default();

        let mut stats = CacheStats::default();
        for key in keys.iter().filter(|k| k.starts_with(&prefix)) {
            stats.total_entries += 1;
            let fresh = self
                .store
                .get_item(key)
                .ok()
                .flatten()
                .and_then(|raw| serde_json::from_str::<Entry>(&raw).ok())
                .is_some_and(|e| !e.is_stale(now, stale_time));
            if fresh {
                stats.valid_entries += 1;
            } else {
                stats.expired_entries += 1;
            }
        }
        stats
    }
}

/// Cache statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub valid_entries: usize,
}
