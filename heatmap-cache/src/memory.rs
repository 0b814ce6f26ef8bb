//! In-memory key-value store.
//!
//! Thread-safe map with an optional byte quota, standing in for browser
//! storage in tests and one-shot runs.

use std::collections::HashMap;

use parking_lot::RwLock;

use heatmap_core::error::{HeatmapError, Result};
use heatmap_core::traits::KeyValueStore;

/// Bytes a map would occupy after writing `key = value`.
///
/// Usage is the sum of key and value lengths, as browsers count it.
pub(crate) fn usage_after<'a, I>(entries: I, key: &str, value: &str) -> usize
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let others: usize = entries
        .into_iter()
        .filter(|(k, _)| k.as_str() != key)
        .map(|(k, v)| k.len() + v.len())
        .sum();
    others + key.len() + value.len()
}

/// In-memory key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    /// Creates an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects writes beyond `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota: Some(quota),
        }
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write();
        if let Some(limit) = self.quota {
            let required = usage_after(entries.iter(), key, value);
            if required > limit {
                return Err(HeatmapError::QuotaExceeded { limit, required });
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.read().keys().cloned().collect())
    }
}
