//! File-backed key-value store with persistence.
//!
//! Keeps all entries in memory and rewrites the backing file after every
//! mutation. Suitable for a single process; concurrent writers to the same
//! file are not coordinated.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{debug, info, instrument};

use heatmap_core::error::{HeatmapError, Result};
use heatmap_core::traits::KeyValueStore;

use crate::memory::usage_after;

/// File-backed key-value store.
///
/// # File Format
///
/// A single JSON object mapping keys to string values:
///
/// ```text
/// { "heatmap_data": "{\"data\":{...},\"writtenAt\":1700000000000}" }
/// ```
#[derive(Debug)]
pub struct FileStore {
    /// Path to the storage file
    path: PathBuf,
    /// In-memory mirror of the file
    entries: RwLock<BTreeMap<String, String>>,
    /// Optional byte quota
    quota: Option<usize>,
}

impl FileStore {
    /// Opens the store at `path`.
    ///
    /// An existing file is loaded; otherwise the store starts empty and the
    /// file is created on the first write.
    #[instrument]
    pub fn open(path: impl AsRef<Path> + std::fmt::Debug) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|e| {
                HeatmapError::Storage(format!("Failed to read store file {}: {}", path.display(), e))
            })?;
            let entries: BTreeMap<String, String> = serde_json::from_str(&contents).map_err(|e| {
                HeatmapError::Storage(format!("Invalid store file {}: {}", path.display(), e))
            })?;
            info!(count = entries.len(), path = ?path, "Loaded store file");
            entries
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
            quota: None,
        })
    }

    /// Opens the store with a byte quota.
    pub fn open_with_quota(path: impl AsRef<Path> + std::fmt::Debug, quota: usize) -> Result<Self> {
        let mut store = Self::open(path)?;
        store.quota = Some(quota);
        Ok(store)
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Writes `entries` to disk (temp file, then rename).
    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let serialized = serde_json::to_vec(entries)?;
        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(&serialized)?;
        file.sync_all()?;
        fs::rename(&temp_path, &self.path)?;

        debug!(count = entries.len(), bytes = serialized.len(), "Store file written");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
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

        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist(&entries) {
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(HeatmapError::Storage(format!("Failed to write store file: {e}")));
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write();
        let Some(old) = entries.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.persist(&entries) {
            entries.insert(key.to_string(), old);
            return Err(HeatmapError::Storage(format!("Failed to write store file: {e}")));
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.read().keys().cloned().collect())
    }
}
