//! TTL cache for heatmap data.
//!
//! Wraps any [`KeyValueStore`](heatmap_core::KeyValueStore) with namespaced
//! keys, write timestamps and lazy staleness eviction. Two stores ship here:
//!
//! - **Memory**: process-local map with an optional byte quota
//! - **File**: JSON file on disk, survives restarts

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cache;
mod file;
mod memory;

pub use cache::{CacheStats, TtlCache};
pub use file::FileStore;
pub use memory::MemoryStore;
