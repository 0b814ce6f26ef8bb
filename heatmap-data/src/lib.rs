//! # Heatmap Data
//!
//! Turns an external payload into a validated [`FeatureCollection`].
//!
//! ## Pipeline
//!
//! 1. **Fetch**: a [`FeatureSource`](heatmap_core::FeatureSource) returns the raw text and its content type
//! 2. **Dispatch**: `application/json` goes through the GeoJSON path, anything else is CSV
//! 3. **Parse**: strict FeatureCollection shape check, or header-driven CSV rows
//! 4. **Clean**: records without usable point coordinates are dropped
//! 5. **Cache**: the cleaned collection is stored for the configured stale time
//!
//! ## Example
//!
//! ```rust,ignore
//! use heatmap_cache::{FileStore, TtlCache};
//! use heatmap_data::{DataService, LocationSource};
//!
//! let cache = TtlCache::new(FileStore::open(".heatmap/cache.json")?);
//! let service = DataService::new(LocationSource::new(), cache);
//! let collection = service.load("https://example.com/points.csv").await?;
//! println!("{} points", collection.len());
//! ```
//!
//! [`FeatureCollection`]: heatmap_core::FeatureCollection

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod geojson;
mod normalize;
mod service;
mod source;
mod tabular;

pub use geojson::{parse_geojson, validate_shape};
pub use normalize::{clean_collection, clean_features, decode_payload};
pub use service::{DataConfig, DataService};
pub use source::{FileSource, HttpSource, LocationSource};
pub use tabular::parse_csv;
