//! # Heatmap Core
//!
//! Core types, errors, and traits shared by every heatmap crate.
//!
//! - **Types**: GeoJSON-shaped point records and collections
//! - **Errors**: One error hierarchy for acquisition, caching and configuration
//! - **Constants**: Property names, cache namespace, default stale time
//! - **Traits**: Seams for storage, time, data sources and notifications
//!
//! ## Example
//!
//! ```rust
//! use heatmap_core::{Coordinates, Feature, FeatureCollection, Properties};
//!
//! let feature = Feature::new(
//!     Coordinates::new(151.21, -33.87),
//!     Properties::with_intensity(100.0),
//! );
//! let collection = FeatureCollection::new(vec![feature]);
//! let json = serde_json::to_string(&collection).unwrap();
//! assert!(json.contains("FeatureCollection"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod clock;
pub mod constants;
pub mod error;
pub mod notify;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use clock::{ManualClock, SystemClock};
pub use constants::*;
pub use error::{HeatmapError, Result};
pub use notify::{Notification, NotificationKind, TracingNotifier};
pub use traits::*;
pub use types::*;
