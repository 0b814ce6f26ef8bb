//! Domain types for the heatmap toolkit.
//!
//! - [`Feature`]: one geotagged record
//! - [`FeatureCollection`]: the ordered records that are cached and filtered
//! - [`HeatmapPoint`]: plain numeric triple convertible into a feature

mod feature;

pub use feature::*;
