//! Cleaning pass and content-type dispatch.
//!
//! Every collection handed to the cache or the filter has been through
//! [`clean_features`] or [`clean_collection`]: each record has a point
//! geometry with two finite coordinates.

use serde_json::Value;
use tracing::{debug, warn};

use heatmap_core::error::Result;
use heatmap_core::traits::RawPayload;
use heatmap_core::types::{Coordinates, Feature, FeatureCollection, Properties};

use crate::geojson::parse_geojson;
use crate::tabular::parse_csv;

fn usable_coordinates(feature: &Value) -> Option<Coordinates> {
    let geometry = feature.get("geometry")?;
    if geometry.get("type").and_then(Value::as_str) == Some("GeometryCollection") {
        return None;
    }
    let coords = geometry.get("coordinates")?.as_array()?;
    if coords.len() < 2 {
        return None;
    }
    let longitude = coords[0].as_f64()?;
    let latitude = coords[1].as_f64()?;
    Some(Coordinates::new(longitude, latitude))
}

/// Keeps only records with usable point coordinates.
///
/// A record is dropped when it has no geometry, its geometry is a
/// `GeometryCollection`, its coordinates are not an array of at least two
/// elements, or either of the first two components is null or non-numeric.
/// Relative order is preserved.
pub fn clean_features(features: Vec<Value>) -> FeatureCollection {
    let total = features.len();
    let cleaned: FeatureCollection = features
        .into_iter()
        .filter_map(|mut feature| {
            let coordinates = usable_coordinates(&feature)?;
            let properties = match feature.get_mut("properties").map(Value::take) {
                Some(Value::Object(map)) => Properties::from(map),
                _ => Properties::new(),
            };
            Some(Feature::new(coordinates, properties))
        })
        .collect();

    let dropped = total - cleaned.len();
    if dropped > 0 {
        warn!(dropped, kept = cleaned.len(), "Dropped features without usable coordinates");
    }
    cleaned
}

/// Drops records whose coordinates are not finite.
pub fn clean_collection(collection: FeatureCollection) -> FeatureCollection {
    let total = collection.len();
    let cleaned: FeatureCollection = collection
        .features
        .into_iter()
        .filter(|f| {
            let c = f.coordinates();
            c.longitude.is_finite() && c.latitude.is_finite()
        })
        .collect();

    let dropped = total - cleaned.len();
    if dropped > 0 {
        warn!(dropped, kept = cleaned.len(), "Dropped features with non-finite coordinates");
    }
    cleaned
}

/// Decodes a raw payload into a cleaned collection.
///
/// JSON content types take the GeoJSON path; everything else is CSV.
pub fn decode_payload(payload: &RawPayload) -> Result<FeatureCollection> {
    if payload.is_json() {
        debug!("Decoding payload as GeoJSON");
        parse_geojson(&payload.body)
    } else {
        debug!(content_type = ?payload.content_type, "Decoding payload as CSV");
        parse_csv(&payload.body).map(clean_collection)
    }
}
