//! GeoJSON FeatureCollection input.

use serde_json::Value;

use heatmap_core::error::{HeatmapError, Result};
use heatmap_core::types::FeatureCollection;

use crate::normalize::clean_features;

/// Checks that `value` is a FeatureCollection whose every element is a
/// `"Feature"` with a geometry and a properties object.
pub fn validate_shape(value: &Value) -> Result<()> {
    let invalid = |msg: String| Err(HeatmapError::InvalidFeatureCollection(msg));

    match value.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {}
        Some(other) => return invalid(format!("expected type \"FeatureCollection\", got \"{other}\"")),
        None => return invalid("missing \"type\"".into()),
    }

    let Some(features) = value.get("features").and_then(Value::as_array) else {
        return invalid("\"features\" must be an array".into());
    };

    for (idx, feature) in features.iter().enumerate() {
        if feature.get("type").and_then(Value::as_str) != Some("Feature") {
            return invalid(format!("feature {idx} is not of type \"Feature\""));
        }
        if feature.get("geometry").map_or(true, Value::is_null) {
            return invalid(format!("feature {idx} has no geometry"));
        }
        if !feature.get("properties").is_some_and(Value::is_object) {
            return invalid(format!("feature {idx} has no properties object"));
        }
    }

    Ok(())
}

/// Parses GeoJSON text, checks its shape and runs the cleaning pass.
pub fn parse_geojson(text: &str) -> Result<FeatureCollection> {
    let value: Value = serde_json::from_str(text)?;
    validate_shape(&value)?;

    let features = match value {
        Value::Object(mut map) => match map.remove("features") {
            Some(Value::Array(features)) => features,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    Ok(clean_features(features))
}
