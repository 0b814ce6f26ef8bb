//! GeoJSON-shaped point records.
//!
//! - [`Coordinates`]: longitude/latitude pair, serialized longitude first
//! - [`Feature`]: one geotagged record with open properties
//! - [`FeatureCollection`]: ordered records, the unit that gets cached and filtered

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::constants::PROPERTY_INTENSITY;

// ═══════════════════════════════════════════════════════════════════════════════
// COORDINATES & GEOMETRY
// ═══════════════════════════════════════════════════════════════════════════════

/// A position on the map.
///
/// Serializes as the GeoJSON array `[longitude, latitude]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    /// Degrees east
    pub longitude: f64,
    /// Degrees north
    pub latitude: f64,
}

impl Coordinates {
    /// Creates coordinates from longitude and latitude, in that order.
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self { longitude, latitude }
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([longitude, latitude]: [f64; 2]) -> Self {
        Self { longitude, latitude }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.longitude, c.latitude]
    }
}

/// Geometry of a validated record. Only points survive cleaning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// A single position.
    Point {
        /// Longitude-first position
        coordinates: Coordinates,
    },
}

impl Geometry {
    /// Returns the position of this geometry.
    pub fn coordinates(&self) -> Coordinates {
        match self {
            Geometry::Point { coordinates } => *coordinates,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════════

/// Open attribute map attached to a record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(Map<String, Value>);

impl Properties {
    /// Creates an empty property map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a property map holding only `intensity`.
    pub fn with_intensity(intensity: f64) -> Self {
        let mut props = Self::new();
        props.insert_number(PROPERTY_INTENSITY, intensity);
        props
    }

    /// Returns the numeric intensity, if present.
    pub fn intensity(&self) -> Option<f64> {
        self.0.get(PROPERTY_INTENSITY).and_then(Value::as_f64)
    }

    /// Returns the raw value of a property.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns a property only when it is a JSON string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Sets a property, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Sets a numeric property. Non-finite numbers have no JSON form and are
    /// stored as `null`.
    pub fn insert_number(&mut self, name: impl Into<String>, value: f64) -> Option<Value> {
        let value = Number::from_f64(value).map_or(Value::Null, Value::Number);
        self.0.insert(name.into(), value)
    }

    /// Chaining form of [`Properties::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no properties.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over name/value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<Map<String, Value>> for Properties {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FEATURE
// ═══════════════════════════════════════════════════════════════════════════════

/// GeoJSON tag of a single record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureType {
    /// `"Feature"`
    #[default]
    Feature,
}

/// One geotagged observation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Always `"Feature"`
    #[serde(rename = "type", default)]
    pub kind: FeatureType,
    /// Attributes; `intensity` drives the heatmap weight
    pub properties: Properties,
    /// Point geometry
    pub geometry: Geometry,
}

impl Feature {
    /// Creates a point feature.
    pub fn new(coordinates: Coordinates, properties: Properties) -> Self {
        Self {
            kind: FeatureType::Feature,
            properties,
            geometry: Geometry::Point { coordinates },
        }
    }

    /// Returns the record's position.
    pub fn coordinates(&self) -> Coordinates {
        self.geometry.coordinates()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLECTION
// ═══════════════════════════════════════════════════════════════════════════════

/// GeoJSON tag of a collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionType {
    /// `"FeatureCollection"`
    #[default]
    FeatureCollection,
}

/// Ordered sequence of records.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    /// Always `"FeatureCollection"`
    #[serde(rename = "type", default)]
    pub kind: CollectionType,
    /// The records, in input order
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Wraps a list of features.
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: CollectionType::FeatureCollection,
            features,
        }
    }

    /// Creates an empty collection.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns true if the collection has no features.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Iterates over features in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }

    /// Distinct non-empty string values of a property, sorted.
    ///
    /// These are the choices offered for a filter dimension.
    pub fn unique_property_values(&self, name: &str) -> BTreeSet<String> {
        self.features
            .iter()
            .filter_map(|f| f.properties.get_str(name))
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FeatureCollection {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HEATMAP POINT
// ═══════════════════════════════════════════════════════════════════════════════

/// A numeric latitude/longitude/intensity triple.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeatmapPoint {
    /// Degrees north
    pub latitude: f64,
    /// Degrees east
    pub longitude: f64,
    /// Heatmap weight
    pub intensity: f64,
}

impl From<HeatmapPoint> for Feature {
    fn from(p: HeatmapPoint) -> Self {
        Feature::new(
            Coordinates::new(p.longitude, p.latitude),
            Properties::with_intensity(p.intensity),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn district(name: &str) -> Feature {
        Feature::new(
            Coordinates::new(151.21, -33.87),
            Properties::with_intensity(1.0).with("district", name),
        )
    }

    #[test]
    fn test_feature_serializes_as_geojson() {
        let feature = Feature::new(Coordinates::new(151.21, -33.87), Properties::with_intensity(100.0));
        let value = serde_json::to_value(&feature).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "Feature",
                "properties": { "intensity": 100.0 },
                "geometry": { "type": "Point", "coordinates": [151.21, -33.87] }
            })
        );
    }

    #[test]
    fn test_collection_deserializes_from_geojson() {
        let value = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "intensity": 5, "district": "Sydney" },
                "geometry": { "type": "Point", "coordinates": [151.0, -33.0] }
            }]
        });
        let collection: FeatureCollection = serde_json::from_value(value).unwrap();
        assert_eq!(collection.len(), 1);
        let feature = &collection.features[0];
        assert_eq!(feature.coordinates(), Coordinates::new(151.0, -33.0));
        assert_eq!(feature.properties.intensity(), Some(5.0));
        assert_eq!(feature.properties.get_str("district"), Some("Sydney"));
    }

    #[test]
    fn test_wrong_collection_tag_rejected() {
        let value = json!({ "type": "Feature", "features": [] });
        assert!(serde_json::from_value::<FeatureCollection>(value).is_err());
    }

    #[test]
    fn test_non_finite_number_stored_as_null() {
        let mut props = Properties::new();
        props.insert_number("intensity", f64::NAN);
        assert_eq!(props.get("intensity"), Some(&Value::Null));
        assert_eq!(props.intensity(), None);
    }

    #[test]
    fn test_get_str_ignores_numbers() {
        let props = Properties::new().with("district", 5);
        assert_eq!(props.get_str("district"), None);
    }

    #[test]
    fn test_unique_property_values_sorted_and_non_empty() {
        let collection: FeatureCollection = ["Sydney", "Melbourne", "Sydney", ""]
            .into_iter()
            .map(district)
            .collect();
        let values: Vec<_> = collection.unique_property_values("district").into_iter().collect();
        assert_eq!(values, vec!["Melbourne".to_string(), "Sydney".to_string()]);
    }

    #[test]
    fn test_point_into_feature() {
        let feature = Feature::from(HeatmapPoint {
            latitude: -37.81,
            longitude: 144.96,
            intensity: 90.0,
        });
        assert_eq!(feature.coordinates(), Coordinates::new(144.96, -37.81));
        assert_eq!(feature.properties.intensity(), Some(90.0));
    }
}
