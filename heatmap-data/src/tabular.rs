//! CSV point data.
//!
//! Header row must name `latitude`, `longitude` and `intensity`; any other
//! column is carried into the record's properties.

use tracing::{debug, warn};

use heatmap_core::constants::{COLUMN_INTENSITY, COLUMN_LATITUDE, COLUMN_LONGITUDE, REQUIRED_COLUMNS};
use heatmap_core::error::{HeatmapError, Result};
use heatmap_core::types::{Feature, FeatureCollection, HeatmapPoint};

fn parse_finite(field: &str) -> Option<f64> {
    field.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses CSV text into a point collection.
///
/// Extra columns become numbers when they parse as finite numbers and stay
/// strings otherwise. Blank lines are skipped. A row whose latitude,
/// longitude or intensity is not a finite number is dropped and logged.
pub fn parse_csv(text: &str) -> Result<FeatureCollection> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| HeatmapError::Csv(e.to_string()))?
        .clone();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|name| column(*name).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(HeatmapError::Csv(format!(
            "missing required column(s): {}",
            missing.join(", ")
        )));
    }

    // All three are present, checked above.
    let lat_idx = column(COLUMN_LATITUDE).unwrap_or_default();
    let lng_idx = column(COLUMN_LONGITUDE).unwrap_or_default();
    let intensity_idx = column(COLUMN_INTENSITY).unwrap_or_default();

    let mut features = Vec::new();
    let mut rejected = 0usize;

    for record in reader.records() {
        let record = record.map_err(|e| HeatmapError::Csv(e.to_string()))?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let number = |idx: usize| record.get(idx).and_then(parse_finite);
        let (Some(lat), Some(lng), Some(intensity)) =
            (number(lat_idx), number(lng_idx), number(intensity_idx))
        else {
            let line = record.position().map(|p| p.line());
            debug!(line = ?line, "Rejecting CSV row without numeric position or intensity");
            rejected += 1;
            continue;
        };

        let mut feature = Feature::from(HeatmapPoint {
            latitude: lat,
            longitude: lng,
            intensity,
        });
        for (idx, name) in headers.iter().enumerate() {
            if idx == lat_idx || idx == lng_idx || idx == intensity_idx {
                continue;
            }
            let Some(raw) = record.get(idx) else {
                continue;
            };
            match parse_finite(raw) {
                Some(value) => feature.properties.insert_number(name, value),
                None => feature.properties.insert(name, raw),
            };
        }

        features.push(feature);
    }

    if rejected > 0 {
        warn!(rejected, accepted = features.len(), "Dropped CSV rows with non-numeric fields");
    }

    Ok(FeatureCollection::new(features))
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatmap_core::types::Coordinates;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn test_parse_two_rows() {
        let text = "latitude,longitude,intensity\n-33.87,151.21,100\n-37.81,144.96,90";
        let collection = parse_csv(text).unwrap();

        assert_eq!(collection.len(), 2);
        let first = &collection.features[0];
        assert_eq!(first.coordinates(), Coordinates::new(151.21, -33.87));
        assert_eq!(first.properties.intensity(), Some(100.0));
        assert_eq!(collection.features[1].coordinates(), Coordinates::new(144.96, -37.81));
    }

    #[test]
    fn test_extra_columns_cast_when_numeric() {
        let text = "latitude,longitude,intensity,district,count\n-33.87,151.21,100,Sydney,42";
        let collection = parse_csv(text).unwrap();
        let props = &collection.features[0].properties;

        assert_eq!(props.get_str("district"), Some("Sydney"));
        assert_eq!(props.get("count"), Some(&json!(42.0)));
        assert!(props.get("latitude").is_none());
    }

    #[test]
    fn test_column_order_is_free() {
        let text = "intensity,district,longitude,latitude\n5,Perth,115.86,-31.95";
        let collection = parse_csv(text).unwrap();
        assert_eq!(collection.features[0].coordinates(), Coordinates::new(115.86, -31.95));
        assert_eq!(collection.features[0].properties.intensity(), Some(5.0));
    }

    #[test]
    fn test_blank_lines_and_whitespace() {
        let text = "latitude, longitude, intensity\n\n -33.87 , 151.21 , 100 \n\n";
        let collection = parse_csv(text).unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.features[0].coordinates(), Coordinates::new(151.21, -33.87));
    }

    #[test_case("abc" ; "text intensity")]
    #[test_case("" ; "empty intensity")]
    #[test_case("NaN" ; "nan intensity")]
    #[test_case("inf" ; "infinite intensity")]
    fn test_row_with_bad_intensity_rejected(intensity: &str) {
        let text = format!("latitude,longitude,intensity\n-33.87,151.21,{intensity}\n-37.81,144.96,90");
        let collection = parse_csv(&text).unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.features[0].properties.intensity(), Some(90.0));
    }

    #[test]
    fn test_row_with_bad_coordinate_rejected() {
        let text = "latitude,longitude,intensity\n,151.21,100\n-37.81,east,90";
        assert!(parse_csv(text).unwrap().is_empty());
    }

    #[test]
    fn test_short_row_omits_missing_extras() {
        let text = "latitude,longitude,intensity,district\n-33.87,151.21,100";
        let collection = parse_csv(text).unwrap();
        assert!(collection.features[0].properties.get("district").is_none());
    }

    #[test]
    fn test_multiline_quoted_field_and_later_bad_row() {
        let text = "latitude,longitude,intensity,note\n\n-33.87,151.21,100,\"two\nlines\"\n\n-37.81,144.96,oops,x\n";
        let collection = parse_csv(text).unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.features[0].properties.get_str("note"), Some("two\nlines"));
    }

    #[test]
    fn test_missing_required_column() {
        let err = parse_csv("lat,longitude,intensity\n1,2,3").unwrap_err();
        assert!(matches!(err, HeatmapError::Csv(ref msg) if msg.contains("latitude")));
    }

    #[test]
    fn test_header_only_is_empty() {
        assert!(parse_csv("latitude,longitude,intensity\n").unwrap().is_empty());
    }
}
