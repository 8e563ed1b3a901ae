//! `GeoJSON` `FeatureCollection` reader.
//!
//! Features are decoded one at a time so a single malformed feature cannot
//! abort the batch. A feature whose geometry fails to decode is kept with
//! its properties and no geometry; the normalizer then drops it as missing
//! coordinates and counts it.

use geojson::{Feature, JsonObject};
use serde_json::Value;

use crate::{RawFeature, SourceError};

/// Parses a `GeoJSON` document into raw features.
///
/// Accepts a `FeatureCollection` object or a bare array of features.
///
/// # Errors
///
/// Returns [`SourceError::Json`] if the bytes are not JSON, or
/// [`SourceError::Format`] if the document has no feature list.
pub fn parse_feature_collection(bytes: &[u8]) -> Result<Vec<RawFeature>, SourceError> {
    let document: Value = serde_json::from_slice(bytes)?;

    let features = match document {
        Value::Object(mut object) => match object.remove("features") {
            Some(Value::Array(features)) => features,
            _ => {
                return Err(SourceError::Format {
                    message: "GeoJSON document has no \"features\" array".to_string(),
                });
            }
        },
        Value::Array(features) => features,
        _ => {
            return Err(SourceError::Format {
                message: "GeoJSON document is neither a FeatureCollection nor an array".to_string(),
            });
        }
    };

    log::debug!("GeoJSON document holds {} features", features.len());

    Ok(features.into_iter().filter_map(decode_feature).collect())
}

/// Decodes one feature, degrading to a geometry-less feature when only the
/// geometry is malformed. Non-object entries are skipped.
fn decode_feature(value: Value) -> Option<RawFeature> {
    if !value.is_object() {
        log::debug!("Skipping non-object feature entry: {value}");
        return None;
    }

    let properties = value
        .get("properties")
        .and_then(Value::as_object)
        .cloned();

    match Feature::from_json_value(value) {
        Ok(feature) => Some(RawFeature::Geojson(feature)),
        Err(e) => {
            log::debug!("Feature failed to decode ({e}), keeping properties only");
            Some(RawFeature::Geojson(geometryless(properties)))
        }
    }
}

fn geometryless(properties: Option<JsonObject>) -> Feature {
    Feature {
        bbox: None,
        geometry: None,
        id: None,
        properties,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_feature_collection() {
        let bytes = br#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-97.74, 30.27]},
                 "properties": {"Speed Limit": "35"}},
                {"type": "Feature", "geometry": null, "properties": {"Speed Limit": "45"}}
            ]
        }"#;
        let features = parse_feature_collection(bytes).unwrap();
        assert_eq!(features.len(), 2);
        assert!(matches!(&features[0], RawFeature::Geojson(f) if f.geometry.is_some()));
        assert!(matches!(&features[1], RawFeature::Geojson(f) if f.geometry.is_none()));
    }

    #[test]
    fn malformed_geometry_keeps_properties() {
        let bytes = br#"[
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": "oops"},
             "properties": {"death_cnt": 1}}
        ]"#;
        let features = parse_feature_collection(bytes).unwrap();
        assert_eq!(features.len(), 1);
        let RawFeature::Geojson(feature) = &features[0] else {
            panic!("expected a GeoJSON feature");
        };
        assert!(feature.geometry.is_none());
        assert_eq!(features[0].property("death_cnt"), Some(&serde_json::json!(1)));
    }

    #[test]
    fn rejects_document_without_features() {
        assert!(matches!(
            parse_feature_collection(br#"{"type": "FeatureCollection"}"#),
            Err(SourceError::Format { .. })
        ));
        assert!(matches!(
            parse_feature_collection(b"not json"),
            Err(SourceError::Json(_))
        ));
    }

    #[test]
    fn skips_non_object_entries() {
        let features = parse_feature_collection(br#"{"features": [1, "two", null]}"#).unwrap();
        assert!(features.is_empty());
    }
}
