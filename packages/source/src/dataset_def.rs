//! Config-driven crash dataset definition.
//!
//! [`DatasetDefinition`] captures everything unique about one crash dataset
//! vintage in a serializable config struct: where the file lives, which
//! format it is in, and which property names each canonical field goes by.
//! A single generic implementation of [`CrashSource`] handles every
//! definition.

use std::sync::Arc;

use async_trait::async_trait;
use crash_map_crash_models::NormalizedCrash;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::loader::{DatasetLocation, fetch_bytes};
use crate::normalize::{NormalizeReport, normalize_features};
use crate::progress::ProgressCallback;
use crate::{CrashSource, RawFeature, SourceError, csv_file, geojson_file};

/// A complete, config-driven crash dataset definition.
///
/// Loaded from TOML files embedded at compile time (see
/// [`crate::registry`]).
#[derive(Debug, Deserialize)]
pub struct DatasetDefinition {
    /// Unique identifier (e.g., `"austin_crashes"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// City the crashes were recorded in.
    pub city: String,
    /// Two-letter state abbreviation.
    pub state: String,
    /// File format of the raw records.
    pub format: DatasetFormat,
    /// Default file path or `http(s)` URL of the dataset.
    pub location: String,
    /// Alias lists for each canonical field.
    pub fields: FieldMapping,
}

/// File format of a raw crash dataset.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DatasetFormat {
    /// `GeoJSON` `FeatureCollection` with point geometries.
    Geojson,
    /// CSV with a header row.
    Csv,
}

impl DatasetFormat {
    /// Guesses the format from a file name or URL extension.
    #[must_use]
    pub fn from_extension(location: &str) -> Option<Self> {
        let lower = location.to_ascii_lowercase();
        let path = lower.split(['?', '#']).next().unwrap_or_default();
        if path.ends_with(".geojson") || path.ends_with(".json") {
            Some(Self::Geojson)
        } else if path.ends_with(".csv") {
            Some(Self::Csv)
        } else {
            None
        }
    }
}

/// A canonical crash field that may appear under several raw names.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CanonicalField {
    /// Latitude column (tabular rows only)
    Latitude,
    /// Longitude column (tabular rows only)
    Longitude,
    /// Free-text crash timestamp
    Timestamp,
    /// Posted speed limit
    SpeedLimit,
    /// Total injury count
    InjuryCount,
    /// Death count
    FatalityCount,
    /// Estimated total comprehensive cost
    Cost,
    /// Free-text units involved
    UnitsInvolved,
}

/// Maps each canonical field to the raw property names it has gone by,
/// in priority order. The first alias with a non-empty value wins.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldMapping {
    /// Latitude columns (tabular rows; `GeoJSON` uses the geometry).
    #[serde(default)]
    pub latitude: Vec<String>,
    /// Longitude columns (tabular rows; `GeoJSON` uses the geometry).
    #[serde(default)]
    pub longitude: Vec<String>,
    /// Timestamp property names.
    pub timestamp: Vec<String>,
    /// Speed limit property names.
    pub speed_limit: Vec<String>,
    /// Injury count property names.
    pub injury_count: Vec<String>,
    /// Fatality count property names.
    pub fatality_count: Vec<String>,
    /// Cost property names.
    pub cost: Vec<String>,
    /// Units-involved property names.
    pub units_involved: Vec<String>,
}

impl FieldMapping {
    /// Returns the alias list for a canonical field.
    #[must_use]
    pub fn aliases(&self, field: CanonicalField) -> &[String] {
        match field {
            CanonicalField::Latitude => &self.latitude,
            CanonicalField::Longitude => &self.longitude,
            CanonicalField::Timestamp => &self.timestamp,
            CanonicalField::SpeedLimit => &self.speed_limit,
            CanonicalField::InjuryCount => &self.injury_count,
            CanonicalField::FatalityCount => &self.fatality_count,
            CanonicalField::Cost => &self.cost,
            CanonicalField::UnitsInvolved => &self.units_involved,
        }
    }
}

impl DatasetDefinition {
    /// Returns the default location parsed into a [`DatasetLocation`].
    #[must_use]
    pub fn default_location(&self) -> DatasetLocation {
        DatasetLocation::from(self.location.as_str())
    }

    /// Checks that `location` does not name a file of another format.
    ///
    /// Locations without a recognised extension are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::FormatMismatch`] if the extension implies a
    /// format other than [`Self::format`].
    pub fn check_location(&self, location: &DatasetLocation) -> Result<(), SourceError> {
        let location = location.to_string();
        match DatasetFormat::from_extension(&location) {
            Some(found) if found != self.format => Err(SourceError::FormatMismatch {
                dataset_id: self.id.clone(),
                location,
                expected: self.format,
                found,
            }),
            _ => Ok(()),
        }
    }

    /// Parses raw bytes in this definition's format into features.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the document as a whole cannot be parsed.
    /// Individual malformed features are skipped, not reported as errors.
    pub fn parse(&self, bytes: &[u8]) -> Result<Vec<RawFeature>, SourceError> {
        match self.format {
            DatasetFormat::Geojson => geojson_file::parse_feature_collection(bytes),
            DatasetFormat::Csv => csv_file::parse_rows(bytes),
        }
    }
}

#[async_trait]
impl CrashSource for DatasetDefinition {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, location: &DatasetLocation) -> Result<Vec<RawFeature>, SourceError> {
        let bytes = fetch_bytes(location).await?;
        log::debug!("[{}] read {} bytes from {location}", self.id, bytes.len());
        self.parse(&bytes)
    }

    fn normalize(
        &self,
        features: &[RawFeature],
        progress: &Arc<dyn ProgressCallback>,
    ) -> (Vec<NormalizedCrash>, NormalizeReport) {
        normalize_features(features, &self.fields, progress)
    }
}

/// Parses a [`DatasetDefinition`] from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or missing required fields.
pub fn parse_dataset_toml(toml_str: &str) -> Result<DatasetDefinition, String> {
    toml::de::from_str(toml_str).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_austin_toml() {
        let def = parse_dataset_toml(include_str!("../datasets/austin_crashes.toml")).unwrap();
        assert_eq!(def.id, "austin_crashes");
        assert_eq!(def.city, "Austin");
        assert_eq!(def.format, DatasetFormat::Geojson);
        assert!(def.fields.latitude.is_empty());
        assert_eq!(
            def.fields.aliases(CanonicalField::SpeedLimit),
            ["Speed Limit", "speed_limit", "crash_speed_limit"]
        );
    }

    #[test]
    fn parses_csv_toml_with_coordinate_columns() {
        let def =
            parse_dataset_toml(include_str!("../datasets/austin_crashes_csv.toml")).unwrap();
        assert_eq!(def.format, DatasetFormat::Csv);
        assert_eq!(def.fields.aliases(CanonicalField::Latitude)[0], "latitude");
        assert!(!def.fields.longitude.is_empty());
    }

    #[test]
    fn rejects_definition_without_fields() {
        let err = parse_dataset_toml(
            r#"
            id = "x"
            name = "x"
            city = "x"
            state = "TX"
            format = "csv"
            location = "x.csv"
            "#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn rejects_location_of_another_format() {
        let def = parse_dataset_toml(include_str!("../datasets/austin_crashes.toml")).unwrap();
        assert!(def.check_location(&def.default_location()).is_ok());
        assert!(
            def.check_location(&DatasetLocation::from("https://example.org/export"))
                .is_ok()
        );
        let err = def
            .check_location(&DatasetLocation::from("data/foo.csv"))
            .unwrap_err();
        assert!(matches!(
            err,
            SourceError::FormatMismatch {
                expected: DatasetFormat::Geojson,
                found: DatasetFormat::Csv,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "data/foo.csv looks like csv but dataset austin_crashes reads geojson"
        );
    }

    #[test]
    fn guesses_format_from_extension() {
        assert_eq!(
            DatasetFormat::from_extension("data/crashes.GeoJSON"),
            Some(DatasetFormat::Geojson)
        );
        assert_eq!(
            DatasetFormat::from_extension("https://example.org/crashes.csv?rev=2"),
            Some(DatasetFormat::Csv)
        );
        assert_eq!(DatasetFormat::from_extension("crashes.parquet"), None);
    }
}
