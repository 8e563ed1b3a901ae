//! Field normalizer: maps heterogeneous raw records onto [`NormalizedCrash`].
//!
//! Coordinates come from the `GeoJSON` point geometry (`[lon, lat]`) or from
//! the latitude/longitude columns of a tabular row. Every other field is
//! resolved by walking the dataset's alias list for it; the first non-empty
//! value wins. Absent or unparseable numerics fall back to `0`, which
//! conflates "absent" with "truly zero". The [`NormalizeReport`] counts
//! those fallbacks so the collapse is at least visible.

use std::collections::BTreeMap;
use std::sync::Arc;

use crash_map_crash_models::NormalizedCrash;
use serde::Serialize;
use serde_json::Value;

use crate::RawFeature;
use crate::dataset_def::{CanonicalField, FieldMapping};
use crate::parsing::{
    is_empty_value, parse_amount, parse_coordinate, parse_count, parse_text, valid_lat_lng,
};
use crate::progress::ProgressCallback;

/// Why a raw record was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// No geometry, a non-point geometry, or no coordinate columns.
    MissingCoordinates,
    /// Coordinates present but zero or non-finite.
    InvalidCoordinates,
}

/// Per-load tally of what the normalizer did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeReport {
    /// Raw records seen.
    pub features: u64,
    /// Records that produced a [`NormalizedCrash`].
    pub kept: u64,
    /// Records dropped for missing coordinates.
    pub missing_coordinates: u64,
    /// Records dropped for zero or non-finite coordinates.
    pub invalid_coordinates: u64,
    /// Per field, how many kept records fell back to the default because
    /// the field was absent or unparseable.
    pub defaulted: BTreeMap<CanonicalField, u64>,
}

impl NormalizeReport {
    /// Total records dropped.
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.missing_coordinates + self.invalid_coordinates
    }

    fn record_default(&mut self, field: CanonicalField) {
        *self.defaulted.entry(field).or_default() += 1;
    }
}

/// Normalizes one raw record. Returns `None` if the record has no usable
/// coordinates.
#[must_use]
pub fn normalize(raw: &RawFeature, fields: &FieldMapping) -> Option<NormalizedCrash> {
    normalize_with_report(raw, fields, &mut NormalizeReport::default()).ok()
}

/// Normalizes a batch of raw records, preserving input order, and reports
/// progress one record at a time.
#[must_use]
pub fn normalize_features(
    features: &[RawFeature],
    fields: &FieldMapping,
    progress: &Arc<dyn ProgressCallback>,
) -> (Vec<NormalizedCrash>, NormalizeReport) {
    let mut report = NormalizeReport::default();
    let mut crashes = Vec::with_capacity(features.len());

    progress.set_total(features.len() as u64);

    for (index, raw) in features.iter().enumerate() {
        report.features += 1;
        match normalize_with_report(raw, fields, &mut report) {
            Ok(crash) => {
                report.kept += 1;
                crashes.push(crash);
            }
            Err(DropReason::MissingCoordinates) => {
                report.missing_coordinates += 1;
                log::debug!("Dropping record {index}: missing coordinates");
            }
            Err(DropReason::InvalidCoordinates) => {
                report.invalid_coordinates += 1;
                log::debug!("Dropping record {index}: zero or non-finite coordinates");
            }
        }
        progress.inc(1);
    }

    log::info!(
        "Normalized {}/{} crash records ({} missing coordinates, {} invalid coordinates)",
        report.kept,
        report.features,
        report.missing_coordinates,
        report.invalid_coordinates,
    );
    for (field, count) in &report.defaulted {
        log::debug!("{count} records defaulted {field} to its fallback");
    }
    progress.finish(format!("normalized {} records", report.kept));

    (crashes, report)
}

fn normalize_with_report(
    raw: &RawFeature,
    fields: &FieldMapping,
    report: &mut NormalizeReport,
) -> Result<NormalizedCrash, DropReason> {
    let (latitude, longitude) = extract_coordinates(raw, fields)?;

    let mut count = |field: CanonicalField| {
        resolve(raw, fields.aliases(field))
            .and_then(parse_count)
            .unwrap_or_else(|| {
                report.record_default(field);
                0
            })
    };
    let speed_limit = count(CanonicalField::SpeedLimit);
    let injury_count = count(CanonicalField::InjuryCount);
    let fatality_count = count(CanonicalField::FatalityCount);

    let cost = resolve(raw, fields.aliases(CanonicalField::Cost))
        .and_then(parse_amount)
        .unwrap_or_else(|| {
            report.record_default(CanonicalField::Cost);
            0.0
        });

    let mut text = |field: CanonicalField| {
        let value = resolve(raw, fields.aliases(field)).and_then(parse_text);
        if value.is_none() {
            report.record_default(field);
        }
        value
    };
    let timestamp_raw = text(CanonicalField::Timestamp);
    let units_involved_raw = text(CanonicalField::UnitsInvolved);

    Ok(NormalizedCrash {
        latitude,
        longitude,
        timestamp_raw,
        speed_limit,
        injury_count,
        fatality_count,
        cost,
        units_involved_raw,
    })
}

/// Extracts `(latitude, longitude)` from the record.
fn extract_coordinates(
    raw: &RawFeature,
    fields: &FieldMapping,
) -> Result<(f64, f64), DropReason> {
    let (latitude, longitude) = match raw {
        RawFeature::Geojson(feature) => {
            let Some(geometry) = feature.geometry.as_ref() else {
                return Err(DropReason::MissingCoordinates);
            };
            // GeoJSON positions are [lon, lat].
            let geojson::Value::Point(position) = &geometry.value else {
                return Err(DropReason::MissingCoordinates);
            };
            match (position.get(1), position.first()) {
                (Some(lat), Some(lng)) => (*lat, *lng),
                _ => return Err(DropReason::MissingCoordinates),
            }
        }
        RawFeature::Row(_) => {
            let lat = resolve(raw, fields.aliases(CanonicalField::Latitude))
                .and_then(parse_coordinate);
            let lng = resolve(raw, fields.aliases(CanonicalField::Longitude))
                .and_then(parse_coordinate);
            match (lat, lng) {
                (Some(lat), Some(lng)) => (lat, lng),
                _ => return Err(DropReason::MissingCoordinates),
            }
        }
    };

    valid_lat_lng(latitude, longitude).ok_or(DropReason::InvalidCoordinates)
}

/// Tries each alias in order and returns the first non-empty value.
fn resolve<'a>(raw: &'a RawFeature, aliases: &[String]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|alias| raw.property(alias))
        .find(|value| !is_empty_value(value))
}
