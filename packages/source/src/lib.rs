#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Crash dataset definitions, loading and field normalization.
//!
//! Each dataset vintage is described by a [`dataset_def::DatasetDefinition`]
//! that implements [`CrashSource`]: it knows how to fetch its raw file,
//! parse it into [`RawFeature`]s, and normalize those into canonical
//! [`NormalizedCrash`] records regardless of which property names that
//! vintage used.

pub mod csv_file;
pub mod dataset_def;
pub mod geojson_file;
pub mod loader;
pub mod normalize;
pub mod parsing;
pub mod precomputed;
pub mod progress;
pub mod registry;

use std::sync::Arc;

use async_trait::async_trait;
use crash_map_crash_models::NormalizedCrash;
use serde_json::{Map, Value};

use crate::loader::DatasetLocation;
use crate::normalize::NormalizeReport;
use crate::progress::ProgressCallback;

/// Errors that can occur while loading crash data.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing failed.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document parsed but does not have the expected shape.
    #[error("Unexpected document format: {message}")]
    Format {
        /// Description of what went wrong.
        message: String,
    },

    /// The location's file extension names a different format than the
    /// dataset definition reads.
    #[error("{location} looks like {found} but dataset {dataset_id} reads {expected}")]
    FormatMismatch {
        /// Id of the dataset definition.
        dataset_id: String,
        /// The offending location.
        location: String,
        /// Format the definition parses.
        expected: dataset_def::DatasetFormat,
        /// Format implied by the extension.
        found: dataset_def::DatasetFormat,
    },

    /// No dataset definition with the requested id.
    #[error("Unknown dataset: {id}")]
    UnknownDataset {
        /// The requested id.
        id: String,
    },
}

/// One input record as read from a dataset file. Read-only to the pipeline.
#[derive(Debug, Clone)]
pub enum RawFeature {
    /// A `GeoJSON` feature; coordinates come from its point geometry.
    Geojson(geojson::Feature),
    /// A flat tabular row; coordinates come from latitude/longitude columns.
    Row(Map<String, Value>),
}

impl RawFeature {
    /// Looks up a raw property by exact name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Geojson(feature) => feature.properties.as_ref()?.get(name),
            Self::Row(row) => row.get(name),
        }
    }
}

/// Trait that all crash datasets implement.
///
/// Each source knows how to fetch its raw records and normalize them into
/// the canonical [`NormalizedCrash`] format.
#[async_trait]
pub trait CrashSource: Send + Sync {
    /// Returns a unique identifier for this dataset (e.g., `"austin_crashes"`).
    fn id(&self) -> &str;

    /// Returns the human-readable name of this dataset.
    fn name(&self) -> &str;

    /// Reads and parses the raw records at `location`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the file cannot be read or is not a
    /// document of the expected format.
    async fn fetch(&self, location: &DatasetLocation) -> Result<Vec<RawFeature>, SourceError>;

    /// Normalizes raw records into canonical crashes, dropping records
    /// without usable coordinates.
    fn normalize(
        &self,
        features: &[RawFeature],
        progress: &Arc<dyn ProgressCallback>,
    ) -> (Vec<NormalizedCrash>, NormalizeReport);
}
