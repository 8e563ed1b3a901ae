//! Loaders for precomputed aggregate files.
//!
//! The dashboard ships flat JSON arrays produced offline: speed-bin counts
//! (`bar_chart_speed_bins.json`), the hourly trend
//! (`hourly_crash_trend.json`), top-spot clusters and hourly top-spot
//! clusters keyed by hour string. These loaders read them from disk or a
//! URL and normalize their order so they can be handed to the same
//! renderer as aggregates computed from records.

use crash_map_analytics_models::{HourlyTopSpots, HourlyTrendPoint, SpeedBinCount, TopSpot};
use serde::de::DeserializeOwned;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::SourceError;
use crate::loader::{DatasetLocation, fetch_bytes};

/// Which precomputed aggregate a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum PrecomputedKind {
    /// `[{speed_bin, crash_count}]`
    SpeedBins,
    /// `[{hour, total_crashes, avg_cost}]`
    HourlyTrend,
    /// `[{avg_lat, avg_lng, count, avg_cost, avg_severity}]`
    TopSpots,
    /// `{"<hour>": [top spot, ...]}`
    HourlyTopSpots,
}

impl PrecomputedKind {
    /// Conventional file name of this aggregate.
    #[must_use]
    pub const fn default_file_name(self) -> &'static str {
        match self {
            Self::SpeedBins => "bar_chart_speed_bins.json",
            Self::HourlyTrend => "hourly_crash_trend.json",
            Self::TopSpots => "top_spots.json",
            Self::HourlyTopSpots => "hourly_top_spots.json",
        }
    }
}

async fn load_json<T: DeserializeOwned>(location: &DatasetLocation) -> Result<T, SourceError> {
    let bytes = fetch_bytes(location).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Loads speed-bin counts, sorted by the natural numeric order of their
/// labels.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be read or is not an array of
/// speed-bin records.
pub async fn load_speed_bins(
    location: &DatasetLocation,
) -> Result<Vec<SpeedBinCount>, SourceError> {
    let mut bins: Vec<SpeedBinCount> = load_json(location).await?;
    bins.sort_by(|a, b| a.natural_key().cmp(&b.natural_key()));
    Ok(bins)
}

/// Loads the hourly trend, sorted ascending by hour.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be read or is not an array of
/// trend records.
pub async fn load_hourly_trend(
    location: &DatasetLocation,
) -> Result<Vec<HourlyTrendPoint>, SourceError> {
    let mut trend: Vec<HourlyTrendPoint> = load_json(location).await?;
    trend.sort_by_key(|point| point.hour);
    Ok(trend)
}

/// Loads top-spot clusters, dropping spots whose coordinates are missing
/// or not numeric.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be read or is not an array of
/// top-spot records.
pub async fn load_top_spots(location: &DatasetLocation) -> Result<Vec<TopSpot>, SourceError> {
    let spots: Vec<TopSpot> = load_json(location).await?;
    Ok(retain_mappable(spots))
}

/// Loads hourly top-spot clusters keyed by hour string.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be read or is not a map of
/// hour to top-spot arrays.
pub async fn load_hourly_top_spots(
    location: &DatasetLocation,
) -> Result<HourlyTopSpots, SourceError> {
    let hourly: HourlyTopSpots = load_json(location).await?;
    Ok(hourly
        .into_iter()
        .map(|(hour, spots)| (hour, retain_mappable(spots)))
        .collect())
}

/// Runs a precomputed load, logging a failure and falling back to an empty
/// value so the view renders empty.
pub async fn or_empty<T, F>(label: &str, load: F) -> T
where
    T: Default,
    F: Future<Output = Result<T, SourceError>>,
{
    match load.await {
        Ok(value) => value,
        Err(e) => {
            log::error!("[{label}] Failed to load precomputed aggregate: {e}");
            T::default()
        }
    }
}

fn retain_mappable(spots: Vec<TopSpot>) -> Vec<TopSpot> {
    let total = spots.len();
    let kept: Vec<TopSpot> = spots
        .into_iter()
        .filter(TopSpot::has_finite_coordinates)
        .collect();
    if kept.len() < total {
        log::debug!(
            "Dropped {} top spots without numeric coordinates",
            total - kept.len()
        );
    }
    kept
}
