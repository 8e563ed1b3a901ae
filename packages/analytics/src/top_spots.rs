//! Top-spot clustering by square grid binning.
//!
//! Crashes are binned into cells of a fixed size in degrees; each non-empty
//! cell becomes one [`TopSpot`] holding the arithmetic means of its members.

use std::collections::BTreeMap;

use crash_map_analytics_models::{HourlyTopSpots, TopSpot};
use crash_map_crash_models::DerivedCrash;

/// Default cell edge, roughly 500 m of latitude.
pub const DEFAULT_CELL_SIZE_DEGREES: f64 = 0.005;

/// Tuning for [`top_spots`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopSpotOptions {
    /// Cell edge length in degrees. Non-positive or non-finite values fall
    /// back to [`DEFAULT_CELL_SIZE_DEGREES`].
    pub cell_size_degrees: f64,
    /// Cells with fewer crashes are dropped.
    pub min_count: u64,
    /// Keep at most this many spots.
    pub limit: Option<usize>,
}

impl Default for TopSpotOptions {
    fn default() -> Self {
        Self {
            cell_size_degrees: DEFAULT_CELL_SIZE_DEGREES,
            min_count: 1,
            limit: None,
        }
    }
}

impl TopSpotOptions {
    fn cell_size(&self) -> f64 {
        if self.cell_size_degrees.is_finite() && self.cell_size_degrees > 0.0 {
            self.cell_size_degrees
        } else {
            log::warn!(
                "Invalid top-spot cell size {}, using {DEFAULT_CELL_SIZE_DEGREES}",
                self.cell_size_degrees
            );
            DEFAULT_CELL_SIZE_DEGREES
        }
    }
}

#[derive(Default)]
struct Cell {
    count: u64,
    lat_sum: f64,
    lng_sum: f64,
    cost_sum: f64,
    severity_sum: f64,
}

impl Cell {
    fn add(&mut self, crash: &DerivedCrash) {
        self.count += 1;
        self.lat_sum += crash.latitude();
        self.lng_sum += crash.longitude();
        self.cost_sum += crash.cost();
        self.severity_sum += f64::from(crash.severity);
    }

    #[allow(clippy::cast_precision_loss)]
    fn into_spot(self) -> TopSpot {
        let n = self.count as f64;
        TopSpot {
            avg_lat: self.lat_sum / n,
            avg_lng: self.lng_sum / n,
            count: self.count,
            avg_cost: self.cost_sum / n,
            avg_severity: self.severity_sum / n,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn cell_key(crash: &DerivedCrash, cell_size: f64) -> (i64, i64) {
    (
        (crash.latitude() / cell_size).floor() as i64,
        (crash.longitude() / cell_size).floor() as i64,
    )
}

/// Clusters crashes into grid cells, most crashes first.
///
/// Ties on count are broken by ascending cell (south-west first), so the
/// output is deterministic.
#[must_use]
pub fn top_spots<'a, I>(records: I, options: &TopSpotOptions) -> Vec<TopSpot>
where
    I: IntoIterator<Item = &'a DerivedCrash>,
{
    let cell_size = options.cell_size();
    let mut cells: BTreeMap<(i64, i64), Cell> = BTreeMap::new();
    for crash in records {
        cells.entry(cell_key(crash, cell_size)).or_default().add(crash);
    }

    let mut ranked: Vec<((i64, i64), Cell)> = cells
        .into_iter()
        .filter(|(_, cell)| cell.count >= options.min_count)
        .collect();
    // Stable sort keeps the BTreeMap's ascending key order within a count.
    ranked.sort_by(|(_, a), (_, b)| b.count.cmp(&a.count));
    if let Some(limit) = options.limit {
        ranked.truncate(limit);
    }

    ranked.into_iter().map(|(_, cell)| cell.into_spot()).collect()
}

/// Clusters each hour's crashes separately, keyed by hour string
/// (`"0"`..`"23"`). Hours without crashes are absent.
#[must_use]
pub fn hourly_top_spots<'a, I>(records: I, options: &TopSpotOptions) -> HourlyTopSpots
where
    I: IntoIterator<Item = &'a DerivedCrash>,
{
    let mut by_hour: BTreeMap<u8, Vec<&DerivedCrash>> = BTreeMap::new();
    for crash in records {
        by_hour.entry(crash.hour).or_default().push(crash);
    }

    by_hour
        .into_iter()
        .map(|(hour, crashes)| (hour.to_string(), top_spots(crashes, options)))
        .collect()
}

#[cfg(test)]
mod tests {
    use crash_map_crash_models::NormalizedCrash;

    use super::*;
    use crate::derive::derive;

    const EPS: f64 = 1e-9;

    fn crash(lat: f64, lng: f64, hour: &str, injuries: u32, cost: f64) -> DerivedCrash {
        derive(NormalizedCrash {
            latitude: lat,
            longitude: lng,
            timestamp_raw: Some(format!("1/1/2020 {hour}")),
            speed_limit: 30,
            injury_count: injuries,
            fatality_count: 0,
            cost,
            units_involved_raw: None,
        })
    }

    fn sample() -> Vec<DerivedCrash> {
        vec![
            crash(30.2601, -97.7401, "8:00 AM", 1, 100.0),
            crash(30.2603, -97.7403, "8:10 AM", 3, 300.0),
            crash(30.2602, -97.7402, "5:00 PM", 2, 200.0),
            crash(30.3001, -97.7001, "8:20 AM", 0, 50.0),
        ]
    }

    #[test]
    fn clusters_nearby_crashes_with_means() {
        let spots = top_spots(&sample(), &TopSpotOptions::default());
        assert_eq!(spots.len(), 2);
        let busiest = &spots[0];
        assert_eq!(busiest.count, 3);
        assert!((busiest.avg_lat - 30.2602).abs() < EPS);
        assert!((busiest.avg_lng - -97.7402).abs() < EPS);
        assert!((busiest.avg_cost - 200.0).abs() < EPS);
        assert!((busiest.avg_severity - 2.0).abs() < EPS);
        assert_eq!(spots[1].count, 1);
    }

    #[test]
    fn min_count_and_limit_trim_results() {
        let records = sample();
        let options = TopSpotOptions {
            min_count: 2,
            ..TopSpotOptions::default()
        };
        assert_eq!(top_spots(&records, &options).len(), 1);

        let options = TopSpotOptions {
            limit: Some(1),
            ..TopSpotOptions::default()
        };
        let spots = top_spots(&records, &options);
        assert_eq!(spots.len(), 1);
        assert_eq!(spots[0].count, 3);
    }

    #[test]
    fn invalid_cell_size_falls_back_to_default() {
        let options = TopSpotOptions {
            cell_size_degrees: -1.0,
            ..TopSpotOptions::default()
        };
        assert_eq!(
            top_spots(&sample(), &options),
            top_spots(&sample(), &TopSpotOptions::default())
        );
    }

    #[test]
    fn ties_are_broken_south_west_first() {
        let records = vec![
            crash(30.5001, -97.5001, "1:00 AM", 0, 0.0),
            crash(30.1001, -97.9001, "1:00 AM", 0, 0.0),
        ];
        let spots = top_spots(&records, &TopSpotOptions::default());
        assert!(spots[0].avg_lat < spots[1].avg_lat);
    }

    #[test]
    fn hourly_spots_are_keyed_by_hour_string() {
        let hourly = hourly_top_spots(&sample(), &TopSpotOptions::default());
        let keys: Vec<&str> = hourly.keys().map(String::as_str).collect();
        assert_eq!(keys, ["17", "8"]);
        assert_eq!(hourly["8"].len(), 2);
        assert_eq!(hourly["8"][0].count, 2);
        assert_eq!(hourly["17"][0].count, 1);
    }

    #[test]
    fn empty_input_yields_no_spots() {
        assert!(top_spots(std::iter::empty(), &TopSpotOptions::default()).is_empty());
        assert!(hourly_top_spots(std::iter::empty(), &TopSpotOptions::default()).is_empty());
    }
}
