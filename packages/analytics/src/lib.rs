#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Client-side crash data pipeline.
//!
//! Takes normalized crash records and produces everything the map and
//! charts consume: derived attributes, quantile color breaks, filtered
//! points, speed-bin counts, the hourly trend and top-spot clusters.
//! Every stage is a pure function of its inputs. [`CrashDataset`] bundles
//! the once-per-load work (deriving attributes, computing breaks) and hands
//! out [`DatasetView`]s that re-run filtering for each [`FilterState`].

pub mod aggregate;
pub mod color;
pub mod derive;
pub mod filter;
pub mod quantile;
pub mod top_spots;

use crash_map_analytics_models::{
    ColorBreaks, ColoredPoint, FilterState, FilteredPoint, HourlyTopSpots, HourlyTrendPoint,
    LegendEntry, PointColoring, SpeedBinCount, TopSpot,
};
use crash_map_crash_models::{DerivedCrash, NormalizedCrash};

use crate::top_spots::TopSpotOptions;

/// The derived record set and its color breaks, computed once per load.
///
/// Immutable after construction; a reload builds a new dataset.
#[derive(Debug, Clone, Default)]
pub struct CrashDataset {
    crashes: Vec<DerivedCrash>,
    breaks: ColorBreaks,
}

impl CrashDataset {
    /// Derives attributes for every record and computes color breaks over
    /// the full set.
    #[must_use]
    pub fn new(normalized: Vec<NormalizedCrash>) -> Self {
        let crashes = derive::derive_all(normalized);
        let breaks = quantile::color_breaks(&crashes);
        log::info!("Prepared {} crashes for display", crashes.len());
        Self { crashes, breaks }
    }

    /// The derived records, in load order.
    #[must_use]
    pub fn crashes(&self) -> &[DerivedCrash] {
        &self.crashes
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.crashes.len()
    }

    /// Whether the dataset holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.crashes.is_empty()
    }

    /// Color breaks for every scheme.
    #[must_use]
    pub const fn breaks(&self) -> &ColorBreaks {
        &self.breaks
    }

    /// Legend entries for a coloring.
    #[must_use]
    pub fn legend(&self, coloring: PointColoring) -> Vec<LegendEntry> {
        color::coloring_legend(&self.breaks, coloring)
    }

    /// A view of the records passing `state`.
    #[must_use]
    pub const fn view(&self, state: FilterState) -> DatasetView<'_> {
        DatasetView {
            dataset: self,
            state,
        }
    }
}

/// A [`CrashDataset`] seen through one [`FilterState`].
///
/// Holds no cached results: every method filters afresh.
#[derive(Debug, Clone, Copy)]
pub struct DatasetView<'a> {
    dataset: &'a CrashDataset,
    state: FilterState,
}

impl<'a> DatasetView<'a> {
    /// The filter state this view applies.
    #[must_use]
    pub const fn state(&self) -> FilterState {
        self.state
    }

    fn records(&self) -> impl Iterator<Item = &'a DerivedCrash> + 'a {
        filter::filter_records(&self.dataset.crashes, self.state)
    }

    /// Matching records as renderer points, in load order.
    #[must_use]
    pub fn points(&self) -> Vec<FilteredPoint> {
        filter::filter(&self.dataset.crashes, &self.state)
    }

    /// Matching points with color and tooltip resolved for `coloring`.
    #[must_use]
    pub fn colored_points(&self, coloring: PointColoring) -> Vec<ColoredPoint> {
        color::color_points(&self.points(), &self.dataset.breaks, coloring)
    }

    /// Crash counts per speed band over the matching records.
    #[must_use]
    pub fn speed_bins(&self) -> Vec<SpeedBinCount> {
        aggregate::speed_bin_counts(self.records())
    }

    /// Hourly counts and mean cost over the matching records.
    #[must_use]
    pub fn hourly_trend(&self) -> Vec<HourlyTrendPoint> {
        aggregate::hourly_trend(self.records())
    }

    /// Grid clusters over the matching records.
    #[must_use]
    pub fn top_spots(&self, options: &TopSpotOptions) -> Vec<TopSpot> {
        top_spots::top_spots(self.records(), options)
    }

    /// Per-hour grid clusters over the matching records.
    #[must_use]
    pub fn hourly_top_spots(&self, options: &TopSpotOptions) -> HourlyTopSpots {
        top_spots::hourly_top_spots(self.records(), options)
    }
}

#[cfg(test)]
mod tests {
    use crash_map_analytics_models::{ColorScheme, HourFilter, SpeedBand};
    use crash_map_crash_models::Involvement;

    use super::*;

    fn normalized(lat: f64, timestamp: &str, speed_limit: u32, cost: f64) -> NormalizedCrash {
        NormalizedCrash {
            latitude: lat,
            longitude: -97.74,
            timestamp_raw: Some(timestamp.to_string()),
            speed_limit,
            injury_count: 1,
            fatality_count: 0,
            cost,
            units_involved_raw: Some("Passenger Car".to_string()),
        }
    }

    fn dataset() -> CrashDataset {
        CrashDataset::new(vec![
            normalized(30.26, "01/01/2021 08:15 AM", 30, 100.0),
            normalized(30.27, "01/01/2021 08:45 AM", 45, 300.0),
            normalized(30.28, "01/01/2021 09:05 AM", 30, 50.0),
            normalized(30.29, "01/01/2021 11:30 PM", 65, 10_000.0),
        ])
    }

    #[test]
    fn identity_view_covers_whole_dataset() {
        let dataset = dataset();
        let view = dataset.view(FilterState::default());
        assert_eq!(view.points().len(), dataset.len());
        let counts: u64 = view.speed_bins().iter().map(|b| b.crash_count).sum();
        assert_eq!(counts, 4);
    }

    #[test]
    fn views_refilter_on_each_state() {
        let dataset = dataset();
        let morning = dataset.view(FilterState::default().with_hour(HourFilter::Hour(8)));
        assert_eq!(morning.points().len(), 2);
        let trend = morning.hourly_trend();
        assert_eq!(trend.len(), 1);
        assert_eq!(trend[0].total_crashes, 2);
        assert!((trend[0].avg_cost - 200.0).abs() < f64::EPSILON);

        let fast = dataset.view(FilterState::default().with_speed_band(SpeedBand::Over55));
        let points = fast.points();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].attributes().hour, 23);
    }

    #[test]
    fn breaks_are_computed_from_full_set() {
        let dataset = dataset();
        assert_eq!(dataset.breaks().cost.as_slice()[0], 50.0);
        assert_eq!(dataset.breaks().cost.as_slice()[3], 10_000.0);
        assert_eq!(dataset.legend(ColorScheme::Cost.into()).len(), 4);
    }

    #[test]
    fn colored_points_use_dataset_breaks() {
        let dataset = dataset();
        let colored = dataset
            .view(FilterState::default())
            .colored_points(ColorScheme::Cost.into());
        assert_eq!(colored.len(), 4);
        assert_eq!(colored[3].tooltip, "Cost: $10,000");
    }

    #[test]
    fn involvement_coloring_follows_units_text() {
        let mut crashes = vec![normalized(30.26, "01/01/2021 08:15 AM", 30, 100.0)];
        crashes[0].units_involved_raw = Some("Pedestrian, Passenger Car".to_string());
        crashes.push(normalized(30.27, "01/01/2021 08:45 AM", 30, 100.0));
        let dataset = CrashDataset::new(crashes);

        let coloring = PointColoring::Involved(Involvement::Pedestrian);
        let colored = dataset.view(FilterState::default()).colored_points(coloring);
        assert_eq!(colored[0].tooltip, "Pedestrian Involved\nCost: $100");
        assert_eq!(colored[1].tooltip, "No Pedestrian\nCost: $100");
        assert_ne!(colored[0].color, colored[1].color);
        assert_eq!(dataset.legend(coloring).len(), 2);
    }

    #[test]
    fn empty_dataset_produces_empty_views() {
        let dataset = CrashDataset::new(Vec::new());
        let view = dataset.view(FilterState::default());
        assert!(dataset.is_empty());
        assert!(view.points().is_empty());
        assert!(view.speed_bins().is_empty());
        assert!(view.hourly_trend().is_empty());
        assert!(view.top_spots(&TopSpotOptions::default()).is_empty());
        assert_eq!(dataset.breaks(), &ColorBreaks::default());
    }
}
