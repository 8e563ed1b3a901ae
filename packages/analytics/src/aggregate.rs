//! Aggregation views: speed-bin counts and the hourly trend.
//!
//! Both are group-then-reduce passes over any slice or filtered iterator of
//! derived crashes. Groups with no members are never emitted, so no
//! average is ever taken over zero records.

use std::collections::BTreeMap;

use crash_map_analytics_models::{HourlyTrendPoint, SpeedBand, SpeedBinCount};
use crash_map_crash_models::DerivedCrash;

/// Counts crashes per speed band.
///
/// Each crash is labelled with the band id it falls into (`"≤25"`,
/// `"26-35"`, ...). Only bands with at least one crash are returned,
/// ascending by band.
#[must_use]
pub fn speed_bin_counts<'a, I>(records: I) -> Vec<SpeedBinCount>
where
    I: IntoIterator<Item = &'a DerivedCrash>,
{
    let mut counts: BTreeMap<SpeedBand, u64> = BTreeMap::new();
    for crash in records {
        *counts.entry(SpeedBand::for_speed(crash.speed_limit())).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(band, crash_count)| SpeedBinCount {
            speed_bin: band.to_string(),
            crash_count,
        })
        .collect()
}

/// Counts crashes and averages cost per hour of day.
///
/// Only hours with at least one crash are returned, ascending by hour.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn hourly_trend<'a, I>(records: I) -> Vec<HourlyTrendPoint>
where
    I: IntoIterator<Item = &'a DerivedCrash>,
{
    let mut groups: BTreeMap<u8, (u64, f64)> = BTreeMap::new();
    for crash in records {
        let (count, total_cost) = groups.entry(crash.hour).or_default();
        *count += 1;
        *total_cost += crash.cost();
    }

    groups
        .into_iter()
        .map(|(hour, (total_crashes, total_cost))| HourlyTrendPoint {
            hour,
            total_crashes,
            avg_cost: total_cost / total_crashes as f64,
        })
        .collect()
}
