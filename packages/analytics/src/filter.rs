//! Filter engine.
//!
//! Applies the hour-of-day and speed-band predicates (always ANDed) to the
//! derived record set. Filtering is a pure, stable pass: output order
//! matches input order and the same inputs always give the same output.

use crash_map_analytics_models::{FilterState, FilteredPoint, PointAttributes};
use crash_map_crash_models::{DerivedCrash, Involvement};

/// Whether a crash passes every predicate in `state`.
#[must_use]
pub const fn matches(crash: &DerivedCrash, state: &FilterState) -> bool {
    state.hour_filter.matches(crash.hour) && state.speed_limit_band.contains(crash.speed_limit())
}

/// Projects the attributes the renderer needs for coloring and tooltips.
#[must_use]
pub const fn point_attributes(crash: &DerivedCrash) -> PointAttributes {
    let involvement = crash.involvement;
    PointAttributes {
        hour: crash.hour,
        speed_limit: crash.normalized.speed_limit,
        injury_count: crash.normalized.injury_count,
        fatality_count: crash.normalized.fatality_count,
        severity: crash.severity,
        cost: crash.normalized.cost,
        has_pedestrian: involvement.contains(Involvement::Pedestrian),
        has_bicycle: involvement.contains(Involvement::Bicycle),
        has_motorcycle: involvement.contains(Involvement::Motorcycle),
        has_truck: involvement.contains(Involvement::Truck),
        has_bus: involvement.contains(Involvement::Bus),
        has_emergency: involvement.contains(Involvement::Emergency),
        has_other: involvement.contains(Involvement::Other),
    }
}

/// Filters records into renderer points, preserving input order.
#[must_use]
pub fn filter(records: &[DerivedCrash], state: &FilterState) -> Vec<FilteredPoint> {
    filter_records(records, *state)
        .map(|crash| FilteredPoint(crash.latitude(), crash.longitude(), point_attributes(crash)))
        .collect()
}

/// Filters records, returning references to the matching crashes.
///
/// Used by the aggregation views, which need the full derived record.
pub fn filter_records(
    records: &[DerivedCrash],
    state: FilterState,
) -> impl Iterator<Item = &DerivedCrash> {
    records.iter().filter(move |crash| matches(crash, &state))
}
