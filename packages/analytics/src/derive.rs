//! Derived attribute calculator.
//!
//! Extends each [`NormalizedCrash`] with the hour of day, the severity score
//! and the unit involvement flags. Every function here is total: bad input
//! resolves to a documented default instead of an error.

use crash_map_crash_models::{
    DerivedCrash, HOURS_PER_DAY, Involvement, InvolvementSet, NormalizedCrash,
    OTHER_EXCLUSION_TERMS, severity,
};

/// Derives the computed attributes of one crash.
#[must_use]
pub fn derive(normalized: NormalizedCrash) -> DerivedCrash {
    let hour = normalized.timestamp_raw.as_deref().map_or(0, parse_hour);
    let severity = severity(normalized.injury_count, normalized.fatality_count);
    let involvement = involvement_from_units(normalized.units_involved_raw.as_deref());

    DerivedCrash {
        normalized,
        hour,
        severity,
        involvement,
    }
}

/// Derives every crash in a batch, preserving order.
#[must_use]
pub fn derive_all(crashes: Vec<NormalizedCrash>) -> Vec<DerivedCrash> {
    crashes.into_iter().map(derive).collect()
}

/// Extracts the hour of day from a free-text timestamp such as
/// `"01/05/2021 08:15 PM"`.
///
/// The second space-separated token is the time; its leading digits before
/// the first `:` are the 12-hour clock hour. A `PM` anywhere in the string
/// adds 12 (except to 12); an `AM` turns 12 into 0. Anything that does not
/// yield an hour in `0..=23` returns `0`, so a garbled timestamp is
/// indistinguishable from midnight.
#[must_use]
pub fn parse_hour(timestamp: &str) -> u8 {
    let Some(time) = timestamp.split(' ').nth(1) else {
        return 0;
    };
    let head = time.split(':').next().unwrap_or_default();
    let digits_end = head
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(head.len());
    let Ok(mut hour) = head[..digits_end].parse::<u32>() else {
        return 0;
    };

    if timestamp.contains("PM") && hour != 12 {
        hour = hour.saturating_add(12);
    }
    if timestamp.contains("AM") && hour == 12 {
        hour = 0;
    }

    u8::try_from(hour)
        .ok()
        .filter(|h| *h < HOURS_PER_DAY)
        .unwrap_or(0)
}

/// Matches unit categories in the free-text units-involved field.
///
/// Matching is case-insensitive substring search; categories are
/// independent. [`Involvement::Other`] is set when none of the primary
/// category names (or `"passenger car"`) appears. A missing or blank field
/// yields an empty set.
#[must_use]
pub fn involvement_from_units(units: Option<&str>) -> InvolvementSet {
    let Some(units) = units.map(str::trim).filter(|s| !s.is_empty()) else {
        return InvolvementSet::empty();
    };
    let text = units.to_lowercase();

    let mut set: InvolvementSet = Involvement::named()
        .iter()
        .copied()
        .filter(|category| category.aliases().iter().any(|alias| text.contains(alias)))
        .collect();

    if !OTHER_EXCLUSION_TERMS.iter().any(|term| text.contains(term)) {
        set.insert(Involvement::Other);
    }

    set
}
