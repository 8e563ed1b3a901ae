#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Canonical crash record types shared by every stage of the crash-map
//! pipeline.
//!
//! Raw input features (`GeoJSON` or CSV rows with inconsistent field naming)
//! are normalized into [`NormalizedCrash`] and then extended with derived
//! attributes into [`DerivedCrash`]. This crate also defines the unit
//! involvement taxonomy and the fixed severity weighting.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// How many injuries a single fatality is worth in the severity score.
pub const FATALITY_WEIGHT: u32 = 5;

/// Number of hours in a day; valid hours are `0..HOURS_PER_DAY`.
pub const HOURS_PER_DAY: u8 = 24;

/// Computes the crash severity score: `injuries + 5 × fatalities`.
///
/// Saturates instead of overflowing, so the score stays monotonic
/// non-decreasing in both arguments.
#[must_use]
pub const fn severity(injuries: u32, fatalities: u32) -> u32 {
    injuries.saturating_add(fatalities.saturating_mul(FATALITY_WEIGHT))
}

/// A category of unit involved in a crash, matched from the free-text
/// "units involved" field.
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
pub enum Involvement {
    /// A pedestrian was involved
    Pedestrian,
    /// A bicycle was involved
    Bicycle,
    /// A motorcycle was involved
    Motorcycle,
    /// A truck was involved
    Truck,
    /// A bus was involved
    Bus,
    /// A fire, police or other emergency vehicle was involved
    Emergency,
    /// None of the named unit categories (or a passenger car) matched
    Other,
}

impl Involvement {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Pedestrian,
            Self::Bicycle,
            Self::Motorcycle,
            Self::Truck,
            Self::Bus,
            Self::Emergency,
            Self::Other,
        ]
    }

    /// Returns the named categories, i.e. every variant except
    /// [`Self::Other`].
    #[must_use]
    pub const fn named() -> &'static [Self] {
        &[
            Self::Pedestrian,
            Self::Bicycle,
            Self::Motorcycle,
            Self::Truck,
            Self::Bus,
            Self::Emergency,
        ]
    }

    /// Lower-case substrings that flag this category when found anywhere in
    /// the lower-cased units-involved text.
    ///
    /// [`Self::Other`] has no aliases; it is computed from
    /// [`OTHER_EXCLUSION_TERMS`] instead.
    #[must_use]
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Pedestrian => &["pedestrian", "ped"],
            Self::Bicycle => &["bicycle", "bike"],
            Self::Motorcycle => &["motorcycle", "moto"],
            Self::Truck => &["truck"],
            Self::Bus => &["bus"],
            Self::Emergency => &["emergency", "fire", "police"],
            Self::Other => &[],
        }
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Terms whose presence rules out [`Involvement::Other`].
///
/// Only the primary category names count here, not the short aliases, so
/// `"bike"` flags [`Involvement::Bicycle`] while still leaving
/// [`Involvement::Other`] set.
pub const OTHER_EXCLUSION_TERMS: &[&str] = &[
    "pedestrian",
    "bicycle",
    "motorcycle",
    "truck",
    "bus",
    "emergency",
    "passenger car",
];

/// A set of [`Involvement`] flags. Categories are independent; a crash may
/// carry several at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<Involvement>", from = "Vec<Involvement>")]
pub struct InvolvementSet {
    bits: u8,
}

impl InvolvementSet {
    /// An empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Adds a category to the set.
    pub const fn insert(&mut self, involvement: Involvement) {
        self.bits |= involvement.bit();
    }

    /// Returns a copy of this set with `involvement` added.
    #[must_use]
    pub const fn with(mut self, involvement: Involvement) -> Self {
        self.insert(involvement);
        self
    }

    /// Whether the category is present.
    #[must_use]
    pub const fn contains(self, involvement: Involvement) -> bool {
        self.bits & involvement.bit() != 0
    }

    /// Whether no category is present.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Iterates over the present categories in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Involvement> {
        Involvement::all()
            .iter()
            .copied()
            .filter(move |i| self.contains(*i))
    }
}

impl From<InvolvementSet> for Vec<Involvement> {
    fn from(set: InvolvementSet) -> Self {
        set.iter().collect()
    }
}

impl From<Vec<Involvement>> for InvolvementSet {
    fn from(items: Vec<Involvement>) -> Self {
        items.into_iter().fold(Self::empty(), Self::with)
    }
}

impl FromIterator<Involvement> for InvolvementSet {
    fn from_iter<T: IntoIterator<Item = Involvement>>(iter: T) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

/// A crash record normalized to the canonical field set.
///
/// Records with missing, non-finite or zero coordinates never make it this
/// far, so coordinates are not optional. Numeric fields that were absent or
/// unparseable in the source are `0`; the source data does not let us tell
/// "absent" apart from "truly zero".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedCrash {
    /// Latitude (WGS84). Finite and non-zero.
    pub latitude: f64,
    /// Longitude (WGS84). Finite and non-zero.
    pub longitude: f64,
    /// Free-text crash timestamp, e.g. `"01/05/2021 08:15 PM"`.
    pub timestamp_raw: Option<String>,
    /// Posted speed limit in mph.
    pub speed_limit: u32,
    /// Number of people injured.
    pub injury_count: u32,
    /// Number of people killed.
    pub fatality_count: u32,
    /// Estimated total comprehensive cost in dollars.
    pub cost: f64,
    /// Free-text description of the units involved.
    pub units_involved_raw: Option<String>,
}

/// A [`NormalizedCrash`] extended with attributes derived from it.
///
/// Built once per load and never mutated; every derived field is a pure
/// function of the normalized fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedCrash {
    /// The normalized source fields.
    #[serde(flatten)]
    pub normalized: NormalizedCrash,
    /// Hour of day in `0..=23`.
    ///
    /// This is a lossy default: an unparseable or missing timestamp yields
    /// `0`, indistinguishable from a crash that really happened at
    /// midnight.
    pub hour: u8,
    /// `injury_count + 5 × fatality_count`.
    pub severity: u32,
    /// Unit categories matched in the units-involved text.
    pub involvement: InvolvementSet,
}

impl DerivedCrash {
    /// Latitude of the crash.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.normalized.latitude
    }

    /// Longitude of the crash.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.normalized.longitude
    }

    /// Posted speed limit in mph.
    #[must_use]
    pub const fn speed_limit(&self) -> u32 {
        self.normalized.speed_limit
    }

    /// Estimated total comprehensive cost.
    #[must_use]
    pub const fn cost(&self) -> f64 {
        self.normalized.cost
    }
}
