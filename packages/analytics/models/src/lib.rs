#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter state, color scale and aggregate record types for the crash
//! pipeline.
//!
//! The filter engine consumes a [`FilterState`] and produces
//! [`FilteredPoint`]s; the aggregation views produce [`SpeedBinCount`],
//! [`HourlyTrendPoint`] and [`TopSpot`] records. The aggregate types use the
//! same `snake_case` field names as the precomputed JSON files so either
//! source can feed the renderer.

use std::collections::BTreeMap;
use std::str::FromStr;

use crash_map_crash_models::Involvement;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumString};

/// Green: lowest bucket.
pub const COLOR_LOW: &str = "#38a169";
/// Yellow: second bucket.
pub const COLOR_MINOR: &str = "#ecc94b";
/// Orange: third bucket.
pub const COLOR_MODERATE: &str = "#ed8936";
/// Red: highest bucket.
pub const COLOR_HIGH: &str = "#e53e3e";
/// Binary schemes: the unit was involved.
pub const COLOR_INVOLVED: &str = COLOR_HIGH;
/// Binary schemes: the unit was not involved.
pub const COLOR_NOT_INVOLVED: &str = COLOR_LOW;

// ── Filter state ─────────────────────────────────────────────────────────

/// Hour-of-day predicate: every hour, or one exact hour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HourFilter {
    /// Match every record.
    #[default]
    All,
    /// Match records whose derived hour equals this value exactly.
    Hour(u8),
}

impl HourFilter {
    /// Whether a record with the given derived hour passes.
    #[must_use]
    pub const fn matches(self, hour: u8) -> bool {
        match self {
            Self::All => true,
            Self::Hour(h) => h == hour,
        }
    }
}

/// Error returned when an hour filter string is neither `"all"` nor an
/// hour in `0..=23`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidHourFilterError {
    /// The rejected input.
    pub value: String,
}

impl std::fmt::Display for InvalidHourFilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid hour filter '{}': expected \"all\" or 0-23",
            self.value
        )
    }
}

impl std::error::Error for InvalidHourFilterError {}

impl FromStr for HourFilter {
    type Err = InvalidHourFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        match trimmed.parse::<u8>() {
            Ok(h) if h < 24 => Ok(Self::Hour(h)),
            _ => Err(InvalidHourFilterError {
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for HourFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Hour(h) => write!(f, "{h}"),
        }
    }
}

impl Serialize for HourFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_str("all"),
            Self::Hour(h) => serializer.serialize_u8(*h),
        }
    }
}

impl<'de> Deserialize<'de> for HourFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hour(u8),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hour(h) if h < 24 => Ok(Self::Hour(h)),
            Repr::Hour(h) => Err(serde::de::Error::custom(InvalidHourFilterError {
                value: h.to_string(),
            })),
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// A posted-speed-limit band used for filtering.
///
/// The named bands are contiguous, inclusive on both ends, and partition
/// `[0, ∞)`. [`Self::All`] is the identity predicate. The short ids used by
/// older dashboard builds (`25`, `35`, `45`, `55`, `55+`) parse to the same
/// bands.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
pub enum SpeedBand {
    /// Every speed limit
    #[default]
    #[serde(rename = "all")]
    #[strum(to_string = "all")]
    All,
    /// 0 through 25 mph
    #[serde(rename = "≤25", alias = "25", alias = "<=25")]
    #[strum(to_string = "≤25", serialize = "25", serialize = "<=25")]
    UpTo25,
    /// 26 through 35 mph
    #[serde(rename = "26-35", alias = "35")]
    #[strum(to_string = "26-35", serialize = "35")]
    From26To35,
    /// 36 through 45 mph
    #[serde(rename = "36-45", alias = "45")]
    #[strum(to_string = "36-45", serialize = "45")]
    From36To45,
    /// 46 through 55 mph
    #[serde(rename = "46-55", alias = "55")]
    #[strum(to_string = "46-55", serialize = "55")]
    From46To55,
    /// 56 mph and above
    #[serde(rename = ">55", alias = "55+")]
    #[strum(to_string = ">55", serialize = "55+")]
    Over55,
}

impl SpeedBand {
    /// Returns all variants, [`Self::All`] first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::All,
            Self::UpTo25,
            Self::From26To35,
            Self::From36To45,
            Self::From46To55,
            Self::Over55,
        ]
    }

    /// Returns the named bands in ascending order (excludes [`Self::All`]).
    #[must_use]
    pub const fn named() -> &'static [Self] {
        &[
            Self::UpTo25,
            Self::From26To35,
            Self::From36To45,
            Self::From46To55,
            Self::Over55,
        ]
    }

    /// Inclusive lower bound in mph.
    #[must_use]
    pub const fn min(self) -> u32 {
        match self {
            Self::All | Self::UpTo25 => 0,
            Self::From26To35 => 26,
            Self::From36To45 => 36,
            Self::From46To55 => 46,
            Self::Over55 => 56,
        }
    }

    /// Inclusive upper bound in mph.
    #[must_use]
    pub const fn max(self) -> u32 {
        match self {
            Self::UpTo25 => 25,
            Self::From26To35 => 35,
            Self::From36To45 => 45,
            Self::From46To55 => 55,
            Self::All | Self::Over55 => u32::MAX,
        }
    }

    /// Human-readable label for the band.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::UpTo25 => "≤ 25 mph",
            Self::From26To35 => "26-35 mph",
            Self::From36To45 => "36-45 mph",
            Self::From46To55 => "46-55 mph",
            Self::Over55 => "> 55 mph",
        }
    }

    /// Whether the speed limit falls inside this band (inclusive).
    #[must_use]
    pub const fn contains(self, speed_limit: u32) -> bool {
        speed_limit >= self.min() && speed_limit <= self.max()
    }

    /// Returns the single named band containing `speed_limit`.
    #[must_use]
    pub const fn for_speed(speed_limit: u32) -> Self {
        match speed_limit {
            0..=25 => Self::UpTo25,
            26..=35 => Self::From26To35,
            36..=45 => Self::From36To45,
            46..=55 => Self::From46To55,
            _ => Self::Over55,
        }
    }
}

/// The complete filter state driven by the UI.
///
/// Passed by value into every filter and aggregation call; the pipeline
/// holds no filter state of its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// Hour-of-day predicate.
    pub hour_filter: HourFilter,
    /// Speed-limit band predicate.
    pub speed_limit_band: SpeedBand,
}

impl FilterState {
    /// Returns a copy with the hour predicate replaced.
    #[must_use]
    pub const fn with_hour(mut self, hour_filter: HourFilter) -> Self {
        self.hour_filter = hour_filter;
        self
    }

    /// Returns a copy with the speed band replaced.
    #[must_use]
    pub const fn with_speed_band(mut self, band: SpeedBand) -> Self {
        self.speed_limit_band = band;
        self
    }
}

// ── Color scales ─────────────────────────────────────────────────────────

/// The numeric attribute used to color points.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
pub enum ColorScheme {
    /// Severity score (`injuries + 5 × fatalities`)
    Severity,
    /// Injury count
    Injury,
    /// Fatality count
    Fatality,
    /// Estimated comprehensive cost
    #[default]
    Cost,
}

impl ColorScheme {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Severity, Self::Injury, Self::Fatality, Self::Cost]
    }

    /// Quantile probes used to compute this scheme's breaks.
    #[must_use]
    pub const fn probes(self) -> &'static [f64] {
        match self {
            Self::Severity | Self::Injury | Self::Cost => &[0.0, 0.33, 0.66, 1.0],
            Self::Fatality => &[0.0, 0.5, 1.0],
        }
    }

    /// Breaks used before any data has been loaded.
    #[must_use]
    pub const fn default_breaks(self) -> &'static [f64] {
        match self {
            Self::Severity | Self::Injury => &[0.0, 1.0, 2.0, 3.0],
            Self::Fatality => &[0.0, 1.0, 2.0],
            Self::Cost => &[0.0, 10_000.0, 50_000.0, 100_000.0],
        }
    }

    /// Legend title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Severity => "Crash Severity",
            Self::Injury => "Injury Count",
            Self::Fatality => "Fatality Count",
            Self::Cost => "Crash Cost",
        }
    }
}

/// Ordered quantile thresholds for one numeric attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuantileBreaks {
    breaks: Vec<f64>,
}

impl QuantileBreaks {
    /// Wraps a computed list of breaks.
    #[must_use]
    pub const fn new(breaks: Vec<f64>) -> Self {
        Self { breaks }
    }

    /// The thresholds, in probe order.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.breaks
    }

    /// Number of thresholds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.breaks.len()
    }

    /// Whether there are no thresholds.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.breaks.is_empty()
    }

    /// Maps a value to a bucket index in `0..len()`.
    ///
    /// The index is the number of rising interior thresholds the value has
    /// reached. Flat runs (repeated thresholds from a skewed distribution)
    /// do not open new buckets, so an all-zero attribute keeps every zero in
    /// bucket 0. `NaN` maps to bucket 0.
    #[must_use]
    pub fn bucket(&self, value: f64) -> usize {
        self.breaks
            .windows(2)
            .filter(|w| w[1] > w[0] && value >= w[1])
            .count()
    }

    /// The palette matching this many thresholds.
    #[must_use]
    pub fn palette(&self) -> &'static [&'static str] {
        match self.breaks.len() {
            0 | 1 => &[COLOR_LOW],
            2 => &[COLOR_LOW, COLOR_HIGH],
            3 => &[COLOR_LOW, COLOR_MODERATE, COLOR_HIGH],
            _ => &[COLOR_LOW, COLOR_MINOR, COLOR_MODERATE, COLOR_HIGH],
        }
    }

    /// Hex color for a value.
    #[must_use]
    pub fn color(&self, value: f64) -> &'static str {
        let palette = self.palette();
        palette[self.bucket(value).min(palette.len() - 1)]
    }
}

impl From<&[f64]> for QuantileBreaks {
    fn from(breaks: &[f64]) -> Self {
        Self::new(breaks.to_vec())
    }
}

/// Breaks for every [`ColorScheme`], computed once per load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorBreaks {
    /// Severity score breaks.
    pub severity: QuantileBreaks,
    /// Injury count breaks.
    pub injury: QuantileBreaks,
    /// Fatality count breaks.
    pub fatality: QuantileBreaks,
    /// Cost breaks.
    pub cost: QuantileBreaks,
}

impl ColorBreaks {
    /// Returns the breaks for a scheme.
    #[must_use]
    pub const fn for_scheme(&self, scheme: ColorScheme) -> &QuantileBreaks {
        match scheme {
            ColorScheme::Severity => &self.severity,
            ColorScheme::Injury => &self.injury,
            ColorScheme::Fatality => &self.fatality,
            ColorScheme::Cost => &self.cost,
        }
    }
}

impl Default for ColorBreaks {
    fn default() -> Self {
        Self {
            severity: ColorScheme::Severity.default_breaks().into(),
            injury: ColorScheme::Injury.default_breaks().into(),
            fatality: ColorScheme::Fatality.default_breaks().into(),
            cost: ColorScheme::Cost.default_breaks().into(),
        }
    }
}

/// One legend swatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    /// Hex color.
    pub color: String,
    /// Range description.
    pub label: String,
}

/// How map points are colored.
///
/// Either a graded quantile scale over a numeric attribute, or a binary
/// scale over one involvement flag. Parses from and displays as the bare
/// id (`cost`, `pedestrian`, ...); [`Involvement::Other`] has no binary
/// scheme of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointColoring {
    /// Quantile-graded numeric attribute.
    Graded(ColorScheme),
    /// Red when the unit was involved, green otherwise.
    Involved(Involvement),
}

impl PointColoring {
    /// Every selectable coloring: the graded schemes, then one binary
    /// scheme per named involvement category.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Graded(ColorScheme::Severity),
            Self::Graded(ColorScheme::Injury),
            Self::Graded(ColorScheme::Fatality),
            Self::Graded(ColorScheme::Cost),
            Self::Involved(Involvement::Pedestrian),
            Self::Involved(Involvement::Bicycle),
            Self::Involved(Involvement::Motorcycle),
            Self::Involved(Involvement::Truck),
            Self::Involved(Involvement::Bus),
            Self::Involved(Involvement::Emergency),
        ]
    }

    /// Legend title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Graded(scheme) => scheme.title(),
            Self::Involved(Involvement::Pedestrian) => "Pedestrian Involvement",
            Self::Involved(Involvement::Bicycle) => "Bicycle Involvement",
            Self::Involved(Involvement::Motorcycle) => "Motorcycle Involvement",
            Self::Involved(Involvement::Truck) => "Truck Involvement",
            Self::Involved(Involvement::Bus) => "Bus Involvement",
            Self::Involved(Involvement::Emergency) => "Emergency Vehicle Involvement",
            Self::Involved(Involvement::Other) => "Other Unit Involvement",
        }
    }
}

/// Display name of an involvement category in tooltips and legends.
#[must_use]
pub const fn involvement_noun(involvement: Involvement) -> &'static str {
    match involvement {
        Involvement::Pedestrian => "Pedestrian",
        Involvement::Bicycle => "Bicycle",
        Involvement::Motorcycle => "Motorcycle",
        Involvement::Truck => "Truck",
        Involvement::Bus => "Bus",
        Involvement::Emergency => "Emergency Vehicle",
        Involvement::Other => "Other Unit",
    }
}

impl Default for PointColoring {
    fn default() -> Self {
        Self::Graded(ColorScheme::default())
    }
}

impl From<ColorScheme> for PointColoring {
    fn from(scheme: ColorScheme) -> Self {
        Self::Graded(scheme)
    }
}

/// Error returned when a coloring id names neither a graded scheme nor a
/// named involvement category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPointColoringError {
    /// The rejected input.
    pub value: String,
}

impl std::fmt::Display for InvalidPointColoringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown color scheme '{}'", self.value)
    }
}

impl std::error::Error for InvalidPointColoringError {}

impl FromStr for PointColoring {
    type Err = InvalidPointColoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(scheme) = trimmed.parse::<ColorScheme>() {
            return Ok(Self::Graded(scheme));
        }
        match trimmed.parse::<Involvement>() {
            Ok(Involvement::Other) | Err(_) => Err(InvalidPointColoringError {
                value: s.to_string(),
            }),
            Ok(involvement) => Ok(Self::Involved(involvement)),
        }
    }
}

impl std::fmt::Display for PointColoring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Graded(scheme) => f.write_str(scheme.as_ref()),
            Self::Involved(involvement) => f.write_str(involvement.as_ref()),
        }
    }
}

impl Serialize for PointColoring {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PointColoring {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ── Rendering boundary ───────────────────────────────────────────────────

/// Read-only projection of a derived crash used for coloring and tooltips.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct PointAttributes {
    /// Hour of day (`0` also stands in for an unknown timestamp).
    pub hour: u8,
    /// Posted speed limit in mph.
    pub speed_limit: u32,
    /// Number of people injured.
    pub injury_count: u32,
    /// Number of people killed.
    pub fatality_count: u32,
    /// Severity score.
    pub severity: u32,
    /// Estimated comprehensive cost.
    pub cost: f64,
    /// A pedestrian was involved.
    pub has_pedestrian: bool,
    /// A bicycle was involved.
    pub has_bicycle: bool,
    /// A motorcycle was involved.
    pub has_motorcycle: bool,
    /// A truck was involved.
    pub has_truck: bool,
    /// A bus was involved.
    pub has_bus: bool,
    /// An emergency vehicle was involved.
    pub has_emergency: bool,
    /// No named unit category matched.
    pub has_other: bool,
}

impl PointAttributes {
    /// The numeric value the given scheme colors by.
    #[must_use]
    pub fn value_for(&self, scheme: ColorScheme) -> f64 {
        match scheme {
            ColorScheme::Severity => f64::from(self.severity),
            ColorScheme::Injury => f64::from(self.injury_count),
            ColorScheme::Fatality => f64::from(self.fatality_count),
            ColorScheme::Cost => self.cost,
        }
    }

    /// Whether the unit category was flagged for this crash.
    #[must_use]
    pub const fn involves(&self, involvement: Involvement) -> bool {
        match involvement {
            Involvement::Pedestrian => self.has_pedestrian,
            Involvement::Bicycle => self.has_bicycle,
            Involvement::Motorcycle => self.has_motorcycle,
            Involvement::Truck => self.has_truck,
            Involvement::Bus => self.has_bus,
            Involvement::Emergency => self.has_emergency,
            Involvement::Other => self.has_other,
        }
    }
}

/// A point handed to the map renderer: `[latitude, longitude, attributes]`.
///
/// Serializes as a three-element JSON array, the shape point layers expect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilteredPoint(pub f64, pub f64, pub PointAttributes);

impl FilteredPoint {
    /// Latitude.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.0
    }

    /// Longitude.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.1
    }

    /// Attribute projection.
    #[must_use]
    pub const fn attributes(&self) -> &PointAttributes {
        &self.2
    }
}

/// A point with its resolved color and tooltip text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColoredPoint {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Hex color from the active scheme.
    pub color: String,
    /// Tooltip text.
    pub tooltip: String,
}

// ── Aggregates ───────────────────────────────────────────────────────────

/// Crash count for one speed-limit bucket (bar chart row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedBinCount {
    /// Bucket label, e.g. `"26-35"`.
    pub speed_bin: String,
    /// Number of crashes in the bucket.
    pub crash_count: u64,
}

impl SpeedBinCount {
    /// Sort key giving the bucket's natural ascending numeric order: the
    /// first run of digits in the label (`"≤25"` → 25, `"26-35"` → 26,
    /// `">55"` → 55). Labels without digits sort after every numeric one,
    /// alphabetically.
    #[must_use]
    pub fn natural_key(&self) -> (u64, &str) {
        let digits: String = self
            .speed_bin
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(char::is_ascii_digit)
            .collect();
        (digits.parse().unwrap_or(u64::MAX), self.speed_bin.as_str())
    }
}

/// Crash count and mean cost for one hour of day (trend line point).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyTrendPoint {
    /// Hour of day in `0..=23`.
    pub hour: u8,
    /// Number of crashes in this hour.
    pub total_crashes: u64,
    /// Arithmetic mean cost over the hour's crashes.
    pub avg_cost: f64,
}

/// A spatial cluster of nearby crashes summarized as one marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopSpot {
    /// Mean latitude of member crashes.
    #[serde(deserialize_with = "number_or_string")]
    pub avg_lat: f64,
    /// Mean longitude of member crashes.
    #[serde(deserialize_with = "number_or_string")]
    pub avg_lng: f64,
    /// Number of member crashes.
    pub count: u64,
    /// Mean cost of member crashes.
    #[serde(deserialize_with = "number_or_string")]
    pub avg_cost: f64,
    /// Mean severity of member crashes.
    #[serde(deserialize_with = "number_or_string")]
    pub avg_severity: f64,
}

impl TopSpot {
    /// Whether both mean coordinates are finite.
    #[must_use]
    pub const fn has_finite_coordinates(&self) -> bool {
        self.avg_lat.is_finite() && self.avg_lng.is_finite()
    }
}

/// Top spots keyed by hour-of-day string (`"0"`..`"23"`).
pub type HourlyTopSpots = BTreeMap<String, Vec<TopSpot>>;

/// Accepts a JSON number or a numeric string; anything unparseable becomes
/// `NaN` so the caller can drop it.
fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
        Null(()),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Number(n) => n,
        Repr::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
        Repr::Null(()) => f64::NAN,
    })
}
