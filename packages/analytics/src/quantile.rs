//! Quantile estimator for color-scale breaks.
//!
//! Linear-interpolation quantiles (R's "type 7"): for probe `q` over `n`
//! sorted values the rank is `q × (n - 1)`, and the result interpolates
//! between the two neighbouring order statistics.

use crash_map_analytics_models::{ColorBreaks, ColorScheme, QuantileBreaks};
use crash_map_crash_models::DerivedCrash;

use crate::filter::point_attributes;

/// Computes one quantile per probe, in probe order.
///
/// `NaN` values are ignored. With no values left every probe maps to `0`.
/// Probes outside `[0, 1]` are clamped.
#[must_use]
pub fn quantiles(values: &[f64], probes: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return vec![0.0; probes.len()];
    }
    sorted.sort_by(f64::total_cmp);

    probes
        .iter()
        .map(|q| interpolate(&sorted, q.clamp(0.0, 1.0)))
        .collect()
}

/// `lower + frac × (upper − lower)`, rounded twice (no `mul_add`).
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops
)]
fn interpolate(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let base = pos.floor() as usize;
    let frac = pos - pos.floor();
    match sorted.get(base + 1) {
        Some(next) => sorted[base] + frac * (next - sorted[base]),
        None => sorted[base],
    }
}

/// Computes the breaks for one color scheme over the full record set.
#[must_use]
pub fn scheme_breaks(crashes: &[DerivedCrash], scheme: ColorScheme) -> QuantileBreaks {
    let values: Vec<f64> = crashes
        .iter()
        .map(|crash| point_attributes(crash).value_for(scheme))
        .collect();
    QuantileBreaks::new(quantiles(&values, scheme.probes()))
}

/// Computes breaks for every color scheme over the full record set.
///
/// With no records the default breaks are kept so the legend still has
/// something sensible to show.
#[must_use]
pub fn color_breaks(crashes: &[DerivedCrash]) -> ColorBreaks {
    if crashes.is_empty() {
        return ColorBreaks::default();
    }
    let breaks = ColorBreaks {
        severity: scheme_breaks(crashes, ColorScheme::Severity),
        injury: scheme_breaks(crashes, ColorScheme::Injury),
        fatality: scheme_breaks(crashes, ColorScheme::Fatality),
        cost: scheme_breaks(crashes, ColorScheme::Cost),
    };
    log::debug!(
        "Computed color breaks over {} crashes: cost {:?}",
        crashes.len(),
        breaks.cost.as_slice()
    );
    breaks
}
