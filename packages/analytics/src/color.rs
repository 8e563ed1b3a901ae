//! Point coloring, tooltips and legend entries for each color scheme.

use crash_map_analytics_models::{
    COLOR_INVOLVED, COLOR_NOT_INVOLVED, ColorBreaks, ColorScheme, ColoredPoint, FilteredPoint,
    LegendEntry, PointAttributes, PointColoring, QuantileBreaks, involvement_noun,
};
use crash_map_crash_models::Involvement;

/// Tooltip text for a point under the given coloring.
///
/// The first line describes the colored attribute. Schemes other than
/// cost add a `Cost:` line, and the count schemes add the counts they do
/// not already show. Lines are separated by `\n`.
#[must_use]
pub fn tooltip(attributes: &PointAttributes, coloring: PointColoring) -> String {
    let mut lines = vec![headline(attributes, coloring)];

    if coloring != PointColoring::Graded(ColorScheme::Cost) {
        lines.push(format!("Cost: {}", format_dollars(attributes.cost)));
    }

    let (show_injuries, show_fatalities) = match coloring {
        PointColoring::Graded(ColorScheme::Severity) => (true, true),
        PointColoring::Graded(ColorScheme::Injury) => (false, true),
        PointColoring::Graded(ColorScheme::Fatality) => (true, false),
        PointColoring::Graded(ColorScheme::Cost) | PointColoring::Involved(_) => (false, false),
    };
    if show_injuries && attributes.injury_count > 0 {
        lines.push(format!("Injuries: {}", attributes.injury_count));
    }
    if show_fatalities && attributes.fatality_count > 0 {
        lines.push(format!("Fatalities: {}", attributes.fatality_count));
    }

    lines.join("\n")
}

fn headline(attributes: &PointAttributes, coloring: PointColoring) -> String {
    match coloring {
        PointColoring::Graded(ColorScheme::Severity) => {
            let mut parts = Vec::new();
            if attributes.injury_count > 0 {
                parts.push(injuries(attributes.injury_count));
            }
            if attributes.fatality_count > 0 {
                parts.push(fatalities(attributes.fatality_count));
            }
            if parts.is_empty() {
                "No injuries or fatalities".to_string()
            } else {
                parts.join(", ")
            }
        }
        PointColoring::Graded(ColorScheme::Injury) => injuries(attributes.injury_count),
        PointColoring::Graded(ColorScheme::Fatality) => {
            if attributes.fatality_count > 0 {
                fatalities(attributes.fatality_count)
            } else {
                "No fatalities".to_string()
            }
        }
        PointColoring::Graded(ColorScheme::Cost) => {
            format!("Cost: {}", format_dollars(attributes.cost))
        }
        PointColoring::Involved(involvement) => {
            if attributes.involves(involvement) {
                involved_label(involvement)
            } else {
                not_involved_label(involvement)
            }
        }
    }
}

fn involved_label(involvement: Involvement) -> String {
    format!("{} Involved", involvement_noun(involvement))
}

fn not_involved_label(involvement: Involvement) -> String {
    format!("No {}", involvement_noun(involvement))
}

fn injuries(count: u32) -> String {
    if count == 1 {
        "1 injury".to_string()
    } else {
        format!("{count} injuries")
    }
}

fn fatalities(count: u32) -> String {
    if count == 1 {
        "1 fatality".to_string()
    } else {
        format!("{count} fatalities")
    }
}

/// Hex color for a point under the given coloring.
#[must_use]
pub fn point_color(
    attributes: &PointAttributes,
    breaks: &ColorBreaks,
    coloring: PointColoring,
) -> &'static str {
    match coloring {
        PointColoring::Graded(scheme) => breaks
            .for_scheme(scheme)
            .color(attributes.value_for(scheme)),
        PointColoring::Involved(involvement) => {
            if attributes.involves(involvement) {
                COLOR_INVOLVED
            } else {
                COLOR_NOT_INVOLVED
            }
        }
    }
}

/// Resolves color and tooltip for each filtered point.
#[must_use]
pub fn color_points(
    points: &[FilteredPoint],
    breaks: &ColorBreaks,
    coloring: PointColoring,
) -> Vec<ColoredPoint> {
    points
        .iter()
        .map(|point| {
            let attributes = point.attributes();
            ColoredPoint {
                latitude: point.latitude(),
                longitude: point.longitude(),
                color: point_color(attributes, breaks, coloring).to_string(),
                tooltip: tooltip(attributes, coloring),
            }
        })
        .collect()
}

/// Legend entries for a coloring: quantile ranges for a graded scheme, or
/// the fixed involved / not involved pair for a binary one.
#[must_use]
pub fn coloring_legend(breaks: &ColorBreaks, coloring: PointColoring) -> Vec<LegendEntry> {
    match coloring {
        PointColoring::Graded(scheme) => legend(breaks.for_scheme(scheme), scheme),
        PointColoring::Involved(involvement) => vec![
            LegendEntry {
                color: COLOR_INVOLVED.to_string(),
                label: involved_label(involvement),
            },
            LegendEntry {
                color: COLOR_NOT_INVOLVED.to_string(),
                label: not_involved_label(involvement),
            },
        ],
    }
}

/// Legend swatches for the active breaks, lowest bucket first.
///
/// One entry per reachable bucket: the first covers values below the
/// lowest rising threshold, the last covers values at or above the
/// highest.
#[must_use]
pub fn legend(breaks: &QuantileBreaks, scheme: ColorScheme) -> Vec<LegendEntry> {
    let thresholds: Vec<f64> = breaks
        .as_slice()
        .windows(2)
        .filter(|w| w[1] > w[0])
        .map(|w| w[1])
        .collect();
    let palette = breaks.palette();

    let Some((first, last)) = thresholds.first().zip(thresholds.last()) else {
        return vec![LegendEntry {
            color: palette[0].to_string(),
            label: "All".to_string(),
        }];
    };

    let mut entries = vec![LegendEntry {
        color: palette[0].to_string(),
        label: format!("< {}", format_value(*first, scheme)),
    }];
    for (i, pair) in thresholds.windows(2).enumerate() {
        entries.push(LegendEntry {
            color: palette[(i + 1).min(palette.len() - 1)].to_string(),
            label: format!(
                "{} - {}",
                format_value(pair[0], scheme),
                format_value(pair[1], scheme)
            ),
        });
    }
    entries.push(LegendEntry {
        color: palette[thresholds.len().min(palette.len() - 1)].to_string(),
        label: format!("≥ {}", format_value(*last, scheme)),
    });
    entries
}

fn format_value(value: f64, scheme: ColorScheme) -> String {
    match scheme {
        ColorScheme::Cost => format_dollars(value),
        ColorScheme::Severity | ColorScheme::Injury | ColorScheme::Fatality => {
            if value.fract() == 0.0 {
                format!("{value:.0}")
            } else {
                format!("{value:.2}")
            }
        }
    }
}

/// Formats a dollar amount rounded to whole dollars with thousands
/// separators, e.g. `$125,001`.
#[must_use]
pub fn format_dollars(amount: f64) -> String {
    format!("${}", group_thousands(amount))
}

#[allow(clippy::cast_possible_truncation)]
fn group_thousands(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use crash_map_analytics_models::{COLOR_HIGH, COLOR_LOW, COLOR_MINOR, COLOR_MODERATE};

    use super::*;

    fn attributes(injury_count: u32, fatality_count: u32, cost: f64) -> PointAttributes {
        PointAttributes {
            hour: 0,
            speed_limit: 30,
            injury_count,
            fatality_count,
            severity: crash_map_crash_models::severity(injury_count, fatality_count),
            cost,
            has_pedestrian: false,
            has_bicycle: false,
            has_motorcycle: false,
            has_truck: false,
            has_bus: false,
            has_emergency: false,
            has_other: true,
        }
    }

    fn involved(mut attrs: PointAttributes, involvement: Involvement) -> PointAttributes {
        match involvement {
            Involvement::Pedestrian => attrs.has_pedestrian = true,
            Involvement::Bicycle => attrs.has_bicycle = true,
            Involvement::Motorcycle => attrs.has_motorcycle = true,
            Involvement::Truck => attrs.has_truck = true,
            Involvement::Bus => attrs.has_bus = true,
            Involvement::Emergency => attrs.has_emergency = true,
            Involvement::Other => {}
        }
        attrs.has_other = false;
        attrs
    }

    #[test]
    fn severity_tooltip_lists_harm_then_details() {
        let severity = ColorScheme::Severity.into();
        assert_eq!(
            tooltip(&attributes(0, 0, 0.0), severity),
            "No injuries or fatalities\nCost: $0"
        );
        assert_eq!(
            tooltip(&attributes(2, 1, 40_000.0), severity),
            "2 injuries, 1 fatality\nCost: $40,000\nInjuries: 2\nFatalities: 1"
        );
        assert_eq!(
            tooltip(&attributes(0, 3, 0.0), severity),
            "3 fatalities\nCost: $0\nFatalities: 3"
        );
    }

    #[test]
    fn count_tooltips_pluralize_and_add_the_other_count() {
        let injury = ColorScheme::Injury.into();
        let fatality = ColorScheme::Fatality.into();
        assert_eq!(tooltip(&attributes(1, 0, 0.0), injury), "1 injury\nCost: $0");
        assert_eq!(
            tooltip(&attributes(0, 2, 0.0), injury),
            "0 injuries\nCost: $0\nFatalities: 2"
        );
        assert_eq!(tooltip(&attributes(0, 0, 0.0), fatality), "No fatalities\nCost: $0");
        assert_eq!(
            tooltip(&attributes(3, 2, 0.0), fatality),
            "2 fatalities\nCost: $0\nInjuries: 3"
        );
    }

    #[test]
    fn cost_tooltip_rounds_and_groups() {
        assert_eq!(
            tooltip(&attributes(4, 1, 125_000.5), ColorScheme::Cost.into()),
            "Cost: $125,001"
        );
        assert_eq!(format_dollars(999.4), "$999");
        assert_eq!(format_dollars(1_000.0), "$1,000");
        assert_eq!(format_dollars(12_345_678.0), "$12,345,678");
        assert_eq!(format_dollars(0.0), "$0");
    }

    #[test]
    fn involvement_tooltips_name_the_unit() {
        let pedestrian = PointColoring::Involved(Involvement::Pedestrian);
        let emergency = PointColoring::Involved(Involvement::Emergency);
        let hit = involved(attributes(1, 0, 2_500.0), Involvement::Pedestrian);
        assert_eq!(tooltip(&hit, pedestrian), "Pedestrian Involved\nCost: $2,500");
        assert_eq!(tooltip(&hit, emergency), "No Emergency Vehicle\nCost: $2,500");
    }

    #[test]
    fn involvement_colors_are_binary() {
        let points = [
            FilteredPoint(30.1, -97.1, involved(attributes(0, 0, 0.0), Involvement::Bus)),
            FilteredPoint(30.2, -97.2, attributes(5, 2, 900_000.0)),
        ];
        let colored = color_points(
            &points,
            &ColorBreaks::default(),
            PointColoring::Involved(Involvement::Bus),
        );
        assert_eq!(colored[0].color, COLOR_INVOLVED);
        assert_eq!(colored[1].color, COLOR_NOT_INVOLVED);
        assert_eq!(colored[0].tooltip, "Bus Involved\nCost: $0");
    }

    #[test]
    fn involvement_legend_has_two_fixed_entries() {
        let entries = coloring_legend(
            &ColorBreaks::default(),
            PointColoring::Involved(Involvement::Motorcycle),
        );
        assert_eq!(
            entries,
            [
                LegendEntry {
                    color: COLOR_HIGH.to_string(),
                    label: "Motorcycle Involved".to_string(),
                },
                LegendEntry {
                    color: COLOR_LOW.to_string(),
                    label: "No Motorcycle".to_string(),
                },
            ]
        );
        assert_eq!(
            coloring_legend(&ColorBreaks::default(), ColorScheme::Cost.into()),
            legend(&ColorBreaks::default().cost, ColorScheme::Cost)
        );
    }

    #[test]
    fn colors_points_by_active_scheme() {
        let points = [
            FilteredPoint(30.1, -97.1, attributes(0, 0, 5_000.0)),
            FilteredPoint(30.2, -97.2, attributes(0, 0, 20_000.0)),
            FilteredPoint(30.3, -97.3, attributes(0, 0, 75_000.0)),
            FilteredPoint(30.4, -97.4, attributes(0, 0, 150_000.0)),
        ];
        let colored = color_points(&points, &ColorBreaks::default(), ColorScheme::Cost.into());
        let colors: Vec<&str> = colored.iter().map(|p| p.color.as_str()).collect();
        assert_eq!(colors, [COLOR_LOW, COLOR_MINOR, COLOR_MODERATE, COLOR_HIGH]);
        assert_eq!(colored[1].tooltip, "Cost: $20,000");
        assert!((colored[2].latitude - 30.3).abs() < f64::EPSILON);
    }

    #[test]
    fn default_cost_legend_matches_dashboard_bands() {
        let entries = legend(&ColorBreaks::default().cost, ColorScheme::Cost);
        let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(
            labels,
            [
                "< $10,000",
                "$10,000 - $50,000",
                "$50,000 - $100,000",
                "≥ $100,000"
            ]
        );
        assert_eq!(entries[3].color, COLOR_HIGH);
    }

    #[test]
    fn fatality_legend_skips_yellow() {
        let entries = legend(&ColorBreaks::default().fatality, ColorScheme::Fatality);
        let colors: Vec<&str> = entries.iter().map(|e| e.color.as_str()).collect();
        assert_eq!(colors, [COLOR_LOW, COLOR_MODERATE, COLOR_HIGH]);
        assert_eq!(entries[0].label, "< 1");
        assert_eq!(entries[2].label, "≥ 2");
    }

    #[test]
    fn flat_breaks_collapse_legend() {
        let flat = QuantileBreaks::new(vec![0.0, 0.0, 0.0, 0.0]);
        let entries = legend(&flat, ColorScheme::Injury);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].label, "All");

        let skewed = QuantileBreaks::new(vec![0.0, 0.0, 0.0, 2.5]);
        let entries = legend(&skewed, ColorScheme::Severity);
        let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["< 2.50", "≥ 2.50"]);
    }
}
