//! Interactive command selection for when no subcommand is given.
//!
//! Walks the user through the same choices the flags expose: which view,
//! which hour and speed band, and for points which color scheme.

use crash_map_analytics::top_spots::DEFAULT_CELL_SIZE_DEGREES;
use crash_map_analytics_models::{ColorScheme, HourFilter, PointColoring, SpeedBand};
use crash_map_source::precomputed::PrecomputedKind;
use dialoguer::{Confirm, Input, Select};

use crate::{Commands, FilterArgs};

/// Top-level view selection.
enum View {
    Summary,
    Points,
    Quantiles,
    Legend,
    SpeedBins,
    Trend,
    TopSpots,
    Precomputed,
    Datasets,
}

impl View {
    const ALL: &[Self] = &[
        Self::Summary,
        Self::Points,
        Self::Quantiles,
        Self::Legend,
        Self::SpeedBins,
        Self::Trend,
        Self::TopSpots,
        Self::Precomputed,
        Self::Datasets,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Summary => "Dataset summary",
            Self::Points => "Map points",
            Self::Quantiles => "Color scale breaks",
            Self::Legend => "Map legend",
            Self::SpeedBins => "Crashes by speed limit",
            Self::Trend => "Crashes by hour of day",
            Self::TopSpots => "Top crash spots",
            Self::Precomputed => "Precomputed aggregate file",
            Self::Datasets => "List datasets",
        }
    }
}

const PRECOMPUTED_KINDS: &[PrecomputedKind] = &[
    PrecomputedKind::SpeedBins,
    PrecomputedKind::HourlyTrend,
    PrecomputedKind::TopSpots,
    PrecomputedKind::HourlyTopSpots,
];

/// Prompts for a command.
///
/// # Errors
///
/// Returns an error if a prompt cannot be shown or is aborted.
pub fn prompt_command() -> Result<Commands, dialoguer::Error> {
    println!("Crash Map");
    println!();

    let labels: Vec<&str> = View::ALL.iter().map(View::label).collect();
    let idx = Select::new()
        .with_prompt("What would you like to see?")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(match View::ALL[idx] {
        View::Summary => Commands::Summary,
        View::Datasets => Commands::Datasets,
        View::Quantiles => Commands::Quantiles {
            scheme: Some(prompt_scheme()?),
        },
        View::Legend => Commands::Legend {
            color: prompt_coloring()?,
        },
        View::Points => {
            let filter = prompt_filter()?;
            let colored = Confirm::new()
                .with_prompt("Resolve colors and tooltips?")
                .default(true)
                .interact()?;
            Commands::Points {
                filter,
                color: if colored {
                    Some(prompt_coloring()?)
                } else {
                    None
                },
            }
        }
        View::SpeedBins => Commands::SpeedBins {
            filter: prompt_filter()?,
        },
        View::Trend => Commands::Trend {
            filter: prompt_filter()?,
        },
        View::TopSpots => {
            let filter = prompt_filter()?;
            let cell_size: f64 = Input::new()
                .with_prompt("Grid cell size (degrees)")
                .default(DEFAULT_CELL_SIZE_DEGREES)
                .interact_text()?;
            let limit: usize = Input::new()
                .with_prompt("Maximum spots (0 = no limit)")
                .default(25)
                .interact_text()?;
            let by_hour = Confirm::new()
                .with_prompt("Cluster each hour separately?")
                .default(false)
                .interact()?;
            Commands::TopSpots {
                filter,
                cell_size,
                min_count: 1,
                limit: (limit > 0).then_some(limit),
                by_hour,
            }
        }
        View::Precomputed => {
            let labels: Vec<String> = PRECOMPUTED_KINDS
                .iter()
                .map(|kind| format!("{kind} ({})", kind.default_file_name()))
                .collect();
            let idx = Select::new()
                .with_prompt("Which aggregate?")
                .items(&labels)
                .default(0)
                .interact()?;
            Commands::Precomputed {
                kind: PRECOMPUTED_KINDS[idx],
            }
        }
    })
}

fn prompt_filter() -> Result<FilterArgs, dialoguer::Error> {
    let hour: HourFilter = Input::new()
        .with_prompt("Hour of day (all or 0-23)")
        .default(HourFilter::All)
        .interact_text()?;

    let bands: Vec<&str> = SpeedBand::all().iter().map(|b| b.label()).collect();
    let idx = Select::new()
        .with_prompt("Speed limit")
        .items(&bands)
        .default(0)
        .interact()?;

    Ok(FilterArgs {
        hour,
        speed_band: SpeedBand::all()[idx],
    })
}

fn prompt_scheme() -> Result<ColorScheme, dialoguer::Error> {
    let titles: Vec<&str> = ColorScheme::all().iter().map(|s| s.title()).collect();
    let default = ColorScheme::all()
        .iter()
        .position(|s| *s == ColorScheme::default())
        .unwrap_or(0);
    let idx = Select::new()
        .with_prompt("Color by")
        .items(&titles)
        .default(default)
        .interact()?;
    Ok(ColorScheme::all()[idx])
}

fn prompt_coloring() -> Result<PointColoring, dialoguer::Error> {
    let titles: Vec<&str> = PointColoring::all().iter().map(|c| c.title()).collect();
    let default = PointColoring::all()
        .iter()
        .position(|c| *c == PointColoring::default())
        .unwrap_or(0);
    let idx = Select::new()
        .with_prompt("Color by")
        .items(&titles)
        .default(default)
        .interact()?;
    Ok(PointColoring::all()[idx])
}
