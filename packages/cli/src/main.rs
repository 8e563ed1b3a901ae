#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the crash map data pipeline.
//!
//! Loads a crash dataset, runs it through the pipeline and prints the
//! result as JSON on stdout, in the shapes the map and chart renderers
//! consume. Without a subcommand an interactive prompt picks one.
//!
//! Uses `indicatif-log-bridge` (via [`crash_map_cli_utils::init_logger`])
//! so log lines on stderr and the load progress bar never fight for the
//! terminal.

mod interactive;

use std::path::Path;

use clap::{Args, Parser, Subcommand};
use crash_map_analytics::CrashDataset;
use crash_map_analytics::top_spots::{DEFAULT_CELL_SIZE_DEGREES, TopSpotOptions};
use crash_map_analytics_models::{
    ColorBreaks, ColorScheme, FilterState, HourFilter, LegendEntry, PointColoring, SpeedBand,
};
use crash_map_cli_utils::{IndicatifProgress, MultiProgress};
use crash_map_source::CrashSource as _;
use crash_map_source::loader::{DatasetLoader, DatasetLocation};
use crash_map_source::normalize::NormalizeReport;
use crash_map_source::precomputed::{self, PrecomputedKind};
use crash_map_source::registry::{all_datasets, find_dataset};
use serde::Serialize;

/// Directory the precomputed aggregate files live in by default.
const PRECOMPUTED_DIR: &str = "public/data";

#[derive(Parser)]
#[command(name = "crash_map_cli", about = "Crash map data pipeline")]
struct Cli {
    /// Dataset definition id (see `datasets`)
    #[arg(
        long,
        global = true,
        env = "CRASH_MAP_DATASET",
        default_value = "austin_crashes"
    )]
    dataset: String,
    /// File path or `http(s)` URL overriding the dataset's default location
    #[arg(long, global = true, env = "CRASH_MAP_INPUT")]
    input: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Filter predicates shared by every view command.
#[derive(Args, Clone, Copy)]
pub struct FilterArgs {
    /// Hour of day to keep (`all` or 0-23)
    #[arg(long, default_value = "all")]
    hour: HourFilter,
    /// Speed-limit band to keep (`all`, `≤25`, `26-35`, `36-45`, `46-55`, `>55`)
    #[arg(long, default_value = "all")]
    speed_band: SpeedBand,
}

impl From<FilterArgs> for FilterState {
    fn from(args: FilterArgs) -> Self {
        Self::default()
            .with_hour(args.hour)
            .with_speed_band(args.speed_band)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the configured crash datasets
    Datasets,
    /// Load the dataset and print the normalize report and color breaks
    Summary,
    /// Print filtered points (`[lat, lng, attributes]`), or colored points
    /// with tooltips when `--color` is given
    Points {
        #[command(flatten)]
        filter: FilterArgs,
        /// Color scheme (`severity`, `injury`, `fatality`, `cost`, or an
        /// involvement: `pedestrian`, `bicycle`, `motorcycle`, `truck`, `bus`,
        /// `emergency`)
        #[arg(long)]
        color: Option<PointColoring>,
    },
    /// Print the legend for a color scheme
    Legend {
        /// Color scheme, as for `points --color`
        #[arg(long, default_value_t = PointColoring::default())]
        color: PointColoring,
    },
    /// Print quantile breaks and legend entries for each color scheme
    Quantiles {
        /// Only this scheme
        #[arg(long)]
        scheme: Option<ColorScheme>,
    },
    /// Print crash counts per speed band
    SpeedBins {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Print crash counts and average cost per hour of day
    Trend {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Print grid-clustered top spots
    TopSpots {
        #[command(flatten)]
        filter: FilterArgs,
        /// Grid cell edge in degrees
        #[arg(long, default_value_t = DEFAULT_CELL_SIZE_DEGREES)]
        cell_size: f64,
        /// Drop cells with fewer crashes
        #[arg(long, default_value_t = 1)]
        min_count: u64,
        /// Keep at most this many spots
        #[arg(long)]
        limit: Option<usize>,
        /// Cluster each hour separately, keyed by hour
        #[arg(long)]
        by_hour: bool,
    },
    /// Load a precomputed aggregate file (defaults to `public/data/<kind file>`
    /// unless `--input` is given)
    Precomputed {
        /// `speed-bins`, `hourly-trend`, `top-spots` or `hourly-top-spots`
        kind: PrecomputedKind,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary<'a> {
    dataset_id: &'a str,
    records: usize,
    report: &'a NormalizeReport,
    breaks: &'a ColorBreaks,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SchemeQuantiles {
    scheme: ColorScheme,
    title: &'static str,
    breaks: Vec<f64>,
    legend: Vec<LegendEntry>,
}

#[derive(Serialize)]
struct Legend {
    color: PointColoring,
    title: &'static str,
    entries: Vec<LegendEntry>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = crash_map_cli_utils::init_logger();
    let mut cli = Cli::parse();

    let command = match cli.command.take() {
        Some(command) => command,
        None => interactive::prompt_command()?,
    };

    run(&cli, command, &multi).await
}

#[allow(clippy::too_many_lines)]
async fn run(
    cli: &Cli,
    command: Commands,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Datasets => {
            println!("{:<22} {:<8} NAME", "ID", "FORMAT");
            println!("{}", "-".repeat(60));
            for dataset in &all_datasets() {
                println!(
                    "{:<22} {:<8} {}",
                    dataset.id(),
                    dataset.format,
                    dataset.name()
                );
            }
        }
        Commands::Summary => {
            let (dataset_id, dataset, report) = load(cli, multi).await?;
            print_json(&Summary {
                dataset_id: &dataset_id,
                records: dataset.len(),
                report: &report,
                breaks: dataset.breaks(),
            })?;
        }
        Commands::Points { filter, color } => {
            let (_, dataset, _) = load(cli, multi).await?;
            let view = dataset.view(filter.into());
            match color {
                Some(scheme) => print_json(&view.colored_points(scheme))?,
                None => print_json(&view.points())?,
            }
        }
        Commands::Quantiles { scheme } => {
            let (_, dataset, _) = load(cli, multi).await?;
            let schemes = scheme.map_or_else(|| ColorScheme::all().to_vec(), |s| vec![s]);
            let output: Vec<SchemeQuantiles> = schemes
                .into_iter()
                .map(|scheme| SchemeQuantiles {
                    scheme,
                    title: scheme.title(),
                    breaks: dataset.breaks().for_scheme(scheme).as_slice().to_vec(),
                    legend: dataset.legend(scheme.into()),
                })
                .collect();
            print_json(&output)?;
        }
        Commands::Legend { color } => {
            let (_, dataset, _) = load(cli, multi).await?;
            print_json(&Legend {
                color,
                title: color.title(),
                entries: dataset.legend(color),
            })?;
        }
        Commands::SpeedBins { filter } => {
            let (_, dataset, _) = load(cli, multi).await?;
            print_json(&dataset.view(filter.into()).speed_bins())?;
        }
        Commands::Trend { filter } => {
            let (_, dataset, _) = load(cli, multi).await?;
            print_json(&dataset.view(filter.into()).hourly_trend())?;
        }
        Commands::TopSpots {
            filter,
            cell_size,
            min_count,
            limit,
            by_hour,
        } => {
            let (_, dataset, _) = load(cli, multi).await?;
            let options = TopSpotOptions {
                cell_size_degrees: cell_size,
                min_count,
                limit,
            };
            let view = dataset.view(filter.into());
            if by_hour {
                print_json(&view.hourly_top_spots(&options))?;
            } else {
                print_json(&view.top_spots(&options))?;
            }
        }
        Commands::Precomputed { kind } => {
            let location = cli.input.as_deref().map_or_else(
                || DatasetLocation::Path(Path::new(PRECOMPUTED_DIR).join(kind.default_file_name())),
                DatasetLocation::from,
            );
            let label = kind.to_string();
            match kind {
                PrecomputedKind::SpeedBins => {
                    let bins = precomputed::load_speed_bins(&location);
                    print_json(&precomputed::or_empty(&label, bins).await)?;
                }
                PrecomputedKind::HourlyTrend => {
                    let trend = precomputed::load_hourly_trend(&location);
                    print_json(&precomputed::or_empty(&label, trend).await)?;
                }
                PrecomputedKind::TopSpots => {
                    let spots = precomputed::load_top_spots(&location);
                    print_json(&precomputed::or_empty(&label, spots).await)?;
                }
                PrecomputedKind::HourlyTopSpots => {
                    let hourly = precomputed::load_hourly_top_spots(&location);
                    print_json(&precomputed::or_empty(&label, hourly).await)?;
                }
            }
        }
    }

    Ok(())
}

/// Loads the selected dataset and prepares it for display.
///
/// A failed fetch is not an error here: it is logged and yields an empty
/// dataset, so every view prints an empty result.
async fn load(
    cli: &Cli,
    multi: &MultiProgress,
) -> Result<(String, CrashDataset, NormalizeReport), Box<dyn std::error::Error>> {
    let definition = find_dataset(&cli.dataset)?;
    let location = cli
        .input
        .as_deref()
        .map_or_else(|| definition.default_location(), DatasetLocation::from);
    definition.check_location(&location)?;

    let loader = DatasetLoader::new();
    let progress = IndicatifProgress::load_bar(multi, definition.id());
    let loaded = loader
        .load(&definition, &location, &progress)
        .await
        .into_loaded()
        .ok_or("dataset load was superseded")?;

    if loaded.crashes.is_empty() {
        log::warn!("[{}] No crashes loaded from {location}", loaded.dataset_id);
    }

    Ok((
        loaded.dataset_id,
        CrashDataset::new(loaded.crashes),
        loaded.report,
    ))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crash_map_crash_models::Involvement;

    use super::*;

    #[test]
    fn parses_filter_and_color_flags() {
        let cli = Cli::try_parse_from([
            "crash_map_cli",
            "points",
            "--hour",
            "17",
            "--speed-band",
            "26-35",
            "--color",
            "cost",
        ])
        .unwrap();
        assert_eq!(cli.dataset, "austin_crashes");
        let Some(Commands::Points { filter, color }) = cli.command else {
            panic!("expected the points command");
        };
        assert_eq!(color, Some(PointColoring::Graded(ColorScheme::Cost)));
        let state = FilterState::from(filter);
        assert_eq!(state.hour_filter, HourFilter::Hour(17));
        assert_eq!(state.speed_limit_band, SpeedBand::From26To35);
    }

    #[test]
    fn parses_involvement_coloring_and_global_flags() {
        let cli = Cli::try_parse_from([
            "crash_map_cli",
            "legend",
            "--color",
            "pedestrian",
            "--dataset",
            "austin_crashes_csv",
            "--input",
            "crashes.csv",
        ])
        .unwrap();
        assert_eq!(cli.dataset, "austin_crashes_csv");
        assert_eq!(cli.input.as_deref(), Some("crashes.csv"));
        assert!(matches!(
            cli.command,
            Some(Commands::Legend {
                color: PointColoring::Involved(Involvement::Pedestrian)
            })
        ));
    }

    #[test]
    fn parses_scheme_and_precomputed_kind() {
        let cli = Cli::try_parse_from(["crash_map_cli", "quantiles", "--scheme", "fatality"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Quantiles {
                scheme: Some(ColorScheme::Fatality)
            })
        ));

        let cli = Cli::try_parse_from(["crash_map_cli", "precomputed", "hourly-top-spots"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Precomputed {
                kind: PrecomputedKind::HourlyTopSpots
            })
        ));
    }

    #[test]
    fn legacy_band_ids_and_defaults() {
        let cli = Cli::try_parse_from(["crash_map_cli", "speed-bins", "--speed-band", "55+"])
            .unwrap();
        let Some(Commands::SpeedBins { filter }) = cli.command else {
            panic!("expected the speed-bins command");
        };
        let state = FilterState::from(filter);
        assert_eq!(state.hour_filter, HourFilter::All);
        assert_eq!(state.speed_limit_band, SpeedBand::Over55);
    }

    #[test]
    fn rejects_unknown_values() {
        assert!(Cli::try_parse_from(["crash_map_cli", "points", "--color", "other"]).is_err());
        assert!(Cli::try_parse_from(["crash_map_cli", "trend", "--hour", "24"]).is_err());
        assert!(
            Cli::try_parse_from(["crash_map_cli", "speed-bins", "--speed-band", "fast"]).is_err()
        );
    }

    #[test]
    fn no_subcommand_leaves_command_empty() {
        let cli = Cli::try_parse_from(["crash_map_cli"]).unwrap();
        assert!(cli.command.is_none());
    }
}
