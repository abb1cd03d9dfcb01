//! Command-line interface for `ttemkit`, a toolkit for preparing tTEM inversion
//! results and borehole logs for mapping.
//!
//! This binary provides a thin façade over the [`ttemkit_core`] library: it parses
//! arguments, configures logging, and delegates to command handlers.
//!
//! # Architecture
//!
//! The CLI is built using [`clap`] for argument parsing and [`tracing`] for structured logging.
//! Library crates log through the `log` facade, which is bridged into `tracing` at startup.
//!
//! # Available Commands
//!
//! - `sounding` - Clean, DOI-clip and resample Aarhus Workbench sounding exports
//! - `well` - Join lithology logs with collar locations and export point intervals
//! - `water-level` - Fetch groundwater levels of USGS monitoring wells
//! - `drivers` - List all available format drivers and their capabilities

mod display;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use chrono::{Datelike, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use reqwest::blocking::Client;
use tracing::{Level, error, info, warn};
use tracing_log::LogTracer;
use tracing_subscriber::FmtSubscriber;

use ttemkit_core::drivers::{
    Driver, get_available_drivers, get_drivers, list_drivers_with_capability,
};
use ttemkit_core::operations::export_as;
use ttemkit_core::water_level::{self, LevelKind, SiteLevel};
use ttemkit_core::well::well_geo_table;
use ttemkit_core::{
    Crs, DEFAULT_CRS, DoiSource, GeoTable, MatchPolicy, PipelineConfig, ResampleFactor,
    SoundingFormatter, SoundingSource, TtemError, WellFormatter, WellSource, export,
};

use crate::display::{
    display_drivers, display_drop_report, display_site_levels, display_station_summary,
};

#[derive(Parser)]
#[command(
    name = "ttemkit",
    version,
    about = "Format tTEM soundings and borehole logs for mapping",
    long_about = "ttemkit cleans Aarhus Workbench inversion exports, clips them at the depth of \
                  investigation, joins lithology logs with well locations, resamples both to \
                  constant thickness and exports point tables as CSV or GeoJSON."
)]
/// Command-line arguments and options for the `ttemkit` CLI.
///
/// This struct defines the top-level CLI interface, including global flags for
/// logging verbosity, the optional configuration file and the subcommand to execute.
struct Cli {
    /// Enable verbose (INFO level) logging output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug (DEBUG level) logging output with detailed diagnostics.
    #[arg(short, long, global = true)]
    debug: bool,

    /// TOML file with column aliases, header patterns and the match policy.
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the `ttemkit` CLI.
#[derive(Subcommand)]
enum Commands {
    /// Formats inverted tTEM soundings.
    ///
    /// Drops layers with unresolved standard deviations, applies the exclusion
    /// filters, removes layers below the depth of investigation and optionally
    /// resamples every sounding to constant thickness.
    Sounding(SoundingArgs),

    /// Joins lithology logs with well locations.
    ///
    /// Inputs may be CSV files or directories of CSV files; lithology and
    /// location tables are recognised by their columns.
    Well(WellArgs),

    /// Fetches groundwater levels of USGS monitoring wells.
    ///
    /// A failing well is reported and skipped.
    WaterLevel(WaterLevelArgs),

    /// Lists the format drivers and their capabilities.
    Drivers {
        /// Include planned drivers.
        #[arg(long, conflicts_with_all = ["readable", "writable"])]
        all: bool,

        /// Only drivers that can read input tables.
        #[arg(long)]
        readable: bool,

        /// Only drivers that can export tables.
        #[arg(long)]
        writable: bool,
    },
}

#[derive(Args)]
struct SoundingArgs {
    /// Aarhus Workbench `.xyz` sounding exports.
    #[arg(required = true, value_name = "FILE")]
    inputs: Vec<PathBuf>,

    /// DOI export(s) with UTMX, UTMY and Value columns.
    #[arg(long, value_name = "FILE")]
    doi: Vec<PathBuf>,

    /// Layer numbers to remove (comma separated).
    #[arg(long, value_name = "N", value_delimiter = ',', allow_negative_numbers = true)]
    exclude_layer: Vec<i64>,

    /// Line numbers to remove (comma separated).
    #[arg(long, value_name = "N", value_delimiter = ',', allow_negative_numbers = true)]
    exclude_line: Vec<i64>,

    /// Station ids to remove (comma separated).
    #[arg(long, value_name = "N", value_delimiter = ',', allow_negative_numbers = true)]
    exclude_id: Vec<i64>,

    /// Resample to this many bins per unit depth.
    #[arg(long, value_name = "FACTOR", allow_negative_numbers = true)]
    resample: Option<i64>,

    /// Fail when a location has no DOI value instead of dropping it.
    #[arg(long)]
    strict: bool,

    /// Projected CRS of UTMX/UTMY, e.g. `EPSG:32614`.
    #[arg(long, value_name = "CRS")]
    crs: Option<String>,

    /// Per-layer output (`.csv`, `.geojson`).
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Per-station summary output (`.csv`, `.geojson`).
    #[arg(long, value_name = "FILE")]
    summary_output: Option<PathBuf>,

    /// Output driver (e.g. `CSV`, `GeoJSON`); defaults to the file extension.
    #[arg(long, value_name = "DRIVER")]
    driver: Option<String>,
}

#[derive(Args)]
struct WellArgs {
    /// CSV files or directories holding lithology and location tables.
    #[arg(required = true, value_name = "PATH")]
    inputs: Vec<PathBuf>,

    /// CRS of the location coordinates.
    #[arg(long, value_name = "CRS", default_value = DEFAULT_CRS)]
    crs: String,

    /// Reproject the points into this CRS before export.
    #[arg(long, value_name = "CRS")]
    reproject: Option<String>,

    /// Resample to this many bins per unit depth.
    #[arg(long, value_name = "FACTOR", allow_negative_numbers = true)]
    resample: Option<i64>,

    /// Fail when a bore has no location instead of dropping it.
    #[arg(long)]
    strict: bool,

    /// Output file (`.csv`, `.geojson`).
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Output driver (e.g. `CSV`, `GeoJSON`); defaults to the file extension.
    #[arg(long, value_name = "DRIVER")]
    driver: Option<String>,
}

#[derive(Args)]
struct WaterLevelArgs {
    /// USGS site numbers or well names containing one.
    #[arg(required = true, value_name = "WELL")]
    sites: Vec<String>,

    /// Which level to report.
    #[arg(long, value_enum, default_value_t = LevelArg::Depth)]
    kind: LevelArg,

    /// Use the first measurement of this month instead of the latest one.
    #[arg(long, value_name = "YYYY-MM", value_parser = parse_month)]
    month: Option<Month>,

    /// CRS of the exported points.
    #[arg(long, value_name = "CRS", default_value = DEFAULT_CRS)]
    crs: String,

    /// Output file (`.csv`, `.geojson`).
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output driver (e.g. `CSV`, `GeoJSON`); defaults to the file extension.
    #[arg(long, value_name = "DRIVER")]
    driver: Option<String>,
}

/// Level selector of the `water-level` command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LevelArg {
    /// Depth to water below land surface
    Depth,
    /// Water-level elevation above NAVD88
    Navd88,
    /// Water-level elevation above NGVD29
    Ngvd29,
}

impl From<LevelArg> for LevelKind {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::Depth => LevelKind::Depth,
            LevelArg::Navd88 => LevelKind::Elevation("NAVD88".to_string()),
            LevelArg::Ngvd29 => LevelKind::Elevation("NGVD29".to_string()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Month {
    year: i32,
    month: u32,
}

fn parse_month(value: &str) -> std::result::Result<Month, String> {
    let date = NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d")
        .map_err(|_| format!("expected YYYY-MM, got '{value}'"))?;
    Ok(Month {
        year: date.year(),
        month: date.month(),
    })
}

/// Entry point for the `ttemkit` command-line interface.
///
/// Parses command-line arguments, configures the logging system based on
/// verbosity flags, and dispatches to the appropriate command handler. Errors
/// are printed with their recovery suggestion and turn into a failing exit code.
fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(cli.debug, cli.verbose) {
        eprintln!("Error: {err:#}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        },
    }
}

fn init_logging(debug: bool, verbose: bool) -> Result<()> {
    let log_level = if debug {
        Level::DEBUG
    } else if verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    // Bridge logs from the `log` crate to the `tracing` ecosystem.
    LogTracer::init()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn report_error(err: &anyhow::Error) {
    eprintln!("Error: {err}");
    if let Some(cause) = err.chain().find_map(|e| e.downcast_ref::<TtemError>()) {
        let message = cause.user_message();
        if message != err.to_string() {
            eprintln!("  {message}");
        }
        if let Some(suggestion) = cause.recovery_suggestion() {
            eprintln!("\nSuggestion: {suggestion}");
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => PipelineConfig::from_path(path)?,
        None => PipelineConfig::default(),
    };

    match cli.command {
        Commands::Sounding(args) => handle_sounding(args, &config),
        Commands::Well(args) => handle_well(args, &config),
        Commands::WaterLevel(args) => handle_water_level(&args),
        Commands::Drivers {
            all,
            readable,
            writable,
        } => {
            handle_drivers(all, readable, writable);
            Ok(())
        },
    }
}

fn handle_sounding(args: SoundingArgs, config: &PipelineConfig) -> Result<()> {
    info!("Formatting {} sounding file(s)", args.inputs.len());

    let mut options = config
        .sounding_options()
        .with_layer_exclusions(args.exclude_layer)
        .with_line_exclusions(args.exclude_line)
        .with_id_exclusions(args.exclude_id);
    for doi in args.doi {
        options = options.with_doi_source(DoiSource::File(doi));
    }
    if let Some(factor) = args.resample {
        options = options.with_resample(ResampleFactor::new(factor)?);
    }
    if args.strict {
        options = options.with_match_policy(MatchPolicy::Strict);
    }
    if let Some(crs) = args.crs {
        options = options.with_crs(crs);
    }

    let sources = args.inputs.into_iter().map(SoundingSource::File).collect();
    let formatter = SoundingFormatter::new(sources, options)?;
    display_drop_report("DOI filter", formatter.drop_report());

    let driver = write_table(
        &formatter.to_geo_table()?,
        &args.output,
        args.driver.as_deref(),
    )?;
    println!(
        "Wrote {} layers to {} ({})",
        formatter.records().len(),
        args.output.display(),
        driver.short_name
    );

    display_station_summary(&formatter.summary());

    if let Some(path) = args.summary_output {
        let table = formatter.summary_geo_table()?;
        let driver = write_table(&table, &path, args.driver.as_deref())?;
        println!(
            "Wrote {} stations to {} ({})",
            table.num_rows(),
            path.display(),
            driver.short_name
        );
    }
    Ok(())
}

fn handle_well(args: WellArgs, config: &PipelineConfig) -> Result<()> {
    info!("Formatting wells from {} input(s)", args.inputs.len());

    let factor = args.resample.map(ResampleFactor::new).transpose()?;
    let mut options = config.well_options().with_crs(args.crs);
    if args.strict {
        options = options.with_match_policy(MatchPolicy::Strict);
    }

    let sources = args
        .inputs
        .into_iter()
        .map(|path| {
            if path.is_dir() {
                WellSource::Directory(path)
            } else {
                WellSource::File(path)
            }
        })
        .collect();
    let mut formatter = WellFormatter::new(sources, options)?;
    display_drop_report("Well join", formatter.drop_report());

    if let Some(target) = &args.reproject {
        formatter.reproject(target)?;
    }

    let table = match factor {
        Some(factor) => well_geo_table(&formatter.resample(factor), formatter.crs())?,
        None => formatter.to_geo_table()?,
    };
    let driver = write_table(&table, &args.output, args.driver.as_deref())?;
    println!(
        "Wrote {} intervals to {} ({})",
        table.num_rows(),
        args.output.display(),
        driver.short_name
    );
    Ok(())
}

fn handle_water_level(args: &WaterLevelArgs) -> Result<()> {
    let target = Crs::parse(&args.crs)?;
    let kind = LevelKind::from(args.kind);
    let client = Client::builder()
        .user_agent(concat!("ttemkit/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to create the HTTP client")?;

    let mut sites = Vec::with_capacity(args.sites.len());
    for name in &args.sites {
        match site_level(&client, name, &kind, args.month) {
            Ok(site) => sites.push(site),
            Err(err) if err.is_recoverable() => {
                warn!("Skipping well '{name}': {}", err.user_message());
            },
            Err(err) => error!("Skipping well '{name}': {}", err.user_message()),
        }
    }

    if sites.is_empty() {
        bail!("no water levels retrieved for {} well(s)", args.sites.len());
    }
    if sites.len() < args.sites.len() {
        warn!(
            "{} of {} wells failed",
            args.sites.len() - sites.len(),
            args.sites.len()
        );
    }

    display_site_levels(&sites);

    if let Some(path) = &args.output {
        let table = water_level::site_levels_geo_table(&sites, &target)?;
        let driver = write_table(&table, path, args.driver.as_deref())?;
        println!(
            "Wrote {} wells to {} ({})",
            table.num_rows(),
            path.display(),
            driver.short_name
        );
    }
    Ok(())
}

fn site_level(
    client: &Client,
    name: &str,
    kind: &LevelKind,
    month: Option<Month>,
) -> ttemkit_core::Result<SiteLevel> {
    let site_no = water_level::site_number(name)?;
    let metadata = water_level::fetch_metadata(client, &site_no)?;
    let report = water_level::fetch_report(client, &site_no)?.filter(kind);

    let observation = match month {
        Some(Month { year, month }) => report.first_in_month(year, month),
        None => report.latest(),
    }
    .cloned();
    let level_m = observation.as_ref().and_then(|o| o.level_m(kind));
    info!(
        "Site {site_no}: {} matching observations, level {level_m:?} m",
        report.len()
    );

    Ok(SiteLevel {
        site_no,
        metadata,
        observation,
        kind: kind.clone(),
        level_m,
    })
}

/// Exports `table`, with an explicit driver when one is named.
fn write_table(table: &GeoTable, path: &Path, driver: Option<&str>) -> Result<Driver> {
    let driver = match driver {
        Some(name) => export_as(table, path, name)?,
        None => export(table, path)?,
    };
    Ok(driver)
}

fn handle_drivers(all: bool, readable: bool, writable: bool) {
    let drivers = if all {
        get_drivers()
    } else if readable || writable {
        list_drivers_with_capability(readable, writable)
    } else {
        get_available_drivers()
    };
    display_drivers(&drivers);
}
