//! Command-line interface for the Tourway route planner.
//!
//! Three commands: `plan` answers a route query over a data directory or a
//! prepared database, `attraction` looks up an attraction by name, and
//! `prepare` persists a data directory into a SQLite database for faster
//! subsequent starts. Results are emitted as JSON on stdout.

#![forbid(unsafe_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tourway_core::{
    BusStrategy, ModeChoice, PlanError, PlannerConfig, RoutePlanner, RouteQuery,
};
use tourway_data::{load_directory, LoadError, LoadedData, SqliteStore, StoreError};

/// Errors surfaced by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Loading a data directory failed.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// Reading or writing the SQLite database failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The route query could not be answered.
    #[error(transparent)]
    Plan(#[from] PlanError),
    /// No attraction matched the requested name.
    #[error("no attraction matches {name:?}")]
    AttractionNotFound {
        /// The requested name fragment.
        name: String,
    },
    /// Serialising the result to JSON failed.
    #[error("failed to encode result: {source}")]
    Encode {
        /// Underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
    /// Writing to stdout failed.
    #[error("failed to write output: {source}")]
    Output {
        /// Underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

#[derive(Debug, Parser)]
#[command(
    name = "tourway",
    about = "Plan multi-stop attraction routes over prepared travel data",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute the best visiting order for a route query.
    Plan(PlanArgs),
    /// Look up an attraction by (partial) name.
    Attraction(AttractionArgs),
    /// Persist a data directory into a SQLite database.
    Prepare(PrepareArgs),
}

/// Where to read the prepared data set from.
#[derive(Debug, Clone, Args)]
struct DataSource {
    /// Directory of JSON Lines data files.
    #[arg(long, value_name = "dir", conflicts_with = "database")]
    data_dir: Option<PathBuf>,
    /// Prepared SQLite database.
    #[arg(long, value_name = "path")]
    database: Option<PathBuf>,
}

impl DataSource {
    fn load(&self) -> Result<LoadedData, CliError> {
        match (&self.data_dir, &self.database) {
            (Some(dir), _) => Ok(load_directory(dir)?),
            (None, Some(db)) => Ok(SqliteStore::open(db)?.load()?),
            (None, None) => Ok(load_directory(Path::new("data"))?),
        }
    }
}

#[derive(Debug, Clone, Args)]
struct PlanArgs {
    #[command(flatten)]
    source: DataSource,
    /// Code of the starting attraction.
    #[arg(long, value_name = "code")]
    start: String,
    /// Code of the final attraction.
    #[arg(long, value_name = "code")]
    end: String,
    /// Required intermediate attraction codes, repeatable.
    #[arg(long = "via", value_name = "code")]
    waypoints: Vec<String>,
    /// Transport mode: walk, drive, bus, or fastest.
    #[arg(long, default_value = "walk", value_name = "mode")]
    mode: String,
    /// Bus strategy: economic, fewest_transfers, fewest_walks, quickest.
    #[arg(long, value_name = "strategy")]
    strategy: Option<String>,
    /// Ceiling on required stops per query.
    #[arg(long, default_value_t = PlannerConfig::default().max_stops)]
    max_stops: usize,
}

#[derive(Debug, Clone, Args)]
struct AttractionArgs {
    #[command(flatten)]
    source: DataSource,
    /// Name or name fragment to search for.
    #[arg(value_name = "name")]
    name: String,
}

#[derive(Debug, Clone, Args)]
struct PrepareArgs {
    /// Directory of JSON Lines data files.
    #[arg(long, value_name = "dir")]
    data_dir: PathBuf,
    /// Destination SQLite database.
    #[arg(long, value_name = "path")]
    database: PathBuf,
}

/// Run the CLI with the current process arguments.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    match cli.command {
        Command::Plan(args) => plan(&args, &mut stdout.lock()),
        Command::Attraction(args) => attraction(&args, &mut stdout.lock()),
        Command::Prepare(args) => prepare(&args),
    }
}

fn plan(args: &PlanArgs, out: &mut impl Write) -> Result<(), CliError> {
    let query = build_query(args)?;
    let data = args.source.load()?;
    let planner = RoutePlanner::with_config(
        &data.attractions,
        &data.network,
        &data.polylines,
        PlannerConfig {
            max_stops: args.max_stops,
        },
    );
    let result = planner.plan(&query)?;
    writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
    Ok(())
}

/// Parse the mode and strategy strings before touching any data, so a
/// configuration error fails fast.
fn build_query(args: &PlanArgs) -> Result<RouteQuery, PlanError> {
    let mode: ModeChoice = args.mode.parse()?;
    let bus_strategy = args
        .strategy
        .as_deref()
        .map(str::parse::<BusStrategy>)
        .transpose()?;
    Ok(RouteQuery {
        start: args.start.clone(),
        end: args.end.clone(),
        waypoints: args.waypoints.clone(),
        mode,
        bus_strategy,
    })
}

fn attraction(args: &AttractionArgs, out: &mut impl Write) -> Result<(), CliError> {
    let data = args.source.load()?;
    let found = data
        .attractions
        .by_name(&args.name)
        .ok_or_else(|| CliError::AttractionNotFound {
            name: args.name.clone(),
        })?;
    writeln!(out, "{}", serde_json::to_string_pretty(found)?)?;
    Ok(())
}

fn prepare(args: &PrepareArgs) -> Result<(), CliError> {
    let data = load_directory(&args.data_dir)?;
    let mut store = SqliteStore::open(&args.database)?;
    store.persist(&data)?;
    log::info!(
        "prepared {} attractions ({} records skipped) into {}",
        data.attractions.len(),
        data.report.skipped,
        args.database.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    fn plan_args(mode: &str, strategy: Option<&str>) -> PlanArgs {
        PlanArgs {
            source: DataSource {
                data_dir: None,
                database: None,
            },
            start: "BELL".to_owned(),
            end: "PAGO".to_owned(),
            waypoints: vec!["WALL".to_owned()],
            mode: mode.to_owned(),
            strategy: strategy.map(str::to_owned),
            max_stops: 8,
        }
    }

    #[rstest]
    #[case("walk", None)]
    #[case("bus", Some("economic"))]
    #[case("fastest", None)]
    fn builds_queries_from_valid_declarations(#[case] mode: &str, #[case] strategy: Option<&str>) {
        let query = build_query(&plan_args(mode, strategy)).expect("valid declarations");
        assert_eq!(query.start, "BELL");
        assert_eq!(query.waypoints, vec!["WALL".to_owned()]);
    }

    #[rstest]
    #[case("hover", None)]
    #[case("bus", Some("scenic"))]
    fn rejects_unknown_declarations(#[case] mode: &str, #[case] strategy: Option<&str>) {
        let err = build_query(&plan_args(mode, strategy)).expect_err("unknown declaration");
        assert!(matches!(
            err,
            PlanError::UnknownMode { .. } | PlanError::UnknownStrategy { .. }
        ));
    }

    #[test]
    fn parses_a_plan_invocation() {
        let cli = Cli::try_parse_from([
            "tourway", "plan", "--data-dir", "data", "--start", "BELL", "--end", "PAGO", "--via",
            "WALL", "--via", "DRUM", "--mode", "bus", "--strategy", "quickest",
        ])
        .expect("valid invocation");
        let Command::Plan(args) = cli.command else {
            panic!("expected plan command");
        };
        assert_eq!(args.waypoints, vec!["WALL".to_owned(), "DRUM".to_owned()]);
        assert_eq!(args.mode, "bus");
    }
}
