use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use windpath_cli::commands::compare::{handle_compare, CompareArgs};
use windpath_cli::commands::inspect::handle_inspect;
use windpath_cli::commands::route::{handle_route, RouteArgs};
use windpath_cli::output::OutputFormat;
use windpath_cli::sources::SourcePaths;

#[derive(Parser, Debug)]
#[command(author, version, about = "Drag-aware path planning through wind fields")]
struct Cli {
    /// Geometry file (JSON). Falls back to WINDPATH_GEOMETRY.
    #[arg(long, global = true)]
    geometry: Option<PathBuf>,

    /// Velocity samples (CSV or JSON). Falls back to WINDPATH_VELOCITY.
    #[arg(long, global = true)]
    velocity: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the environment and summarise its grid, obstacles, and wind.
    Inspect,
    /// Plan a route through the given waypoints.
    Route(RouteArgs),
    /// Compare distance-optimal and energy-optimal routes for scenarios.
    Compare(CompareArgs),
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let paths = SourcePaths::resolve(cli.geometry.as_deref(), cli.velocity.as_deref())?;

    match &cli.command {
        Command::Inspect => handle_inspect(&paths, cli.format),
        Command::Route(args) => handle_route(args, &paths, cli.format),
        Command::Compare(args) => handle_compare(args, &paths, cli.format),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
