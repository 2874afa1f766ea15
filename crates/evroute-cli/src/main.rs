use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use evroute_cli::commands::route::{handle_route_command, RouteCommandArgs};
use evroute_cli::commands::vehicles::handle_list_vehicles;
use evroute_cli::commands::DataPaths;
use evroute_cli::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan electric-vehicle trips with charging stops")]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
struct GlobalOptions {
    /// Charging-station CSV (name,address,lat,lng). Falls back to EVROUTE_STATIONS.
    #[arg(long, global = true)]
    stations: Option<PathBuf>,
    /// Vehicle catalog CSV. Falls back to EVROUTE_VEHICLES, then the built-in models.
    #[arg(long, global = true)]
    vehicles: Option<PathBuf>,
    /// Toll-edge CSV (from,to,toll). Falls back to EVROUTE_TOLLS.
    #[arg(long, global = true)]
    tolls: Option<PathBuf>,
    /// Output format.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl GlobalOptions {
    fn data_paths(&self) -> DataPaths {
        DataPaths {
            stations: self.stations.clone(),
            vehicles: self.vehicles.clone(),
            tolls: self.tolls.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan a trip between two coordinates, inserting charging stops as needed.
    Route(RouteCommandArgs),
    /// List the vehicle catalog.
    Vehicles,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        Command::Route(args) => {
            handle_route_command(&cli.global.data_paths(), cli.global.format, args)
        }
        Command::Vehicles => handle_list_vehicles(cli.global.vehicles.as_deref(), cli.global.format),
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
