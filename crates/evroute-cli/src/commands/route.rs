//! Route command handler for planning a trip between two coordinates.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Args, ValueEnum};

use evroute_lib::{
    plan_trip, Error as PlanError, InfeasibleLeg, PlannerConfig, RouteAlgorithm, StationTable,
    TollEdges, TripInputs, TripRequest,
};

use crate::commands::vehicles::load_vehicle_catalog;
use crate::commands::{resolve_data_path, DataPaths, STATIONS_ENV, TOLLS_ENV};
use crate::output::{render_itinerary_json, render_itinerary_text, OutputFormat};
use crate::terminal::ColorPalette;

/// Search strategy accepted by `--algorithm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AlgorithmArg {
    /// Uniform-cost search.
    Ucs,
    /// A* search guided by distance to the destination.
    #[default]
    AStar,
}

impl From<AlgorithmArg> for RouteAlgorithm {
    fn from(value: AlgorithmArg) -> Self {
        match value {
            AlgorithmArg::Ucs => RouteAlgorithm::UniformCost,
            AlgorithmArg::AStar => RouteAlgorithm::AStar,
        }
    }
}

/// Arguments for the route command.
#[derive(Args, Debug, Clone)]
pub struct RouteCommandArgs {
    /// Vehicle model name (see `evroute vehicles`).
    #[arg(long)]
    pub vehicle: String,
    /// Start coordinate as `lat,lng`.
    #[arg(long = "from", value_parser = parse_coordinate, allow_hyphen_values = true)]
    pub from: (f64, f64),
    /// Destination coordinate as `lat,lng`.
    #[arg(long = "to", value_parser = parse_coordinate, allow_hyphen_values = true)]
    pub to: (f64, f64),
    /// Starting battery level in percent (0-100).
    #[arg(long)]
    pub battery: f64,
    /// Avoid station-to-station transitions flagged as toll edges.
    #[arg(long)]
    pub avoid_tolls: bool,
    /// Search strategy.
    #[arg(long, value_enum, default_value_t = AlgorithmArg::AStar)]
    pub algorithm: AlgorithmArg,
    /// Planner configuration JSON file; missing fields keep their defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Search time budget in seconds.
    #[arg(long)]
    pub timeout: Option<f64>,
    /// Expand only the K candidates closest to the destination at each step.
    #[arg(long, conflicts_with = "no_pruning")]
    pub max_candidates: Option<usize>,
    /// Expand every feasible candidate (slower, but not limited to the top K).
    #[arg(long)]
    pub no_pruning: bool,
    /// Average driving speed in km/h.
    #[arg(long)]
    pub speed: Option<f64>,
}

impl RouteCommandArgs {
    /// Convert CLI args to a library trip request.
    pub fn to_request(&self) -> TripRequest {
        TripRequest::new(self.from, self.to, self.battery)
            .with_algorithm(self.algorithm.into())
            .avoiding_tolls(self.avoid_tolls)
    }

    /// Build the planner configuration: file first, then flag overrides.
    pub fn planner_config(&self) -> Result<PlannerConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config from {}", path.display()))?;
                PlannerConfig::from_json(&json)
                    .with_context(|| format!("invalid config in {}", path.display()))?
            }
            None => PlannerConfig::default(),
        };

        if let Some(timeout) = self.timeout {
            config.search.time_budget_secs = timeout;
        }
        if let Some(limit) = self.max_candidates {
            config.search.max_candidates = Some(limit);
        }
        if self.no_pruning {
            config.search.max_candidates = None;
        }
        if let Some(speed) = self.speed {
            config.average_speed_kmh = speed;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Parse a `lat,lng` pair.
fn parse_coordinate(value: &str) -> std::result::Result<(f64, f64), String> {
    let (lat, lng) = value
        .split_once(',')
        .ok_or_else(|| format!("expected 'lat,lng', got '{value}'"))?;
    let lat = lat
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid latitude '{}': {err}", lat.trim()))?;
    let lng = lng
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid longitude '{}': {err}", lng.trim()))?;
    Ok((lat, lng))
}

/// Handle the route subcommand.
pub fn handle_route_command(
    paths: &DataPaths,
    format: OutputFormat,
    args: &RouteCommandArgs,
) -> Result<()> {
    let config = args.planner_config()?;
    let catalog = load_vehicle_catalog(paths.vehicles.as_deref())?;
    let vehicle = catalog.require(&args.vehicle)?;
    let stations = load_stations(paths.stations.as_deref())?;
    let tolls = if args.avoid_tolls {
        load_tolls(paths.tolls.as_deref())?
    } else {
        None
    };

    let mut inputs = TripInputs::new(vehicle, &stations);
    if let Some(tolls) = &tolls {
        inputs = inputs.with_tolls(tolls);
    }

    let itinerary = plan_trip(&inputs, &args.to_request(), &config).map_err(friendly_error)?;

    match format {
        OutputFormat::Text => print!(
            "{}",
            render_itinerary_text(&itinerary, &ColorPalette::detect())
        ),
        OutputFormat::Json => {
            render_itinerary_json(&itinerary).context("failed to write JSON output")?
        }
    }
    Ok(())
}

fn load_stations(flag: Option<&Path>) -> Result<StationTable> {
    let path = resolve_data_path(flag, STATIONS_ENV, Some("charging_stations.csv"))
        .ok_or_else(|| {
            anyhow!("charging station data not found; pass --stations or set {STATIONS_ENV}")
        })?;
    StationTable::from_path(&path)
        .with_context(|| format!("failed to load stations from {}", path.display()))
}

fn load_tolls(flag: Option<&Path>) -> Result<Option<TollEdges>> {
    let Some(path) = resolve_data_path(flag, TOLLS_ENV, Some("toll_edges.csv")) else {
        tracing::warn!("toll avoidance requested but no toll-edge table was found");
        return Ok(None);
    };
    let tolls = TollEdges::from_path(&path)
        .with_context(|| format!("failed to load toll edges from {}", path.display()))?;
    Ok(Some(tolls))
}

fn friendly_error(err: PlanError) -> anyhow::Error {
    let hint = match &err {
        PlanError::NoFeasiblePath { .. } => "Try a larger --timeout or --no-pruning.",
        PlanError::Infeasible {
            leg: InfeasibleLeg::FirstStation,
            ..
        } => "Try a higher --battery or a start point closer to a charging station.",
        PlanError::Infeasible {
            leg: InfeasibleLeg::Destination,
            ..
        } => "Try a higher --battery or a destination closer to a charging station.",
        _ => "",
    };
    if hint.is_empty() {
        return err.into();
    }
    match err.shortfall_km() {
        Some(shortfall) => anyhow!("{err} (short by {shortfall:.1} km). {hint}"),
        None => anyhow!("{err}. {hint}"),
    }
}
