//! Vehicles command handler for listing the vehicle catalog.

use std::path::Path;

use anyhow::{Context, Result};

use evroute_lib::VehicleCatalog;

use crate::commands::{resolve_data_path, VEHICLES_ENV};
use crate::output::{render_vehicles_json, render_vehicles_text, OutputFormat, VehicleRow};

/// Handle the vehicles subcommand.
pub fn handle_list_vehicles(vehicles_flag: Option<&Path>, format: OutputFormat) -> Result<()> {
    let catalog = load_vehicle_catalog(vehicles_flag)?;
    let rows: Vec<VehicleRow<'_>> = catalog
        .vehicles_sorted()
        .into_iter()
        .map(VehicleRow::from)
        .collect();

    match format {
        OutputFormat::Text => print!("{}", render_vehicles_text(&rows)),
        OutputFormat::Json => render_vehicles_json(&rows).context("failed to write JSON output")?,
    }
    Ok(())
}

/// Load the vehicle catalog.
///
/// Uses the `--vehicles` file or `EVROUTE_VEHICLES` when set, otherwise the
/// built-in model list.
pub fn load_vehicle_catalog(vehicles_flag: Option<&Path>) -> Result<VehicleCatalog> {
    match resolve_data_path(vehicles_flag, VEHICLES_ENV, None) {
        Some(path) => VehicleCatalog::from_path(&path)
            .with_context(|| format!("failed to load vehicle data from {}", path.display())),
        None => Ok(VehicleCatalog::builtin()),
    }
}
