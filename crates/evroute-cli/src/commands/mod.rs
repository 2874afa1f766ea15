// Command handlers for the evroute CLI.
//
// Each module owns one subcommand; main.rs only parses arguments and dispatches.

pub mod route;
pub mod vehicles;

use std::path::{Path, PathBuf};

/// Environment variable pointing at the station CSV.
pub const STATIONS_ENV: &str = "EVROUTE_STATIONS";
/// Environment variable pointing at the vehicle catalog CSV.
pub const VEHICLES_ENV: &str = "EVROUTE_VEHICLES";
/// Environment variable pointing at the toll-edge CSV.
pub const TOLLS_ENV: &str = "EVROUTE_TOLLS";

/// Data file locations given on the command line.
#[derive(Debug, Clone, Default)]
pub struct DataPaths {
    pub stations: Option<PathBuf>,
    pub vehicles: Option<PathBuf>,
    pub tolls: Option<PathBuf>,
}

/// Resolve a data file: explicit flag, then environment variable, then (debug
/// builds only) the checked-in fixture of the same name.
pub(crate) fn resolve_data_path(
    flag: Option<&Path>,
    env_var: &str,
    fixture: Option<&str>,
) -> Option<PathBuf> {
    if let Some(path) = flag {
        return Some(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(env_var).filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(path));
    }
    let fixture = fixture?;
    if cfg!(debug_assertions) {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../docs/fixtures")
            .join(fixture);
        if path.exists() {
            return Some(path);
        }
    }
    None
}
