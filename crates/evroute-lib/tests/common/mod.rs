//! Shared fixture helpers for the integration tests.

use std::path::PathBuf;

use evroute_lib::{StationTable, TollEdges, Vehicle, VehicleCatalog};

/// Path to the fixtures directory shared with the CLI tests.
#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

#[allow(dead_code)]
pub fn fixture_stations() -> StationTable {
    StationTable::from_path(&fixtures_dir().join("charging_stations.csv"))
        .expect("load fixture charging_stations.csv")
}

#[allow(dead_code)]
pub fn fixture_tolls() -> TollEdges {
    TollEdges::from_path(&fixtures_dir().join("toll_edges.csv"))
        .expect("load fixture toll_edges.csv")
}

/// Load a vehicle by name from the fixture catalog.
#[allow(dead_code)]
pub fn fixture_vehicle(name: &str) -> Vehicle {
    let catalog = VehicleCatalog::from_path(&fixtures_dir().join("vehicles.csv"))
        .expect("load fixture vehicles.csv");
    catalog
        .get(name)
        .unwrap_or_else(|| panic!("{name} present in fixtures"))
        .clone()
}

/// Near Hoa Binh, north of the fixture corridor.
#[allow(dead_code)]
pub const HOA_BINH: (f64, f64) = (20.825, 105.351);

/// Central Ho Chi Minh City, south end of the fixture corridor.
#[allow(dead_code)]
pub const HO_CHI_MINH_CITY: (f64, f64) = (10.771, 106.701);
