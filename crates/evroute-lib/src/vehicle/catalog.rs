//! Vehicle catalog loading and lookup.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};

use crate::error::{Error, Result};

use super::attributes::Vehicle;

/// Minimum Jaro-Winkler similarity for a name to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Built-in models: (name, range km, battery kWh, motor kW, top speed km/h, year).
const BUILTIN_MODELS: &[(&str, f64, f64, f64, f64, u16)] = &[
    ("VinFast VF e34", 285.0, 42.0, 110.0, 130.0, 2022),
    ("VinFast VF8", 400.0, 87.7, 260.0, 200.0, 2023),
    ("VinFast VF9", 423.0, 92.0, 300.0, 201.0, 2023),
    ("VinFast VF5", 300.0, 37.23, 70.0, 130.0, 2023),
    ("VinFast VF6", 399.0, 59.6, 150.0, 150.0, 2023),
    ("Tesla Model S", 652.0, 100.0, 615.0, 250.0, 2022),
    ("Tesla Model 3", 614.0, 82.0, 340.0, 233.0, 2022),
    ("Tesla Model X", 560.0, 100.0, 311.0, 250.0, 2022),
    ("Tesla Model Y", 533.0, 75.0, 258.0, 217.0, 2022),
    ("BMW i4", 590.0, 80.7, 250.0, 190.0, 2022),
    ("BMW iX3", 460.0, 80.0, 210.0, 180.0, 2022),
    ("BMW iX", 630.0, 111.5, 385.0, 200.0, 2022),
    ("Audi e-tron GT", 488.0, 93.4, 350.0, 245.0, 2021),
    ("Audi Q4 e-tron", 520.0, 82.0, 150.0, 180.0, 2022),
    ("Audi Q8 e-tron", 582.0, 114.0, 300.0, 200.0, 2023),
    ("BYD Atto 3", 420.0, 60.5, 150.0, 160.0, 2022),
    ("BYD Han EV", 605.0, 76.9, 180.0, 185.0, 2022),
    ("BYD Tang EV", 505.0, 86.4, 380.0, 180.0, 2022),
    ("Mercedes EQS 450+", 770.0, 107.8, 245.0, 210.0, 2022),
    ("Mercedes EQB 300", 419.0, 66.5, 168.0, 160.0, 2022),
    ("Mercedes EQC 400", 417.0, 80.0, 300.0, 180.0, 2022),
    ("Porsche Taycan 4S", 463.0, 93.4, 390.0, 250.0, 2022),
    ("Porsche Taycan Turbo S", 412.0, 93.4, 560.0, 260.0, 2022),
    ("Hyundai Ioniq 5", 481.0, 77.4, 225.0, 185.0, 2022),
    ("Hyundai Kona Electric", 484.0, 64.0, 150.0, 167.0, 2022),
    ("Kia EV6", 528.0, 77.4, 239.0, 185.0, 2022),
    ("Kia Niro EV", 455.0, 64.8, 150.0, 167.0, 2022),
    ("Nissan Leaf", 385.0, 62.0, 160.0, 144.0, 2022),
    ("MG ZS EV", 440.0, 50.3, 143.0, 140.0, 2022),
    ("Toyota bZ4X", 500.0, 71.4, 150.0, 160.0, 2022),
    ("Volkswagen ID.4", 522.0, 77.0, 204.0, 160.0, 2022),
    ("Volkswagen ID.3", 550.0, 77.0, 204.0, 160.0, 2022),
];

/// Collection of vehicle definitions keyed by case-insensitive name.
#[derive(Debug, Clone, Default)]
pub struct VehicleCatalog {
    vehicles: HashMap<String, Vehicle>,
    source: Option<PathBuf>,
}

impl VehicleCatalog {
    /// Catalog of the vehicle models shipped with the planner.
    pub fn builtin() -> Self {
        let vehicles = BUILTIN_MODELS
            .iter()
            .map(|&(name, range, battery, motor, speed, year)| {
                let vehicle = Vehicle {
                    name: name.to_string(),
                    max_range_km: range,
                    battery_kwh: battery,
                    motor_power_kw: Some(motor),
                    max_speed_kmh: Some(speed),
                    year: Some(year),
                };
                (normalize_name(name), vehicle)
            })
            .collect();

        Self {
            vehicles,
            source: None,
        }
    }

    /// Load a vehicle catalog from a CSV file path.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = fs::File::open(path)?;
        let mut catalog = Self::from_reader(file)?;
        catalog.source = Some(path.to_path_buf());
        Ok(catalog)
    }

    /// Load a vehicle catalog from CSV content.
    ///
    /// Required columns are `name`, `max_range_km` and `battery_kwh`;
    /// `motor_power_kw`, `max_speed_kmh` and `year` are optional.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

        let mut vehicles = HashMap::new();
        for (row, record) in csv_reader.deserialize::<Vehicle>().enumerate() {
            let mut vehicle = record.map_err(|err| Error::VehicleDataValidation {
                message: format!("row {}: {err}", row + 2),
            })?;
            vehicle.name = vehicle.name.trim().to_string();
            vehicle.validate()?;

            let key = normalize_name(&vehicle.name);
            if vehicles.contains_key(&key) {
                return Err(Error::DuplicateVehicleName { name: vehicle.name });
            }
            vehicles.insert(key, vehicle);
        }

        Ok(Self {
            vehicles,
            source: None,
        })
    }

    /// Get a vehicle by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&Vehicle> {
        self.vehicles.get(&normalize_name(name))
    }

    /// Get a vehicle by name, suggesting close matches when it is missing.
    pub fn require(&self, name: &str) -> Result<&Vehicle> {
        self.get(name).ok_or_else(|| Error::UnknownVehicle {
            name: name.to_string(),
            suggestions: self.fuzzy_matches(name, 3),
        })
    }

    /// Names most similar to `name`, best match first.
    pub fn fuzzy_matches(&self, name: &str, limit: usize) -> Vec<String> {
        let needle = normalize_name(name);
        let mut scored: Vec<(f64, &str)> = self
            .vehicles
            .iter()
            .map(|(key, vehicle)| (strsim::jaro_winkler(&needle, key), vehicle.name.as_str()))
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.cmp(b.1))
        });
        scored
            .into_iter()
            .take(limit)
            .map(|(_, name)| name.to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// All vehicles sorted by name.
    pub fn vehicles_sorted(&self) -> Vec<&Vehicle> {
        let mut vehicles: Vec<&Vehicle> = self.vehicles.values().collect();
        vehicles.sort_by(|a, b| a.name.cmp(&b.name));
        vehicles
    }

    /// Source path if the catalog was loaded from a file.
    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn builtin_catalog_is_case_insensitive() {
        let catalog = VehicleCatalog::builtin();
        assert_eq!(catalog.len(), BUILTIN_MODELS.len());
        let vf8 = catalog.get("vinfast vf8").expect("VF8 present");
        assert_eq!(vf8.max_range_km, 400.0);
        assert_eq!(vf8.year, Some(2023));
    }

    #[test]
    fn unknown_vehicle_offers_suggestions() {
        let catalog = VehicleCatalog::builtin();
        let err = catalog.require("Tesla Model Z").expect_err("no such model");
        match err {
            Error::UnknownVehicle { suggestions, .. } => {
                assert!(!suggestions.is_empty());
                assert!(suggestions.iter().all(|s| s.starts_with("Tesla")));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn loads_csv_with_optional_columns() {
        let csv = "name,max_range_km,battery_kwh,year\n\
                   Commuter,200,40,2021\n\
                   Tourer , 500 , 90 ,\n";
        let catalog = VehicleCatalog::from_reader(Cursor::new(csv)).expect("csv loads");
        assert_eq!(catalog.len(), 2);
        let tourer = catalog.get("tourer").expect("tourer present");
        assert_eq!(tourer.name, "Tourer");
        assert_eq!(tourer.year, None);
        assert_eq!(catalog.vehicles_sorted()[0].name, "Commuter");
    }

    #[test]
    fn rejects_non_positive_range() {
        let csv = "name,max_range_km,battery_kwh\nBroken,0,40\n";
        let err = VehicleCatalog::from_reader(Cursor::new(csv)).expect_err("invalid range");
        assert!(matches!(err, Error::VehicleDataValidation { .. }));
    }

    #[test]
    fn rejects_duplicate_names() {
        let csv = "name,max_range_km,battery_kwh\nA,200,40\na,300,50\n";
        let err = VehicleCatalog::from_reader(Cursor::new(csv)).expect_err("duplicate");
        assert!(matches!(err, Error::DuplicateVehicleName { .. }));
    }
}
