//! Charging-station table and nearest-station lookup.
//!
//! The table is immutable once built and may be shared read-only across
//! threads. Rows without coordinates are dropped at construction time, so every
//! [`ChargingStation`] carries a validated [`GeoPoint`].
//!
//! Snapping arbitrary coordinates onto the network uses a 2-D KD-tree over raw
//! `(lat, lng)` pairs with squared-Euclidean distance. That metric is a fast
//! planar approximation and is only used for endpoint snapping; the search
//! itself always uses [`GeoPoint::road_km`].

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geo::GeoPoint;

/// Dense index of a station inside its [`StationTable`].
pub type StationId = usize;

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

/// Raw station row as supplied by the loading layer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StationRecord {
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl StationRecord {
    pub fn new(name: impl Into<String>, address: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            lat: Some(lat),
            lng: Some(lng),
        }
    }
}

/// A charging station on the network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargingStation {
    pub id: StationId,
    pub name: String,
    pub address: String,
    pub location: GeoPoint,
}

/// Immutable station table with a nearest-station index.
pub struct StationTable {
    stations: Vec<ChargingStation>,
    name_to_id: HashMap<String, StationId>,
    tree: KdTree<f64, usize, 2, BUCKET_SIZE, u32>,
}

impl fmt::Debug for StationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StationTable")
            .field("stations", &self.stations.len())
            .finish_non_exhaustive()
    }
}

impl StationTable {
    /// Build a table from raw rows, skipping rows with missing coordinates.
    pub fn new<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = StationRecord>,
    {
        let mut stations = Vec::new();
        let mut name_to_id = HashMap::new();
        let mut skipped = 0usize;

        for record in records {
            let (Some(lat), Some(lng)) = (record.lat, record.lng) else {
                skipped += 1;
                continue;
            };

            let name = record.name.trim().to_string();
            if name.is_empty() {
                return Err(Error::StationDataValidation {
                    message: "station name must not be empty".to_string(),
                });
            }

            let location = GeoPoint::new(lat, lng).map_err(|err| Error::StationDataValidation {
                message: format!("station '{name}': {err}"),
            })?;

            if name_to_id.contains_key(&name) {
                return Err(Error::DuplicateStationName { name });
            }

            let id = stations.len();
            name_to_id.insert(name.clone(), id);
            stations.push(ChargingStation {
                id,
                name,
                address: record.address.trim().to_string(),
                location,
            });
        }

        // Co-located stations share one tree point owned by the first of them;
        // kiddo cannot split a bucket holding more than BUCKET_SIZE equal points.
        let mut tree: KdTree<f64, usize, 2, BUCKET_SIZE, u32> = KdTree::new();
        let mut indexed = HashSet::with_capacity(stations.len());
        for station in &stations {
            let point = [station.location.lat(), station.location.lng()];
            if indexed.insert(point.map(f64::to_bits)) {
                tree.add(&point, station.id);
            }
        }

        debug!(
            stations = stations.len(),
            skipped_without_coordinates = skipped,
            "built station table"
        );

        Ok(Self {
            stations,
            name_to_id,
            tree,
        })
    }

    /// Load a table from a `name,address,lat,lng` CSV file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load a table from CSV content; empty coordinate cells mark rows to skip.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
        let mut records = Vec::new();
        for row in csv_reader.deserialize::<StationRecord>() {
            records.push(row?);
        }
        Self::new(records)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn get(&self, id: StationId) -> Option<&ChargingStation> {
        self.stations.get(id)
    }

    /// Lookup a station identifier by its exact name.
    pub fn id_by_name(&self, name: &str) -> Option<StationId> {
        self.name_to_id.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChargingStation> {
        self.stations.iter()
    }

    /// Station closest to `(lat, lng)` under planar Euclidean distance in degrees.
    ///
    /// Among co-located stations the one listed first wins. Returns `None` when
    /// the table holds no station.
    pub fn nearest(&self, lat: f64, lng: f64) -> Option<StationId> {
        if self.stations.is_empty() {
            return None;
        }

        self.tree
            .nearest_n::<SquaredEuclidean>(&[lat, lng], 1)
            .into_iter()
            .next()
            .map(|neighbour| neighbour.item)
    }

    pub(crate) fn station(&self, id: StationId) -> &ChargingStation {
        &self.stations[id]
    }
}
