//! Optional station-to-station toll edge table.
//!
//! Edges are direction-insensitive: a toll between `A` and `B` applies to
//! both `A -> B` and `B -> A`. The table only matters when a trip asks to
//! avoid tolls.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::stations::{StationId, StationTable};

#[derive(Debug, Deserialize)]
struct TollEdgeRecord {
    from: String,
    to: String,
    toll: String,
}

/// Set of station pairs whose direct transition passes a toll facility.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TollEdges {
    edges: HashSet<(String, String)>,
}

impl TollEdges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag the transition between two named stations as tolled.
    pub fn insert(&mut self, from: &str, to: &str) {
        self.edges.insert(edge_key(from.trim(), to.trim()));
    }

    pub fn is_toll(&self, from: &str, to: &str) -> bool {
        self.edges.contains(&edge_key(from, to))
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Load edges from a `from,to,toll` CSV file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load edges from CSV content; only rows whose flag is true are kept.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
        let mut edges = Self::new();
        for (row, record) in csv_reader.deserialize::<TollEdgeRecord>().enumerate() {
            let record = record?;
            if parse_flag(&record.toll, row + 2)? {
                edges.insert(&record.from, &record.to);
            }
        }
        Ok(edges)
    }

    /// Resolve named edges to station identifiers, ignoring unknown names.
    pub(crate) fn resolve(&self, stations: &StationTable) -> HashSet<(StationId, StationId)> {
        let mut resolved = HashSet::with_capacity(self.edges.len() * 2);
        for (a, b) in &self.edges {
            match (stations.id_by_name(a), stations.id_by_name(b)) {
                (Some(a), Some(b)) => {
                    resolved.insert((a, b));
                    resolved.insert((b, a));
                }
                _ => tracing::debug!(from = %a, to = %b, "toll edge references unknown station"),
            }
        }
        resolved
    }
}

fn edge_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

fn parse_flag(value: &str, row: usize) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" | "" => Ok(false),
        other => Err(Error::StationDataValidation {
            message: format!("row {row}: invalid toll flag '{other}'"),
        }),
    }
}
