//! Trip planning entry point.
//!
//! [`plan_trip`] runs the full flow: validate the request, snap both endpoints
//! onto the station network, reject unreachable off-network legs, search the
//! network, then price the resulting path.
//!
//! # Example
//!
//! ```
//! use evroute_lib::{plan_trip, PlannerConfig, StationRecord, StationTable, TripInputs, TripRequest, Vehicle};
//!
//! let stations = StationTable::new([
//!     StationRecord::new("Hanoi", "", 21.03, 105.85),
//!     StationRecord::new("Ninh Binh", "", 20.25, 105.97),
//! ])?;
//! let vehicle = Vehicle::new("VinFast VF8", 471.0, 87.7)?;
//! let inputs = TripInputs::new(&vehicle, &stations);
//! let request = TripRequest::new((21.03, 105.85), (20.25, 105.97), 80.0);
//! let itinerary = plan_trip(&inputs, &request, &PlannerConfig::default())?;
//! assert_eq!(itinerary.goal_station, "Ninh Binh");
//! # Ok::<(), evroute_lib::Error>(())
//! ```

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::config::PlannerConfig;
use crate::error::{Error, Result};
use crate::geo::GeoPoint;
use crate::itinerary::{Itinerary, ItineraryBuilder, TripEndpoints};
use crate::search::{search_route, RouteAlgorithm, SearchRequest};
use crate::stations::{StationId, StationTable};
use crate::tolls::TollEdges;
use crate::vehicle::Vehicle;

/// Read-only tables a trip is planned against.
#[derive(Debug, Clone, Copy)]
pub struct TripInputs<'a> {
    pub vehicle: &'a Vehicle,
    pub stations: &'a StationTable,
    pub tolls: Option<&'a TollEdges>,
}

impl<'a> TripInputs<'a> {
    pub fn new(vehicle: &'a Vehicle, stations: &'a StationTable) -> Self {
        Self {
            vehicle,
            stations,
            tolls: None,
        }
    }

    /// Attach a toll-edge table; it only matters for requests that avoid tolls.
    pub fn with_tolls(mut self, tolls: &'a TollEdges) -> Self {
        self.tolls = Some(tolls);
        self
    }
}

/// One trip to plan.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRequest {
    /// `(latitude, longitude)` of the true start point.
    pub start: (f64, f64),
    /// `(latitude, longitude)` of the true destination.
    pub end: (f64, f64),
    /// State of charge at the start, 0 to 100 inclusive.
    pub battery_percent: f64,
    pub avoid_tolls: bool,
    pub algorithm: RouteAlgorithm,
}

impl TripRequest {
    pub fn new(start: (f64, f64), end: (f64, f64), battery_percent: f64) -> Self {
        Self {
            start,
            end,
            battery_percent,
            avoid_tolls: false,
            algorithm: RouteAlgorithm::default(),
        }
    }

    pub fn with_algorithm(mut self, algorithm: RouteAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn avoiding_tolls(mut self, avoid: bool) -> Self {
        self.avoid_tolls = avoid;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.battery_percent.is_finite() || !(0.0..=100.0).contains(&self.battery_percent) {
            return Err(Error::InvalidRequest {
                message: format!(
                    "battery percentage must be between 0 and 100, got {}",
                    self.battery_percent
                ),
            });
        }
        Ok(())
    }
}

/// Plan a trip and return the priced itinerary.
pub fn plan_trip(
    inputs: &TripInputs<'_>,
    request: &TripRequest,
    config: &PlannerConfig,
) -> Result<Itinerary> {
    config.validate()?;
    inputs.vehicle.validate()?;
    request.validate()?;

    let start = GeoPoint::new(request.start.0, request.start.1)?;
    let end = GeoPoint::new(request.end.0, request.end.1)?;

    let stations = inputs.stations;
    let first_station = snap(stations, &start, "start")?;
    let last_station = snap(stations, &end, "end")?;

    let ends = TripEndpoints {
        start,
        end,
        first_station,
        last_station,
        starting_range_km: inputs.vehicle.range_at_percent(request.battery_percent),
    };
    let builder = ItineraryBuilder::new(stations, inputs.vehicle, config);
    let initial_range_km = builder.check_off_network_legs(&ends)?;

    let search = SearchRequest {
        start: first_station,
        goal: last_station,
        initial_range_km,
        max_range_km: inputs.vehicle.max_range_km,
        algorithm: request.algorithm,
        blocked_edges: blocked_edges(inputs, request),
    };

    let path = search_route(stations, &search, config).map_err(|failure| {
        warn!(
            start = %station_name(stations, first_station),
            goal = %station_name(stations, last_station),
            reason = %failure,
            "no feasible path"
        );
        Error::NoFeasiblePath {
            start: station_name(stations, first_station),
            goal: station_name(stations, last_station),
        }
    })?;

    let itinerary = builder.build(&ends, &path, request.algorithm, request.avoid_tolls)?;
    info!(
        vehicle = %inputs.vehicle.name,
        algorithm = %request.algorithm,
        stations = path.stations.len(),
        distance_km = itinerary.totals.distance_km,
        fee = itinerary.totals.fee,
        "planned trip"
    );
    Ok(itinerary)
}

fn snap(stations: &StationTable, point: &GeoPoint, endpoint: &str) -> Result<StationId> {
    stations
        .nearest(point.lat(), point.lng())
        .ok_or_else(|| Error::NoStationNearby {
            endpoint: endpoint.to_string(),
        })
}

fn blocked_edges(inputs: &TripInputs<'_>, request: &TripRequest) -> HashSet<(StationId, StationId)> {
    if !request.avoid_tolls {
        return HashSet::new();
    }
    match inputs.tolls {
        Some(tolls) => tolls.resolve(inputs.stations),
        None => {
            debug!("toll avoidance requested without a toll-edge table");
            HashSet::new()
        }
    }
}

fn station_name(stations: &StationTable, id: StationId) -> String {
    stations.station(id).name.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InfeasibleLeg;
    use crate::stations::StationRecord;

    fn corridor() -> StationTable {
        StationTable::new([
            StationRecord::new("A", "", 10.0, 106.0),
            StationRecord::new("B", "", 10.0, 106.5),
            StationRecord::new("C", "", 10.0, 107.0),
        ])
        .unwrap()
    }

    fn vehicle() -> Vehicle {
        Vehicle::new("Test", 300.0, 60.0).unwrap()
    }

    #[test]
    fn two_station_trip_adds_no_charge() {
        let stations = StationTable::new([
            StationRecord::new("A", "", 10.0, 106.0),
            StationRecord::new("B", "", 10.0, 106.3),
        ])
        .unwrap();
        let vehicle = vehicle();
        let inputs = TripInputs::new(&vehicle, &stations);
        let request = TripRequest::new((10.0, 106.0), (10.0, 106.3), 100.0)
            .with_algorithm(RouteAlgorithm::UniformCost);
        let itinerary = plan_trip(&inputs, &request, &PlannerConfig::default()).unwrap();
        assert_eq!(itinerary.hop_count(), 1);
        assert_eq!(itinerary.totals.charging_stops, 0);
        assert_eq!(itinerary.totals.charge_minutes, 0.0);
        assert_eq!(itinerary.legs[0].distance_km, 0.0);
    }

    #[test]
    fn rejects_out_of_range_battery() {
        let stations = corridor();
        let vehicle = vehicle();
        let inputs = TripInputs::new(&vehicle, &stations);
        let request = TripRequest::new((10.0, 106.0), (10.0, 107.0), 120.0);
        let err = plan_trip(&inputs, &request, &PlannerConfig::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest { .. }));
    }

    #[test]
    fn rejects_invalid_coordinates() {
        let stations = corridor();
        let vehicle = vehicle();
        let inputs = TripInputs::new(&vehicle, &stations);
        let request = TripRequest::new((91.0, 106.0), (10.0, 107.0), 50.0);
        let err = plan_trip(&inputs, &request, &PlannerConfig::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidCoordinate { .. }));
    }

    #[test]
    fn empty_table_reports_no_station() {
        let stations = StationTable::new(Vec::<StationRecord>::new()).unwrap();
        let vehicle = vehicle();
        let inputs = TripInputs::new(&vehicle, &stations);
        let request = TripRequest::new((10.0, 106.0), (10.0, 107.0), 50.0);
        let err = plan_trip(&inputs, &request, &PlannerConfig::default()).unwrap_err();
        assert!(matches!(err, Error::NoStationNearby { ref endpoint } if endpoint == "start"));
    }

    #[test]
    fn zero_battery_fails_before_search() {
        let stations = corridor();
        let vehicle = vehicle();
        let inputs = TripInputs::new(&vehicle, &stations);
        let request = TripRequest::new((10.05, 106.05), (10.0, 107.0), 0.0);
        let mut config = PlannerConfig::default();
        // A zero budget would turn any search into NoFeasiblePath.
        config.search.time_budget_secs = 0.0;
        let err = plan_trip(&inputs, &request, &config).unwrap_err();
        assert!(matches!(
            err,
            Error::Infeasible {
                leg: InfeasibleLeg::FirstStation,
                ..
            }
        ));
    }

    #[test]
    fn zero_budget_reports_no_feasible_path() {
        let stations = corridor();
        let vehicle = vehicle();
        let inputs = TripInputs::new(&vehicle, &stations);
        let request = TripRequest::new((10.0, 106.0), (10.0, 107.0), 90.0);
        let mut config = PlannerConfig::default();
        config.search.time_budget_secs = 0.0;
        let err = plan_trip(&inputs, &request, &config).unwrap_err();
        assert!(matches!(err, Error::NoFeasiblePath { .. }));
    }

    #[test]
    fn oversized_time_budget_is_a_config_error() {
        let stations = corridor();
        let vehicle = vehicle();
        let inputs = TripInputs::new(&vehicle, &stations);
        let request = TripRequest::new((10.0, 106.0), (10.0, 107.0), 90.0);
        let mut config = PlannerConfig::default();
        config.search.time_budget_secs = 1e30;
        let err = plan_trip(&inputs, &request, &config).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn toll_avoidance_without_table_has_no_effect() {
        let stations = corridor();
        let vehicle = vehicle();
        let inputs = TripInputs::new(&vehicle, &stations);
        let request = TripRequest::new((10.0, 106.0), (10.0, 107.0), 90.0);
        let plain = plan_trip(&inputs, &request, &PlannerConfig::default()).unwrap();
        let avoiding = plan_trip(
            &inputs,
            &request.clone().avoiding_tolls(true),
            &PlannerConfig::default(),
        )
        .unwrap();
        assert_eq!(plain.legs.len(), avoiding.legs.len());
        assert!(avoiding.avoid_tolls);
    }

    #[test]
    fn toll_edges_reroute_the_trip() {
        let stations = corridor();
        let vehicle = vehicle();
        let mut tolls = TollEdges::new();
        tolls.insert("A", "C");
        let inputs = TripInputs::new(&vehicle, &stations).with_tolls(&tolls);
        let request = TripRequest::new((10.0, 106.0), (10.0, 107.0), 90.0).avoiding_tolls(true);
        let itinerary = plan_trip(&inputs, &request, &PlannerConfig::default()).unwrap();
        let hops: Vec<(&str, &str)> = itinerary
            .legs
            .iter()
            .filter(|leg| leg.kind == crate::itinerary::LegKind::Station)
            .map(|leg| (leg.from.as_str(), leg.to.as_str()))
            .collect();
        assert_eq!(hops, vec![("A", "B"), ("B", "C")]);
    }
}
