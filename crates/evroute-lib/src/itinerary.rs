//! Turns a raw station path into a priced, timed itinerary.
//!
//! An itinerary always has a departure leg (true start to the first station),
//! one leg per station-to-station hop, and an arrival leg (last station to the
//! true destination). A charge taken at a station is reported on the leg that
//! departs from it.

use serde::Serialize;

use crate::charging::plan_leg_charge;
use crate::config::PlannerConfig;
use crate::cost::{drive_minutes, price_charge};
use crate::error::{Error, InfeasibleLeg, Result};
use crate::geo::GeoPoint;
use crate::search::{RouteAlgorithm, StationPath};
use crate::stations::{StationId, StationTable};
use crate::vehicle::Vehicle;

/// Classifies a leg of the itinerary.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LegKind {
    /// True start coordinate to the first station.
    Departure,
    /// Station to station.
    Station,
    /// Last station to the true destination.
    Arrival,
}

/// Charge taken at the origin of a leg before departing.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct LegCharge {
    pub charged_km: f64,
    /// Range held on reaching the stop, before charging.
    pub range_before_km: f64,
    /// Range at departure.
    pub range_after_km: f64,
    pub minutes: f64,
    pub fee: f64,
    pub billable: bool,
    pub energy_kwh: f64,
}

/// One priced, timed leg.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteLeg {
    pub index: usize,
    pub kind: LegKind,
    pub from: String,
    pub to: String,
    /// Address of the station at the end of the leg, empty for the destination.
    pub address: String,
    pub distance_km: f64,
    pub drive_minutes: f64,
    pub arrival_range_km: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge: Option<LegCharge>,
    pub status: String,
}

impl RouteLeg {
    pub fn fee(&self) -> f64 {
        self.charge.map_or(0.0, |charge| charge.fee)
    }

    pub fn charge_minutes(&self) -> f64 {
        self.charge.map_or(0.0, |charge| charge.minutes)
    }
}

/// Aggregates over every leg.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct ItineraryTotals {
    pub distance_km: f64,
    pub drive_minutes: f64,
    pub charge_minutes: f64,
    pub fee: f64,
    pub energy_kwh: f64,
    pub charging_stops: usize,
}

/// Final trip plan handed back to the caller.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Itinerary {
    pub vehicle: String,
    pub algorithm: RouteAlgorithm,
    pub avoid_tolls: bool,
    pub start_station: String,
    pub goal_station: String,
    pub legs: Vec<RouteLeg>,
    pub totals: ItineraryTotals,
}

impl Itinerary {
    /// Number of station-to-station hops.
    pub fn hop_count(&self) -> usize {
        self.legs
            .iter()
            .filter(|leg| leg.kind == LegKind::Station)
            .count()
    }
}

/// True endpoints of a trip and the stations they were snapped to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TripEndpoints {
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub first_station: StationId,
    pub last_station: StationId,
    /// Range at the true start coordinate.
    pub starting_range_km: f64,
}

/// Builds itineraries for one vehicle against one station table.
pub(crate) struct ItineraryBuilder<'a> {
    stations: &'a StationTable,
    vehicle: &'a Vehicle,
    config: &'a PlannerConfig,
}

impl<'a> ItineraryBuilder<'a> {
    pub fn new(stations: &'a StationTable, vehicle: &'a Vehicle, config: &'a PlannerConfig) -> Self {
        Self {
            stations,
            vehicle,
            config,
        }
    }

    fn location(&self, id: StationId) -> GeoPoint {
        self.stations.station(id).location
    }

    /// Road distance from the true start to the first station.
    pub fn head_km(&self, ends: &TripEndpoints) -> f64 {
        ends.start
            .road_km(&self.location(ends.first_station), self.config.road_factor)
    }

    /// Road distance from the last station to the true destination.
    pub fn tail_km(&self, ends: &TripEndpoints) -> f64 {
        self.location(ends.last_station)
            .road_km(&ends.end, self.config.road_factor)
    }

    /// Check both off-network legs against the starting range before any search runs.
    ///
    /// Returns the range left on arrival at the first station.
    pub fn check_off_network_legs(&self, ends: &TripEndpoints) -> Result<f64> {
        let head = self.head_km(ends);
        if head > ends.starting_range_km {
            return Err(Error::Infeasible {
                leg: InfeasibleLeg::FirstStation,
                required_km: head,
                available_km: ends.starting_range_km,
            });
        }

        let tail = self.tail_km(ends);
        if tail > ends.starting_range_km {
            return Err(Error::Infeasible {
                leg: InfeasibleLeg::Destination,
                required_km: tail,
                available_km: ends.starting_range_km,
            });
        }

        Ok(ends.starting_range_km - head)
    }

    /// Assemble the itinerary for a successful search.
    pub fn build(
        &self,
        ends: &TripEndpoints,
        path: &StationPath,
        algorithm: RouteAlgorithm,
        avoid_tolls: bool,
    ) -> Result<Itinerary> {
        let (Some(first), Some(last)) = (path.log.first(), path.log.last()) else {
            return Err(Error::NoFeasiblePath {
                start: self.stations.station(ends.first_station).name.clone(),
                goal: self.stations.station(ends.last_station).name.clone(),
            });
        };

        let mut legs = Vec::with_capacity(path.log.len() + 1);

        let head = self.head_km(ends);
        let first_station = self.stations.station(first.station);
        legs.push(RouteLeg {
            index: 0,
            kind: LegKind::Departure,
            from: "start".to_string(),
            to: first_station.name.clone(),
            address: first_station.address.clone(),
            distance_km: head,
            drive_minutes: drive_minutes(head, self.config.average_speed_kmh),
            arrival_range_km: first.range_km,
            charge: None,
            status: format!(
                "Start with {:.0} km of range; arrive with {:.0} km.",
                ends.starting_range_km, first.range_km
            ),
        });

        for pair in path.log.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            let origin = self.stations.station(previous.station);
            let destination = self.stations.station(current.station);
            let distance = previous.location.road_km(&current.location, self.config.road_factor);

            let charge = (current.charged_km > 0.0)
                .then(|| self.price(current.charged_km, previous.range_km));
            let arrival = self.arrival_text(current.range_km);
            let status = match &charge {
                Some(charge) => format!("{} {}", charge_text(charge), arrival),
                None => arrival,
            };

            legs.push(RouteLeg {
                index: legs.len(),
                kind: LegKind::Station,
                from: origin.name.clone(),
                to: destination.name.clone(),
                address: destination.address.clone(),
                distance_km: distance,
                drive_minutes: drive_minutes(distance, self.config.average_speed_kmh),
                arrival_range_km: current.range_km,
                charge,
                status,
            });
        }

        let tail = self.tail_km(ends);
        let Some(decision) = plan_leg_charge(
            last.range_km,
            tail,
            self.vehicle.max_range_km,
            &self.config.charging,
        ) else {
            return Err(Error::Infeasible {
                leg: InfeasibleLeg::Destination,
                required_km: tail,
                available_km: self.vehicle.max_range_km,
            });
        };
        let tail_charge = decision
            .charged()
            .then(|| self.price(decision.charged_km, last.range_km));
        let finish = format!("Drive {tail:.1} km to the destination. Trip complete.");
        let last_station = self.stations.station(last.station);
        legs.push(RouteLeg {
            index: legs.len(),
            kind: LegKind::Arrival,
            from: last_station.name.clone(),
            to: "destination".to_string(),
            address: String::new(),
            distance_km: tail,
            drive_minutes: drive_minutes(tail, self.config.average_speed_kmh),
            arrival_range_km: decision.arrival_range_km,
            status: match &tail_charge {
                Some(charge) => format!("{} {}", charge_text(charge), finish),
                None => finish,
            },
            charge: tail_charge,
        });

        let totals = totals(&legs);
        Ok(Itinerary {
            vehicle: self.vehicle.name.clone(),
            algorithm,
            avoid_tolls,
            start_station: first_station.name.clone(),
            goal_station: last_station.name.clone(),
            legs,
            totals,
        })
    }

    fn price(&self, charged_km: f64, range_before_km: f64) -> LegCharge {
        let cost = price_charge(
            charged_km,
            range_before_km,
            self.vehicle.max_range_km,
            &self.config.charging,
            &self.config.fees,
        );
        LegCharge {
            charged_km,
            range_before_km,
            range_after_km: range_before_km + charged_km,
            minutes: cost.minutes,
            fee: cost.fee,
            billable: cost.billable,
            energy_kwh: self.vehicle.energy_for_range_kwh(charged_km),
        }
    }

    fn arrival_text(&self, range_km: f64) -> String {
        let percent = range_km / self.vehicle.max_range_km * 100.0;
        format!("Arrive with {range_km:.0} km ({percent:.0}%) remaining.")
    }
}

fn charge_text(charge: &LegCharge) -> String {
    let fee = if charge.billable {
        format!("fee {:.0}", charge.fee)
    } else {
        "free".to_string()
    };
    format!(
        "Charge {:.0} km to {:.0} km ({:.1} min, {}).",
        charge.charged_km, charge.range_after_km, charge.minutes, fee
    )
}

fn totals(legs: &[RouteLeg]) -> ItineraryTotals {
    legs.iter().fold(ItineraryTotals::default(), |mut acc, leg| {
        acc.distance_km += leg.distance_km;
        acc.drive_minutes += leg.drive_minutes;
        acc.charge_minutes += leg.charge_minutes();
        acc.fee += leg.fee();
        if let Some(charge) = &leg.charge {
            acc.energy_kwh += charge.energy_kwh;
            acc.charging_stops += 1;
        }
        acc
    })
}
