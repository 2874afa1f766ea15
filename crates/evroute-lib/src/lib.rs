//! Battery-constrained route planning for electric vehicles.
//!
//! The crate plans a drive between two coordinates over a static table of
//! charging stations, inserting charging stops so the vehicle never runs out
//! of range, and prices the result. Loading of the station table, vehicle
//! catalog, and toll-edge table is offered as CSV helpers, but the planner
//! itself only consumes in-memory values. [`plan_trip`] is the single entry
//! point; the search and itinerary stages run behind it.

#![deny(warnings)]

pub mod charging;
pub mod config;
pub mod cost;
pub mod error;
pub mod geo;
pub mod itinerary;
pub mod routing;
pub mod search;
pub mod stations;
pub mod tolls;
pub mod vehicle;

pub use charging::{plan_leg_charge, ChargeDecision};
pub use config::{ChargingConfig, FeeSchedule, FeeTier, PlannerConfig, SearchConfig};
pub use cost::{charge_minutes, drive_minutes, price_charge, tiered_fee, ChargeCost};
pub use error::{Error, InfeasibleLeg, Result};
pub use geo::{distance, GeoPoint, EARTH_RADIUS_KM};
pub use itinerary::{Itinerary, ItineraryTotals, LegCharge, LegKind, RouteLeg};
pub use routing::{plan_trip, TripInputs, TripRequest};
pub use search::{ChargeLogEntry, RouteAlgorithm, SearchFailure, StationPath};
pub use stations::{ChargingStation, StationId, StationRecord, StationTable};
pub use tolls::TollEdges;
pub use vehicle::{Vehicle, VehicleCatalog};
