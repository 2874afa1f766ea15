//! Geographic distance primitives.
//!
//! Road distance is approximated as great-circle (haversine) distance scaled by
//! a constant road-inflation factor. Every distance that stands for actual
//! driving (range consumption, leg distance, search heuristic) goes through
//! [`GeoPoint::road_km`] so the search cost and its heuristic stay consistent.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Validated latitude/longitude pair in decimal degrees.
///
/// Deserialization goes through [`GeoPoint::new`], so out-of-range input is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = Error;

    fn try_from(raw: RawGeoPoint) -> Result<Self> {
        GeoPoint::new(raw.lat, raw.lng)
    }
}

impl GeoPoint {
    /// Build a point, rejecting latitudes outside [-90, 90] and longitudes outside [-180, 180].
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        let lat_ok = lat.is_finite() && (-90.0..=90.0).contains(&lat);
        let lng_ok = lng.is_finite() && (-180.0..=180.0).contains(&lng);
        if !lat_ok || !lng_ok {
            return Err(Error::InvalidCoordinate {
                latitude: lat,
                longitude: lng,
            });
        }
        Ok(Self { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Great-circle distance in kilometres.
    pub fn haversine_km(&self, other: &GeoPoint) -> f64 {
        let (lat1, lng1) = (self.lat.to_radians(), self.lng.to_radians());
        let (lat2, lng2) = (other.lat.to_radians(), other.lng.to_radians());
        let dlat = lat2 - lat1;
        let dlng = lng2 - lng1;

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }

    /// Estimated driving distance: great-circle distance times `road_factor`.
    pub fn road_km(&self, other: &GeoPoint, road_factor: f64) -> f64 {
        self.haversine_km(other) * road_factor
    }
}

/// Driving distance in kilometres between two raw coordinates.
///
/// Fails with [`Error::InvalidCoordinate`] when either point is out of range.
pub fn distance(a: (f64, f64), b: (f64, f64), road_factor: f64) -> Result<f64> {
    let from = GeoPoint::new(a.0, a.1)?;
    let to = GeoPoint::new(b.0, b.1)?;
    Ok(from.road_km(&to, road_factor))
}
