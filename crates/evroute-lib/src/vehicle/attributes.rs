//! Vehicle physical attributes.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Electric vehicle model used for planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub name: String,
    /// Range on a full charge, in kilometres.
    pub max_range_km: f64,
    /// Usable battery capacity in kWh.
    pub battery_kwh: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motor_power_kw: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_speed_kmh: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
}

impl Vehicle {
    /// Build a vehicle with only the attributes the planner needs.
    pub fn new(name: impl Into<String>, max_range_km: f64, battery_kwh: f64) -> Result<Self> {
        let vehicle = Self {
            name: name.into(),
            max_range_km,
            battery_kwh,
            motor_power_kw: None,
            max_speed_kmh: None,
            year: None,
        };
        vehicle.validate()?;
        Ok(vehicle)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::VehicleDataValidation {
                message: "vehicle name must not be empty".to_string(),
            });
        }

        let fields = [
            (self.max_range_km, "max_range_km"),
            (self.battery_kwh, "battery_kwh"),
        ];
        for (value, field) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::VehicleDataValidation {
                    message: format!("{field} must be a finite positive number"),
                });
            }
        }

        Ok(())
    }

    /// Energy consumption in kWh per km; zero when the range is zero.
    pub fn consumption_kwh_per_km(&self) -> f64 {
        if self.max_range_km > 0.0 {
            self.battery_kwh / self.max_range_km
        } else {
            0.0
        }
    }

    /// Range available at a state of charge given in percent.
    pub fn range_at_percent(&self, percent: f64) -> f64 {
        self.max_range_km * percent / 100.0
    }

    /// Energy needed to add `range_km` of range.
    pub fn energy_for_range_kwh(&self, range_km: f64) -> f64 {
        range_km * self.consumption_kwh_per_km()
    }
}
