//! Charge duration, tiered charging fees, and drive time.

use serde::Serialize;

use crate::config::{ChargingConfig, FeeSchedule};

/// Priced charging stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChargeCost {
    pub minutes: f64,
    pub fee: f64,
    /// Whether the fee schedule applied to this stop.
    pub billable: bool,
}

/// Minutes needed to add `charged_km` of range.
pub fn charge_minutes(charged_km: f64, config: &ChargingConfig) -> f64 {
    charged_km.max(0.0) / config.rate_km_per_min
}

/// Fee for a charge lasting `minutes`, filling each tier before the next.
///
/// # Examples
/// ```
/// use evroute_lib::config::FeeSchedule;
/// use evroute_lib::cost::tiered_fee;
///
/// assert_eq!(tiered_fee(45.0, &FeeSchedule::default()), 60_000.0);
/// ```
pub fn tiered_fee(minutes: f64, schedule: &FeeSchedule) -> f64 {
    let mut remaining = minutes.max(0.0);
    let mut fee = 0.0;
    for tier in &schedule.tiers {
        if remaining <= 0.0 {
            break;
        }
        let used = match tier.minutes {
            Some(band) => remaining.min(band),
            None => remaining,
        };
        fee += used * tier.rate_per_min;
        remaining -= used;
    }
    fee
}

/// Whether a stop is billed, given the range held just before it.
///
/// Stops are billed only when that range exceeded `paid_above_fraction` of the
/// maximum range; lower-range stops are free.
pub fn is_billable(range_before_km: f64, max_range_km: f64, schedule: &FeeSchedule) -> bool {
    range_before_km > max_range_km * schedule.paid_above_fraction
}

/// Duration and fee of a charge of `charged_km` at a stop reached with `range_before_km`.
pub fn price_charge(
    charged_km: f64,
    range_before_km: f64,
    max_range_km: f64,
    charging: &ChargingConfig,
    schedule: &FeeSchedule,
) -> ChargeCost {
    let minutes = charge_minutes(charged_km, charging);
    let billable = charged_km > 0.0 && is_billable(range_before_km, max_range_km, schedule);
    let fee = if billable {
        tiered_fee(minutes, schedule)
    } else {
        0.0
    };
    ChargeCost {
        minutes,
        fee,
        billable,
    }
}

/// Minutes needed to drive `distance_km` at `average_speed_kmh`.
pub fn drive_minutes(distance_km: f64, average_speed_kmh: f64) -> f64 {
    distance_km / average_speed_kmh * 60.0
}
