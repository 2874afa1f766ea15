//! Charging policy: how much range to add before driving a leg.
//!
//! A stop only charges when the leg cannot be driven on the current range. It
//! then aims for `target_fraction` of maximum range, or the leg plus
//! `margin_km` when that is larger, never exceeding maximum range.

use serde::Serialize;

use crate::config::ChargingConfig;

/// Outcome of the charging decision for one leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChargeDecision {
    /// Range added before departure, in km. Zero when no charge was needed.
    pub charged_km: f64,
    /// Range at departure, after any charge.
    pub departure_range_km: f64,
    /// Range left on arrival at the end of the leg.
    pub arrival_range_km: f64,
}

impl ChargeDecision {
    pub fn charged(&self) -> bool {
        self.charged_km > 0.0
    }
}

/// Decide whether to charge before a leg of `leg_km` starting with `range_km`.
///
/// Returns `None` when the leg cannot be driven even after charging.
///
/// # Examples
/// ```
/// use evroute_lib::charging::plan_leg_charge;
/// use evroute_lib::config::ChargingConfig;
///
/// let decision = plan_leg_charge(50.0, 120.0, 300.0, &ChargingConfig::default()).unwrap();
/// assert_eq!(decision.charged_km, 220.0);
/// assert_eq!(decision.departure_range_km, 270.0);
/// assert_eq!(decision.arrival_range_km, 150.0);
/// ```
pub fn plan_leg_charge(
    range_km: f64,
    leg_km: f64,
    max_range_km: f64,
    config: &ChargingConfig,
) -> Option<ChargeDecision> {
    let arrival = range_km - leg_km;
    if arrival >= 0.0 {
        return Some(ChargeDecision {
            charged_km: 0.0,
            departure_range_km: range_km,
            arrival_range_km: arrival,
        });
    }

    let target = (config.target_fraction * max_range_km)
        .max(leg_km + config.margin_km)
        .min(max_range_km);
    let arrival = target - leg_km;
    if arrival < 0.0 {
        return None;
    }

    Some(ChargeDecision {
        charged_km: target - range_km,
        departure_range_km: target,
        arrival_range_km: arrival,
    })
}
