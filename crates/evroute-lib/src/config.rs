//! Planner tunables consolidated into a single configuration value.
//!
//! Every component receives the [`PlannerConfig`] (or one of its sections)
//! explicitly; nothing reads ambient constants. All fields default to the
//! values the planner has always used, so partial JSON documents are valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Complete planner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Multiplier turning straight-line distance into road distance.
    pub road_factor: f64,
    /// Average driving speed used for drive-time estimates.
    pub average_speed_kmh: f64,
    pub charging: ChargingConfig,
    pub fees: FeeSchedule,
    pub search: SearchConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            road_factor: 1.25,
            average_speed_kmh: 60.0,
            charging: ChargingConfig::default(),
            fees: FeeSchedule::default(),
            search: SearchConfig::default(),
        }
    }
}

impl PlannerConfig {
    /// Parse a (possibly partial) JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|err| Error::InvalidConfig {
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section of the configuration.
    pub fn validate(&self) -> Result<()> {
        positive(self.road_factor, "road_factor")?;
        if self.road_factor < 1.0 {
            return Err(Error::InvalidConfig {
                message: format!("road_factor must be at least 1.0, got {}", self.road_factor),
            });
        }
        positive(self.average_speed_kmh, "average_speed_kmh")?;
        self.charging.validate()?;
        self.fees.validate()?;
        self.search.validate()
    }
}

/// Charging policy and charge-speed settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargingConfig {
    /// Charge speed expressed as km of range gained per minute.
    pub rate_km_per_min: f64,
    /// Fraction of maximum range a stop charges to when topping up.
    pub target_fraction: f64,
    /// Extra range kept above the next leg when the target fraction is not enough.
    pub margin_km: f64,
}

impl Default for ChargingConfig {
    fn default() -> Self {
        Self {
            rate_km_per_min: 2.0,
            target_fraction: 0.9,
            margin_km: 1.0,
        }
    }
}

impl ChargingConfig {
    pub fn validate(&self) -> Result<()> {
        positive(self.rate_km_per_min, "charging.rate_km_per_min")?;
        if !self.target_fraction.is_finite()
            || self.target_fraction <= 0.0
            || self.target_fraction > 1.0
        {
            return Err(Error::InvalidConfig {
                message: format!(
                    "charging.target_fraction must be in (0, 1], got {}",
                    self.target_fraction
                ),
            });
        }
        if !self.margin_km.is_finite() || self.margin_km < 0.0 {
            return Err(Error::InvalidConfig {
                message: format!(
                    "charging.margin_km must be finite and non-negative, got {}",
                    self.margin_km
                ),
            });
        }
        Ok(())
    }
}

/// One band of the tiered fee schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeTier {
    /// Length of the band in minutes; `None` marks the open-ended last band.
    pub minutes: Option<f64>,
    /// Price per charging minute inside the band.
    pub rate_per_min: f64,
}

/// Tiered per-minute charging fee schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeSchedule {
    pub tiers: Vec<FeeTier>,
    /// A stop is billed only when the range before it exceeded this fraction of maximum range.
    pub paid_above_fraction: f64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            tiers: vec![
                FeeTier {
                    minutes: Some(30.0),
                    rate_per_min: 1000.0,
                },
                FeeTier {
                    minutes: Some(30.0),
                    rate_per_min: 2000.0,
                },
                FeeTier {
                    minutes: None,
                    rate_per_min: 3000.0,
                },
            ],
            paid_above_fraction: 0.8,
        }
    }
}

impl FeeSchedule {
    pub fn validate(&self) -> Result<()> {
        let Some(last) = self.tiers.last() else {
            return Err(Error::InvalidConfig {
                message: "fees.tiers must contain at least one tier".to_string(),
            });
        };
        if last.minutes.is_some() {
            return Err(Error::InvalidConfig {
                message: "the last fee tier must be open-ended (minutes = null)".to_string(),
            });
        }

        let mut previous_rate = f64::NEG_INFINITY;
        for (index, tier) in self.tiers.iter().enumerate() {
            if index + 1 < self.tiers.len() {
                match tier.minutes {
                    Some(minutes) if minutes.is_finite() && minutes > 0.0 => {}
                    _ => {
                        return Err(Error::InvalidConfig {
                            message: format!(
                                "fee tier {index} must have a finite positive length"
                            ),
                        })
                    }
                }
            }
            if !tier.rate_per_min.is_finite() || tier.rate_per_min < 0.0 {
                return Err(Error::InvalidConfig {
                    message: format!("fee tier {index} has an invalid rate"),
                });
            }
            if tier.rate_per_min <= previous_rate {
                return Err(Error::InvalidConfig {
                    message: "fee tier rates must be strictly increasing".to_string(),
                });
            }
            previous_rate = tier.rate_per_min;
        }

        if !(0.0..=1.0).contains(&self.paid_above_fraction) {
            return Err(Error::InvalidConfig {
                message: format!(
                    "fees.paid_above_fraction must be in [0, 1], got {}",
                    self.paid_above_fraction
                ),
            });
        }
        Ok(())
    }
}

/// Search-engine knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Expand only the K feasible candidates closest to the goal; `None` expands all.
    pub max_candidates: Option<usize>,
    /// Width of the remaining-range buckets used as deduplication keys.
    pub range_bucket_km: f64,
    /// Wall-clock budget for a single search, in seconds.
    pub time_budget_secs: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_candidates: Some(10),
            range_bucket_km: 1.0,
            time_budget_secs: 60.0,
        }
    }
}

impl SearchConfig {
    /// Budget as a [`Duration`]; values too large to represent saturate to [`Duration::MAX`].
    pub fn time_budget(&self) -> Duration {
        Duration::try_from_secs_f64(self.time_budget_secs.max(0.0)).unwrap_or(Duration::MAX)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_candidates == Some(0) {
            return Err(Error::InvalidConfig {
                message: "search.max_candidates must be at least 1 (use null to disable pruning)"
                    .to_string(),
            });
        }
        positive(self.range_bucket_km, "search.range_bucket_km")?;
        if !self.time_budget_secs.is_finite() || self.time_budget_secs < 0.0 {
            return Err(Error::InvalidConfig {
                message: format!(
                    "search.time_budget_secs must be finite and non-negative, got {}",
                    self.time_budget_secs
                ),
            });
        }
        if Duration::try_from_secs_f64(self.time_budget_secs).is_err() {
            return Err(Error::InvalidConfig {
                message: format!(
                    "search.time_budget_secs is too large, got {}",
                    self.time_budget_secs
                ),
            });
        }
        Ok(())
    }
}

fn positive(value: f64, field: &str) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidConfig {
            message: format!("{field} must be a finite positive number, got {value}"),
        });
    }
    Ok(())
}
