//! Tunables of the truck decision engine.

use serde::{Deserialize, Serialize};

use crate::{TruckError, TruckResult};

/// Per-truck configuration.  Every field has a default, so a JSON file only
/// needs to name what it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TruckConfig {
    pub max_speed_kph: f64,

    pub tank_capacity_l: f64,
    pub base_consumption_l_per_100km: f64,
    /// Extra consumption per tonne of cargo.
    pub consumption_per_tonne_l_per_100km: f64,
    pub co2_kg_per_l: f64,
    pub pump_rate_l_per_s: f64,

    /// Parkings tried per diversion before giving up.
    pub max_parking_attempts: u32,
    /// Driving seconds during which no new parking search starts after a
    /// give-up.
    pub parking_backoff_s: f64,
    /// Deductions for `(0, 1]`, `(1, 2]` and `> 2` hours over the limit.
    pub penalty_tiers: [f64; 3],
    /// Bounds of the random risk-factor adjustment after a rest or penalty.
    pub risk_adjust_min: f64,
    pub risk_adjust_max: f64,

    pub initial_risk_factor: f64,
    pub initial_balance: f64,
}

impl Default for TruckConfig {
    fn default() -> Self {
        Self {
            max_speed_kph:                     90.0,
            tank_capacity_l:                   400.0,
            base_consumption_l_per_100km:      25.0,
            consumption_per_tonne_l_per_100km: 0.5,
            co2_kg_per_l:                      2.68,
            pump_rate_l_per_s:                 1.0,
            max_parking_attempts:              5,
            parking_backoff_s:                 1800.0,
            penalty_tiers:                     [100.0, 300.0, 1000.0],
            risk_adjust_min:                   0.005,
            risk_adjust_max:                   0.01,
            initial_risk_factor:               0.5,
            initial_balance:                   0.0,
        }
    }
}

impl TruckConfig {
    pub fn validate(&self) -> TruckResult<()> {
        let positive = [
            ("max_speed_kph", self.max_speed_kph),
            ("tank_capacity_l", self.tank_capacity_l),
            ("pump_rate_l_per_s", self.pump_rate_l_per_s),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(TruckError::Config(format!("{name} must be positive, got {value}")));
            }
        }
        let non_negative = [
            ("base_consumption_l_per_100km", self.base_consumption_l_per_100km),
            ("consumption_per_tonne_l_per_100km", self.consumption_per_tonne_l_per_100km),
            ("co2_kg_per_l", self.co2_kg_per_l),
            ("parking_backoff_s", self.parking_backoff_s),
        ];
        for (name, value) in non_negative.into_iter().chain(
            self.penalty_tiers.iter().map(|&t| ("penalty_tiers", t)),
        ) {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(TruckError::Config(format!("{name} must be non-negative, got {value}")));
            }
        }
        if self.max_parking_attempts == 0 {
            return Err(TruckError::Config("max_parking_attempts must be at least 1".into()));
        }
        let unit = 0.0..=1.0;
        if !unit.contains(&self.risk_adjust_min)
            || !unit.contains(&self.risk_adjust_max)
            || self.risk_adjust_min > self.risk_adjust_max
        {
            return Err(TruckError::Config(format!(
                "risk adjustment range {}..={} must be an ordered range within [0, 1]",
                self.risk_adjust_min, self.risk_adjust_max
            )));
        }
        if !unit.contains(&self.initial_risk_factor) {
            return Err(TruckError::Config(format!(
                "initial_risk_factor must lie in [0, 1], got {}",
                self.initial_risk_factor
            )));
        }
        if !self.initial_balance.is_finite() {
            return Err(TruckError::Config("initial_balance must be finite".into()));
        }
        Ok(())
    }
}
