//! Fuel level, consumption and the gas-station seek ramp.

use serde::{Deserialize, Serialize};

use crate::TruckConfig;

/// Below this fraction a truck must look for fuel.
pub const FORCED_FUEL_FRACTION: f64 = 0.10;
/// Seek threshold for a risk factor of zero.
const SEEK_FRACTION_MAX: f64 = 0.30;
/// How far a risk factor of one lowers the seek threshold.
const SEEK_RISK_SPAN: f64 = 0.15;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FuelState {
    pub tank_capacity_l: f64,
    pub current_fuel_l: f64,
    /// Never decreases.
    pub co2_emitted_kg: f64,
    /// Litres still to pump during a fueling stop.
    pub fueling_liters_needed: f64,
}

impl FuelState {
    /// A full tank.
    pub fn new(tank_capacity_l: f64) -> Self {
        Self {
            tank_capacity_l,
            current_fuel_l: tank_capacity_l,
            co2_emitted_kg: 0.0,
            fueling_liters_needed: 0.0,
        }
    }

    pub fn fraction(&self) -> f64 {
        if self.tank_capacity_l > 0.0 {
            self.current_fuel_l / self.tank_capacity_l
        } else {
            0.0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.current_fuel_l <= 0.0
    }

    pub fn search_probability(&self, risk_factor: f64) -> f64 {
        fuel_search_probability(self.fraction(), risk_factor)
    }

    /// Metres drivable with the fuel left.
    pub fn range_m(&self, config: &TruckConfig, cargo_tonnes: f64) -> f64 {
        let per_km = consumption_l_per_km(config, cargo_tonnes);
        if per_km > 0.0 {
            self.current_fuel_l / per_km * 1000.0
        } else {
            f64::INFINITY
        }
    }

    /// Burn fuel for `distance_m` and emit the matching CO₂.  Returns the
    /// litres actually consumed.
    pub fn burn(&mut self, distance_m: f64, config: &TruckConfig, cargo_tonnes: f64) -> f64 {
        let wanted = consumption_l_per_km(config, cargo_tonnes) * distance_m.max(0.0) / 1000.0;
        let used = wanted.min(self.current_fuel_l);
        self.current_fuel_l -= used;
        self.co2_emitted_kg += used * config.co2_kg_per_l;
        used
    }

    /// Start a fueling stop.  Returns the litres needed to fill the tank.
    pub fn begin_fueling(&mut self) -> f64 {
        self.fueling_liters_needed = (self.tank_capacity_l - self.current_fuel_l).max(0.0);
        self.fueling_liters_needed
    }

    /// Pump up to `liters`.  Returns the amount added.
    pub fn pump(&mut self, liters: f64) -> f64 {
        let added = liters.max(0.0).min(self.fueling_liters_needed);
        self.current_fuel_l = (self.current_fuel_l + added).min(self.tank_capacity_l);
        self.fueling_liters_needed -= added;
        added
    }
}

/// `(base + cargo × per_tonne) / 100` litres per kilometre.
pub fn consumption_l_per_km(config: &TruckConfig, cargo_tonnes: f64) -> f64 {
    (config.base_consumption_l_per_100km
        + cargo_tonnes.max(0.0) * config.consumption_per_tonne_l_per_100km)
        / 100.0
}

/// Probability of starting a gas-station search at `fraction` of a full
/// tank.  The ramp starts between 15 % and 30 % (lower for riskier drivers)
/// and reaches one at 10 %.
pub fn fuel_search_probability(fraction: f64, risk_factor: f64) -> f64 {
    if fraction <= FORCED_FUEL_FRACTION {
        return 1.0;
    }
    let start = SEEK_FRACTION_MAX - SEEK_RISK_SPAN * risk_factor.clamp(0.0, 1.0);
    if fraction >= start {
        return 0.0;
    }
    ((start - fraction) / (start - FORCED_FUEL_FRACTION)).clamp(0.0, 1.0)
}
