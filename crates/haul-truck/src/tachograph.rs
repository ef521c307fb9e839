//! Regulatory driving/rest tracking.
//!
//! Continuous driving is limited to [`MAX_DRIVING_S`].  A truck starts
//! looking for parking with a probability that ramps from zero at
//! `7 h + risk_factor` of driving to one at 8 h, and must look beyond that.
//! Passing the limit is penalised once per driving window: when a rest
//! begins late, or when the truck gives up looking for parking.  A late
//! rest still runs to completion.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use haul_core::{BuildingId, NodeId};

const HOUR_S: f64 = 3600.0;

pub const MAX_DRIVING_S: f64 = 8.0 * HOUR_S;

const SEEK_BASE_H: f64 = 7.0;
const MIN_REST_S: f64 = 6.0 * HOUR_S;
const MAX_REST_S: f64 = 10.0 * HOUR_S;
/// Driving hours at which the required rest starts to grow.
const REST_RAMP_START_H: f64 = 6.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TachographState {
    pub driving_time_s: f64,
    pub resting_time_s: f64,
    pub required_rest_s: f64,
    /// Tolerance for pushing the limit, in `[0, 1]`.
    pub risk_factor: f64,
    /// Money; may go negative.
    pub balance: f64,
    /// Where to resume after a parking or fuel diversion.
    pub original_destination: Option<NodeId>,
    /// Parkings found full since the last completed rest.
    pub tried_parkings: BTreeSet<BuildingId>,
    /// No parking search while `driving_time_s` is below this.
    pub parking_backoff_until_s: Option<f64>,
    /// The current rest cycle began past the limit and was penalised.
    pub penalised: bool,
}

impl TachographState {
    pub fn new(risk_factor: f64, balance: f64) -> Self {
        Self {
            driving_time_s: 0.0,
            resting_time_s: 0.0,
            required_rest_s: 0.0,
            risk_factor: risk_factor.clamp(0.0, 1.0),
            balance,
            original_destination: None,
            tried_parkings: BTreeSet::new(),
            parking_backoff_until_s: None,
            penalised: false,
        }
    }

    pub fn driving_hours(&self) -> f64 {
        self.driving_time_s / HOUR_S
    }

    /// Driving time beyond the limit.
    pub fn overtime_s(&self) -> f64 {
        (self.driving_time_s - MAX_DRIVING_S).max(0.0)
    }

    pub fn parking_search_suppressed(&self) -> bool {
        self.parking_backoff_until_s.is_some_and(|until| self.driving_time_s < until)
    }

    pub fn suppress_parking_search(&mut self, backoff_s: f64) {
        self.parking_backoff_until_s = Some(self.driving_time_s + backoff_s);
    }

    pub fn search_probability(&self) -> f64 {
        parking_search_probability(self.driving_time_s, self.risk_factor)
    }

    /// Deduct `amount` and lower the risk tolerance.  Marks the rest cycle as
    /// penalised.
    pub fn apply_penalty(&mut self, amount: f64, risk_adjust: f64) {
        self.balance -= amount;
        self.risk_factor = (self.risk_factor - risk_adjust).clamp(0.0, 1.0);
        self.penalised = true;
    }

    /// Fix the rest length from the driving time so far.
    pub fn start_rest(&mut self) -> f64 {
        self.resting_time_s = 0.0;
        self.required_rest_s = required_rest_s(self.driving_time_s);
        self.required_rest_s
    }

    /// Accumulate `dt_s` of rest.  Returns `true` once the rest is complete.
    pub fn accumulate_rest(&mut self, dt_s: f64) -> bool {
        self.resting_time_s += dt_s;
        self.resting_time_s >= self.required_rest_s
    }

    /// Reset the counters after a full rest.  An unpenalised rest raises the
    /// risk tolerance by `risk_adjust`.
    pub fn complete_rest(&mut self, risk_adjust: f64) {
        if !self.penalised {
            self.risk_factor = (self.risk_factor + risk_adjust).clamp(0.0, 1.0);
        }
        self.driving_time_s = 0.0;
        self.resting_time_s = 0.0;
        self.required_rest_s = 0.0;
        self.tried_parkings.clear();
        self.parking_backoff_until_s = None;
        self.penalised = false;
    }
}

/// Probability of starting a parking search this tick.
pub fn parking_search_probability(driving_time_s: f64, risk_factor: f64) -> f64 {
    let hours = driving_time_s / HOUR_S;
    let max_h = MAX_DRIVING_S / HOUR_S;
    if hours >= max_h {
        return 1.0;
    }
    let start_h = SEEK_BASE_H + risk_factor.clamp(0.0, 1.0);
    if hours <= start_h || start_h >= max_h {
        return 0.0;
    }
    ((hours - start_h) / (max_h - start_h)).clamp(0.0, 1.0)
}

/// Linear between 6 h driving → 6 h rest and 8 h driving → 10 h rest,
/// clamped at both ends.
pub fn required_rest_s(driving_time_s: f64) -> f64 {
    let hours = (driving_time_s / HOUR_S).clamp(REST_RAMP_START_H, MAX_DRIVING_S / HOUR_S);
    let t = (hours - REST_RAMP_START_H) / (MAX_DRIVING_S / HOUR_S - REST_RAMP_START_H);
    MIN_REST_S + t * (MAX_REST_S - MIN_REST_S)
}

/// Deduction for `overtime_s` past the limit; zero when not over.
pub fn penalty_for(overtime_s: f64, tiers: [f64; 3]) -> f64 {
    let hours = overtime_s / HOUR_S;
    if hours <= 0.0 {
        0.0
    } else if hours <= 1.0 {
        tiers[0]
    } else if hours <= 2.0 {
        tiers[1]
    } else {
        tiers[2]
    }
}
