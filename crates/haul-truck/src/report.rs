//! Change-driven state reports.
//!
//! A report is emitted only when the small [`WatchState`] projection
//! differs from the one last reported.  Counters that change every tick
//! (driving time, fuel level) stay out of the projection but ride along in
//! every [`TruckPayload`].

use serde::Serialize;

use haul_core::{AgentId, BuildingId, NodeId};

use crate::{Position, Truck};

#[derive(Clone, Debug, PartialEq)]
pub struct WatchState {
    pub position: Position,
    pub speed_kph: f64,
    pub route: Vec<NodeId>,
    pub cargo_tonnes: f64,
    pub facility: Option<BuildingId>,
    pub status: &'static str,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TruckPayload {
    pub id: AgentId,
    pub status: &'static str,
    pub position: Position,
    pub speed_kph: f64,
    pub route: Vec<NodeId>,
    pub route_start: Option<NodeId>,
    pub route_end: Option<NodeId>,
    pub cargo_tonnes: f64,
    pub facility: Option<BuildingId>,

    pub driving_time_s: f64,
    pub resting_time_s: f64,
    pub required_rest_s: f64,
    pub risk_factor: f64,
    pub balance: f64,
    pub fuel_l: f64,
    pub co2_emitted_kg: f64,
    pub odometer_m: f64,
}

impl Truck {
    pub fn watch_state(&self) -> WatchState {
        WatchState {
            position: self.position,
            speed_kph: self.speed_kph,
            route: self.route.to_vec(),
            cargo_tonnes: self.cargo_tonnes,
            facility: self.diversion.facility(),
            status: self.diversion.as_str(),
        }
    }

    /// Full payload if the watched state changed since the last report,
    /// `None` otherwise.  The first call always reports.
    pub fn serialize_diff(&mut self) -> Option<TruckPayload> {
        let watch = self.watch_state();
        if self.last_watch.as_ref() == Some(&watch) {
            return None;
        }
        self.last_watch = Some(watch);
        Some(self.serialize_full())
    }

    pub fn serialize_full(&self) -> TruckPayload {
        TruckPayload {
            id: self.id,
            status: self.diversion.as_str(),
            position: self.position,
            speed_kph: self.speed_kph,
            route: self.route.to_vec(),
            route_start: self.route.route_start(),
            route_end: self.route.route_end(),
            cargo_tonnes: self.cargo_tonnes,
            facility: self.diversion.facility(),
            driving_time_s: self.tachograph.driving_time_s,
            resting_time_s: self.tachograph.resting_time_s,
            required_rest_s: self.tachograph.required_rest_s,
            risk_factor: self.tachograph.risk_factor,
            balance: self.tachograph.balance,
            fuel_l: self.fuel.current_fuel_l,
            co2_emitted_kg: self.fuel.co2_emitted_kg,
            odometer_m: self.odometer_m,
        }
    }
}
