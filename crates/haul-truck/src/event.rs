use serde::Serialize;

use haul_core::{BuildingId, NodeId};

use crate::Position;

/// Observable outcomes of one [`Truck::decide`][crate::Truck::decide] call.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum TruckEvent {
    RouteInstalled { destination: NodeId, nodes: usize, cost_s: f64 },
    /// The route head was not reachable over a single edge from `at`.
    RouteInvalidated { at: NodeId },
    ArrivedAtDestination { node: NodeId },

    ParkingSearchStarted { facility: BuildingId, node: NodeId, attempt: u32 },
    ParkingFull { facility: BuildingId },
    /// No usable parking; driving on without rest.
    ParkingGivenUp { attempts: u32 },
    RestStarted { facility: BuildingId, required_rest_s: f64 },
    RestCompleted { facility: BuildingId, rested_s: f64 },
    PenaltyApplied { amount: f64, overtime_s: f64 },

    FuelSearchStarted { facility: BuildingId, node: NodeId },
    GasStationFull { facility: BuildingId },
    FuelingStarted { facility: BuildingId, liters_needed: f64 },
    FuelingCompleted { facility: BuildingId, liters: f64, cost: f64 },
    OutOfFuel { position: Position },
}
