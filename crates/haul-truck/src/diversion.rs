use serde::{Deserialize, Serialize};

use haul_core::{BuildingId, NodeId};

/// What a truck is doing besides following its route.  One variant at a
/// time, so "resting while seeking" style combinations cannot exist.
#[derive(Copy, Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum Diversion {
    #[default]
    None,
    /// Driving to `facility` at `node`; `attempts` counts parkings targeted
    /// in this diversion.
    SeekingParking { facility: BuildingId, node: NodeId, attempts: u32 },
    Resting { facility: BuildingId },
    SeekingGasStation { facility: BuildingId, node: NodeId },
    /// At the station, which was full.
    WaitingForPump { facility: BuildingId },
    /// Filling `liters` in total.
    Fueling { facility: BuildingId, liters: f64 },
    /// Out of fuel.  Not left without outside help.
    Stranded,
}

impl Diversion {
    pub fn is_none(&self) -> bool {
        matches!(self, Diversion::None)
    }

    pub fn is_seeking_parking(&self) -> bool {
        matches!(self, Diversion::SeekingParking { .. })
    }

    pub fn is_resting(&self) -> bool {
        matches!(self, Diversion::Resting { .. })
    }

    pub fn is_seeking_gas_station(&self) -> bool {
        matches!(self, Diversion::SeekingGasStation { .. })
    }

    pub fn is_fueling(&self) -> bool {
        matches!(self, Diversion::Fueling { .. })
    }

    pub fn is_stranded(&self) -> bool {
        matches!(self, Diversion::Stranded)
    }

    /// The truck may move this tick.
    pub fn is_mobile(&self) -> bool {
        matches!(
            self,
            Diversion::None | Diversion::SeekingParking { .. } | Diversion::SeekingGasStation { .. }
        )
    }

    /// Facility targeted or occupied.
    pub fn facility(&self) -> Option<BuildingId> {
        match *self {
            Diversion::SeekingParking { facility, .. }
            | Diversion::Resting { facility }
            | Diversion::SeekingGasStation { facility, .. }
            | Diversion::WaitingForPump { facility }
            | Diversion::Fueling { facility, .. } => Some(facility),
            Diversion::None | Diversion::Stranded => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Diversion::None                     => "driving",
            Diversion::SeekingParking { .. }    => "seeking_parking",
            Diversion::Resting { .. }           => "resting",
            Diversion::SeekingGasStation { .. } => "seeking_gas_station",
            Diversion::WaitingForPump { .. }    => "waiting_for_pump",
            Diversion::Fueling { .. }           => "fueling",
            Diversion::Stranded                 => "stranded",
        }
    }
}
