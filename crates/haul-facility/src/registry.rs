//! All facilities of a map, keyed by building.

use log::debug;
use rustc_hash::FxHashMap;

use haul_core::{AgentId, BuildingId};
use haul_spatial::{Building, BuildingKind};

use crate::{Facility, FacilityError, FacilityResult};

/// Capacities and pricing applied when facilities are created from map
/// buildings.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FacilityDefaults {
    pub parking_capacity: u32,
    pub gas_station_capacity: u32,
    pub cost_factor: f64,
}

impl Default for FacilityDefaults {
    fn default() -> Self {
        Self { parking_capacity: 4, gas_station_capacity: 2, cost_factor: 1.0 }
    }
}

/// Owner of every occupiable facility.
///
/// Agents reach facilities only through the narrow `enter`/`leave`/
/// `has_space` contract.  Mutations go through `&mut self`, which serialises
/// them when agents are evaluated one after another.
#[derive(Debug, Default, Clone)]
pub struct FacilityRegistry {
    facilities: FxHashMap<BuildingId, Facility>,
}

impl FacilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// One facility per parking and gas-station building.  Depots are not
    /// occupiable and are skipped.
    pub fn from_buildings<'a>(
        buildings: impl IntoIterator<Item = &'a Building>,
        defaults:  &FacilityDefaults,
    ) -> Self {
        let mut registry = Self::new();
        for b in buildings {
            let capacity = match b.kind {
                BuildingKind::Parking    => defaults.parking_capacity,
                BuildingKind::GasStation => defaults.gas_station_capacity,
                BuildingKind::Depot      => continue,
            };
            registry.insert(Facility::new(b, capacity, defaults.cost_factor));
        }
        debug!("registered {} facilities", registry.len());
        registry
    }

    pub fn insert(&mut self, facility: Facility) -> Option<Facility> {
        self.facilities.insert(facility.id, facility)
    }

    pub fn get(&self, id: BuildingId) -> Option<&Facility> {
        self.facilities.get(&id)
    }

    pub fn get_mut(&mut self, id: BuildingId) -> Option<&mut Facility> {
        self.facilities.get_mut(&id)
    }

    pub fn enter(&mut self, id: BuildingId, agent: AgentId) -> FacilityResult<()> {
        self.facilities
            .get_mut(&id)
            .ok_or(FacilityError::Unknown(id))?
            .enter(agent)
    }

    /// Returns `false` if the facility is unknown or the agent was not inside.
    pub fn leave(&mut self, id: BuildingId, agent: AgentId) -> bool {
        self.facilities.get_mut(&id).is_some_and(|f| f.leave(agent))
    }

    pub fn has_space(&self, id: BuildingId) -> bool {
        self.facilities.get(&id).is_some_and(Facility::has_space)
    }

    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    /// Facilities in ascending `BuildingId` order.
    pub fn iter(&self) -> impl Iterator<Item = &Facility> + '_ {
        let mut all: Vec<&Facility> = self.facilities.values().collect();
        all.sort_by_key(|f| f.id);
        all.into_iter()
    }
}
