//! A single capacity-limited facility.

use std::collections::BTreeSet;

use haul_core::{AgentId, BuildingId, NodeId};
use haul_spatial::{Building, BuildingKind};

use crate::{FacilityError, FacilityResult};

/// A parking or gas station that holds at most `capacity` agents.
///
/// Occupancy only changes through [`enter`](Self::enter) and
/// [`leave`](Self::leave); `enter` on a full facility leaves it untouched, so
/// `occupancy() <= capacity()` always holds.
#[derive(Debug, Clone)]
pub struct Facility {
    pub id: BuildingId,
    pub kind: BuildingKind,
    pub node: NodeId,
    capacity: u32,
    occupants: BTreeSet<AgentId>,
    /// Multiplier on the global fuel price (gas stations).
    pub cost_factor: f64,
    /// Revenue collected from agents.
    pub balance: f64,
}

impl Facility {
    pub fn new(building: &Building, capacity: u32, cost_factor: f64) -> Self {
        Self {
            id: building.id,
            kind: building.kind,
            node: building.node,
            capacity,
            occupants: BTreeSet::new(),
            cost_factor,
            balance: 0.0,
        }
    }

    /// Admit `agent`.  Entering a facility the agent already occupies is a
    /// no-op success.
    pub fn enter(&mut self, agent: AgentId) -> FacilityResult<()> {
        if self.occupants.contains(&agent) {
            return Ok(());
        }
        if !self.has_space() {
            return Err(FacilityError::Full { facility: self.id, capacity: self.capacity });
        }
        self.occupants.insert(agent);
        Ok(())
    }

    /// Release `agent`.  Returns `false` if it was not inside.
    pub fn leave(&mut self, agent: AgentId) -> bool {
        self.occupants.remove(&agent)
    }

    #[inline]
    pub fn has_space(&self) -> bool {
        (self.occupants.len() as u64) < self.capacity as u64
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    #[inline]
    pub fn occupancy(&self) -> usize {
        self.occupants.len()
    }

    pub fn contains(&self, agent: AgentId) -> bool {
        self.occupants.contains(&agent)
    }

    /// Occupants in ascending `AgentId` order.
    pub fn occupants(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.occupants.iter().copied()
    }

    pub fn credit(&mut self, amount: f64) {
        self.balance += amount;
    }
}
