//! Fluent builder for constructing a [`Fleet`].

use haul_core::{AgentId, NodeId, SimConfig};
use haul_facility::{FacilityDefaults, FacilityRegistry};
use haul_spatial::{Navigator, RoadNetwork};
use haul_truck::{Truck, TruckConfig};

use crate::{Fleet, SimError, SimResult};

/// Fluent builder for [`Fleet`].
///
/// # Optional inputs (have defaults)
///
/// | Method                  | Default                                         |
/// |-------------------------|-------------------------------------------------|
/// | `.facilities(r)`        | Built from the network's buildings              |
/// | `.facility_defaults(d)` | `FacilityDefaults::default()`                   |
/// | `.truck_config(c)`      | `TruckConfig::default()`                        |
/// | `.fuel_price(p)`        | `1.5` per litre                                 |
/// | `.search_cache(b)`      | `true`                                          |
///
/// # Example
///
/// ```rust,ignore
/// let mut fleet = FleetBuilder::new(config, network)
///     .trucks_at(depots)
///     .fuel_price(1.8)
///     .build()?;
/// fleet.run(&mut NoopObserver)?;
/// ```
pub struct FleetBuilder {
    config:            SimConfig,
    network:           RoadNetwork,
    facilities:        Option<FacilityRegistry>,
    facility_defaults: FacilityDefaults,
    truck_config:      TruckConfig,
    starts:            Vec<NodeId>,
    fuel_price_per_l:  f64,
    search_cache:      bool,
}

impl FleetBuilder {
    pub fn new(config: SimConfig, network: RoadNetwork) -> Self {
        Self {
            config,
            network,
            facilities:        None,
            facility_defaults: FacilityDefaults::default(),
            truck_config:      TruckConfig::default(),
            starts:            Vec::new(),
            fuel_price_per_l:  1.5,
            search_cache:      true,
        }
    }

    /// Use a prepared registry instead of one derived from the network.
    pub fn facilities(mut self, facilities: FacilityRegistry) -> Self {
        self.facilities = Some(facilities);
        self
    }

    pub fn facility_defaults(mut self, defaults: FacilityDefaults) -> Self {
        self.facility_defaults = defaults;
        self
    }

    /// Configuration shared by every truck.
    pub fn truck_config(mut self, config: TruckConfig) -> Self {
        self.truck_config = config;
        self
    }

    /// Add one truck per start node.  `AgentId`s follow insertion order.
    pub fn trucks_at(mut self, starts: impl IntoIterator<Item = NodeId>) -> Self {
        self.starts.extend(starts);
        self
    }

    pub fn fuel_price(mut self, price_per_l: f64) -> Self {
        self.fuel_price_per_l = price_per_l;
        self
    }

    pub fn search_cache(mut self, enabled: bool) -> Self {
        self.search_cache = enabled;
        self
    }

    pub fn build(self) -> SimResult<Fleet> {
        self.config.validate()?;
        if !(self.fuel_price_per_l >= 0.0 && self.fuel_price_per_l.is_finite()) {
            return Err(SimError::Config(format!(
                "fuel price must be non-negative, got {}",
                self.fuel_price_per_l
            )));
        }

        let mut trucks = Vec::with_capacity(self.starts.len());
        for (index, &node) in self.starts.iter().enumerate() {
            let id = AgentId::try_from(index)
                .map_err(|_| SimError::Config(format!("too many trucks ({})", self.starts.len())))?;
            let truck = Truck::spawn(id, node, self.truck_config.clone(), self.config.seed, &self.network)
                .map_err(|source| SimError::Truck { index, source })?;
            trucks.push(truck);
        }

        let facilities = match self.facilities {
            Some(f) => f,
            None => FacilityRegistry::from_buildings(self.network.buildings(), &self.facility_defaults),
        };
        let navigator = if self.search_cache { Navigator::new() } else { Navigator::without_cache() };

        Ok(Fleet {
            clock:            self.config.make_clock(),
            config:           self.config,
            network:          self.network,
            navigator,
            facilities,
            trucks,
            fuel_price_per_l: self.fuel_price_per_l,
        })
    }
}
