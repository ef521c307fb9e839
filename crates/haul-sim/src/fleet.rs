//! The `Fleet` struct and its tick loop.

use log::info;

use haul_core::{AgentId, SimClock, SimConfig, Tick};
use haul_facility::FacilityRegistry;
use haul_spatial::{Navigator, RoadNetwork};
use haul_truck::{TickContext, Truck};

use crate::{FleetObserver, SimResult};

/// Runs every truck once per tick, in ascending `AgentId` order.
///
/// The order is fixed, so facility contention resolves the same way on every
/// run with the same seed.  Create via [`FleetBuilder`][crate::FleetBuilder].
pub struct Fleet {
    pub config: SimConfig,
    pub clock: SimClock,
    pub network: RoadNetwork,
    /// Shared search engine; its cache spans all trucks.
    pub navigator: Navigator,
    pub facilities: FacilityRegistry,
    pub trucks: Vec<Truck>,
    pub fuel_price_per_l: f64,
}

impl Fleet {
    /// Run from the current tick to `config.end_tick()`.
    pub fn run<O: FleetObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        info!(
            "fleet of {} trucks starting at {}, {} ticks of {} s",
            self.trucks.len(),
            self.clock,
            self.config.total_ticks,
            self.config.tick_secs
        );
        while self.clock.current_tick < self.config.end_tick() {
            self.step(observer);
        }
        let (hits, misses) = self.navigator.cache().stats();
        info!("fleet finished at {} (search cache {hits} hits, {misses} misses)", self.clock);
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Run exactly `n` ticks, ignoring `end_tick`.
    pub fn run_ticks<O: FleetObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer);
        }
        Ok(())
    }

    pub fn truck(&self, id: AgentId) -> Option<&Truck> {
        self.trucks.get(id.index())
    }

    fn step<O: FleetObserver>(&mut self, observer: &mut O) {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);
        let events = self.process_tick(now, observer);
        if now.is_on_interval(self.config.report_interval_ticks) {
            observer.on_snapshot(now, &self.trucks);
        }
        observer.on_tick_end(now, events);
        self.clock.advance();
    }

    fn process_tick<O: FleetObserver>(&mut self, now: Tick, observer: &mut O) -> usize {
        let dt_s = self.clock.tick_secs;
        let mut count = 0;
        for truck in &mut self.trucks {
            let mut ctx = TickContext::new(
                &self.network,
                &mut self.navigator,
                &mut self.facilities,
                self.fuel_price_per_l,
            );
            let events = truck.decide(&mut ctx, dt_s);
            count += events.len();
            for event in &events {
                observer.on_event(now, truck.id, event);
            }
            if let Some(payload) = truck.serialize_diff() {
                observer.on_report(now, &payload);
            }
        }
        count
    }
}
