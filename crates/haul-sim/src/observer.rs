//! Observer hooks called by the fleet runner.

use haul_core::{AgentId, Tick};
use haul_truck::{Truck, TruckEvent, TruckPayload};

/// Callbacks invoked by [`Fleet::run`][crate::Fleet::run].
///
/// Every method defaults to a no-op.
///
/// # Example — event printer
///
/// ```rust,ignore
/// struct Printer;
///
/// impl FleetObserver for Printer {
///     fn on_event(&mut self, tick: Tick, truck: AgentId, event: &TruckEvent) {
///         println!("{tick} {truck}: {event:?}");
///     }
/// }
/// ```
pub trait FleetObserver {
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// One call per event, in truck order, as soon as the truck has decided.
    fn on_event(&mut self, _tick: Tick, _truck: AgentId, _event: &TruckEvent) {}

    /// A truck's watched state changed this tick.
    fn on_report(&mut self, _tick: Tick, _payload: &TruckPayload) {}

    /// Every `report_interval_ticks` ticks, after all trucks decided.
    fn on_snapshot(&mut self, _tick: Tick, _trucks: &[Truck]) {}

    /// `events` is the number of events raised this tick.
    fn on_tick_end(&mut self, _tick: Tick, _events: usize) {}

    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

pub struct NoopObserver;

impl FleetObserver for NoopObserver {}
