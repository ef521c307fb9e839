//! Convoy demo: twelve trucks hauling across an 8 × 8 regional grid.
//!
//! Every truck leaves a depot on the west edge with a random load bound for
//! a node on the east edge.  After arriving it keeps picking random
//! destinations, so over three simulated days the tachograph and fuel rules
//! force parking and refuelling stops.
//!
//! Reports and events are written to stdout as JSON lines; progress and
//! cache statistics go to the log (`RUST_LOG=info`).
//!
//! Usage: `convoy [truck-config.json]`

mod network;

use std::fs;
use std::io::{self, Write};
use std::time::Instant;

use anyhow::{Context, Result};
use log::{info, warn};
use serde_json::json;

use haul_core::{AgentId, NodeId, SimConfig, SimRng, Tick};
use haul_facility::FacilityDefaults;
use haul_spatial::GraphView;
use haul_sim::{FleetBuilder, FleetObserver};
use haul_truck::{Truck, TruckConfig, TruckEvent, TruckPayload};

use network::{build_network, SIDE};

// ── Constants ─────────────────────────────────────────────────────────────────

const TRUCK_COUNT:            usize = 12;
const SEED:                   u64   = 7;
const TICK_SECS:              f64   = 60.0;
const SIM_DAYS:               u64   = 3;
const SNAPSHOT_INTERVAL_TICKS: u64  = 60;
const FUEL_PRICE_PER_L:       f64   = 1.65;
const MAX_CARGO_TONNES:       f64   = 24.0;

// ── JSON-lines observer ───────────────────────────────────────────────────────

/// Writes one JSON object per line to stdout and counts what it wrote.
///
/// Observer hooks cannot fail, so the first write error is parked here and
/// checked after the run.
struct JsonLines<W: Write> {
    out: W,
    reports: u64,
    events: u64,
    parking_stops: u64,
    fuel_stops: u64,
    error: Option<anyhow::Error>,
}

impl<W: Write> JsonLines<W> {
    fn new(out: W) -> Self {
        Self { out, reports: 0, events: 0, parking_stops: 0, fuel_stops: 0, error: None }
    }

    fn emit(&mut self, value: serde_json::Value) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = writeln!(self.out, "{value}") {
            self.error = Some(e.into());
        }
    }

    fn take_error(&mut self) -> Option<anyhow::Error> {
        self.error.take()
    }
}

impl<W: Write> FleetObserver for JsonLines<W> {
    fn on_event(&mut self, tick: Tick, truck: AgentId, event: &TruckEvent) {
        match event {
            TruckEvent::RestStarted { .. } => self.parking_stops += 1,
            TruckEvent::FuelingStarted { .. } => self.fuel_stops += 1,
            _ => {}
        }
        self.events += 1;
        self.emit(json!({ "tick": tick.0, "truck": truck, "event": event }));
    }

    fn on_report(&mut self, tick: Tick, payload: &TruckPayload) {
        self.reports += 1;
        self.emit(json!({ "tick": tick.0, "report": payload }));
    }

    fn on_snapshot(&mut self, tick: Tick, trucks: &[Truck]) {
        let stranded = trucks.iter().filter(|t| t.diversion().is_stranded()).count();
        if stranded > 0 {
            warn!("{tick}: {stranded} trucks stranded");
        }
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        if let Err(e) = self.out.flush() {
            if self.error.is_none() {
                self.error = Some(e.into());
            }
        }
        info!("run ended at {final_tick}");
    }
}

fn main() -> Result<()> {
    env_logger::init();

    // 1. Truck configuration, optionally from a JSON file.
    let truck_config = match std::env::args().nth(1) {
        Some(path) => {
            let text = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            serde_json::from_str::<TruckConfig>(&text)
                .with_context(|| format!("parsing truck config {path}"))?
        }
        None => TruckConfig::default(),
    };

    // 2. Build road network.
    let (network, depots) = build_network()?;
    eprintln!(
        "Network: {} nodes, {} edges, {} buildings, {} depots",
        network.node_count(),
        network.edge_count(),
        network.buildings().len(),
        depots.len()
    );

    // 3. Spread trucks over the depots.
    let starts: Vec<NodeId> = (0..TRUCK_COUNT).map(|i| depots[i % depots.len()]).collect();

    // 4. Sim config.
    let config = SimConfig {
        tick_secs:             TICK_SECS,
        total_ticks:           SIM_DAYS * 24 * 3600 / TICK_SECS as u64,
        seed:                  SEED,
        report_interval_ticks: SNAPSHOT_INTERVAL_TICKS,
    };
    eprintln!(
        "Sim: {} ticks of {} s ({} days), {} trucks",
        config.total_ticks, config.tick_secs, SIM_DAYS, TRUCK_COUNT
    );

    // 5. Build fleet.
    let mut fleet = FleetBuilder::new(config, network)
        .facility_defaults(FacilityDefaults { parking_capacity: 2, gas_station_capacity: 1, cost_factor: 1.0 })
        .truck_config(truck_config)
        .trucks_at(starts)
        .fuel_price(FUEL_PRICE_PER_L)
        .build()?;

    // 6. Loads and first destinations.
    let mut rng = SimRng::new(SEED);
    for truck in &mut fleet.trucks {
        let row = rng.gen_range(0..SIDE);
        truck.load_cargo(rng.gen_range(0.0..MAX_CARGO_TONNES))?;
        truck.set_destination(NodeId(row * SIDE + SIDE - 1));
    }

    // 7. Run.
    let mut obs = JsonLines::new(io::BufWriter::new(io::stdout().lock()));
    let t0 = Instant::now();
    fleet.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.take_error() {
        return Err(e.context("writing output"));
    }

    // 8. Summary.
    eprintln!();
    eprintln!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    eprintln!("  reports        : {}", obs.reports);
    eprintln!("  events         : {}", obs.events);
    eprintln!("  parking stops  : {}", obs.parking_stops);
    eprintln!("  fuel stops     : {}", obs.fuel_stops);
    eprintln!();

    // 9. Final truck table.
    eprintln!(
        "{:<6} {:<20} {:>10} {:>8} {:>8} {:>10}",
        "Truck", "Status", "Odo (km)", "Fuel", "Risk", "Balance"
    );
    eprintln!("{}", "-".repeat(67));
    for truck in &fleet.trucks {
        let full = truck.serialize_full();
        eprintln!(
            "{:<6} {:<20} {:>10.1} {:>8.1} {:>8.3} {:>10.2}",
            full.id,
            full.status,
            full.odometer_m / 1000.0,
            full.fuel_l,
            full.risk_factor,
            full.balance
        );
    }

    Ok(())
}
