//! The truck agent and its per-tick decision procedure.
//!
//! One [`Truck::decide`] call runs, in order:
//!
//! 1. stationary states (stranded, resting, waiting for a pump, fueling),
//!    which end the tick;
//! 2. route acquisition when the route is empty;
//! 3. parking then fuel checks while plainly driving; a forced parking
//!    search also runs during a fuel detour;
//! 4. movement, passing through intermediate nodes within the tick until
//!    the time budget runs out or a node demands a stop.

use log::{debug, info, warn};

use haul_core::{AgentId, AgentRng, BuildingId, NodeId};
use haul_facility::FacilityError;
use haul_spatial::{
    AndCriteria, BuildingKind, BuildingTypeCriteria, CriteriaItem, EdgeCountCriteria,
    EdgeDirection, GraphView, NodeCriteria, Route, SearchHit,
};

use crate::report::WatchState;
use crate::tachograph::penalty_for;
use crate::{
    Diversion, FuelState, Position, TachographState, TickContext, TruckConfig, TruckError,
    TruckEvent, TruckResult,
};

/// An edge counts as finished within this many metres of its end.
const ARRIVAL_EPS_M: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct Truck {
    pub id: AgentId,
    pub(crate) config: TruckConfig,
    pub(crate) position: Position,
    pub(crate) speed_kph: f64,
    pub(crate) route: Route,
    /// End of the route currently driven.
    pub(crate) destination: Option<NodeId>,
    /// Requested destination for the next plan.
    pub(crate) next_destination: Option<NodeId>,
    pub(crate) diversion: Diversion,
    pub(crate) tachograph: TachographState,
    pub(crate) fuel: FuelState,
    pub(crate) cargo_tonnes: f64,
    pub(crate) odometer_m: f64,
    rng: AgentRng,
    pub(crate) last_watch: Option<WatchState>,
}

impl Truck {
    /// Place a new truck at `node` with a full tank.
    pub fn spawn(
        id:     AgentId,
        node:   NodeId,
        config: TruckConfig,
        seed:   u64,
        graph:  &dyn GraphView,
    ) -> TruckResult<Self> {
        config.validate()?;
        if !graph.contains_node(node) {
            return Err(TruckError::NodeNotFound(node));
        }
        Ok(Self {
            id,
            position: Position::AtNode(node),
            speed_kph: 0.0,
            route: Route::empty(),
            destination: None,
            next_destination: None,
            diversion: Diversion::None,
            tachograph: TachographState::new(config.initial_risk_factor, config.initial_balance),
            fuel: FuelState::new(config.tank_capacity_l),
            cargo_tonnes: 0.0,
            odometer_m: 0.0,
            rng: AgentRng::new(seed, id),
            last_watch: None,
            config,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &TruckConfig { &self.config }
    pub fn position(&self) -> Position { self.position }
    pub fn speed_kph(&self) -> f64 { self.speed_kph }
    pub fn route(&self) -> &Route { &self.route }
    pub fn destination(&self) -> Option<NodeId> { self.destination }
    pub fn diversion(&self) -> Diversion { self.diversion }
    pub fn tachograph(&self) -> &TachographState { &self.tachograph }
    pub fn tachograph_mut(&mut self) -> &mut TachographState { &mut self.tachograph }
    pub fn fuel(&self) -> &FuelState { &self.fuel }
    pub fn fuel_mut(&mut self) -> &mut FuelState { &mut self.fuel }
    pub fn cargo_tonnes(&self) -> f64 { self.cargo_tonnes }
    pub fn odometer_m(&self) -> f64 { self.odometer_m }

    // ── External commands ─────────────────────────────────────────────────

    /// Plan toward `node` the next time the truck needs a destination.
    pub fn set_destination(&mut self, node: NodeId) {
        self.next_destination = Some(node);
    }

    /// Replace the route.  It is checked edge by edge as the truck drives;
    /// a hop without a matching edge drops it.
    pub fn assign_route(&mut self, route: Route) {
        self.install_route(route);
    }

    pub fn load_cargo(&mut self, tonnes: f64) -> TruckResult<()> {
        if !(tonnes >= 0.0 && tonnes.is_finite()) {
            return Err(TruckError::InvalidCargo(tonnes));
        }
        self.cargo_tonnes += tonnes;
        Ok(())
    }

    /// Returns the tonnes unloaded.
    pub fn unload_cargo(&mut self) -> f64 {
        std::mem::take(&mut self.cargo_tonnes)
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Advance the truck by `dt_s` seconds.
    pub fn decide(&mut self, ctx: &mut TickContext<'_>, dt_s: f64) -> Vec<TruckEvent> {
        let mut events = Vec::new();
        if !(dt_s > 0.0 && dt_s.is_finite()) {
            return events;
        }

        match self.diversion {
            Diversion::Stranded => {
                self.speed_kph = 0.0;
                return events;
            }
            Diversion::Resting { facility } => {
                self.rest(ctx, facility, dt_s, &mut events);
                return events;
            }
            Diversion::WaitingForPump { facility } => {
                self.speed_kph = 0.0;
                if ctx.facilities.enter(facility, self.id).is_ok() {
                    self.start_fueling(facility, &mut events);
                }
                return events;
            }
            Diversion::Fueling { facility, liters } => {
                self.pump(ctx, facility, liters, dt_s, &mut events);
                return events;
            }
            Diversion::None
            | Diversion::SeekingParking { .. }
            | Diversion::SeekingGasStation { .. } => {}
        }

        if self.route.is_empty() {
            self.plan_route(ctx, &mut events);
        }
        // Parking first: the rest is mandatory, running dry is only likely.
        // A forced rest also cuts a fuel detour short.
        let forced_rest = self.diversion.is_seeking_gas_station()
            && self.tachograph.search_probability() >= 1.0;
        if (self.diversion.is_none() || forced_rest) && !self.route.is_empty() {
            self.check_parking(ctx, &mut events);
        }
        if self.diversion.is_none() && !self.route.is_empty() {
            self.check_fuel(ctx, &mut events);
        }
        if self.diversion.is_mobile() {
            self.advance(ctx, dt_s, &mut events);
        }
        events
    }

    // ── Routing ───────────────────────────────────────────────────────────

    /// Node from which new routes are planned: the current node, or the end
    /// of the edge being driven.
    fn anchor(&self, graph: &dyn GraphView) -> Option<NodeId> {
        match self.position {
            Position::AtNode(node) => Some(node),
            Position::OnEdge { edge, .. } => graph.edge(edge).map(|e| e.to),
        }
    }

    fn install_route(&mut self, route: Route) {
        let route = match self.position {
            Position::AtNode(node) => route.skip_origin(node),
            Position::OnEdge { .. } => route,
        };
        self.destination = route.route_end();
        self.route = route;
    }

    /// Plan toward the diversion's saved destination, a requested one, or a
    /// random node, in that order.  Installing a route ends any seek.
    fn plan_route(&mut self, ctx: &mut TickContext<'_>, events: &mut Vec<TruckEvent>) {
        let Some(from) = self.anchor(ctx.graph) else {
            return;
        };
        let target = self
            .tachograph
            .original_destination
            .take()
            .or_else(|| self.next_destination.take());
        let Some(target) = target.or_else(|| self.random_destination(ctx.graph, from)) else {
            return;
        };

        if self.position == Position::AtNode(target) {
            self.diversion = Diversion::None;
            self.destination = None;
            events.push(TruckEvent::ArrivedAtDestination { node: target });
            return;
        }

        let route = ctx.navigator.find_route(ctx.graph, from, target, self.config.max_speed_kph);
        if route.is_empty() {
            debug!("{}: no route from {from} to {target}", self.id);
            return;
        }
        debug!("{}: route to {target}, {} nodes, {:.0} s", self.id, route.len(), route.cost_s());
        events.push(TruckEvent::RouteInstalled {
            destination: target,
            nodes: route.len(),
            cost_s: route.cost_s(),
        });
        self.diversion = Diversion::None;
        self.install_route(route);
    }

    fn random_destination(&mut self, graph: &dyn GraphView, from: NodeId) -> Option<NodeId> {
        let n = u32::try_from(graph.node_count()).ok()?;
        if n < 2 {
            return None;
        }
        let pick = self.rng.gen_range(0..n);
        Some(NodeId(if pick == from.0 { (pick + 1) % n } else { pick }))
    }

    fn invalidate_route(&mut self, at: NodeId, events: &mut Vec<TruckEvent>) {
        warn!("{}: no drivable edge from {at} toward {:?}, dropping route", self.id, self.route.head());
        self.route.clear();
        self.speed_kph = 0.0;
        if matches!(
            self.diversion,
            Diversion::SeekingParking { .. } | Diversion::SeekingGasStation { .. }
        ) {
            // The saved destination stays, so the next plan resumes the trip.
            self.diversion = Diversion::None;
        }
        events.push(TruckEvent::RouteInvalidated { at });
    }

    /// Closest facility on the way to the saved destination, or simply the
    /// closest one when none keeps the destination reachable.
    fn search_facility(
        &self,
        ctx:      &mut TickContext<'_>,
        criteria: &dyn NodeCriteria,
    ) -> Option<(BuildingId, SearchHit)> {
        let from = self.anchor(ctx.graph)?;
        let speed = self.config.max_speed_kph;
        let mut hit = None;
        if let Some(dest) = self.tachograph.original_destination {
            hit = ctx.navigator.find_closest_node_on_route(ctx.graph, from, dest, criteria, speed);
        }
        if hit.is_none() {
            hit = ctx.navigator.find_closest_node(ctx.graph, from, criteria, speed);
        }
        let hit = hit?;
        let facility = hit.item.as_ref().and_then(CriteriaItem::building)?.id;
        Some((facility, hit))
    }

    // ── Movement ──────────────────────────────────────────────────────────

    fn advance(&mut self, ctx: &mut TickContext<'_>, dt_s: f64, events: &mut Vec<TruckEvent>) {
        let mut budget_s = dt_s;
        loop {
            match self.position {
                Position::AtNode(node) => {
                    let Some(head) = self.route.head() else {
                        self.speed_kph = 0.0;
                        return;
                    };
                    let max_kph = self.config.max_speed_kph;
                    let edge = ctx
                        .graph
                        .outgoing_edges(node)
                        .iter()
                        .find(|e| e.to == head && e.speed_mps(max_kph) > 0.0)
                        .copied();
                    let Some(edge) = edge else {
                        self.invalidate_route(node, events);
                        return;
                    };
                    self.position = Position::OnEdge { edge: edge.id, progress_m: 0.0 };
                    self.speed_kph = edge.max_speed_kph.min(max_kph);
                }
                Position::OnEdge { edge, progress_m } => {
                    if budget_s <= 0.0 {
                        return;
                    }
                    let Some(e) = ctx.graph.edge(edge).copied() else {
                        warn!("{}: on unknown {edge}, stopping", self.id);
                        self.route.clear();
                        self.speed_kph = 0.0;
                        return;
                    };
                    let speed_mps = e.speed_mps(self.config.max_speed_kph);
                    if speed_mps <= 0.0 {
                        self.route.clear();
                        self.speed_kph = 0.0;
                        return;
                    }

                    let remaining_m = (e.length_m - progress_m).max(0.0);
                    let planned_m = (speed_mps * budget_s).min(remaining_m);
                    let range_m = self.fuel.range_m(&self.config, self.cargo_tonnes);
                    let out_of_fuel = planned_m >= range_m;
                    let step_m = planned_m.min(range_m);
                    let step_s = step_m / speed_mps;
                    self.drive(step_m, step_s);
                    budget_s -= step_s;

                    let progress_m = progress_m + step_m;
                    if progress_m < e.length_m - ARRIVAL_EPS_M {
                        self.position = Position::OnEdge { edge, progress_m };
                        if out_of_fuel {
                            self.strand(events);
                        }
                        return;
                    }

                    self.position = Position::AtNode(e.to);
                    if self.route.head() == Some(e.to) {
                        self.route.pop_head();
                    }
                    if out_of_fuel {
                        self.strand(events);
                        return;
                    }
                    if self.arrive_at(ctx, e.to, events) {
                        self.speed_kph = 0.0;
                        return;
                    }
                }
            }
        }
    }

    fn drive(&mut self, distance_m: f64, secs: f64) {
        self.tachograph.driving_time_s += secs;
        self.fuel.burn(distance_m, &self.config, self.cargo_tonnes);
        self.odometer_m += distance_m;
    }

    fn strand(&mut self, events: &mut Vec<TruckEvent>) {
        warn!("{}: out of fuel at {:?}", self.id, self.position);
        self.fuel.current_fuel_l = 0.0;
        self.speed_kph = 0.0;
        self.diversion = Diversion::Stranded;
        events.push(TruckEvent::OutOfFuel { position: self.position });
    }

    /// Handle reaching `node`.  Returns `true` if the truck must stop there
    /// for the rest of the tick.
    fn arrive_at(
        &mut self,
        ctx:    &mut TickContext<'_>,
        node:   NodeId,
        events: &mut Vec<TruckEvent>,
    ) -> bool {
        match self.diversion {
            Diversion::SeekingParking { facility, node: target, attempts } if target == node => {
                self.try_park(ctx, facility, attempts, events)
            }
            Diversion::SeekingGasStation { facility, node: target } if target == node => {
                self.try_fuel(ctx, facility, events);
                true
            }
            Diversion::None if self.route.is_empty() && self.destination == Some(node) => {
                debug!("{}: arrived at {node}", self.id);
                self.destination = None;
                events.push(TruckEvent::ArrivedAtDestination { node });
                true
            }
            _ => false,
        }
    }

    fn arrive_if_there(
        &mut self,
        ctx:    &mut TickContext<'_>,
        node:   NodeId,
        events: &mut Vec<TruckEvent>,
    ) -> bool {
        self.position == Position::AtNode(node) && self.arrive_at(ctx, node, events)
    }

    // ── Parking and rest ──────────────────────────────────────────────────

    fn check_parking(&mut self, ctx: &mut TickContext<'_>, events: &mut Vec<TruckEvent>) {
        if self.tachograph.parking_search_suppressed() {
            return;
        }
        let p = self.tachograph.search_probability();
        if !self.roll(p) {
            return;
        }
        debug!(
            "{}: looking for parking after {:.2} h of driving",
            self.id,
            self.tachograph.driving_hours()
        );
        // A fuel detour already saved the trip's destination.
        if self.diversion.is_none() {
            self.tachograph.original_destination = self.destination;
        }
        self.find_parking(ctx, 0, events);
    }

    /// Target the best parking not yet tried.  `attempts` counts parkings
    /// already targeted in this diversion.
    fn find_parking(
        &mut self,
        ctx:      &mut TickContext<'_>,
        attempts: u32,
        events:   &mut Vec<TruckEvent>,
    ) -> bool {
        let criteria = facility_criteria(
            BuildingKind::Parking,
            self.tachograph.tried_parkings.iter().copied(),
        );
        let Some((facility, hit)) = self.search_facility(ctx, &criteria) else {
            self.give_up_parking(ctx, attempts, events);
            return false;
        };
        let node = hit.node;
        let attempt = attempts + 1;
        debug!("{}: heading for parking {facility} at {node} (attempt {attempt})", self.id);
        events.push(TruckEvent::ParkingSearchStarted { facility, node, attempt });
        self.diversion = Diversion::SeekingParking { facility, node, attempts: attempt };
        self.install_route(hit.route);
        self.arrive_if_there(ctx, node, events)
    }

    fn try_park(
        &mut self,
        ctx:      &mut TickContext<'_>,
        facility: BuildingId,
        attempts: u32,
        events:   &mut Vec<TruckEvent>,
    ) -> bool {
        match ctx.facilities.enter(facility, self.id) {
            Ok(()) => {
                self.begin_rest(facility, events);
                true
            }
            Err(err) => {
                debug!("{}: {err}", self.id);
                events.push(TruckEvent::ParkingFull { facility });
                self.tachograph.tried_parkings.insert(facility);
                if attempts >= self.config.max_parking_attempts {
                    self.give_up_parking(ctx, attempts, events);
                    false
                } else {
                    self.find_parking(ctx, attempts, events)
                }
            }
        }
    }

    /// Drive on without resting.  New searches wait for the backoff.  A truck
    /// already past the limit is penalised here, once per driving window.
    fn give_up_parking(
        &mut self,
        ctx:      &mut TickContext<'_>,
        attempts: u32,
        events:   &mut Vec<TruckEvent>,
    ) {
        warn!("{}: no parking available after {attempts} attempt(s), driving on", self.id);
        events.push(TruckEvent::ParkingGivenUp { attempts });
        self.penalise_overtime(events);
        self.tachograph.suppress_parking_search(self.config.parking_backoff_s);
        self.diversion = Diversion::None;
        self.route.clear();
        self.plan_route(ctx, events);
    }

    fn begin_rest(&mut self, facility: BuildingId, events: &mut Vec<TruckEvent>) {
        self.route.clear();
        self.speed_kph = 0.0;
        self.penalise_overtime(events);

        let required_rest_s = self.tachograph.start_rest();
        debug!("{}: resting at {facility} for {required_rest_s:.0} s", self.id);
        events.push(TruckEvent::RestStarted { facility, required_rest_s });
        self.diversion = Diversion::Resting { facility };
    }

    /// Tiered deduction for driving past the limit.  At most once until the
    /// next completed rest.
    fn penalise_overtime(&mut self, events: &mut Vec<TruckEvent>) {
        let overtime_s = self.tachograph.overtime_s();
        if overtime_s <= 0.0 || self.tachograph.penalised {
            return;
        }
        let amount = penalty_for(overtime_s, self.config.penalty_tiers);
        let adjust = self.risk_adjustment();
        self.tachograph.apply_penalty(amount, adjust);
        info!("{}: {overtime_s:.0} s over the driving limit, penalty {amount:.0}", self.id);
        events.push(TruckEvent::PenaltyApplied { amount, overtime_s });
    }

    fn rest(
        &mut self,
        ctx:      &mut TickContext<'_>,
        facility: BuildingId,
        dt_s:     f64,
        events:   &mut Vec<TruckEvent>,
    ) {
        self.speed_kph = 0.0;
        if !self.tachograph.accumulate_rest(dt_s) {
            return;
        }
        let rested_s = self.tachograph.resting_time_s;
        let adjust = self.risk_adjustment();
        self.tachograph.complete_rest(adjust);
        ctx.facilities.leave(facility, self.id);
        info!("{}: rest at {facility} complete after {rested_s:.0} s", self.id);
        events.push(TruckEvent::RestCompleted { facility, rested_s });
        self.diversion = Diversion::None;
        self.plan_route(ctx, events);
    }

    // ── Fuel ──────────────────────────────────────────────────────────────

    fn check_fuel(&mut self, ctx: &mut TickContext<'_>, events: &mut Vec<TruckEvent>) {
        let p = self.fuel.search_probability(self.tachograph.risk_factor);
        if !self.roll(p) {
            return;
        }
        self.tachograph.original_destination = self.destination;
        let criteria = facility_criteria(BuildingKind::GasStation, std::iter::empty());
        let Some((facility, hit)) = self.search_facility(ctx, &criteria) else {
            debug!("{}: low on fuel, no reachable gas station", self.id);
            self.tachograph.original_destination = None;
            return;
        };
        let node = hit.node;
        debug!("{}: heading for gas station {facility} at {node}", self.id);
        events.push(TruckEvent::FuelSearchStarted { facility, node });
        self.diversion = Diversion::SeekingGasStation { facility, node };
        self.install_route(hit.route);
        self.arrive_if_there(ctx, node, events);
    }

    fn try_fuel(
        &mut self,
        ctx:      &mut TickContext<'_>,
        facility: BuildingId,
        events:   &mut Vec<TruckEvent>,
    ) {
        match ctx.facilities.enter(facility, self.id) {
            Ok(()) => self.start_fueling(facility, events),
            Err(FacilityError::Full { .. }) => {
                debug!("{}: gas station {facility} full, waiting", self.id);
                events.push(TruckEvent::GasStationFull { facility });
                self.route.clear();
                self.diversion = Diversion::WaitingForPump { facility };
            }
            Err(err) => {
                warn!("{}: {err}, abandoning fuel stop", self.id);
                self.diversion = Diversion::None;
                self.route.clear();
                self.plan_route(ctx, events);
            }
        }
    }

    fn start_fueling(&mut self, facility: BuildingId, events: &mut Vec<TruckEvent>) {
        self.route.clear();
        self.speed_kph = 0.0;
        let liters = self.fuel.begin_fueling();
        events.push(TruckEvent::FuelingStarted { facility, liters_needed: liters });
        self.diversion = Diversion::Fueling { facility, liters };
    }

    fn pump(
        &mut self,
        ctx:      &mut TickContext<'_>,
        facility: BuildingId,
        liters:   f64,
        dt_s:     f64,
        events:   &mut Vec<TruckEvent>,
    ) {
        self.speed_kph = 0.0;
        self.fuel.pump(self.config.pump_rate_l_per_s * dt_s);
        if self.fuel.fueling_liters_needed > 0.0 {
            return;
        }

        let factor = ctx.facilities.get(facility).map_or(1.0, |f| f.cost_factor);
        let cost = liters * ctx.fuel_price_per_l * factor;
        self.tachograph.balance -= cost;
        if let Some(station) = ctx.facilities.get_mut(facility) {
            station.credit(cost);
        }
        ctx.facilities.leave(facility, self.id);
        info!("{}: fueled {liters:.1} L at {facility} for {cost:.2}", self.id);
        events.push(TruckEvent::FuelingCompleted { facility, liters, cost });
        self.diversion = Diversion::None;
        self.plan_route(ctx, events);
    }

    // ── Randomness ────────────────────────────────────────────────────────

    fn roll(&mut self, p: f64) -> bool {
        p >= 1.0 || (p > 0.0 && self.rng.gen_bool(p))
    }

    fn risk_adjustment(&mut self) -> f64 {
        let (lo, hi) = (self.config.risk_adjust_min, self.config.risk_adjust_max);
        if hi > lo { self.rng.gen_range(lo..=hi) } else { lo }
    }
}

/// Facilities of `kind` the truck can also drive away from.
fn facility_criteria(
    kind:     BuildingKind,
    excluded: impl IntoIterator<Item = BuildingId>,
) -> AndCriteria {
    AndCriteria::default()
        .with(BuildingTypeCriteria::excluding(kind, excluded))
        .with(EdgeCountCriteria::at_least(EdgeDirection::Outgoing, 1))
}
