//! The search engine: point-to-point A*, closest-match Dijkstra, and the
//! detour-minimizing waypoint search.
//!
//! # Cost units
//!
//! Every cost is a travel time in **seconds**: an edge costs
//! `length_m / (min(edge.max_speed_kph, agent_max_speed_kph) / 3.6)`.  Edges
//! whose effective speed is not positive are skipped.
//!
//! # Failure
//!
//! "No path" is a normal outcome: [`Navigator::find_route`] returns an empty
//! [`Route`], the closest-match searches return `None`.

use log::trace;

use haul_core::NodeId;

use crate::cache::{CacheEntry, CachedSearch, SearchCache, SearchKey};
use crate::criteria::{CriteriaItem, NodeCriteria};
use crate::graph::GraphView;
use crate::route::Route;
use crate::search::{reconstruct, Dijkstra, Direction, Frontier};

/// A matching node together with how to get there.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub node: NodeId,
    pub item: Option<CriteriaItem>,
    /// Path from the search start to `node`.
    pub route: Route,
    /// Cost of `route`.
    pub cost_s: f64,
    /// Cost of the whole trip the search optimised: equal to `cost_s` for
    /// single-leg searches, `start → node → destination` for the waypoint
    /// search.
    pub total_cost_s: f64,
}

/// Owns the search cache and runs all searches against a borrowed
/// [`GraphView`].
///
/// The navigator never mutates the graph.  Only
/// [`find_closest_node`](Self::find_closest_node) touches the cache, so the
/// other two searches take `&self`.
#[derive(Debug)]
pub struct Navigator {
    cache: SearchCache,
    caching: bool,
}

impl Navigator {
    pub fn new() -> Self {
        Self { cache: SearchCache::new(), caching: true }
    }

    pub fn without_cache() -> Self {
        Self { cache: SearchCache::new(), caching: false }
    }

    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    /// Drop every memoized search.  Call after mutating the graph.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    // ── A* ────────────────────────────────────────────────────────────────

    /// Fastest route from `start` to `goal` for an agent capped at
    /// `max_speed_kph`.
    ///
    /// The heuristic is the straight-line distance driven at the agent's top
    /// speed, scaled by [`GraphView::heuristic_scale`] so it never
    /// overestimates even on maps with edges drawn shorter than the straight
    /// line.  Nodes are reopened when a cheaper path turns up.
    pub fn find_route(
        &self,
        graph:         &dyn GraphView,
        start:         NodeId,
        goal:          NodeId,
        max_speed_kph: f64,
    ) -> Route {
        if !graph.contains_node(start) || !graph.contains_node(goal) {
            return Route::empty();
        }
        if start == goal {
            return Route::new(vec![start], 0.0);
        }
        let top_mps = max_speed_kph / 3.6;
        if !(top_mps > 0.0 && top_mps.is_finite()) {
            return Route::empty();
        }

        let goal_pos = graph.node_position(goal);
        let scale = graph.heuristic_scale().clamp(0.0, 1.0);
        let heuristic = |node: NodeId| -> f64 {
            match (graph.node_position(node), goal_pos) {
                (Some(p), Some(g)) => scale * p.distance_m(g) / top_mps,
                _ => 0.0,
            }
        };

        let n = graph.node_count();
        let mut g = vec![f64::INFINITY; n];
        let mut parent = vec![NodeId::INVALID; n];
        let mut frontier = Frontier::default();

        g[start.index()] = 0.0;
        frontier.push(start, 0.0, heuristic(start));

        while let Some(entry) = frontier.pop() {
            let node = entry.node;
            if entry.cost > g[node.index()] {
                continue;
            }
            if node == goal {
                let path = reconstruct(&parent, goal);
                trace!("A* {start} -> {goal}: {} nodes, {:.1} s", path.len(), entry.cost);
                return Route::new(path, entry.cost);
            }
            for edge in graph.outgoing_edges(node) {
                if !graph.contains_node(edge.to) {
                    continue;
                }
                let Some(step) = edge.travel_secs(max_speed_kph) else {
                    continue;
                };
                let tentative = entry.cost + step;
                if tentative < g[edge.to.index()] {
                    g[edge.to.index()] = tentative;
                    parent[edge.to.index()] = node;
                    frontier.push(edge.to, tentative, tentative + heuristic(edge.to));
                }
            }
        }

        trace!("A* {start} -> {goal}: unreachable");
        Route::empty()
    }

    // ── Closest match ─────────────────────────────────────────────────────

    /// Cheapest node reachable from `start` that satisfies `criteria`.
    ///
    /// A single forward Dijkstra stops at the first settled match; settle
    /// order is non-decreasing in cost, so that match is the cheapest one.
    pub fn find_closest_node(
        &mut self,
        graph:         &dyn GraphView,
        start:         NodeId,
        criteria:      &dyn NodeCriteria,
        max_speed_kph: f64,
    ) -> Option<SearchHit> {
        let key = SearchKey::new(criteria.cache_key(), start, max_speed_kph);

        if self.caching {
            if let Some(cached) = self.cache.get(&key) {
                let replay = cached.entries.iter().find_map(|entry| {
                    let (ok, item) = criteria.matches(entry.node, graph);
                    ok.then(|| SearchHit {
                        node: entry.node,
                        item,
                        route: entry.route.clone(),
                        cost_s: entry.cost_s,
                        total_cost_s: entry.cost_s,
                    })
                });
                if replay.is_some() || cached.exhausted {
                    self.cache.record_hit();
                    return replay;
                }
            }
            self.cache.record_miss();
        }

        let mut search = Dijkstra::new(graph, start, Direction::Forward, max_speed_kph);
        let mut entries = Vec::new();
        let mut found = None;

        while let Some((node, cost)) = search.next() {
            let (ok, item) = criteria.matches(node, graph);
            let record = ok || (self.caching && criteria.matches_ignoring_exclusions(node, graph));
            if !record {
                continue;
            }
            let route = Route::new(search.path_to(node), cost);
            if ok {
                found = Some(SearchHit {
                    node,
                    item: item.clone(),
                    route: route.clone(),
                    cost_s: cost,
                    total_cost_s: cost,
                });
            }
            if self.caching {
                entries.push(CacheEntry { node, item, route, cost_s: cost });
            }
            if found.is_some() {
                break;
            }
        }

        if self.caching {
            let exhausted = found.is_none();
            self.cache.insert(key, CachedSearch { entries, exhausted });
        }
        found
    }

    // ── Waypoint-aware ────────────────────────────────────────────────────

    /// Matching node `b` minimising `cost(start → b) + cost(b → destination)`.
    ///
    /// Phase A runs Dijkstra over reversed edges from `destination` to learn
    /// every node's remaining cost.  Phase B runs forward Dijkstra from
    /// `start` and keeps the best two-leg total among matches with a finite
    /// remaining cost.  Once the settled cost alone reaches the best total no
    /// later node can do better, so the search stops there.
    ///
    /// The returned route covers the first leg only.
    pub fn find_closest_node_on_route(
        &self,
        graph:         &dyn GraphView,
        start:         NodeId,
        destination:   NodeId,
        criteria:      &dyn NodeCriteria,
        max_speed_kph: f64,
    ) -> Option<SearchHit> {
        if !graph.contains_node(start) || !graph.contains_node(destination) {
            return None;
        }

        let to_destination =
            Dijkstra::new(graph, destination, Direction::Reverse, max_speed_kph).into_costs();

        let mut forward = Dijkstra::new(graph, start, Direction::Forward, max_speed_kph);
        let mut best: Option<(NodeId, Option<CriteriaItem>, f64, f64)> = None;

        while let Some((node, cost)) = forward.next() {
            if best.as_ref().is_some_and(|b| cost >= b.3) {
                break;
            }
            let remaining = to_destination[node.index()];
            if !remaining.is_finite() {
                continue;
            }
            let (ok, item) = criteria.matches(node, graph);
            if !ok {
                continue;
            }
            let total = cost + remaining;
            if best.as_ref().is_none_or(|b| total < b.3) {
                best = Some((node, item, cost, total));
            }
        }

        best.map(|(node, item, cost, total)| SearchHit {
            node,
            item,
            route: Route::new(forward.path_to(node), cost),
            cost_s: cost,
            total_cost_s: total,
        })
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}
