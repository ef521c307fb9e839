//! The read-only graph view consumed by the search engine and the trucks.

use haul_core::{BuildingId, EdgeId, NodeId, Point};

// ── Edge ──────────────────────────────────────────────────────────────────────

/// A directed road segment.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub length_m: f64,
    pub max_speed_kph: f64,
}

impl Edge {
    /// Speed actually driven on this edge by an agent capped at
    /// `agent_max_kph`, in metres per second.
    #[inline]
    pub fn speed_mps(&self, agent_max_kph: f64) -> f64 {
        self.max_speed_kph.min(agent_max_kph) / 3.6
    }

    /// Seconds needed to traverse the edge, or `None` if it cannot be driven
    /// (zero or negative effective speed).
    #[inline]
    pub fn travel_secs(&self, agent_max_kph: f64) -> Option<f64> {
        let mps = self.speed_mps(agent_max_kph);
        (mps > 0.0 && mps.is_finite()).then(|| self.length_m / mps)
    }
}

// ── Buildings ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BuildingKind {
    Parking,
    GasStation,
    Depot,
}

impl BuildingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildingKind::Parking    => "parking",
            BuildingKind::GasStation => "gas_station",
            BuildingKind::Depot      => "depot",
        }
    }
}

impl std::fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A building attached to a road node.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Building {
    pub id: BuildingId,
    pub kind: BuildingKind,
    pub node: NodeId,
}

// ── GraphView ─────────────────────────────────────────────────────────────────

/// Read-only adjacency, geometry, and building lookup.
///
/// Unknown nodes yield empty slices or `None`; implementations must never
/// panic on an ID they do not contain.  The trait is object safe so criteria
/// and trucks can work against `&dyn GraphView`.
pub trait GraphView {
    fn node_count(&self) -> usize;

    #[inline]
    fn contains_node(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    fn outgoing_edges(&self, node: NodeId) -> &[Edge];

    fn incoming_edges(&self, node: NodeId) -> &[Edge];

    fn edge(&self, edge: EdgeId) -> Option<&Edge>;

    fn node_position(&self, node: NodeId) -> Option<Point>;

    fn node_buildings(&self, node: NodeId) -> &[Building];

    fn building(&self, building: BuildingId) -> Option<&Building>;

    /// Largest `k ≤ 1` such that every edge is at least `k` times as long as
    /// the straight line between its endpoints.  A* scales its heuristic by
    /// it; the default of `0.0` makes A* behave like Dijkstra.
    fn heuristic_scale(&self) -> f64 {
        0.0
    }
}
