//! Road network representation and builder.
//!
//! # Data layout
//!
//! Edges are stored twice in **Compressed Sparse Row (CSR)** form: once
//! sorted by source node (outgoing adjacency, which also defines `EdgeId`
//! order) and once sorted by destination node (incoming adjacency, used by
//! the reverse Dijkstra of the waypoint search).  For a `NodeId n` the
//! outgoing edges occupy
//!
//! ```text
//! out_edges[ out_start[n] .. out_start[n+1] ]
//! ```
//!
//! and likewise for `in_edges`/`in_start`.  Both are contiguous slices, so
//! [`GraphView`] can hand out `&[Edge]` without allocating.
//!
//! Buildings use the same scheme, grouped by node.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps a planar point to the nearest `NodeId`.  Used
//! to snap spawn coordinates to road nodes.

use log::debug;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use haul_core::{BuildingId, EdgeId, NodeId, Point};

use crate::graph::{Building, BuildingKind, Edge, GraphView};
use crate::{SpatialError, SpatialResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Directed road graph in CSR format plus buildings and a spatial index.
///
/// Construct with [`RoadNetworkBuilder`].
pub struct RoadNetwork {
    /// Planar position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<Point>,

    out_start: Vec<u32>,
    /// Sorted by source; position in this vector is the `EdgeId`.
    out_edges: Vec<Edge>,

    in_start: Vec<u32>,
    in_edges: Vec<Edge>,

    building_start: Vec<u32>,
    /// Sorted by node.
    buildings: Vec<Building>,
    /// `BuildingId` → position in `buildings`.
    building_slot: Vec<u32>,

    spatial_idx: RTree<NodeEntry>,

    /// See [`GraphView::heuristic_scale`].
    heuristic_scale: f64,
}

impl RoadNetwork {
    pub fn empty() -> Self {
        RoadNetworkBuilder::new().build()
    }

    pub fn edge_count(&self) -> usize {
        self.out_edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    /// All nodes, in ID order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.node_pos.len()).map(|i| NodeId(i as u32))
    }

    pub fn edges(&self) -> &[Edge] {
        &self.out_edges
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    /// Every building of the given kind, grouped by node.
    pub fn buildings_of_kind(&self, kind: BuildingKind) -> impl Iterator<Item = &Building> + '_ {
        self.buildings.iter().filter(move |b| b.kind == kind)
    }

    /// Nearest road node to `pos`.  `None` only for an empty network.
    pub fn snap_to_node(&self, pos: Point) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.x, pos.y])
            .map(|e| e.id)
    }

    #[inline]
    fn csr_slice<'a, T>(starts: &[u32], items: &'a [T], node: NodeId) -> &'a [T] {
        let i = node.index();
        if i + 1 >= starts.len() {
            return &[];
        }
        &items[starts[i] as usize..starts[i + 1] as usize]
    }
}

impl GraphView for RoadNetwork {
    fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    fn outgoing_edges(&self, node: NodeId) -> &[Edge] {
        Self::csr_slice(&self.out_start, &self.out_edges, node)
    }

    fn incoming_edges(&self, node: NodeId) -> &[Edge] {
        Self::csr_slice(&self.in_start, &self.in_edges, node)
    }

    fn edge(&self, edge: EdgeId) -> Option<&Edge> {
        self.out_edges.get(edge.index())
    }

    fn node_position(&self, node: NodeId) -> Option<Point> {
        self.node_pos.get(node.index()).copied()
    }

    fn node_buildings(&self, node: NodeId) -> &[Building] {
        Self::csr_slice(&self.building_start, &self.buildings, node)
    }

    fn building(&self, building: BuildingId) -> Option<&Building> {
        let slot = *self.building_slot.get(building.index())?;
        self.buildings.get(slot as usize)
    }

    fn heuristic_scale(&self) -> f64 {
        self.heuristic_scale
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// Edges and buildings must reference nodes that were already added.
///
/// # Example
///
/// ```
/// use haul_core::Point;
/// use haul_spatial::{BuildingKind, GraphView, RoadNetworkBuilder};
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node(Point::new(0.0, 0.0));
/// let c = b.add_node(Point::new(1_000.0, 0.0));
/// b.add_road(a, c, 1_000.0, 50.0).unwrap();
/// b.add_building(c, BuildingKind::Parking).unwrap();
/// let net = b.build();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 2); // bidirectional
/// ```
pub struct RoadNetworkBuilder {
    nodes:     Vec<Point>,
    raw_edges: Vec<RawEdge>,
    buildings: Vec<Building>,
}

struct RawEdge {
    from:          NodeId,
    to:            NodeId,
    length_m:      f64,
    max_speed_kph: f64,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), raw_edges: Vec::new(), buildings: Vec::new() }
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:     Vec::with_capacity(nodes),
            raw_edges: Vec::with_capacity(edges),
            buildings: Vec::new(),
        }
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: Point) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        id
    }

    fn check_node(&self, node: NodeId) -> SpatialResult<()> {
        if node.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(SpatialError::NodeNotFound(node))
        }
    }

    /// Add a **directed** edge.  A non-positive speed limit is accepted and
    /// makes the edge impassable for routing.
    pub fn add_directed_edge(
        &mut self,
        from:          NodeId,
        to:            NodeId,
        length_m:      f64,
        max_speed_kph: f64,
    ) -> SpatialResult<()> {
        self.check_node(from)?;
        self.check_node(to)?;
        if !(length_m.is_finite() && length_m >= 0.0) {
            return Err(SpatialError::InvalidLength { from, to, length_m });
        }
        self.raw_edges.push(RawEdge { from, to, length_m, max_speed_kph });
        Ok(())
    }

    /// Add edges in both directions for an undirected road segment.
    pub fn add_road(
        &mut self,
        a:             NodeId,
        b:             NodeId,
        length_m:      f64,
        max_speed_kph: f64,
    ) -> SpatialResult<()> {
        self.add_directed_edge(a, b, length_m, max_speed_kph)?;
        self.add_directed_edge(b, a, length_m, max_speed_kph)
    }

    /// Attach a building to `node` and return its `BuildingId` (sequential
    /// from 0).
    pub fn add_building(&mut self, node: NodeId, kind: BuildingKind) -> SpatialResult<BuildingId> {
        self.check_node(node)?;
        let id = BuildingId(self.buildings.len() as u32);
        self.buildings.push(Building { id, kind, node });
        Ok(id)
    }

    pub fn node_pos(&self, id: NodeId) -> Option<Point> {
        self.nodes.get(id.index()).copied()
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadNetwork`].
    ///
    /// O(E log E) for the two edge sorts plus O(N log N) for the R-tree bulk
    /// load.  Sorts are stable so edges leaving the same node keep insertion
    /// order, which keeps `EdgeId`s and search tie-breaking reproducible.
    pub fn build(self) -> RoadNetwork {
        let node_count = self.nodes.len();

        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let out_edges: Vec<Edge> = raw
            .iter()
            .enumerate()
            .map(|(i, e)| Edge {
                id:            EdgeId(i as u32),
                from:          e.from,
                to:            e.to,
                length_m:      e.length_m,
                max_speed_kph: e.max_speed_kph,
            })
            .collect();
        let out_start = row_pointers(node_count, out_edges.iter().map(|e| e.from));

        // Edges drawn shorter than the straight line would make the
        // distance heuristic overestimate.
        let heuristic_scale = out_edges
            .iter()
            .filter_map(|e| {
                let d = self.nodes[e.from.index()].distance_m(self.nodes[e.to.index()]);
                (d > 0.0).then(|| e.length_m / d)
            })
            .fold(1.0_f64, f64::min)
            .max(0.0);
        if heuristic_scale < 1.0 {
            debug!("edges shorter than their endpoints' distance, heuristic scaled by {heuristic_scale:.3}");
        }

        let mut in_edges = out_edges.clone();
        in_edges.sort_by_key(|e| e.to.0);
        let in_start = row_pointers(node_count, in_edges.iter().map(|e| e.to));

        let mut buildings = self.buildings;
        let building_count = buildings.len();
        buildings.sort_by_key(|b| b.node.0);
        let building_start = row_pointers(node_count, buildings.iter().map(|b| b.node));
        let mut building_slot = vec![u32::MAX; building_count];
        for (slot, b) in buildings.iter().enumerate() {
            building_slot[b.id.index()] = slot as u32;
        }

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, p)| NodeEntry { point: [p.x, p.y], id: NodeId(i as u32) })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        debug!(
            "built road network: {} nodes, {} edges, {} buildings",
            node_count,
            out_edges.len(),
            building_count
        );

        RoadNetwork {
            node_pos: self.nodes,
            out_start,
            out_edges,
            in_start,
            in_edges,
            building_start,
            buildings,
            building_slot,
            spatial_idx,
            heuristic_scale,
        }
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// CSR row pointer for items already sorted by `key`.
fn row_pointers(node_count: usize, keys: impl Iterator<Item = NodeId>) -> Vec<u32> {
    let mut starts = vec![0u32; node_count + 1];
    for k in keys {
        starts[k.index() + 1] += 1;
    }
    for i in 1..=node_count {
        starts[i] += starts[i - 1];
    }
    starts
}
