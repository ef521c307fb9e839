//! Frontier and Dijkstra internals shared by the navigator's searches.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use haul_core::NodeId;

use crate::graph::GraphView;

// ── Frontier ──────────────────────────────────────────────────────────────────

/// Heap entry ordered by ascending `priority`, then by insertion order.
///
/// The insertion counter makes pop order independent of node numbering, so
/// equal-cost alternatives always resolve the same way.
#[derive(Copy, Clone, Debug)]
pub(crate) struct QueueEntry {
    pub priority: f64,
    pub seq: u64,
    pub node: NodeId,
    /// Path cost when pushed; an entry whose cost exceeds the node's best
    /// known cost is stale.
    pub cost: f64,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: invert both keys.
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

#[derive(Default)]
pub(crate) struct Frontier {
    heap: BinaryHeap<QueueEntry>,
    next_seq: u64,
}

impl Frontier {
    pub fn push(&mut self, node: NodeId, cost: f64, priority: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(QueueEntry { priority, seq, node, cost });
    }

    pub fn pop(&mut self) -> Option<QueueEntry> {
        self.heap.pop()
    }
}

/// Walk `parent` pointers back from `goal` and return the path in travel
/// order.  `parent[source]` must be `NodeId::INVALID`.
pub(crate) fn reconstruct(parent: &[NodeId], goal: NodeId) -> Vec<NodeId> {
    let mut path = vec![goal];
    let mut cur = goal;
    while let Some(&p) = parent.get(cur.index()) {
        if !p.is_valid() || path.len() > parent.len() {
            break;
        }
        path.push(p);
        cur = p;
    }
    path.reverse();
    path
}

// ── Dijkstra ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    /// Follow outgoing edges: costs are source → node.
    Forward,
    /// Follow incoming edges: costs are node → source.
    Reverse,
}

/// Incremental single-source Dijkstra.  Each `next()` settles one node in
/// non-decreasing cost order and relaxes its edges.
pub(crate) struct Dijkstra<'g> {
    graph: &'g dyn GraphView,
    direction: Direction,
    max_speed_kph: f64,
    dist: Vec<f64>,
    parent: Vec<NodeId>,
    settled: Vec<bool>,
    frontier: Frontier,
}

impl<'g> Dijkstra<'g> {
    pub fn new(
        graph:         &'g dyn GraphView,
        source:        NodeId,
        direction:     Direction,
        max_speed_kph: f64,
    ) -> Self {
        let n = graph.node_count();
        let mut search = Self {
            graph,
            direction,
            max_speed_kph,
            dist: vec![f64::INFINITY; n],
            parent: vec![NodeId::INVALID; n],
            settled: vec![false; n],
            frontier: Frontier::default(),
        };
        if graph.contains_node(source) {
            search.dist[source.index()] = 0.0;
            search.frontier.push(source, 0.0, 0.0);
        }
        search
    }

    /// Best known cost to `node` (final once settled).
    #[inline]
    pub fn cost(&self, node: NodeId) -> f64 {
        self.dist.get(node.index()).copied().unwrap_or(f64::INFINITY)
    }

    /// Path from the source to a settled `node`, in travel order.  Only
    /// meaningful for [`Direction::Forward`].
    pub fn path_to(&self, node: NodeId) -> Vec<NodeId> {
        reconstruct(&self.parent, node)
    }

    /// Run to exhaustion and return the cost array.
    pub fn into_costs(mut self) -> Vec<f64> {
        while self.next().is_some() {}
        self.dist
    }

    fn relax(&mut self, node: NodeId, cost: f64) {
        let graph = self.graph;
        let edges = match self.direction {
            Direction::Forward => graph.outgoing_edges(node),
            Direction::Reverse => graph.incoming_edges(node),
        };
        for edge in edges {
            let neighbor = match self.direction {
                Direction::Forward => edge.to,
                Direction::Reverse => edge.from,
            };
            if !graph.contains_node(neighbor) {
                continue;
            }
            let Some(step) = edge.travel_secs(self.max_speed_kph) else {
                continue;
            };
            let new_cost = cost + step;
            if new_cost < self.dist[neighbor.index()] {
                self.dist[neighbor.index()] = new_cost;
                self.parent[neighbor.index()] = node;
                self.frontier.push(neighbor, new_cost, new_cost);
            }
        }
    }
}

impl Iterator for Dijkstra<'_> {
    type Item = (NodeId, f64);

    fn next(&mut self) -> Option<(NodeId, f64)> {
        while let Some(entry) = self.frontier.pop() {
            let i = entry.node.index();
            if self.settled[i] || entry.cost > self.dist[i] {
                continue;
            }
            self.settled[i] = true;
            self.relax(entry.node, entry.cost);
            return Some((entry.node, entry.cost));
        }
        None
    }
}
