//! Node-sequence routes consumed head-first by agents.

use std::collections::VecDeque;

use haul_core::NodeId;

/// An ordered path of nodes plus the endpoints it was planned between.
///
/// `route_start`/`route_end` are fixed at construction and survive every
/// [`pop_head`](Self::pop_head), so reports can still say where a partially
/// driven route came from and where it leads.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    nodes: VecDeque<NodeId>,
    route_start: Option<NodeId>,
    route_end: Option<NodeId>,
    cost_s: f64,
}

impl Route {
    /// Build a route from `nodes` in travel order with total time-cost
    /// `cost_s`.
    pub fn new(nodes: Vec<NodeId>, cost_s: f64) -> Self {
        Self {
            route_start: nodes.first().copied(),
            route_end: nodes.last().copied(),
            nodes: nodes.into(),
            cost_s,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Next node to drive to.
    #[inline]
    pub fn head(&self) -> Option<NodeId> {
        self.nodes.front().copied()
    }

    pub fn pop_head(&mut self) -> Option<NodeId> {
        self.nodes.pop_front()
    }

    /// Drop the head if it is `node`.  Used when installing a freshly planned
    /// route whose first node is where the agent already stands.
    pub fn skip_origin(mut self, node: NodeId) -> Self {
        if self.head() == Some(node) {
            self.nodes.pop_front();
        }
        self
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<NodeId> {
        self.nodes.iter().copied().collect()
    }

    pub fn route_start(&self) -> Option<NodeId> {
        self.route_start
    }

    pub fn route_end(&self) -> Option<NodeId> {
        self.route_end
    }

    /// Planned travel time of the whole route in seconds.
    pub fn cost_s(&self) -> f64 {
        self.cost_s
    }
}
