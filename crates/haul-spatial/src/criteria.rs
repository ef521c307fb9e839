//! Node predicates used by the closest-match searches.
//!
//! A criteria answers two questions about a node: does it match, and if so
//! what did it find there (a building, an edge count, or the combined
//! results of sub-criteria).  Criteria are pure; the same node and graph
//! always give the same answer.
//!
//! [`NodeCriteria::cache_key`] identifies the criteria's *configuration* for
//! the [`SearchCache`][crate::SearchCache].  Dynamic exclusion sets (for
//! example parkings a truck already found full) are deliberately left out of
//! the key; [`NodeCriteria::matches_ignoring_exclusions`] lets the cache
//! record matches that hold regardless of them.

use rustc_hash::FxHashSet;

use haul_core::{BuildingId, NodeId};

use crate::graph::{Building, BuildingKind, GraphView};

/// What a criteria found at a matching node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CriteriaItem {
    Building(Building),
    EdgeCount(usize),
    /// One slot per sub-criteria, in declaration order.  Slots of
    /// sub-criteria that were not evaluated, or did not match, are `None`.
    Composite(Vec<Option<CriteriaItem>>),
}

impl CriteriaItem {
    /// First building found anywhere in this item, depth first.
    pub fn building(&self) -> Option<&Building> {
        match self {
            CriteriaItem::Building(b) => Some(b),
            CriteriaItem::EdgeCount(_) => None,
            CriteriaItem::Composite(parts) => {
                parts.iter().flatten().find_map(CriteriaItem::building)
            }
        }
    }
}

/// Predicate over a graph node.
pub trait NodeCriteria {
    fn matches(&self, node: NodeId, graph: &dyn GraphView) -> (bool, Option<CriteriaItem>);

    /// Like [`matches`](Self::matches) with every dynamic exclusion lifted.
    /// Must be `true` whenever `matches` is.
    fn matches_ignoring_exclusions(&self, node: NodeId, graph: &dyn GraphView) -> bool {
        self.matches(node, graph).0
    }

    /// Total function of the static configuration.
    fn cache_key(&self) -> String;
}

// ── Building type ─────────────────────────────────────────────────────────────

/// Matches nodes carrying a building of `kind` that is not in the exclusion
/// set.  The first such building (in map order) becomes the item.
#[derive(Debug, Clone)]
pub struct BuildingTypeCriteria {
    kind: BuildingKind,
    excluded: FxHashSet<BuildingId>,
}

impl BuildingTypeCriteria {
    pub fn new(kind: BuildingKind) -> Self {
        Self { kind, excluded: FxHashSet::default() }
    }

    pub fn excluding(kind: BuildingKind, excluded: impl IntoIterator<Item = BuildingId>) -> Self {
        Self { kind, excluded: excluded.into_iter().collect() }
    }

    pub fn exclude(&mut self, building: BuildingId) {
        self.excluded.insert(building);
    }

    pub fn kind(&self) -> BuildingKind {
        self.kind
    }

    pub fn excluded(&self) -> &FxHashSet<BuildingId> {
        &self.excluded
    }
}

impl NodeCriteria for BuildingTypeCriteria {
    fn matches(&self, node: NodeId, graph: &dyn GraphView) -> (bool, Option<CriteriaItem>) {
        graph
            .node_buildings(node)
            .iter()
            .find(|b| b.kind == self.kind && !self.excluded.contains(&b.id))
            .map_or((false, None), |b| (true, Some(CriteriaItem::Building(*b))))
    }

    fn matches_ignoring_exclusions(&self, node: NodeId, graph: &dyn GraphView) -> bool {
        graph.node_buildings(node).iter().any(|b| b.kind == self.kind)
    }

    fn cache_key(&self) -> String {
        format!("building:{}", self.kind)
    }
}

// ── Edge count ────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EdgeDirection {
    Outgoing,
    Incoming,
    /// Outgoing plus incoming.
    Either,
}

impl EdgeDirection {
    fn as_str(self) -> &'static str {
        match self {
            EdgeDirection::Outgoing => "out",
            EdgeDirection::Incoming => "in",
            EdgeDirection::Either   => "any",
        }
    }
}

/// Matches nodes whose edge count in `direction` lies in `min..=max`.
#[derive(Copy, Clone, Debug)]
pub struct EdgeCountCriteria {
    pub direction: EdgeDirection,
    pub min: usize,
    pub max: Option<usize>,
}

impl EdgeCountCriteria {
    pub fn at_least(direction: EdgeDirection, min: usize) -> Self {
        Self { direction, min, max: None }
    }

    pub fn exactly(direction: EdgeDirection, count: usize) -> Self {
        Self { direction, min: count, max: Some(count) }
    }
}

impl NodeCriteria for EdgeCountCriteria {
    fn matches(&self, node: NodeId, graph: &dyn GraphView) -> (bool, Option<CriteriaItem>) {
        if !graph.contains_node(node) {
            return (false, None);
        }
        let count = match self.direction {
            EdgeDirection::Outgoing => graph.outgoing_edges(node).len(),
            EdgeDirection::Incoming => graph.incoming_edges(node).len(),
            EdgeDirection::Either => {
                graph.outgoing_edges(node).len() + graph.incoming_edges(node).len()
            }
        };
        let ok = count >= self.min && self.max.is_none_or(|max| count <= max);
        if ok {
            (true, Some(CriteriaItem::EdgeCount(count)))
        } else {
            (false, None)
        }
    }

    fn cache_key(&self) -> String {
        match self.max {
            Some(max) => format!("edges:{}:{}..={}", self.direction.as_str(), self.min, max),
            None => format!("edges:{}:{}..", self.direction.as_str(), self.min),
        }
    }
}

// ── Composites ────────────────────────────────────────────────────────────────

/// All sub-criteria must match.  Stops at the first failure.
#[derive(Default)]
pub struct AndCriteria {
    parts: Vec<Box<dyn NodeCriteria>>,
}

impl AndCriteria {
    pub fn new(parts: Vec<Box<dyn NodeCriteria>>) -> Self {
        Self { parts }
    }

    pub fn with(mut self, part: impl NodeCriteria + 'static) -> Self {
        self.parts.push(Box::new(part));
        self
    }
}

impl NodeCriteria for AndCriteria {
    fn matches(&self, node: NodeId, graph: &dyn GraphView) -> (bool, Option<CriteriaItem>) {
        let mut items = Vec::with_capacity(self.parts.len());
        for part in &self.parts {
            let (ok, item) = part.matches(node, graph);
            if !ok {
                return (false, None);
            }
            items.push(item);
        }
        (true, Some(CriteriaItem::Composite(items)))
    }

    fn matches_ignoring_exclusions(&self, node: NodeId, graph: &dyn GraphView) -> bool {
        self.parts.iter().all(|p| p.matches_ignoring_exclusions(node, graph))
    }

    fn cache_key(&self) -> String {
        composite_key("and", &self.parts)
    }
}

/// At least one sub-criteria must match.  Stops at the first success.
#[derive(Default)]
pub struct OrCriteria {
    parts: Vec<Box<dyn NodeCriteria>>,
}

impl OrCriteria {
    pub fn new(parts: Vec<Box<dyn NodeCriteria>>) -> Self {
        Self { parts }
    }

    pub fn with(mut self, part: impl NodeCriteria + 'static) -> Self {
        self.parts.push(Box::new(part));
        self
    }
}

impl NodeCriteria for OrCriteria {
    fn matches(&self, node: NodeId, graph: &dyn GraphView) -> (bool, Option<CriteriaItem>) {
        let mut items: Vec<Option<CriteriaItem>> = vec![None; self.parts.len()];
        for (slot, part) in self.parts.iter().enumerate() {
            let (ok, item) = part.matches(node, graph);
            if ok {
                items[slot] = item;
                return (true, Some(CriteriaItem::Composite(items)));
            }
        }
        (false, None)
    }

    fn matches_ignoring_exclusions(&self, node: NodeId, graph: &dyn GraphView) -> bool {
        self.parts.iter().any(|p| p.matches_ignoring_exclusions(node, graph))
    }

    fn cache_key(&self) -> String {
        composite_key("or", &self.parts)
    }
}

fn composite_key(op: &str, parts: &[Box<dyn NodeCriteria>]) -> String {
    let inner: Vec<String> = parts.iter().map(|p| p.cache_key()).collect();
    format!("{op}({})", inner.join(","))
}
