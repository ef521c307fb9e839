//! Advisory memoization for closest-match searches.
//!
//! Nothing here is a source of truth.  The cache may be cleared at any time
//! (and must be after the graph changes); the next search simply recomputes.
//!
//! # Entry layout
//!
//! An entry holds the settle-ordered prefix of nodes that matched the
//! criteria *ignoring exclusions*, ending at the first node that matched
//! *with* the exclusions of the search that filled it.  Because the prefix
//! is complete up to its last cost, the first prefix node accepted under a
//! later, different exclusion set is exactly what a fresh search would have
//! returned.  If no prefix node is accepted and the prefix is not
//! `exhausted`, the caller must search again.

use rustc_hash::FxHashMap;

use haul_core::NodeId;

use crate::criteria::CriteriaItem;
use crate::route::Route;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SearchKey {
    pub criteria: String,
    pub start: NodeId,
    max_speed_bits: u64,
}

impl SearchKey {
    pub fn new(criteria: String, start: NodeId, max_speed_kph: f64) -> Self {
        Self { criteria, start, max_speed_bits: max_speed_kph.to_bits() }
    }
}

#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub node: NodeId,
    /// Item as evaluated when the entry was recorded.
    pub item: Option<CriteriaItem>,
    pub route: Route,
    pub cost_s: f64,
}

#[derive(Clone, Debug, Default)]
pub struct CachedSearch {
    /// Ascending cost order.
    pub entries: Vec<CacheEntry>,
    /// The search ran out of frontier, so `entries` lists every reachable
    /// match.
    pub exhausted: bool,
}

#[derive(Debug, Default)]
pub struct SearchCache {
    map: FxHashMap<SearchKey, CachedSearch>,
    hits: u64,
    misses: u64,
}

impl SearchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &SearchKey) -> Option<&CachedSearch> {
        self.map.get(key)
    }

    pub fn insert(&mut self, key: SearchKey, search: CachedSearch) {
        self.map.insert(key, search);
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// `(hits, misses)` since construction.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
