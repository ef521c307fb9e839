//! Unit and property tests for haul-spatial.
//!
//! All tests use hand-built networks.

#[cfg(test)]
mod helpers {
    use haul_core::{BuildingId, NodeId, Point};

    use crate::{BuildingKind, GraphView, RoadNetwork, RoadNetworkBuilder};

    /// A —1000 m— B —1000 m— C, 50 km/h, bidirectional.
    pub fn line_network() -> (RoadNetwork, [NodeId; 3]) {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(Point::new(0.0, 0.0));
        let m = b.add_node(Point::new(1_000.0, 0.0));
        let c = b.add_node(Point::new(2_000.0, 0.0));
        b.add_road(a, m, 1_000.0, 50.0).unwrap();
        b.add_road(m, c, 1_000.0, 50.0).unwrap();
        (b.build(), [a, m, c])
    }

    /// Nodes (x, y in metres):
    ///   0:(0,0)    1:(1000,0)   2:(2000,0)
    ///   3:(0,1000)              4:(2000,1000)
    ///
    /// Roads: 0-1, 1-2, 2-4 fast (100 km/h, 1000 m each);
    ///        0-3 slow (20 km/h, 1000 m), 3-4 (100 km/h, 2000 m).
    /// Fastest 0→4 is 0→1→2→4 (108 s) against 0→3→4 (180 s + 72 s).
    pub fn grid_network() -> (RoadNetwork, [NodeId; 5]) {
        let mut b = RoadNetworkBuilder::new();
        let n0 = b.add_node(Point::new(0.0, 0.0));
        let n1 = b.add_node(Point::new(1_000.0, 0.0));
        let n2 = b.add_node(Point::new(2_000.0, 0.0));
        let n3 = b.add_node(Point::new(0.0, 1_000.0));
        let n4 = b.add_node(Point::new(2_000.0, 1_000.0));
        b.add_road(n0, n1, 1_000.0, 100.0).unwrap();
        b.add_road(n1, n2, 1_000.0, 100.0).unwrap();
        b.add_road(n2, n4, 1_000.0, 100.0).unwrap();
        b.add_road(n0, n3, 1_000.0, 20.0).unwrap();
        b.add_road(n3, n4, 2_000.0, 100.0).unwrap();
        (b.build(), [n0, n1, n2, n3, n4])
    }

    /// A detour map for the waypoint search.
    ///
    /// ```text
    ///   A(-1500,0) ─ S(0,0) ─ M(2000,0) ─ T(4000,0)
    ///                          │
    ///                          B(2000,500)
    /// ```
    ///
    /// Parkings at A (1500 m behind S) and B (500 m off the S→T line).  A is
    /// closer to S, B is the better stop on the way to T.  All 90 km/h.
    pub struct DetourMap {
        pub net: RoadNetwork,
        pub s: NodeId,
        pub t: NodeId,
        pub a: NodeId,
        pub b: NodeId,
        pub parking_a: BuildingId,
        pub parking_b: BuildingId,
    }

    pub fn detour_map() -> DetourMap {
        let mut bld = RoadNetworkBuilder::new();
        let a = bld.add_node(Point::new(-1_500.0, 0.0));
        let s = bld.add_node(Point::new(0.0, 0.0));
        let m = bld.add_node(Point::new(2_000.0, 0.0));
        let t = bld.add_node(Point::new(4_000.0, 0.0));
        let b = bld.add_node(Point::new(2_000.0, 500.0));
        bld.add_road(a, s, 1_500.0, 90.0).unwrap();
        bld.add_road(s, m, 2_000.0, 90.0).unwrap();
        bld.add_road(m, t, 2_000.0, 90.0).unwrap();
        bld.add_road(m, b, 500.0, 90.0).unwrap();
        let parking_a = bld.add_building(a, BuildingKind::Parking).unwrap();
        let parking_b = bld.add_building(b, BuildingKind::Parking).unwrap();
        DetourMap { net: bld.build(), s, t, a, b, parking_a, parking_b }
    }

    /// Sum of the cheapest edge costs along consecutive route nodes.
    pub fn path_cost(net: &dyn GraphView, path: &[NodeId], max_speed_kph: f64) -> Option<f64> {
        let mut total = 0.0;
        for w in path.windows(2) {
            let step = net
                .outgoing_edges(w[0])
                .iter()
                .filter(|e| e.to == w[1])
                .filter_map(|e| e.travel_secs(max_speed_kph))
                .fold(f64::INFINITY, f64::min);
            if !step.is_finite() {
                return None;
            }
            total += step;
        }
        Some(total)
    }

    /// All-pairs shortest travel times by Floyd–Warshall.
    pub fn floyd(net: &dyn GraphView, max_speed_kph: f64) -> Vec<Vec<f64>> {
        let n = net.node_count();
        let mut d = vec![vec![f64::INFINITY; n]; n];
        for i in 0..n {
            d[i][i] = 0.0;
            for e in net.outgoing_edges(NodeId(i as u32)) {
                if let Some(c) = e.travel_secs(max_speed_kph) {
                    let j = e.to.index();
                    if c < d[i][j] {
                        d[i][j] = c;
                    }
                }
            }
        }
        for k in 0..n {
            for i in 0..n {
                for j in 0..n {
                    let via = d[i][k] + d[k][j];
                    if via < d[i][j] {
                        d[i][j] = via;
                    }
                }
            }
        }
        d
    }
}

// ── Builder & graph view ──────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use haul_core::{BuildingId, EdgeId, NodeId, Point};

    use crate::{BuildingKind, GraphView, RoadNetworkBuilder, SpatialError};

    #[test]
    fn empty_build() {
        let net = RoadNetworkBuilder::new().build();
        assert_eq!(net.node_count(), 0);
        assert_eq!(net.edge_count(), 0);
        assert!(net.is_empty());
        assert!(net.outgoing_edges(NodeId(0)).is_empty());
    }

    #[test]
    fn out_and_in_adjacency() {
        let (net, [n0, n1, n2, n3, n4]) = super::helpers::grid_network();
        assert_eq!(net.edge_count(), 10);
        assert_eq!(net.outgoing_edges(n1).len(), 2);
        assert_eq!(net.incoming_edges(n4).len(), 2);
        for e in net.outgoing_edges(n0) {
            assert_eq!(e.from, n0);
        }
        for e in net.incoming_edges(n4) {
            assert_eq!(e.to, n4);
        }
        let _ = (n2, n3);
    }

    #[test]
    fn edge_ids_index_the_edge_table() {
        let (net, _) = super::helpers::grid_network();
        for (i, e) in net.edges().iter().enumerate() {
            assert_eq!(e.id, EdgeId(i as u32));
            assert_eq!(net.edge(e.id), Some(e));
        }
        assert!(net.edge(EdgeId(999)).is_none());
    }

    #[test]
    fn directed_only_edge() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(Point::new(0.0, 0.0));
        let c = b.add_node(Point::new(100.0, 0.0));
        b.add_directed_edge(a, c, 100.0, 50.0).unwrap();
        let net = b.build();
        assert_eq!(net.outgoing_edges(a).len(), 1);
        assert!(net.outgoing_edges(c).is_empty());
        assert_eq!(net.incoming_edges(c).len(), 1);
    }

    #[test]
    fn heuristic_scale_tracks_shortest_drawn_edge() {
        let (net, _) = super::helpers::line_network();
        assert_eq!(net.heuristic_scale(), 1.0);

        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(Point::new(0.0, 0.0));
        let c = b.add_node(Point::new(1_000.0, 0.0));
        b.add_directed_edge(a, c, 1_500.0, 50.0).unwrap();
        b.add_directed_edge(c, a, 250.0, 50.0).unwrap();
        b.add_directed_edge(a, a, 0.0, 50.0).unwrap();
        assert!((b.build().heuristic_scale() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn rejects_unknown_nodes_and_bad_lengths() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(Point::new(0.0, 0.0));
        assert!(matches!(
            b.add_directed_edge(a, NodeId(5), 10.0, 50.0),
            Err(SpatialError::NodeNotFound(NodeId(5)))
        ));
        assert!(matches!(
            b.add_directed_edge(a, a, -1.0, 50.0),
            Err(SpatialError::InvalidLength { .. })
        ));
        assert!(b.add_building(NodeId(9), BuildingKind::Depot).is_err());
        assert_eq!(b.edge_count(), 0);
    }

    #[test]
    fn buildings_grouped_by_node() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(Point::new(0.0, 0.0));
        let c = b.add_node(Point::new(100.0, 0.0));
        let p1 = b.add_building(c, BuildingKind::Parking).unwrap();
        let g = b.add_building(a, BuildingKind::GasStation).unwrap();
        let p2 = b.add_building(c, BuildingKind::Parking).unwrap();
        let net = b.build();

        assert_eq!((p1, g, p2), (BuildingId(0), BuildingId(1), BuildingId(2)));
        let at_c: Vec<BuildingId> = net.node_buildings(c).iter().map(|b| b.id).collect();
        assert_eq!(at_c, vec![p1, p2]);
        assert_eq!(net.node_buildings(a).len(), 1);
        assert_eq!(net.building(g).map(|b| b.node), Some(a));
        assert!(net.building(BuildingId(42)).is_none());
        assert_eq!(net.buildings_of_kind(BuildingKind::Parking).count(), 2);
    }

    #[test]
    fn unknown_node_queries_are_empty() {
        let (net, _) = super::helpers::line_network();
        assert!(net.outgoing_edges(NodeId::INVALID).is_empty());
        assert!(net.incoming_edges(NodeId(77)).is_empty());
        assert!(net.node_buildings(NodeId(77)).is_empty());
        assert!(net.node_position(NodeId(77)).is_none());
        assert!(!net.contains_node(NodeId::INVALID));
    }

    #[test]
    fn snap_to_nearest_node() {
        let (net, [n0, _, n2, _, n4]) = super::helpers::grid_network();
        assert_eq!(net.snap_to_node(Point::new(10.0, -5.0)), Some(n0));
        assert_eq!(net.snap_to_node(Point::new(1_990.0, 30.0)), Some(n2));
        assert_eq!(net.snap_to_node(Point::new(2_500.0, 1_400.0)), Some(n4));
        assert_eq!(crate::RoadNetwork::empty().snap_to_node(Point::default()), None);
    }
}

// ── Route ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod route {
    use haul_core::NodeId;

    use crate::Route;

    #[test]
    fn pops_keep_endpoints() {
        let mut r = Route::new(vec![NodeId(1), NodeId(2), NodeId(3)], 30.0);
        assert_eq!(r.pop_head(), Some(NodeId(1)));
        assert_eq!(r.head(), Some(NodeId(2)));
        r.pop_head();
        r.pop_head();
        assert!(r.is_empty());
        assert_eq!(r.route_start(), Some(NodeId(1)));
        assert_eq!(r.route_end(), Some(NodeId(3)));
        assert_eq!(r.cost_s(), 30.0);
    }

    #[test]
    fn skip_origin_only_drops_matching_head() {
        let r = Route::new(vec![NodeId(1), NodeId(2)], 0.0);
        assert_eq!(r.clone().skip_origin(NodeId(1)).to_vec(), vec![NodeId(2)]);
        assert_eq!(r.skip_origin(NodeId(9)).len(), 2);
        assert!(Route::empty().skip_origin(NodeId(0)).is_empty());
    }
}

// ── Criteria ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod criteria {
    use std::cell::Cell;
    use std::rc::Rc;

    use haul_core::NodeId;

    use crate::{
        AndCriteria, BuildingKind, BuildingTypeCriteria, CriteriaItem, EdgeCountCriteria,
        EdgeDirection, GraphView, NodeCriteria, OrCriteria,
    };

    /// Always answers `answer` and counts evaluations.
    struct Probe {
        answer: bool,
        calls: Rc<Cell<usize>>,
    }

    impl NodeCriteria for Probe {
        fn matches(&self, _: NodeId, _: &dyn GraphView) -> (bool, Option<CriteriaItem>) {
            self.calls.set(self.calls.get() + 1);
            (self.answer, self.answer.then_some(CriteriaItem::EdgeCount(0)))
        }
        fn cache_key(&self) -> String {
            "probe".into()
        }
    }

    #[test]
    fn building_type_respects_exclusions() {
        let m = super::helpers::detour_map();
        let mut c = BuildingTypeCriteria::new(BuildingKind::Parking);
        let (ok, item) = c.matches(m.a, &m.net);
        assert!(ok);
        assert_eq!(item.unwrap().building().map(|b| b.id), Some(m.parking_a));

        c.exclude(m.parking_a);
        assert!(!c.matches(m.a, &m.net).0);
        assert!(c.matches_ignoring_exclusions(m.a, &m.net));
        assert!(!c.matches(m.s, &m.net).0);
        assert!(BuildingTypeCriteria::new(BuildingKind::GasStation).matches(m.b, &m.net).1.is_none());
    }

    #[test]
    fn cache_key_ignores_exclusions() {
        let plain = BuildingTypeCriteria::new(BuildingKind::Parking);
        let excl = BuildingTypeCriteria::excluding(BuildingKind::Parking, [haul_core::BuildingId(3)]);
        assert_eq!(plain.cache_key(), excl.cache_key());
        assert_ne!(plain.cache_key(), BuildingTypeCriteria::new(BuildingKind::Depot).cache_key());
    }

    #[test]
    fn edge_count_bounds() {
        let (net, [a, m, _]) = super::helpers::line_network();
        let dead_end = EdgeCountCriteria::exactly(EdgeDirection::Outgoing, 1);
        assert_eq!(dead_end.matches(a, &net), (true, Some(CriteriaItem::EdgeCount(1))));
        assert!(!dead_end.matches(m, &net).0);
        assert!(EdgeCountCriteria::at_least(EdgeDirection::Either, 4).matches(m, &net).0);
        assert!(!EdgeCountCriteria::at_least(EdgeDirection::Incoming, 0).matches(NodeId(99), &net).0);
        assert_eq!(dead_end.cache_key(), "edges:out:1..=1");
        assert_eq!(
            EdgeCountCriteria::at_least(EdgeDirection::Incoming, 2).cache_key(),
            "edges:in:2.."
        );
    }

    #[test]
    fn and_short_circuits_on_failure() {
        let (net, [a, _, _]) = super::helpers::line_network();
        let calls = Rc::new(Cell::new(0));
        let c = AndCriteria::default()
            .with(EdgeCountCriteria::at_least(EdgeDirection::Outgoing, 5))
            .with(Probe { answer: true, calls: Rc::clone(&calls) });
        assert_eq!(c.matches(a, &net), (false, None));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn and_collects_sub_items() {
        let m = super::helpers::detour_map();
        let c = AndCriteria::default()
            .with(BuildingTypeCriteria::new(BuildingKind::Parking))
            .with(EdgeCountCriteria::at_least(EdgeDirection::Outgoing, 1));
        let (ok, item) = c.matches(m.b, &m.net);
        assert!(ok);
        match item {
            Some(CriteriaItem::Composite(parts)) => {
                assert_eq!(parts.len(), 2);
                assert!(matches!(parts[0], Some(CriteriaItem::Building(_))));
                assert_eq!(parts[1], Some(CriteriaItem::EdgeCount(1)));
            }
            other => panic!("unexpected item {other:?}"),
        }
        assert_eq!(c.cache_key(), "and(building:parking,edges:out:1..)");
    }

    #[test]
    fn or_short_circuits_on_success() {
        let (net, [a, _, _]) = super::helpers::line_network();
        let calls = Rc::new(Cell::new(0));
        let c = OrCriteria::default()
            .with(EdgeCountCriteria::at_least(EdgeDirection::Outgoing, 1))
            .with(Probe { answer: true, calls: Rc::clone(&calls) });
        let (ok, item) = c.matches(a, &net);
        assert!(ok);
        assert_eq!(calls.get(), 0);
        assert_eq!(
            item,
            Some(CriteriaItem::Composite(vec![Some(CriteriaItem::EdgeCount(1)), None]))
        );
    }

    #[test]
    fn or_fails_when_all_fail() {
        let (net, [a, _, _]) = super::helpers::line_network();
        let c = OrCriteria::default()
            .with(BuildingTypeCriteria::new(BuildingKind::Parking))
            .with(EdgeCountCriteria::at_least(EdgeDirection::Outgoing, 3));
        assert_eq!(c.matches(a, &net), (false, None));
    }
}

// ── A* ────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod astar {
    use haul_core::{NodeId, Point};

    use crate::{Navigator, RoadNetworkBuilder};

    use super::helpers::{grid_network, line_network, path_cost};

    #[test]
    fn line_route_and_cost() {
        let (net, [a, b, c]) = line_network();
        let route = Navigator::new().find_route(&net, a, c, 100.0);
        assert_eq!(route.to_vec(), vec![a, b, c]);
        // 1000 m at 50 km/h is 72 s per hop.
        assert!((route.cost_s() - 144.0).abs() < 1e-9, "got {}", route.cost_s());
        assert_eq!(route.route_start(), Some(a));
        assert_eq!(route.route_end(), Some(c));
    }

    #[test]
    fn agent_speed_caps_edge_speed() {
        let (net, [a, _, c]) = line_network();
        let route = Navigator::new().find_route(&net, a, c, 25.0);
        assert!((route.cost_s() - 288.0).abs() < 1e-9);
    }

    #[test]
    fn prefers_faster_over_shorter() {
        let (net, [n0, n1, n2, _, n4]) = grid_network();
        let route = Navigator::new().find_route(&net, n0, n4, 100.0);
        assert_eq!(route.to_vec(), vec![n0, n1, n2, n4]);
        assert!((route.cost_s() - 108.0).abs() < 1e-9);
    }

    #[test]
    fn short_drawn_edges_keep_route_optimal() {
        // The detour through `m` is far longer on the map than on the road.
        let mut b = RoadNetworkBuilder::new();
        let s = b.add_node(Point::new(0.0, 0.0));
        let g = b.add_node(Point::new(10_000.0, 0.0));
        let m = b.add_node(Point::new(0.0, 10_000.0));
        b.add_directed_edge(s, g, 12_000.0, 90.0).unwrap();
        b.add_directed_edge(s, m, 1_000.0, 90.0).unwrap();
        b.add_directed_edge(m, g, 1_000.0, 90.0).unwrap();
        let net = b.build();

        let route = Navigator::new().find_route(&net, s, g, 90.0);
        assert_eq!(route.to_vec(), vec![s, m, g]);
        assert!((route.cost_s() - 80.0).abs() < 1e-9, "got {}", route.cost_s());
        assert_eq!(path_cost(&net, &route.to_vec(), 90.0), Some(route.cost_s()));
    }

    #[test]
    fn start_equals_goal() {
        let mut b = RoadNetworkBuilder::new();
        let n = b.add_node(Point::new(5.0, 5.0));
        let net = b.build();
        let route = Navigator::new().find_route(&net, n, n, 80.0);
        assert_eq!(route.to_vec(), vec![n]);
        assert_eq!(route.cost_s(), 0.0);
    }

    #[test]
    fn unreachable_and_missing_endpoints_are_empty() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(Point::new(0.0, 0.0));
        let c = b.add_node(Point::new(100.0, 0.0));
        b.add_directed_edge(c, a, 100.0, 50.0).unwrap();
        let net = b.build();
        let nav = Navigator::new();
        assert!(nav.find_route(&net, a, c, 80.0).is_empty());
        assert!(nav.find_route(&net, a, NodeId(9), 80.0).is_empty());
        assert!(nav.find_route(&net, NodeId::INVALID, a, 80.0).is_empty());
        assert!(nav.find_route(&net, c, a, 0.0).is_empty());
    }

    #[test]
    fn zero_speed_edge_is_impassable() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(Point::new(0.0, 0.0));
        let c = b.add_node(Point::new(100.0, 0.0));
        b.add_road(a, c, 100.0, 0.0).unwrap();
        let net = b.build();
        assert!(Navigator::new().find_route(&net, a, c, 80.0).is_empty());
    }

    #[test]
    fn ties_resolve_identically() {
        // Diamond: two equal-cost paths 0→1→3 and 0→2→3.
        let mut b = RoadNetworkBuilder::new();
        let n0 = b.add_node(Point::new(0.0, 0.0));
        let n1 = b.add_node(Point::new(500.0, 500.0));
        let n2 = b.add_node(Point::new(500.0, -500.0));
        let n3 = b.add_node(Point::new(1_000.0, 0.0));
        for (x, y) in [(n0, n1), (n0, n2), (n1, n3), (n2, n3)] {
            b.add_road(x, y, 800.0, 60.0).unwrap();
        }
        let net = b.build();
        let nav = Navigator::new();
        let first = nav.find_route(&net, n0, n3, 90.0);
        for _ in 0..20 {
            assert_eq!(nav.find_route(&net, n0, n3, 90.0), first);
        }
        // Insertion order breaks the tie: 0→1 was added first.
        assert_eq!(first.to_vec(), vec![n0, n1, n3]);
        assert_eq!(path_cost(&net, &first.to_vec(), 90.0), Some(first.cost_s()));
    }
}

// ── Closest match ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod closest {
    use haul_core::Point;

    use crate::{
        BuildingKind, BuildingTypeCriteria, CriteriaItem, EdgeCountCriteria, EdgeDirection,
        Navigator, RoadNetworkBuilder,
    };

    use super::helpers::detour_map;

    #[test]
    fn nearest_parking_from_start() {
        let m = detour_map();
        let mut nav = Navigator::new();
        let hit = nav
            .find_closest_node(&m.net, m.s, &BuildingTypeCriteria::new(BuildingKind::Parking), 90.0)
            .unwrap();
        assert_eq!(hit.node, m.a);
        assert_eq!(hit.route.to_vec(), vec![m.s, m.a]);
        assert!((hit.cost_s - 60.0).abs() < 1e-9);
        assert_eq!(hit.total_cost_s, hit.cost_s);
        assert!(matches!(hit.item, Some(CriteriaItem::Building(b)) if b.id == m.parking_a));
    }

    #[test]
    fn start_node_can_match() {
        let m = detour_map();
        let hit = Navigator::new()
            .find_closest_node(&m.net, m.b, &BuildingTypeCriteria::new(BuildingKind::Parking), 90.0)
            .unwrap();
        assert_eq!(hit.node, m.b);
        assert_eq!(hit.route.to_vec(), vec![m.b]);
        assert_eq!(hit.cost_s, 0.0);
    }

    #[test]
    fn none_when_nothing_matches() {
        let m = detour_map();
        let mut nav = Navigator::new();
        let gas = BuildingTypeCriteria::new(BuildingKind::GasStation);
        assert!(nav.find_closest_node(&m.net, m.s, &gas, 90.0).is_none());
        // Served from the exhausted cache entry the second time.
        assert!(nav.find_closest_node(&m.net, m.s, &gas, 90.0).is_none());
        assert_eq!(nav.cache().stats(), (1, 1));
    }

    #[test]
    fn unreachable_match_is_not_returned() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(Point::new(0.0, 0.0));
        let c = b.add_node(Point::new(100.0, 0.0));
        b.add_directed_edge(c, a, 100.0, 50.0).unwrap();
        b.add_building(c, BuildingKind::Parking).unwrap();
        let net = b.build();
        let hit = Navigator::new().find_closest_node(
            &net,
            a,
            &BuildingTypeCriteria::new(BuildingKind::Parking),
            90.0,
        );
        assert!(hit.is_none());
    }

    #[test]
    fn full_parking_excluded_yields_next_closest() {
        let m = detour_map();
        let mut nav = Navigator::new();
        let all = BuildingTypeCriteria::new(BuildingKind::Parking);
        assert_eq!(nav.find_closest_node(&m.net, m.s, &all, 90.0).unwrap().node, m.a);

        let without_a = BuildingTypeCriteria::excluding(BuildingKind::Parking, [m.parking_a]);
        let hit = nav.find_closest_node(&m.net, m.s, &without_a, 90.0).unwrap();
        assert_eq!(hit.node, m.b);

        let without_both =
            BuildingTypeCriteria::excluding(BuildingKind::Parking, [m.parking_a, m.parking_b]);
        assert!(nav.find_closest_node(&m.net, m.s, &without_both, 90.0).is_none());

        // Both parkings are now in the cached prefix, so lifting the
        // exclusion again is answered from the cache.
        let (hits_before, _) = nav.cache().stats();
        assert_eq!(nav.find_closest_node(&m.net, m.s, &all, 90.0).unwrap().node, m.a);
        assert_eq!(nav.cache().stats().0, hits_before + 1);
    }

    #[test]
    fn cache_keyed_by_start_and_speed() {
        let m = detour_map();
        let mut nav = Navigator::new();
        let c = BuildingTypeCriteria::new(BuildingKind::Parking);
        nav.find_closest_node(&m.net, m.s, &c, 90.0);
        nav.find_closest_node(&m.net, m.t, &c, 90.0);
        nav.find_closest_node(&m.net, m.s, &c, 45.0);
        assert_eq!(nav.cache().len(), 3);
        nav.clear_cache();
        assert!(nav.cache().is_empty());
    }

    #[test]
    fn uncached_navigator_leaves_cache_empty() {
        let m = detour_map();
        let mut nav = Navigator::without_cache();
        let c = EdgeCountCriteria::exactly(EdgeDirection::Outgoing, 3);
        let hit = nav.find_closest_node(&m.net, m.s, &c, 90.0).unwrap();
        assert_eq!(hit.route.route_end(), Some(hit.node));
        assert!(nav.cache().is_empty());
        assert_eq!(nav.cache().stats(), (0, 0));
    }
}

// ── Waypoint-aware search ─────────────────────────────────────────────────────

#[cfg(test)]
mod waypoint {
    use crate::{BuildingKind, BuildingTypeCriteria, Navigator};

    use super::helpers::detour_map;

    #[test]
    fn picks_parking_on_the_way() {
        let m = detour_map();
        let nav = Navigator::new();
        let c = BuildingTypeCriteria::new(BuildingKind::Parking);
        let hit = nav.find_closest_node_on_route(&m.net, m.s, m.t, &c, 90.0).unwrap();
        assert_eq!(hit.node, m.b);
        // S→M→B = 2500 m, B→M→T = 2500 m, both at 25 m/s.
        assert!((hit.cost_s - 100.0).abs() < 1e-9);
        assert!((hit.total_cost_s - 200.0).abs() < 1e-9);
        assert_eq!(hit.route.route_start(), Some(m.s));
        assert_eq!(hit.route.route_end(), Some(m.b));
    }

    #[test]
    fn exclusion_falls_back_to_detour() {
        let m = detour_map();
        let c = BuildingTypeCriteria::excluding(BuildingKind::Parking, [m.parking_b]);
        let hit = Navigator::new()
            .find_closest_node_on_route(&m.net, m.s, m.t, &c, 90.0)
            .unwrap();
        assert_eq!(hit.node, m.a);
        // S→A 60 s, A→S→T 60 + 160 s.
        assert!((hit.total_cost_s - 280.0).abs() < 1e-9);
    }

    #[test]
    fn destination_must_stay_reachable() {
        let m = detour_map();
        let nav = Navigator::new();
        let c = BuildingTypeCriteria::new(BuildingKind::GasStation);
        assert!(nav.find_closest_node_on_route(&m.net, m.s, m.t, &c, 90.0).is_none());
        assert!(nav
            .find_closest_node_on_route(&m.net, m.s, haul_core::NodeId(99), &c, 90.0)
            .is_none());
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use haul_core::{BuildingId, NodeId, Point};

    use crate::{
        BuildingKind, BuildingTypeCriteria, GraphView, Navigator, RoadNetwork, RoadNetworkBuilder,
    };

    use super::helpers::{floyd, path_cost};

    const SPEED: f64 = 90.0;
    const EPS: f64 = 1e-6;

    #[derive(Debug, Clone)]
    struct GraphSpec {
        positions: Vec<(f64, f64)>,
        /// (from, to, length factor relative to the straight line, speed limit)
        edges: Vec<(usize, usize, f64, f64)>,
        parkings: Vec<bool>,
    }

    impl GraphSpec {
        /// Factors below 1 draw edges shorter than the straight line.
        fn build(&self) -> (RoadNetwork, Vec<BuildingId>) {
            let mut b = RoadNetworkBuilder::new();
            let nodes: Vec<NodeId> = self
                .positions
                .iter()
                .map(|&(x, y)| b.add_node(Point::new(x, y)))
                .collect();
            for &(f, t, factor, speed) in &self.edges {
                let (pf, pt) = (self.positions[f], self.positions[t]);
                let straight = Point::new(pf.0, pf.1).distance_m(Point::new(pt.0, pt.1));
                b.add_directed_edge(nodes[f], nodes[t], straight * factor + 1.0, speed)
                    .unwrap();
            }
            let mut parkings = Vec::new();
            for (i, &p) in self.parkings.iter().enumerate() {
                if p {
                    parkings.push(b.add_building(nodes[i], BuildingKind::Parking).unwrap());
                }
            }
            (b.build(), parkings)
        }
    }

    prop_compose! {
        fn arb_spec()(n in 2usize..9)(
            positions in prop::collection::vec((0.0f64..2_000.0, 0.0f64..2_000.0), n),
            edges in prop::collection::vec(
                (0..n, 0..n, 0.2f64..1.6, prop::sample::select(vec![30.0, 50.0, 80.0, 120.0])),
                0..28,
            ),
            parkings in prop::collection::vec(any::<bool>(), n),
        ) -> GraphSpec {
            GraphSpec { positions, edges, parkings }
        }
    }

    /// Cheapest match cost from `s` according to the all-pairs table.
    fn brute_closest(net: &RoadNetwork, d: &[Vec<f64>], s: usize, c: &BuildingTypeCriteria) -> Option<f64> {
        use crate::NodeCriteria;
        (0..net.node_count())
            .filter(|&v| c.matches(NodeId(v as u32), net).0)
            .map(|v| d[s][v])
            .filter(|c| c.is_finite())
            .min_by(f64::total_cmp)
    }

    proptest! {
        #[test]
        fn astar_matches_floyd(spec in arb_spec()) {
            let (net, _) = spec.build();
            let d = floyd(&net, SPEED);
            let nav = Navigator::new();
            for s in 0..net.node_count() {
                for t in 0..net.node_count() {
                    let route = nav.find_route(&net, NodeId(s as u32), NodeId(t as u32), SPEED);
                    if d[s][t].is_finite() {
                        prop_assert!(!route.is_empty());
                        prop_assert!((route.cost_s() - d[s][t]).abs() < EPS);
                        let walked = path_cost(&net, &route.to_vec(), SPEED).unwrap();
                        prop_assert!((walked - d[s][t]).abs() < EPS);
                        prop_assert_eq!(route.route_start(), Some(NodeId(s as u32)));
                        prop_assert_eq!(route.route_end(), Some(NodeId(t as u32)));
                    } else {
                        prop_assert!(route.is_empty());
                    }
                }
            }
        }

        #[test]
        fn astar_is_deterministic(spec in arb_spec()) {
            let (net, _) = spec.build();
            let nav = Navigator::new();
            let last = NodeId((net.node_count() - 1) as u32);
            let first = nav.find_route(&net, NodeId(0), last, SPEED);
            for _ in 0..3 {
                prop_assert_eq!(&nav.find_route(&net, NodeId(0), last, SPEED), &first);
            }
        }

        #[test]
        fn closest_node_is_minimal(spec in arb_spec()) {
            let (net, _) = spec.build();
            let d = floyd(&net, SPEED);
            let c = BuildingTypeCriteria::new(BuildingKind::Parking);
            let mut nav = Navigator::without_cache();
            for s in 0..net.node_count() {
                let hit = nav.find_closest_node(&net, NodeId(s as u32), &c, SPEED);
                match (hit, brute_closest(&net, &d, s, &c)) {
                    (None, None) => {}
                    (Some(hit), Some(best)) => {
                        prop_assert!((hit.cost_s - best).abs() < EPS);
                        prop_assert!((hit.cost_s - d[s][hit.node.index()]).abs() < EPS);
                    }
                    (hit, best) => prop_assert!(false, "hit {:?} vs brute {:?}", hit, best),
                }
            }
        }

        #[test]
        fn cached_search_agrees_with_fresh_search(
            spec in arb_spec(),
            masks in prop::collection::vec(any::<u16>(), 1..8),
        ) {
            let (net, parkings) = spec.build();
            let mut cached = Navigator::new();
            let mut fresh = Navigator::without_cache();
            for mask in masks {
                let excluded = parkings
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << (i % 16)) != 0)
                    .map(|(_, id)| *id);
                let c = BuildingTypeCriteria::excluding(BuildingKind::Parking, excluded);
                for s in 0..net.node_count() {
                    let s = NodeId(s as u32);
                    let a = cached.find_closest_node(&net, s, &c, SPEED);
                    let b = fresh.find_closest_node(&net, s, &c, SPEED);
                    prop_assert_eq!(a.as_ref().map(|h| h.node), b.as_ref().map(|h| h.node));
                    prop_assert_eq!(a.map(|h| h.route), b.map(|h| h.route));
                }
            }
        }

        #[test]
        fn waypoint_search_matches_enumeration(spec in arb_spec()) {
            use crate::NodeCriteria;
            let (net, _) = spec.build();
            let d = floyd(&net, SPEED);
            let c = BuildingTypeCriteria::new(BuildingKind::Parking);
            let nav = Navigator::new();
            let n = net.node_count();
            for s in 0..n {
                for t in 0..n {
                    let brute = (0..n)
                        .filter(|&v| c.matches(NodeId(v as u32), &net).0)
                        .map(|v| d[s][v] + d[v][t])
                        .filter(|x| x.is_finite())
                        .min_by(f64::total_cmp);
                    let hit = nav.find_closest_node_on_route(
                        &net, NodeId(s as u32), NodeId(t as u32), &c, SPEED,
                    );
                    match (hit, brute) {
                        (None, None) => {}
                        (Some(hit), Some(best)) => {
                            prop_assert!((hit.total_cost_s - best).abs() < EPS);
                            let v = hit.node.index();
                            prop_assert!((hit.cost_s - d[s][v]).abs() < EPS);
                            prop_assert!((hit.total_cost_s - (d[s][v] + d[v][t])).abs() < EPS);
                        }
                        (hit, best) => prop_assert!(false, "hit {:?} vs brute {:?}", hit, best),
                    }
                }
            }
        }
    }
}
