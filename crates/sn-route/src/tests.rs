//! Unit tests for sn-route.
//!
//! All tests use hand-built networks; nothing touches real map data.

#[cfg(test)]
mod helpers {
    use std::cell::Cell;

    use geo::{coord, polygon, Geometry};

    use sn_core::{Crs, GeoPoint, NodeId};
    use sn_geometry::{FeatureBackend, GeometryCollection, GeometryResult, TagQuery};
    use sn_network::{ExtentDescriptor, GraphBackend, NetworkGraph, NetworkGraphBuilder, NetworkResult};

    use crate::RoutePlanner;

    /// Planar four-node network (Web Mercator metres), lengths equal to the
    /// Euclidean segment lengths on the A→B→C→D chain:
    ///
    /// ```text
    ///                C(5,3) ──1──▶ D(6,3)
    ///              ↗    ▲
    ///         10 ╱      │ 3
    ///          ╱        │
    ///   A(0,0) ───5───▶ B(5,0)
    /// ```
    pub fn scenario(with_ac: bool, with_bc: bool) -> (NetworkGraph, [NodeId; 4]) {
        let mut b = NetworkGraphBuilder::new(Crs::WebMercator);
        let a = b.add_node(1, coord! { x: 0.0, y: 0.0 });
        let bb = b.add_node(2, coord! { x: 5.0, y: 0.0 });
        let c = b.add_node(3, coord! { x: 5.0, y: 3.0 });
        let d = b.add_node(4, coord! { x: 6.0, y: 3.0 });
        b.add_directed_edge(a, bb, 5.0);
        if with_bc {
            b.add_directed_edge(bb, c, 3.0);
        }
        if with_ac {
            b.add_directed_edge(a, c, 10.0);
        }
        b.add_directed_edge(c, d, 1.0);
        (b.build().unwrap(), [a, bb, c, d])
    }

    /// Unit square with two equal-weight routes from (0,0) to (1,1).
    pub fn square() -> (NetworkGraph, NodeId, NodeId) {
        let mut b = NetworkGraphBuilder::new(Crs::WebMercator);
        let s = b.add_node(10, coord! { x: 0.0, y: 0.0 });
        let e = b.add_node(11, coord! { x: 1.0, y: 0.0 });
        let n = b.add_node(12, coord! { x: 0.0, y: 1.0 });
        let t = b.add_node(13, coord! { x: 1.0, y: 1.0 });
        b.add_directed_edge(s, e, 1.0);
        b.add_directed_edge(s, n, 1.0);
        b.add_directed_edge(e, t, 1.0);
        b.add_directed_edge(n, t, 1.0);
        (b.build().unwrap(), s, t)
    }

    pub fn planner() -> RoutePlanner {
        RoutePlanner::default()
    }

    pub const A: GeoPoint = GeoPoint { lat: 30.690, lon: -88.050 };
    pub const B: GeoPoint = GeoPoint { lat: 30.690, lon: -88.045 };
    pub const C: GeoPoint = GeoPoint { lat: 30.695, lon: -88.045 };
    pub const D: GeoPoint = GeoPoint { lat: 30.695, lon: -88.040 };

    /// The scenario shape laid out in WGS84 with haversine lengths.
    pub fn mobile() -> NetworkGraph {
        let mut b = NetworkGraphBuilder::new(Crs::Wgs84);
        let ids: Vec<NodeId> = [A, B, C, D]
            .iter()
            .enumerate()
            .map(|(i, p)| b.add_node(101 + i as u64, p.to_coord()))
            .collect();
        b.add_directed_edge(ids[0], ids[1], A.distance_m(B));
        b.add_directed_edge(ids[1], ids[2], B.distance_m(C));
        b.add_directed_edge(ids[0], ids[2], A.distance_m(C) * 2.0);
        b.add_directed_edge(ids[2], ids[3], C.distance_m(D));
        b.build().unwrap()
    }

    pub struct MobileBackend;

    impl GraphBackend for MobileBackend {
        fn fetch(&self, _descriptor: &ExtentDescriptor) -> NetworkResult<NetworkGraph> {
            Ok(mobile())
        }
    }

    /// Returns one park polygon in WGS84 and counts calls.
    #[derive(Default)]
    pub struct ParkFeatures {
        pub calls: Cell<usize>,
    }

    impl ParkFeatures {
        fn park(&self) -> GeometryCollection {
            self.calls.set(self.calls.get() + 1);
            GeometryCollection::new(
                Crs::Wgs84,
                vec![Geometry::Polygon(polygon![
                    (x: -88.048, y: 30.691),
                    (x: -88.046, y: 30.691),
                    (x: -88.046, y: 30.693),
                    (x: -88.048, y: 30.691),
                ])],
            )
        }
    }

    impl FeatureBackend for ParkFeatures {
        fn features_from_point(&self, _: GeoPoint, _: &TagQuery, _: f64) -> GeometryResult<GeometryCollection> {
            Ok(self.park())
        }

        fn features_from_polygon(&self, _: &geo::Polygon<f64>, _: &TagQuery) -> GeometryResult<GeometryCollection> {
            Ok(self.park())
        }
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod router {
    use sn_core::NodeId;

    use super::helpers::{scenario, square};
    use crate::{DijkstraRouter, RouteError, Router};

    #[test]
    fn takes_cheaper_detour() {
        let (net, [a, b, c, d]) = scenario(true, true);
        let path = DijkstraRouter.route(&net, a, d).unwrap();
        assert_eq!(path.nodes, vec![a, b, c, d]);
        assert_eq!(path.edges.len(), 3);
        assert_eq!(path.weight, 9.0);
    }

    #[test]
    fn same_path_without_direct_edge() {
        let (net, [a, b, c, d]) = scenario(false, true);
        let path = DijkstraRouter.route(&net, a, d).unwrap();
        assert_eq!(path.nodes, vec![a, b, c, d]);
        assert_eq!(path.weight, 9.0);
    }

    #[test]
    fn unreachable_without_bridge() {
        let (net, [a, _, _, d]) = scenario(false, false);
        assert!(matches!(
            DijkstraRouter.route(&net, a, d),
            Err(RouteError::Unreachable { from, to }) if from == a && to == d
        ));
    }

    #[test]
    fn honors_direction() {
        let (net, [a, _, _, d]) = scenario(true, true);
        assert!(matches!(DijkstraRouter.route(&net, d, a), Err(RouteError::Unreachable { .. })));
    }

    #[test]
    fn trivial_route() {
        let (net, [a, ..]) = scenario(true, true);
        let path = DijkstraRouter.route(&net, a, a).unwrap();
        assert!(path.is_trivial());
        assert_eq!(path.nodes, vec![a]);
        assert_eq!(path.weight, 0.0);
    }

    #[test]
    fn unknown_node() {
        let (net, [a, ..]) = scenario(true, true);
        assert!(matches!(
            DijkstraRouter.route(&net, a, NodeId(99)),
            Err(RouteError::NodeNotFound(NodeId(99)))
        ));
    }

    #[test]
    fn equal_weight_ties_are_stable() {
        let (net, s, t) = square();
        let first = DijkstraRouter.route(&net, s, t).unwrap();
        assert_eq!(first.weight, 2.0);
        for _ in 0..10 {
            assert_eq!(DijkstraRouter.route(&net, s, t).unwrap(), first);
        }
    }
}

// ── Planner ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod planner {
    use geo::{coord, line_string};

    use sn_core::{AttrValue, Crs, Reproject, Transformer};
    use sn_network::{NodeSnapper, NodeView};
    use sn_points::{CoordinateSet, Point};

    use super::helpers::{planner, scenario};
    use crate::{DivergencePolicy, FailureReason, PlannerConfig, RouteError, RoutePlanner};

    #[test]
    fn end_to_end_scenario() {
        let (net, [a, _, _, d]) = scenario(true, true);
        let view = NodeView::from_graph(&net);
        let batch = planner().plan_ids(&net, &view, &[a], &[d]).unwrap();
        assert!(batch.is_complete());
        let path = &batch.paths()[0];
        assert_eq!(path.node_key, "[1, 2, 3, 4]");
        assert_eq!(path.weight_sum, 9.0);
        assert_eq!(path.route_dist, 9.0);
    }

    #[test]
    fn partial_batch_keeps_order() {
        let (net, [a, b, c, d]) = scenario(true, true);
        let view = NodeView::from_graph(&net);
        let batch = planner()
            .plan_ids(&net, &view, &[a, d, b], &[d, a, d])
            .unwrap();

        assert_eq!(batch.pair_count(), 3);
        let pairs: Vec<_> = batch.paths().iter().map(|p| p.pair).collect();
        assert_eq!(pairs, vec![0, 2]);
        assert_eq!(batch.path(2).unwrap().nodes, vec![b, c, d]);

        assert_eq!(batch.failures().len(), 1);
        let failure = &batch.failures()[0];
        assert_eq!((failure.pair, failure.origin, failure.destination), (1, d, a));
        assert_eq!(failure.reason, FailureReason::Unreachable);
    }

    #[test]
    fn route_length_matches_weight_sum() {
        let (net, [a, b, c, d]) = scenario(true, true);
        let view = NodeView::from_graph(&net);
        let batch = planner()
            .plan_ids(&net, &view, &[a, a, b, c], &[d, c, d, d])
            .unwrap();
        assert!(batch.is_complete());
        for p in batch.paths() {
            assert!(p.divergence() < 1e-3, "pair {}: {} vs {}", p.pair, p.route_dist, p.weight_sum);
        }
    }

    #[test]
    fn line_length_sums_segments() {
        let line = geo::line_string![(x: 0.0, y: 0.0), (x: 3.0, y: 4.0), (x: 3.0, y: 10.0)];
        assert_eq!(crate::path::line_length(&line), 11.0);
        assert_eq!(crate::path::line_length(&geo::LineString::new(Vec::new())), 0.0);
    }

    #[test]
    fn trivial_pair_has_zero_length_line() {
        let (net, [a, ..]) = scenario(true, true);
        let view = NodeView::from_graph(&net);
        let batch = planner().plan_ids(&net, &view, &[a], &[a]).unwrap();
        let p = &batch.paths()[0];
        assert_eq!(p.geometry.0.len(), 2);
        assert_eq!(p.route_dist, 0.0);
        assert_eq!(p.node_key, "[1]");
    }

    #[test]
    fn divergence_policy() {
        // Without B→C the only A→D path uses the 10 m A→C edge, which is
        // about 5.83 m long on the map.
        let (net, [a, _, _, d]) = scenario(true, false);
        let view = NodeView::from_graph(&net);

        let warn = planner().plan_ids(&net, &view, &[a], &[d]).unwrap();
        assert!(warn.is_complete());
        assert_eq!(warn.paths()[0].weight_sum, 11.0);

        let strict = PlannerConfig { on_divergence: DivergencePolicy::Reject, ..PlannerConfig::default() };
        let reject = RoutePlanner::new(strict).plan_ids(&net, &view, &[a], &[d]).unwrap();
        assert!(reject.paths().is_empty());
        assert!(matches!(
            reject.failures()[0].reason,
            FailureReason::LengthDivergence { weight_sum, .. } if weight_sum == 11.0
        ));
    }

    #[test]
    fn count_mismatch_is_an_error() {
        let (net, [a, b, ..]) = scenario(true, true);
        let view = NodeView::from_graph(&net);
        assert!(matches!(
            planner().plan_ids(&net, &view, &[a, b], &[b]),
            Err(RouteError::PairCountMismatch { origins: 2, destinations: 1 })
        ));
    }

    #[test]
    fn stale_inputs_are_rejected() {
        let (net, _) = scenario(true, true);
        let set = CoordinateSet::from_points(vec![Point::new(coord! { x: 0.1, y: 0.1 })], Crs::WebMercator);
        let snapped = NodeSnapper::snap(&net, &set).unwrap();

        let moved = net.reproject(&Transformer::new(Crs::WebMercator, Crs::Wgs84).unwrap()).unwrap();
        let view = NodeView::from_graph(&moved);
        assert!(matches!(
            planner().plan(&moved, &view, &snapped, &snapped),
            Err(RouteError::StaleInput { expected: Crs::Wgs84, found: Crs::WebMercator })
        ));

        let old_view = NodeView::from_graph(&net);
        let ids = snapped.node_ids();
        assert!(matches!(
            planner().plan_ids(&moved, &old_view, &ids, &ids),
            Err(RouteError::StaleInput { .. })
        ));
    }

    #[test]
    fn batch_geometry_columns() {
        let (net, [a, b, _, d]) = scenario(true, true);
        let view = NodeView::from_graph(&net);
        let batch = planner()
            .plan_ids(&net, &view, &[a, d, b], &[d, a, b])
            .unwrap();
        assert_eq!(batch.endpoint_nodes(), vec![a, b, d]);

        let geom = batch.to_geometry().unwrap();
        assert_eq!(geom.len(), 2);
        let cols: Vec<_> = geom.attrs.column_names().collect();
        assert_eq!(cols, vec!["pair", "route_dist", "weight_sum", "osmids"]);
        assert_eq!(geom.attrs.get("osmids", 0), Some(&AttrValue::from("[1, 2, 3, 4]")));
    }
}

// ── StreetGraph pipeline ──────────────────────────────────────────────────────

#[cfg(test)]
mod pipeline {
    use sn_core::{Crs, Hemisphere, NodeId};
    use sn_geometry::{GeometryError, ShapeKind, StyleOverrides, TagQuery};
    use sn_network::ExtentDescriptor;
    use sn_points::OdPairs;

    use super::helpers::{MobileBackend, ParkFeatures, A, D};
    use crate::{RouteError, StreetGraph, DEFAULT_FEATURE_DIST_M, SHORTEST_PATH_EDGES, SHORTEST_PATH_NODES};

    const UTM16N: Crs = Crs::Utm { zone: 16, hemisphere: Hemisphere::North };

    fn bbox() -> ExtentDescriptor {
        ExtentDescriptor::BBox { north: 30.70, south: 30.68, east: -88.03, west: -88.06 }
    }

    fn pairs() -> OdPairs {
        OdPairs::from_lat_lon(
            &[(A.lat + 0.0001, A.lon - 0.0001), (D.lat, D.lon)],
            &[(D.lat - 0.0001, D.lon + 0.0001), (A.lat, A.lon)],
        )
        .unwrap()
    }

    #[test]
    fn shortest_path_with_route_caches_both_layers() {
        let mut g = StreetGraph::new(MobileBackend);
        g.download(&bbox()).unwrap();
        let mut od = pairs();
        let edge_style = StyleOverrides::default().color("red");
        let batch = g
            .shortest_path_with_route(&mut od, &edge_style, &StyleOverrides::default())
            .unwrap();

        assert_eq!(g.crs(), Some(UTM16N));
        assert_eq!(od.crs(), UTM16N);
        assert_eq!(batch.crs(), UTM16N);

        assert_eq!(batch.paths().len(), 1);
        assert_eq!(batch.paths()[0].node_key, "[101, 102, 103, 104]");
        assert_eq!(batch.failures().len(), 1);
        assert_eq!(batch.failures()[0].pair, 1);

        let edges = g.geometry(SHORTEST_PATH_EDGES).unwrap();
        assert_eq!(edges.geometry.len(), 1);
        assert_eq!(edges.style.kind, ShapeKind::Line);
        assert_eq!(edges.style.color, "red");

        let nodes = g.geometry(SHORTEST_PATH_NODES).unwrap();
        assert_eq!(nodes.geometry.len(), 2);
        assert_eq!(nodes.geometry.crs(), UTM16N);
        assert_eq!(nodes.style.kind, ShapeKind::Point);
    }

    #[test]
    fn rerouting_replaces_cached_paths() {
        let mut g = StreetGraph::new(MobileBackend);
        g.download(&bbox()).unwrap();
        let plain = StyleOverrides::default();
        g.shortest_path_with_route(&mut pairs(), &plain, &plain).unwrap();

        let mut single = OdPairs::from_lat_lon(&[(A.lat, A.lon)], &[(A.lat, A.lon)]).unwrap();
        g.shortest_path_with_route(&mut single, &StyleOverrides::default().color("blue"), &plain)
            .unwrap();
        let edges = g.geometry(SHORTEST_PATH_EDGES).unwrap();
        assert_eq!(edges.geometry.len(), 1);
        assert_eq!(edges.style.color, "blue");
        assert_eq!(g.geometry(SHORTEST_PATH_NODES).unwrap().geometry.len(), 1);
        assert_eq!(g.geometries().len(), 2);
    }

    #[test]
    fn routing_before_download_fails() {
        let mut g = StreetGraph::new(MobileBackend);
        let plain = StyleOverrides::default();
        assert!(matches!(
            g.shortest_path_with_route(&mut pairs(), &plain, &plain),
            Err(RouteError::Network(sn_network::NetworkError::NotFetched))
        ));
    }

    #[test]
    fn shortest_path_between_nodes() {
        let mut g = StreetGraph::new(MobileBackend);
        g.download(&bbox()).unwrap();
        let path = g.shortest_path(NodeId(0), NodeId(3)).unwrap();
        assert_eq!(path.nodes, vec![NodeId(0), NodeId(1), NodeId(2), NodeId(3)]);
    }

    #[test]
    fn features_are_fetched_once_and_reprojected() {
        let mut g = StreetGraph::with_features(MobileBackend, ParkFeatures::default());
        g.download(&bbox()).unwrap();
        g.project(None).unwrap();
        let tags = TagQuery::new().values("leisure", ["park"]);
        let plain = StyleOverrides::default();

        g.add_features_from_polygon("parks", &tags, &plain).unwrap();
        g.add_features_from_polygon("parks", &tags, &plain).unwrap();
        g.add_features_from_point("parks", &tags, DEFAULT_FEATURE_DIST_M, &plain).unwrap();
        assert_eq!(g.features().calls.get(), 1);

        let parks = g.geometry("parks").unwrap();
        assert_eq!(parks.geometry.crs(), UTM16N);
        assert_eq!(parks.style.kind, ShapeKind::Polygon);

        g.add_features_from_point("more_parks", &tags, DEFAULT_FEATURE_DIST_M, &plain)
            .unwrap();
        assert_eq!(g.features().calls.get(), 2);
        assert_eq!(g.geometries().keys().collect::<Vec<_>>(), vec!["parks", "more_parks"]);
    }

    #[test]
    fn missing_geometry_is_not_found() {
        let g = StreetGraph::new(MobileBackend);
        assert!(matches!(
            g.geometry("buildings"),
            Err(RouteError::Geometry(GeometryError::NotFound(_)))
        ));
    }
}

// ── CSV export ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod export {
    use sn_network::{EdgeView, NodeView};

    use super::helpers::{planner, scenario};
    use crate::CsvExporter;

    fn read(path: &std::path::Path) -> Vec<csv::StringRecord> {
        csv::Reader::from_path(path).unwrap().records().map(Result::unwrap).collect()
    }

    #[test]
    fn writes_all_tables() {
        let dir = tempfile::tempdir().unwrap();
        let out = CsvExporter::new(dir.path().join("nested/out")).unwrap();

        let (net, [a, _, _, d]) = scenario(true, true);
        let nodes = NodeView::from_graph(&net);
        let edges = EdgeView::from_graph(&net);
        let batch = planner().plan_ids(&net, &nodes, &[a, d], &[d, a]).unwrap();

        let node_file = out.write_nodes(&nodes).unwrap();
        let edge_file = out.write_edges(&edges).unwrap();
        let (paths_file, failures_file) = out.write_batch(&batch).unwrap();

        assert_eq!(read(&node_file).len(), 4);
        assert_eq!(read(&edge_file).len(), 4);

        let paths = read(&paths_file);
        assert_eq!(paths.len(), 1);
        assert_eq!(&paths[0][5], "[1, 2, 3, 4]");

        let failures = read(&failures_file);
        assert_eq!(failures.len(), 1);
        assert_eq!(&failures[0][0], "1");
        assert_eq!(&failures[0][3], "unreachable");
    }
}
