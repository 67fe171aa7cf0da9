//! Unit tests for sn-network.
//!
//! All tests use hand-built networks so they run without any map data.

#[cfg(test)]
mod helpers {
    use std::cell::Cell;

    use geo::coord;

    use sn_core::{AttrValue, Crs, GeoPoint, NodeId};

    use crate::{ExtentDescriptor, GraphBackend, NetworkError, NetworkGraph, NetworkGraphBuilder, NetworkResult};

    /// Four intersections a few hundred metres apart (lat, lon):
    ///
    ///   A:(30.690, -88.050)  B:(30.690, -88.045)
    ///   C:(30.695, -88.045)  D:(30.695, -88.040)
    ///
    /// Directed edges: A→B 5, B→C 3, A→C 10, C→D 1.
    pub fn diamond() -> (NetworkGraph, [NodeId; 4]) {
        let mut b = NetworkGraphBuilder::new(Crs::Wgs84);
        let a = b.add_node(11, GeoPoint::new(30.690, -88.050).to_coord());
        let bb = b.add_node(12, GeoPoint::new(30.690, -88.045).to_coord());
        let c = b.add_node(13, GeoPoint::new(30.695, -88.045).to_coord());
        let d = b.add_node(14, GeoPoint::new(30.695, -88.040).to_coord());

        b.add_directed_edge_with(a, bb, 5.0, vec![("name".into(), "Elm St".into())]);
        b.add_directed_edge_with(
            bb,
            c,
            3.0,
            vec![("name".into(), AttrValue::List(vec!["Elm St".into(), "Oak Ave".into()]))],
        );
        b.add_directed_edge(a, c, 10.0);
        b.add_directed_edge(c, d, 1.0);

        (b.build().unwrap(), [a, bb, c, d])
    }

    /// Nodes on a planar grid (Web Mercator metres), no edges.
    pub fn planar(points: &[(f64, f64)]) -> NetworkGraph {
        let mut b = NetworkGraphBuilder::new(Crs::WebMercator);
        for (i, &(x, y)) in points.iter().enumerate() {
            b.add_node(i as u64, coord! { x: x, y: y });
        }
        b.build().unwrap()
    }

    /// Serves [`diamond`] for every descriptor and counts calls.
    #[derive(Default)]
    pub struct CountingBackend {
        pub calls: Cell<usize>,
    }

    impl GraphBackend for CountingBackend {
        fn fetch(&self, _descriptor: &ExtentDescriptor) -> NetworkResult<NetworkGraph> {
            self.calls.set(self.calls.get() + 1);
            Ok(diamond().0)
        }
    }

    pub struct DownBackend;

    impl GraphBackend for DownBackend {
        fn fetch(&self, _descriptor: &ExtentDescriptor) -> NetworkResult<NetworkGraph> {
            Err(NetworkError::Retrieval("connection refused".into()))
        }
    }

    pub fn bbox() -> ExtentDescriptor {
        ExtentDescriptor::BBox { north: 30.70, south: 30.68, east: -88.03, west: -88.06 }
    }
}

// ── Builder & network structure ───────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use geo::coord;

    use sn_core::{AttrValue, Crs, EdgeId, NodeId};

    use crate::{NetworkError, NetworkGraphBuilder};

    #[test]
    fn empty_build() {
        let net = NetworkGraphBuilder::new(Crs::Wgs84).build().unwrap();
        assert_eq!(net.node_count(), 0);
        assert_eq!(net.edge_count(), 0);
        assert!(net.is_empty());
        assert!(net.nearest_node(coord! { x: 0.0, y: 0.0 }).is_none());
    }

    #[test]
    fn csr_out_edges() {
        let (net, [a, b, c, d]) = super::helpers::diamond();
        assert_eq!(net.out_degree(a), 2);
        assert_eq!(net.out_degree(b), 1);
        assert_eq!(net.out_degree(c), 1);
        assert_eq!(net.out_degree(d), 0);
        for e in net.out_edges(a) {
            assert_eq!(net.edge_from[e.index()], a);
        }
        // Insertion order survives the sort: A→B before A→C.
        let targets: Vec<_> = net.out_edges(a).map(|e| net.edge_to[e.index()]).collect();
        assert_eq!(targets, vec![b, c]);
    }

    #[test]
    fn parallel_edges_get_keys() {
        let mut b = NetworkGraphBuilder::new(Crs::WebMercator);
        let u = b.add_node(1, coord! { x: 0.0, y: 0.0 });
        let v = b.add_node(2, coord! { x: 10.0, y: 0.0 });
        b.add_directed_edge(u, v, 10.0);
        b.add_directed_edge(u, v, 14.0);
        b.add_directed_edge(v, u, 10.0);
        let net = b.build().unwrap();
        assert_eq!(net.edge_key, vec![0, 1, 0]);
        assert_eq!(net.edge_length_m[EdgeId(1).index()], 14.0);
    }

    #[test]
    fn duplicate_source_id_reuses_node() {
        let mut b = NetworkGraphBuilder::new(Crs::WebMercator);
        let first = b.add_node(42, coord! { x: 0.0, y: 0.0 });
        let again = b.add_node(42, coord! { x: 5.0, y: 5.0 });
        assert_eq!(first, again);
        let net = b.build().unwrap();
        assert_eq!(net.node_count(), 1);
        assert_eq!(net.node_by_source(42), Some(NodeId(0)));
        assert_eq!(net.node_pos(first), Some(coord! { x: 0.0, y: 0.0 }));
    }

    #[test]
    fn rejects_bad_edges() {
        let mut b = NetworkGraphBuilder::new(Crs::WebMercator);
        let u = b.add_node(1, coord! { x: 0.0, y: 0.0 });
        b.add_directed_edge(u, NodeId(7), 1.0);
        assert!(matches!(b.build(), Err(NetworkError::InvalidEdge { .. })));

        let mut b = NetworkGraphBuilder::new(Crs::WebMercator);
        let u = b.add_node(1, coord! { x: 0.0, y: 0.0 });
        let v = b.add_node(2, coord! { x: 1.0, y: 0.0 });
        b.add_directed_edge(u, v, -1.0);
        assert!(matches!(b.build(), Err(NetworkError::InvalidEdge { .. })));
    }

    #[test]
    fn attribute_columns_fill_missing_with_null() {
        let (net, _) = super::helpers::diamond();
        assert_eq!(net.edge_attrs.row_count(), 4);
        let names = net.edge_attrs.column("name").unwrap();
        // Sorted by source: A→B, A→C, B→C, C→D.
        assert_eq!(names[0], AttrValue::from("Elm St"));
        assert_eq!(names[1], AttrValue::Null);
        assert!(matches!(names[2], AttrValue::List(_)));
        assert_eq!(names[3], AttrValue::Null);
    }

    #[test]
    fn street_counts_are_undirected() {
        let (net, [a, b, c, d]) = super::helpers::diamond();
        let counts = net.street_counts();
        assert_eq!(counts[a.index()], 2);
        assert_eq!(counts[b.index()], 2);
        assert_eq!(counts[c.index()], 3);
        assert_eq!(counts[d.index()], 1);
    }
}

// ── Snapping ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod snap {
    use geo::{coord, Coord};
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use sn_core::{Crs, CrsRegistry, Hemisphere, NodeId, Reproject, Transformer};
    use sn_points::CoordinateSet;

    use super::helpers::{diamond, planar};
    use crate::{NetworkError, NodeSnapper};

    #[test]
    fn exact_and_nearest() {
        let net = planar(&[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)]);
        let ids = NodeSnapper::nearest(
            &net,
            &[coord! { x: 0.0, y: 0.0 }, coord! { x: 6.0, y: 1.0 }, coord! { x: -3.0, y: 8.0 }],
        )
        .unwrap();
        assert_eq!(ids, vec![NodeId(0), NodeId(1), NodeId(2)]);
    }

    #[test]
    fn ties_go_to_lowest_id() {
        let mid = [coord! { x: 5.0, y: 0.0 }];
        let net = planar(&[(10.0, 0.0), (0.0, 0.0)]);
        assert_eq!(NodeSnapper::nearest(&net, &mid).unwrap(), vec![NodeId(0)]);
        let net = planar(&[(0.0, 0.0), (10.0, 0.0)]);
        assert_eq!(NodeSnapper::nearest(&net, &mid).unwrap(), vec![NodeId(0)]);

        // Four-way tie.
        let net = planar(&[(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)]);
        assert_eq!(NodeSnapper::nearest(&net, &[coord! { x: 0.0, y: 0.0 }]).unwrap(), vec![NodeId(0)]);
    }

    #[test]
    fn preserves_input_order_and_is_repeatable() {
        let net = planar(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
        let pts = [coord! { x: 19.0, y: 0.0 }, coord! { x: 1.0, y: 0.0 }, coord! { x: 11.0, y: 0.0 }];
        let first = NodeSnapper::nearest(&net, &pts).unwrap();
        assert_eq!(first, vec![NodeId(2), NodeId(0), NodeId(1)]);
        assert_eq!(NodeSnapper::nearest(&net, &pts).unwrap(), first);
    }

    #[test]
    fn empty_graph_errors() {
        let net = planar(&[]);
        assert!(matches!(
            NodeSnapper::nearest(&net, &[coord! { x: 0.0, y: 0.0 }]),
            Err(NetworkError::EmptyGraph)
        ));
    }

    #[test]
    fn snap_requires_matching_crs() {
        let (net, _) = diamond();
        let set = CoordinateSet::from_lat_lon(&[(30.6901, -88.0499)]).unwrap();
        let batch = NodeSnapper::snap(&net, &set).unwrap();
        assert_eq!(batch.node_ids(), vec![NodeId(0)]);
        assert!(batch.is_valid_for(&net));

        let utm = Crs::Utm { zone: 16, hemisphere: Hemisphere::North };
        let projected = net.reproject(&Transformer::new(Crs::Wgs84, utm.clone()).unwrap()).unwrap();
        assert!(!batch.is_valid_for(&projected));
        assert!(matches!(
            NodeSnapper::snap(&projected, &set),
            Err(NetworkError::CrsMismatch { expected, found }) if expected == utm && found == Crs::Wgs84
        ));

        let set_utm = CrsRegistry::new().to_crs(utm.clone(), set).unwrap();
        let again = NodeSnapper::snap(&projected, &set_utm).unwrap();
        assert_eq!(again.node_ids(), vec![NodeId(0)]);
        assert_eq!(again.crs(), utm);
    }

    #[test]
    fn matches_brute_force() {
        let mut rng = SmallRng::seed_from_u64(7);
        let nodes: Vec<(f64, f64)> = (0..300)
            .map(|_| (rng.gen_range(0.0..1_000.0), rng.gen_range(0.0..1_000.0)))
            .collect();
        let net = planar(&nodes);
        let queries: Vec<Coord<f64>> = (0..200)
            .map(|_| coord! { x: rng.gen_range(-50.0..1_050.0), y: rng.gen_range(-50.0..1_050.0) })
            .collect();

        let got = NodeSnapper::nearest(&net, &queries).unwrap();
        for (q, id) in queries.iter().zip(got) {
            let expected = nodes
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| {
                    let (dx, dy) = (x - q.x, y - q.y);
                    (dx * dx + dy * dy, i)
                })
                .min_by(|a, b| a.partial_cmp(b).unwrap())
                .map(|(_, i)| NodeId(i as u32))
                .unwrap();
            assert_eq!(id, expected, "query {q:?}");
        }
    }
}

// ── NetworkCache ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod cache {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Arc;

    use approx::assert_abs_diff_eq;
    use geo::Intersects;

    use sn_core::{Crs, Hemisphere};

    use super::helpers::{bbox, diamond, CountingBackend, DownBackend};
    use crate::{ExtentDescriptor, NetworkCache, NetworkError, NoBackend};

    const UTM16N: Crs = Crs::Utm { zone: 16, hemisphere: Hemisphere::North };

    #[test]
    fn fetch_is_idempotent() {
        let mut cache = NetworkCache::new(CountingBackend::default());
        let g1 = cache.fetch(&bbox()).unwrap();
        let g2 = cache.fetch(&ExtentDescriptor::Place("Mobile, Alabama".into())).unwrap();
        assert!(Arc::ptr_eq(&g1, &g2));
        assert_eq!(cache.backend().calls.get(), 1);
        assert!(!cache.is_projected());
    }

    #[test]
    fn custom_bypasses_backend() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let custom = ExtentDescriptor::custom(move || {
            counter.set(counter.get() + 1);
            Ok(diamond().0)
        });
        let mut cache = NetworkCache::new(NoBackend);
        cache.fetch(&custom).unwrap();
        cache.fetch(&custom).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.graph().unwrap().node_count(), 4);
    }

    #[test]
    fn retrieval_failure_is_not_cached() {
        let mut cache = NetworkCache::new(DownBackend);
        assert!(matches!(cache.fetch(&bbox()), Err(NetworkError::Retrieval(_))));
        assert!(!cache.is_fetched());
        assert!(matches!(
            NetworkCache::new(NoBackend).fetch(&bbox()),
            Err(NetworkError::Retrieval(_))
        ));
    }

    #[test]
    fn project_before_fetch_fails() {
        let mut cache = NetworkCache::new(CountingBackend::default());
        assert!(matches!(cache.project(None), Err(NetworkError::NotFetched)));
        assert!(matches!(cache.nodes(), Err(NetworkError::NotFetched)));
        assert_eq!(cache.crs(), None);
    }

    #[test]
    fn default_projection_is_centroid_utm_and_idempotent() {
        let mut cache = NetworkCache::new(CountingBackend::default());
        cache.fetch(&bbox()).unwrap();
        let p1 = cache.project(None).unwrap();
        assert_eq!(p1.crs(), UTM16N);
        assert!(cache.is_projected());
        let p2 = cache.project(None).unwrap();
        assert!(Arc::ptr_eq(&p1, &p2));
        assert_eq!(p1.positions(), p2.positions());
    }

    #[test]
    fn projection_is_self_inverse() {
        let mut cache = NetworkCache::new(CountingBackend::default());
        let original = cache.fetch(&bbox()).unwrap();
        cache.project(Some(UTM16N)).unwrap();
        let back = cache.project(Some(Crs::Wgs84)).unwrap();
        assert_eq!(back.crs(), Crs::Wgs84);
        for (a, b) in original.positions().iter().zip(back.positions()) {
            assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-8);
            assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-8);
        }
        assert_eq!(original.edge_length_m, back.edge_length_m);
    }

    #[test]
    fn projects_to_any_epsg_code() {
        let mut cache = NetworkCache::new(CountingBackend::default());
        let original = cache.fetch(&bbox()).unwrap();
        // NAD83 / Alabama West, metres.
        let state_plane: Crs = "EPSG:26930".parse().unwrap();
        let projected = cache.project(Some(state_plane.clone())).unwrap();
        assert_eq!(projected.crs(), state_plane);
        assert_eq!(cache.nodes().unwrap().crs(), Crs::Epsg(26930));
        let back = cache.project(Some(Crs::Wgs84)).unwrap();
        for (a, b) in original.positions().iter().zip(back.positions()) {
            assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-7);
            assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-7);
        }
    }

    #[test]
    fn views_follow_projection() {
        let mut cache = NetworkCache::new(CountingBackend::default());
        cache.fetch(&bbox()).unwrap();
        let before = cache.nodes().unwrap().clone();
        assert_eq!(before.crs(), Crs::Wgs84);
        // Second call returns the same derived view.
        assert!(std::ptr::eq(cache.nodes().unwrap(), cache.nodes().unwrap()));

        cache.project(None).unwrap();
        let after = cache.nodes().unwrap();
        assert_eq!(after.crs(), UTM16N);
        assert_ne!(after.rows()[0].x, before.rows()[0].x);
        assert_eq!(after.rows()[0].source_id, before.rows()[0].source_id);
        assert_eq!(cache.edges().unwrap().crs(), UTM16N);
    }

    #[test]
    fn noop_projection_keeps_views() {
        let mut cache = NetworkCache::new(CountingBackend::default());
        cache.fetch(&bbox()).unwrap();
        let g1 = Arc::clone(cache.graph().unwrap());
        let view = cache.nodes().unwrap().clone();
        let g2 = cache.project(Some(Crs::Wgs84)).unwrap();
        assert!(cache.is_projected());
        assert!(Arc::ptr_eq(&g1, &g2));
        assert_eq!(cache.nodes().unwrap(), &view);
        // project(None) after any projection is a no-op.
        cache.project(None).unwrap();
        assert_eq!(cache.crs(), Some(Crs::Wgs84));
    }

    #[test]
    fn extent_is_hull_of_edges() {
        let mut cache = NetworkCache::new(CountingBackend::default());
        cache.fetch(&bbox()).unwrap();
        let extent = cache.extent().unwrap().clone();
        let graph = Arc::clone(cache.graph().unwrap());
        for &c in graph.positions() {
            assert!(extent.intersects(&geo::Point::from(c)));
        }
        cache.project(None).unwrap();
        assert!(cache.extent().unwrap().exterior().coords().all(|c| c.x > 1_000.0));
    }

    #[test]
    fn clear_forgets_graph() {
        let mut cache = NetworkCache::new(CountingBackend::default());
        cache.fetch(&bbox()).unwrap();
        cache.clear();
        assert!(!cache.is_fetched());
        cache.fetch(&bbox()).unwrap();
        assert_eq!(cache.backend().calls.get(), 2);
    }

    #[test]
    fn make_hashable_once_per_state() {
        let mut cache = NetworkCache::new(CountingBackend::default());
        cache.fetch(&bbox()).unwrap();
        assert_eq!(cache.edges().unwrap().attrs.unhashable_columns(), vec!["name"]);
        assert_eq!(cache.make_hashable().unwrap(), 1);
        assert_eq!(cache.make_hashable().unwrap(), 0);
        assert!(cache.edges().unwrap().attrs.unhashable_columns().is_empty());

        // A fresh state starts unsanitized again.
        cache.project(None).unwrap();
        assert_eq!(cache.make_hashable().unwrap(), 1);
    }
}

// ── Views ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod views {
    use sn_core::{AttrValue, CoreError, NodeId};

    use super::helpers::diamond;
    use crate::{EdgeView, NetworkError, NodeView};

    #[test]
    fn node_rows_follow_graph() {
        let (net, [a, ..]) = diamond();
        let view = NodeView::from_graph(&net);
        assert_eq!(view.len(), 4);
        assert_eq!(view.get(a).unwrap().source_id, 11);
        assert_eq!(view.position(a), net.node_pos(a));
    }

    #[test]
    fn select_sorts_and_dedups() {
        let (mut net, [a, _, c, d]) = diamond();
        net.node_attrs
            .insert_column("ref", vec![AttrValue::Int(1), AttrValue::Int(2), AttrValue::Int(3), AttrValue::Int(4)])
            .unwrap();
        let view = NodeView::from_graph(&net);
        let sel = view.select(&[d, a, d, c]).unwrap();
        let ids: Vec<_> = sel.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a, c, d]);
        assert_eq!(sel.attrs.get("ref", 1), Some(&AttrValue::Int(3)));
        assert_eq!(sel.get(c).unwrap().source_id, 13);
        assert!(matches!(view.select(&[NodeId(9)]), Err(NetworkError::NodeNotFound(_))));
    }

    #[test]
    fn select_needs_hashable_attrs() {
        let (mut net, [a, ..]) = diamond();
        net.node_attrs
            .insert_column(
                "highway",
                vec![AttrValue::List(vec!["a".into()]), AttrValue::Null, AttrValue::Null, AttrValue::Null],
            )
            .unwrap();
        let mut view = NodeView::from_graph(&net);
        assert!(matches!(
            view.select(&[a]),
            Err(NetworkError::Core(CoreError::UnhashableColumn(_)))
        ));
        view.attrs.make_hashable();
        assert_eq!(view.select(&[a]).unwrap().len(), 1);
    }

    #[test]
    fn edge_rows_carry_geometry() {
        let (net, [a, b, ..]) = diamond();
        let view = EdgeView::from_graph(&net);
        let first = &view.rows()[0];
        assert_eq!((first.from, first.to, first.key), (a, b, 0));
        assert_eq!(first.length_m, 5.0);
        assert_eq!(first.geometry.0, vec![net.node_pos(a).unwrap(), net.node_pos(b).unwrap()]);
    }
}

// ── Descriptors ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod descriptor {
    use approx::assert_abs_diff_eq;
    use geo::Contains;

    use sn_core::{Crs, CrsRegistry, Hemisphere};
    use sn_points::OdPairs;

    use crate::ExtentDescriptor;

    fn pairs() -> OdPairs {
        OdPairs::from_lat_lon(&[(30.69, -88.05)], &[(30.71, -88.03)]).unwrap()
    }

    #[test]
    fn route_polygon_covers_points_with_buffer() {
        let ExtentDescriptor::Polygon(poly) = ExtentDescriptor::route_polygon(&pairs()).unwrap() else {
            panic!("expected polygon");
        };
        assert!(poly.contains(&geo::point! { x: -88.05, y: 30.69 }));
        assert!(poly.contains(&geo::point! { x: -88.14, y: 30.69 }));
        assert!(!poly.contains(&geo::point! { x: -88.20, y: 30.69 }));
    }

    #[test]
    fn route_point_uses_wgs84_centroid() {
        let mut p = pairs();
        p.to_crs(&mut CrsRegistry::new(), Crs::Utm { zone: 16, hemisphere: Hemisphere::North })
            .unwrap();
        let ExtentDescriptor::Point { center, distance_m } = ExtentDescriptor::route_point(&p, 2_000.0).unwrap() else {
            panic!("expected point");
        };
        assert_eq!(distance_m, 2_000.0);
        assert_abs_diff_eq!(center.lat, 30.70, epsilon = 1e-6);
        assert_abs_diff_eq!(center.lon, -88.04, epsilon = 1e-6);
    }

    #[test]
    fn debug_hides_closures() {
        let d = ExtentDescriptor::custom(|| Err(crate::NetworkError::EmptyGraph));
        assert_eq!(format!("{d:?}"), "Custom(..)");
        assert_eq!(d.kind(), "custom");
    }
}
