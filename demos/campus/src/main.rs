//! campus — end-to-end walk through the street-network pipeline.
//!
//! Routes five trips between buildings of the University of South Alabama
//! campus in Mobile, Alabama over a synthetic street grid, caches parks and
//! buildings from an in-memory feature catalogue and writes the results as
//! CSV.  Swap `GridBackend` for `OsmPbfBackend` (feature `osm` of
//! `sn-network`) to run on real map data.

mod network;

use std::io::Cursor;
use std::time::Instant;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use sn_core::AttrValue;
use sn_geometry::{StyleOverrides, TagQuery};
use sn_network::ExtentDescriptor;
use sn_points::{load_coords_reader, OdPairs};
use sn_route::{CsvExporter, StreetGraph, DEFAULT_FEATURE_DIST_M, SHORTEST_PATH_EDGES, SHORTEST_PATH_NODES};

use network::{CampusFeatures, GridBackend, LandmarkGeocoder};

// ── Constants ─────────────────────────────────────────────────────────────────

const OUTPUT_DIR: &str = "output/campus";
const PARKS_KEY:  &str = "parks";
const BUILDINGS:  &str = "buildings";

// ── Trip CSVs ─────────────────────────────────────────────────────────────────

// One row per trip; row i of ORIGINS pairs with row i of DESTINATIONS.
const ORIGINS_CSV: &str = "\
y,x\n\
30.7005,-88.1865\n\
30.6962,-88.1781\n\
30.6925,-88.1850\n\
30.6885,-88.1765\n\
30.6948,-88.1770\n\
";

const DESTINATIONS_CSV: &str = "\
y,x\n\
30.6962,-88.1781\n\
30.6900,-88.1690\n\
30.6948,-88.1770\n\
30.7005,-88.1865\n\
30.6948,-88.1770\n\
";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== campus: street-network routing demo ===");
    let t0 = Instant::now();

    // ── 1. Origin/destination pairs ───────────────────────────────────────
    let origins = load_coords_reader(Cursor::new(ORIGINS_CSV), "origins.csv")?;
    let destinations = load_coords_reader(Cursor::new(DESTINATIONS_CSV), "destinations.csv")?;
    let mut pairs = OdPairs::new(origins, destinations)?;
    pairs.geocode(&LandmarkGeocoder::default())?;
    println!("\n[1] {} trips", pairs.len());
    for (i, (o, d)) in pairs.origins().iter().zip(pairs.destinations()).enumerate() {
        println!(
            "    trip {i}: {}  ->  {}",
            o.address.as_deref().unwrap_or("?"),
            d.address.as_deref().unwrap_or("?"),
        );
    }

    // ── 2. Street network ─────────────────────────────────────────────────
    let area = ExtentDescriptor::route_polygon(&pairs)?;
    let mut graph = StreetGraph::with_features(GridBackend, CampusFeatures::default());
    let fetched = graph.download(&area)?;
    let projected = graph.project(None)?;
    println!(
        "\n[2] network: {} nodes, {} edges; {} -> {}",
        fetched.node_count(),
        fetched.edge_count(),
        fetched.crs(),
        projected.crs(),
    );

    // ── 3. Routes ─────────────────────────────────────────────────────────
    let batch = graph.shortest_path_with_route(
        &mut pairs,
        &StyleOverrides::default().color("red").linewidth(2.0),
        &StyleOverrides::default().color("blue").markersize(40.0),
    )?;
    println!("\n[3] routed {}/{} pairs", batch.paths().len(), batch.pair_count());
    let edges = graph.edges()?;
    for p in batch.paths() {
        let first_street = p
            .edges
            .first()
            .and_then(|e| edges.attrs.get("name", e.index()))
            .and_then(AttrValue::as_text)
            .unwrap_or("-");
        println!(
            "    pair {}: {:>3} nodes  {:>7.1} m  (graph weight {:.1} m)  via {first_street}",
            p.pair,
            p.nodes.len(),
            p.route_dist,
            p.weight_sum,
        );
    }
    for f in batch.failures() {
        println!("    pair {}: failed ({})", f.pair, f.reason);
    }

    // ── 4. Map features ───────────────────────────────────────────────────
    graph
        .add_features_from_point(
            PARKS_KEY,
            &TagQuery::new().values("leisure", ["park", "pitch"]),
            DEFAULT_FEATURE_DIST_M,
            &StyleOverrides::default().color("green"),
        )?
        .add_features_from_polygon(
            BUILDINGS,
            &TagQuery::new().key("building"),
            &StyleOverrides::default().color("tan").alpha(0.9),
        )?;
    println!("\n[4] geometry cache");
    for (key, entry) in graph.geometries().iter() {
        println!(
            "    {key:<22} {:>3} x {:<8} color={}",
            entry.geometry.len(),
            entry.style.kind,
            entry.style.color,
        );
    }
    debug_assert!(graph.geometries().contains(SHORTEST_PATH_EDGES));
    debug_assert!(graph.geometries().contains(SHORTEST_PATH_NODES));

    // ── 5. Output ─────────────────────────────────────────────────────────
    let out = CsvExporter::new(OUTPUT_DIR)?;
    out.write_nodes(graph.nodes()?)?;
    out.write_edges(graph.edges()?)?;
    let (paths_csv, failures_csv) = out.write_batch(&batch)?;
    println!("\n[5] wrote {} and {}", paths_csv.display(), failures_csv.display());

    println!("\ndone in {:.2?}", t0.elapsed());
    Ok(())
}
