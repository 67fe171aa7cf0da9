//! Street-network graph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_to[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All edge arrays (`edge_from`, `edge_to`, `edge_length_m`, `edge_key`) are
//! sorted by source node and indexed by `EdgeId`.  The sort is stable, so
//! edges leaving one node keep the order they were added in, and so does the
//! parallel-edge `key` (0 for the first `u → v` edge, 1 for the second, …).
//!
//! # Positions and CRS
//!
//! Node positions are `geo::Coord<f64>` in the graph's CRS.  Reprojection
//! (see [`Reproject`]) re-expresses positions and rebuilds the spatial index;
//! ids, topology and edge lengths are untouched.  Lengths are physical metres
//! whatever the CRS.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over `[x, y]` answers nearest-node queries with
//! plain Euclidean distance in the graph's CRS units.

use geo::{Coord, LineString};
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use sn_core::{AttrTable, AttrValue, CoreResult, Crs, EdgeId, NodeId, Reproject, Transformer};

use crate::{NetworkError, NetworkResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: an `[x, y]` point with the
/// associated `NodeId`.
#[derive(Clone, Debug)]
struct NodeEntry {
    point: [f64; 2],
    id:    NodeId,
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

fn spatial_index(positions: &[Coord<f64>]) -> RTree<NodeEntry> {
    let entries: Vec<NodeEntry> = positions
        .iter()
        .enumerate()
        .map(|(i, c)| NodeEntry { point: [c.x, c.y], id: NodeId(i as u32) })
        .collect();
    RTree::bulk_load(entries)
}

// ── NetworkGraph ──────────────────────────────────────────────────────────────

/// Directed street multigraph in CSR format plus a spatial index for node
/// snapping.
///
/// Topology arrays are `pub` for direct indexed access on hot paths.  Node
/// positions are private because they are tied to the CRS and the spatial
/// index.  Do not construct directly; use [`NetworkGraphBuilder`].
#[derive(Clone, Debug)]
pub struct NetworkGraph {
    crs: Crs,

    // ── Node data ─────────────────────────────────────────────────────────
    node_pos: Vec<Coord<f64>>,

    /// Backend identifier of each node (e.g. an OSM node id).  Indexed by
    /// `NodeId`.
    pub node_source_id: Vec<u64>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    pub edge_from: Vec<NodeId>,
    pub edge_to: Vec<NodeId>,

    /// Physical length of each edge in metres; the routing weight.
    pub edge_length_m: Vec<f64>,

    /// Distinguishes parallel edges between the same ordered node pair.
    pub edge_key: Vec<u32>,

    // ── Attributes ────────────────────────────────────────────────────────
    pub node_attrs: AttrTable,
    pub edge_attrs: AttrTable,

    source_index: FxHashMap<u64, NodeId>,

    // ── Spatial index ─────────────────────────────────────────────────────
    spatial_idx: RTree<NodeEntry>,
}

impl NetworkGraph {
    /// Construct an empty network with no nodes or edges.
    pub fn empty(crs: Crs) -> Self {
        NetworkGraph {
            crs,
            node_pos: Vec::new(),
            node_source_id: Vec::new(),
            node_out_start: vec![0],
            edge_from: Vec::new(),
            edge_to: Vec::new(),
            edge_length_m: Vec::new(),
            edge_key: Vec::new(),
            node_attrs: AttrTable::default(),
            edge_attrs: AttrTable::default(),
            source_index: FxHashMap::default(),
            spatial_idx: RTree::new(),
        }
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    #[inline]
    pub fn crs(&self) -> Crs {
        self.crs.clone()
    }

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    #[inline]
    pub fn contains_node(&self, node: NodeId) -> bool {
        node.index() < self.node_pos.len()
    }

    // ── Node data ─────────────────────────────────────────────────────────

    /// Position of `node` in the graph's CRS.
    #[inline]
    pub fn node_pos(&self, node: NodeId) -> Option<Coord<f64>> {
        self.node_pos.get(node.index()).copied()
    }

    pub fn positions(&self) -> &[Coord<f64>] {
        &self.node_pos
    }

    pub fn source_id(&self, node: NodeId) -> Option<u64> {
        self.node_source_id.get(node.index()).copied()
    }

    /// Resolve a backend identifier to its `NodeId`.
    pub fn node_by_source(&self, source_id: u64) -> Option<NodeId> {
        self.source_index.get(&source_id).copied()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// The straight segment from the edge's source to its target.
    pub fn edge_geometry(&self, edge: EdgeId) -> LineString<f64> {
        let from = self.node_pos[self.edge_from[edge.index()].index()];
        let to = self.node_pos[self.edge_to[edge.index()].index()];
        LineString::from(vec![from, to])
    }

    /// Number of distinct neighbours of each node, either direction.
    pub fn street_counts(&self) -> Vec<u32> {
        let mut neighbours: Vec<Vec<NodeId>> = vec![Vec::new(); self.node_count()];
        for (from, to) in self.edge_from.iter().zip(&self.edge_to) {
            if from != to {
                neighbours[from.index()].push(*to);
                neighbours[to.index()].push(*from);
            }
        }
        neighbours
            .into_iter()
            .map(|mut n| {
                n.sort_unstable();
                n.dedup();
                n.len() as u32
            })
            .collect()
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// The node nearest to `pos` (Euclidean, graph CRS units).
    ///
    /// Among equidistant nodes the lowest `NodeId` wins.  Returns `None` only
    /// if the network has no nodes.
    pub fn nearest_node(&self, pos: Coord<f64>) -> Option<NodeId> {
        let mut candidates = self
            .spatial_idx
            .nearest_neighbor_iter_with_distance_2(&[pos.x, pos.y]);
        let (first, best_d2) = candidates.next()?;
        let mut best = first.id;
        for (entry, d2) in candidates {
            if d2 > best_d2 {
                break;
            }
            best = best.min(entry.id);
        }
        Some(best)
    }
}

impl Reproject for NetworkGraph {
    fn crs(&self) -> Crs {
        NetworkGraph::crs(self)
    }

    fn reproject(&self, transformer: &Transformer) -> CoreResult<Self> {
        let node_pos = transformer.transform_all(&self.node_pos)?;
        let spatial_idx = spatial_index(&node_pos);
        Ok(NetworkGraph {
            crs: transformer.to().clone(),
            node_pos,
            spatial_idx,
            ..self.clone()
        })
    }
}

// ── NetworkGraphBuilder ───────────────────────────────────────────────────────

/// Construct a [`NetworkGraph`] incrementally, then call [`build`](Self::build).
///
/// The builder accepts nodes and directed edges in any order.  `build()`
/// sorts edges by source node, constructs the CSR arrays, assigns parallel
/// edge keys, assembles attribute tables and bulk-loads the R-tree.
///
/// # Example
///
/// ```
/// use sn_core::{Crs, GeoPoint};
/// use sn_network::NetworkGraphBuilder;
///
/// let mut b = NetworkGraphBuilder::new(Crs::Wgs84);
/// let a = b.add_node(101, GeoPoint::new(30.69, -88.04).to_coord());
/// let c = b.add_node(102, GeoPoint::new(30.70, -88.03).to_coord());
/// b.add_road(a, c, 1_450.0);
/// let net = b.build().unwrap();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 2); // bidirectional
/// ```
pub struct NetworkGraphBuilder {
    crs:          Crs,
    nodes:        Vec<RawNode>,
    raw_edges:    Vec<RawEdge>,
    source_index: FxHashMap<u64, NodeId>,
}

struct RawNode {
    pos:       Coord<f64>,
    source_id: u64,
    attrs:     Vec<(String, AttrValue)>,
}

struct RawEdge {
    from:     NodeId,
    to:       NodeId,
    length_m: f64,
    attrs:    Vec<(String, AttrValue)>,
}

impl NetworkGraphBuilder {
    /// An empty builder whose positions will be in `crs`.
    pub fn new(crs: Crs) -> Self {
        Self::with_capacity(crs, 0, 0)
    }

    /// Pre-allocate for the expected number of nodes and edges.
    pub fn with_capacity(crs: Crs, nodes: usize, edges: usize) -> Self {
        Self {
            crs,
            nodes:        Vec::with_capacity(nodes),
            raw_edges:    Vec::with_capacity(edges),
            source_index: FxHashMap::default(),
        }
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    ///
    /// Adding a `source_id` that already exists returns the existing node and
    /// leaves it unchanged.
    pub fn add_node(&mut self, source_id: u64, pos: Coord<f64>) -> NodeId {
        self.add_node_with(source_id, pos, Vec::new())
    }

    /// Like [`add_node`](Self::add_node), with attribute values.
    pub fn add_node_with(
        &mut self,
        source_id: u64,
        pos: Coord<f64>,
        attrs: Vec<(String, AttrValue)>,
    ) -> NodeId {
        if let Some(&id) = self.source_index.get(&source_id) {
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(RawNode { pos, source_id, attrs });
        self.source_index.insert(source_id, id);
        id
    }

    /// Add a **directed** edge from `from` to `to` of `length_m` metres.
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, length_m: f64) {
        self.add_directed_edge_with(from, to, length_m, Vec::new());
    }

    /// Like [`add_directed_edge`](Self::add_directed_edge), with attribute values.
    pub fn add_directed_edge_with(
        &mut self,
        from: NodeId,
        to: NodeId,
        length_m: f64,
        attrs: Vec<(String, AttrValue)>,
    ) {
        self.raw_edges.push(RawEdge { from, to, length_m, attrs });
    }

    /// Convenience: add edges in **both directions** for a two-way street.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, length_m: f64) {
        self.add_road_with(a, b, length_m, Vec::new());
    }

    pub fn add_road_with(&mut self, a: NodeId, b: NodeId, length_m: f64, attrs: Vec<(String, AttrValue)>) {
        self.add_directed_edge_with(a, b, length_m, attrs.clone());
        self.add_directed_edge_with(b, a, length_m, attrs);
    }

    /// Look up the position of a node added earlier.
    pub fn node_pos(&self, id: NodeId) -> Option<Coord<f64>> {
        self.nodes.get(id.index()).map(|n| n.pos)
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`NetworkGraph`].
    ///
    /// # Errors
    ///
    /// [`NetworkError::InvalidEdge`] if an edge references an unknown node or
    /// has a negative or non-finite length.
    pub fn build(self) -> NetworkResult<NetworkGraph> {
        let node_count = self.nodes.len();

        for e in &self.raw_edges {
            let reason = if e.from.index() >= node_count || e.to.index() >= node_count {
                Some("unknown endpoint".to_string())
            } else if !(e.length_m.is_finite() && e.length_m >= 0.0) {
                Some(format!("length {} is not a non-negative number", e.length_m))
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(NetworkError::InvalidEdge { from: e.from, to: e.to, reason });
            }
        }

        // Stable sort keeps insertion order among a node's outgoing edges.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);
        let edge_count = raw.len();

        let edge_from:     Vec<NodeId> = raw.iter().map(|e| e.from).collect();
        let edge_to:       Vec<NodeId> = raw.iter().map(|e| e.to).collect();
        let edge_length_m: Vec<f64>    = raw.iter().map(|e| e.length_m).collect();

        let mut seen: FxHashMap<(NodeId, NodeId), u32> = FxHashMap::default();
        let edge_key: Vec<u32> = raw
            .iter()
            .map(|e| {
                let k = seen.entry((e.from, e.to)).or_insert(0);
                *k += 1;
                *k - 1
            })
            .collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let edge_attrs = attr_table(raw.into_iter().map(|e| e.attrs), edge_count)?;

        let node_pos: Vec<Coord<f64>> = self.nodes.iter().map(|n| n.pos).collect();
        let node_source_id: Vec<u64> = self.nodes.iter().map(|n| n.source_id).collect();
        let node_attrs = attr_table(self.nodes.into_iter().map(|n| n.attrs), node_count)?;
        let spatial_idx = spatial_index(&node_pos);

        Ok(NetworkGraph {
            crs: self.crs,
            node_pos,
            node_source_id,
            node_out_start,
            edge_from,
            edge_to,
            edge_length_m,
            edge_key,
            node_attrs,
            edge_attrs,
            source_index: self.source_index,
            spatial_idx,
        })
    }
}

/// Assemble per-row `(name, value)` lists into columns.  Columns appear in
/// first-seen order; rows lacking a column get `Null`.
fn attr_table(
    rows: impl Iterator<Item = Vec<(String, AttrValue)>>,
    row_count: usize,
) -> NetworkResult<AttrTable> {
    let mut columns: Vec<(String, Vec<AttrValue>)> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    for (row, attrs) in rows.enumerate() {
        for (name, value) in attrs {
            let col = *index.entry(name.clone()).or_insert_with(|| {
                columns.push((name, vec![AttrValue::Null; row_count]));
                columns.len() - 1
            });
            columns[col].1[row] = value;
        }
    }
    let mut table = AttrTable::with_rows(row_count);
    for (name, values) in columns {
        table.insert_column(name, values)?;
    }
    Ok(table)
}
