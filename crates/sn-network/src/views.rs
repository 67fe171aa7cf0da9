//! Tabular node and edge views derived from a [`NetworkGraph`].
//!
//! A view is a snapshot: rows carry positions in the CRS the graph had when
//! the view was built.  [`NetworkCache`](crate::NetworkCache) owns the views
//! and drops them whenever the graph is replaced or reprojected.

use geo::{Coord, LineString};

use sn_core::{AttrTable, CoreError, Crs, EdgeId, NodeId};

use crate::{NetworkError, NetworkGraph, NetworkResult};

// ── NodeView ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeRow {
    pub id:           NodeId,
    pub source_id:    u64,
    pub x:            f64,
    pub y:            f64,
    pub street_count: u32,
}

impl NodeRow {
    #[inline]
    pub fn coord(&self) -> Coord<f64> {
        Coord { x: self.x, y: self.y }
    }
}

/// One row per node, in `NodeId` order, plus the node attribute table.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeView {
    crs:       Crs,
    rows:      Vec<NodeRow>,
    pub attrs: AttrTable,
}

impl NodeView {
    pub fn from_graph(graph: &NetworkGraph) -> Self {
        let street_counts = graph.street_counts();
        let rows = graph
            .positions()
            .iter()
            .enumerate()
            .map(|(i, c)| NodeRow {
                id:           NodeId(i as u32),
                source_id:    graph.node_source_id[i],
                x:            c.x,
                y:            c.y,
                street_count: street_counts[i],
            })
            .collect();
        Self { crs: graph.crs(), rows, attrs: graph.node_attrs.clone() }
    }

    pub fn crs(&self) -> Crs {
        self.crs.clone()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[NodeRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeRow> {
        self.rows.iter()
    }

    /// Row index of `id`.  Direct on a full view, a scan on a selection.
    fn row_index(&self, id: NodeId) -> Option<usize> {
        match self.rows.get(id.index()) {
            Some(row) if row.id == id => Some(id.index()),
            _ => self.rows.iter().position(|r| r.id == id),
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeRow> {
        self.row_index(id).map(|i| &self.rows[i])
    }

    pub fn position(&self, id: NodeId) -> Option<Coord<f64>> {
        self.get(id).map(NodeRow::coord)
    }

    /// The rows of `ids`, sorted by id with duplicates removed.
    ///
    /// # Errors
    ///
    /// - [`NetworkError::NodeNotFound`] for an id not in the view.
    /// - [`CoreError::UnhashableColumn`] while the attribute table still
    ///   holds list columns; sanitize it with `make_hashable` first.
    pub fn select(&self, ids: &[NodeId]) -> NetworkResult<NodeView> {
        if let Some(column) = self.attrs.unhashable_columns().first() {
            return Err(CoreError::UnhashableColumn(column.to_string()).into());
        }
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut positions = Vec::with_capacity(ids.len());
        for &id in &ids {
            positions.push(self.row_index(id).ok_or(NetworkError::NodeNotFound(id))?);
        }
        Ok(NodeView {
            crs:   self.crs.clone(),
            rows:  positions.iter().map(|&p| self.rows[p].clone()).collect(),
            attrs: self.attrs.select(&positions)?,
        })
    }
}

// ── EdgeView ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeRow {
    pub id:       EdgeId,
    pub from:     NodeId,
    pub to:       NodeId,
    pub key:      u32,
    pub length_m: f64,
    pub geometry: LineString<f64>,
}

/// One row per edge, in `EdgeId` order, plus the edge attribute table.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeView {
    crs:       Crs,
    rows:      Vec<EdgeRow>,
    pub attrs: AttrTable,
}

impl EdgeView {
    pub fn from_graph(graph: &NetworkGraph) -> Self {
        let rows = (0..graph.edge_count())
            .map(|i| {
                let id = EdgeId(i as u32);
                EdgeRow {
                    id,
                    from:     graph.edge_from[i],
                    to:       graph.edge_to[i],
                    key:      graph.edge_key[i],
                    length_m: graph.edge_length_m[i],
                    geometry: graph.edge_geometry(id),
                }
            })
            .collect();
        Self { crs: graph.crs(), rows, attrs: graph.edge_attrs.clone() }
    }

    pub fn crs(&self) -> Crs {
        self.crs.clone()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[EdgeRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EdgeRow> {
        self.rows.iter()
    }

    pub fn get(&self, id: EdgeId) -> Option<&EdgeRow> {
        self.rows.get(id.index())
    }
}

impl<'a> IntoIterator for &'a NodeView {
    type Item = &'a NodeRow;
    type IntoIter = std::slice::Iter<'a, NodeRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &'a EdgeView {
    type Item = &'a EdgeRow;
    type IntoIter = std::slice::Iter<'a, EdgeRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
