//! CSV output.
//!
//! Writes up to four files into one directory:
//! - `nodes.csv`: `id, source_id, x, y, street_count`
//! - `edges.csv`: `id, from, to, key, length_m`
//! - `paths.csv`: `pair, origin, destination, weight_sum, route_dist, osmids`
//! - `failures.csv`: `pair, origin, destination, reason`
//!
//! Node ids are the graph-local `NodeId`s; `source_id`/`osmids` carry the
//! backend identifiers.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use csv::Writer;
use tracing::info;

use sn_network::{EdgeView, NodeView};

use crate::{RouteBatch, RouteResult};

pub struct CsvExporter {
    dir: PathBuf,
}

impl CsvExporter {
    /// Create `dir` (and parents) if needed.
    pub fn new(dir: impl Into<PathBuf>) -> RouteResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write_nodes(&self, nodes: &NodeView) -> RouteResult<PathBuf> {
        let (path, mut w) = self.open("nodes.csv")?;
        w.write_record(["id", "source_id", "x", "y", "street_count"])?;
        for row in nodes {
            w.write_record(&[
                row.id.0.to_string(),
                row.source_id.to_string(),
                row.x.to_string(),
                row.y.to_string(),
                row.street_count.to_string(),
            ])?;
        }
        w.flush()?;
        info!(path = %path.display(), rows = nodes.len(), "wrote nodes");
        Ok(path)
    }

    pub fn write_edges(&self, edges: &EdgeView) -> RouteResult<PathBuf> {
        let (path, mut w) = self.open("edges.csv")?;
        w.write_record(["id", "from", "to", "key", "length_m"])?;
        for row in edges {
            w.write_record(&[
                row.id.0.to_string(),
                row.from.0.to_string(),
                row.to.0.to_string(),
                row.key.to_string(),
                row.length_m.to_string(),
            ])?;
        }
        w.flush()?;
        info!(path = %path.display(), rows = edges.len(), "wrote edges");
        Ok(path)
    }

    /// Write `paths.csv` and `failures.csv`; returns their paths in that order.
    pub fn write_batch(&self, batch: &RouteBatch) -> RouteResult<(PathBuf, PathBuf)> {
        let (paths_file, mut w) = self.open("paths.csv")?;
        w.write_record(["pair", "origin", "destination", "weight_sum", "route_dist", "osmids"])?;
        for p in batch.paths() {
            w.write_record(&[
                p.pair.to_string(),
                p.origin.0.to_string(),
                p.destination.0.to_string(),
                p.weight_sum.to_string(),
                p.route_dist.to_string(),
                p.node_key.clone(),
            ])?;
        }
        w.flush()?;

        let (failures_file, mut w) = self.open("failures.csv")?;
        w.write_record(["pair", "origin", "destination", "reason"])?;
        for f in batch.failures() {
            w.write_record(&[
                f.pair.to_string(),
                f.origin.0.to_string(),
                f.destination.0.to_string(),
                f.reason.to_string(),
            ])?;
        }
        w.flush()?;

        info!(
            dir = %self.dir.display(),
            paths = batch.paths().len(),
            failures = batch.failures().len(),
            "wrote route batch"
        );
        Ok((paths_file, failures_file))
    }

    fn open(&self, name: &str) -> RouteResult<(PathBuf, Writer<File>)> {
        let path = self.dir.join(name);
        let writer = Writer::from_path(&path)?;
        Ok((path, writer))
    }
}
