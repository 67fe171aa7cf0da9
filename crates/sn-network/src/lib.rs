//! `sn-network` — street network, lazy network cache, and snapping.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                    |
//! |----------------|-------------------------------------------------------------|
//! | [`graph`]      | `NetworkGraph` (CSR + R-tree), `NetworkGraphBuilder`        |
//! | [`descriptor`] | `ExtentDescriptor`, `GraphBackend` trait, `NoBackend`       |
//! | [`cache`]      | `NetworkCache` (Unfetched → Fetched → Projected)            |
//! | [`views`]      | `NodeView`, `EdgeView`                                      |
//! | [`snap`]       | `NodeSnapper`, `SnappedPoint`, `SnappedBatch`               |
//! | [`osm`]        | `OsmPbfBackend` (feature = `"osm"` only)                    |
//! | [`error`]      | `NetworkError`, `NetworkResult<T>`                          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `osm`   | Enables the OSM PBF backend via the `osmpbf` crate.          |
//! | `serde` | Derives `Serialize`/`Deserialize` on view types.             |

pub mod cache;
pub mod descriptor;
pub mod error;
pub mod graph;
pub mod snap;
pub mod views;

#[cfg(feature = "osm")]
pub mod osm;

#[cfg(test)]
mod tests;

pub use cache::NetworkCache;
pub use descriptor::{CustomFetch, ExtentDescriptor, GraphBackend, NoBackend};
pub use error::{NetworkError, NetworkResult};
pub use graph::{NetworkGraph, NetworkGraphBuilder};
pub use snap::{NodeSnapper, SnappedBatch, SnappedPoint};
pub use views::{EdgeRow, EdgeView, NodeRow, NodeView};
