//! `sn-core` — foundational types for the `street_net` routing workspace.
//!
//! This crate is a dependency of every other `sn-*` crate.  It intentionally
//! has no `sn-*` dependencies and few external ones (`geo`, `proj4rs`,
//! `rustc-hash`, `thiserror`, `tracing`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `EdgeId`                                        |
//! | [`geopoint`]    | `GeoPoint`, haversine distance, UTM zone lookup           |
//! | [`crs`]         | `Crs`, `Hemisphere`, `Reproject`, `to_crs`, `CrsRegistry` |
//! | [`projection`]  | `Transformer` (any EPSG code or PROJ.4 string)            |
//! | [`attrs`]       | `AttrValue`, `AttrTable` (hashable-column sanitation)     |
//! | [`error`]       | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod attrs;
pub mod crs;
pub mod error;
pub mod geopoint;
pub mod ids;
pub mod projection;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use attrs::{AttrTable, AttrValue};
pub use crs::{to_crs, Crs, CrsRegistry, Hemisphere, Reproject};
pub use error::{CoreError, CoreResult};
pub use geopoint::GeoPoint;
pub use ids::{EdgeId, NodeId};
pub use projection::Transformer;
