//! `sn-route` — shortest paths over a street network and the pipeline that
//! ties fetching, projection, snapping, routing and caching together.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                       |
//! |--------------|----------------------------------------------------------------|
//! | [`router`]   | `Router` trait, `DijkstraRouter`, `RawPath`                    |
//! | [`path`]     | `PathResult`, `RouteFailure`, `FailureReason`, `RouteBatch`    |
//! | [`planner`]  | `RoutePlanner`, `PlannerConfig`, `DivergencePolicy`            |
//! | [`pipeline`] | `StreetGraph` facade, geometry-cache keys                      |
//! | [`export`]   | `CsvExporter`                                                  |
//! | [`error`]    | `RouteError`, `RouteResult<T>`                                 |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `parallel` | Routes the pairs of a batch on Rayon's thread pool.        |
//! | `serde`    | Derives `Serialize`/`Deserialize` on results and config.   |

pub mod error;
pub mod export;
pub mod path;
pub mod pipeline;
pub mod planner;
pub mod router;

#[cfg(test)]
mod tests;

pub use error::{RouteError, RouteResult};
pub use export::CsvExporter;
pub use path::{FailureReason, PathResult, RouteBatch, RouteFailure};
pub use pipeline::{StreetGraph, DEFAULT_FEATURE_DIST_M, SHORTEST_PATH_EDGES, SHORTEST_PATH_NODES};
pub use planner::{DivergencePolicy, PlannerConfig, RoutePlanner};
pub use router::{DijkstraRouter, RawPath, Router};
