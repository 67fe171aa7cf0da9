//! `sn-points` — point sets and origin/destination pairs.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`point`]   | `Point` (coordinate + optional address)                    |
//! | [`set`]     | `CoordinateSet` (single-CRS, `Reproject`, hull/extent)     |
//! | [`loader`]  | `load_coords_csv`, `load_coords_reader`                    |
//! | [`geocode`] | `Geocoder` trait, `reverse_geocode`                        |
//! | [`od`]      | `OdPairs`                                                  |
//! | [`error`]   | `PointsError`, `PointsResult<T>`                           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod error;
pub mod geocode;
pub mod loader;
pub mod od;
pub mod point;
pub mod set;


pub use error::{PointsError, PointsResult};
pub use geocode::{reverse_geocode, Geocoder};
pub use loader::{load_coords_csv, load_coords_reader};
pub use od::{OdPairs, DEFAULT_EXTENT_BUFFER_DEG};
pub use point::Point;
pub use set::CoordinateSet;
