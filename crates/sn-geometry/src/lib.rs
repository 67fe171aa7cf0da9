//! `sn-geometry` — geometry collections and the named geometry cache.
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`collection`] | `GeometryCollection`, `ShapeKind`                         |
//! | [`style`]      | `StyleDefaults`, `StyleOverrides`, `RenderMetadata`       |
//! | [`cache`]      | `GeometryCache`, `CacheEntry`                             |
//! | [`features`]   | `FeatureBackend` trait, `TagQuery`, `NoFeatures`          |
//! | [`error`]      | `GeometryError`, `GeometryResult<T>`                      |

pub mod cache;
pub mod collection;
pub mod error;
pub mod features;
pub mod style;


pub use cache::{CacheEntry, GeometryCache};
pub use collection::{GeometryCollection, ShapeKind};
pub use error::{GeometryError, GeometryResult};
pub use features::{FeatureBackend, NoFeatures, TagMatch, TagQuery};
pub use style::{RenderMetadata, StyleDefaults, StyleOverrides};
