//! Named, first-write-wins store of (geometry, render metadata) pairs.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{GeometryCollection, GeometryError, GeometryResult, RenderMetadata, StyleDefaults, StyleOverrides};

/// One cached collection and how to draw it.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheEntry {
    pub geometry: GeometryCollection,
    pub style:    RenderMetadata,
}

/// Geometry collections keyed by name, in insertion order.
///
/// `put` never overwrites: once a key is present, later puts are no-ops.
/// Callers that want to refresh an entry `remove` it first.
#[derive(Debug, Default)]
pub struct GeometryCache {
    entries:  Vec<(String, CacheEntry)>,
    index:    FxHashMap<String, usize>,
    defaults: StyleDefaults,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: StyleDefaults) -> Self {
        Self { defaults, ..Self::default() }
    }

    pub fn defaults(&self) -> &StyleDefaults {
        &self.defaults
    }

    /// Store `geometry` under `key` unless the key is taken.  Returns `true`
    /// if the entry was inserted.
    pub fn put(&mut self, key: impl Into<String>, geometry: GeometryCollection, style: RenderMetadata) -> bool {
        let key = key.into();
        if self.index.contains_key(&key) {
            debug!(key = %key, "geometry already cached; put ignored");
            return false;
        }
        debug!(key = %key, rows = geometry.len(), kind = %style.kind, "caching geometry");
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, CacheEntry { geometry, style }));
        true
    }

    /// [`put`](Self::put) with metadata resolved from the cache defaults and
    /// the collection's shape kind.
    pub fn put_styled(&mut self, key: impl Into<String>, geometry: GeometryCollection, overrides: &StyleOverrides) -> bool {
        let style = self.defaults.resolve(geometry.shape_kind(), overrides);
        self.put(key, geometry, style)
    }

    /// # Errors
    ///
    /// [`GeometryError::NotFound`] if nothing is cached under `key`.
    pub fn get(&self, key: &str) -> GeometryResult<&CacheEntry> {
        self.index
            .get(key)
            .map(|&i| &self.entries[i].1)
            .ok_or_else(|| GeometryError::NotFound(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let i = self.index.remove(key)?;
        let (_, entry) = self.entries.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(entry)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CacheEntry)> + '_ {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }
}
