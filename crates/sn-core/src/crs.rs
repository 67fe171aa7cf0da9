//! Coordinate reference systems and idempotent reprojection.
//!
//! # Identity
//!
//! `Crs` compares structurally.  Parsing normalizes the common systems to
//! named variants, so `"EPSG:32616".parse::<Crs>()` equals
//! `Crs::Utm { zone: 16, hemisphere: Hemisphere::North }` regardless of where
//! either value came from.  Any other EPSG code becomes [`Crs::Epsg`]; a
//! PROJ.4 definition becomes [`Crs::Proj`] with its whitespace collapsed.
//! Two different spellings of the same PROJ.4 definition are different CRSs.
//!
//! # Gate
//!
//! [`to_crs`] and [`CrsRegistry::to_crs`] hand the collection straight back
//! when its CRS already equals the target.  That equality check is the only
//! gate; there is no separate dirty flag, so calling either twice with the
//! same target is cheap.

use std::borrow::Cow;
use std::collections::hash_map::Entry;
use std::fmt;
use std::str::FromStr;

use proj4rs::proj::Proj;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::projection::Transformer;
use crate::{CoreError, CoreResult};

// ── Crs ───────────────────────────────────────────────────────────────────────

/// Hemisphere of a UTM zone (selects the false northing).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Hemisphere {
    North,
    South,
}

/// A coordinate reference system.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Crs {
    /// Geographic WGS-84 (EPSG:4326); `x` = longitude, `y` = latitude.
    #[default]
    Wgs84,
    /// Spherical Web Mercator (EPSG:3857), metres.
    WebMercator,
    /// Universal Transverse Mercator on WGS-84 (EPSG:326zz / 327zz), metres.
    Utm { zone: u8, hemisphere: Hemisphere },
    /// Any other EPSG code known to the bundled definitions.
    Epsg(u16),
    /// A PROJ.4 definition string.
    Proj(String),
}

impl Crs {
    /// EPSG code, if this CRS has one.
    pub fn epsg(&self) -> Option<u16> {
        match self {
            Crs::Wgs84 => Some(4326),
            Crs::WebMercator => Some(3857),
            Crs::Utm { zone, hemisphere: Hemisphere::North } => Some(32600 + u16::from(*zone)),
            Crs::Utm { zone, hemisphere: Hemisphere::South } => Some(32700 + u16::from(*zone)),
            Crs::Epsg(code) => Some(*code),
            Crs::Proj(_) => None,
        }
    }

    /// Resolve an EPSG code.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownCrs`] if the code has no bundled definition.
    pub fn from_epsg(code: u32) -> CoreResult<Crs> {
        let crs = match code {
            4326 => Crs::Wgs84,
            3857 | 900913 => Crs::WebMercator,
            32601..=32660 => Crs::Utm {
                zone:       (code - 32600) as u8,
                hemisphere: Hemisphere::North,
            },
            32701..=32760 => Crs::Utm {
                zone:       (code - 32700) as u8,
                hemisphere: Hemisphere::South,
            },
            other => {
                let code = u16::try_from(other).map_err(|_| CoreError::UnknownCrs(format!("EPSG:{other}")))?;
                Crs::Epsg(code)
            }
        };
        crs.to_proj()?;
        Ok(crs)
    }

    /// Wrap a PROJ.4 definition such as `"+proj=lcc +lat_1=33 ..."`.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownCrs`] if the definition does not parse.
    pub fn from_proj_string(definition: &str) -> CoreResult<Crs> {
        let normalized = definition.split_whitespace().collect::<Vec<_>>().join(" ");
        let crs = Crs::Proj(normalized);
        crs.to_proj()?;
        Ok(crs)
    }

    /// `true` for latitude/longitude systems (units are degrees).
    pub fn is_geographic(&self) -> bool {
        match self {
            Crs::Wgs84 => true,
            Crs::WebMercator | Crs::Utm { .. } => false,
            other => other.to_proj().is_ok_and(|p| p.is_latlong()),
        }
    }

    /// The projection definition behind this CRS.
    pub(crate) fn to_proj(&self) -> CoreResult<Proj> {
        let unknown = |_| CoreError::UnknownCrs(self.to_string());
        match self {
            Crs::Wgs84 => Proj::from_proj_string("+proj=longlat +datum=WGS84 +no_defs").map_err(unknown),
            Crs::WebMercator => Proj::from_proj_string(
                "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs",
            )
            .map_err(unknown),
            Crs::Utm { zone, hemisphere } => {
                let south = match hemisphere {
                    Hemisphere::North => "",
                    Hemisphere::South => " +south",
                };
                Proj::from_proj_string(&format!("+proj=utm +zone={zone}{south} +datum=WGS84 +units=m +no_defs"))
                    .map_err(unknown)
            }
            Crs::Epsg(code) => Proj::from_epsg_code(*code).map_err(unknown),
            Crs::Proj(definition) => Proj::from_proj_string(definition).map_err(unknown),
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self, self.epsg()) {
            (Crs::Proj(definition), _) => f.write_str(definition),
            (_, Some(code)) => write!(f, "EPSG:{code}"),
            (_, None) => f.write_str("unknown"),
        }
    }
}

impl FromStr for Crs {
    type Err = CoreError;

    /// Accepts `"EPSG:32616"`, `"epsg:4326"`, a bare `"3857"`, `"WGS84"` or
    /// a PROJ.4 definition starting with `+proj=`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("wgs84") || trimmed.eq_ignore_ascii_case("wgs-84") {
            return Ok(Crs::Wgs84);
        }
        if trimmed.starts_with("+proj=") {
            return Crs::from_proj_string(trimmed);
        }
        let code = match trimmed.split_once(':') {
            Some((authority, code)) if authority.eq_ignore_ascii_case("epsg") => code,
            Some(_) => return Err(CoreError::UnknownCrs(s.to_string())),
            None => trimmed,
        };
        code.trim()
            .parse::<u32>()
            .map_err(|_| CoreError::UnknownCrs(s.to_string()))
            .and_then(Crs::from_epsg)
    }
}

// ── Reproject ─────────────────────────────────────────────────────────────────

/// A geometry collection that knows its CRS and can be re-expressed in another.
///
/// Implementors produce a **new** value; the original is left untouched.  All
/// coordinates of one collection share a single CRS.
pub trait Reproject: Sized {
    /// The CRS every coordinate of this collection is expressed in.
    fn crs(&self) -> Crs;

    /// Return a copy with every coordinate passed through `transformer`.
    ///
    /// Callers guarantee `transformer.from() == &self.crs()`.
    fn reproject(&self, transformer: &Transformer) -> CoreResult<Self>;
}

/// Reproject `collection` to `target`, or return it unchanged if it is already
/// there.
pub fn to_crs<T: Reproject>(target: Crs, collection: T) -> CoreResult<T> {
    let from = collection.crs();
    if from == target {
        return Ok(collection);
    }
    collection.reproject(&Transformer::new(from, target)?)
}

// ── CrsRegistry ───────────────────────────────────────────────────────────────

/// Memoizes transformers between CRS pairs and counts how many transforms
/// actually ran.
///
/// One registry per pipeline instance; it is plain owned state, not a global.
#[derive(Debug, Default)]
pub struct CrsRegistry {
    transformers: FxHashMap<(Crs, Crs), Transformer>,
    applied:      usize,
}

impl CrsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The (cached) transformer from `from` to `to`.
    pub fn transformer(&mut self, from: &Crs, to: &Crs) -> CoreResult<&Transformer> {
        match self.transformers.entry((from.clone(), to.clone())) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => Ok(e.insert(Transformer::new(from.clone(), to.clone())?)),
        }
    }

    /// Consuming reprojection.  Returns `collection` itself when its CRS
    /// already equals `target`.
    pub fn to_crs<T: Reproject>(&mut self, target: Crs, collection: T) -> CoreResult<T> {
        let from = collection.crs();
        if from == target {
            trace!("to_crs: already in {target}, skipping");
            return Ok(collection);
        }
        let out = collection.reproject(self.transformer(&from, &target)?)?;
        self.applied += 1;
        Ok(out)
    }

    /// Borrowing reprojection.  Returns `Cow::Borrowed(collection)` (the same
    /// value, not a copy) when no transform is needed.
    pub fn to_crs_ref<'a, T: Reproject + Clone>(
        &mut self,
        target: Crs,
        collection: &'a T,
    ) -> CoreResult<Cow<'a, T>> {
        let from = collection.crs();
        if from == target {
            return Ok(Cow::Borrowed(collection));
        }
        let out = collection.reproject(self.transformer(&from, &target)?)?;
        self.applied += 1;
        Ok(Cow::Owned(out))
    }

    /// Number of reprojections that actually transformed coordinates.
    pub fn transforms_applied(&self) -> usize {
        self.applied
    }
}
