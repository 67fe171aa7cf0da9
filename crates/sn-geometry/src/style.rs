//! Render metadata derived from shape kind, shared defaults and per-call
//! overrides.
//!
//! | Field                     | Point / Polygon / Mixed | Line | Empty |
//! |---------------------------|-------------------------|------|-------|
//! | `color`, `alpha`          | yes                     | yes  | yes   |
//! | `marker`, `markersize`    | yes                     | –    | –     |
//! | `linewidth`, `linestyle`  | –                       | yes  | –     |
//!
//! An explicitly overridden field is always present, whatever the shape kind,
//! and so is every `extra` key.  Rendering itself happens elsewhere.

use std::collections::BTreeMap;

use crate::ShapeKind;

/// Shared fallback values.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StyleDefaults {
    pub color:      String,
    pub alpha:      f64,
    pub linewidth:  f64,
    pub linestyle:  String,
    pub markersize: f64,
    pub marker:     String,
}

impl Default for StyleDefaults {
    fn default() -> Self {
        Self {
            color:      "gray".to_string(),
            alpha:      0.5,
            linewidth:  0.7,
            linestyle:  "-".to_string(),
            markersize: 20.0,
            marker:     "o".to_string(),
        }
    }
}

/// Caller-supplied values; `None` falls back to [`StyleDefaults`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StyleOverrides {
    pub color:      Option<String>,
    pub alpha:      Option<f64>,
    pub linewidth:  Option<f64>,
    pub linestyle:  Option<String>,
    pub markersize: Option<f64>,
    pub marker:     Option<String>,
    /// Renderer-specific keys passed through untouched.
    pub extra:      BTreeMap<String, String>,
}

impl StyleOverrides {
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    pub fn linewidth(mut self, linewidth: f64) -> Self {
        self.linewidth = Some(linewidth);
        self
    }

    pub fn markersize(mut self, markersize: f64) -> Self {
        self.markersize = Some(markersize);
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Resolved render fields for one cached collection.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderMetadata {
    pub kind:       ShapeKind,
    pub color:      String,
    pub alpha:      f64,
    pub linewidth:  Option<f64>,
    pub linestyle:  Option<String>,
    pub markersize: Option<f64>,
    pub marker:     Option<String>,
    pub extra:      BTreeMap<String, String>,
}

impl StyleDefaults {
    pub fn resolve(&self, kind: ShapeKind, overrides: &StyleOverrides) -> RenderMetadata {
        let markers = matches!(kind, ShapeKind::Point | ShapeKind::Polygon | ShapeKind::Mixed);
        let lines = kind == ShapeKind::Line;

        RenderMetadata {
            kind,
            color:      overrides.color.clone().unwrap_or_else(|| self.color.clone()),
            alpha:      overrides.alpha.unwrap_or(self.alpha),
            linewidth:  pick(lines, overrides.linewidth, self.linewidth),
            linestyle:  pick(lines, overrides.linestyle.clone(), self.linestyle.clone()),
            markersize: pick(markers, overrides.markersize, self.markersize),
            marker:     pick(markers, overrides.marker.clone(), self.marker.clone()),
            extra:      overrides.extra.clone(),
        }
    }
}

fn pick<T>(applies: bool, overridden: Option<T>, default: T) -> Option<T> {
    match overridden {
        Some(v) => Some(v),
        None if applies => Some(default),
        None => None,
    }
}
