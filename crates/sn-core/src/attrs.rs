//! Column-oriented attribute tables attached to nodes, edges and features.
//!
//! Backends hand over whatever tags they have; some arrive as variable-length
//! lists (an edge that merges two named streets carries `name = ["A", "B"]`).
//! Lists cannot take part in hashing (`distinct`, grouping, selection keys),
//! so a table is sanitized once with [`AttrTable::make_hashable`], which
//! rewrites every list-bearing column as text in place.

use std::fmt;

use rustc_hash::FxHashSet;

use crate::{CoreError, CoreResult};

// ── AttrValue ─────────────────────────────────────────────────────────────────

/// One cell of an attribute table.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttrValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Variable-length value; the only unhashable variant.
    List(Vec<AttrValue>),
}

impl AttrValue {
    #[inline]
    pub fn is_hashable(&self) -> bool {
        !matches!(self, AttrValue::List(_))
    }

    /// Lists become their text rendering; everything else is returned as is.
    pub fn into_hashable(self) -> AttrValue {
        match self {
            AttrValue::List(_) => AttrValue::Text(self.to_string()),
            other => other,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Null => Ok(()),
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Int(i) => write!(f, "{i}"),
            AttrValue::Float(x) => write!(f, "{x}"),
            AttrValue::Text(s) => f.write_str(s),
            AttrValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match item {
                        AttrValue::Text(s) => write!(f, "'{s}'")?,
                        other => write!(f, "{other}")?,
                    }
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        AttrValue::Int(i)
    }
}

impl From<f64> for AttrValue {
    fn from(x: f64) -> Self {
        AttrValue::Float(x)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

/// Hash key for a hashable cell.  Floats hash by bit pattern.
#[derive(PartialEq, Eq, Hash)]
enum CellKey<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    Text(&'a str),
}

impl<'a> CellKey<'a> {
    fn of(value: &'a AttrValue) -> Option<Self> {
        Some(match value {
            AttrValue::Null => CellKey::Null,
            AttrValue::Bool(b) => CellKey::Bool(*b),
            AttrValue::Int(i) => CellKey::Int(*i),
            AttrValue::Float(x) => CellKey::Float(x.to_bits()),
            AttrValue::Text(s) => CellKey::Text(s),
            AttrValue::List(_) => return None,
        })
    }
}

// ── AttrTable ─────────────────────────────────────────────────────────────────

/// Named columns of equal length, kept in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttrTable {
    rows:      usize,
    columns:   Vec<(String, Vec<AttrValue>)>,
    sanitized: bool,
}

impl AttrTable {
    /// An empty table with `rows` rows and no columns.
    pub fn with_rows(rows: usize) -> Self {
        Self { rows, columns: Vec::new(), sanitized: false }
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&[AttrValue]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    pub fn get(&self, name: &str, row: usize) -> Option<&AttrValue> {
        self.column(name).and_then(|values| values.get(row))
    }

    /// Add or replace a column.  Its length must match the table.
    pub fn insert_column(&mut self, name: impl Into<String>, values: Vec<AttrValue>) -> CoreResult<()> {
        let name = name.into();
        if values.len() != self.rows {
            return Err(CoreError::ColumnLength {
                column:   name,
                expected: self.rows,
                got:      values.len(),
            });
        }
        if values.iter().any(|v| !v.is_hashable()) {
            self.sanitized = false;
        }
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = values,
            None => self.columns.push((name, values)),
        }
        Ok(())
    }

    /// Names of columns holding at least one list value.
    pub fn unhashable_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|(_, values)| values.iter().any(|v| !v.is_hashable()))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Coerce every unhashable column to text, in place.
    ///
    /// Idempotent: after the first pass the table is flagged and later calls
    /// return immediately with `0`.  Returns the number of columns rewritten.
    pub fn make_hashable(&mut self) -> usize {
        if self.sanitized {
            return 0;
        }
        let mut rewritten = 0;
        for (_, values) in &mut self.columns {
            if values.iter().any(|v| !v.is_hashable()) {
                for v in values.iter_mut() {
                    *v = std::mem::take(v).into_hashable();
                }
                rewritten += 1;
            }
        }
        self.sanitized = true;
        rewritten
    }

    /// `true` once [`make_hashable`](Self::make_hashable) has run and no list
    /// column has been added since.
    pub fn is_sanitized(&self) -> bool {
        self.sanitized
    }

    /// Distinct values of a column in first-seen order.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnhashableColumn`] if the column still holds lists.
    pub fn distinct(&self, name: &str) -> CoreResult<Vec<AttrValue>> {
        let values = self
            .column(name)
            .ok_or_else(|| CoreError::UnknownColumn(name.to_string()))?;
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for v in values {
            let key = CellKey::of(v).ok_or_else(|| CoreError::UnhashableColumn(name.to_string()))?;
            if seen.insert(key) {
                out.push(v.clone());
            }
        }
        Ok(out)
    }

    /// A new table holding `rows` (in the given order) of every column.
    pub fn select(&self, rows: &[usize]) -> CoreResult<AttrTable> {
        if let Some(&row) = rows.iter().find(|&&r| r >= self.rows) {
            return Err(CoreError::RowOutOfRange { row, len: self.rows });
        }
        let columns = self
            .columns
            .iter()
            .map(|(name, values)| {
                (name.clone(), rows.iter().map(|&r| values[r].clone()).collect())
            })
            .collect();
        Ok(AttrTable { rows: rows.len(), columns, sanitized: self.sanitized })
    }
}

