//! Row projections requested by callers.
//!
//! Every row is buffered in its associative form; a [`FetchShape`] only
//! decides what the caller gets back. Each shape is a pure function from
//! [`Row`] to [`ShapedRow`], so adding a shape touches this file alone.

use std::fmt;
use std::str::FromStr;

use crate::error::{CursorError, Result};
use crate::value::{Row, Value};

/// Requested row projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FetchShape {
    /// Values only, in column order.
    Indexed,
    /// Column name to value.
    #[default]
    Associative,
    /// Keyed entries followed by the same values by position.
    Mixed,
    /// First value of the row.
    Column,
}

impl FetchShape {
    /// Numeric tags accepted by [`TryFrom<i32>`].
    pub const ASSOC_CODE: i32 = 2;
    pub const NUM_CODE: i32 = 3;
    pub const BOTH_CODE: i32 = 4;
    pub const COLUMN_CODE: i32 = 7;

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Indexed => "indexed",
            Self::Associative => "associative",
            Self::Mixed => "mixed",
            Self::Column => "column",
        }
    }

    /// Project a buffered row into this shape.
    pub fn project(self, row: &Row) -> Result<ShapedRow> {
        match self {
            Self::Indexed => Ok(ShapedRow::Indexed(row.values().cloned().collect())),
            Self::Associative => Ok(ShapedRow::Associative(row.clone())),
            Self::Mixed => Ok(ShapedRow::Mixed(MixedRow::from_row(row))),
            Self::Column => row
                .value(0)
                .cloned()
                .map(ShapedRow::Column)
                .ok_or_else(|| CursorError::no_data("row has no columns")),
        }
    }

    /// Project an owned row, avoiding a clone for the associative case.
    pub fn project_owned(self, row: Row) -> Result<ShapedRow> {
        match self {
            Self::Associative => Ok(ShapedRow::Associative(row)),
            Self::Indexed => Ok(ShapedRow::Indexed(row.into_values())),
            Self::Mixed | Self::Column => self.project(&row),
        }
    }
}

impl fmt::Display for FetchShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FetchShape {
    type Err = CursorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "num" | "numeric" | "indexed" => Ok(Self::Indexed),
            "assoc" | "associative" => Ok(Self::Associative),
            "both" | "mixed" => Ok(Self::Mixed),
            "column" => Ok(Self::Column),
            other => Err(CursorError::invalid_shape(format!(
                "unsupported shape '{other}' for caching result"
            ))),
        }
    }
}

impl TryFrom<i32> for FetchShape {
    type Error = CursorError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            Self::ASSOC_CODE => Ok(Self::Associative),
            Self::NUM_CODE => Ok(Self::Indexed),
            Self::BOTH_CODE => Ok(Self::Mixed),
            Self::COLUMN_CODE => Ok(Self::Column),
            other => Err(CursorError::invalid_shape(format!(
                "unsupported shape code {other} for caching result"
            ))),
        }
    }
}

/// Row returned to the caller in the shape it asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapedRow {
    Indexed(Vec<Value>),
    Associative(Row),
    Mixed(MixedRow),
    Column(Value),
}

impl ShapedRow {
    #[must_use]
    pub const fn shape(&self) -> FetchShape {
        match self {
            Self::Indexed(_) => FetchShape::Indexed,
            Self::Associative(_) => FetchShape::Associative,
            Self::Mixed(_) => FetchShape::Mixed,
            Self::Column(_) => FetchShape::Column,
        }
    }

    #[must_use]
    pub fn into_indexed(self) -> Option<Vec<Value>> {
        match self {
            Self::Indexed(values) => Some(values),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_associative(self) -> Option<Row> {
        match self {
            Self::Associative(row) => Some(row),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_mixed(self) -> Option<MixedRow> {
        match self {
            Self::Mixed(row) => Some(row),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_column(self) -> Option<Value> {
        match self {
            Self::Column(value) => Some(value),
            _ => None,
        }
    }
}

/// Row addressable both by column name and by position.
#[derive(Debug, Clone, PartialEq)]
pub struct MixedRow {
    keyed: Row,
    positional: Vec<Value>,
}

impl MixedRow {
    fn from_row(row: &Row) -> Self {
        Self {
            keyed: row.clone(),
            positional: row.values().cloned().collect(),
        }
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.keyed.get(column)
    }

    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    #[must_use]
    pub const fn keyed(&self) -> &Row {
        &self.keyed
    }

    #[must_use]
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// Total entry count: keyed entries plus positional ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keyed.len() + self.positional.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keyed.is_empty()
    }
}
