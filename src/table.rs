use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::ranking::SortKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
    Text,
    Int,
    Float,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn text(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ColumnKind::Text,
        }
    }

    pub fn int(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ColumnKind::Int,
        }
    }

    pub fn float(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ColumnKind::Float,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Int(i64),
    Float(f64),
    Null,
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<u32> for Cell {
    fn from(value: u32) -> Self {
        Cell::Int(i64::from(value))
    }
}

impl From<u64> for Cell {
    fn from(value: u64) -> Self {
        Cell::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<usize> for Cell {
    fn from(value: usize) -> Self {
        Cell::Int(value as i64)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Null)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Int(v) => write!(f, "{v}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Null => Ok(()),
        }
    }
}

/// Total order over cells. Numbers compare numerically across int/float, text sorts after
/// numbers, and null is greater than everything.
pub fn compare_cells(a: &Cell, b: &Cell) -> Ordering {
    fn class(c: &Cell) -> u8 {
        match c {
            Cell::Int(_) | Cell::Float(_) => 0,
            Cell::Text(_) => 1,
            Cell::Null => 2,
        }
    }
    match (a, b) {
        (Cell::Int(x), Cell::Int(y)) => x.cmp(y),
        (Cell::Text(x), Cell::Text(y)) => x.cmp(y),
        (Cell::Null, Cell::Null) => Ordering::Equal,
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => class(a).cmp(&class(b)),
        },
    }
}

/// A materialized report: typed columns, rows of cells, and the metadata the view
/// pipeline needs (the report's own ordering and which columns free-text search hits).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
    #[serde(skip)]
    pub default_order: Vec<SortKey>,
    #[serde(skip)]
    pub search_columns: Vec<String>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            default_order: Vec::new(),
            search_columns: Vec::new(),
        }
    }

    pub fn with_default_order(mut self, keys: Vec<SortKey>) -> Self {
        self.default_order = keys;
        self
    }

    pub fn with_search_columns(mut self, columns: &[&str]) -> Self {
        self.search_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Same columns and metadata, different rows.
    pub fn with_rows(&self, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            columns: self.columns.clone(),
            rows,
            default_order: self.default_order.clone(),
            search_columns: self.search_columns.clone(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// All values of one column, top to bottom.
    pub fn column_values(&self, column: &str) -> Vec<&Cell> {
        let Some(col) = self.column_index(column) else {
            return Vec::new();
        };
        self.rows.iter().filter_map(|r| r.get(col)).collect()
    }
}
