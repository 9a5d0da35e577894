//! Table model and the pull-based row source abstraction

use std::fmt;

use crate::cell::Cell;
use crate::error::{Error, Result};

/// Semantic type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Numeric column (integers and floating point values)
    Numeric,
    /// Text column
    Text,
}

impl ColumnType {
    /// Check if the column holds numbers
    pub fn is_numeric(self) -> bool {
        self == ColumnType::Numeric
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Numeric => write!(f, "numeric"),
            ColumnType::Text => write!(f, "text"),
        }
    }
}

/// Name and type of a single column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column name
    pub name: String,
    /// Semantic type
    pub column_type: ColumnType,
}

impl ColumnSpec {
    /// Create a column spec
    pub fn new<S: Into<String>>(name: S, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    /// Create a numeric column spec
    pub fn numeric<S: Into<String>>(name: S) -> Self {
        Self::new(name, ColumnType::Numeric)
    }

    /// Create a text column spec
    pub fn text<S: Into<String>>(name: S) -> Self {
        Self::new(name, ColumnType::Text)
    }
}

/// Column metadata of a table, available before any row is read
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableSpec {
    name: String,
    columns: Vec<ColumnSpec>,
}

impl TableSpec {
    /// Create a table spec
    pub fn new<S: Into<String>>(name: S, columns: Vec<ColumnSpec>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All columns in order
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get a column by index
    pub fn column(&self, index: usize) -> Result<&ColumnSpec> {
        self.columns
            .get(index)
            .ok_or(Error::ColumnOutOfBounds(index, self.columns.len()))
    }

    /// Check if any column is numeric
    pub fn has_numeric_columns(&self) -> bool {
        self.columns.iter().any(|c| c.column_type.is_numeric())
    }
}

/// A single row: a key plus one cell per column
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Row key (row ID)
    pub key: String,
    /// Cells in column order
    pub cells: Vec<Cell>,
}

impl Row {
    /// Create a row
    pub fn new<S: Into<String>>(key: S, cells: Vec<Cell>) -> Self {
        Self {
            key: key.into(),
            cells,
        }
    }

    /// Get a cell by column index (missing if out of range)
    pub fn cell(&self, index: usize) -> &Cell {
        static MISSING: Cell = Cell::Missing;
        self.cells.get(index).unwrap_or(&MISSING)
    }
}

/// A single-pass, pull-based provider of rows.
///
/// Column metadata is queryable before iteration begins. Rows are produced on
/// demand by [`poll`](RowSource::poll), which returns `Ok(None)` once the
/// source is exhausted. Sources are not restartable.
pub trait RowSource {
    /// Column metadata
    fn spec(&self) -> &TableSpec;

    /// Total number of rows, if known up front
    fn row_count(&self) -> Option<u64> {
        None
    }

    /// Pull the next row
    fn poll(&mut self) -> Result<Option<Row>>;
}

impl<S: RowSource + ?Sized> RowSource for &mut S {
    fn spec(&self) -> &TableSpec {
        (**self).spec()
    }

    fn row_count(&self) -> Option<u64> {
        (**self).row_count()
    }

    fn poll(&mut self) -> Result<Option<Row>> {
        (**self).poll()
    }
}

impl<S: RowSource + ?Sized> RowSource for Box<S> {
    fn spec(&self) -> &TableSpec {
        (**self).spec()
    }

    fn row_count(&self) -> Option<u64> {
        (**self).row_count()
    }

    fn poll(&mut self) -> Result<Option<Row>> {
        (**self).poll()
    }
}

/// In-memory table
#[derive(Debug, Clone, Default)]
pub struct Table {
    spec: TableSpec,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table with the given columns
    pub fn new(spec: TableSpec) -> Self {
        Self {
            spec,
            rows: Vec::new(),
        }
    }

    /// Column metadata
    pub fn spec(&self) -> &TableSpec {
        &self.spec
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Append a row; it must carry exactly one cell per column
    pub fn push_row<S: Into<String>>(&mut self, key: S, cells: Vec<Cell>) -> Result<()> {
        self.push(Row::new(key, cells))
    }

    /// Append an already-built row
    pub fn push(&mut self, row: Row) -> Result<()> {
        let expected = self.spec.column_count();
        if row.cells.len() != expected {
            return Err(Error::CellCountMismatch {
                key: row.key,
                expected,
                actual: row.cells.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Row source over this table; the total row count is known
    pub fn rows(&self) -> TableRows<'_> {
        TableRows {
            table: self,
            next: 0,
        }
    }
}

/// [`RowSource`] over an in-memory [`Table`]
#[derive(Debug)]
pub struct TableRows<'a> {
    table: &'a Table,
    next: usize,
}

impl RowSource for TableRows<'_> {
    fn spec(&self) -> &TableSpec {
        &self.table.spec
    }

    fn row_count(&self) -> Option<u64> {
        Some(self.table.rows.len() as u64)
    }

    fn poll(&mut self) -> Result<Option<Row>> {
        let row = self.table.rows.get(self.next).cloned();
        if row.is_some() {
            self.next += 1;
        }
        Ok(row)
    }
}

/// Adapts any iterator of rows into a [`RowSource`] with an unknown row count
pub struct IterRowSource<I> {
    spec: TableSpec,
    rows: I,
    row_count: Option<u64>,
}

impl<I> IterRowSource<I>
where
    I: Iterator<Item = Result<Row>>,
{
    /// Create a row source from column metadata and a row iterator
    pub fn new(spec: TableSpec, rows: I) -> Self {
        Self {
            spec,
            rows,
            row_count: None,
        }
    }

    /// Declare the total number of rows the iterator will produce
    pub fn with_row_count(mut self, count: u64) -> Self {
        self.row_count = Some(count);
        self
    }
}

impl<I> RowSource for IterRowSource<I>
where
    I: Iterator<Item = Result<Row>>,
{
    fn spec(&self) -> &TableSpec {
        &self.spec
    }

    fn row_count(&self) -> Option<u64> {
        self.row_count
    }

    fn poll(&mut self) -> Result<Option<Row>> {
        self.rows.next().transpose()
    }
}
