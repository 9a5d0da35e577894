//! # classilist-core
//!
//! Core data structures consumed by the classilist table writer.
//!
//! This crate provides:
//! - [`Cell`] - A single value (or missing marker) at a row/column intersection
//! - [`ColumnSpec`] and [`TableSpec`] - Column metadata known before any row is read
//! - [`RowSource`] - A single-pass, pull-based provider of rows
//! - [`Table`] - An in-memory table usable as a row source
//! - [`ExecutionMonitor`] and [`CancellationToken`] - Progress reporting and cooperative cancellation
//!
//! ## Example
//!
//! ```rust
//! use classilist_core::{Cell, ColumnSpec, RowSource, Table, TableSpec};
//!
//! let spec = TableSpec::new(
//!     "iris",
//!     vec![ColumnSpec::numeric("Sepal.Length"), ColumnSpec::text("Class")],
//! );
//! let mut table = Table::new(spec);
//! table.push_row("Row0", vec![Cell::Number(5.1), Cell::text("setosa")]).unwrap();
//!
//! let mut rows = table.rows();
//! assert_eq!(rows.row_count(), Some(1));
//! assert!(rows.poll().unwrap().is_some());
//! ```

pub mod cell;
pub mod error;
pub mod monitor;
pub mod table;

pub use cell::Cell;
pub use error::{Error, Result};
pub use monitor::{Cancelled, CancellationToken, ExecutionMonitor, LoggingMonitor};
pub use table::{
    ColumnSpec, ColumnType, IterRowSource, Row, RowSource, Table, TableRows, TableSpec,
};
