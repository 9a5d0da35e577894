//! # classilist-csv
//!
//! Streaming delimited-text writer for probabilistic classification results.
//!
//! A [`TableWriter`] pulls rows one at a time from a
//! [`RowSource`](classilist_core::RowSource), renames the column header after
//! the classification-result convention (`A-<class>`, `Predicted`,
//! `P-<class>`, `F-<feature>`) and emits each cell quoted, escaped and
//! decimal-rewritten according to a [`FormatConfig`].
//!
//! ## Example
//!
//! ```rust
//! use classilist_core::{Cell, CancellationToken, ColumnSpec, Table, TableSpec};
//! use classilist_csv::{FormatConfig, FormatSettings, LineEnding, TableWriter};
//!
//! let spec = TableSpec::new(
//!     "iris",
//!     vec![
//!         ColumnSpec::numeric("Sepal.Length"),
//!         ColumnSpec::text("Class"),
//!         ColumnSpec::text("Prediction (Class)"),
//!         ColumnSpec::numeric("P (Class=setosa)"),
//!     ],
//! );
//! let mut table = Table::new(spec);
//! table
//!     .push_row(
//!         "Row0",
//!         vec![
//!             Cell::Number(5.1),
//!             Cell::text("setosa"),
//!             Cell::text("setosa"),
//!             Cell::Number(0.98),
//!         ],
//!     )
//!     .unwrap();
//!
//! let config = FormatConfig::new(&FormatSettings {
//!     line_ending: LineEnding::Lf,
//!     ..FormatSettings::default()
//! });
//! let mut writer = TableWriter::new(Vec::new(), config);
//! writer.write(table.rows(), CancellationToken::new()).unwrap();
//!
//! let text = String::from_utf8(writer.into_inner()).unwrap();
//! assert_eq!(
//!     text,
//!     "F-Sepal.Length,A-Class,Predicted,P-setosa\n5.1,\"setosa\",\"setosa\",0.98\n"
//! );
//! ```

mod destination;
mod error;
mod header;
mod options;
mod quote;
mod writer;

pub use destination::{DestinationSettings, OverwritePolicy};
pub use error::{CsvError, CsvResult};
pub use header::{derive_roles, ColumnRole, HeaderLayout, ROW_ID_HEADER};
pub use options::{
    escape_string, unescape_string, FormatConfig, FormatSettings, LineEnding, QuoteMode,
};
pub use quote::Quoter;
pub use writer::{TableWriter, WriteOutcome};
