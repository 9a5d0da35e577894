//! End-to-end tests for classilist-csv.
//!
//! Each test builds the table it needs in memory, writes it through
//! `TableWriter` (or `DestinationSettings` for file output) and asserts on
//! the exact bytes produced.

mod destination;
mod writing;

pub use common::*;
