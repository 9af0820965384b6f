//! Core compilation pipeline
//!
//! This module contains the table compilation stages and the query engine:
//! - `grid`: table markup to a rectangular grid of cell strings
//! - `header`: header cells to column specs
//! - `expr`: the cell expression grammar (lexer, parser, evaluator)
//! - `matcher`: cells compiled to typed matchers
//! - `row`: per-row assembly
//! - `table`: the compiled table and its queries

pub mod bindings;
pub mod expr;
pub mod grid;
pub mod header;
pub mod matcher;
pub mod row;
pub mod table;
pub mod value;

// Re-export main types from the pipeline
pub use bindings::Bindings;
pub use grid::{extract, GridBackend, RawGrid};
pub use header::{interpret_header, ColumnKind, ColumnSpec};
pub use matcher::{compile_cell, MatchOutcome, Matcher};
pub use row::{compile_row, Row};
pub use table::{QueryResult, Rows, Table};
pub use value::Value;
