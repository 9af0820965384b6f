//! # inline-table
//!
//! Compile ASCII tables embedded in source code into queryable in-memory
//! decision tables. A table of conditions, values, strings and regexes acts
//! as executable decision logic, replacing chains of if-statements — the
//! source reads like a design document.
//!
//! ## Features
//!
//! - **Three dialects**: reStructuredText simple tables, grid tables and
//!   Markdown pipe tables, auto-detected
//! - **Typed columns**: `value` (default), `condition`, `string` and `regex`
//!   columns, selected by a keyword in the header cell
//! - **Wildcard and N/A**: `*` matches any query value; `N/A` marks a row
//!   that must fail the query instead of returning a result
//! - **Compile-time bindings**: substitute caller-supplied names into cell
//!   expressions
//! - **Relational operations**: `union` and `join` over compiled tables
//!
//! ## Usage Examples
//!
//! ### A state machine as a table
//!
//! ```rust
//! use inline_table::compile;
//!
//! let t = compile("
//!     ====== ======= ====== ======
//!     state  event    next  action
//!     ====== ======= ====== ======
//!     'stop' 'accel' 'run'  'move'
//!     'stop' 'brake' 'stop'  None
//!     'run'  'accel' 'run'  'move'
//!     'run'  'brake' 'stop'  None
//!     ====== ======= ====== ======
//! ").unwrap();
//!
//! let row = t.select(&[("state", "stop".into()), ("event", "accel".into())]).unwrap();
//! assert_eq!(row.to_string(), "(state='stop', event='accel', next='run', action='move')");
//! ```
//!
//! ### Condition and string columns
//!
//! ```rust
//! use inline_table::{compile, Value};
//!
//! let t = compile("
//!     ========= ======== ==========
//!     age(cond) gender   call(str)
//!     ========= ======== ==========
//!     a < 18    *        kid
//!     a >= 18   'male'   gentleman
//!     a >= 18   'female' lady
//!     ========= ======== ==========
//! ").unwrap();
//!
//! let row = t.select(&[("age", Value::Int(24)), ("gender", "female".into())]).unwrap();
//! assert_eq!(row.get("call"), Some(&Value::from("lady")));
//! ```
//!
//! ### Bindings
//!
//! ```rust
//! use inline_table::{compile_with, Bindings, Value};
//!
//! let bindings = Bindings::new().set("M", "male").set("F", "female");
//! let t = compile_with("
//!     | gender | code |
//!     |--------|------|
//!     | M      | 1    |
//!     | F      | 2    |
//! ", &bindings).unwrap();
//!
//! let row = t.select(&[("gender", "female".into())]).unwrap();
//! assert_eq!(row.get("code"), Some(&Value::Int(2)));
//! ```

/// Core compilation pipeline and query engine
pub mod core;

/// Utility modules
pub mod utils;

// Re-export the public surface
pub use crate::core::bindings::Bindings;
pub use crate::core::grid::{GridBackend, RawGrid};
pub use crate::core::header::{ColumnKind, ColumnSpec};
pub use crate::core::table::{QueryResult, Rows, Table};
pub use crate::core::value::Value;
pub use crate::utils::error::{TableError, TableResult};

/// Compile table text into a [`Table`]
///
/// # Arguments
/// * `text` - table text in one of the supported dialects
///
/// # Returns
/// The compiled table, or a markup error describing the offending cell
pub fn compile(text: &str) -> TableResult<Table> {
    Table::compile(text, &Bindings::new())
}

/// Compile table text with caller-supplied name bindings
///
/// Bindings are resolved once, at compile time; an identifier in a cell that
/// is neither a column's bound variable nor a binding fails with
/// [`TableError::UnknownName`].
pub fn compile_with(text: &str, bindings: &Bindings) -> TableResult<Table> {
    Table::compile(text, bindings)
}
