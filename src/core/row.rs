//! Row compilation: raw cells to a row of matchers

use crate::core::bindings::Bindings;
use crate::core::header::ColumnSpec;
use crate::core::matcher::{compile_cell, Matcher};
use crate::utils::error::TableResult;

/// One compiled body row: a matcher per column, in table column order
#[derive(Debug, Clone)]
pub struct Row {
    pub cells: Vec<Matcher>,
    /// Whether any cell is an N/A marker
    pub has_not_applicable: bool,
}

impl Row {
    pub fn new(cells: Vec<Matcher>) -> Self {
        let has_not_applicable = cells.iter().any(|m| m.is_not_applicable());
        Row {
            cells,
            has_not_applicable,
        }
    }
}

/// Compile one raw row. `row_index` is the zero-based body row number, used
/// for error coordinates. Column-count equality with the header is enforced
/// by the grid extractor.
pub fn compile_row(
    specs: &[ColumnSpec],
    raw_cells: &[String],
    bindings: &Bindings,
    row_index: usize,
) -> TableResult<Row> {
    debug_assert_eq!(specs.len(), raw_cells.len());

    let mut cells = Vec::with_capacity(specs.len());
    for (col, (spec, raw)) in specs.iter().zip(raw_cells).enumerate() {
        let matcher = compile_cell(spec.kind, spec.bound_var(), raw, bindings)
            .map_err(|e| e.at_cell(row_index, col))?;
        cells.push(matcher);
    }
    Ok(Row::new(cells))
}
