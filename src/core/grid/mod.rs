//! Grid extraction: table markup to a rectangular grid of cell strings
//!
//! This module normalizes any supported table dialect into a [`RawGrid`]:
//! one header row plus body rows of trimmed cell strings. Dialects live
//! behind the [`GridBackend`] trait so a compliant backend swaps in
//! transparently; the built-ins cover:
//!
//! - reStructuredText simple tables (`===` borders)
//! - reStructuredText grid tables (`+---+` borders)
//! - Markdown pipe tables (`| a | b |` with a `---` separator rule)
//!
//! The dialect is auto-detected from the structural delimiters. Extraction
//! is a pure parse; interpretation of the cell text happens downstream.

mod gridtable;
mod markdown;
mod simple;

pub use gridtable::GridTableBackend;
pub use markdown::MarkdownBackend;
pub use simple::SimpleTableBackend;

use crate::utils::error::{TableError, TableResult};

/// A rectangular grid of trimmed cell strings
#[derive(Debug, Clone, PartialEq)]
pub struct RawGrid {
    /// Header cells, one per column
    pub header: Vec<String>,
    /// Body rows, each with exactly `header.len()` cells
    pub body: Vec<Vec<String>>,
}

/// A table-markup dialect
///
/// `accepts` is a cheap structural probe used for dialect detection;
/// `parse` does the full extraction and may still fail on malformed input.
pub trait GridBackend {
    /// Human-readable dialect name
    fn name(&self) -> &'static str;

    /// Quick structural check on stripped lines
    fn accepts(&self, lines: &[String]) -> bool;

    /// Parse stripped lines into a rectangular grid
    fn parse(&self, lines: &[String]) -> TableResult<RawGrid>;
}

/// Extract a grid from raw table text, auto-detecting the dialect
pub fn extract(text: &str) -> TableResult<RawGrid> {
    let lines = strip_lines(text)?;

    let backends: [&dyn GridBackend; 3] = [
        &SimpleTableBackend,
        &GridTableBackend,
        &MarkdownBackend,
    ];
    for backend in backends {
        if backend.accepts(&lines) {
            let grid = backend.parse(&lines)?;
            validate(&grid)?;
            return Ok(grid);
        }
    }
    Err(TableError::markup("the table format is unknown"))
}

/// Remove leading/trailing blank lines and the common indent
fn strip_lines(text: &str) -> TableResult<Vec<String>> {
    let lines: Vec<&str> = text.lines().collect();
    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());

    let (first, last) = match (first, last) {
        (Some(f), Some(l)) => (f, l),
        _ => return Err(TableError::markup("the table text is empty")),
    };

    // Indent of the first line sets the dedent for the whole block
    let indent = lines[first]
        .chars()
        .take_while(|c| c.is_whitespace())
        .count();

    Ok(lines[first..=last]
        .iter()
        .map(|line| {
            let cut = line
                .char_indices()
                .nth(indent)
                .map(|(i, _)| i)
                .unwrap_or(line.len());
            line[cut.min(line.len())..].to_string()
        })
        .collect())
}

fn validate(grid: &RawGrid) -> TableResult<()> {
    if grid.header.is_empty() {
        return Err(TableError::markup("the table has no columns"));
    }
    if grid.body.is_empty() {
        return Err(TableError::markup(
            "the table needs a header row and at least one body row",
        ));
    }
    for (i, row) in grid.body.iter().enumerate() {
        if row.len() != grid.header.len() {
            return Err(TableError::Markup {
                message: format!(
                    "row has {} cells, expected {}",
                    row.len(),
                    grid.header.len()
                ),
                row: Some(i),
                col: None,
            });
        }
    }
    Ok(())
}
