//! Header interpretation: header cells to column specs
//!
//! Each header cell follows the grammar `LABEL [ '(' KEYWORD ')' ]`. The
//! keyword selects the column kind and defaults to a plain value column:
//!
//! | keyword           | kind      |
//! |-------------------|-----------|
//! | `value`, `val`    | Value     |
//! | `condition`, `cond` | Condition |
//! | `string`, `str`   | String    |
//! | `regex`, `re`     | Regex     |

use crate::utils::error::{TableError, TableResult};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;

lazy_static! {
    static ref HEADER_CELL: Regex =
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*(?:\(\s*([A-Za-z]+)\s*\))?$").unwrap();
}

/// How the cells of a column are compiled and matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Literal constant, matched by equality
    Value,
    /// Boolean expression over the bound variable
    Condition,
    /// Exact text comparison; `*` and `N/A` are ordinary text
    String,
    /// Anchored regular expression over the query value's text form
    Regex,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self {
            ColumnKind::Value => "value",
            ColumnKind::Condition => "condition",
            ColumnKind::String => "string",
            ColumnKind::Regex => "regex",
        };
        write!(f, "({})", keyword)
    }
}

/// A column's label and kind, fixed at compile time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub label: String,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    /// Bound variable for condition expressions: the first letter of the
    /// label, lower-cased (label "age" binds `a`)
    pub fn bound_var(&self) -> char {
        self.label
            .chars()
            .next()
            .map(|c| c.to_ascii_lowercase())
            .unwrap_or('_')
    }
}

/// Parse header cells into column specs
pub fn interpret_header(cells: &[String]) -> TableResult<Vec<ColumnSpec>> {
    let mut specs = Vec::with_capacity(cells.len());
    let mut seen: HashSet<&str> = HashSet::new();

    for (col, cell) in cells.iter().enumerate() {
        let captures = HEADER_CELL.captures(cell.trim()).ok_or_else(|| {
            TableError::Markup {
                message: format!("malformed header cell '{}'", cell),
                row: None,
                col: Some(col),
            }
        })?;

        let label = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        let kind = match captures.get(2) {
            None => ColumnKind::Value,
            Some(keyword) => match keyword.as_str().to_ascii_lowercase().as_str() {
                "value" | "val" => ColumnKind::Value,
                "condition" | "cond" => ColumnKind::Condition,
                "string" | "str" => ColumnKind::String,
                "regex" | "re" => ColumnKind::Regex,
                other => {
                    return Err(TableError::Markup {
                        message: format!("unknown column keyword '{}'", other),
                        row: None,
                        col: Some(col),
                    })
                }
            },
        };

        if !seen.insert(label) {
            return Err(TableError::Markup {
                message: format!("duplicate column label '{}'", label),
                row: None,
                col: Some(col),
            });
        }

        specs.push(ColumnSpec {
            label: label.to_string(),
            kind,
        });
    }

    Ok(specs)
}
