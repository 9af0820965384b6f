//! Markdown pipe table backend
//!
//! ```text
//! | A | B |
//! |---|---|
//! | 1 | 2 |
//! ```
//!
//! The second line must be a separator rule of dashes (alignment colons are
//! accepted and ignored). Leading and trailing pipes are optional; there is
//! no support for escaped pipes inside cells.

use super::{GridBackend, RawGrid};
use crate::utils::error::{TableError, TableResult};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RULE_CELL: Regex = Regex::new(r"^:?-+:?$").unwrap();
}

pub struct MarkdownBackend;

impl GridBackend for MarkdownBackend {
    fn name(&self) -> &'static str {
        "Markdown table"
    }

    fn accepts(&self, lines: &[String]) -> bool {
        lines.len() >= 2 && lines[0].contains('|') && is_rule(&lines[1])
    }

    fn parse(&self, lines: &[String]) -> TableResult<RawGrid> {
        let header = split_row(&lines[0]);
        let rule = split_row(&lines[1]);
        if rule.len() != header.len() {
            return Err(TableError::markup(format!(
                "the separator rule has {} cells, the header has {}",
                rule.len(),
                header.len()
            )));
        }

        let mut body = Vec::new();
        for (i, line) in lines[2..].iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            if !line.contains('|') {
                return Err(TableError::markup(format!(
                    "unexpected line in Markdown table: '{}'",
                    line.trim_end()
                )));
            }
            let cells = split_row(line);
            if cells.len() != header.len() {
                return Err(TableError::Markup {
                    message: format!(
                        "row has {} cells, expected {}",
                        cells.len(),
                        header.len()
                    ),
                    row: Some(i),
                    col: None,
                });
            }
            body.push(cells);
        }

        Ok(RawGrid { header, body })
    }
}

/// True when every `|`-separated cell is a dash rule like `---` or `:---:`
fn is_rule(line: &str) -> bool {
    let cells = split_row(line);
    !cells.is_empty() && cells.iter().all(|c| RULE_CELL.is_match(c))
}

/// Split a row on `|`, dropping the optional leading/trailing pipes
fn split_row(line: &str) -> Vec<String> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);
    line.split('|').map(|cell| cell.trim().to_string()).collect()
}
