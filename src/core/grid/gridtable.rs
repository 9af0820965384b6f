//! reStructuredText grid table backend
//!
//! ```text
//! +-----+-----+
//! |  A  |  B  |
//! +=====+=====+
//! | a1  | b1  |
//! +-----+-----+
//! | a2  | b2  |
//! +-----+-----+
//! ```
//!
//! Column boundaries are taken from the `+` positions in the top border.
//! Multi-line cells are joined with single spaces. Exactly one `=` separator
//! splits the header from the body. Cell spans are rejected: a missing `|`
//! or `+` at a column boundary is reported as a markup error (a richer
//! backend may resolve spans before handing the grid over).

use super::{GridBackend, RawGrid};
use crate::utils::error::{TableError, TableResult};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BORDER: Regex = Regex::new(r"^\+(-+\+)+$").unwrap();
    static ref HEADER_SEP: Regex = Regex::new(r"^\+(=+\+)+$").unwrap();
}

pub struct GridTableBackend;

impl GridBackend for GridTableBackend {
    fn name(&self) -> &'static str {
        "reStructuredText grid table"
    }

    fn accepts(&self, lines: &[String]) -> bool {
        lines.len() >= 2
            && BORDER.is_match(lines[0].trim_end())
            && BORDER.is_match(lines[lines.len() - 1].trim_end())
    }

    fn parse(&self, lines: &[String]) -> TableResult<RawGrid> {
        let boundaries: Vec<usize> = lines[0]
            .trim_end()
            .chars()
            .enumerate()
            .filter(|&(_, c)| c == '+')
            .map(|(i, _)| i)
            .collect();
        let ncols = boundaries.len() - 1;

        let mut header: Option<Vec<String>> = None;
        let mut body: Vec<Vec<String>> = Vec::new();
        // Cell fragments of the row under construction
        let mut current: Vec<Vec<String>> = vec![Vec::new(); ncols];
        let mut row_open = false;

        for line in &lines[1..] {
            let line = line.trim_end();
            if line.starts_with('+') {
                let is_header_sep = HEADER_SEP.is_match(line);
                if !is_header_sep && !BORDER.is_match(line) {
                    return Err(TableError::markup(format!(
                        "cell spans are not supported: '{}'",
                        line
                    )));
                }
                check_boundaries(line, &boundaries, '+')?;

                if !row_open {
                    return Err(TableError::markup("empty row in grid table"));
                }
                let cells: Vec<String> = current.iter().map(|parts| parts.join(" ")).collect();
                current = vec![Vec::new(); ncols];
                row_open = false;

                if is_header_sep {
                    if header.is_some() {
                        return Err(TableError::markup(
                            "more than one header separator in grid table",
                        ));
                    }
                    if !body.is_empty() {
                        return Err(TableError::markup(
                            "the header separator must come before the body rows",
                        ));
                    }
                    header = Some(cells);
                } else {
                    body.push(cells);
                }
            } else if line.starts_with('|') {
                check_boundaries(line, &boundaries, '|')?;
                row_open = true;
                let chars: Vec<char> = line.chars().collect();
                for (i, parts) in current.iter_mut().enumerate() {
                    let from = boundaries[i] + 1;
                    let to = boundaries[i + 1].min(chars.len());
                    if from < to {
                        let text: String = chars[from..to].iter().collect();
                        let text = text.trim();
                        if !text.is_empty() {
                            parts.push(text.to_string());
                        }
                    }
                }
            } else if !line.trim().is_empty() {
                return Err(TableError::markup(format!(
                    "unexpected line in grid table: '{}'",
                    line
                )));
            }
        }

        match header {
            Some(header) => Ok(RawGrid { header, body }),
            None => Err(TableError::markup(
                "a grid table needs a '+===+' header separator",
            )),
        }
    }
}

/// Every column boundary must carry the expected character
fn check_boundaries(line: &str, boundaries: &[usize], expected: char) -> TableResult<()> {
    let chars: Vec<char> = line.chars().collect();
    for &b in boundaries {
        if chars.get(b).copied() != Some(expected) {
            return Err(TableError::markup(format!(
                "cell spans are not supported: '{}'",
                line
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines()
            .map(|l| l.trim_start().to_string())
            .filter(|l| !l.is_empty())
            .collect()
    }

    #[test]
    fn test_parse_basic() {
        let grid = GridTableBackend
            .parse(&lines(
                "+-----+-----+
                 |  A  |  B  |
                 +=====+=====+
                 | a1  | b1  |
                 +-----+-----+
                 | a2  | b2  |
                 +-----+-----+",
            ))
            .unwrap();
        assert_eq!(grid.header, vec!["A", "B"]);
        assert_eq!(grid.body.len(), 2);
        assert_eq!(grid.body[0], vec!["a1".to_string(), "b1".to_string()]);
    }

    #[test]
    fn test_multiline_cells_join() {
        let grid = GridTableBackend
            .parse(&lines(
                "+-----+-----+
                 |  A  |  B  |
                 | (a) | (b) |
                 +=====+=====+
                 | a1  | b1  |
                 +-----+-----+",
            ))
            .unwrap();
        assert_eq!(grid.header, vec!["A (a)", "B (b)"]);
    }

    #[test]
    fn test_missing_header_separator() {
        let err = GridTableBackend
            .parse(&lines(
                "+-----+
                 |  A  |
                 +-----+",
            ))
            .unwrap_err();
        assert!(err.to_string().contains("header separator"));
    }

    #[test]
    fn test_span_rejected() {
        let err = GridTableBackend
            .parse(&lines(
                "+-----+-----+
                 |  A  |  B  |
                 +=====+=====+
                 | a1 spans  |
                 +-----+-----+",
            ))
            .unwrap_err();
        assert!(err.to_string().contains("spans"));
    }
}
