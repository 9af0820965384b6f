//! reStructuredText simple table backend
//!
//! ```text
//! ====== =======
//! state  event
//! ====== =======
//! 'stop' 'accel'
//! 'run'  'brake'
//! ====== =======
//! ```
//!
//! Column extents are taken from the runs of `=` in the border lines; the
//! three borders (top, header separator, bottom) must agree. Multiple lines
//! between the top border and the header separator are joined per column, so
//! a `(kind)` keyword may sit on its own line under the label.

use super::{GridBackend, RawGrid};
use crate::utils::error::{TableError, TableResult};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BORDER: Regex = Regex::new(r"^=+[= ]*$").unwrap();
}

pub struct SimpleTableBackend;

impl GridBackend for SimpleTableBackend {
    fn name(&self) -> &'static str {
        "reStructuredText simple table"
    }

    fn accepts(&self, lines: &[String]) -> bool {
        lines.len() >= 2
            && BORDER.is_match(lines[0].trim_end())
            && BORDER.is_match(lines[lines.len() - 1].trim_end())
    }

    fn parse(&self, lines: &[String]) -> TableResult<RawGrid> {
        let borders: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, l)| BORDER.is_match(l.trim_end()))
            .map(|(i, _)| i)
            .collect();

        if borders.len() < 3 {
            return Err(TableError::markup(
                "a simple table needs a top border, a header separator and a bottom border",
            ));
        }
        if borders.len() > 3 {
            return Err(TableError::markup("unexpected extra border line"));
        }
        if borders[2] != lines.len() - 1 {
            return Err(TableError::markup("text found after the bottom border"));
        }

        let columns = column_spans(&lines[borders[0]]);
        for &b in &borders[1..] {
            if column_spans(&lines[b]) != columns {
                return Err(TableError::markup("the border lines do not agree"));
            }
        }

        let header_lines = &lines[borders[0] + 1..borders[1]];
        if header_lines.is_empty() {
            return Err(TableError::markup("the table has no header row"));
        }

        // Join multi-line header cells with single spaces
        let mut header = vec![String::new(); columns.len()];
        for line in header_lines {
            let cells = slice_row(line, &columns)?;
            for (acc, cell) in header.iter_mut().zip(cells) {
                if !cell.is_empty() {
                    if !acc.is_empty() {
                        acc.push(' ');
                    }
                    acc.push_str(&cell);
                }
            }
        }

        let mut body = Vec::new();
        for line in &lines[borders[1] + 1..borders[2]] {
            if line.trim().is_empty() {
                continue;
            }
            body.push(slice_row(line, &columns)?);
        }

        Ok(RawGrid { header, body })
    }
}

/// Column extents (start, end) of the `=` runs in a border line
fn column_spans(border: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, c) in border.chars().enumerate() {
        match (c, start) {
            ('=', None) => start = Some(i),
            (' ', Some(s)) => {
                spans.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, border.chars().count()));
    }
    spans
}

/// Slice one content line into per-column trimmed cells
fn slice_row(line: &str, columns: &[(usize, usize)]) -> TableResult<Vec<String>> {
    let chars: Vec<char> = line.chars().collect();
    let slice = |from: usize, to: usize| -> String {
        let to = to.min(chars.len());
        if from >= to {
            String::new()
        } else {
            chars[from..to].iter().collect::<String>().trim().to_string()
        }
    };

    // Text in the gaps between columns means the cells do not line up
    let mut gaps = vec![(0, columns[0].0)];
    for pair in columns.windows(2) {
        gaps.push((pair[0].1, pair[1].0));
    }
    for (from, to) in gaps {
        if !slice(from, to).is_empty() {
            return Err(TableError::markup(format!(
                "cell text does not align with the column borders: '{}'",
                line.trim_end()
            )));
        }
    }

    let mut cells = Vec::with_capacity(columns.len());
    for (i, &(start, end)) in columns.iter().enumerate() {
        // The last column extends to the end of the line
        let end = if i == columns.len() - 1 {
            chars.len().max(end)
        } else {
            end
        };
        cells.push(slice(start, end));
    }
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines()
            .map(|l| l.to_string())
            .filter(|l| !l.is_empty())
            .collect()
    }

    #[test]
    fn test_column_spans() {
        assert_eq!(column_spans("=== ====="), vec![(0, 3), (4, 9)]);
        assert_eq!(column_spans("======"), vec![(0, 6)]);
    }

    #[test]
    fn test_parse_basic() {
        let grid = SimpleTableBackend
            .parse(&lines(
                "==== ====\n A    B\n==== ====\n a1   b1\n a2   b2\n==== ====",
            ))
            .unwrap();
        assert_eq!(grid.header, vec!["A", "B"]);
        assert_eq!(grid.body.len(), 2);
        assert_eq!(grid.body[1], vec!["a2".to_string(), "b2".to_string()]);
    }

    #[test]
    fn test_parse_two_line_header() {
        let grid = SimpleTableBackend
            .parse(&lines(
                "==== ====\n A    B\n(a)  (b)\n==== ====\n a1   b1\n==== ====",
            ))
            .unwrap();
        assert_eq!(grid.header, vec!["A (a)", "B (b)"]);
    }

    #[test]
    fn test_last_column_may_overflow() {
        let grid = SimpleTableBackend
            .parse(&lines("=== ===\n A   B\n=== ===\n 1   'long text'\n=== ==="))
            .unwrap();
        assert_eq!(grid.body[0][1], "'long text'");
    }

    #[test]
    fn test_missing_header_separator() {
        let err = SimpleTableBackend
            .parse(&lines("=== ===\n A   B\n=== ==="))
            .unwrap_err();
        assert!(err.to_string().contains("border"));
    }

    #[test]
    fn test_misaligned_cell() {
        let err = SimpleTableBackend
            .parse(&lines("=== ===\n A   B\n=== ===\n 1 x 2\n=== ==="))
            .unwrap_err();
        assert!(err.to_string().contains("align"));
    }
}
