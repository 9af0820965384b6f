//! The compiled table and its query engine
//!
//! A [`Table`] is immutable once compiled: an ordered sequence of column
//! specs (header order) and rows (source order, significant for first-match
//! semantics). Queries are read-only and repeatable; a published table is
//! safe for unsynchronized concurrent reads.

use crate::core::bindings::Bindings;
use crate::core::grid::extract;
use crate::core::header::{interpret_header, ColumnSpec};
use crate::core::matcher::MatchOutcome;
use crate::core::row::{compile_row, Row};
use crate::core::value::Value;
use crate::utils::error::{TableError, TableResult};
use fxhash::FxHashMap;
use indexmap::IndexMap;
use std::fmt;

/// One matched row: (label, value) pairs covering all columns, in table
/// column order
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    values: IndexMap<String, Value>,
}

impl QueryResult {
    pub fn get(&self, label: &str) -> Option<&Value> {
        self.values.get(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, (label, value)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", label, value.repr())?;
        }
        write!(f, ")")
    }
}

/// A compiled decision table
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<ColumnSpec>,
    rows: Vec<Row>,
    /// Label → column index
    index: FxHashMap<String, usize>,
}

impl Table {
    /// Compile table text with the given bindings
    pub fn compile(text: &str, bindings: &Bindings) -> TableResult<Table> {
        let grid = extract(text)?;
        let columns = interpret_header(&grid.header)?;

        let mut rows = Vec::with_capacity(grid.body.len());
        for (i, raw_cells) in grid.body.iter().enumerate() {
            rows.push(compile_row(&columns, raw_cells, bindings, i)?);
        }
        Ok(Table::from_parts(columns, rows))
    }

    fn from_parts(columns: Vec<ColumnSpec>, rows: Vec<Row>) -> Table {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.label.clone(), i))
            .collect();
        Table {
            columns,
            rows,
            index,
        }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|spec| spec.label.as_str())
    }

    /// Number of body rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Return the first row that matches the query.
    ///
    /// Columns absent from the query are unconstrained. The first row whose
    /// queried matchers all match wins; if that row carries an N/A marker in
    /// any column the query fails with [`TableError::NotApplicable`] instead
    /// of falling through to a later row. A queried cell that is itself N/A
    /// never matches, so such a row is simply skipped.
    pub fn select(&self, query: &[(&str, Value)]) -> TableResult<QueryResult> {
        let by_index = self.resolve_query(query)?;
        for row in &self.rows {
            if !row_matches(row, &by_index) {
                continue;
            }
            if row.has_not_applicable {
                return Err(TableError::not_applicable(format_query(query)));
            }
            return Ok(self.materialize(row, &by_index));
        }
        Err(TableError::no_match(format_query(query)))
    }

    /// Return every matching row in source order.
    ///
    /// Unlike [`select`](Table::select), rows carrying an N/A marker are
    /// excluded from the result instead of raising. This asymmetry is
    /// inherited behavior; callers that need the hard failure must use
    /// `select`.
    pub fn select_all(&self, query: &[(&str, Value)]) -> TableResult<Vec<QueryResult>> {
        let by_index = self.resolve_query(query)?;
        Ok(self
            .rows
            .iter()
            .filter(|row| row_matches(row, &by_index) && !row.has_not_applicable)
            .map(|row| self.materialize(row, &by_index))
            .collect())
    }

    /// True iff `select` with this query would return a row. Never fails:
    /// an invalid query yields false.
    pub fn contains(&self, query: &[(&str, Value)]) -> bool {
        self.select(query).is_ok()
    }

    /// Positional form of [`contains`](Table::contains): one value per
    /// column, in column order
    pub fn contains_row(&self, values: &[Value]) -> bool {
        if values.len() != self.columns.len() {
            return false;
        }
        let query: Vec<(&str, Value)> = self
            .columns
            .iter()
            .zip(values)
            .map(|(spec, value)| (spec.label.as_str(), value.clone()))
            .collect();
        self.contains(&query)
    }

    /// Row by index, in the output form `iter` uses; no filtering
    pub fn get(&self, index: usize) -> Option<QueryResult> {
        self.rows.get(index).map(|row| self.materialize(row, &[]))
    }

    /// Iterate over ALL rows unconditionally, in source order. Each call
    /// returns a fresh iterator.
    pub fn iter(&self) -> Rows<'_> {
        Rows {
            table: self,
            index: 0,
        }
    }

    /// Concatenate two tables with identical columns: self's rows first
    pub fn union(&self, other: &Table) -> TableResult<Table> {
        if self.columns != other.columns {
            return Err(TableError::schema_mismatch(
                "union requires identical columns (labels, kinds and order)",
            ));
        }
        let mut rows = self.rows.clone();
        rows.extend(other.rows.iter().cloned());
        Ok(Table::from_parts(self.columns.clone(), rows))
    }

    /// Relational join on the `on` labels.
    ///
    /// Two rows combine when their cells at every `on` label have the same
    /// canonical form (a literal's repr, otherwise the raw cell text). The
    /// result carries self's columns followed by other's non-overlapping
    /// columns.
    pub fn join(&self, other: &Table, on: &[&str]) -> TableResult<Table> {
        let mut key_pairs = Vec::with_capacity(on.len());
        for label in on {
            let i = self.index.get(*label).copied().ok_or_else(|| {
                TableError::schema_mismatch(format!("join label '{}' is not in the left table", label))
            })?;
            let j = other.index.get(*label).copied().ok_or_else(|| {
                TableError::schema_mismatch(format!(
                    "join label '{}' is not in the right table",
                    label
                ))
            })?;
            key_pairs.push((i, j));
        }

        let kept: Vec<usize> = other
            .columns
            .iter()
            .enumerate()
            .filter(|(_, spec)| !self.index.contains_key(&spec.label))
            .map(|(j, _)| j)
            .collect();

        let mut columns = self.columns.clone();
        columns.extend(kept.iter().map(|&j| other.columns[j].clone()));

        let mut rows = Vec::new();
        for r1 in &self.rows {
            for r2 in &other.rows {
                let keys_equal = key_pairs
                    .iter()
                    .all(|&(i, j)| r1.cells[i].repr() == r2.cells[j].repr());
                if !keys_equal {
                    continue;
                }
                let mut cells = r1.cells.clone();
                cells.extend(kept.iter().map(|&j| r2.cells[j].clone()));
                rows.push(Row::new(cells));
            }
        }
        Ok(Table::from_parts(columns, rows))
    }

    /// Resolve query labels to column indices
    fn resolve_query<'q>(&self, query: &'q [(&str, Value)]) -> TableResult<Vec<(usize, &'q Value)>> {
        let mut by_index = Vec::with_capacity(query.len());
        for (label, value) in query {
            let i = *self
                .index
                .get(*label)
                .ok_or_else(|| TableError::query(format!("the label '{}' is incorrect", label)))?;
            if by_index.iter().any(|&(j, _)| j == i) {
                return Err(TableError::query(format!(
                    "the label '{}' appears more than once",
                    label
                )));
            }
            by_index.push((i, value));
        }
        Ok(by_index)
    }

    /// Build the output tuple: queried columns echo the query's value, the
    /// rest produce the matcher's output form
    fn materialize(&self, row: &Row, by_index: &[(usize, &Value)]) -> QueryResult {
        let mut values = IndexMap::with_capacity(self.columns.len());
        for (i, spec) in self.columns.iter().enumerate() {
            let value = match by_index.iter().find(|&&(j, _)| j == i) {
                Some(&(_, queried)) => queried.clone(),
                None => row.cells[i].output_value(),
            };
            values.insert(spec.label.clone(), value);
        }
        QueryResult { values }
    }
}

/// Lazy iterator over all rows of a table
pub struct Rows<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Iterator for Rows<'a> {
    type Item = QueryResult;

    fn next(&mut self) -> Option<QueryResult> {
        let result = self.table.get(self.index);
        if result.is_some() {
            self.index += 1;
        }
        result
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = QueryResult;
    type IntoIter = Rows<'a>;

    fn into_iter(self) -> Rows<'a> {
        self.iter()
    }
}

impl fmt::Display for Table {
    /// Tab-separated dump: labels, kinds, then one line per row
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.labels().collect();
        writeln!(f, "{}", labels.join("\t"))?;
        let kinds: Vec<String> = self.columns.iter().map(|s| s.kind.to_string()).collect();
        write!(f, "{}", kinds.join("\t"))?;
        for row in &self.rows {
            let cells: Vec<String> = row.cells.iter().map(|m| m.repr()).collect();
            write!(f, "\n{}", cells.join("\t"))?;
        }
        Ok(())
    }
}

fn row_matches(row: &Row, by_index: &[(usize, &Value)]) -> bool {
    by_index
        .iter()
        .all(|&(i, value)| row.cells[i].matches(value) == MatchOutcome::Match)
}

fn format_query(query: &[(&str, Value)]) -> String {
    let parts: Vec<String> = query
        .iter()
        .map(|(label, value)| format!("{}={}", label, value.repr()))
        .collect();
    format!("({})", parts.join(", "))
}
