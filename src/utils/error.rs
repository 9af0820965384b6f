//! Error handling for table compilation and queries
//!
//! This module provides a unified error type and result type for all
//! compile and query operations.

use std::fmt;

/// Table error type
#[derive(Debug, Clone, PartialEq)]
pub enum TableError {
    /// Malformed table text: bad markup, unknown header keyword, bad
    /// literal/expression/pattern, duplicate label, ragged grid
    Markup {
        message: String,
        row: Option<usize>,
        col: Option<usize>,
    },
    /// An identifier in a cell could not be resolved against the bindings
    UnknownName {
        name: String,
        row: Option<usize>,
        col: Option<usize>,
    },
    /// Caller contract violation: unknown or duplicated query label
    Query { message: String },
    /// No row matched the query
    NoMatch { query: String },
    /// The first matching row carries an N/A marker
    NotApplicable { query: String },
    /// Union/join column incompatibility
    SchemaMismatch { message: String },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::Markup { message, row, col } => {
                if let (Some(r), Some(c)) = (row, col) {
                    write!(f, "Markup error at row {}, column {}: {}", r, c, message)
                } else if let Some(r) = row {
                    write!(f, "Markup error at row {}: {}", r, message)
                } else {
                    write!(f, "Markup error: {}", message)
                }
            }
            TableError::UnknownName { name, row, col } => {
                if let (Some(r), Some(c)) = (row, col) {
                    write!(f, "Unknown name '{}' at row {}, column {}", name, r, c)
                } else {
                    write!(f, "Unknown name '{}'", name)
                }
            }
            TableError::Query { message } => {
                write!(f, "Invalid query: {}", message)
            }
            TableError::NoMatch { query } => {
                write!(f, "No row is found for the query: {}", query)
            }
            TableError::NotApplicable { query } => {
                write!(f, "The result is not applicable: query = {}", query)
            }
            TableError::SchemaMismatch { message } => {
                write!(f, "Schema mismatch: {}", message)
            }
        }
    }
}

impl std::error::Error for TableError {}

/// Result type for compile and query operations
pub type TableResult<T> = Result<T, TableError>;

// Convenience constructors for errors
impl TableError {
    pub fn markup(message: impl Into<String>) -> Self {
        TableError::Markup {
            message: message.into(),
            row: None,
            col: None,
        }
    }

    pub fn markup_at(message: impl Into<String>, row: usize, col: usize) -> Self {
        TableError::Markup {
            message: message.into(),
            row: Some(row),
            col: Some(col),
        }
    }

    pub fn unknown_name(name: impl Into<String>) -> Self {
        TableError::UnknownName {
            name: name.into(),
            row: None,
            col: None,
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        TableError::Query {
            message: message.into(),
        }
    }

    pub fn no_match(query: impl Into<String>) -> Self {
        TableError::NoMatch {
            query: query.into(),
        }
    }

    pub fn not_applicable(query: impl Into<String>) -> Self {
        TableError::NotApplicable {
            query: query.into(),
        }
    }

    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        TableError::SchemaMismatch {
            message: message.into(),
        }
    }

    /// Attach cell coordinates to a Markup/UnknownName error that lacks them
    pub fn at_cell(self, row: usize, col: usize) -> Self {
        match self {
            TableError::Markup {
                message,
                row: None,
                col: None,
            } => TableError::Markup {
                message,
                row: Some(row),
                col: Some(col),
            },
            TableError::UnknownName {
                name,
                row: None,
                col: None,
            } => TableError::UnknownName {
                name,
                row: Some(row),
                col: Some(col),
            },
            other => other,
        }
    }
}
