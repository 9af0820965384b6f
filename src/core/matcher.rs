//! Typed cell matchers
//!
//! A [`Matcher`] is the compiled form of one body cell. Kind dispatch
//! happens here once, at compile time; evaluating a matcher against a query
//! value is a constant-time check (regex matching excepted).

use crate::core::bindings::Bindings;
use crate::core::expr::{eval_literal, parse_expr, Expr};
use crate::core::header::ColumnKind;
use crate::core::value::Value;
use crate::utils::error::{TableError, TableResult};
use regex::Regex;

/// The wildcard cell token
pub const WILDCARD: &str = "*";
/// The not-applicable cell token (exact, case-sensitive)
pub const NOT_APPLICABLE: &str = "N/A";

/// Result of evaluating a matcher against a query value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Match,
    NoMatch,
    /// The cell is an N/A marker; the row cannot produce a result
    Inapplicable,
}

/// Compiled form of one body cell
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Constant from a value column, matched by equality
    Literal(Value),
    /// Predicate from a condition column
    Conditional { expr: Expr, source: String },
    /// Exact text from a string column
    StringEq(String),
    /// Anchored pattern from a regex column
    RegexMatch { pattern: Regex, source: String },
    Wildcard,
    NotApplicable,
}

impl Matcher {
    /// Evaluate against a query value
    pub fn matches(&self, query: &Value) -> MatchOutcome {
        let matched = match self {
            Matcher::Wildcard => true,
            Matcher::NotApplicable => return MatchOutcome::Inapplicable,
            Matcher::Literal(value) => value == query,
            // An evaluation failure (e.g. ordering a string against a
            // number) means the condition does not hold for this value
            Matcher::Conditional { expr, .. } => expr
                .eval(Some(query))
                .map(|v| v.is_truthy())
                .unwrap_or(false),
            Matcher::StringEq(text) => *text == query.to_string(),
            Matcher::RegexMatch { pattern, .. } => pattern.is_match(&query.to_string()),
        };
        if matched {
            MatchOutcome::Match
        } else {
            MatchOutcome::NoMatch
        }
    }

    /// Output payload for a column that was not constrained by the query
    pub fn output_value(&self) -> Value {
        match self {
            Matcher::Literal(value) => value.clone(),
            Matcher::Conditional { source, .. } => Value::Str(source.clone()),
            Matcher::StringEq(text) => Value::Str(text.clone()),
            Matcher::RegexMatch { source, .. } => Value::Str(source.clone()),
            Matcher::Wildcard => Value::Str(WILDCARD.to_string()),
            Matcher::NotApplicable => Value::Str(NOT_APPLICABLE.to_string()),
        }
    }

    /// Canonical text form: literals as their source-like repr, everything
    /// else as raw cell text. Used as the join key and by the table dump.
    pub fn repr(&self) -> String {
        match self {
            Matcher::Literal(value) => value.repr(),
            Matcher::Conditional { source, .. } => source.clone(),
            Matcher::StringEq(text) => text.clone(),
            Matcher::RegexMatch { source, .. } => source.clone(),
            Matcher::Wildcard => WILDCARD.to_string(),
            Matcher::NotApplicable => NOT_APPLICABLE.to_string(),
        }
    }

    pub fn is_not_applicable(&self) -> bool {
        matches!(self, Matcher::NotApplicable)
    }
}

/// Compile one body cell according to its column's kind.
///
/// `var` is the bound variable of the column (only used for conditions).
pub fn compile_cell(
    kind: ColumnKind,
    var: char,
    raw: &str,
    bindings: &Bindings,
) -> TableResult<Matcher> {
    // String columns take the markers literally
    if kind != ColumnKind::String {
        if raw == WILDCARD {
            return Ok(Matcher::Wildcard);
        }
        if raw == NOT_APPLICABLE {
            return Ok(Matcher::NotApplicable);
        }
    }

    match kind {
        ColumnKind::Value => Ok(Matcher::Literal(eval_literal(raw, bindings)?)),
        ColumnKind::Condition => Ok(Matcher::Conditional {
            expr: parse_expr(raw, Some(var), bindings)?,
            source: raw.to_string(),
        }),
        ColumnKind::String => Ok(Matcher::StringEq(strip_quotes(raw).to_string())),
        ColumnKind::Regex => {
            let pattern_text = match eval_literal(raw, bindings)? {
                Value::Str(s) => s,
                other => {
                    return Err(TableError::markup(format!(
                        "a regex cell must be a string pattern, got {}",
                        other.repr()
                    )))
                }
            };
            // Full-string match: partial matches are not accepted
            let anchored = format!("^(?:{})$", pattern_text);
            let pattern = Regex::new(&anchored).map_err(|e| {
                TableError::markup(format!("invalid regular expression '{}': {}", pattern_text, e))
            })?;
            Ok(Matcher::RegexMatch {
                pattern,
                source: pattern_text,
            })
        }
    }
}

/// Strip a single layer of surrounding quotes, if present
fn strip_quotes(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    if raw.len() >= 2 {
        let (first, last) = (bytes[0], bytes[raw.len() - 1]);
        if first == last && (first == b'\'' || first == b'"') {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}
