//! Row filters, projections and sort orders
//!
//! Filters are SQL fragments with `?` placeholders; their arguments are always
//! bound as parameters. Column names in projections and sort orders are checked
//! against the contract before they reach SQL.

use std::sync::OnceLock;
use regex::Regex;
use crate::{contract, Error, Result};

/// A row filter: `WHERE <clause>` with positional `?` arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub clause: Option<String>,
    pub args: Vec<String>,
}

impl Selection {
    /// Match every row
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(clause: impl Into<String>, args: Vec<String>) -> Self {
        Self { clause: Some(clause.into()), args }
    }

    /// Equality filter on the primary key
    pub fn by_id(id: i64) -> Self {
        Self::new(format!("{} = ?", contract::ID), vec![id.to_string()])
    }

    /// Render as a `WHERE` suffix, or an empty string when unfiltered
    pub(crate) fn where_sql(&self) -> String {
        match self.clause.as_deref().map(str::trim) {
            Some(clause) if !clause.is_empty() => format!(" WHERE {}", clause),
            _ => String::new(),
        }
    }
}

/// Resolve a requested projection to concrete column names.
///
/// An empty or absent projection selects every column.
pub fn resolve_projection(projection: Option<&[&str]>) -> Result<Vec<String>> {
    match projection {
        None | Some([]) => Ok(contract::ALL_COLUMNS.iter().map(|c| c.to_string()).collect()),
        Some(columns) => columns
            .iter()
            .map(|column| {
                if contract::is_known_column(column) {
                    Ok(column.to_string())
                } else {
                    Err(Error::InvalidArgument(format!("unknown column {}", column)))
                }
            })
            .collect(),
    }
}

fn sort_term_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*([a-z_][a-z0-9_]*)(?:\s+(asc|desc))?\s*$").expect("static sort regex")
    })
}

/// Validate and normalize a sort expression such as `price DESC, name`.
pub fn validate_sort_order(sort_order: &str) -> Result<String> {
    let mut terms = Vec::new();
    for term in sort_order.split(',') {
        let caps = sort_term_regex()
            .captures(term)
            .ok_or_else(|| Error::InvalidArgument(format!("invalid sort order {}", sort_order)))?;
        let column = &caps[1];
        if !contract::is_known_column(column) {
            return Err(Error::InvalidArgument(format!("unknown column {}", column)));
        }
        match caps.get(2) {
            Some(direction) => terms.push(format!("{} {}", column, direction.as_str().to_uppercase())),
            None => terms.push(column.to_string()),
        }
    }
    Ok(terms.join(", "))
}
