//! Query logging and SQL tracing.
//!
//! This module provides:
//! - [`QueryType`] detection from SQL text
//! - [`QueryLog`], an in-memory record of every executed statement with its
//!   parameters interpolated for readability
//! - `tracing` events on target `litorm.sql` for each execution
//!
//! # Example
//!
//! ```
//! use litorm::{QueryLog, Value};
//!
//! let log = QueryLog::new();
//! log.record("SELECT * FROM `t` WHERE `name` = ?", &[Value::from("O'Brien")]);
//! assert_eq!(
//!     log.last_query().as_deref(),
//!     Some("SELECT * FROM `t` WHERE `name` = 'O''Brien'")
//! );
//! ```

use crate::dialect::rewrite_placeholders;
use crate::value::Value;
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Tracing target used for every SQL event.
pub const SQL_TARGET: &str = "litorm.sql";

/// SQL longer than this many bytes is truncated in tracing events.
const MAX_TRACED_SQL: usize = 200;

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// The type of SQL operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    /// SELECT query
    Select,
    /// INSERT statement
    Insert,
    /// REPLACE statement
    Replace,
    /// UPDATE statement
    Update,
    /// DELETE statement
    Delete,
    /// Other SQL (e.g., DDL, custom)
    Other,
}

impl QueryType {
    /// Detect query type from the leading keyword of a SQL string.
    ///
    /// Leading whitespace, comments and opening parentheses are skipped.
    pub fn from_sql(sql: &str) -> Self {
        let trimmed = strip_sql_prefix(sql);
        if starts_with_keyword(trimmed, "SELECT") || starts_with_keyword(trimmed, "WITH") {
            QueryType::Select
        } else if starts_with_keyword(trimmed, "INSERT") {
            QueryType::Insert
        } else if starts_with_keyword(trimmed, "REPLACE") {
            QueryType::Replace
        } else if starts_with_keyword(trimmed, "UPDATE") {
            QueryType::Update
        } else if starts_with_keyword(trimmed, "DELETE") {
            QueryType::Delete
        } else {
            QueryType::Other
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryType::Select => "select",
            QueryType::Insert => "insert",
            QueryType::Replace => "replace",
            QueryType::Update => "update",
            QueryType::Delete => "delete",
            QueryType::Other => "other",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn strip_sql_prefix(sql: &str) -> &str {
    let mut s = sql;
    loop {
        s = s.trim_start();
        if let Some(rest) = s.strip_prefix("--") {
            match rest.find('\n') {
                Some(pos) => s = &rest[pos + 1..],
                None => return "",
            }
        } else if let Some(rest) = s.strip_prefix("/*") {
            match rest.find("*/") {
                Some(pos) => s = &rest[pos + 2..],
                None => return "",
            }
        } else if let Some(rest) = s.strip_prefix('(') {
            s = rest;
        } else {
            return s;
        }
    }
}

fn starts_with_keyword(s: &str, keyword: &str) -> bool {
    s.len() >= keyword.len()
        && s.as_bytes()[..keyword.len()].eq_ignore_ascii_case(keyword.as_bytes())
        && s.as_bytes()
            .get(keyword.len())
            .is_none_or(|b| !b.is_ascii_alphanumeric() && *b != b'_')
}

/// Substitute each `?` in `sql` with the SQL literal of the matching value.
///
/// The output is for humans only. Extra placeholders without a value are left as `?`.
pub fn interpolate(sql: &str, params: &[Value]) -> String {
    rewrite_placeholders(sql, |i| match params.get(i) {
        Some(value) => value.to_sql_literal(),
        None => "?".to_string(),
    })
}

/// In-memory log of executed statements.
///
/// Shared between every builder created from the same [`crate::Orm`]. Only statements
/// that reach the database are recorded; cache hits are not.
#[derive(Debug, Default)]
pub struct QueryLog {
    entries: Mutex<Vec<String>>,
}

impl QueryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `sql` with `params` interpolated.
    pub fn record(&self, sql: &str, params: &[Value]) {
        let line = interpolate(sql, params);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line);
    }

    /// The most recently recorded statement.
    pub fn last_query(&self) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Every recorded statement, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

fn traced_sql(sql: &str) -> String {
    if sql.len() > MAX_TRACED_SQL {
        format!("{}...", truncate_sql_bytes(sql, MAX_TRACED_SQL))
    } else {
        sql.to_string()
    }
}

/// Emit the DEBUG event for a statement about to be executed.
pub(crate) fn trace_execute(table: &str, sql: &str, param_count: usize) {
    tracing::debug!(
        target: SQL_TARGET,
        query_type = %QueryType::from_sql(sql),
        table,
        param_count,
        sql = %traced_sql(sql),
    );
}

/// Emit the TRACE event for a SELECT answered from the cache.
pub(crate) fn trace_cache_hit(table: &str, sql: &str, param_count: usize) {
    tracing::trace!(
        target: SQL_TARGET,
        table,
        param_count,
        sql = %traced_sql(sql),
        "query cache hit"
    );
}

/// Emit the WARN event for a failed statement.
pub(crate) fn trace_failure(table: &str, sql: &str, error: &dyn fmt::Display) {
    tracing::warn!(
        target: SQL_TARGET,
        query_type = %QueryType::from_sql(sql),
        table,
        sql = %traced_sql(sql),
        error = %error,
        "query failed"
    );
}
