//! JOIN clause types.

use crate::ident::Ident;

/// Which JOIN keyword to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Plain `JOIN`
    Plain,
    Inner,
    LeftOuter,
    RightOuter,
    /// `FULL OUTER JOIN`. Compiled everywhere; fails at execution on databases without it.
    FullOuter,
}

impl JoinKind {
    pub fn keyword(self) -> &'static str {
        match self {
            JoinKind::Plain => "JOIN",
            JoinKind::Inner => "INNER JOIN",
            JoinKind::LeftOuter => "LEFT OUTER JOIN",
            JoinKind::RightOuter => "RIGHT OUTER JOIN",
            JoinKind::FullOuter => "FULL OUTER JOIN",
        }
    }
}

/// The `ON` part of a join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinConstraint {
    /// Emitted verbatim.
    Raw(String),
    /// `left op right` with both columns quoted.
    On(String, String, String),
}

impl From<&str> for JoinConstraint {
    fn from(s: &str) -> Self {
        JoinConstraint::Raw(s.to_string())
    }
}

impl From<String> for JoinConstraint {
    fn from(s: String) -> Self {
        JoinConstraint::Raw(s)
    }
}

impl From<(&str, &str, &str)> for JoinConstraint {
    fn from((left, op, right): (&str, &str, &str)) -> Self {
        JoinConstraint::On(left.to_string(), op.to_string(), right.to_string())
    }
}

/// One JOIN source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinClause {
    pub kind: JoinKind,
    pub table: String,
    pub alias: Option<String>,
    pub constraint: JoinConstraint,
}

impl JoinClause {
    pub(crate) fn write_sql(&self, quote: char, out: &mut String) {
        out.push_str(self.kind.keyword());
        out.push(' ');
        Ident::parse(&self.table).write_sql(quote, out);
        if let Some(alias) = &self.alias {
            out.push(' ');
            Ident::parse(alias).write_sql(quote, out);
        }
        out.push_str(" ON ");
        match &self.constraint {
            JoinConstraint::Raw(raw) => out.push_str(raw),
            JoinConstraint::On(left, op, right) => {
                Ident::parse(left).write_sql(quote, out);
                out.push(' ');
                out.push_str(op);
                out.push(' ');
                Ident::parse(right).write_sql(quote, out);
            }
        }
    }
}
