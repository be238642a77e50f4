//! WHERE-clause condition types.
//!
//! This module provides [`Op`] (operator) and [`Condition`] primitives. A [`QueryBuilder`]
//! stores its WHERE clause as an ordered list of conditions that are joined with `AND`
//! when the statement is compiled.
//!
//! [`QueryBuilder`]: crate::QueryBuilder

use crate::ident::Ident;
use crate::value::Value;

/// Comparison operator for a single-column condition.
///
/// # Example
/// ```
/// use litorm::{Condition, Op};
///
/// let cond = Condition::new("age", Op::gte(18));
/// assert_eq!(cond.build('"'), (r#""age" >= ?"#.to_string(), vec![18.into()]));
///
/// let cond = Condition::new("id", Op::in_list(vec![1, 2, 3]));
/// assert_eq!(cond.build('`').0, "`id` IN (?, ?, ?)");
/// ```
#[derive(Debug, Clone)]
pub enum Op<T> {
    /// Equal: column = value
    Eq(T),
    /// Not equal: column != value
    Ne(T),
    /// Greater than: column > value
    Gt(T),
    /// Greater than or equal: column >= value
    Gte(T),
    /// Less than: column < value
    Lt(T),
    /// Less than or equal: column <= value
    Lte(T),
    /// LIKE pattern match
    Like(T),
    /// NOT LIKE pattern match
    NotLike(T),
    /// IS NULL
    IsNull,
    /// IS NOT NULL
    IsNotNull,
    /// IN (list)
    In(Vec<T>),
    /// NOT IN (list)
    NotIn(Vec<T>),
    /// BETWEEN a AND b
    Between(T, T),
}

impl<T> Op<T> {
    pub fn eq(val: T) -> Self {
        Op::Eq(val)
    }

    pub fn ne(val: T) -> Self {
        Op::Ne(val)
    }

    pub fn gt(val: T) -> Self {
        Op::Gt(val)
    }

    pub fn gte(val: T) -> Self {
        Op::Gte(val)
    }

    pub fn lt(val: T) -> Self {
        Op::Lt(val)
    }

    pub fn lte(val: T) -> Self {
        Op::Lte(val)
    }

    pub fn like(val: T) -> Self {
        Op::Like(val)
    }

    pub fn not_like(val: T) -> Self {
        Op::NotLike(val)
    }

    pub fn is_null() -> Self {
        Op::IsNull
    }

    pub fn is_not_null() -> Self {
        Op::IsNotNull
    }

    pub fn in_list(vals: Vec<T>) -> Self {
        Op::In(vals)
    }

    pub fn not_in(vals: Vec<T>) -> Self {
        Op::NotIn(vals)
    }

    pub fn between(from: T, to: T) -> Self {
        Op::Between(from, to)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ConditionValue {
    Single(Value),
    Pair(Value, Value),
    List(Vec<Value>),
    None,
}

#[derive(Debug, Clone, PartialEq)]
enum ConditionInner {
    /// Raw SQL fragment plus the values for its `?` placeholders.
    Raw { sql: String, values: Vec<Value> },
    Expr {
        column: Ident,
        operator: &'static str,
        value: ConditionValue,
    },
}

/// One WHERE fragment with its bound values.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition(ConditionInner);

impl Condition {
    /// Create a structured condition over `column`.
    pub fn new<T: Into<Value>>(column: &str, op: Op<T>) -> Self {
        let column = Ident::parse(column);
        let (operator, value) = match op {
            Op::Eq(v) => ("=", ConditionValue::Single(v.into())),
            Op::Ne(v) => ("!=", ConditionValue::Single(v.into())),
            Op::Gt(v) => (">", ConditionValue::Single(v.into())),
            Op::Gte(v) => (">=", ConditionValue::Single(v.into())),
            Op::Lt(v) => ("<", ConditionValue::Single(v.into())),
            Op::Lte(v) => ("<=", ConditionValue::Single(v.into())),
            Op::Like(v) => ("LIKE", ConditionValue::Single(v.into())),
            Op::NotLike(v) => ("NOT LIKE", ConditionValue::Single(v.into())),
            Op::IsNull => ("IS NULL", ConditionValue::None),
            Op::IsNotNull => ("IS NOT NULL", ConditionValue::None),
            Op::In(vals) => (
                "IN",
                ConditionValue::List(vals.into_iter().map(Into::into).collect()),
            ),
            Op::NotIn(vals) => (
                "NOT IN",
                ConditionValue::List(vals.into_iter().map(Into::into).collect()),
            ),
            Op::Between(from, to) => ("BETWEEN", ConditionValue::Pair(from.into(), to.into())),
        };

        Condition(ConditionInner::Expr {
            column,
            operator,
            value,
        })
    }

    /// Create a raw SQL condition. `sql` is emitted verbatim and never quoted.
    ///
    /// # Safety
    /// Be careful with SQL injection when using raw conditions.
    pub fn raw<I, V>(sql: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Condition(ConditionInner::Raw {
            sql: sql.into(),
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    /// Number of values this condition binds.
    pub fn param_count(&self) -> usize {
        match &self.0 {
            ConditionInner::Raw { values, .. } => values.len(),
            ConditionInner::Expr { value, .. } => match value {
                ConditionValue::Single(_) => 1,
                ConditionValue::Pair(..) => 2,
                ConditionValue::List(vals) => vals.len(),
                ConditionValue::None => 0,
            },
        }
    }

    /// Compile the condition into its SQL fragment and bound values.
    pub fn build(&self, quote: char) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut params = Vec::with_capacity(self.param_count());
        self.append_to(quote, &mut sql, &mut params);
        (sql, params)
    }

    pub(crate) fn append_to(&self, quote: char, sql: &mut String, params: &mut Vec<Value>) {
        match &self.0 {
            ConditionInner::Raw { sql: raw, values } => {
                sql.push_str(raw);
                params.extend(values.iter().cloned());
            }
            ConditionInner::Expr {
                column,
                operator,
                value,
            } => match value {
                ConditionValue::List(vals) if vals.is_empty() => {
                    // Empty IN list - always false / true
                    if *operator == "IN" {
                        sql.push_str("1=0");
                    } else {
                        sql.push_str("1=1");
                    }
                }
                ConditionValue::Single(v) => {
                    column.write_sql(quote, sql);
                    sql.push(' ');
                    sql.push_str(operator);
                    sql.push_str(" ?");
                    params.push(v.clone());
                }
                ConditionValue::Pair(a, b) => {
                    sql.push('(');
                    column.write_sql(quote, sql);
                    sql.push(' ');
                    sql.push_str(operator);
                    sql.push_str(" ? AND ?)");
                    params.push(a.clone());
                    params.push(b.clone());
                }
                ConditionValue::List(vals) => {
                    column.write_sql(quote, sql);
                    sql.push(' ');
                    sql.push_str(operator);
                    sql.push_str(" (");
                    for (i, v) in vals.iter().enumerate() {
                        if i > 0 {
                            sql.push_str(", ");
                        }
                        sql.push('?');
                        params.push(v.clone());
                    }
                    sql.push(')');
                }
                ConditionValue::None => {
                    column.write_sql(quote, sql);
                    sql.push(' ');
                    sql.push_str(operator);
                }
            },
        }
    }
}
