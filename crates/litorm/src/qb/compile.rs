//! SQL compilation.
//!
//! Every statement is compiled to SQL with `?` placeholders plus the positional list of
//! values to bind. Fragments are joined with single spaces and empty fragments are
//! skipped, so a bare builder compiles to `SELECT * FROM "table"`.

use crate::error::{OrmError, OrmResult};
use crate::ident::Ident;
use crate::qb::builder::{QueryBuilder, ResultColumn};
use crate::record::Record;
use crate::value::Value;

fn push_ident(out: &mut String, name: &str, quote: char) {
    Ident::parse(name).write_sql(quote, out);
}

fn push_placeholders(out: &mut String, count: usize) {
    for i in 0..count {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('?');
    }
}

impl QueryBuilder {
    fn quote(&self) -> char {
        self.orm.quote_char()
    }

    /// Compile the SELECT statement for the current state.
    ///
    /// A raw query, when set, is returned verbatim with its values.
    pub fn build_select(&self) -> (String, Vec<Value>) {
        if let Some((sql, values)) = &self.raw {
            return (sql.clone(), values.clone());
        }

        let (where_sql, values) = self.build_where();
        let parts = [
            self.build_select_start(),
            self.build_joins(),
            where_sql,
            self.build_group_by(),
            self.build_order_by(),
            self.limit.map(|n| format!("LIMIT {n}")).unwrap_or_default(),
            self.offset.map(|n| format!("OFFSET {n}")).unwrap_or_default(),
        ];

        let sql = parts
            .iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        (sql, values)
    }

    fn build_select_start(&self) -> String {
        let quote = self.quote();
        let mut out = String::from("SELECT ");
        if self.distinct {
            out.push_str("DISTINCT ");
        }
        for (i, column) in self.result_columns.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let alias = match column {
                ResultColumn::Column { name, alias } => {
                    push_ident(&mut out, name, quote);
                    alias
                }
                ResultColumn::Expr { expr, alias } => {
                    out.push_str(expr);
                    alias
                }
            };
            if let Some(alias) = alias {
                out.push_str(" AS ");
                push_ident(&mut out, alias, quote);
            }
        }
        out.push_str(" FROM ");
        push_ident(&mut out, &self.table, quote);
        if let Some(alias) = &self.table_alias {
            out.push(' ');
            push_ident(&mut out, alias, quote);
        }
        out
    }

    fn build_joins(&self) -> String {
        let quote = self.quote();
        let mut out = String::new();
        for (i, join) in self.joins.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            join.write_sql(quote, &mut out);
        }
        out
    }

    /// `WHERE a AND b ...` and the values in clause order; empty when there are no conditions.
    pub(crate) fn build_where(&self) -> (String, Vec<Value>) {
        if self.conditions.is_empty() {
            return (String::new(), Vec::new());
        }
        let quote = self.quote();
        let mut sql = String::from("WHERE ");
        let mut values = Vec::new();
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                sql.push_str(" AND ");
            }
            condition.append_to(quote, &mut sql, &mut values);
        }
        (sql, values)
    }

    fn build_group_by(&self) -> String {
        if self.group_by.is_empty() {
            return String::new();
        }
        let quote = self.quote();
        let mut out = String::from("GROUP BY ");
        for (i, column) in self.group_by.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            push_ident(&mut out, column, quote);
        }
        out
    }

    fn build_order_by(&self) -> String {
        if self.order_by.is_empty() {
            return String::new();
        }
        let quote = self.quote();
        let mut out = String::from("ORDER BY ");
        for (i, (column, order)) in self.order_by.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            push_ident(&mut out, column, quote);
            out.push(' ');
            out.push_str(order.as_sql());
        }
        out
    }

    /// Compile the INSERT (or `REPLACE` when `force`) for a new record's dirty fields.
    ///
    /// A record with no dirty fields compiles to `INSERT INTO "t" DEFAULT VALUES`.
    pub fn build_insert(&self, record: &Record, force: bool) -> (String, Vec<Value>) {
        let quote = self.quote();
        let dirty = record.dirty_fields();
        let mut sql = String::from(if force { "REPLACE INTO " } else { "INSERT INTO " });
        push_ident(&mut sql, &self.table, quote);

        if dirty.is_empty() {
            sql.push_str(" DEFAULT VALUES");
            return (sql, Vec::new());
        }

        sql.push_str(" (");
        for (i, (key, _)) in dirty.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            push_ident(&mut sql, key, quote);
        }
        sql.push_str(") VALUES (");
        push_placeholders(&mut sql, dirty.len());
        sql.push(')');

        let values = dirty.into_iter().map(|(_, v)| v.clone()).collect();
        (sql, values)
    }

    /// Compile `UPDATE "t" SET "a" = ?, ... WHERE "pk" = ?` over the dirty fields.
    ///
    /// Fails with [`OrmError::MissingPrimaryKey`] when the record has no id.
    pub fn build_update(&self, record: &Record) -> OrmResult<(String, Vec<Value>)> {
        let id = record.id().ok_or(OrmError::MissingPrimaryKey)?;
        let quote = self.quote();
        let dirty = record.dirty_fields();

        let mut sql = String::from("UPDATE ");
        push_ident(&mut sql, &self.table, quote);
        sql.push_str(" SET ");
        for (i, (key, _)) in dirty.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            push_ident(&mut sql, key, quote);
            sql.push_str(" = ?");
        }
        sql.push_str(" WHERE ");
        push_ident(&mut sql, record.id_column(), quote);
        sql.push_str(" = ?");

        let mut values: Vec<Value> = dirty.into_iter().map(|(_, v)| v.clone()).collect();
        values.push(id.clone());
        Ok((sql, values))
    }

    /// Compile `DELETE FROM "t"` with the accumulated WHERE conditions.
    ///
    /// With no conditions this deletes every row.
    pub fn build_delete(&self) -> (String, Vec<Value>) {
        let mut sql = String::from("DELETE FROM ");
        push_ident(&mut sql, &self.table, self.quote());
        let (where_sql, values) = self.build_where();
        if !where_sql.is_empty() {
            sql.push(' ');
            sql.push_str(&where_sql);
        }
        (sql, values)
    }
}
