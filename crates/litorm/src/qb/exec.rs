//! Terminal operations: fetch, count, save and delete.

use crate::condition::{Condition, Op};
use crate::error::{OrmError, OrmResult};
use crate::qb::builder::{QueryBuilder, ResultColumn};
use crate::record::Record;
use crate::value::{FromValue, Row, Value};

/// Result of [`QueryBuilder::count`].
#[derive(Debug, Clone, PartialEq)]
pub enum Count {
    /// Row count of an ungrouped query (0 when no row came back).
    Total(i64),
    /// One row per group: the GROUP BY columns followed by `count`.
    Grouped(Vec<Row>),
}

impl Count {
    /// The total for an ungrouped count.
    pub fn total(&self) -> Option<i64> {
        match self {
            Count::Total(n) => Some(*n),
            Count::Grouped(_) => None,
        }
    }

    /// The per-group rows for a grouped count.
    pub fn groups(&self) -> Option<&[Row]> {
        match self {
            Count::Total(_) => None,
            Count::Grouped(rows) => Some(rows),
        }
    }
}

impl QueryBuilder {
    fn begin_fetch(&mut self) -> OrmResult<()> {
        if self.finalized {
            return Err(OrmError::Finalized);
        }
        self.finalized = true;
        Ok(())
    }

    fn run(&self) -> OrmResult<Vec<Row>> {
        let (sql, values) = self.build_select();
        self.orm.query_rows(&self.table, &sql, &values)
    }

    fn hydrate(&self, row: Row) -> Record {
        Record::loaded(self.owner(), self.id_column(), row)
    }

    fn fetch_first(&mut self, id: Option<Value>) -> OrmResult<Option<Record>> {
        self.begin_fetch()?;
        if let Some(id) = id {
            let column = self.id_column().to_string();
            self.conditions.push(Condition::new(&column, Op::Eq(id)));
        }
        self.limit = Some(1);
        let rows = self.run()?;
        Ok(rows.into_iter().next().map(|row| self.hydrate(row)))
    }

    // ==================== Fetch ====================

    /// Fetch the first matching row (`LIMIT 1`), or `None`.
    pub fn fetch_one(&mut self) -> OrmResult<Option<Record>> {
        self.fetch_first(None)
    }

    /// Fetch the row whose primary key equals `id`, on top of any other conditions.
    pub fn fetch_one_by_id(&mut self, id: impl Into<Value>) -> OrmResult<Option<Record>> {
        self.fetch_first(Some(id.into()))
    }

    /// Like [`QueryBuilder::fetch_one`], but yields a new empty record when nothing matched.
    pub fn fetch_one_force(&mut self) -> OrmResult<Record> {
        let found = self.fetch_first(None)?;
        Ok(found.unwrap_or_else(|| self.create()))
    }

    /// Like [`QueryBuilder::fetch_one_by_id`], but yields a new empty record when nothing matched.
    pub fn fetch_one_force_by_id(&mut self, id: impl Into<Value>) -> OrmResult<Record> {
        let found = self.fetch_first(Some(id.into()))?;
        Ok(found.unwrap_or_else(|| self.create()))
    }

    /// Fetch every matching row.
    pub fn fetch_all(&mut self) -> OrmResult<Vec<Record>> {
        self.begin_fetch()?;
        let rows = self.run()?;
        Ok(rows.into_iter().map(|row| self.hydrate(row)).collect())
    }

    /// Count matching rows.
    ///
    /// The select list is replaced with `COUNT(*) AS "count"`, preceded by the GROUP BY
    /// columns when there are any. Ungrouped counts return [`Count::Total`]; grouped counts
    /// return every group row as [`Count::Grouped`].
    pub fn count(&mut self) -> OrmResult<Count> {
        self.begin_fetch()?;

        let mut columns: Vec<ResultColumn> = self
            .group_by
            .iter()
            .map(|name| ResultColumn::Column {
                name: name.clone(),
                alias: None,
            })
            .collect();
        columns.push(ResultColumn::Expr {
            expr: "COUNT(*)".to_string(),
            alias: Some("count".to_string()),
        });
        self.result_columns = columns;
        self.using_default_columns = false;

        if !self.group_by.is_empty() {
            return Ok(Count::Grouped(self.run()?));
        }

        self.limit = Some(1);
        let rows = self.run()?;
        let total = match rows.first().and_then(|row| row.get("count")) {
            Some(value) => i64::from_value("count", value)?,
            None => 0,
        };
        Ok(Count::Total(total))
    }

    // ==================== Persistence ====================

    /// Write a record's dirty fields.
    ///
    /// - loaded record, nothing dirty: no statement, returns `Ok(0)`
    /// - loaded record: `UPDATE ... WHERE "pk" = ?` over the dirty fields
    /// - new record: `INSERT`, or `REPLACE` when `force` is set; afterwards the record is
    ///   persisted and, if it had no id, gets the id generated by that statement
    ///
    /// The dirty set is cleared after every successful write. A failed write leaves the
    /// record untouched.
    pub fn save(&self, record: &mut Record, force: bool) -> OrmResult<u64> {
        let is_new = record.is_new();
        if !is_new && record.dirty_count() == 0 {
            return Ok(0);
        }

        let affected = if is_new {
            let (sql, values) = self.build_insert(record, force);
            let (affected, generated) = self.orm.insert_statement(&self.table, &sql, &values)?;
            record.mark_persisted();
            if record.id().is_none() {
                if let Some(id) = generated {
                    let column = record.id_column().to_string();
                    record.set_field(column, id);
                }
            }
            affected
        } else {
            let (sql, values) = self.build_update(record)?;
            self.orm.execute_statement(&self.table, &sql, &values)?
        };
        record.reset_dirty();
        Ok(affected)
    }

    /// `DELETE FROM "t"` with the accumulated conditions.
    ///
    /// Without any condition every row of the table is deleted.
    pub fn delete(&self) -> OrmResult<u64> {
        let (sql, values) = self.build_delete();
        self.orm.execute_statement(&self.table, &sql, &values)
    }

    /// Delete the row backing `record`, matched by primary key only.
    pub fn delete_record(&self, record: &Record) -> OrmResult<u64> {
        let id = record.id().ok_or(OrmError::MissingPrimaryKey)?.clone();
        self.owner().where_eq(record.id_column(), id).delete()
    }

    /// Delete by primary key, on top of the accumulated conditions.
    pub fn delete_by_id(&self, id: impl Into<Value>) -> OrmResult<u64> {
        self.fork().where_id_is(id).delete()
    }
}
