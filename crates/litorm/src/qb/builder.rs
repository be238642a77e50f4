//! QueryBuilder state and chainable configuration methods.

use crate::condition::{Condition, Op};
use crate::orm::Orm;
use crate::qb::join::{JoinClause, JoinConstraint, JoinKind};
use crate::record::Record;
use crate::value::Value;

/// One entry of the SELECT list.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ResultColumn {
    /// A column name, quoted at compile time.
    Column { name: String, alias: Option<String> },
    /// A raw expression, emitted verbatim.
    Expr { expr: String, alias: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Fluent builder for one statement against one table.
///
/// Configuration methods consume and return the builder. `fetch_*` and `count`
/// borrow it mutably; `save` and `delete*` only borrow it. A builder can run one
/// fetch: afterwards it is finalized and further fetches fail with
/// [`OrmError::Finalized`](crate::OrmError::Finalized). Use [`QueryBuilder::fork`]
/// to keep a reusable base.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    pub(crate) orm: Orm,
    pub(crate) table: String,
    pub(crate) table_alias: Option<String>,
    pub(crate) instance_id_column: Option<String>,
    pub(crate) result_columns: Vec<ResultColumn>,
    pub(crate) using_default_columns: bool,
    pub(crate) distinct: bool,
    pub(crate) joins: Vec<JoinClause>,
    pub(crate) conditions: Vec<Condition>,
    pub(crate) group_by: Vec<String>,
    pub(crate) order_by: Vec<(String, SortOrder)>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) raw: Option<(String, Vec<Value>)>,
    pub(crate) finalized: bool,
}

impl QueryBuilder {
    pub(crate) fn new(orm: Orm, table: &str, id_column: Option<String>) -> Self {
        Self {
            orm,
            table: table.to_string(),
            table_alias: None,
            instance_id_column: id_column,
            result_columns: vec![ResultColumn::Expr {
                expr: "*".to_string(),
                alias: None,
            }],
            using_default_columns: true,
            distinct: false,
            joins: Vec::new(),
            conditions: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            raw: None,
            finalized: false,
        }
    }

    /// A fresh builder on another table sharing this builder's connection, config,
    /// log and cache. This builder is unaffected.
    pub fn in_table(&self, table: &str, id_column: Option<&str>) -> QueryBuilder {
        QueryBuilder::new(self.orm.clone(), table, id_column.map(str::to_string))
    }

    /// Duplicate the whole builder state, including the finalized flag.
    pub fn fork(&self) -> QueryBuilder {
        self.clone()
    }

    /// A clause-free builder on the same table and primary key. Records route their
    /// save/delete through it.
    pub(crate) fn owner(&self) -> QueryBuilder {
        QueryBuilder::new(self.orm.clone(), &self.table, self.instance_id_column.clone())
    }

    pub fn orm(&self) -> &Orm {
        &self.orm
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// The primary-key column: per-instance override, then the per-table config
    /// override, then the configured default.
    pub fn id_column(&self) -> &str {
        match &self.instance_id_column {
            Some(column) => column,
            None => self.orm.config().id_column_for(&self.table),
        }
    }

    /// A new record for this table with every field in `data` marked dirty.
    pub fn create_from<I, K, V>(&self, data: I) -> Record
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut record = Record::new(self.owner(), self.id_column());
        for (key, value) in data {
            record.set(key, value);
        }
        record
    }

    /// A new, empty record for this table.
    pub fn create(&self) -> Record {
        Record::new(self.owner(), self.id_column())
    }

    /// Drop every cached SELECT result for this connection.
    pub fn clear_cache(&self) {
        self.orm.query_cache().clear();
    }

    // ==================== SELECT columns ====================

    fn add_result_column(mut self, column: ResultColumn) -> Self {
        if self.using_default_columns {
            self.result_columns.clear();
            self.using_default_columns = false;
        }
        self.result_columns.push(column);
        self
    }

    /// Select a column (quoted).
    pub fn select(self, column: &str) -> Self {
        self.add_result_column(ResultColumn::Column {
            name: column.to_string(),
            alias: None,
        })
    }

    /// Select a column under an alias: `"col" AS "alias"`.
    pub fn select_as(self, column: &str, alias: &str) -> Self {
        self.add_result_column(ResultColumn::Column {
            name: column.to_string(),
            alias: Some(alias.to_string()),
        })
    }

    /// Select a raw expression (not quoted).
    pub fn select_expr(self, expr: &str) -> Self {
        self.add_result_column(ResultColumn::Expr {
            expr: expr.to_string(),
            alias: None,
        })
    }

    /// Select a raw expression under an alias.
    pub fn select_expr_as(self, expr: &str, alias: &str) -> Self {
        self.add_result_column(ResultColumn::Expr {
            expr: expr.to_string(),
            alias: Some(alias.to_string()),
        })
    }

    /// `SELECT DISTINCT`.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Alias the main table: `FROM "table" "alias"`.
    pub fn table_alias(mut self, alias: &str) -> Self {
        self.table_alias = Some(alias.to_string());
        self
    }

    // ==================== JOIN ====================

    fn add_join(
        mut self,
        kind: JoinKind,
        table: &str,
        constraint: JoinConstraint,
        alias: Option<&str>,
    ) -> Self {
        self.joins.push(JoinClause {
            kind,
            table: table.to_string(),
            alias: alias.map(str::to_string),
            constraint,
        });
        self
    }

    /// Add a plain `JOIN`.
    ///
    /// # Example
    /// ```
    /// # let orm = litorm::Orm::open_sqlite_in_memory().unwrap();
    /// let qb = orm
    ///     .table("person")
    ///     .join("profile", ("profile.person_id", "=", "person.id"), Some("p"));
    /// assert_eq!(
    ///     qb.build_select().0,
    ///     "SELECT * FROM `person` JOIN `profile` `p` ON `profile`.`person_id` = `person`.`id`"
    /// );
    /// ```
    pub fn join(self, table: &str, constraint: impl Into<JoinConstraint>, alias: Option<&str>) -> Self {
        self.add_join(JoinKind::Plain, table, constraint.into(), alias)
    }

    pub fn inner_join(
        self,
        table: &str,
        constraint: impl Into<JoinConstraint>,
        alias: Option<&str>,
    ) -> Self {
        self.add_join(JoinKind::Inner, table, constraint.into(), alias)
    }

    pub fn left_outer_join(
        self,
        table: &str,
        constraint: impl Into<JoinConstraint>,
        alias: Option<&str>,
    ) -> Self {
        self.add_join(JoinKind::LeftOuter, table, constraint.into(), alias)
    }

    pub fn right_outer_join(
        self,
        table: &str,
        constraint: impl Into<JoinConstraint>,
        alias: Option<&str>,
    ) -> Self {
        self.add_join(JoinKind::RightOuter, table, constraint.into(), alias)
    }

    pub fn full_outer_join(
        self,
        table: &str,
        constraint: impl Into<JoinConstraint>,
        alias: Option<&str>,
    ) -> Self {
        self.add_join(JoinKind::FullOuter, table, constraint.into(), alias)
    }

    // ==================== WHERE conditions ====================

    /// Add an arbitrary condition.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    fn add_where<T: Into<Value>>(self, column: &str, op: Op<T>) -> Self {
        self.filter(Condition::new(column, op))
    }

    /// `"col" = ?`
    pub fn where_eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.add_where(column, Op::Eq(value.into()))
    }

    /// Shorthand for [`QueryBuilder::where_eq`].
    pub fn where_(self, column: &str, value: impl Into<Value>) -> Self {
        self.where_eq(column, value)
    }

    /// `"col" != ?`
    pub fn where_not_equal(self, column: &str, value: impl Into<Value>) -> Self {
        self.add_where(column, Op::Ne(value.into()))
    }

    /// `"col" > ?`
    pub fn where_gt(self, column: &str, value: impl Into<Value>) -> Self {
        self.add_where(column, Op::Gt(value.into()))
    }

    /// `"col" < ?`
    pub fn where_lt(self, column: &str, value: impl Into<Value>) -> Self {
        self.add_where(column, Op::Lt(value.into()))
    }

    /// `"col" >= ?`
    pub fn where_gte(self, column: &str, value: impl Into<Value>) -> Self {
        self.add_where(column, Op::Gte(value.into()))
    }

    /// `"col" <= ?`
    pub fn where_lte(self, column: &str, value: impl Into<Value>) -> Self {
        self.add_where(column, Op::Lte(value.into()))
    }

    pub fn where_like(self, column: &str, pattern: impl Into<Value>) -> Self {
        self.add_where(column, Op::Like(pattern.into()))
    }

    pub fn where_not_like(self, column: &str, pattern: impl Into<Value>) -> Self {
        self.add_where(column, Op::NotLike(pattern.into()))
    }

    /// `"col" IN (?, ...)`. An empty list matches nothing.
    pub fn where_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.add_where(column, Op::In(values))
    }

    /// `"col" NOT IN (?, ...)`. An empty list matches everything.
    pub fn where_not_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.add_where(column, Op::NotIn(values))
    }

    /// `("col" BETWEEN ? AND ?)`
    pub fn where_between(self, column: &str, from: impl Into<Value>, to: impl Into<Value>) -> Self {
        self.add_where(column, Op::Between(from.into(), to.into()))
    }

    pub fn where_null(self, column: &str) -> Self {
        self.add_where(column, Op::<Value>::IsNull)
    }

    pub fn where_not_null(self, column: &str) -> Self {
        self.add_where(column, Op::<Value>::IsNotNull)
    }

    /// Add a raw clause with `?` placeholders. The clause is not quoted.
    pub fn where_raw(self, clause: &str, values: Vec<Value>) -> Self {
        self.filter(Condition::raw(clause, values))
    }

    /// Equality on the primary-key column.
    pub fn where_id_is(self, id: impl Into<Value>) -> Self {
        let column = self.id_column().to_string();
        self.where_eq(&column, id)
    }

    // ==================== GROUP BY / ORDER BY / paging ====================

    pub fn group_by(mut self, column: &str) -> Self {
        self.group_by.push(column.to_string());
        self
    }

    pub fn order_by_asc(mut self, column: &str) -> Self {
        self.order_by.push((column.to_string(), SortOrder::Asc));
        self
    }

    pub fn order_by_desc(mut self, column: &str) -> Self {
        self.order_by.push((column.to_string(), SortOrder::Desc));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    // ==================== Misc ====================

    /// Override the primary-key column for this builder.
    pub fn primary_key(mut self, column: &str) -> Self {
        self.instance_id_column = Some(column.to_string());
        self
    }

    /// Run `sql` verbatim on the next fetch, ignoring every other clause.
    pub fn raw_query(mut self, sql: &str, values: Vec<Value>) -> Self {
        self.raw = Some((sql.to_string(), values));
        self
    }
}
