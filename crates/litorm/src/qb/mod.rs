//! Fluent query builder.
//!
//! A [`QueryBuilder`] accumulates the clauses of one statement against one table and
//! compiles them to SQL with `?` placeholders plus a positional list of [`Value`]s.
//!
//! # Features
//!
//! - **Dialect-aware quoting**: identifiers are quoted per dotted segment with the
//!   connection's quote character; raw expressions and clauses are emitted as given
//! - **Single use**: a builder runs one fetch, then it is finalized; `fork()` first to reuse
//! - **Active record**: fetches hydrate [`Record`]s that save and delete themselves
//!
//! # Usage
//!
//! ```
//! use litorm::{Count, Orm};
//!
//! # fn main() -> litorm::OrmResult<()> {
//! let orm = Orm::open_sqlite_in_memory()?;
//! orm.client().execute("CREATE TABLE widget (id INTEGER PRIMARY KEY, name TEXT, age INTEGER)", &[])?;
//!
//! let mut widget = orm.table("widget").create_from([("name", "bolt")]);
//! widget.set("age", 3);
//! widget.save(false)?;
//!
//! let found = orm
//!     .table("widget")
//!     .where_eq("name", "bolt")
//!     .where_gte("age", 1)
//!     .order_by_desc("age")
//!     .fetch_all()?;
//! assert_eq!(found.len(), 1);
//!
//! let count = orm.table("widget").where_lt("age", 10).count()?;
//! assert_eq!(count, Count::Total(1));
//! # Ok(())
//! # }
//! ```
//!
//! [`Value`]: crate::Value
//! [`Record`]: crate::Record

mod builder;
mod compile;
mod exec;
mod join;

pub use builder::{QueryBuilder, SortOrder};
pub use exec::Count;
pub use join::{JoinClause, JoinConstraint, JoinKind};
