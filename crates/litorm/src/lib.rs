//! # litorm
//!
//! A small active-record ORM with a fluent, dialect-aware SQL query builder.
//!
//! ## Features
//!
//! - **Fluent builder**: SELECT with joins, WHERE, GROUP BY, ORDER BY and paging from chained calls
//! - **Active record**: fetched rows are [`Record`]s that track dirty fields and save or delete themselves
//! - **Dialect-aware quoting**: backticks for SQLite/MySQL, double quotes for PostgreSQL/SQL Server
//! - **Query log and cache**: opt-in, shared by every builder from the same [`Orm`]
//! - **Structured logging**: every statement is traced on target `litorm.sql`
//! - **Pluggable drivers**: anything implementing [`GenericClient`]; SQLite (default) and
//!   PostgreSQL adapters included
//!
//! ## Query Builder
//!
//! ```
//! use litorm::{Orm, OrmConfig};
//!
//! # fn main() -> litorm::OrmResult<()> {
//! let orm = Orm::open_sqlite_in_memory()?.with_config(OrmConfig::new().logging(true));
//! orm.client().execute(
//!     "CREATE TABLE person (id INTEGER PRIMARY KEY, name TEXT, age INTEGER)",
//!     &[],
//! )?;
//!
//! // INSERT
//! let mut person = orm.table("person").create();
//! person.set("name", "Fred").set("age", 30);
//! person.save(false)?;
//! assert_eq!(person.get_as::<i64>("id")?, 1);
//!
//! // UPDATE
//! person.set("age", 31);
//! person.save(false)?;
//! assert_eq!(
//!     orm.last_query().as_deref(),
//!     Some("UPDATE `person` SET `age` = 31 WHERE `id` = 1")
//! );
//!
//! // SELECT
//! let adults = orm
//!     .table("person")
//!     .where_gte("age", 18)
//!     .order_by_asc("name")
//!     .limit(10)
//!     .fetch_all()?;
//! assert_eq!(adults.len(), 1);
//!
//! // DELETE
//! adults[0].delete()?;
//! assert_eq!(orm.table("person").count()?.total(), Some(0));
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod condition;
pub mod config;
pub mod dialect;
pub mod error;
pub mod ident;
pub mod monitor;
pub mod orm;
pub mod qb;
pub mod record;
pub mod value;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use cache::QueryCache;
pub use client::GenericClient;
pub use condition::{Condition, Op};
pub use config::OrmConfig;
pub use dialect::Dialect;
pub use error::{OrmError, OrmResult};
pub use ident::{Ident, quote_identifier};
pub use monitor::{QueryLog, QueryType};
pub use orm::Orm;
pub use qb::{Count, JoinClause, JoinConstraint, JoinKind, QueryBuilder, SortOrder};
pub use record::Record;
pub use value::{FromValue, Row, Value};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteClient;

#[cfg(feature = "postgres")]
pub use postgres::PgClient;
