use crate::cache::QueryCache;
use crate::client::GenericClient;
use crate::config::OrmConfig;
use crate::error::OrmResult;
use crate::monitor::{self, QueryLog};
use crate::qb::QueryBuilder;
use crate::value::{Row, Value};
use std::fmt;
use std::sync::Arc;

/// Shared handle over one database connection.
///
/// An `Orm` owns the client, the configuration, the detected identifier quote
/// character, the [`QueryLog`] and the [`QueryCache`]. Cloning is cheap and every
/// clone (and every builder handed out) shares the same connection, log and cache.
///
/// # Example
/// ```
/// use litorm::{Orm, OrmConfig};
///
/// # fn main() -> litorm::OrmResult<()> {
/// let orm = Orm::open_sqlite_in_memory()?.with_config(OrmConfig::new().logging(true));
/// orm.client().execute("CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT)", &[])?;
///
/// let mut person = orm.table("people").create();
/// person.set("name", "Fred");
/// person.save(false)?;
///
/// let fred = orm.table("people").where_eq("name", "Fred").fetch_one()?;
/// assert!(fred.is_some());
/// assert_eq!(
///     orm.last_query().as_deref(),
///     Some("SELECT * FROM `people` WHERE `name` = 'Fred' LIMIT 1")
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Orm {
    client: Arc<dyn GenericClient>,
    config: Arc<OrmConfig>,
    quote: char,
    log: Arc<QueryLog>,
    cache: Arc<QueryCache>,
}

impl fmt::Debug for Orm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orm")
            .field("driver", &self.client.driver_name())
            .field("config", &self.config)
            .field("quote", &self.quote)
            .finish_non_exhaustive()
    }
}

impl Orm {
    /// Wrap a client with the default configuration.
    pub fn new<C: GenericClient + 'static>(client: C) -> Self {
        Self::from_shared(Arc::new(client))
    }

    /// Wrap an already shared client.
    pub fn from_shared(client: Arc<dyn GenericClient>) -> Self {
        let config = OrmConfig::default();
        let quote = resolve_quote(client.as_ref(), &config);
        Self {
            client,
            config: Arc::new(config),
            quote,
            log: Arc::new(QueryLog::new()),
            cache: Arc::new(QueryCache::new()),
        }
    }

    /// Replace the configuration. The client, log and cache stay shared.
    pub fn with_config(mut self, config: OrmConfig) -> Self {
        self.quote = resolve_quote(self.client.as_ref(), &config);
        self.config = Arc::new(config);
        self
    }

    /// Record statements into `log` instead of the handle's own log.
    pub fn with_query_log(mut self, log: Arc<QueryLog>) -> Self {
        self.log = log;
        self
    }

    /// Cache results in `cache` instead of the handle's own cache.
    pub fn with_query_cache(mut self, cache: Arc<QueryCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Start a builder over `table`.
    pub fn table(&self, table: &str) -> QueryBuilder {
        QueryBuilder::new(self.clone(), table, None)
    }

    /// Start a builder over `table` whose primary key is `id_column`.
    pub fn table_with_key(&self, table: &str, id_column: &str) -> QueryBuilder {
        QueryBuilder::new(self.clone(), table, Some(id_column.to_string()))
    }

    pub fn client(&self) -> &dyn GenericClient {
        self.client.as_ref()
    }

    pub fn config(&self) -> &OrmConfig {
        &self.config
    }

    /// The identifier quote character in effect.
    pub fn quote_char(&self) -> char {
        self.quote
    }

    pub fn query_log(&self) -> &Arc<QueryLog> {
        &self.log
    }

    pub fn query_cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    /// The last statement recorded in the query log, if logging is enabled.
    pub fn last_query(&self) -> Option<String> {
        self.log.last_query()
    }

    // ==================== Execution ====================

    /// Run a SELECT through the cache, the log and the client.
    pub(crate) fn query_rows(&self, table: &str, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        let cache_key = self
            .config
            .caching
            .then(|| QueryCache::key(sql, params));

        if let Some(key) = &cache_key {
            if let Some(rows) = self.cache.get(key) {
                monitor::trace_cache_hit(table, sql, params.len());
                return Ok(rows);
            }
        }

        self.before_execute(table, sql, params);
        let rows = self.client.query(sql, params).inspect_err(|e| {
            monitor::trace_failure(table, sql, e);
        })?;

        if let Some(key) = cache_key {
            self.cache.insert(key, rows.clone());
        }
        Ok(rows)
    }

    /// Run an INSERT/UPDATE/REPLACE/DELETE through the log and the client.
    pub(crate) fn execute_statement(&self, table: &str, sql: &str, params: &[Value]) -> OrmResult<u64> {
        self.before_execute(table, sql, params);
        self.client.execute(sql, params).inspect_err(|e| {
            monitor::trace_failure(table, sql, e);
        })
    }

    /// Run an INSERT/REPLACE and read the generated id in the same client call.
    pub(crate) fn insert_statement(
        &self,
        table: &str,
        sql: &str,
        params: &[Value],
    ) -> OrmResult<(u64, Option<Value>)> {
        self.before_execute(table, sql, params);
        self.client.insert(sql, params).inspect_err(|e| {
            monitor::trace_failure(table, sql, e);
        })
    }

    fn before_execute(&self, table: &str, sql: &str, params: &[Value]) {
        monitor::trace_execute(table, sql, params.len());
        if self.config.logging {
            self.log.record(sql, params);
        }
    }
}

fn resolve_quote(client: &dyn GenericClient, config: &OrmConfig) -> char {
    config
        .identifier_quote_character
        .unwrap_or_else(|| client.dialect().quote_char())
}

#[cfg(feature = "sqlite")]
impl Orm {
    /// Open (or create) a SQLite database file.
    pub fn open_sqlite<P: AsRef<std::path::Path>>(path: P) -> OrmResult<Self> {
        Ok(Self::new(crate::sqlite::SqliteClient::open(path)?))
    }

    /// Open a private in-memory SQLite database.
    pub fn open_sqlite_in_memory() -> OrmResult<Self> {
        Ok(Self::new(crate::sqlite::SqliteClient::open_in_memory()?))
    }
}

#[cfg(feature = "postgres")]
impl Orm {
    /// Connect to PostgreSQL.
    pub fn connect_postgres(url: &str) -> OrmResult<Self> {
        Ok(Self::new(crate::postgres::PgClient::connect(url)?))
    }
}
