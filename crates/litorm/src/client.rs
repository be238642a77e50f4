//! Generic client trait for unified database access.

use crate::dialect::Dialect;
use crate::error::OrmResult;
use crate::value::{Row, Value};

/// A trait that unifies database drivers behind one blocking interface.
///
/// Query builders only ever see SQL with `?` placeholders and a positional list of
/// [`Value`]s; an implementation is responsible for binding them, running the
/// statement and mapping result columns back into [`Value`]s.
///
/// Implementations are shared as `Arc<dyn GenericClient>`, so they must be `Send + Sync`
/// and guard any interior mutability themselves.
pub trait GenericClient: Send + Sync {
    /// Execute a query and return all rows.
    fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>>;

    /// Execute a statement and return the number of affected rows.
    fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64>;

    /// The identifier generated by the most recent INSERT on this connection.
    ///
    /// Returns `Ok(None)` when the driver has no such value.
    fn last_insert_id(&self) -> OrmResult<Option<Value>>;

    /// Execute an INSERT/REPLACE and return the affected rows with the generated id.
    ///
    /// The id must belong to this statement even when the client is shared between
    /// threads. Implementations with interior locking override this to run both steps
    /// under one lock; the default is only correct for single-threaded clients.
    fn insert(&self, sql: &str, params: &[Value]) -> OrmResult<(u64, Option<Value>)> {
        let affected = self.execute(sql, params)?;
        Ok((affected, self.last_insert_id()?))
    }

    /// Driver name (`"sqlite"`, `"pgsql"`, `"mysql"`, ...).
    fn driver_name(&self) -> &str;

    /// The dialect used to pick the identifier quote character.
    ///
    /// The default implementation maps [`GenericClient::driver_name`].
    fn dialect(&self) -> Dialect {
        Dialect::from_driver_name(self.driver_name())
    }
}
