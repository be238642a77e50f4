//! SQLite adapter backed by `rusqlite`.

use crate::client::GenericClient;
use crate::error::{OrmError, OrmResult};
use crate::value::{Row, Value};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, params_from_iter};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A [`GenericClient`] over a single SQLite connection.
///
/// The connection is guarded by a `Mutex`, so one client can be shared across threads;
/// statements from different threads are serialised.
#[derive(Debug)]
pub struct SqliteClient {
    conn: Mutex<Connection>,
}

impl SqliteClient {
    /// Open (or create) a database file.
    pub fn open<P: AsRef<Path>>(path: P) -> OrmResult<Self> {
        let conn = Connection::open(path.as_ref()).map_err(|e| {
            OrmError::Connection(format!("{}: {e}", path.as_ref().display()))
        })?;
        Ok(Self::from_connection(conn))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> OrmResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| OrmError::Connection(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already configured connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Run one or more `;`-separated statements without parameters (schema setup, pragmas).
    pub fn execute_batch(&self, sql: &str) -> OrmResult<()> {
        self.lock()
            .execute_batch(sql)
            .map_err(|e| OrmError::execution(sql, e))
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn to_sqlite(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Int(n) => SqlValue::Integer(*n),
        Value::Float(x) => SqlValue::Real(*x),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Bytes(b) => SqlValue::Blob(b.clone()),
    }
}

fn from_sqlite(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::Int(n),
        ValueRef::Real(x) => Value::Float(x),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
    }
}

fn rowid(conn: &Connection) -> Option<Value> {
    match conn.last_insert_rowid() {
        0 => None,
        id => Some(Value::Int(id)),
    }
}

impl GenericClient for SqliteClient {
    fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(sql).map_err(|e| OrmError::execution(sql, e))?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();

        let mut rows = stmt
            .query(params_from_iter(params.iter().map(to_sqlite)))
            .map_err(|e| OrmError::execution(sql, e))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(|e| OrmError::execution(sql, e))? {
            let mut mapped = Row::with_capacity(columns.len());
            for (i, name) in columns.iter().enumerate() {
                let value = row
                    .get_ref(i)
                    .map_err(|e| OrmError::decode(name.as_str(), e.to_string()))?;
                mapped.insert(name.clone(), from_sqlite(value));
            }
            out.push(mapped);
        }
        Ok(out)
    }

    fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        let affected = self
            .lock()
            .execute(sql, params_from_iter(params.iter().map(to_sqlite)))
            .map_err(|e| OrmError::execution(sql, e))?;
        Ok(affected as u64)
    }

    fn last_insert_id(&self) -> OrmResult<Option<Value>> {
        Ok(rowid(&self.lock()))
    }

    fn insert(&self, sql: &str, params: &[Value]) -> OrmResult<(u64, Option<Value>)> {
        let conn = self.lock();
        let affected = conn
            .execute(sql, params_from_iter(params.iter().map(to_sqlite)))
            .map_err(|e| OrmError::execution(sql, e))?;
        Ok((affected as u64, rowid(&conn)))
    }

    fn driver_name(&self) -> &str {
        "sqlite"
    }
}
