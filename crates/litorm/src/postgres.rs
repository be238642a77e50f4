//! PostgreSQL adapter backed by `tokio-postgres`.
//!
//! The async client is driven by a private current-thread `tokio` runtime, so callers
//! get the same blocking interface as every other [`GenericClient`]. SQL arrives with
//! `?` placeholders and is renumbered to `$1, $2, ...` before it is sent.

use crate::client::GenericClient;
use crate::dialect::rewrite_placeholders;
use crate::error::{OrmError, OrmResult};
use crate::value::{Row, Value};
use bytes::BytesMut;
use std::error::Error;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::runtime::Runtime;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use tokio_postgres::{Client, NoTls};

type BoxError = Box<dyn Error + Sync + Send>;

/// A blocking [`GenericClient`] over one PostgreSQL connection.
///
/// Statements from different threads are serialised so that `lastval()` after an
/// insert always sees that insert.
pub struct PgClient {
    runtime: Runtime,
    client: Client,
    session: Mutex<()>,
}

impl std::fmt::Debug for PgClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgClient").finish_non_exhaustive()
    }
}

impl PgClient {
    /// Connect with a `postgres://` URL or key/value connection string.
    pub fn connect(url: &str) -> OrmResult<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| OrmError::Connection(e.to_string()))?;

        let (client, connection) = runtime
            .block_on(tokio_postgres::connect(url, NoTls))
            .map_err(|e| OrmError::Connection(e.to_string()))?;

        runtime.spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(target: "litorm.sql", error = %e, "postgres connection closed");
            }
        });

        Ok(Self {
            runtime,
            client,
            session: Mutex::new(()),
        })
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn execute_locked(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        let pg_sql = renumber_placeholders(sql);
        let refs: Vec<&(dyn ToSql + Sync)> = params.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
        self.runtime
            .block_on(self.client.execute(pg_sql.as_str(), &refs))
            .map_err(|e| OrmError::execution(sql, e))
    }

    fn lastval_locked(&self) -> Option<Value> {
        // lastval() errors when no sequence was used in this session.
        match self
            .runtime
            .block_on(self.client.query_opt("SELECT lastval()", &[]))
        {
            Ok(Some(row)) => row.try_get::<_, Option<i64>>(0).ok().flatten().map(Value::Int),
            Ok(None) | Err(_) => None,
        }
    }
}

/// Rewrite `?` placeholders to PostgreSQL's `$n` form.
pub fn renumber_placeholders(sql: &str) -> String {
    rewrite_placeholders(sql, |i| format!("${}", i + 1))
}

fn int_to_sql(n: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(n)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(n)?.to_sql(ty, out),
        Type::OID => u32::try_from(n)?.to_sql(ty, out),
        Type::FLOAT4 => (n as f32).to_sql(ty, out),
        Type::FLOAT8 => (n as f64).to_sql(ty, out),
        Type::BOOL => (n != 0).to_sql(ty, out),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => n.to_string().to_sql(ty, out),
        _ => n.to_sql(ty, out),
    }
}

fn text_to_sql(s: &str, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 | Type::INT4 | Type::INT8 | Type::OID => int_to_sql(s.trim().parse()?, ty, out),
        Type::FLOAT4 => s.trim().parse::<f32>()?.to_sql(ty, out),
        Type::FLOAT8 => s.trim().parse::<f64>()?.to_sql(ty, out),
        Type::BOOL => s.trim().parse::<bool>()?.to_sql(ty, out),
        _ => s.to_sql(ty, out),
    }
}

// Parameter types are inferred by the server, so the encoding follows `ty` rather
// than the variant.
impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => match *ty {
                Type::BOOL => b.to_sql(ty, out),
                _ => int_to_sql(i64::from(*b), ty, out),
            },
            Value::Int(n) => int_to_sql(*n, ty, out),
            Value::Float(x) => match *ty {
                Type::FLOAT4 => (*x as f32).to_sql(ty, out),
                Type::TEXT | Type::VARCHAR | Type::BPCHAR => x.to_string().to_sql(ty, out),
                _ => x.to_sql(ty, out),
            },
            Value::Text(s) => text_to_sql(s, ty, out),
            Value::Bytes(b) => b.as_slice().to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn decode_column(row: &tokio_postgres::Row, idx: usize) -> OrmResult<Value> {
    let column = &row.columns()[idx];
    let name = column.name();
    let err = |e: tokio_postgres::Error| OrmError::decode(name, e.to_string());

    let value = match *column.type_() {
        Type::BOOL => row.try_get::<_, Option<bool>>(idx).map_err(err)?.into(),
        Type::INT2 => row.try_get::<_, Option<i16>>(idx).map_err(err)?.into(),
        Type::INT4 => row.try_get::<_, Option<i32>>(idx).map_err(err)?.into(),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx).map_err(err)?.into(),
        Type::OID => row.try_get::<_, Option<u32>>(idx).map_err(err)?.into(),
        Type::FLOAT4 => row.try_get::<_, Option<f32>>(idx).map_err(err)?.into(),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx).map_err(err)?.into(),
        Type::BYTEA => row.try_get::<_, Option<Vec<u8>>>(idx).map_err(err)?.into(),
        _ => row.try_get::<_, Option<String>>(idx).map_err(|_| {
            OrmError::decode(name, format!("unsupported column type {}", column.type_()))
        })?
        .into(),
    };
    Ok(value)
}

impl GenericClient for PgClient {
    fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        let pg_sql = renumber_placeholders(sql);
        let refs: Vec<&(dyn ToSql + Sync)> = params.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
        let _session = self.lock();
        let rows = self
            .runtime
            .block_on(self.client.query(pg_sql.as_str(), &refs))
            .map_err(|e| OrmError::execution(sql, e))?;

        rows.iter()
            .map(|row| {
                let mut mapped = Row::with_capacity(row.len());
                for (idx, column) in row.columns().iter().enumerate() {
                    mapped.insert(column.name().to_string(), decode_column(row, idx)?);
                }
                Ok(mapped)
            })
            .collect()
    }

    fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        let _session = self.lock();
        self.execute_locked(sql, params)
    }

    fn last_insert_id(&self) -> OrmResult<Option<Value>> {
        let _session = self.lock();
        Ok(self.lastval_locked())
    }

    fn insert(&self, sql: &str, params: &[Value]) -> OrmResult<(u64, Option<Value>)> {
        let _session = self.lock();
        let affected = self.execute_locked(sql, params)?;
        Ok((affected, self.lastval_locked()))
    }

    fn driver_name(&self) -> &str {
        "pgsql"
    }
}
