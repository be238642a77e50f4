use crate::value::{Row, Value};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Result cache for SELECT statements.
///
/// Entries are keyed by a BLAKE3 digest of the compiled SQL and its bound values, so two
/// builders producing identical statements share a result. The cache never expires on its
/// own; call [`QueryCache::clear`] after writes that should be visible to cached reads.
#[derive(Debug, Default)]
pub struct QueryCache {
    map: Mutex<HashMap<String, Vec<Row>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the cache key for a statement.
    ///
    /// The SQL and every value are length-prefixed and each value carries its type tag,
    /// so two keys are equal only for identical SQL and identical values.
    pub fn key(sql: &str, params: &[Value]) -> String {
        let mut hasher = blake3::Hasher::new();
        update_prefixed(&mut hasher, sql.as_bytes());
        hasher.update(&(params.len() as u64).to_le_bytes());
        for value in params {
            update_prefixed(&mut hasher, value.kind().as_bytes());
            match value {
                Value::Null => {}
                Value::Bool(b) => {
                    hasher.update(&[u8::from(*b)]);
                }
                Value::Int(n) => {
                    hasher.update(&n.to_le_bytes());
                }
                Value::Float(x) => {
                    hasher.update(&x.to_bits().to_le_bytes());
                }
                Value::Text(s) => update_prefixed(&mut hasher, s.as_bytes()),
                Value::Bytes(b) => update_prefixed(&mut hasher, b),
            }
        }
        hasher.finalize().to_hex().to_string()
    }

    pub fn get(&self, key: &str) -> Option<Vec<Row>> {
        self.map
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn insert(&self, key: String, rows: Vec<Row>) {
        self.map
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, rows);
    }

    pub fn len(&self) -> usize {
        self.map.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached result.
    pub fn clear(&self) {
        self.map
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

fn update_prefixed(hasher: &mut blake3::Hasher, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}
