//! Active-record rows with dirty tracking.

use crate::error::{OrmError, OrmResult};
use crate::qb::QueryBuilder;
use crate::value::{FromValue, Row, Value};
use indexmap::IndexSet;
use serde::{Serialize, Serializer};

/// One row of a table.
///
/// A record is either *new* (built with [`QueryBuilder::create`], every field dirty) or
/// *loaded* (hydrated by a fetch, nothing dirty). [`Record::set`] marks a field dirty;
/// [`Record::save`] writes the dirty fields and clears them.
///
/// Every dirty key is always present in the data.
#[derive(Debug, Clone)]
pub struct Record {
    data: Row,
    dirty: IndexSet<String>,
    is_new: bool,
    id_column: String,
    owner: QueryBuilder,
}

impl Record {
    pub(crate) fn new(owner: QueryBuilder, id_column: &str) -> Self {
        Self {
            data: Row::new(),
            dirty: IndexSet::new(),
            is_new: true,
            id_column: id_column.to_string(),
            owner,
        }
    }

    pub(crate) fn loaded(owner: QueryBuilder, id_column: &str, data: Row) -> Self {
        Self {
            data,
            dirty: IndexSet::new(),
            is_new: false,
            id_column: id_column.to_string(),
            owner,
        }
    }

    // ==================== Field access ====================

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Read `key` as `T`. A missing key reads as [`Value::Null`].
    pub fn get_as<T: FromValue>(&self, key: &str) -> OrmResult<T> {
        match self.data.get(key) {
            Some(value) => T::from_value(key, value),
            None => T::from_value(key, &Value::Null),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Set a field and mark it dirty.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        self.data.insert(key.clone(), value.into());
        self.dirty.insert(key);
        self
    }

    /// Set a field without marking it dirty.
    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.data.insert(key.into(), value.into());
        self
    }

    // ==================== Dirty tracking ====================

    pub fn unset_dirty(&mut self, key: &str) {
        self.dirty.shift_remove(key);
    }

    pub fn is_dirty(&self, key: &str) -> bool {
        self.dirty.contains(key)
    }

    /// Dirty fields with their current values, in the order they were first marked.
    pub fn dirty_fields(&self) -> Vec<(&str, &Value)> {
        self.dirty
            .iter()
            .filter_map(|key| self.data.get_key_value(key.as_str()))
            .map(|(key, value)| (key.as_str(), value))
            .collect()
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }

    pub fn reset_dirty(&mut self) {
        self.dirty.clear();
    }

    /// Mark every present field dirty, e.g. before a forced `REPLACE`.
    pub fn force_all_dirty(&mut self) {
        self.dirty = self.data.keys().cloned().collect();
    }

    // ==================== Identity ====================

    /// The primary-key value, or `None` when absent or NULL.
    pub fn id(&self) -> Option<&Value> {
        self.data.get(&self.id_column).filter(|v| !v.is_null())
    }

    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub(crate) fn mark_persisted(&mut self) {
        self.is_new = false;
    }

    pub fn data(&self) -> &Row {
        &self.data
    }

    pub fn into_data(self) -> Row {
        self.data
    }

    /// The whole row when `keys` is empty, otherwise only the listed keys that are present.
    pub fn as_map(&self, keys: &[&str]) -> Row {
        if keys.is_empty() {
            return self.data.clone();
        }
        keys.iter()
            .filter_map(|key| {
                self.data
                    .get_key_value(*key)
                    .map(|(k, v)| (k.clone(), v.clone()))
            })
            .collect()
    }

    /// Serialize the row as a JSON object.
    pub fn to_json(&self) -> OrmResult<String> {
        serde_json::to_string(&self.data)
            .map_err(|e| OrmError::decode("*", e.to_string()))
    }

    // ==================== Persistence ====================

    /// Save through the builder context this record came from. See [`QueryBuilder::save`].
    pub fn save(&mut self, force: bool) -> OrmResult<u64> {
        let owner = self.owner.clone();
        owner.save(self, force)
    }

    /// Delete the backing row by primary key. The in-memory record is left as is.
    pub fn delete(&self) -> OrmResult<u64> {
        self.owner.delete_record(self)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.data.serialize(serializer)
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use crate::Orm;

    fn people() -> QueryBuilder {
        Orm::open_sqlite_in_memory().unwrap().table("people")
    }

    #[test]
    fn new_record_marks_sets_dirty() {
        let mut record = people().create();
        assert!(record.is_new());
        record.set("name", "Fred").set("age", 10);
        assert_eq!(record.get("name"), Some(&Value::from("Fred")));
        assert!(record.is_dirty("name"));
        assert_eq!(
            record.dirty_fields(),
            vec![("name", &Value::from("Fred")), ("age", &Value::Int(10))]
        );
    }

    #[test]
    fn set_field_is_clean() {
        let mut record = people().create();
        record.set_field("name", "Fred");
        assert!(record.has("name"));
        assert!(!record.is_dirty("name"));
        assert!(record.dirty_fields().is_empty());
    }

    #[test]
    fn dirty_order_is_first_marking() {
        let mut record = people().create();
        record.set("b", 1).set("a", 2).set("b", 3);
        let keys: Vec<&str> = record.dirty_fields().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["b", "a"]);
        assert_eq!(record.get("b"), Some(&Value::Int(3)));
    }

    #[test]
    fn unset_and_reset_dirty() {
        let mut record = people().create();
        record.set("a", 1).set("b", 2);
        record.unset_dirty("a");
        assert!(!record.is_dirty("a"));
        assert!(record.has("a"));
        record.reset_dirty();
        assert_eq!(record.dirty_count(), 0);

        record.force_all_dirty();
        assert!(record.is_dirty("a") && record.is_dirty("b"));
    }

    #[test]
    fn id_absent_or_null_is_none() {
        let mut record = people().create();
        assert_eq!(record.id(), None);
        record.set_field("id", Value::Null);
        assert_eq!(record.id(), None);
        record.set_field("id", 5);
        assert_eq!(record.id(), Some(&Value::Int(5)));
    }

    #[test]
    fn custom_id_column() {
        let mut record = people().primary_key("person_id").create();
        record.set_field("person_id", 9);
        assert_eq!(record.id_column(), "person_id");
        assert_eq!(record.id(), Some(&Value::Int(9)));
    }

    #[test]
    fn as_map_subset() {
        let mut record = people().create();
        record.set("a", 1).set("b", 2).set("c", 3);
        assert_eq!(record.as_map(&[]).len(), 3);

        let subset = record.as_map(&["c", "a", "missing"]);
        assert_eq!(subset.keys().collect::<Vec<_>>(), ["c", "a"]);
    }

    #[test]
    fn typed_get() {
        let mut record = people().create();
        record.set("age", 42).set("name", "x");
        assert_eq!(record.get_as::<i64>("age").unwrap(), 42);
        assert_eq!(record.get_as::<Option<String>>("missing").unwrap(), None);
        assert!(record.get_as::<i64>("name").is_err());
    }

    #[test]
    fn serializes_as_row() {
        let mut record = people().create();
        record.set("id", 1).set("name", "Fred");
        assert_eq!(record.to_json().unwrap(), r#"{"id":1,"name":"Fred"}"#);
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            serde_json::json!({"id": 1, "name": "Fred"})
        );
    }

    #[test]
    fn delete_without_id_fails() {
        let record = people().create();
        assert!(matches!(record.delete(), Err(OrmError::MissingPrimaryKey)));
    }
}
