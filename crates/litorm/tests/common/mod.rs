#![allow(dead_code)]

use litorm::{Orm, OrmConfig, SqliteClient};

pub const SCHEMA: &str = "
    CREATE TABLE widget (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT,
        kind TEXT,
        age INTEGER
    );
    CREATE TABLE maker (
        maker_id INTEGER PRIMARY KEY AUTOINCREMENT,
        widget_id INTEGER,
        label TEXT
    );
";

/// In-memory SQLite with the test schema and the query log enabled.
pub fn orm() -> Orm {
    let client = SqliteClient::open_in_memory().expect("open in-memory sqlite");
    client.execute_batch(SCHEMA).expect("create schema");
    Orm::new(client).with_config(OrmConfig::new().logging(true))
}

/// Insert one widget through the builder and return its id.
pub fn insert_widget(orm: &Orm, name: &str, kind: &str, age: i64) -> i64 {
    let mut widget = orm.table("widget").create();
    widget.set("name", name).set("kind", kind).set("age", age);
    widget.save(false).expect("insert widget");
    widget.get_as::<i64>("id").expect("generated id")
}
