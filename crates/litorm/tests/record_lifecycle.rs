#![cfg(feature = "sqlite")]

mod common;

use common::{insert_widget, orm};
use litorm::{OrmError, OrmResult, Value};

#[test]
fn new_record_insert_sets_id() -> OrmResult<()> {
    let orm = orm();
    let mut widget = orm.table("widget").create();
    widget.set("name", "bolt");
    assert!(widget.is_new());
    assert!(widget.is_dirty("name"));

    assert_eq!(widget.save(false)?, 1);
    assert!(!widget.is_new());
    assert_eq!(widget.dirty_count(), 0);
    assert_eq!(widget.id(), Some(&Value::Int(1)));
    assert!(!widget.is_dirty("id"));
    assert_eq!(
        orm.last_query().as_deref(),
        Some("INSERT INTO `widget` (`name`) VALUES ('bolt')")
    );
    Ok(())
}

#[test]
fn clean_save_issues_no_sql() -> OrmResult<()> {
    let orm = orm();
    let id = insert_widget(&orm, "bolt", "metal", 3);
    let mut loaded = orm.table("widget").fetch_one_by_id(id)?.expect("loaded");
    let logged = orm.query_log().len();

    assert_eq!(loaded.save(false)?, 0);
    assert_eq!(orm.query_log().len(), logged);
    Ok(())
}

#[test]
fn update_writes_only_dirty_fields() -> OrmResult<()> {
    let orm = orm();
    let id = insert_widget(&orm, "bolt", "metal", 3);

    let mut loaded = orm.table("widget").fetch_one_by_id(id)?.expect("loaded");
    loaded.set("age", 4).set("name", "big bolt");
    assert_eq!(loaded.save(false)?, 1);
    assert_eq!(
        orm.last_query(),
        Some(format!(
            "UPDATE `widget` SET `age` = 4, `name` = 'big bolt' WHERE `id` = {id}"
        ))
    );

    let reloaded = orm.table("widget").fetch_one_by_id(id)?.expect("reloaded");
    assert_eq!(reloaded.get_as::<i64>("age")?, 4);
    assert_eq!(reloaded.get_as::<String>("name")?, "big bolt");
    assert_eq!(reloaded.get_as::<String>("kind")?, "metal");
    Ok(())
}

#[test]
fn set_field_is_not_written() -> OrmResult<()> {
    let orm = orm();
    let id = insert_widget(&orm, "bolt", "metal", 3);

    let mut loaded = orm.table("widget").fetch_one_by_id(id)?.expect("loaded");
    loaded.set_field("name", "local only");
    loaded.set("age", 9);
    loaded.save(false)?;

    let reloaded = orm.table("widget").fetch_one_by_id(id)?.expect("reloaded");
    assert_eq!(reloaded.get_as::<String>("name")?, "bolt");
    assert_eq!(reloaded.get_as::<i64>("age")?, 9);
    Ok(())
}

#[test]
fn unset_dirty_skips_field() -> OrmResult<()> {
    let orm = orm();
    let mut widget = orm.table("widget").create();
    widget.set("name", "bolt").set("kind", "metal");
    widget.unset_dirty("kind");
    widget.save(false)?;

    let reloaded = orm
        .table("widget")
        .fetch_one_by_id(widget.id().cloned().expect("id"))?
        .expect("reloaded");
    assert_eq!(reloaded.get("kind"), Some(&Value::Null));
    Ok(())
}

#[test]
fn forced_save_replaces_row() -> OrmResult<()> {
    let orm = orm();
    let id = insert_widget(&orm, "bolt", "metal", 3);

    let mut replacement = orm.table("widget").create();
    replacement.set("id", id).set("name", "nut");
    replacement.save(true)?;
    assert_eq!(
        orm.last_query(),
        Some(format!(
            "REPLACE INTO `widget` (`id`, `name`) VALUES ({id}, 'nut')"
        ))
    );
    assert_eq!(replacement.id(), Some(&Value::Int(id)));

    let rows = orm.table("widget").fetch_all()?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_as::<String>("name")?, "nut");
    assert_eq!(rows[0].get("kind"), Some(&Value::Null));
    Ok(())
}

#[test]
fn force_all_dirty_rewrites_everything() -> OrmResult<()> {
    let orm = orm();
    let id = insert_widget(&orm, "bolt", "metal", 3);

    let mut loaded = orm.table("widget").fetch_one_by_id(id)?.expect("loaded");
    loaded.force_all_dirty();
    loaded.save(false)?;
    assert_eq!(
        orm.last_query(),
        Some(format!(
            "UPDATE `widget` SET `id` = {id}, `name` = 'bolt', `kind` = 'metal', `age` = 3 WHERE `id` = {id}"
        ))
    );
    Ok(())
}

#[test]
fn empty_new_record_uses_default_values() -> OrmResult<()> {
    let orm = orm();
    let mut widget = orm.table("widget").create();
    widget.save(false)?;
    assert_eq!(
        orm.last_query().as_deref(),
        Some("INSERT INTO `widget` DEFAULT VALUES")
    );
    assert_eq!(widget.id(), Some(&Value::Int(1)));
    Ok(())
}

#[test]
fn record_delete_by_primary_key() -> OrmResult<()> {
    let orm = orm();
    let keep = insert_widget(&orm, "keep", "x", 1);
    let gone = insert_widget(&orm, "drop", "x", 2);

    let record = orm
        .table("widget")
        .where_eq("name", "drop")
        .fetch_one()?
        .expect("record");
    assert_eq!(record.delete()?, 1);
    assert_eq!(
        orm.last_query(),
        Some(format!("DELETE FROM `widget` WHERE `id` = {gone}"))
    );
    // The in-memory record is untouched.
    assert_eq!(record.get_as::<String>("name")?, "drop");

    let left = orm.table("widget").fetch_all()?;
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id(), Some(&Value::Int(keep)));
    Ok(())
}

#[test]
fn record_without_id_cannot_be_deleted() {
    let orm = orm();
    let record = orm.table("widget").create();
    assert!(matches!(record.delete(), Err(OrmError::MissingPrimaryKey)));
}

#[test]
fn loaded_record_without_id_cannot_be_updated() -> OrmResult<()> {
    let orm = orm();
    insert_widget(&orm, "bolt", "metal", 3);

    let mut partial = orm
        .table("widget")
        .select("name")
        .fetch_one()?
        .expect("row");
    partial.set("name", "nut");
    let err = partial.save(false).unwrap_err();
    assert!(matches!(err, OrmError::MissingPrimaryKey));
    assert!(err.to_string().contains("update or delete"));
    assert!(partial.is_dirty("name"));
    Ok(())
}

#[test]
fn builder_delete_uses_conditions() -> OrmResult<()> {
    let orm = orm();
    insert_widget(&orm, "a", "metal", 1);
    insert_widget(&orm, "b", "metal", 2);
    let wood = insert_widget(&orm, "c", "wood", 3);

    assert_eq!(orm.table("widget").where_eq("kind", "metal").delete()?, 2);
    assert_eq!(orm.table("widget").where_eq("kind", "wood").delete_by_id(wood + 1)?, 0);
    assert_eq!(orm.table("widget").delete_by_id(wood)?, 1);
    Ok(())
}

#[test]
fn delete_without_conditions_removes_every_row() -> OrmResult<()> {
    let orm = orm();
    for i in 0..3 {
        insert_widget(&orm, "w", "x", i);
    }
    assert_eq!(orm.table("widget").delete()?, 3);
    assert_eq!(orm.last_query().as_deref(), Some("DELETE FROM `widget`"));
    assert!(orm.table("widget").fetch_all()?.is_empty());
    Ok(())
}

#[test]
fn custom_primary_key_round_trip() -> OrmResult<()> {
    let orm = orm();
    let mut maker = orm.table("maker").primary_key("maker_id").create();
    maker.set("label", "acme");
    maker.save(false)?;
    let id = maker.id().cloned().expect("maker id");

    maker.set("label", "acme inc");
    maker.save(false)?;
    assert_eq!(
        orm.last_query().as_deref(),
        Some("UPDATE `maker` SET `label` = 'acme inc' WHERE `maker_id` = 1")
    );

    let found = orm
        .table_with_key("maker", "maker_id")
        .fetch_one_by_id(id)?
        .expect("maker");
    assert_eq!(found.get_as::<String>("label")?, "acme inc");
    Ok(())
}

#[test]
fn records_serialize_as_json() -> OrmResult<()> {
    let orm = orm();
    let id = insert_widget(&orm, "bolt", "metal", 3);
    let record = orm.table("widget").fetch_one_by_id(id)?.expect("record");
    assert_eq!(
        record.to_json()?,
        format!(r#"{{"id":{id},"name":"bolt","kind":"metal","age":3}}"#)
    );
    assert_eq!(record.as_map(&["name", "nope"]).len(), 1);
    Ok(())
}

#[test]
fn concurrent_inserts_get_their_own_ids() -> OrmResult<()> {
    let orm = orm();
    let saved: Vec<(String, Value)> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..4)
            .map(|worker| {
                let orm = orm.clone();
                scope.spawn(move || -> OrmResult<Vec<(String, Value)>> {
                    let mut saved = Vec::new();
                    for i in 0..200 {
                        let name = format!("w{worker}-{i}");
                        let mut widget = orm.table("widget").create();
                        widget.set("name", name.as_str()).set("age", i);
                        widget.save(false)?;
                        saved.push((name, widget.id().cloned().expect("generated id")));
                    }
                    Ok(saved)
                })
            })
            .collect();
        workers
            .into_iter()
            .map(|worker| worker.join().expect("worker panicked"))
            .collect::<OrmResult<Vec<_>>>()
            .map(|chunks| chunks.into_iter().flatten().collect())
    })?;

    assert_eq!(saved.len(), 800);
    for (name, id) in saved {
        let reloaded = orm.table("widget").fetch_one_by_id(id)?.expect("reloaded");
        assert_eq!(reloaded.get_as::<String>("name")?, name);
    }
    Ok(())
}
