#![cfg(feature = "sqlite")]

mod common;

use common::{insert_widget, orm};
use litorm::{Count, OrmError, OrmResult, Value};

#[test]
fn plain_select_sql() -> OrmResult<()> {
    let orm = orm();
    let all = orm.table("widget").fetch_all()?;
    assert!(all.is_empty());
    assert_eq!(orm.last_query().as_deref(), Some("SELECT * FROM `widget`"));
    Ok(())
}

#[test]
fn single_field_round_trip() -> OrmResult<()> {
    let orm = orm();
    let mut widget = orm.table("widget").create_from([("age", 1)]);
    widget.save(false)?;

    let id = widget.id().cloned().expect("generated id");

    let found = orm
        .table("widget")
        .fetch_one_by_id(id)?
        .expect("saved widget");
    assert_eq!(found.get("age"), Some(&Value::Int(1)));
    assert_eq!(found.id(), widget.id());
    assert_eq!(found.dirty_count(), 0);
    assert!(!found.is_new());
    Ok(())
}

#[test]
fn fetch_one_by_id_and_missing() -> OrmResult<()> {
    let orm = orm();
    let id = insert_widget(&orm, "bolt", "metal", 3);

    let found = orm.table("widget").fetch_one_by_id(id)?.expect("by id");
    assert_eq!(found.get_as::<String>("name")?, "bolt");
    assert_eq!(
        orm.last_query(),
        Some(format!("SELECT * FROM `widget` WHERE `id` = {id} LIMIT 1"))
    );

    assert!(orm.table("widget").fetch_one_by_id(id + 100)?.is_none());

    let forced = orm.table("widget").fetch_one_force_by_id(id + 100)?;
    assert!(forced.is_new());
    Ok(())
}

#[test]
fn where_in_filters_rows() -> OrmResult<()> {
    let orm = orm();
    for (name, age) in [("a", 1), ("b", 2), ("c", 3), ("d", 4)] {
        insert_widget(&orm, name, "x", age);
    }

    let rows = orm
        .table("widget")
        .where_in("age", [1, 3])
        .order_by_asc("age")
        .fetch_all()?;
    let names: Vec<String> = rows
        .iter()
        .map(|r| r.get_as::<String>("name"))
        .collect::<OrmResult<_>>()?;
    assert_eq!(names, ["a", "c"]);

    let none = orm.table("widget").where_in("age", Vec::<i64>::new()).fetch_all()?;
    assert!(none.is_empty());

    let every = orm
        .table("widget")
        .where_not_in("age", Vec::<i64>::new())
        .fetch_all()?;
    assert_eq!(every.len(), 4);
    Ok(())
}

#[test]
fn comparison_between_like_and_null() -> OrmResult<()> {
    let orm = orm();
    insert_widget(&orm, "bolt", "metal", 3);
    insert_widget(&orm, "bracket", "metal", 8);
    insert_widget(&orm, "nut", "metal", 12);
    let mut unnamed = orm.table("widget").create_from([("age", 1)]);
    unnamed.save(false)?;

    let mid = orm.table("widget").where_between("age", 3, 8).fetch_all()?;
    assert_eq!(mid.len(), 2);

    let b = orm.table("widget").where_like("name", "b%").fetch_all()?;
    assert_eq!(b.len(), 2);

    let not_b = orm.table("widget").where_not_like("name", "b%").fetch_all()?;
    assert_eq!(not_b.len(), 1);

    let nameless = orm.table("widget").where_null("name").fetch_all()?;
    assert_eq!(nameless.len(), 1);
    assert_eq!(nameless[0].get("age"), Some(&Value::Int(1)));

    let named = orm
        .table("widget")
        .where_not_null("name")
        .where_gt("age", 3)
        .where_lte("age", 12)
        .where_not_equal("name", "nut")
        .fetch_all()?;
    assert_eq!(named.len(), 1);

    let raw = orm
        .table("widget")
        .where_raw("(age < ? OR age > ?)", vec![Value::Int(2), Value::Int(10)])
        .fetch_all()?;
    assert_eq!(raw.len(), 2);
    Ok(())
}

#[test]
fn limit_offset_and_order() -> OrmResult<()> {
    let orm = orm();
    for age in 1..=5 {
        insert_widget(&orm, &format!("w{age}"), "x", age);
    }

    let page = orm
        .table("widget")
        .order_by_desc("age")
        .limit(2)
        .offset(1)
        .fetch_all()?;
    let ages: Vec<i64> = page
        .iter()
        .map(|r| r.get_as::<i64>("age"))
        .collect::<OrmResult<_>>()?;
    assert_eq!(ages, [4, 3]);
    Ok(())
}

#[test]
fn count_total_and_grouped() -> OrmResult<()> {
    let orm = orm();
    insert_widget(&orm, "a", "metal", 1);
    insert_widget(&orm, "b", "metal", 2);
    insert_widget(&orm, "c", "wood", 3);

    assert_eq!(orm.table("widget").count()?, Count::Total(3));
    assert_eq!(
        orm.table("widget").where_eq("kind", "wood").count()?,
        Count::Total(1)
    );

    let grouped = orm.table("widget").group_by("kind").order_by_asc("kind").count()?;
    let groups = grouped.groups().expect("grouped count");
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0]["kind"], Value::from("metal"));
    assert_eq!(groups[0]["count"], Value::Int(2));
    assert_eq!(groups[1]["kind"], Value::from("wood"));
    assert_eq!(groups[1]["count"], Value::Int(1));
    assert_eq!(
        orm.last_query().as_deref(),
        Some("SELECT `kind`, COUNT(*) AS `count` FROM `widget` GROUP BY `kind` ORDER BY `kind` ASC")
    );
    Ok(())
}

#[test]
fn builder_fetches_once() -> OrmResult<()> {
    let orm = orm();
    let base = orm.table("widget").where_gt("age", 0);

    let mut first = base.fork();
    first.fetch_all()?;
    assert!(matches!(first.fetch_all(), Err(OrmError::Finalized)));

    let mut second = base.fork();
    assert!(second.fetch_one()?.is_none());
    Ok(())
}

#[test]
fn join_with_alias_and_select_columns() -> OrmResult<()> {
    let orm = orm();
    let id = insert_widget(&orm, "bolt", "metal", 3);
    let mut maker = orm.table_with_key("maker", "maker_id").create();
    maker.set("widget_id", id).set("label", "acme");
    maker.save(false)?;
    assert_eq!(maker.id(), Some(&Value::Int(1)));

    let rows = orm
        .table("widget")
        .table_alias("w")
        .select("w.name")
        .select_as("m.label", "maker")
        .inner_join("maker", ("m.widget_id", "=", "w.id"), Some("m"))
        .fetch_all()?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("name"), Some(&Value::from("bolt")));
    assert_eq!(rows[0].get("maker"), Some(&Value::from("acme")));

    let left = orm
        .table("widget")
        .left_outer_join("maker", "maker.widget_id = widget.id", None)
        .select_expr_as("COUNT(maker.maker_id)", "makers")
        .fetch_one()?
        .expect("one row");
    assert_eq!(left.get_as::<i64>("makers")?, 1);
    Ok(())
}

#[test]
fn distinct_and_raw_query() -> OrmResult<()> {
    let orm = orm();
    insert_widget(&orm, "a", "metal", 1);
    insert_widget(&orm, "b", "metal", 2);

    let kinds = orm.table("widget").distinct().select("kind").fetch_all()?;
    assert_eq!(kinds.len(), 1);

    let raw = orm
        .table("widget")
        .where_eq("kind", "never")
        .raw_query("SELECT name FROM widget WHERE age = ?", vec![Value::Int(2)])
        .fetch_all()?;
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0].get("name"), Some(&Value::from("b")));
    Ok(())
}

#[test]
fn in_table_switches_context() -> OrmResult<()> {
    let orm = orm();
    let id = insert_widget(&orm, "bolt", "metal", 3);

    let widgets = orm.table("widget").where_eq("name", "bolt");
    let mut makers = widgets.in_table("maker", Some("maker_id"));
    let mut maker = makers.create();
    maker.set("widget_id", id);
    maker.save(false)?;

    assert_eq!(makers.fetch_all()?.len(), 1);
    assert_eq!(widgets.fork().fetch_all()?.len(), 1);
    Ok(())
}

#[test]
fn execution_errors_carry_sql() {
    let orm = orm();
    let err = orm.table("missing_table").fetch_all().unwrap_err();
    assert!(matches!(err, OrmError::Execution { .. }));
    assert_eq!(err.sql(), Some("SELECT * FROM `missing_table`"));
    assert!(err.to_string().contains("Executed query was: SELECT * FROM `missing_table`"));
}
