use super::*;

#[test]
fn test_insert_values() {
    let Statement::Insert(insert) = parse("insert into s.t (a, b) values (1, 'x'), (2, 'y')") else {
        panic!("expected INSERT");
    };
    assert_eq!(insert.table.to_string(), "s.t");
    assert_eq!(insert.columns, vec![Ident::new("a"), Ident::new("b")]);
    let InsertSource::Query(q) = &insert.source else {
        panic!("expected a VALUES source");
    };
    assert!(matches!(&q.body, SetExpr::Values(v) if v.rows.len() == 2));
}

#[test]
fn test_insert_select_and_default_values() {
    let Statement::Insert(insert) = parse("insert into t select * from u") else {
        panic!("expected INSERT");
    };
    assert!(insert.columns.is_empty());
    assert!(matches!(&insert.source, InsertSource::Query(q) if q.as_select().is_some()));

    let Statement::Insert(insert) = parse("insert into t default values returning id") else {
        panic!("expected INSERT");
    };
    assert_eq!(insert.source, InsertSource::DefaultValues);
    assert_eq!(insert.returning.len(), 1);
}

#[test]
fn test_insert_parenthesized_select() {
    let Statement::Insert(insert) = parse("insert into t (select * from u)") else {
        panic!("expected INSERT");
    };
    assert!(insert.columns.is_empty());
    assert!(matches!(&insert.source, InsertSource::Query(q) if matches!(q.body, SetExpr::Query(_))));
}

#[test]
fn test_update() {
    let Statement::Update(update) =
        parse("update t as x set a = 1, x.b = b + 1 from u where x.id = u.id")
    else {
        panic!("expected UPDATE");
    };
    assert_eq!(update.alias.as_ref().map(|a| a.name.value.as_str()), Some("x"));
    assert_eq!(update.assignments.len(), 2);
    assert_eq!(update.assignments[1].column(), "b");
    assert_eq!(update.from.len(), 1);
    assert!(update.selection.is_some());
}

#[test]
fn test_delete() {
    let Statement::Delete(delete) = parse("delete from t using u where t.id = u.id") else {
        panic!("expected DELETE");
    };
    assert_eq!(delete.table.base(), "t");
    assert_eq!(delete.using.len(), 1);
    assert!(delete.selection.is_some());

    let Statement::Delete(delete) = parse("delete t where id = 1") else {
        panic!("expected DELETE");
    };
    assert_eq!(delete.table.base(), "t");
}

#[test]
fn test_returning_is_dialect_gated() {
    let err = parse_err("delete from t returning id", Dialect::MySql);
    assert_eq!(err.message, "RETURNING is not supported by the mysql dialect");
    assert_eq!(err.token, "returning");
}
