use super::*;

#[test]
fn test_create_table() {
    let Statement::CreateTable(create) = parse(
        "create table if not exists app.users (\
           id int primary key, \
           email varchar(255) not null unique, \
           org_id int references orgs (id), \
           score numeric(10, 2) default 0 check (score >= 0), \
           constraint users_email unique (email), \
           foreign key (org_id) references orgs (id)\
         )",
    ) else {
        panic!("expected CREATE TABLE");
    };
    assert!(create.if_not_exists);
    assert_eq!(create.name.to_string(), "app.users");
    assert_eq!(create.columns.len(), 4);
    assert_eq!(create.columns[1].options.len(), 2);
    assert_eq!(create.columns[1].options[0].option, ColumnOption::NotNull);
    assert_eq!(create.columns[3].data_type.args, vec!["10".to_string(), "2".to_string()]);
    assert!(matches!(
        create.columns[2].options[0].option,
        ColumnOption::References { .. }
    ));

    assert_eq!(create.constraints.len(), 2);
    assert_eq!(
        create.constraints[0].name.as_ref().map(|n| n.value.as_str()),
        Some("users_email")
    );
    assert!(matches!(
        create.constraints[1].kind,
        TableConstraintKind::ForeignKey { .. }
    ));
}

#[test]
fn test_create_view() {
    let Statement::CreateView(view) = parse("create or replace view v (a) as select 1") else {
        panic!("expected CREATE VIEW");
    };
    assert!(view.or_replace);
    assert_eq!(view.columns, vec![Ident::new("a")]);
}

#[test]
fn test_create_or_replace_table_rejected() {
    let err = parse_err("create or replace table t (a int)", Dialect::Standard);
    assert_eq!(err.message, "expected VIEW, found table");
}

#[test]
fn test_drop() {
    let Statement::Drop(drop) = parse("drop view if exists a, s.b cascade") else {
        panic!("expected DROP");
    };
    assert_eq!(drop.object_type, ObjectType::View);
    assert!(drop.if_exists);
    assert_eq!(drop.names.len(), 2);
    assert_eq!(drop.behavior, Some(DropBehavior::Cascade));
}

#[test]
fn test_truncate() {
    let Statement::Truncate(truncate) = parse("truncate table a, b") else {
        panic!("expected TRUNCATE");
    };
    assert!(truncate.table_keyword);
    assert_eq!(truncate.names.len(), 2);
}
