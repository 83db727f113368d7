use pretty_assertions::assert_eq;
use rewrite_sql::prelude::*;

const CORPUS: &[(&str, Dialect)] = &[
    ("select a,b from t where a=1", Dialect::Standard),
    ("SELECT * FROM t1 JOIN t2 ON t1.id=t2.id", Dialect::Standard),
    ("select a from t where a != 1 and (b = 2 or c is not null)", Dialect::Standard),
    (
        "with x as (select 1), y(n) as (select n from x) select * from y",
        Dialect::Standard,
    ),
    ("select a from t union all select a from u order by 1", Dialect::Standard),
    (
        "select id from orders where customer_id in (select id from customers where region = 'EU')",
        Dialect::Standard,
    ),
    (
        "select case when a > 0 then 'pos' else 'neg' end as sign, cast(b as varchar(10)) from t",
        Dialect::Standard,
    ),
    (
        "select date '2024-01-01', cast(x as numeric(10, 2)) from t where ts > timestamp '2024-01-01 00:00'",
        Dialect::Standard,
    ),
    ("insert into t (a, b) values (1, 'x'), (2, 'y')", Dialect::Standard),
    ("update t set a = a + 1, b = null where id = ?", Dialect::Standard),
    ("delete from t where created < :cutoff", Dialect::Standard),
    (
        "create table t (id int primary key, name varchar(20) not null, unique (name))",
        Dialect::Standard,
    ),
    ("drop table if exists a, b cascade; truncate table c", Dialect::Standard),
    ("select a::int, b ilike 'x%' from t limit 10 offset 5", Dialect::PostgreSql),
    ("select top 5 a from t order by a desc", Dialect::TSql),
    ("select a from t minus select a from u fetch first 3 rows only", Dialect::Db2),
    ("-- head\nselect a -- after a\nfrom t", Dialect::Standard),
];

fn narrow(max: usize) -> FormatStyle {
    FormatStyle::default().with_max_line_length(Some(max))
}

#[test]
fn test_example_simple_select() {
    let out = format_sql("select a,b from t where a=1", Dialect::Standard, &FormatStyle::default())
        .expect("valid SQL");
    let expected = r#"
SELECT a, b
FROM t
WHERE a = 1
"#;
    assert_eq!(out, expected.trim());
}

#[test]
fn test_example_join_wraps_when_narrow() {
    let out = format_sql("SELECT * FROM t1 JOIN t2 ON t1.id=t2.id", Dialect::Standard, &narrow(20))
        .expect("valid SQL");
    let join_line = out
        .lines()
        .find(|l| l.trim_start().starts_with("JOIN"))
        .expect("JOIN on its own line");
    assert!(join_line.starts_with("  "), "join line is indented: {out}");
    assert!(out.lines().all(|l| l.len() <= 26), "{out}");
}

#[test]
fn test_example_missing_select_list() {
    match parse("SELECT FROM WHERE", Dialect::Standard) {
        Err(SqlError::Parse(e)) => {
            assert_eq!(e.token, "FROM");
            assert_eq!((e.line, e.column), (1, 8));
            assert!(e.message.starts_with("expected an expression or '*'"));
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_example_unterminated_string() {
    let err = parse("SELECT 'abc", Dialect::Standard).unwrap_err();
    assert!(matches!(err, SqlError::Lex(_)));
    assert_eq!(err.location(), Some((1, 8)));
    assert_eq!(err.to_string(), "Lex error at line 1, column 8: unterminated string literal");
}

#[test]
fn test_format_is_idempotent() {
    for style in [FormatStyle::default(), narrow(30), narrow(30).with_comma_style(CommaStyle::Leading)] {
        for (sql, dialect) in CORPUS {
            let once = format_sql(sql, *dialect, &style).expect(sql);
            let twice = format_sql(&once, *dialect, &style).expect(&once);
            assert_eq!(once, twice, "input {sql:?}");
        }
    }
}

#[test]
fn test_parse_format_parse_equivalence() {
    for (sql, dialect) in CORPUS {
        let original = parse(sql, *dialect).expect(sql);
        let formatted = format_script(&original, &narrow(30));
        let reparsed = parse(&formatted, *dialect).expect(&formatted);
        let statements = |s: &Script| s.statements.iter().map(|p| p.statement.clone()).collect::<Vec<_>>();
        assert_eq!(statements(&original), statements(&reparsed), "input {sql:?}");
        assert_eq!(original.trailing_semicolon, reparsed.trailing_semicolon);
    }
}

#[test]
fn test_type_names_survive_keyword_casing() {
    let sql = "create table t (id integer, name varchar(20), born date)";
    let original = parse(sql, Dialect::Standard).unwrap();
    for case in [KeywordCase::Upper, KeywordCase::Lower] {
        let style = FormatStyle::default().with_keyword_case(case);
        let reparsed = parse(&format_script(&original, &style), Dialect::Standard).unwrap();
        assert_eq!(original.statements[0].statement, reparsed.statements[0].statement);
    }
}

#[test]
fn test_ast_serializes_to_json() {
    let script = parse(
        "select a from t where a in (select b from u where b + 1 > 2) union select c from v",
        Dialect::Standard,
    )
    .unwrap();
    let json = serde_json::to_value(&script).unwrap();
    let statement = &json["statements"][0]["statement"];
    assert_eq!(statement["type"], "query");
    let union = &statement["value"]["body"];
    assert_eq!(union["kind"], "set_operation");
    assert_eq!(union["value"]["op"], "union");
    let left = &union["value"]["left"];
    assert_eq!(left["kind"], "select");
    let predicate = &left["value"]["selection"];
    assert_eq!(predicate["kind"], "in_subquery");
    assert_eq!(predicate["value"]["subquery"]["body"]["kind"], "select");
}

#[test]
fn test_tokens_reproduce_source() {
    let inputs = [
        ("SELECT  a ,b\n\tFROM t -- c\n/* block */ WHERE x = 'it''s';", Dialect::Standard),
        ("select `a` from t # note\nwhere b = \"x\"", Dialect::MySql),
        ("select $tag$ body $tag$, a::text from t", Dialect::PostgreSql),
        ("select [col] from [dbo].[t] where id = @id", Dialect::TSql),
    ];
    for (sql, dialect) in inputs {
        let tokens = tokenize(sql, dialect).expect(sql);
        let joined: String = tokens.iter().map(|t| t.text).collect();
        assert_eq!(joined, sql);
    }
}

#[test]
fn test_format_is_deterministic_across_threads() {
    let style = narrow(30);
    let expected: Vec<String> = CORPUS
        .iter()
        .map(|(sql, dialect)| format_sql(sql, *dialect, &style).expect(sql))
        .collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    CORPUS
                        .iter()
                        .map(|(sql, dialect)| format_sql(sql, *dialect, &style).expect(sql))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().expect("thread panicked"), expected);
        }
    });
}

#[test]
fn test_invalid_style_rejected_before_parsing() {
    let style = FormatStyle::default().with_max_line_length(Some(0));
    let err = format_sql("SELECT FROM", Dialect::Standard, &style).unwrap_err();
    assert!(matches!(err, SqlError::Config(_)));
    assert!(FormatStyle::from_raw(-2, None, KeywordCase::Upper, CommaStyle::Trailing).is_err());
}

#[test]
fn test_unknown_dialect_is_config_error() {
    let config = Config::from_toml("dialect = \"cobol\"").expect("valid TOML");
    let err = config.resolve().unwrap_err();
    assert!(err.message.contains("cobol"), "{err}");
}
