use super::*;

#[test]
fn test_missing_select_list() {
    let err = parse_err("SELECT FROM WHERE", Dialect::Standard);
    assert_eq!(err.message, "expected an expression or '*', found FROM");
    assert_eq!(err.token, "FROM");
    assert_eq!((err.line, err.column, err.offset), (1, 8, 7));
}

#[test]
fn test_unterminated_string_is_lex_error() {
    match parse_script("SELECT 'abc", &ParseOptions::default()) {
        Err(SqlError::Lex(e)) => {
            assert_eq!((e.line, e.column, e.offset), (1, 8, 7));
            assert_eq!(e.text, "'");
        }
        other => panic!("expected a lex error, got {other:?}"),
    }
}

#[test]
fn test_empty_input() {
    for sql in ["", "   \n\t", "-- only a comment\n"] {
        let err = parse_err(sql, Dialect::Standard);
        assert_eq!(err.message, "no statement found", "input {sql:?}");
    }
}

#[test]
fn test_empty_statement() {
    assert_eq!(parse_err(";", Dialect::Standard).message, "empty statement");
    let err = parse_err("select 1;;", Dialect::Standard);
    assert_eq!(err.message, "empty statement");
    assert_eq!(err.column, 10);
}

#[test]
fn test_missing_separator() {
    let err = parse_err("select 1 select 2", Dialect::Standard);
    assert_eq!(err.message, "expected ';' or end of input, found select");
    assert_eq!(err.column, 10);
}

#[test]
fn test_error_at_end_of_input() {
    let err = parse_err("select a\nfrom t\nwhere", Dialect::Standard);
    assert_eq!(err.message, "expected an expression, found end of input");
    assert_eq!((err.line, err.column), (3, 6));
    assert_eq!(err.token, "");

    let err = parse_err("select (1", Dialect::Standard);
    assert_eq!(err.message, "expected ')', found end of input");
}

#[test]
fn test_nesting_limit() {
    let deep = format!("select {}1{}", "(".repeat(20), ")".repeat(20));
    let options = ParseOptions::default().with_max_depth(10);
    match parse_script(&deep, &options) {
        Err(SqlError::Parse(e)) => {
            assert_eq!(e.message, "nesting exceeds the maximum depth of 10")
        }
        other => panic!("expected a depth error, got {other:?}"),
    }

    let fine = format!("select {}1{}", "(".repeat(50), ")".repeat(50));
    assert!(parse_script(&fine, &ParseOptions::default()).is_ok());
}

#[test]
fn test_long_operator_chains_hit_nesting_limit() {
    let sum = vec!["1"; 5000].join(" + ");
    let err = parse_err(&format!("select {sum}"), Dialect::Standard);
    assert_eq!(err.message, "nesting exceeds the maximum depth of 200");
    assert_eq!(err.token, "+");

    let unions = vec!["select 1"; 1000].join(" union ");
    let err = parse_err(&unions, Dialect::Standard);
    assert_eq!(err.message, "nesting exceeds the maximum depth of 200");
    assert_eq!(err.token, "union");

    let options = ParseOptions::default().with_max_depth(10);
    let short = vec!["a"; 20].join(" || ");
    assert!(parse_script(&format!("select {short}"), &options).is_err());

    let predicates = vec!["a = 1"; 100].join(" and ");
    assert!(parse_script(&format!("select * from t where {predicates}"), &ParseOptions::default()).is_ok());
}

#[test]
fn test_dialect_gating() {
    assert_eq!(
        parse_err("select a from t limit 5", Dialect::TSql).message,
        "LIMIT is not supported by the tsql dialect"
    );
    assert_eq!(
        parse_err("select a::int from t", Dialect::MySql).message,
        "'::' cast is not supported by the mysql dialect"
    );
    assert_eq!(
        parse_err("select distinct on (a) a from t", Dialect::MySql).message,
        "DISTINCT ON is not supported by the mysql dialect"
    );
    assert_eq!(
        parse_err("select a from t fetch first 1 rows only", Dialect::MySql).message,
        "FETCH FIRST is not supported by the mysql dialect"
    );
}

#[test]
fn test_join_requires_condition() {
    let err = parse_err("select * from a join b where x = 1", Dialect::Standard);
    assert_eq!(err.message, "expected ON or USING, found where");
}

#[test]
fn test_derived_table_requires_subquery() {
    let err = parse_err("select * from (a)", Dialect::Standard);
    assert_eq!(err.message, "expected a subquery after '('");
}

#[test]
fn test_parse_statement_rejects_second_statement() {
    match parse_statement("select 1; select 2", &ParseOptions::default()) {
        Err(SqlError::Parse(e)) => assert_eq!(e.message, "expected end of input, found select"),
        other => panic!("expected a parse error, got {other:?}"),
    }
}
