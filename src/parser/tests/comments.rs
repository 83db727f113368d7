use super::*;

fn anchors(sql: &str) -> Vec<(String, CommentAnchor)> {
    let script = parse_script(sql, &ParseOptions::default()).unwrap();
    script
        .statements
        .iter()
        .flat_map(|s| s.comments.iter())
        .map(|c| (c.text.clone(), c.anchor))
        .collect()
}

fn clause(kind: ClauseKind, ordinal: usize) -> CommentAnchor {
    CommentAnchor::Clause { kind, ordinal }
}

#[test]
fn test_comments_anchor_to_next_clause() {
    assert_eq!(
        anchors("-- lead\nselect a /* mid */ from t where b = 1 -- end"),
        vec![
            ("-- lead".to_string(), clause(ClauseKind::Select, 0)),
            ("/* mid */".to_string(), clause(ClauseKind::From, 0)),
            ("-- end".to_string(), CommentAnchor::Dangling),
        ]
    );
}

#[test]
fn test_comment_ordinals_count_repeated_clauses() {
    assert_eq!(
        anchors("select 1 union -- second\nselect 2"),
        vec![("-- second".to_string(), clause(ClauseKind::Select, 1))]
    );
}

#[test]
fn test_subquery_clauses_are_not_anchors() {
    assert_eq!(
        anchors("select (select 1 -- inner\n) from t"),
        vec![("-- inner".to_string(), clause(ClauseKind::From, 0))]
    );
}

#[test]
fn test_comments_split_between_statements() {
    let script = parse_script("select 1; -- one\nselect 2; -- two", &ParseOptions::default()).unwrap();
    assert!(script.statements[0].comments.is_empty());
    assert_eq!(script.statements[1].comments[0].text, "-- one");
    assert_eq!(
        script.statements[1].comments[0].anchor,
        clause(ClauseKind::Select, 0)
    );
    assert_eq!(script.trailing_comments.len(), 1);
    assert_eq!(script.trailing_comments[0].text, "-- two");
}

#[test]
fn test_comment_spans() {
    let sql = "select 1 /* c */";
    let script = parse_script(sql, &ParseOptions::default()).unwrap();
    let comment = &script.statements[0].comments[0];
    assert_eq!(&sql[comment.span.range()], "/* c */");
}
