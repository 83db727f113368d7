use super::*;
use crate::dialect::Dialect;

fn kinds(sql: &str, dialect: Dialect) -> Vec<(TokenKind, &str)> {
    tokenize(sql, dialect)
        .unwrap()
        .into_iter()
        .filter(|t| t.kind != TokenKind::Whitespace)
        .map(|t| (t.kind, t.text))
        .collect()
}

#[test]
fn test_round_trip_reconstructs_source() {
    let sql = "SELECT a, /* note */ b -- trailing\nFROM \"My Table\"\r\n\tWHERE x >= 1.5e3 AND y <> 'it''s'";
    let tokens = tokenize(sql, Dialect::Standard).unwrap();
    let rebuilt: String = tokens.iter().map(|t| t.text).collect();
    assert_eq!(rebuilt, sql);
}

#[test]
fn test_offsets_are_monotonic_and_contiguous() {
    let sql = "select x\n  from t;";
    let tokens = tokenize(sql, Dialect::Standard).unwrap();
    let mut expected_start = 0;
    for t in &tokens {
        assert_eq!(t.span.start, expected_start);
        assert!(t.span.end >= t.span.start);
        expected_start = t.span.end;
    }
    assert_eq!(expected_start, sql.len());
}

#[test]
fn test_line_and_column_tracking() {
    let tokens = tokenize("select x\n  from t", Dialect::Standard).unwrap();
    let from = tokens.iter().find(|t| t.is_word("from")).unwrap();
    assert_eq!((from.line, from.column), (2, 3));
}

#[test]
fn test_keywords_are_case_insensitive_and_case_preserving() {
    let toks = kinds("SeLeCt foo FROM Bar", Dialect::Standard);
    assert_eq!(
        toks,
        vec![
            (TokenKind::Keyword, "SeLeCt"),
            (TokenKind::Identifier { quoted: false }, "foo"),
            (TokenKind::Keyword, "FROM"),
            (TokenKind::Identifier { quoted: false }, "Bar"),
        ]
    );
}

#[test]
fn test_longest_match_operators() {
    let toks = kinds("a<=b||c::int->>'k'<>d", Dialect::PostgreSql);
    let ops: Vec<&str> = toks
        .iter()
        .filter(|(k, _)| *k == TokenKind::Operator)
        .map(|(_, t)| *t)
        .collect();
    assert_eq!(ops, vec!["<=", "||", "::", "->>", "<>"]);
}

#[test]
fn test_numbers() {
    let toks = kinds("1 2.50 .5 6e-3 0xFF", Dialect::Standard);
    assert!(toks.iter().all(|(k, _)| *k == TokenKind::NumericLiteral));
    assert_eq!(toks.len(), 5);
}

#[test]
fn test_parameters() {
    let toks = kinds("? ?2 :name $1 @var", Dialect::Standard);
    assert!(toks.iter().all(|(k, _)| *k == TokenKind::Parameter));
    assert_eq!(toks.len(), 5);
}

#[test]
fn test_doubled_quote_escape() {
    let toks = kinds("'it''s'", Dialect::Standard);
    assert_eq!(toks, vec![(TokenKind::StringLiteral, "'it''s'")]);
}

#[test]
fn test_backslash_escape_in_mysql() {
    let toks = kinds(r"'it\'s' `col`", Dialect::MySql);
    assert_eq!(
        toks,
        vec![
            (TokenKind::StringLiteral, r"'it\'s'"),
            (TokenKind::Identifier { quoted: true }, "`col`"),
        ]
    );
    // standard SQL ends the literal at the escaped quote
    assert!(tokenize(r"'it\'s'", Dialect::Standard).is_err());
}

#[test]
fn test_dialect_identifier_quotes() {
    let toks = kinds("[order id]", Dialect::TSql);
    assert_eq!(toks, vec![(TokenKind::Identifier { quoted: true }, "[order id]")]);
}

#[test]
fn test_prefixed_and_dollar_strings() {
    let toks = kinds("N'abc' E'a\\'b' $$body$$ $fn$x$fn$", Dialect::PostgreSql);
    assert!(toks.iter().all(|(k, _)| *k == TokenKind::StringLiteral));
    assert_eq!(toks.len(), 4);
}

#[test]
fn test_hash_comment_only_in_mysql() {
    let toks = kinds("# note\nselect 1", Dialect::MySql);
    assert_eq!(toks[0], (TokenKind::Comment, "# note"));
    assert!(tokenize("# note", Dialect::Standard).is_err());
}

#[test]
fn test_unterminated_string_points_at_opening_quote() {
    let err = tokenize("SELECT 'abc", Dialect::Standard).unwrap_err();
    assert_eq!(err.message, "unterminated string literal");
    assert_eq!((err.line, err.column), (1, 8));
    assert_eq!(err.offset, 7);
    assert_eq!(err.text, "'");
}

#[test]
fn test_unterminated_block_comment() {
    let err = tokenize("SELECT 1 /* open", Dialect::Standard).unwrap_err();
    assert_eq!(err.message, "unterminated block comment");
    assert_eq!(err.column, 10);
}

#[test]
fn test_block_comments_do_not_nest() {
    let tokens = tokenize("/* a /* b */ c */", Dialect::Standard);
    // the first */ closes; the trailing "*/" lexes as two operators
    let tokens = tokens.unwrap();
    assert_eq!(tokens[0].text, "/* a /* b */");
    assert_eq!(tokens[0].kind, TokenKind::Comment);
}

#[test]
fn test_invalid_character() {
    let err = tokenize("SELECT a { b", Dialect::Standard).unwrap_err();
    assert_eq!(err.message, "unexpected character '{'");
    assert_eq!(err.column, 10);
}

#[test]
fn test_lexer_is_lazy() {
    let mut lexer = Lexer::new("SELECT 1 'unterminated", Dialect::Standard);
    assert_eq!(lexer.next().unwrap().unwrap().text, "SELECT");
    assert_eq!(lexer.next().unwrap().unwrap().kind, TokenKind::Whitespace);
    assert_eq!(lexer.next().unwrap().unwrap().text, "1");
    assert_eq!(lexer.next().unwrap().unwrap().kind, TokenKind::Whitespace);
    assert!(lexer.next().unwrap().is_err());
    assert!(lexer.next().is_none());
}

#[test]
fn test_lexer_composes_with_iterator_adapters() {
    let texts: Vec<&str> = Lexer::new("select a, b from t", Dialect::Standard)
        .map(|t| t.unwrap())
        .filter(|t| t.kind != TokenKind::Whitespace)
        .map(|t| t.text)
        .take(4)
        .collect();
    assert_eq!(texts, vec!["select", "a", ",", "b"]);

    let running: Vec<usize> = Lexer::new("a+b", Dialect::Standard)
        .scan(0, |len, t| {
            *len += t.ok()?.text.len();
            Some(*len)
        })
        .collect();
    assert_eq!(running, vec![1, 2, 3]);
}
