use crate::ast::*;
use crate::dialect::Dialect;
use crate::error::{ParseError, SqlError};
use crate::parser::{ParseOptions, parse_script, parse_statement};

mod comments;
mod ddl;
mod dml;
mod errors;
mod expressions;

fn parse_in(sql: &str, dialect: Dialect) -> Statement {
    parse_statement(sql, &ParseOptions::new(dialect)).unwrap()
}

fn parse(sql: &str) -> Statement {
    parse_in(sql, Dialect::Standard)
}

fn query(sql: &str) -> Query {
    match parse(sql) {
        Statement::Query(q) => *q,
        other => panic!("expected a query, got {other:?}"),
    }
}

fn select(sql: &str) -> Select {
    query(sql).as_select().cloned().unwrap()
}

/// First projected expression of `SELECT <text>`.
fn expr(text: &str) -> Expr {
    expr_in(text, Dialect::Standard)
}

fn expr_in(text: &str, dialect: Dialect) -> Expr {
    let Statement::Query(q) = parse_in(&format!("SELECT {text}"), dialect) else {
        panic!("expected a query");
    };
    match q.as_select().map(|s| s.projection[0].clone()) {
        Some(SelectItem::Expr { expr, .. }) => expr,
        other => panic!("expected an expression item, got {other:?}"),
    }
}

fn parse_err(sql: &str, dialect: Dialect) -> ParseError {
    match parse_script(sql, &ParseOptions::new(dialect)) {
        Err(SqlError::Parse(e)) => e,
        other => panic!("expected a parse error, got {other:?}"),
    }
}

fn col(name: &str) -> Expr {
    Expr::column(name)
}

fn num(text: &str) -> Expr {
    Expr::number(text)
}
