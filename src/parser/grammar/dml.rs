//! INSERT, UPDATE and DELETE.

use crate::ast::*;
use crate::error::ParseError;
use crate::parser::Parser;

impl<'a> Parser<'a> {
    /// `INSERT INTO t [(cols)] {VALUES ... | query | DEFAULT VALUES} [RETURNING ...]`
    pub(crate) fn parse_insert(&mut self) -> Result<Insert, ParseError> {
        let start = self.offset();
        self.mark(ClauseKind::Insert);
        self.expect_word("INSERT")?;
        self.expect_word("INTO")?;
        let table = self.parse_object_name()?;
        let columns = if self.check_punct("(") && !self.check_subquery() {
            self.parse_parenthesized_idents()?
        } else {
            Vec::new()
        };

        let source = if self.eat_words(&["DEFAULT", "VALUES"]) {
            InsertSource::DefaultValues
        } else if self.check_word("VALUES")
            || self.check_word("SELECT")
            || self.check_word("WITH")
            || self.check_punct("(")
        {
            InsertSource::Query(Box::new(self.parse_query()?))
        } else {
            return Err(self.expected("VALUES, SELECT or DEFAULT VALUES"));
        };

        let returning = self.parse_returning()?;
        Ok(Insert {
            table,
            columns,
            source,
            returning,
            span: self.span_from(start),
        })
    }

    /// `UPDATE t [alias] SET a = 1, ... [FROM ...] [WHERE ...] [RETURNING ...]`
    pub(crate) fn parse_update(&mut self) -> Result<Update, ParseError> {
        let start = self.offset();
        self.mark(ClauseKind::Update);
        self.expect_word("UPDATE")?;
        let table = self.parse_object_name()?;
        let alias = self.parse_optional_table_alias()?;

        self.mark(ClauseKind::Set);
        self.expect_word("SET")?;
        let assignments = self.parse_comma_separated(|p| {
            let target = p.parse_object_name()?.0;
            if !p.eat_op("=") {
                return Err(p.expected("'='"));
            }
            let value = p.parse_expr()?;
            Ok(Assignment { target, value })
        })?;

        let from = if self.check_word("FROM") {
            self.mark(ClauseKind::From);
            self.advance();
            self.parse_from_list()?
        } else {
            Vec::new()
        };
        let selection = self.parse_where()?;
        let returning = self.parse_returning()?;

        Ok(Update {
            table,
            alias,
            assignments,
            from,
            selection,
            returning,
            span: self.span_from(start),
        })
    }

    /// `DELETE [FROM] t [alias] [USING ...] [WHERE ...] [RETURNING ...]`
    pub(crate) fn parse_delete(&mut self) -> Result<Delete, ParseError> {
        let start = self.offset();
        self.mark(ClauseKind::Delete);
        self.expect_word("DELETE")?;
        self.eat_word("FROM");
        let table = self.parse_object_name()?;
        let alias = self.parse_optional_table_alias()?;

        let using = if self.check_word("USING") {
            self.mark(ClauseKind::Using);
            self.advance();
            self.parse_from_list()?
        } else {
            Vec::new()
        };
        let selection = self.parse_where()?;
        let returning = self.parse_returning()?;

        Ok(Delete {
            table,
            alias,
            using,
            selection,
            returning,
            span: self.span_from(start),
        })
    }

    fn parse_where(&mut self) -> Result<Option<Expr>, ParseError> {
        if !self.check_word("WHERE") {
            return Ok(None);
        }
        self.mark(ClauseKind::Where);
        self.advance();
        Ok(Some(self.parse_expr()?))
    }
}
