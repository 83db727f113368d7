//! CREATE TABLE, CREATE VIEW, DROP and TRUNCATE.

use crate::ast::*;
use crate::error::ParseError;
use crate::parser::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_create(&mut self) -> Result<Statement, ParseError> {
        let start = self.offset();
        self.mark(ClauseKind::Create);
        self.expect_word("CREATE")?;
        let or_replace = self.eat_words(&["OR", "REPLACE"]);

        if self.eat_word("VIEW") {
            let name = self.parse_object_name()?;
            let columns = if self.check_punct("(") {
                self.parse_parenthesized_idents()?
            } else {
                Vec::new()
            };
            self.expect_word("AS")?;
            let query = self.parse_query()?;
            return Ok(Statement::CreateView(Box::new(CreateView {
                or_replace,
                name,
                columns,
                query: Box::new(query),
                span: self.span_from(start),
            })));
        }

        if or_replace || !self.eat_word("TABLE") {
            return Err(self.expected(if or_replace { "VIEW" } else { "TABLE or VIEW" }));
        }
        let if_not_exists = self.eat_words(&["IF", "NOT", "EXISTS"]);
        let name = self.parse_object_name()?;

        self.expect_punct("(")?;
        let mut columns = Vec::new();
        let mut constraints = Vec::new();
        loop {
            if self.check_table_constraint() {
                constraints.push(self.parse_table_constraint()?);
            } else {
                columns.push(self.parse_column_def()?);
            }
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct(")")?;

        Ok(Statement::CreateTable(Box::new(CreateTable {
            if_not_exists,
            name,
            columns,
            constraints,
            span: self.span_from(start),
        })))
    }

    fn check_table_constraint(&self) -> bool {
        ["CONSTRAINT", "PRIMARY", "UNIQUE", "FOREIGN", "CHECK"]
            .iter()
            .any(|w| self.check_word(w))
    }

    fn parse_column_def(&mut self) -> Result<ColumnDef, ParseError> {
        let name = self.parse_ident()?;
        let data_type = self.parse_data_type()?;
        let mut options = Vec::new();
        loop {
            let name = if self.eat_word("CONSTRAINT") {
                Some(self.parse_ident()?)
            } else {
                None
            };
            let option = if self.eat_words(&["NOT", "NULL"]) {
                ColumnOption::NotNull
            } else if self.eat_word("NULL") {
                ColumnOption::Null
            } else if self.eat_words(&["PRIMARY", "KEY"]) {
                ColumnOption::PrimaryKey
            } else if self.eat_word("UNIQUE") {
                ColumnOption::Unique
            } else if self.eat_word("DEFAULT") {
                ColumnOption::Default(self.parse_expr()?)
            } else if self.eat_word("CHECK") {
                ColumnOption::Check(self.parse_check_body()?)
            } else if self.eat_word("REFERENCES") {
                let table = self.parse_object_name()?;
                let columns = if self.check_punct("(") {
                    self.parse_parenthesized_idents()?
                } else {
                    Vec::new()
                };
                ColumnOption::References { table, columns }
            } else if name.is_some() {
                return Err(self.expected("a column constraint"));
            } else {
                break;
            };
            options.push(ColumnOptionDef { name, option });
        }
        Ok(ColumnDef {
            name,
            data_type,
            options,
        })
    }

    fn parse_table_constraint(&mut self) -> Result<TableConstraint, ParseError> {
        let name = if self.eat_word("CONSTRAINT") {
            Some(self.parse_ident()?)
        } else {
            None
        };
        let kind = if self.eat_words(&["PRIMARY", "KEY"]) {
            TableConstraintKind::PrimaryKey(self.parse_parenthesized_idents()?)
        } else if self.eat_word("UNIQUE") {
            TableConstraintKind::Unique(self.parse_parenthesized_idents()?)
        } else if self.eat_words(&["FOREIGN", "KEY"]) {
            let columns = self.parse_parenthesized_idents()?;
            self.expect_word("REFERENCES")?;
            let foreign_table = self.parse_object_name()?;
            let referred_columns = if self.check_punct("(") {
                self.parse_parenthesized_idents()?
            } else {
                Vec::new()
            };
            TableConstraintKind::ForeignKey {
                columns,
                foreign_table,
                referred_columns,
            }
        } else if self.eat_word("CHECK") {
            TableConstraintKind::Check(self.parse_check_body()?)
        } else {
            return Err(self.expected("PRIMARY KEY, UNIQUE, FOREIGN KEY or CHECK"));
        };
        Ok(TableConstraint { name, kind })
    }

    fn parse_check_body(&mut self) -> Result<Expr, ParseError> {
        self.expect_punct("(")?;
        let expr = self.parse_expr()?;
        self.expect_punct(")")?;
        Ok(expr)
    }

    /// `DROP {TABLE|VIEW|...} [IF EXISTS] name, ... [CASCADE|RESTRICT]`
    pub(crate) fn parse_drop(&mut self) -> Result<DropStatement, ParseError> {
        let start = self.offset();
        self.mark(ClauseKind::Drop);
        self.expect_word("DROP")?;
        let object_type = match self.peek().and_then(|t| ObjectType::from_word(t.text)) {
            Some(t) => {
                self.advance();
                t
            }
            None => return Err(self.expected("TABLE, VIEW, INDEX, FUNCTION, SEQUENCE or SCHEMA")),
        };
        let if_exists = self.eat_words(&["IF", "EXISTS"]);
        let names = self.parse_comma_separated(Self::parse_object_name)?;
        let behavior = if self.eat_word("CASCADE") {
            Some(DropBehavior::Cascade)
        } else if self.eat_word("RESTRICT") {
            Some(DropBehavior::Restrict)
        } else {
            None
        };
        Ok(DropStatement {
            object_type,
            if_exists,
            names,
            behavior,
            span: self.span_from(start),
        })
    }

    /// `TRUNCATE [TABLE] name, ...`
    pub(crate) fn parse_truncate(&mut self) -> Result<Truncate, ParseError> {
        let start = self.offset();
        self.mark(ClauseKind::Truncate);
        self.expect_word("TRUNCATE")?;
        let table_keyword = self.eat_word("TABLE");
        let names = self.parse_comma_separated(Self::parse_object_name)?;
        Ok(Truncate {
            table_keyword,
            names,
            span: self.span_from(start),
        })
    }
}
