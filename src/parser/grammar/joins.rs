//! FROM lists, table factors and JOIN chains.

use crate::ast::*;
use crate::error::ParseError;
use crate::lexer::TokenKind;
use crate::parser::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_from_list(&mut self) -> Result<Vec<TableWithJoins>, ParseError> {
        self.parse_comma_separated(Self::parse_table_with_joins)
    }

    fn parse_table_with_joins(&mut self) -> Result<TableWithJoins, ParseError> {
        let relation = self.parse_table_factor()?;
        let mut joins = Vec::new();
        while let Some(join) = self.parse_join()? {
            joins.push(join);
        }
        Ok(TableWithJoins { relation, joins })
    }

    pub(crate) fn parse_table_factor(&mut self) -> Result<TableFactor, ParseError> {
        let start = self.offset();
        let lateral = self.check_word("LATERAL")
            && self
                .peek_nth(1)
                .is_some_and(|t| t.is_punct("(") || matches!(t.kind, TokenKind::Identifier { .. }));
        if lateral {
            self.advance();
        }

        if self.check_punct("(") {
            if !self.check_subquery() {
                return Err(self.error_here("expected a subquery after '('"));
            }
            let subquery = self.parse_parenthesized_query()?;
            let alias = self.parse_optional_table_alias()?;
            return Ok(TableFactor::Derived {
                lateral,
                subquery: Box::new(subquery),
                alias,
                span: self.span_from(start),
            });
        }

        if !self.check_ident() {
            return Err(self.expected("a table name"));
        }
        let name = self.parse_object_name()?;
        if self.check_punct("(") {
            let call = self.parse_function_args(name)?;
            let alias = self.parse_optional_table_alias()?;
            return Ok(TableFactor::Function {
                lateral,
                call,
                alias,
                span: self.span_from(start),
            });
        }
        if lateral {
            return Err(self.error_here("expected a subquery or function after LATERAL"));
        }
        let alias = self.parse_optional_table_alias()?;
        Ok(TableFactor::Table {
            name,
            alias,
            span: self.span_from(start),
        })
    }

    fn parse_join(&mut self) -> Result<Option<Join>, ParseError> {
        let start = self.offset();
        let natural = self.check_word("NATURAL");
        let n = usize::from(natural);
        let word = |i: usize, w: &str| self.check_nth_word(n + i, w);

        let (operator, words) = if word(0, "JOIN") {
            (JoinOperator::Join, 1)
        } else if word(0, "INNER") && word(1, "JOIN") {
            (JoinOperator::Inner, 2)
        } else if word(0, "CROSS") && word(1, "JOIN") {
            (JoinOperator::Cross, 2)
        } else if word(0, "LEFT") && word(1, "OUTER") && word(2, "JOIN") {
            (JoinOperator::LeftOuter, 3)
        } else if word(0, "LEFT") && word(1, "JOIN") {
            (JoinOperator::Left, 2)
        } else if word(0, "RIGHT") && word(1, "OUTER") && word(2, "JOIN") {
            (JoinOperator::RightOuter, 3)
        } else if word(0, "RIGHT") && word(1, "JOIN") {
            (JoinOperator::Right, 2)
        } else if word(0, "FULL") && word(1, "OUTER") && word(2, "JOIN") {
            (JoinOperator::FullOuter, 3)
        } else if word(0, "FULL") && word(1, "JOIN") {
            (JoinOperator::Full, 2)
        } else if natural {
            return Err(self.error_at_nth(1, "expected JOIN after NATURAL"));
        } else {
            return Ok(None);
        };
        for _ in 0..n + words {
            self.advance();
        }

        let relation = self.parse_table_factor()?;
        let constraint = if natural || operator == JoinOperator::Cross {
            JoinConstraint::None
        } else if self.eat_word("ON") {
            JoinConstraint::On(self.parse_expr()?)
        } else if self.eat_word("USING") {
            JoinConstraint::Using(self.parse_parenthesized_idents()?)
        } else {
            return Err(self.expected("ON or USING"));
        };

        Ok(Some(Join {
            natural,
            operator,
            relation,
            constraint,
            span: self.span_from(start),
        }))
    }

    fn error_at_nth(&self, n: usize, message: &str) -> ParseError {
        match self.peek_nth(n) {
            Some(token) => ParseError::at(message, token),
            None => self.error_here(message),
        }
    }
}
