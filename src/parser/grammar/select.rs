//! SELECT core: select list, FROM, WHERE, GROUP BY, HAVING.

use crate::ast::*;
use crate::dialect::Production;
use crate::error::ParseError;
use crate::lexer::TokenKind;
use crate::parser::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_select(&mut self) -> Result<Select, ParseError> {
        let start = self.offset();
        self.mark(ClauseKind::Select);
        self.expect_word("SELECT")?;

        let mut top = self.parse_top()?;
        let distinct = if self.eat_word("ALL") {
            Some(Distinct::All)
        } else if self.eat_word("DISTINCT") {
            if self.check_word("ON") {
                if !self.supports(Production::DistinctOn) {
                    return Err(self.unsupported("DISTINCT ON"));
                }
                self.advance();
                self.expect_punct("(")?;
                let exprs = self.parse_comma_separated(Self::parse_expr)?;
                self.expect_punct(")")?;
                Some(Distinct::On(exprs))
            } else {
                Some(Distinct::Distinct)
            }
        } else {
            None
        };
        if top.is_none() {
            top = self.parse_top()?;
        }

        let projection = self.parse_comma_separated(Self::parse_select_item)?;

        let from = if self.check_word("FROM") {
            self.mark(ClauseKind::From);
            self.advance();
            self.parse_from_list()?
        } else {
            Vec::new()
        };

        let selection = if self.check_word("WHERE") {
            self.mark(ClauseKind::Where);
            self.advance();
            Some(self.parse_expr()?)
        } else {
            None
        };

        let group_by = if self.check_words(&["GROUP", "BY"]) {
            self.mark(ClauseKind::GroupBy);
            self.eat_words(&["GROUP", "BY"]);
            self.parse_comma_separated(Self::parse_group_by_item)?
        } else {
            Vec::new()
        };

        let having = if self.check_word("HAVING") {
            self.mark(ClauseKind::Having);
            self.advance();
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(Select {
            distinct,
            top,
            projection,
            from,
            selection,
            group_by,
            having,
            span: self.span_from(start),
        })
    }

    /// `TOP n`, `TOP (expr)`, optionally `PERCENT`.
    fn parse_top(&mut self) -> Result<Option<Top>, ParseError> {
        if !self.supports(Production::Top) || !self.check_word("TOP") {
            return Ok(None);
        }
        self.advance();
        let (quantity, parenthesized) = if self.eat_punct("(") {
            let expr = self.parse_expr()?;
            self.expect_punct(")")?;
            (expr, true)
        } else {
            match self.peek().copied() {
                Some(t) if t.kind == TokenKind::NumericLiteral => {
                    self.advance();
                    (Expr::number(t.text), false)
                }
                Some(t) if t.kind == TokenKind::Parameter => {
                    self.advance();
                    (
                        Expr::Parameter {
                            text: t.text.to_string(),
                        },
                        false,
                    )
                }
                _ => return Err(self.expected("a row count after TOP")),
            }
        };
        let percent = self.eat_word("PERCENT");
        Ok(Some(Top {
            quantity,
            parenthesized,
            percent,
        }))
    }

    pub(crate) fn parse_select_item(&mut self) -> Result<SelectItem, ParseError> {
        if self.eat_op("*") {
            return Ok(SelectItem::Wildcard { qualifier: None });
        }
        if let Some(len) = self.qualified_wildcard_len() {
            let mut parts = Vec::with_capacity(len);
            for _ in 0..len {
                parts.push(self.parse_ident()?);
                self.advance(); // '.'
            }
            self.advance(); // '*'
            return Ok(SelectItem::Wildcard {
                qualifier: Some(ObjectName(parts)),
            });
        }
        if !self.can_start_expr() {
            return Err(self.expected("an expression or '*'"));
        }

        let expr = self.parse_expr()?;
        let explicit_as = self.eat_word("AS");
        let alias = if explicit_as || self.check_ident() {
            Some(self.parse_ident()?)
        } else {
            None
        };
        Ok(SelectItem::Expr {
            expr,
            alias,
            explicit_as,
        })
    }

    /// Number of name parts when the cursor sits on `a.b.*`.
    fn qualified_wildcard_len(&self) -> Option<usize> {
        let mut n = 0;
        loop {
            let ident = self
                .peek_nth(2 * n)
                .is_some_and(|t| matches!(t.kind, TokenKind::Identifier { .. }));
            let dot = self.peek_nth(2 * n + 1).is_some_and(|t| t.is_punct("."));
            if !(ident && dot) {
                break;
            }
            n += 1;
        }
        let star = self.peek_nth(2 * n).is_some_and(|t| t.is_op("*"));
        (n > 0 && star).then_some(n)
    }

    fn parse_group_by_item(&mut self) -> Result<GroupByItem, ParseError> {
        for (word, build) in [
            ("ROLLUP", GroupByItem::Rollup as fn(Vec<Expr>) -> GroupByItem),
            ("CUBE", GroupByItem::Cube),
        ] {
            if self.check_word(word) && self.peek_nth(1).is_some_and(|t| t.is_punct("(")) {
                self.advance();
                self.expect_punct("(")?;
                let exprs = self.parse_comma_separated(Self::parse_expr)?;
                self.expect_punct(")")?;
                return Ok(build(exprs));
            }
        }
        Ok(GroupByItem::Expr(self.parse_expr()?))
    }

    /// `RETURNING item, ...` on INSERT, UPDATE and DELETE.
    pub(crate) fn parse_returning(&mut self) -> Result<Vec<SelectItem>, ParseError> {
        if !self.check_word("RETURNING") {
            return Ok(Vec::new());
        }
        if !self.supports(Production::Returning) {
            return Err(self.unsupported("RETURNING"));
        }
        self.mark(ClauseKind::Returning);
        self.advance();
        self.parse_comma_separated(Self::parse_select_item)
    }
}
