//! Queries: WITH, set operations, VALUES, ORDER BY and row limits.

use crate::ast::*;
use crate::dialect::Production;
use crate::error::ParseError;
use crate::parser::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_query(&mut self) -> Result<Query, ParseError> {
        self.nested(|p| {
            let start = p.offset();
            let with = if p.check_word("WITH") {
                Some(p.parse_with()?)
            } else {
                None
            };
            let body = p.parse_set_expr(0)?;

            let order_by = if p.check_words(&["ORDER", "BY"]) {
                p.mark(ClauseKind::OrderBy);
                p.eat_words(&["ORDER", "BY"]);
                p.parse_comma_separated(Self::parse_order_by_item)?
            } else {
                Vec::new()
            };
            let limit = p.parse_row_limit()?;

            Ok(Query {
                with,
                body,
                order_by,
                limit,
                span: p.span_from(start),
            })
        })
    }

    /// `( query )` nested below the current statement.
    pub(crate) fn parse_parenthesized_query(&mut self) -> Result<Query, ParseError> {
        self.expect_punct("(")?;
        let query = self.inner_query(Self::parse_query)?;
        self.expect_punct(")")?;
        Ok(query)
    }

    /// True at `(` followed by SELECT or WITH.
    pub(crate) fn check_subquery(&self) -> bool {
        self.check_punct("(")
            && (self.check_nth_word(1, "SELECT") || self.check_nth_word(1, "WITH"))
    }

    fn parse_with(&mut self) -> Result<With, ParseError> {
        let start = self.offset();
        self.mark(ClauseKind::With);
        self.expect_word("WITH")?;
        let recursive = self.eat_word("RECURSIVE");
        let ctes = self.parse_comma_separated(Self::parse_cte)?;
        Ok(With {
            recursive,
            ctes,
            span: self.span_from(start),
        })
    }

    fn parse_cte(&mut self) -> Result<Cte, ParseError> {
        let start = self.offset();
        let name = self.parse_ident()?;
        let columns = if self.check_punct("(") {
            self.parse_parenthesized_idents()?
        } else {
            Vec::new()
        };
        self.expect_word("AS")?;
        let query = self.parse_parenthesized_query()?;
        Ok(Cte {
            name,
            columns,
            query: Box::new(query),
            span: self.span_from(start),
        })
    }

    /// Set operations by precedence: INTERSECT binds tighter than UNION,
    /// EXCEPT and MINUS; all are left associative.
    fn parse_set_expr(&mut self, min_prec: u8) -> Result<SetExpr, ParseError> {
        self.folding(|p, folds| {
            let mut left = p.parse_set_operand()?;
            while let Some(op) = p.peek_set_operator() {
                let prec = match op {
                    SetOperator::Intersect => 2,
                    _ => 1,
                };
                if prec < min_prec {
                    break;
                }
                p.fold(folds)?;
                p.mark(ClauseKind::SetOperator);
                p.advance();
                let quantifier = if p.eat_word("ALL") {
                    SetQuantifier::All
                } else if p.eat_word("DISTINCT") {
                    SetQuantifier::Distinct
                } else {
                    SetQuantifier::None
                };
                let right = p.parse_set_expr(prec + 1)?;
                left = SetExpr::SetOperation(Box::new(SetOperation {
                    op,
                    quantifier,
                    left,
                    right,
                }));
            }
            Ok(left)
        })
    }

    fn peek_set_operator(&self) -> Option<SetOperator> {
        if self.check_word("UNION") {
            Some(SetOperator::Union)
        } else if self.check_word("INTERSECT") {
            Some(SetOperator::Intersect)
        } else if self.check_word("EXCEPT") {
            Some(SetOperator::Except)
        } else if self.supports(Production::MinusOperator) && self.check_word("MINUS") {
            Some(SetOperator::Minus)
        } else {
            None
        }
    }

    fn parse_set_operand(&mut self) -> Result<SetExpr, ParseError> {
        if self.check_word("SELECT") {
            Ok(SetExpr::Select(Box::new(self.parse_select()?)))
        } else if self.check_word("VALUES") {
            Ok(SetExpr::Values(self.parse_values()?))
        } else if self.check_punct("(") {
            Ok(SetExpr::Query(Box::new(self.parse_parenthesized_query()?)))
        } else {
            Err(self.expected("SELECT, VALUES or '('"))
        }
    }

    pub(crate) fn parse_values(&mut self) -> Result<Values, ParseError> {
        self.mark(ClauseKind::Values);
        self.expect_word("VALUES")?;
        let rows = self.parse_comma_separated(|p| {
            p.expect_punct("(")?;
            let row = p.parse_comma_separated(Self::parse_expr)?;
            p.expect_punct(")")?;
            Ok(row)
        })?;
        Ok(Values { rows })
    }

    pub(crate) fn parse_order_by_item(&mut self) -> Result<OrderByItem, ParseError> {
        let expr = self.parse_expr()?;
        let asc = if self.eat_word("ASC") {
            Some(true)
        } else if self.eat_word("DESC") {
            Some(false)
        } else {
            None
        };
        let nulls_first = if self.eat_words(&["NULLS", "FIRST"]) {
            Some(true)
        } else if self.eat_words(&["NULLS", "LAST"]) {
            Some(false)
        } else {
            None
        };
        Ok(OrderByItem {
            expr,
            asc,
            nulls_first,
        })
    }

    /// `LIMIT n [OFFSET m]`, `LIMIT m, n`, `OFFSET m [ROWS]`, `FETCH FIRST n ROWS ONLY`.
    fn parse_row_limit(&mut self) -> Result<Option<RowLimit>, ParseError> {
        if self.check_word("LIMIT") {
            if !self.supports(Production::LimitOffset) {
                return Err(self.unsupported("LIMIT"));
            }
            self.mark(ClauseKind::Limit);
            self.advance();
            let mut limit = if self.eat_word("ALL") {
                None
            } else {
                Some(self.parse_expr()?)
            };
            let mut offset = None;
            if limit.is_some() && self.eat_punct(",") {
                // MySQL: LIMIT offset, count
                offset = limit.take();
                limit = Some(self.parse_expr()?);
            } else if self.eat_word("OFFSET") {
                offset = Some(self.parse_expr()?);
            }
            return Ok(Some(RowLimit {
                limit,
                offset,
                style: LimitStyle::LimitOffset,
            }));
        }

        let mut offset = None;
        let mut rows_keyword = false;
        let marked = self.check_word("OFFSET") || self.check_word("FETCH");
        if marked {
            self.mark(ClauseKind::Limit);
        }
        if self.eat_word("OFFSET") {
            offset = Some(self.parse_expr()?);
            rows_keyword = self.eat_word("ROWS") || self.eat_word("ROW");
        }
        if self.check_word("FETCH") {
            if !self.supports(Production::FetchFirst) {
                return Err(self.unsupported("FETCH FIRST"));
            }
            self.advance();
            if !(self.eat_word("FIRST") || self.eat_word("NEXT")) {
                return Err(self.expected("FIRST or NEXT"));
            }
            let limit = if self.check_word("ROW") || self.check_word("ROWS") {
                Expr::number("1")
            } else {
                self.parse_expr()?
            };
            if !(self.eat_word("ROWS") || self.eat_word("ROW")) {
                return Err(self.expected("ROWS"));
            }
            self.expect_word("ONLY")?;
            return Ok(Some(RowLimit {
                limit: Some(limit),
                offset,
                style: LimitStyle::FetchFirst,
            }));
        }

        Ok(offset.map(|offset| {
            let style = if rows_keyword || !self.supports(Production::LimitOffset) {
                LimitStyle::FetchFirst
            } else {
                LimitStyle::LimitOffset
            };
            RowLimit {
                limit: None,
                offset: Some(offset),
                style,
            }
        }))
    }
}
