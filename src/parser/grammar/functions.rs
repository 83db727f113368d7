//! Function calls, CAST and type names.

use crate::ast::*;
use crate::error::ParseError;
use crate::lexer::TokenKind;
use crate::parser::Parser;

/// Words that extend a type name: `DOUBLE PRECISION`, `CHARACTER VARYING`.
const TYPE_NAME_CONTINUATIONS: &[&str] = &["PRECISION", "VARYING"];

impl<'a> Parser<'a> {
    /// Argument list and trailing FILTER / OVER for a call to `name`.
    pub(crate) fn parse_function_args(&mut self, name: ObjectName) -> Result<FunctionCall, ParseError> {
        self.expect_punct("(")?;
        let mut distinct = false;
        let args = if self.check_op("*") && self.peek_nth(1).is_some_and(|t| t.is_punct(")")) {
            self.advance();
            FunctionArgs::Star
        } else if self.check_punct(")") {
            FunctionArgs::List(Vec::new())
        } else {
            distinct = self.eat_word("DISTINCT");
            FunctionArgs::List(self.parse_comma_separated(Self::parse_expr)?)
        };
        self.expect_punct(")")?;

        let filter = if self.eat_word("FILTER") {
            self.expect_punct("(")?;
            self.expect_word("WHERE")?;
            let expr = self.parse_expr()?;
            self.expect_punct(")")?;
            Some(Box::new(expr))
        } else {
            None
        };

        let over = if self.eat_word("OVER") {
            Some(self.parse_window_spec()?)
        } else {
            None
        };

        Ok(FunctionCall {
            name,
            args,
            distinct,
            filter,
            over,
        })
    }

    fn parse_window_spec(&mut self) -> Result<WindowSpec, ParseError> {
        self.expect_punct("(")?;
        let partition_by = if self.eat_words(&["PARTITION", "BY"]) {
            self.parse_comma_separated(Self::parse_expr)?
        } else {
            Vec::new()
        };
        let order_by = if self.eat_words(&["ORDER", "BY"]) {
            self.parse_comma_separated(Self::parse_order_by_item)?
        } else {
            Vec::new()
        };
        self.expect_punct(")")?;
        Ok(WindowSpec {
            partition_by,
            order_by,
        })
    }

    /// `CAST(expr AS type)`
    pub(crate) fn parse_cast(&mut self) -> Result<Expr, ParseError> {
        self.expect_word("CAST")?;
        self.expect_punct("(")?;
        let expr = self.parse_expr()?;
        self.expect_word("AS")?;
        let data_type = self.parse_data_type()?;
        self.expect_punct(")")?;
        Ok(Expr::Cast {
            expr: Box::new(expr),
            data_type,
            style: CastStyle::Function,
        })
    }

    /// `name [(arg, ...)] [WITH[OUT] TIME ZONE] [[]...]`
    pub(crate) fn parse_data_type(&mut self) -> Result<DataType, ParseError> {
        let mut name = match self.peek() {
            Some(t) if matches!(t.kind, TokenKind::Identifier { .. }) => t.text.to_string(),
            _ => return Err(self.expected("a data type")),
        };
        self.advance();
        while self.check_punct(".")
            && let Some(part) = self
                .peek_nth(1)
                .filter(|t| matches!(t.kind, TokenKind::Identifier { .. }))
                .map(|t| t.text)
        {
            self.advance();
            self.advance();
            name.push('.');
            name.push_str(part);
        }
        while let Some(word) = self
            .peek()
            .filter(|t| TYPE_NAME_CONTINUATIONS.iter().any(|w| t.is_word(w)))
            .map(|t| t.text)
        {
            self.advance();
            name.push(' ');
            name.push_str(word);
        }

        let mut args = Vec::new();
        if self.eat_punct("(") {
            loop {
                let mut arg = String::new();
                while let Some(t) = self.peek().filter(|t| !t.is_punct(",") && !t.is_punct(")")) {
                    arg.push_str(t.text);
                    self.advance();
                }
                if arg.is_empty() {
                    return Err(self.expected("a type argument"));
                }
                args.push(arg);
                if !self.eat_punct(",") {
                    break;
                }
            }
            self.expect_punct(")")?;
        }

        let time_zone = if self.eat_words(&["WITH", "TIME", "ZONE"]) {
            Some(true)
        } else if self.eat_words(&["WITHOUT", "TIME", "ZONE"]) {
            Some(false)
        } else {
            None
        };

        let mut array_dims = 0;
        while self.check_punct("[") && self.peek_nth(1).is_some_and(|t| t.is_punct("]")) {
            self.advance();
            self.advance();
            array_dims += 1;
        }

        Ok(DataType {
            name,
            args,
            time_zone,
            array_dims,
        })
    }
}
