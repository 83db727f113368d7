use crate::ast::*;
use crate::error::ParseError;
use crate::parser::Parser;

impl<'a> Parser<'a> {
    /// `CASE [operand] WHEN .. THEN .. [...] [ELSE ..] END`
    pub(crate) fn parse_case(&mut self) -> Result<Expr, ParseError> {
        self.expect_word("CASE")?;
        let operand = if self.check_word("WHEN") {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };

        let mut branches = Vec::new();
        while self.eat_word("WHEN") {
            let condition = self.parse_expr()?;
            self.expect_word("THEN")?;
            let result = self.parse_expr()?;
            branches.push(WhenThen { condition, result });
        }
        if branches.is_empty() {
            return Err(self.expected("WHEN"));
        }

        let else_result = if self.eat_word("ELSE") {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        self.expect_word("END")?;

        Ok(Expr::Case {
            operand,
            branches,
            else_result,
        })
    }
}
