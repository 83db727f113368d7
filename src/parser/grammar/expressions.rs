//! Expression parsing by binding power.
//!
//! | level                         | left | right |
//! |-------------------------------|------|-------|
//! | OR                            | 1    | 2     |
//! | AND                           | 3    | 4     |
//! | NOT (prefix)                  |      | 5     |
//! | comparison, IS, IN, LIKE, ... | 7    | 8     |
//! | & \| ^                        | 9    | 10    |
//! | + -                           | 11   | 12    |
//! | * / %                         | 13   | 14    |
//! | unary + - ~ (prefix)          |      | 15    |
//! | \|\| -> ->>                   | 17   | 18    |
//! | :: (postfix)                  | 19   |       |

use crate::ast::*;
use crate::dialect::Production;
use crate::error::ParseError;
use crate::lexer::TokenKind;
use crate::parser::Parser;

const NOT_PREFIX_BP: u8 = 5;
const PREDICATE_BP: (u8, u8) = (7, 8);
const UNARY_BP: u8 = 15;
const CAST_BP: u8 = 19;

/// Keywords that may open an expression.
const EXPR_KEYWORDS: &[&str] = &[
    "NOT", "CASE", "CAST", "EXISTS", "TRUE", "FALSE", "NULL", "LEFT", "RIGHT",
];

/// Type names that turn a following string literal into a typed literal.
const TYPED_STRING_PREFIXES: &[&str] = &["DATE", "TIME", "TIMESTAMP", "INTERVAL"];

fn binding_power(op: BinaryOp) -> (u8, u8) {
    match op.precedence() {
        precedence::OR => (1, 2),
        precedence::AND => (3, 4),
        precedence::COMPARISON => PREDICATE_BP,
        precedence::BITWISE => (9, 10),
        precedence::ADDITIVE => (11, 12),
        precedence::MULTIPLICATIVE => (13, 14),
        _ => (17, 18),
    }
}

impl<'a> Parser<'a> {
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr_bp(0)
    }

    pub(crate) fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        self.nested(|p| {
            p.folding(|p, folds| {
                let mut lhs = p.parse_prefix()?;
                loop {
                    if p.check_op("::") {
                        if !p.supports(Production::DoubleColonCast) {
                            return Err(p.unsupported("'::' cast"));
                        }
                        if CAST_BP < min_bp {
                            break;
                        }
                        p.fold(folds)?;
                        p.advance();
                        let data_type = p.parse_data_type()?;
                        lhs = Expr::Cast {
                            expr: Box::new(lhs),
                            data_type,
                            style: CastStyle::DoubleColon,
                        };
                        continue;
                    }

                    if p.check_predicate() {
                        if PREDICATE_BP.0 < min_bp {
                            break;
                        }
                        p.fold(folds)?;
                        lhs = p.parse_predicate(lhs)?;
                        continue;
                    }

                    let Some(op) = p.peek_binary_op() else {
                        break;
                    };
                    let (l_bp, r_bp) = binding_power(op);
                    if l_bp < min_bp {
                        break;
                    }
                    p.fold(folds)?;
                    p.advance();
                    let rhs = match p.peek_quantifier() {
                        Some(quantifier) if op.precedence() == precedence::COMPARISON => {
                            p.parse_quantified(quantifier)?
                        }
                        _ => p.parse_expr_bp(r_bp)?,
                    };
                    lhs = Expr::binary(lhs, op, rhs);
                }
                Ok(lhs)
            })
        })
    }

    /// Whether the current token can begin an expression.
    pub(crate) fn can_start_expr(&self) -> bool {
        let Some(t) = self.peek() else {
            return false;
        };
        match t.kind {
            TokenKind::Identifier { .. }
            | TokenKind::StringLiteral
            | TokenKind::NumericLiteral
            | TokenKind::Parameter => true,
            TokenKind::Operator => matches!(t.text, "-" | "+" | "~"),
            TokenKind::Punctuation => t.text == "(",
            TokenKind::Keyword => EXPR_KEYWORDS.iter().any(|w| t.is_word(w)),
            _ => false,
        }
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let Some(token) = self.peek().copied() else {
            return Err(self.expected("an expression"));
        };
        match token.kind {
            TokenKind::NumericLiteral => {
                self.advance();
                Ok(Expr::number(token.text))
            }
            TokenKind::StringLiteral => {
                self.advance();
                Ok(Expr::Literal(Literal::String(SqlString::new(token.text))))
            }
            TokenKind::Parameter => {
                self.advance();
                Ok(Expr::Parameter {
                    text: token.text.to_string(),
                })
            }
            TokenKind::Operator => {
                let op = match token.text {
                    "-" => UnaryOp::Minus,
                    "+" => UnaryOp::Plus,
                    "~" => UnaryOp::BitNot,
                    _ => return Err(self.expected("an expression")),
                };
                self.advance();
                let expr = self.parse_expr_bp(UNARY_BP)?;
                Ok(Expr::Unary {
                    op,
                    expr: Box::new(expr),
                })
            }
            TokenKind::Punctuation if token.text == "(" => self.parse_parenthesized_expr(),
            TokenKind::Keyword => self.parse_keyword_prefix(),
            TokenKind::Identifier { quoted } => {
                if !quoted
                    && TYPED_STRING_PREFIXES.iter().any(|w| token.is_word(w))
                    && self
                        .peek_nth(1)
                        .is_some_and(|t| t.kind == TokenKind::StringLiteral)
                {
                    self.advance();
                    let value = self.advance().map(|t| t.text).unwrap_or_default();
                    return Ok(Expr::TypedString {
                        data_type: DataType::new(token.text),
                        value: SqlString::new(value),
                    });
                }
                let name = self.parse_object_name()?;
                if self.check_punct("(") {
                    return Ok(Expr::Function(self.parse_function_args(name)?));
                }
                Ok(Expr::Column(ColumnRef { parts: name.0 }))
            }
            _ => Err(self.expected("an expression")),
        }
    }

    fn parse_keyword_prefix(&mut self) -> Result<Expr, ParseError> {
        if self.check_words(&["NOT", "EXISTS"]) {
            self.advance();
            return self.parse_exists(true);
        }
        if self.eat_word("NOT") {
            let expr = self.parse_expr_bp(NOT_PREFIX_BP)?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                expr: Box::new(expr),
            });
        }
        if self.check_word("EXISTS") {
            return self.parse_exists(false);
        }
        if self.check_word("CASE") {
            return self.parse_case();
        }
        if self.check_word("CAST") {
            return self.parse_cast();
        }
        if self.eat_word("TRUE") {
            return Ok(Expr::Literal(Literal::Boolean(true)));
        }
        if self.eat_word("FALSE") {
            return Ok(Expr::Literal(Literal::Boolean(false)));
        }
        if self.eat_word("NULL") {
            return Ok(Expr::Literal(Literal::Null));
        }
        // LEFT(s, n) and RIGHT(s, n) are functions despite being join keywords
        if (self.check_word("LEFT") || self.check_word("RIGHT"))
            && self.peek_nth(1).is_some_and(|t| t.is_punct("("))
            && let Some(token) = self.advance()
        {
            let name = ObjectName(vec![Ident::new(token.text)]);
            return Ok(Expr::Function(self.parse_function_args(name)?));
        }
        Err(self.expected("an expression"))
    }

    fn parse_exists(&mut self, negated: bool) -> Result<Expr, ParseError> {
        self.expect_word("EXISTS")?;
        let subquery = self.parse_parenthesized_query()?;
        Ok(Expr::Exists {
            negated,
            subquery: Box::new(subquery),
        })
    }

    /// `(subquery)`, `(expr)` or `(a, b, ...)`.
    fn parse_parenthesized_expr(&mut self) -> Result<Expr, ParseError> {
        if self.check_subquery() {
            return Ok(Expr::Subquery(Box::new(self.parse_parenthesized_query()?)));
        }
        self.expect_punct("(")?;
        let mut items = self.parse_comma_separated(Self::parse_expr)?;
        self.expect_punct(")")?;
        if items.len() == 1 {
            let inner = items.remove(0);
            Ok(Expr::Nested(Box::new(inner)))
        } else {
            Ok(Expr::Tuple(items))
        }
    }

    fn peek_binary_op(&self) -> Option<BinaryOp> {
        let token = self.peek()?;
        match token.kind {
            TokenKind::Keyword if token.is_word("AND") => Some(BinaryOp::And),
            TokenKind::Keyword if token.is_word("OR") => Some(BinaryOp::Or),
            TokenKind::Operator => BinaryOp::from_operator(token.text),
            _ => None,
        }
    }

    /// IS, [NOT] IN, [NOT] BETWEEN, [NOT] LIKE, [NOT] ILIKE.
    fn check_predicate(&self) -> bool {
        if self.check_word("IS") {
            return true;
        }
        let n = usize::from(self.check_word("NOT"));
        self.check_nth_word(n, "IN")
            || self.check_nth_word(n, "BETWEEN")
            || self.check_nth_word(n, "LIKE")
            || (self.supports(Production::ILike) && self.check_nth_word(n, "ILIKE"))
    }

    fn parse_predicate(&mut self, lhs: Expr) -> Result<Expr, ParseError> {
        let expr = Box::new(lhs);
        if self.eat_word("IS") {
            let negated = self.eat_word("NOT");
            let test = if self.eat_word("NULL") {
                IsTest::Null
            } else if self.eat_word("TRUE") {
                IsTest::True
            } else if self.eat_word("FALSE") {
                IsTest::False
            } else if self.eat_word("UNKNOWN") {
                IsTest::Unknown
            } else {
                return Err(self.expected("NULL, TRUE, FALSE or UNKNOWN"));
            };
            return Ok(Expr::Is {
                expr,
                negated,
                test,
            });
        }

        let negated = self.eat_word("NOT");
        if self.eat_word("IN") {
            if self.check_subquery() {
                let subquery = self.parse_parenthesized_query()?;
                return Ok(Expr::InSubquery {
                    expr,
                    negated,
                    subquery: Box::new(subquery),
                });
            }
            self.expect_punct("(")?;
            let list = self.parse_comma_separated(Self::parse_expr)?;
            self.expect_punct(")")?;
            return Ok(Expr::InList {
                expr,
                negated,
                list,
            });
        }
        if self.eat_word("BETWEEN") {
            let low = self.parse_expr_bp(PREDICATE_BP.1)?;
            self.expect_word("AND")?;
            let high = self.parse_expr_bp(PREDICATE_BP.1)?;
            return Ok(Expr::Between {
                expr,
                negated,
                low: Box::new(low),
                high: Box::new(high),
            });
        }
        let op = if self.eat_word("LIKE") {
            LikeOp::Like
        } else if self.eat_word("ILIKE") {
            LikeOp::ILike
        } else {
            return Err(self.expected("IN, BETWEEN or LIKE"));
        };
        let pattern = self.parse_expr_bp(PREDICATE_BP.1)?;
        let escape = if self.eat_word("ESCAPE") {
            Some(Box::new(self.parse_expr_bp(PREDICATE_BP.1)?))
        } else {
            None
        };
        Ok(Expr::Like {
            expr,
            negated,
            op,
            pattern: Box::new(pattern),
            escape,
        })
    }

    fn peek_quantifier(&self) -> Option<Quantifier> {
        if !self.peek_nth(1).is_some_and(|t| t.is_punct("(")) {
            return None;
        }
        if self.check_word("ANY") {
            Some(Quantifier::Any)
        } else if self.check_word("SOME") {
            Some(Quantifier::Some)
        } else if self.check_word("ALL") {
            Some(Quantifier::All)
        } else {
            None
        }
    }

    /// `ANY (subquery)` or `ANY (array expression)`.
    fn parse_quantified(&mut self, quantifier: Quantifier) -> Result<Expr, ParseError> {
        self.advance();
        let subject = if self.check_subquery() {
            Expr::Subquery(Box::new(self.parse_parenthesized_query()?))
        } else {
            self.expect_punct("(")?;
            let expr = self.parse_expr()?;
            self.expect_punct(")")?;
            expr
        };
        Ok(Expr::Quantified {
            quantifier,
            subject: Box::new(subject),
        })
    }
}
