//! Expression rendering as a post-order fold over [`Visit`].
//!
//! Every finished expression or function call leaves its rendering on a
//! stack; a parent pops the renderings of its children in visit order and
//! pushes its own. Nested queries are not rendered here: they stay as query
//! pieces for the clause writer, so nodes below a query are skipped.

use crate::ast::*;

use super::{Formatter, Pieces, dotted, right_needs_parens, starts_with_minus};

pub(super) struct ExprRenderer<'f, 's, 'q> {
    fmt: &'f Formatter<'s>,
    stack: Vec<Pieces<'q>>,
    /// Depth below a nested query.
    in_query: usize,
}

impl<'f, 's, 'q> ExprRenderer<'f, 's, 'q> {
    pub(super) fn new(fmt: &'f Formatter<'s>) -> Self {
        Self {
            fmt,
            stack: Vec::new(),
            in_query: 0,
        }
    }

    /// Render `node` and return its pieces.
    pub(super) fn render(mut self, node: &'q impl Visit) -> Pieces<'q> {
        node.visit(&mut self);
        self.stack.pop().unwrap_or_else(Pieces::new)
    }

    /// Renderings of the last `n` finished children, oldest first.
    fn children(&mut self, n: usize) -> Children<'q> {
        let at = self.stack.len().saturating_sub(n);
        Children(self.stack.split_off(at).into_iter())
    }

    fn function(&mut self, call: &'q FunctionCall) -> Pieces<'q> {
        let fmt = self.fmt;
        let args = match &call.args {
            FunctionArgs::Star => 0,
            FunctionArgs::List(args) => args.len(),
        };
        let (partition, order) = call
            .over
            .as_ref()
            .map_or((0, 0), |over| (over.partition_by.len(), over.order_by.len()));
        let mut kids = self.children(args + usize::from(call.filter.is_some()) + partition + order);

        let mut p = Pieces::new();
        p.text(&format!("{}(", call.name));
        match &call.args {
            FunctionArgs::Star => p.text("*"),
            FunctionArgs::List(_) => {
                if call.distinct {
                    p.text(&fmt.kw("DISTINCT "));
                }
                kids.list(args, &mut p);
            }
        }
        p.text(")");
        if call.filter.is_some() {
            p.text(&format!(" {} ({} ", fmt.kw("FILTER"), fmt.kw("WHERE")));
            p.append(kids.next());
            p.text(")");
        }
        if let Some(over) = &call.over {
            p.text(&format!(" {} (", fmt.kw("OVER")));
            if partition > 0 {
                p.text(&format!("{} ", fmt.kw("PARTITION BY")));
                kids.list(partition, &mut p);
            }
            if order > 0 {
                if partition > 0 {
                    p.text(" ");
                }
                p.text(&format!("{} ", fmt.kw("ORDER BY")));
                for (i, item) in over.order_by.iter().enumerate() {
                    if i > 0 {
                        p.text(", ");
                    }
                    p.append(kids.next());
                    p.text(&fmt.order_suffix(item));
                }
            }
            p.text(")");
        }
        p
    }

    fn expr(&mut self, e: &'q Expr) -> Pieces<'q> {
        let fmt = self.fmt;
        let mut p = Pieces::new();
        match e {
            Expr::Column(c) => p.text(&dotted(&c.parts)),
            Expr::Literal(literal) => p.text(&fmt.literal(literal)),
            Expr::Parameter { text } => p.text(text),
            Expr::TypedString { data_type, value } => {
                p.text(&format!("{} {}", fmt.data_type(data_type), value.raw));
            }
            Expr::Unary { op, expr } => {
                let mut kids = self.children(1);
                match op {
                    UnaryOp::Not => {
                        p.text(&fmt.kw("NOT "));
                        kids.child(expr.precedence() < precedence::NOT, &mut p);
                    }
                    _ => {
                        p.text(op.as_str());
                        let parens = expr.precedence() < precedence::UNARY;
                        if !parens && *op == UnaryOp::Minus && starts_with_minus(expr) {
                            p.text(" ");
                        }
                        kids.child(parens, &mut p);
                    }
                }
            }
            Expr::Binary { left, op, right } => {
                let mut kids = self.children(2);
                let prec = op.precedence();
                kids.child(left.precedence() < prec, &mut p);
                let symbol = if op.is_keyword() {
                    fmt.kw(op.as_str())
                } else {
                    op.as_str().to_string()
                };
                p.text(&format!(" {} ", symbol));
                kids.child(right_needs_parens(right, prec), &mut p);
            }
            // the call node already left its rendering on the stack
            Expr::Function(_) => return self.children(1).next(),
            Expr::Subquery(q) => p.sub(q),
            Expr::Exists { negated, subquery } => {
                p.text(&format!("{}{} ", fmt.not(*negated), fmt.kw("EXISTS")));
                p.sub(subquery);
            }
            Expr::InList {
                expr,
                negated,
                list,
            } => {
                let mut kids = self.children(1 + list.len());
                kids.child(expr.precedence() < precedence::COMPARISON, &mut p);
                p.text(&format!(" {}{} (", fmt.not(*negated), fmt.kw("IN")));
                kids.list(list.len(), &mut p);
                p.text(")");
            }
            Expr::InSubquery {
                expr,
                negated,
                subquery,
            } => {
                let mut kids = self.children(1);
                kids.child(expr.precedence() < precedence::COMPARISON, &mut p);
                p.text(&format!(" {}{} ", fmt.not(*negated), fmt.kw("IN")));
                p.sub(subquery);
            }
            Expr::Between {
                expr,
                negated,
                low,
                high,
            } => {
                let mut kids = self.children(3);
                kids.child(expr.precedence() < precedence::COMPARISON, &mut p);
                p.text(&format!(" {}{} ", fmt.not(*negated), fmt.kw("BETWEEN")));
                kids.child(right_needs_parens(low, precedence::COMPARISON), &mut p);
                p.text(&format!(" {} ", fmt.kw("AND")));
                kids.child(right_needs_parens(high, precedence::COMPARISON), &mut p);
            }
            Expr::Like {
                expr,
                negated,
                op,
                pattern,
                escape,
            } => {
                let mut kids = self.children(2 + usize::from(escape.is_some()));
                kids.child(expr.precedence() < precedence::COMPARISON, &mut p);
                let word = match op {
                    LikeOp::Like => "LIKE",
                    LikeOp::ILike => "ILIKE",
                };
                p.text(&format!(" {}{} ", fmt.not(*negated), fmt.kw(word)));
                kids.child(right_needs_parens(pattern, precedence::COMPARISON), &mut p);
                if let Some(escape) = escape {
                    p.text(&format!(" {} ", fmt.kw("ESCAPE")));
                    kids.child(right_needs_parens(escape, precedence::COMPARISON), &mut p);
                }
            }
            Expr::Is {
                expr,
                negated,
                test,
            } => {
                let mut kids = self.children(1);
                kids.child(expr.precedence() < precedence::COMPARISON, &mut p);
                let word = match test {
                    IsTest::Null => "NULL",
                    IsTest::True => "TRUE",
                    IsTest::False => "FALSE",
                    IsTest::Unknown => "UNKNOWN",
                };
                p.text(&format!(" {} {}{}", fmt.kw("IS"), fmt.not(*negated), fmt.kw(word)));
            }
            Expr::Case {
                operand,
                branches,
                else_result,
            } => {
                let count = usize::from(operand.is_some()) + 2 * branches.len() + usize::from(else_result.is_some());
                let mut kids = self.children(count);
                p.text(&fmt.kw("CASE"));
                if operand.is_some() {
                    p.text(" ");
                    p.append(kids.next());
                }
                for _ in branches {
                    p.text(&format!(" {} ", fmt.kw("WHEN")));
                    p.append(kids.next());
                    p.text(&format!(" {} ", fmt.kw("THEN")));
                    p.append(kids.next());
                }
                if else_result.is_some() {
                    p.text(&format!(" {} ", fmt.kw("ELSE")));
                    p.append(kids.next());
                }
                p.text(&format!(" {}", fmt.kw("END")));
            }
            Expr::Cast {
                expr,
                data_type,
                style,
            } => {
                let mut kids = self.children(1);
                match style {
                    CastStyle::Function => {
                        p.text(&format!("{}(", fmt.kw("CAST")));
                        p.append(kids.next());
                        p.text(&format!(" {} {})", fmt.kw("AS"), fmt.data_type(data_type)));
                    }
                    CastStyle::DoubleColon => {
                        kids.child(expr.precedence() < precedence::CAST, &mut p);
                        p.text(&format!("::{}", fmt.data_type(data_type)));
                    }
                }
            }
            Expr::Quantified {
                quantifier,
                subject,
            } => {
                let mut kids = self.children(1);
                let word = match quantifier {
                    Quantifier::Any => "ANY",
                    Quantifier::Some => "SOME",
                    Quantifier::All => "ALL",
                };
                p.text(&format!("{} ", fmt.kw(word)));
                // a subquery subject brings its own parentheses
                kids.child(!matches!(subject.as_ref(), Expr::Subquery(_)), &mut p);
            }
            Expr::Nested(_) => {
                let mut kids = self.children(1);
                kids.child(true, &mut p);
            }
            Expr::Tuple(items) => {
                let mut kids = self.children(items.len());
                p.text("(");
                kids.list(items.len(), &mut p);
                p.text(")");
            }
        }
        p
    }
}

impl<'q> Visitor<'q> for ExprRenderer<'_, '_, 'q> {
    fn pre_visit(&mut self, node: Node<'q>) {
        if let Node::Query(_) = node {
            self.in_query += 1;
        }
    }

    fn post_visit(&mut self, node: Node<'q>) {
        match node {
            Node::Query(_) => self.in_query -= 1,
            _ if self.in_query > 0 => {}
            Node::Expr(e) => {
                let rendered = self.expr(e);
                self.stack.push(rendered);
            }
            Node::Function(call) => {
                let rendered = self.function(call);
                self.stack.push(rendered);
            }
            _ => {}
        }
    }
}

/// Popped child renderings, consumed in visit order.
struct Children<'q>(std::vec::IntoIter<Pieces<'q>>);

impl<'q> Children<'q> {
    fn next(&mut self) -> Pieces<'q> {
        self.0.next().unwrap_or_else(Pieces::new)
    }

    fn child(&mut self, parens: bool, p: &mut Pieces<'q>) {
        let rendered = self.next();
        if parens {
            p.text("(");
            p.append(rendered);
            p.text(")");
        } else {
            p.append(rendered);
        }
    }

    fn list(&mut self, n: usize, p: &mut Pieces<'q>) {
        for i in 0..n {
            if i > 0 {
                p.text(", ");
            }
            p.append(self.next());
        }
    }
}
