//! Tree traversal shared by analysis, rewrites and the formatter.
//!
//! [`Visitor`] is read-only with pre- and post-order hooks. [`VisitorMut`]
//! runs post-order, so a hook sees children that were already rewritten and
//! may replace the node it is handed.

use super::*;

/// A borrowed node handed to [`Visitor`] hooks.
#[derive(Debug, Clone, Copy)]
pub enum Node<'ast> {
    Statement(&'ast Statement),
    Query(&'ast Query),
    Select(&'ast Select),
    TableFactor(&'ast TableFactor),
    Join(&'ast Join),
    Expr(&'ast Expr),
    /// Scalar or table-valued function call.
    Function(&'ast FunctionCall),
}

pub trait Visitor<'ast> {
    fn pre_visit(&mut self, _node: Node<'ast>) {}
    fn post_visit(&mut self, _node: Node<'ast>) {}
}

pub trait Visit {
    fn visit<'ast, V: Visitor<'ast>>(&'ast self, visitor: &mut V);
}

impl<T: Visit> Visit for Vec<T> {
    fn visit<'ast, V: Visitor<'ast>>(&'ast self, visitor: &mut V) {
        for item in self {
            item.visit(visitor);
        }
    }
}

impl<T: Visit> Visit for Option<T> {
    fn visit<'ast, V: Visitor<'ast>>(&'ast self, visitor: &mut V) {
        if let Some(item) = self {
            item.visit(visitor);
        }
    }
}

impl<T: Visit> Visit for Box<T> {
    fn visit<'ast, V: Visitor<'ast>>(&'ast self, visitor: &mut V) {
        (**self).visit(visitor);
    }
}

impl Visit for Script {
    fn visit<'ast, V: Visitor<'ast>>(&'ast self, visitor: &mut V) {
        for parsed in &self.statements {
            parsed.statement.visit(visitor);
        }
    }
}

impl Visit for Statement {
    fn visit<'ast, V: Visitor<'ast>>(&'ast self, visitor: &mut V) {
        visitor.pre_visit(Node::Statement(self));
        match self {
            Statement::Query(q) => q.visit(visitor),
            Statement::Insert(i) => {
                if let InsertSource::Query(q) = &i.source {
                    q.visit(visitor);
                }
                i.returning.visit(visitor);
            }
            Statement::Update(u) => {
                for a in &u.assignments {
                    a.value.visit(visitor);
                }
                u.from.visit(visitor);
                u.selection.visit(visitor);
                u.returning.visit(visitor);
            }
            Statement::Delete(d) => {
                d.using.visit(visitor);
                d.selection.visit(visitor);
                d.returning.visit(visitor);
            }
            Statement::CreateTable(c) => {
                for col in &c.columns {
                    for opt in &col.options {
                        match &opt.option {
                            ColumnOption::Default(e) | ColumnOption::Check(e) => e.visit(visitor),
                            _ => {}
                        }
                    }
                }
                for constraint in &c.constraints {
                    if let TableConstraintKind::Check(e) = &constraint.kind {
                        e.visit(visitor);
                    }
                }
            }
            Statement::CreateView(v) => v.query.visit(visitor),
            Statement::Drop(_) | Statement::Truncate(_) => {}
        }
        visitor.post_visit(Node::Statement(self));
    }
}

impl Visit for Query {
    fn visit<'ast, V: Visitor<'ast>>(&'ast self, visitor: &mut V) {
        visitor.pre_visit(Node::Query(self));
        if let Some(with) = &self.with {
            for cte in &with.ctes {
                cte.query.visit(visitor);
            }
        }
        self.body.visit(visitor);
        self.order_by.visit(visitor);
        if let Some(limit) = &self.limit {
            limit.limit.visit(visitor);
            limit.offset.visit(visitor);
        }
        visitor.post_visit(Node::Query(self));
    }
}

impl Visit for SetExpr {
    fn visit<'ast, V: Visitor<'ast>>(&'ast self, visitor: &mut V) {
        match self {
            SetExpr::Select(s) => s.visit(visitor),
            SetExpr::Query(q) => q.visit(visitor),
            SetExpr::SetOperation(op) => {
                op.left.visit(visitor);
                op.right.visit(visitor);
            }
            SetExpr::Values(values) => {
                for row in &values.rows {
                    row.visit(visitor);
                }
            }
        }
    }
}

impl Visit for Select {
    fn visit<'ast, V: Visitor<'ast>>(&'ast self, visitor: &mut V) {
        visitor.pre_visit(Node::Select(self));
        if let Some(Distinct::On(exprs)) = &self.distinct {
            exprs.visit(visitor);
        }
        if let Some(top) = &self.top {
            top.quantity.visit(visitor);
        }
        self.projection.visit(visitor);
        self.from.visit(visitor);
        self.selection.visit(visitor);
        for item in &self.group_by {
            match item {
                GroupByItem::Expr(e) => e.visit(visitor),
                GroupByItem::Rollup(exprs) | GroupByItem::Cube(exprs) => exprs.visit(visitor),
            }
        }
        self.having.visit(visitor);
        visitor.post_visit(Node::Select(self));
    }
}

impl Visit for SelectItem {
    fn visit<'ast, V: Visitor<'ast>>(&'ast self, visitor: &mut V) {
        if let SelectItem::Expr { expr, .. } = self {
            expr.visit(visitor);
        }
    }
}

impl Visit for OrderByItem {
    fn visit<'ast, V: Visitor<'ast>>(&'ast self, visitor: &mut V) {
        self.expr.visit(visitor);
    }
}

impl Visit for TableWithJoins {
    fn visit<'ast, V: Visitor<'ast>>(&'ast self, visitor: &mut V) {
        self.relation.visit(visitor);
        self.joins.visit(visitor);
    }
}

impl Visit for TableFactor {
    fn visit<'ast, V: Visitor<'ast>>(&'ast self, visitor: &mut V) {
        visitor.pre_visit(Node::TableFactor(self));
        match self {
            TableFactor::Table { .. } => {}
            TableFactor::Derived { subquery, .. } => subquery.visit(visitor),
            TableFactor::Function { call, .. } => call.visit(visitor),
        }
        visitor.post_visit(Node::TableFactor(self));
    }
}

impl Visit for Join {
    fn visit<'ast, V: Visitor<'ast>>(&'ast self, visitor: &mut V) {
        visitor.pre_visit(Node::Join(self));
        self.relation.visit(visitor);
        if let JoinConstraint::On(e) = &self.constraint {
            e.visit(visitor);
        }
        visitor.post_visit(Node::Join(self));
    }
}

impl Visit for FunctionCall {
    fn visit<'ast, V: Visitor<'ast>>(&'ast self, visitor: &mut V) {
        visitor.pre_visit(Node::Function(self));
        if let FunctionArgs::List(args) = &self.args {
            args.visit(visitor);
        }
        self.filter.visit(visitor);
        if let Some(over) = &self.over {
            over.partition_by.visit(visitor);
            over.order_by.visit(visitor);
        }
        visitor.post_visit(Node::Function(self));
    }
}

impl Visit for Expr {
    fn visit<'ast, V: Visitor<'ast>>(&'ast self, visitor: &mut V) {
        visitor.pre_visit(Node::Expr(self));
        match self {
            Expr::Column(_) | Expr::Literal(_) | Expr::Parameter { .. } | Expr::TypedString { .. } => {}
            Expr::Unary { expr, .. } | Expr::Nested(expr) => expr.visit(visitor),
            Expr::Cast { expr, .. } | Expr::Is { expr, .. } => expr.visit(visitor),
            Expr::Binary { left, right, .. } => {
                left.visit(visitor);
                right.visit(visitor);
            }
            Expr::Function(call) => call.visit(visitor),
            Expr::Subquery(q) | Expr::Exists { subquery: q, .. } => q.visit(visitor),
            Expr::InList { expr, list, .. } => {
                expr.visit(visitor);
                list.visit(visitor);
            }
            Expr::InSubquery { expr, subquery, .. } => {
                expr.visit(visitor);
                subquery.visit(visitor);
            }
            Expr::Between { expr, low, high, .. } => {
                expr.visit(visitor);
                low.visit(visitor);
                high.visit(visitor);
            }
            Expr::Like {
                expr,
                pattern,
                escape,
                ..
            } => {
                expr.visit(visitor);
                pattern.visit(visitor);
                escape.visit(visitor);
            }
            Expr::Case {
                operand,
                branches,
                else_result,
            } => {
                operand.visit(visitor);
                for branch in branches {
                    branch.condition.visit(visitor);
                    branch.result.visit(visitor);
                }
                else_result.visit(visitor);
            }
            Expr::Quantified { subject, .. } => subject.visit(visitor),
            Expr::Tuple(items) => items.visit(visitor),
        }
        visitor.post_visit(Node::Expr(self));
    }
}

/// Post-order rewriting hooks. Each defaults to a no-op.
pub trait VisitorMut {
    fn statement(&mut self, _statement: &mut Statement) {}
    fn query(&mut self, _query: &mut Query) {}
    fn set_operation(&mut self, _op: &mut SetOperation) {}
    fn select(&mut self, _select: &mut Select) {}
    fn expr(&mut self, _expr: &mut Expr) {}
    fn function(&mut self, _call: &mut FunctionCall) {}
    fn data_type(&mut self, _data_type: &mut DataType) {}
}

pub trait VisitMut {
    fn visit_mut<V: VisitorMut + ?Sized>(&mut self, visitor: &mut V);
}

impl<T: VisitMut> VisitMut for Vec<T> {
    fn visit_mut<V: VisitorMut + ?Sized>(&mut self, visitor: &mut V) {
        for item in self {
            item.visit_mut(visitor);
        }
    }
}

impl<T: VisitMut> VisitMut for Option<T> {
    fn visit_mut<V: VisitorMut + ?Sized>(&mut self, visitor: &mut V) {
        if let Some(item) = self {
            item.visit_mut(visitor);
        }
    }
}

impl<T: VisitMut> VisitMut for Box<T> {
    fn visit_mut<V: VisitorMut + ?Sized>(&mut self, visitor: &mut V) {
        (**self).visit_mut(visitor);
    }
}

impl VisitMut for Script {
    fn visit_mut<V: VisitorMut + ?Sized>(&mut self, visitor: &mut V) {
        for statement in self.iter_mut() {
            statement.visit_mut(visitor);
        }
    }
}

impl VisitMut for Statement {
    fn visit_mut<V: VisitorMut + ?Sized>(&mut self, visitor: &mut V) {
        match self {
            Statement::Query(q) => q.visit_mut(visitor),
            Statement::Insert(i) => {
                if let InsertSource::Query(q) = &mut i.source {
                    q.visit_mut(visitor);
                }
                i.returning.visit_mut(visitor);
            }
            Statement::Update(u) => {
                for a in &mut u.assignments {
                    a.value.visit_mut(visitor);
                }
                u.from.visit_mut(visitor);
                u.selection.visit_mut(visitor);
                u.returning.visit_mut(visitor);
            }
            Statement::Delete(d) => {
                d.using.visit_mut(visitor);
                d.selection.visit_mut(visitor);
                d.returning.visit_mut(visitor);
            }
            Statement::CreateTable(c) => {
                for col in &mut c.columns {
                    visitor.data_type(&mut col.data_type);
                    for opt in &mut col.options {
                        match &mut opt.option {
                            ColumnOption::Default(e) | ColumnOption::Check(e) => e.visit_mut(visitor),
                            _ => {}
                        }
                    }
                }
                for constraint in &mut c.constraints {
                    if let TableConstraintKind::Check(e) = &mut constraint.kind {
                        e.visit_mut(visitor);
                    }
                }
            }
            Statement::CreateView(v) => v.query.visit_mut(visitor),
            Statement::Drop(_) | Statement::Truncate(_) => {}
        }
        visitor.statement(self);
    }
}

impl VisitMut for Query {
    fn visit_mut<V: VisitorMut + ?Sized>(&mut self, visitor: &mut V) {
        if let Some(with) = &mut self.with {
            for cte in &mut with.ctes {
                cte.query.visit_mut(visitor);
            }
        }
        self.body.visit_mut(visitor);
        for item in &mut self.order_by {
            item.expr.visit_mut(visitor);
        }
        if let Some(limit) = &mut self.limit {
            limit.limit.visit_mut(visitor);
            limit.offset.visit_mut(visitor);
        }
        visitor.query(self);
    }
}

impl VisitMut for SetExpr {
    fn visit_mut<V: VisitorMut + ?Sized>(&mut self, visitor: &mut V) {
        match self {
            SetExpr::Select(s) => s.visit_mut(visitor),
            SetExpr::Query(q) => q.visit_mut(visitor),
            SetExpr::SetOperation(op) => {
                op.left.visit_mut(visitor);
                op.right.visit_mut(visitor);
                visitor.set_operation(op);
            }
            SetExpr::Values(values) => {
                for row in &mut values.rows {
                    row.visit_mut(visitor);
                }
            }
        }
    }
}

impl VisitMut for Select {
    fn visit_mut<V: VisitorMut + ?Sized>(&mut self, visitor: &mut V) {
        if let Some(Distinct::On(exprs)) = &mut self.distinct {
            exprs.visit_mut(visitor);
        }
        if let Some(top) = &mut self.top {
            top.quantity.visit_mut(visitor);
        }
        self.projection.visit_mut(visitor);
        self.from.visit_mut(visitor);
        self.selection.visit_mut(visitor);
        for item in &mut self.group_by {
            match item {
                GroupByItem::Expr(e) => e.visit_mut(visitor),
                GroupByItem::Rollup(exprs) | GroupByItem::Cube(exprs) => exprs.visit_mut(visitor),
            }
        }
        self.having.visit_mut(visitor);
        visitor.select(self);
    }
}

impl VisitMut for SelectItem {
    fn visit_mut<V: VisitorMut + ?Sized>(&mut self, visitor: &mut V) {
        if let SelectItem::Expr { expr, .. } = self {
            expr.visit_mut(visitor);
        }
    }
}

impl VisitMut for TableWithJoins {
    fn visit_mut<V: VisitorMut + ?Sized>(&mut self, visitor: &mut V) {
        self.relation.visit_mut(visitor);
        for join in &mut self.joins {
            join.relation.visit_mut(visitor);
            if let JoinConstraint::On(e) = &mut join.constraint {
                e.visit_mut(visitor);
            }
        }
    }
}

impl VisitMut for TableFactor {
    fn visit_mut<V: VisitorMut + ?Sized>(&mut self, visitor: &mut V) {
        match self {
            TableFactor::Table { .. } => {}
            TableFactor::Derived { subquery, .. } => subquery.visit_mut(visitor),
            TableFactor::Function { call, .. } => call.visit_mut(visitor),
        }
    }
}

impl VisitMut for FunctionCall {
    fn visit_mut<V: VisitorMut + ?Sized>(&mut self, visitor: &mut V) {
        if let FunctionArgs::List(args) = &mut self.args {
            args.visit_mut(visitor);
        }
        self.filter.visit_mut(visitor);
        if let Some(over) = &mut self.over {
            over.partition_by.visit_mut(visitor);
            for item in &mut over.order_by {
                item.expr.visit_mut(visitor);
            }
        }
        visitor.function(self);
    }
}

impl VisitMut for Expr {
    fn visit_mut<V: VisitorMut + ?Sized>(&mut self, visitor: &mut V) {
        match self {
            Expr::Column(_) | Expr::Literal(_) | Expr::Parameter { .. } => {}
            Expr::TypedString { data_type, .. } => visitor.data_type(data_type),
            Expr::Cast { expr, data_type, .. } => {
                expr.visit_mut(visitor);
                visitor.data_type(data_type);
            }
            Expr::Unary { expr, .. } | Expr::Nested(expr) | Expr::Is { expr, .. } => {
                expr.visit_mut(visitor)
            }
            Expr::Binary { left, right, .. } => {
                left.visit_mut(visitor);
                right.visit_mut(visitor);
            }
            Expr::Function(call) => call.visit_mut(visitor),
            Expr::Subquery(q) | Expr::Exists { subquery: q, .. } => q.visit_mut(visitor),
            Expr::InList { expr, list, .. } => {
                expr.visit_mut(visitor);
                list.visit_mut(visitor);
            }
            Expr::InSubquery { expr, subquery, .. } => {
                expr.visit_mut(visitor);
                subquery.visit_mut(visitor);
            }
            Expr::Between { expr, low, high, .. } => {
                expr.visit_mut(visitor);
                low.visit_mut(visitor);
                high.visit_mut(visitor);
            }
            Expr::Like {
                expr,
                pattern,
                escape,
                ..
            } => {
                expr.visit_mut(visitor);
                pattern.visit_mut(visitor);
                escape.visit_mut(visitor);
            }
            Expr::Case {
                operand,
                branches,
                else_result,
            } => {
                operand.visit_mut(visitor);
                for branch in branches {
                    branch.condition.visit_mut(visitor);
                    branch.result.visit_mut(visitor);
                }
                else_result.visit_mut(visitor);
            }
            Expr::Quantified { subject, .. } => subject.visit_mut(visitor),
            Expr::Tuple(items) => items.visit_mut(visitor),
        }
        visitor.expr(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Columns<'ast>(Vec<&'ast str>);

    impl<'ast> Visitor<'ast> for Columns<'ast> {
        fn pre_visit(&mut self, node: Node<'ast>) {
            if let Node::Expr(Expr::Column(c)) = node {
                self.0.push(c.name());
            }
        }
    }

    struct Order(Vec<&'static str>);

    impl<'ast> Visitor<'ast> for Order {
        fn pre_visit(&mut self, node: Node<'ast>) {
            if let Node::Expr(Expr::Binary { .. }) = node {
                self.0.push("pre");
            }
        }
        fn post_visit(&mut self, node: Node<'ast>) {
            if let Node::Expr(Expr::Column(_)) = node {
                self.0.push("leaf");
            } else if let Node::Expr(Expr::Binary { .. }) = node {
                self.0.push("post");
            }
        }
    }

    fn a_plus_b() -> Expr {
        Expr::binary(Expr::column("a"), BinaryOp::Plus, Expr::column("b"))
    }

    #[test]
    fn test_visitor_collects_borrowed_nodes() {
        let expr = a_plus_b();
        let mut v = Columns(Vec::new());
        expr.visit(&mut v);
        assert_eq!(v.0, vec!["a", "b"]);
    }

    #[test]
    fn test_pre_and_post_order() {
        let expr = a_plus_b();
        let mut v = Order(Vec::new());
        expr.visit(&mut v);
        assert_eq!(v.0, vec!["pre", "leaf", "leaf", "post"]);
    }

    struct Upper;

    impl VisitorMut for Upper {
        fn expr(&mut self, expr: &mut Expr) {
            if let Expr::Column(c) = expr {
                for part in &mut c.parts {
                    part.value = part.value.to_uppercase();
                }
            }
        }
    }

    #[test]
    fn test_visitor_mut_rewrites_in_place() {
        let mut expr = a_plus_b();
        expr.visit_mut(&mut Upper);
        assert_eq!(
            expr,
            Expr::binary(Expr::column("A"), BinaryOp::Plus, Expr::column("B"))
        );
    }
}
