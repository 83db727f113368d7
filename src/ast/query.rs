//! Queries and data-modification statements.

use serde::Serialize;

use super::{Expr, FunctionCall, Ident, ObjectName, Span};

/// `[WITH ...] body [ORDER BY ...] [LIMIT/FETCH ...]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    pub with: Option<With>,
    pub body: SetExpr,
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<RowLimit>,
    pub span: Span,
}

impl Query {
    /// The query's own SELECT when its body is a plain select.
    pub fn as_select(&self) -> Option<&Select> {
        match &self.body {
            SetExpr::Select(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct With {
    pub recursive: bool,
    pub ctes: Vec<Cte>,
    pub span: Span,
}

/// `name [(columns)] AS (query)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cte {
    pub name: Ident,
    pub columns: Vec<Ident>,
    pub query: Box<Query>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SetExpr {
    Select(Box<Select>),
    /// Parenthesized query used as a set operand.
    Query(Box<Query>),
    SetOperation(Box<SetOperation>),
    Values(Values),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetOperation {
    pub op: SetOperator,
    pub quantifier: SetQuantifier,
    pub left: SetExpr,
    pub right: SetExpr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetOperator {
    Union,
    Intersect,
    Except,
    /// Oracle and Db2 spelling of EXCEPT.
    Minus,
}

impl SetOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            SetOperator::Union => "UNION",
            SetOperator::Intersect => "INTERSECT",
            SetOperator::Except => "EXCEPT",
            SetOperator::Minus => "MINUS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetQuantifier {
    None,
    All,
    Distinct,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Select {
    pub distinct: Option<Distinct>,
    pub top: Option<Top>,
    /// Never empty.
    pub projection: Vec<SelectItem>,
    pub from: Vec<TableWithJoins>,
    pub selection: Option<Expr>,
    pub group_by: Vec<GroupByItem>,
    pub having: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Distinct {
    /// Explicit `SELECT ALL`.
    All,
    Distinct,
    On(Vec<Expr>),
}

/// T-SQL `TOP n [PERCENT]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Top {
    pub quantity: Expr,
    pub parenthesized: bool,
    pub percent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SelectItem {
    Expr {
        expr: Expr,
        alias: Option<Ident>,
        /// Alias written with `AS`.
        explicit_as: bool,
    },
    /// `*` or `t.*`.
    Wildcard { qualifier: Option<ObjectName> },
}

/// A relation plus the joins chained onto it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableWithJoins {
    pub relation: TableFactor,
    pub joins: Vec<Join>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TableFactor {
    Table {
        name: ObjectName,
        alias: Option<TableAlias>,
        span: Span,
    },
    Derived {
        lateral: bool,
        subquery: Box<Query>,
        alias: Option<TableAlias>,
        span: Span,
    },
    /// Table-valued function such as `generate_series(1, 10)`.
    Function {
        lateral: bool,
        call: FunctionCall,
        alias: Option<TableAlias>,
        span: Span,
    },
}

impl TableFactor {
    pub fn alias(&self) -> Option<&TableAlias> {
        match self {
            TableFactor::Table { alias, .. }
            | TableFactor::Derived { alias, .. }
            | TableFactor::Function { alias, .. } => alias.as_ref(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TableFactor::Table { span, .. }
            | TableFactor::Derived { span, .. }
            | TableFactor::Function { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableAlias {
    pub name: Ident,
    pub columns: Vec<Ident>,
    pub explicit_as: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Join {
    pub natural: bool,
    pub operator: JoinOperator,
    pub relation: TableFactor,
    pub constraint: JoinConstraint,
    pub span: Span,
}

/// Join keyword as written; `LEFT` and `LEFT OUTER` stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinOperator {
    Join,
    Inner,
    Left,
    LeftOuter,
    Right,
    RightOuter,
    Full,
    FullOuter,
    Cross,
}

impl JoinOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinOperator::Join => "JOIN",
            JoinOperator::Inner => "INNER JOIN",
            JoinOperator::Left => "LEFT JOIN",
            JoinOperator::LeftOuter => "LEFT OUTER JOIN",
            JoinOperator::Right => "RIGHT JOIN",
            JoinOperator::RightOuter => "RIGHT OUTER JOIN",
            JoinOperator::Full => "FULL JOIN",
            JoinOperator::FullOuter => "FULL OUTER JOIN",
            JoinOperator::Cross => "CROSS JOIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinConstraint {
    On(Expr),
    Using(Vec<Ident>),
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderByItem {
    pub expr: Expr,
    /// `Some(true)` for ASC, `Some(false)` for DESC.
    pub asc: Option<bool>,
    pub nulls_first: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupByItem {
    Expr(Expr),
    Rollup(Vec<Expr>),
    Cube(Vec<Expr>),
}

/// Row limiting, in whichever syntax it was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowLimit {
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
    pub style: LimitStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitStyle {
    /// `LIMIT n [OFFSET m]`
    LimitOffset,
    /// `[OFFSET m ROWS] FETCH FIRST n ROWS ONLY`
    FetchFirst,
}

/// `VALUES (..), (..)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Values {
    pub rows: Vec<Vec<Expr>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insert {
    pub table: ObjectName,
    pub columns: Vec<Ident>,
    pub source: InsertSource,
    pub returning: Vec<SelectItem>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertSource {
    /// `VALUES ...` or a query; VALUES is a query body.
    Query(Box<Query>),
    DefaultValues,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Update {
    pub table: ObjectName,
    pub alias: Option<TableAlias>,
    pub assignments: Vec<Assignment>,
    pub from: Vec<TableWithJoins>,
    pub selection: Option<Expr>,
    pub returning: Vec<SelectItem>,
    pub span: Span,
}

/// `target = value` in an UPDATE's SET list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub target: Vec<Ident>,
    pub value: Expr,
}

impl Assignment {
    pub fn column(&self) -> &str {
        self.target.last().map(|i| i.value.as_str()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delete {
    pub table: ObjectName,
    pub alias: Option<TableAlias>,
    pub using: Vec<TableWithJoins>,
    pub selection: Option<Expr>,
    pub returning: Vec<SelectItem>,
    pub span: Span,
}
