//! Scalar expressions.
//!
//! Expressions carry no spans of their own; positions are tracked on the
//! enclosing clause and statement nodes.

use serde::Serialize;

use super::{Ident, ObjectName, OrderByItem, Query};

/// Binding levels shared by the parser and the formatter's parenthesizer.
///
/// Ordered lowest to highest: OR, AND, NOT, comparison and predicates,
/// bitwise, additive, multiplicative, unary sign, concatenation and JSON
/// arrows, `::` casts, then atoms.
pub mod precedence {
    pub const OR: u8 = 1;
    pub const AND: u8 = 2;
    pub const NOT: u8 = 3;
    pub const COMPARISON: u8 = 4;
    pub const BITWISE: u8 = 5;
    pub const ADDITIVE: u8 = 6;
    pub const MULTIPLICATIVE: u8 = 7;
    pub const UNARY: u8 = 8;
    pub const CONCAT: u8 = 9;
    pub const CAST: u8 = 10;
    pub const ATOM: u8 = 11;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Expr {
    Column(ColumnRef),
    Literal(Literal),
    /// Placeholder text as written: `?`, `?1`, `:name`, `$1`, `@name`.
    Parameter { text: String },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Function(FunctionCall),
    /// Scalar subquery in parentheses.
    Subquery(Box<Query>),
    Exists {
        negated: bool,
        subquery: Box<Query>,
    },
    InList {
        expr: Box<Expr>,
        negated: bool,
        list: Vec<Expr>,
    },
    InSubquery {
        expr: Box<Expr>,
        negated: bool,
        subquery: Box<Query>,
    },
    Between {
        expr: Box<Expr>,
        negated: bool,
        low: Box<Expr>,
        high: Box<Expr>,
    },
    Like {
        expr: Box<Expr>,
        negated: bool,
        op: LikeOp,
        pattern: Box<Expr>,
        escape: Option<Box<Expr>>,
    },
    Is {
        expr: Box<Expr>,
        negated: bool,
        test: IsTest,
    },
    Case {
        operand: Option<Box<Expr>>,
        branches: Vec<WhenThen>,
        else_result: Option<Box<Expr>>,
    },
    Cast {
        expr: Box<Expr>,
        data_type: DataType,
        style: CastStyle,
    },
    /// `DATE '2024-01-01'`, `TIMESTAMP '...'`, `INTERVAL '1 day'`.
    TypedString { data_type: DataType, value: SqlString },
    /// `ANY (...)`, `ALL (...)`, `SOME (...)` on the right of a comparison.
    Quantified {
        quantifier: Quantifier,
        subject: Box<Expr>,
    },
    /// Parenthesized expression.
    Nested(Box<Expr>),
    /// Row value `(a, b, ...)` with at least two elements.
    Tuple(Vec<Expr>),
}

impl Expr {
    pub fn column(name: impl Into<String>) -> Self {
        Expr::Column(ColumnRef {
            parts: vec![Ident::new(name)],
        })
    }

    pub fn number(text: impl Into<String>) -> Self {
        Expr::Literal(Literal::Number(text.into()))
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Binding level of the outermost operator, see [`precedence`].
    pub fn precedence(&self) -> u8 {
        match self {
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Unary { op: UnaryOp::Not, .. } => precedence::NOT,
            Expr::Unary { .. } => precedence::UNARY,
            Expr::InList { .. }
            | Expr::InSubquery { .. }
            | Expr::Between { .. }
            | Expr::Like { .. }
            | Expr::Is { .. } => precedence::COMPARISON,
            Expr::Cast {
                style: CastStyle::DoubleColon,
                ..
            } => precedence::CAST,
            _ => precedence::ATOM,
        }
    }
}

/// Possibly qualified column: `c`, `t.c`, `s.t.c`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRef {
    pub parts: Vec<Ident>,
}

impl ColumnRef {
    pub fn name(&self) -> &str {
        self.parts.last().map(|i| i.value.as_str()).unwrap_or_default()
    }

    /// Everything before the column name, e.g. the table alias.
    pub fn qualifier(&self) -> &[Ident] {
        match self.parts.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    /// Numeric text as written (`1`, `2.50`, `6e-3`, `0xFF`).
    Number(String),
    String(SqlString),
    Boolean(bool),
    Null,
}

/// A string literal kept exactly as written, prefix and quotes included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SqlString {
    pub raw: String,
}

impl SqlString {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Build a plain single-quoted literal from unescaped text.
    pub fn from_value(value: &str) -> Self {
        Self {
            raw: format!("'{}'", value.replace('\'', "''")),
        }
    }

    /// `N`, `E`, `X` or `B` prefix, if any.
    pub fn prefix(&self) -> Option<char> {
        let first = self.raw.chars().next()?;
        first.is_ascii_alphabetic().then_some(first)
    }

    /// Contents with delimiters stripped and doubled quotes collapsed.
    pub fn value(&self) -> String {
        let body = match self.prefix() {
            Some(_) => &self.raw[1..],
            None => self.raw.as_str(),
        };
        if let Some(rest) = body.strip_prefix('$') {
            // $tag$ ... $tag$
            return match rest.find('$') {
                Some(i) => {
                    let delim_len = i + 2;
                    body.get(delim_len..body.len().saturating_sub(delim_len))
                        .unwrap_or_default()
                        .to_string()
                }
                None => String::new(),
            };
        }
        let mut chars = body.chars();
        let Some(quote) = chars.next() else {
            return String::new();
        };
        let inner = &body[quote.len_utf8()..body.len().saturating_sub(quote.len_utf8())];
        let doubled: String = [quote, quote].iter().collect();
        inner.replace(&doubled, &quote.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Not,
    Minus,
    Plus,
    BitNot,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Not => "NOT",
            UnaryOp::Minus => "-",
            UnaryOp::Plus => "+",
            UnaryOp::BitNot => "~",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    /// Written `<>` or `!=`; always printed as `<>`.
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    BitAnd,
    BitOr,
    BitXor,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Concat,
    /// `->`
    JsonGet,
    /// `->>`
    JsonGetText,
}

impl BinaryOp {
    pub fn precedence(self) -> u8 {
        use BinaryOp::*;
        match self {
            Or => precedence::OR,
            And => precedence::AND,
            Eq | NotEq | Lt | LtEq | Gt | GtEq => precedence::COMPARISON,
            BitAnd | BitOr | BitXor => precedence::BITWISE,
            Plus | Minus => precedence::ADDITIVE,
            Multiply | Divide | Modulo => precedence::MULTIPLICATIVE,
            Concat | JsonGet | JsonGetText => precedence::CONCAT,
        }
    }

    pub fn as_str(self) -> &'static str {
        use BinaryOp::*;
        match self {
            Or => "OR",
            And => "AND",
            Eq => "=",
            NotEq => "<>",
            Lt => "<",
            LtEq => "<=",
            Gt => ">",
            GtEq => ">=",
            BitAnd => "&",
            BitOr => "|",
            BitXor => "^",
            Plus => "+",
            Minus => "-",
            Multiply => "*",
            Divide => "/",
            Modulo => "%",
            Concat => "||",
            JsonGet => "->",
            JsonGetText => "->>",
        }
    }

    /// AND and OR are keywords and take keyword casing.
    pub fn is_keyword(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn from_operator(text: &str) -> Option<Self> {
        use BinaryOp::*;
        Some(match text {
            "=" => Eq,
            "<>" | "!=" => NotEq,
            "<" => Lt,
            "<=" => LtEq,
            ">" => Gt,
            ">=" => GtEq,
            "&" => BitAnd,
            "|" => BitOr,
            "^" => BitXor,
            "+" => Plus,
            "-" => Minus,
            "*" => Multiply,
            "/" => Divide,
            "%" => Modulo,
            "||" => Concat,
            "->" => JsonGet,
            "->>" => JsonGetText,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeOp {
    Like,
    ILike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IsTest {
    Null,
    True,
    False,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantifier {
    Any,
    Some,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CastStyle {
    /// `CAST(x AS t)`
    Function,
    /// `x::t`
    DoubleColon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhenThen {
    pub condition: Expr,
    pub result: Expr,
}

/// Words of built-in type names. These are case-insensitive and take
/// keyword casing when printed.
const BUILTIN_TYPE_WORDS: &[&str] = &[
    "BIGINT", "BIGSERIAL", "BINARY", "BIT", "BLOB", "BOOL", "BOOLEAN", "BYTEA", "CHAR",
    "CHARACTER", "CLOB", "DATE", "DATETIME", "DEC", "DECIMAL", "DOUBLE", "FLOAT", "INT",
    "INTEGER", "INTERVAL", "JSON", "JSONB", "MONEY", "NCHAR", "NUMBER", "NUMERIC", "NVARCHAR",
    "PRECISION", "REAL", "SERIAL", "SMALLINT", "STRING", "TEXT", "TIME", "TIMESTAMP",
    "TIMESTAMPTZ", "TINYINT", "UUID", "VARBINARY", "VARCHAR", "VARCHAR2", "VARYING", "XML",
];

/// A type name as written. Multi-word names (`DOUBLE PRECISION`) are joined
/// by single spaces; arguments keep their token text (`10`, `2`, `1M`).
///
/// Built-in names compare case-insensitively (`varchar` == `VARCHAR`);
/// user-defined names compare as written.
#[derive(Debug, Clone, Eq, Serialize)]
pub struct DataType {
    pub name: String,
    pub args: Vec<String>,
    /// `Some(true)` for `WITH TIME ZONE`, `Some(false)` for `WITHOUT TIME ZONE`.
    pub time_zone: Option<bool>,
    /// Number of `[]` suffixes.
    pub array_dims: usize,
}

impl DataType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            time_zone: None,
            array_dims: 0,
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Every word of the name is a built-in type word.
    pub fn is_builtin(&self) -> bool {
        self.name
            .split(' ')
            .all(|word| BUILTIN_TYPE_WORDS.iter().any(|b| b.eq_ignore_ascii_case(word)))
    }
}

impl PartialEq for DataType {
    fn eq(&self, other: &Self) -> bool {
        let same_name = if self.is_builtin() && other.is_builtin() {
            self.name.eq_ignore_ascii_case(&other.name)
        } else {
            self.name == other.name
        };
        same_name
            && self.args == other.args
            && self.time_zone == other.time_zone
            && self.array_dims == other.array_dims
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionCall {
    pub name: ObjectName,
    pub args: FunctionArgs,
    pub distinct: bool,
    /// `FILTER (WHERE ...)`
    pub filter: Option<Box<Expr>>,
    pub over: Option<WindowSpec>,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self {
            name: ObjectName::simple(name),
            args: FunctionArgs::List(args),
            distinct: false,
            filter: None,
            over: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionArgs {
    /// `count(*)`
    Star,
    List(Vec<Expr>),
}

/// `OVER (PARTITION BY ... ORDER BY ...)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowSpec {
    pub partition_by: Vec<Expr>,
    pub order_by: Vec<OrderByItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_type_names_ignore_case() {
        assert_eq!(DataType::new("varchar"), DataType::new("VARCHAR"));
        assert_eq!(DataType::new("double precision"), DataType::new("DOUBLE PRECISION"));
        assert_ne!(DataType::new("my_type"), DataType::new("MY_TYPE"));
        assert_ne!(DataType::new("int"), DataType::new("bigint"));
    }

    #[test]
    fn test_string_values() {
        assert_eq!(SqlString::new("'it''s'").value(), "it's");
        assert_eq!(SqlString::new("N'abc'").value(), "abc");
        assert_eq!(SqlString::new("N'abc'").prefix(), Some('N'));
        assert_eq!(SqlString::new("$$body$$").value(), "body");
        assert_eq!(SqlString::new("$fn$x$fn$").value(), "x");
        assert_eq!(SqlString::from_value("it's").raw, "'it''s'");
    }

    #[test]
    fn test_operator_levels() {
        assert!(BinaryOp::Or.precedence() < BinaryOp::And.precedence());
        assert!(BinaryOp::And.precedence() < precedence::NOT);
        assert!(precedence::NOT < BinaryOp::Eq.precedence());
        assert!(BinaryOp::Plus.precedence() < BinaryOp::Multiply.precedence());
        assert!(BinaryOp::Multiply.precedence() < precedence::UNARY);
        assert!(precedence::UNARY < BinaryOp::Concat.precedence());
        assert_eq!(BinaryOp::from_operator("!="), Some(BinaryOp::NotEq));
        assert_eq!(BinaryOp::NotEq.as_str(), "<>");
    }

    #[test]
    fn test_column_ref_parts() {
        let col = ColumnRef {
            parts: vec![Ident::new("t"), Ident::new("id")],
        };
        assert_eq!(col.name(), "id");
        assert_eq!(col.qualifier(), &[Ident::new("t")]);
    }
}
