//! SQL abstract syntax tree.
//!
//! Pure data. Each node owns its children; nodes that correspond to a source
//! region carry a [`Span`], which is ignored by equality. Traversal lives in
//! [`visit`].

pub mod ddl;
pub mod expr;
pub mod query;
pub mod visit;

pub use ddl::*;
pub use expr::*;
pub use query::*;
pub use visit::{Node, Visit, VisitMut, Visitor, VisitorMut};

use std::fmt;

use serde::Serialize;

pub use crate::lexer::Span;

/// An identifier, optionally quoted. `value` is unescaped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Ident {
    pub value: String,
    /// Opening quote character, if the identifier was quoted.
    pub quote: Option<char>,
}

impl Ident {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quote: None,
        }
    }

    pub fn quoted(value: impl Into<String>, quote: char) -> Self {
        Self {
            value: value.into(),
            quote: Some(quote),
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quote {
            None => f.write_str(&self.value),
            Some(open) => {
                let close = match open {
                    '[' => ']',
                    c => c,
                };
                let escaped = self.value.replace(close, &format!("{close}{close}"));
                write!(f, "{open}{escaped}{close}")
            }
        }
    }
}

/// Dotted name: `schema.table`, `t.column`, `pkg.fn`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectName(pub Vec<Ident>);

impl ObjectName {
    pub fn simple(name: impl Into<String>) -> Self {
        Self(vec![Ident::new(name)])
    }

    /// The last part, e.g. the table in `schema.table`.
    pub fn base(&self) -> &str {
        self.0.last().map(|i| i.value.as_str()).unwrap_or_default()
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}

/// One top-level statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Statement {
    Query(Box<Query>),
    Insert(Box<Insert>),
    Update(Box<Update>),
    Delete(Box<Delete>),
    CreateTable(Box<CreateTable>),
    CreateView(Box<CreateView>),
    Drop(DropStatement),
    Truncate(Truncate),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Query(q) => q.span,
            Statement::Insert(i) => i.span,
            Statement::Update(u) => u.span,
            Statement::Delete(d) => d.span,
            Statement::CreateTable(c) => c.span,
            Statement::CreateView(c) => c.span,
            Statement::Drop(d) => d.span,
            Statement::Truncate(t) => t.span,
        }
    }

    /// Verb used in diagnostics and column-usage reports.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Statement::Query(_) => "SELECT",
            Statement::Insert(_) => "INSERT",
            Statement::Update(_) => "UPDATE",
            Statement::Delete(_) => "DELETE",
            Statement::CreateTable(_) => "CREATE TABLE",
            Statement::CreateView(_) => "CREATE VIEW",
            Statement::Drop(_) => "DROP",
            Statement::Truncate(_) => "TRUNCATE",
        }
    }
}

/// Top-level clause a comment is re-emitted in front of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseKind {
    With,
    Select,
    From,
    Where,
    GroupBy,
    Having,
    SetOperator,
    OrderBy,
    Limit,
    Insert,
    Values,
    Update,
    Set,
    Delete,
    Using,
    Returning,
    Create,
    Drop,
    Truncate,
}

/// Where a comment goes when the statement is formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "at", rename_all = "snake_case")]
pub enum CommentAnchor {
    /// Before the `ordinal`-th clause of `kind` in the outermost statement.
    Clause { kind: ClauseKind, ordinal: usize },
    /// After the statement's last clause.
    Dangling,
}

/// A source comment, text verbatim including its delimiters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub text: String,
    pub span: Span,
    pub anchor: CommentAnchor,
}

impl Comment {
    /// `-- ...` and `# ...` run to end of line.
    pub fn is_line_comment(&self) -> bool {
        !self.text.starts_with("/*")
    }
}

/// A statement plus the comments anchored to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedStatement {
    pub statement: Statement,
    pub comments: Vec<Comment>,
}

/// The result of parsing a `;`-separated script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Script {
    pub statements: Vec<ParsedStatement>,
    /// Whether the last statement was followed by `;`.
    pub trailing_semicolon: bool,
    /// Comments after the final `;`.
    pub trailing_comments: Vec<Comment>,
    /// True when the first keyword of the source was written in lowercase.
    pub lowercase_keywords: bool,
}

impl Script {
    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter().map(|p| &p.statement)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Statement> {
        self.statements.iter_mut().map(|p| &mut p.statement)
    }
}
