//! Schema statements: CREATE TABLE, CREATE VIEW, DROP, TRUNCATE.

use serde::Serialize;

use super::{DataType, Expr, Ident, ObjectName, Query, Span};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateTable {
    pub if_not_exists: bool,
    pub name: ObjectName,
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<TableConstraint>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    pub name: Ident,
    pub data_type: DataType,
    pub options: Vec<ColumnOptionDef>,
}

/// A column option with its optional `CONSTRAINT name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnOptionDef {
    pub name: Option<Ident>,
    pub option: ColumnOption,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnOption {
    Null,
    NotNull,
    PrimaryKey,
    Unique,
    Default(Expr),
    Check(Expr),
    References {
        table: ObjectName,
        columns: Vec<Ident>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableConstraint {
    pub name: Option<Ident>,
    pub kind: TableConstraintKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableConstraintKind {
    PrimaryKey(Vec<Ident>),
    Unique(Vec<Ident>),
    ForeignKey {
        columns: Vec<Ident>,
        foreign_table: ObjectName,
        referred_columns: Vec<Ident>,
    },
    Check(Expr),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateView {
    pub or_replace: bool,
    pub name: ObjectName,
    pub columns: Vec<Ident>,
    pub query: Box<Query>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropStatement {
    pub object_type: ObjectType,
    pub if_exists: bool,
    pub names: Vec<ObjectName>,
    pub behavior: Option<DropBehavior>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Table,
    View,
    Index,
    Function,
    Sequence,
    Schema,
}

impl ObjectType {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectType::Table => "TABLE",
            ObjectType::View => "VIEW",
            ObjectType::Index => "INDEX",
            ObjectType::Function => "FUNCTION",
            ObjectType::Sequence => "SEQUENCE",
            ObjectType::Schema => "SCHEMA",
        }
    }

    pub fn from_word(word: &str) -> Option<Self> {
        [
            ObjectType::Table,
            ObjectType::View,
            ObjectType::Index,
            ObjectType::Function,
            ObjectType::Sequence,
            ObjectType::Schema,
        ]
        .into_iter()
        .find(|t| t.as_str().eq_ignore_ascii_case(word))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropBehavior {
    Cascade,
    Restrict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Truncate {
    /// `TRUNCATE TABLE t` rather than `TRUNCATE t`.
    pub table_keyword: bool,
    pub names: Vec<ObjectName>,
    pub span: Span,
}
