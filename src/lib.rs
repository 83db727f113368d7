//! # rewrite-sql
//!
//! Tokenize, parse, format and rewrite SQL, including SQL embedded in Java
//! and YAML sources.
//!
//! ```text
//! text → tokenize → parse → Script (AST) → format → text
//!                                 ↓
//!                     analyzer / transformer
//! ```
//!
//! ## Quick Example
//!
//! ```
//! use rewrite_sql::prelude::*;
//!
//! let sql = format_sql("select a,b from t where a=1", Dialect::Standard, &FormatStyle::default())?;
//! assert_eq!(sql, "SELECT a, b\nFROM t\nWHERE a = 1");
//! # Ok::<(), rewrite_sql::error::SqlError>(())
//! ```
//!
//! Every call is independent: there is no global state, so inputs can be
//! processed in parallel freely.

pub mod analyzer;
pub mod ast;
pub mod config;
pub mod dialect;
pub mod error;
pub mod fmt;
pub mod lexer;
pub mod parser;
pub mod transformer;

pub use fmt::{format_script, format_statement};
pub use lexer::tokenize;
pub use parser::{parse_script, parse_statement};

use config::FormatStyle;
use dialect::Dialect;
use error::SqlResult;
use parser::ParseOptions;

/// Parse a `;`-separated script in `dialect` with default limits.
pub fn parse(source: &str, dialect: Dialect) -> SqlResult<ast::Script> {
    parse_script(source, &ParseOptions::new(dialect))
}

/// Tokenize, parse and format in one call. The style is validated first.
pub fn format_sql(source: &str, dialect: Dialect, style: &FormatStyle) -> SqlResult<String> {
    style.validate()?;
    let script = parse(source, dialect)?;
    Ok(format_script(&script, style))
}

pub mod prelude {
    pub use crate::analyzer::{HostKind, SqlDetector, SqlLocator, columns_used, find_functions, locate};
    pub use crate::ast::*;
    pub use crate::config::{CommaStyle, Config, FormatStyle, KeywordCase};
    pub use crate::dialect::Dialect;
    pub use crate::error::*;
    pub use crate::parser::ParseOptions;
    pub use crate::transformer::{ChangeFunctionName, Db2ToPostgres, Rewrite, rewrite_sql};
    pub use crate::{format_script, format_sql, parse, parse_script, parse_statement, tokenize};
}
