//! Error types for the SQL pipeline.
//!
//! Three kinds are visible to callers: [`LexError`] for malformed token-level
//! input, [`ParseError`] when the tokens match no production, and
//! [`ConfigError`] for bad dialect names or style options. All three are
//! terminal for the call that raised them.

use thiserror::Error;

use crate::lexer::Token;

/// Malformed token-level input: unterminated literal or comment, stray character.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Lex error at line {line}, column {column}: {message}")]
pub struct LexError {
    pub message: String,
    /// 1-based line of the offending character.
    pub line: usize,
    /// 1-based column (in characters) of the offending character.
    pub column: usize,
    /// Byte offset into the source.
    pub offset: usize,
    /// The offending text (a single character, or the opening delimiter).
    pub text: String,
}

/// The token sequence does not match any grammar production.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    /// Text of the failing token, empty at end of input.
    pub token: String,
}

/// Unknown dialect or invalid formatting option.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Configuration error: {message}")]
pub struct ConfigError {
    pub message: String,
}

impl LexError {
    pub(crate) fn new(
        message: impl Into<String>,
        text: impl Into<String>,
        offset: usize,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            message: message.into(),
            line,
            column,
            offset,
            text: text.into(),
        }
    }
}

impl ParseError {
    /// Error anchored at `token`.
    pub(crate) fn at(message: impl Into<String>, token: &Token<'_>) -> Self {
        Self {
            message: message.into(),
            line: token.line,
            column: token.column,
            offset: token.span.start,
            token: token.text.to_string(),
        }
    }

    /// Error anchored just past the last token of the input.
    pub(crate) fn at_end(message: impl Into<String>, offset: usize, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
            offset,
            token: String::new(),
        }
    }
}

impl ConfigError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The crate-wide error type.
#[derive(Debug, Error)]
pub enum SqlError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Failed to read a config or source file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for [`crate::config::Config`].
    #[error("Invalid config file: {0}")]
    ConfigFile(#[from] toml::de::Error),

    /// A function-name glob or host-file pattern failed to compile.
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl SqlError {
    /// 1-based (line, column) for errors that point into SQL text.
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            Self::Lex(e) => Some((e.line, e.column)),
            Self::Parse(e) => Some((e.line, e.column)),
            _ => None,
        }
    }
}

/// Result type alias for pipeline operations.
pub type SqlResult<T> = Result<T, SqlError>;
