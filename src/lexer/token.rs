use std::hash::{Hash, Hasher};
use std::ops::Range;

use serde::Serialize;

/// Half-open byte range into the original source.
///
/// Spans never take part in equality or hashing: two trees parsed from
/// differently laid out text compare equal when their structure does.
/// Use [`Span::range`] to compare positions.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Smallest span covering both.
    pub fn merge(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl PartialEq for Span {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for Span {}

impl Hash for Span {
    fn hash<H: Hasher>(&self, _state: &mut H) {}
}

/// Token discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// A word reserved by the active dialect.
    Keyword,
    /// Bare or quoted identifier. Non-reserved keywords (ROWS, FIRST, ...) lex as identifiers.
    Identifier { quoted: bool },
    StringLiteral,
    NumericLiteral,
    /// `?`, `?1`, `:name`, `$1`, `@name`.
    Parameter,
    Operator,
    Punctuation,
    Comment,
    Whitespace,
}

/// A single token. Borrowed from the source; the token stream is dropped once the AST exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Span,
    /// 1-based line at the start of the token.
    pub line: usize,
    /// 1-based column (in characters) at the start of the token.
    pub column: usize,
}

impl<'a> Token<'a> {
    /// Whitespace and comments: kept for round trips, skipped by the grammar.
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment)
    }

    /// Case-insensitive match of a keyword or an unquoted identifier.
    pub fn is_word(&self, word: &str) -> bool {
        matches!(
            self.kind,
            TokenKind::Keyword | TokenKind::Identifier { quoted: false }
        ) && self.text.eq_ignore_ascii_case(word)
    }

    pub fn is_punct(&self, p: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.text == p
    }

    pub fn is_op(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }

    /// Position just past this token.
    pub fn end_position(&self) -> (usize, usize) {
        let mut line = self.line;
        let mut column = self.column;
        for c in self.text.chars() {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        (line, column)
    }
}
