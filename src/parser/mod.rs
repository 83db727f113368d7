//! Recursive-descent SQL parser.
//!
//! Statements, clauses and DDL are plain recursive descent; expressions use
//! binding-power (Pratt) parsing. There is no error recovery: the first
//! token that fits no production aborts the parse with a [`ParseError`]
//! pointing at it.
//!
//! ```text
//! source --tokenize--> tokens --Parser--> Script { statements, comments }
//! ```

pub mod grammar;

#[cfg(test)]
mod tests;

use crate::ast::*;
use crate::dialect::{Dialect, DialectProfile, Production};
use crate::error::{ParseError, SqlResult};
use crate::lexer::{self, Token, TokenKind};

/// Nesting limit used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 200;

/// Per-call parser settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub dialect: Dialect,
    /// Deepest allowed nesting of expressions and subqueries.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::Standard,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Tokenize and parse a `;`-separated script.
pub fn parse_script(source: &str, options: &ParseOptions) -> SqlResult<Script> {
    let tokens = lexer::tokenize(source, options.dialect)?;
    let script = parse_tokens(tokens, options)?;
    tracing::debug!(
        statements = script.statements.len(),
        dialect = %options.dialect,
        "parsed script"
    );
    Ok(script)
}

/// Parse exactly one statement; a trailing `;` is allowed.
pub fn parse_statement(source: &str, options: &ParseOptions) -> SqlResult<Statement> {
    let tokens = lexer::tokenize(source, options.dialect)?;
    let mut parser = Parser::new(tokens, options);
    if parser.at_eof() {
        return Err(parser.error_here("no statement found").into());
    }
    let statement = parser.parse_statement()?;
    parser.eat_punct(";");
    if !parser.at_eof() {
        return Err(parser.expected("end of input").into());
    }
    Ok(statement)
}

/// Parse an already tokenized script. Trivia tokens may be included.
pub fn parse_tokens(tokens: Vec<Token<'_>>, options: &ParseOptions) -> Result<Script, ParseError> {
    Parser::new(tokens, options).parse_script()
}

/// Start of a top-level clause, used to anchor comments.
#[derive(Debug, Clone, Copy)]
struct ClauseMarker {
    kind: ClauseKind,
    offset: usize,
}

/// Token cursor plus the state the grammar needs across productions.
pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    comments: Vec<Token<'a>>,
    pos: usize,
    profile: &'static DialectProfile,
    max_depth: usize,
    depth: usize,
    /// 0 while inside the outermost statement's own clauses.
    query_depth: usize,
    markers: Vec<ClauseMarker>,
    /// End offset of the last consumed token.
    prev_end: usize,
    /// Position just past the final token, for end-of-input errors.
    eof: (usize, usize, usize),
    lowercase_keywords: bool,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token<'a>>, options: &ParseOptions) -> Self {
        let eof = tokens
            .last()
            .map(|t| {
                let (line, column) = t.end_position();
                (t.span.end, line, column)
            })
            .unwrap_or((0, 1, 1));
        let lowercase_keywords = tokens
            .iter()
            .find(|t| t.kind == TokenKind::Keyword)
            .is_some_and(|t| !t.text.chars().any(|c| c.is_ascii_uppercase()));
        let (comments, tokens): (Vec<_>, Vec<_>) = tokens
            .into_iter()
            .filter(|t| t.kind != TokenKind::Whitespace)
            .partition(|t| t.kind == TokenKind::Comment);
        Self {
            tokens,
            comments,
            pos: 0,
            profile: options.dialect.profile(),
            max_depth: options.max_depth,
            depth: 0,
            query_depth: 0,
            markers: Vec::new(),
            prev_end: 0,
            eof,
            lowercase_keywords,
        }
    }

    /// Parse every statement up to end of input.
    pub fn parse_script(mut self) -> Result<Script, ParseError> {
        if self.at_eof() {
            return Err(self.error_here("no statement found"));
        }

        // (statement, markers, offset of its terminating `;` if any)
        let mut parsed = Vec::new();
        let mut trailing_semicolon = false;
        while !self.at_eof() {
            if self.check_punct(";") {
                return Err(self.error_here("empty statement"));
            }
            self.markers.clear();
            let statement = self.parse_statement()?;
            let markers = std::mem::take(&mut self.markers);
            if let Some(semi) = self.peek().filter(|t| t.is_punct(";")) {
                let boundary = semi.span.start;
                self.advance();
                parsed.push((statement, markers, Some(boundary)));
                if self.at_eof() {
                    trailing_semicolon = true;
                }
            } else if self.at_eof() {
                parsed.push((statement, markers, None));
            } else {
                return Err(self.expected("';' or end of input"));
            }
        }

        let mut comments = std::mem::take(&mut self.comments).into_iter().peekable();
        let mut statements = Vec::with_capacity(parsed.len());
        for (statement, markers, boundary) in parsed {
            let mut own = Vec::new();
            while let Some(c) = comments.next_if(|c| boundary.is_none_or(|b| c.span.start < b)) {
                own.push(Comment {
                    text: c.text.to_string(),
                    span: c.span,
                    anchor: anchor_for(&markers, c.span.end),
                });
            }
            statements.push(ParsedStatement {
                statement,
                comments: own,
            });
        }
        let trailing_comments = comments
            .map(|c| Comment {
                text: c.text.to_string(),
                span: c.span,
                anchor: CommentAnchor::Dangling,
            })
            .collect();

        Ok(Script {
            statements,
            trailing_semicolon,
            trailing_comments,
            lowercase_keywords: self.lowercase_keywords,
        })
    }

    // ---- cursor ----

    pub(crate) fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    pub(crate) fn peek_nth(&self, n: usize) -> Option<&Token<'a>> {
        self.tokens.get(self.pos + n)
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(crate) fn advance(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.pos).copied()?;
        self.pos += 1;
        self.prev_end = token.span.end;
        Some(token)
    }

    /// Offset where the next token starts.
    pub(crate) fn offset(&self) -> usize {
        self.peek().map(|t| t.span.start).unwrap_or(self.eof.0)
    }

    pub(crate) fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.prev_end.max(start))
    }

    pub(crate) fn check_word(&self, word: &str) -> bool {
        self.peek().is_some_and(|t| t.is_word(word))
    }

    pub(crate) fn check_nth_word(&self, n: usize, word: &str) -> bool {
        self.peek_nth(n).is_some_and(|t| t.is_word(word))
    }

    /// Lookahead for a run of words, e.g. `["ORDER", "BY"]`.
    pub(crate) fn check_words(&self, words: &[&str]) -> bool {
        words.iter().enumerate().all(|(i, w)| self.check_nth_word(i, w))
    }

    pub(crate) fn eat_word(&mut self, word: &str) -> bool {
        if self.check_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_words(&mut self, words: &[&str]) -> bool {
        if self.check_words(words) {
            self.pos += words.len() - 1;
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_word(&mut self, word: &str) -> Result<Token<'a>, ParseError> {
        if self.check_word(word)
            && let Some(token) = self.advance()
        {
            return Ok(token);
        }
        Err(self.expected(word))
    }

    pub(crate) fn check_punct(&self, p: &str) -> bool {
        self.peek().is_some_and(|t| t.is_punct(p))
    }

    pub(crate) fn eat_punct(&mut self, p: &str) -> bool {
        if self.check_punct(p) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_punct(&mut self, p: &str) -> Result<(), ParseError> {
        if self.eat_punct(p) {
            Ok(())
        } else {
            Err(self.expected(&format!("'{}'", p)))
        }
    }

    pub(crate) fn check_op(&self, op: &str) -> bool {
        self.peek().is_some_and(|t| t.is_op(op))
    }

    pub(crate) fn eat_op(&mut self, op: &str) -> bool {
        if self.check_op(op) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn supports(&self, production: Production) -> bool {
        self.profile.supports(production)
    }

    pub(crate) fn dialect(&self) -> Dialect {
        self.profile.dialect
    }

    // ---- errors ----

    pub(crate) fn error_here(&self, message: impl Into<String>) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::at(message, token),
            None => {
                let (offset, line, column) = self.eof;
                ParseError::at_end(message, offset, line, column)
            }
        }
    }

    /// "expected X, found Y" at the current token.
    pub(crate) fn expected(&self, what: &str) -> ParseError {
        let found = match self.peek() {
            Some(t) => t.text.to_string(),
            None => "end of input".to_string(),
        };
        self.error_here(format!("expected {}, found {}", what, found))
    }

    /// Error for a production the active dialect does not accept.
    pub(crate) fn unsupported(&self, what: &str) -> ParseError {
        self.error_here(format!(
            "{} is not supported by the {} dialect",
            what,
            self.dialect()
        ))
    }

    // ---- nesting ----

    fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= self.max_depth {
            return Err(self.error_here(format!(
                "nesting exceeds the maximum depth of {}",
                self.max_depth
            )));
        }
        self.depth += 1;
        Ok(())
    }

    /// Run `f` one nesting level deeper, failing once `max_depth` is exceeded.
    pub(crate) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.enter()?;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Run a loop that folds operands into a left-deep tree. The loop calls
    /// [`Self::fold`] once per operator, so every level of the tree counts
    /// against `max_depth`; all of them are released when `f` returns.
    pub(crate) fn folding<T>(
        &mut self,
        f: impl FnOnce(&mut Self, &mut usize) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let mut folds = 0;
        let result = f(self, &mut folds);
        self.depth -= folds;
        result
    }

    pub(crate) fn fold(&mut self, folds: &mut usize) -> Result<(), ParseError> {
        self.enter()?;
        *folds += 1;
        Ok(())
    }

    /// Run `f` for a query nested inside the outermost statement.
    pub(crate) fn inner_query<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.query_depth += 1;
        let result = f(self);
        self.query_depth -= 1;
        result
    }

    /// Record the start of a top-level clause at the current token.
    pub(crate) fn mark(&mut self, kind: ClauseKind) {
        if self.query_depth == 0 {
            let offset = self.offset();
            self.markers.push(ClauseMarker { kind, offset });
        }
    }
}

/// A comment belongs in front of the first clause starting after it.
fn anchor_for(markers: &[ClauseMarker], comment_end: usize) -> CommentAnchor {
    match markers.iter().position(|m| m.offset >= comment_end) {
        Some(i) => {
            let kind = markers[i].kind;
            let ordinal = markers[..i].iter().filter(|m| m.kind == kind).count();
            CommentAnchor::Clause { kind, ordinal }
        }
        None => CommentAnchor::Dangling,
    }
}
