//! SQL tokenizer.
//!
//! Scans left to right with nom recognizers, longest match first. Nothing is
//! discarded: whitespace and comments come out as tokens, so concatenating
//! every token's text gives back the input byte for byte.

mod token;

#[cfg(test)]
mod tests;

pub use token::{Span, Token, TokenKind};

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_till, take_until, take_while},
    character::complete::{char, digit0, digit1, hex_digit1, multispace1, one_of, satisfy},
    combinator::{opt, recognize},
    error::{Error, ErrorKind},
};

use crate::dialect::{Dialect, DialectProfile, StringEscape};
use crate::error::LexError;

/// Tokenize `source` under `dialect`.
pub fn tokenize(source: &str, dialect: Dialect) -> Result<Vec<Token<'_>>, LexError> {
    let tokens = Lexer::new(source, dialect).collect::<Result<Vec<_>, _>>()?;
    tracing::trace!(tokens = tokens.len(), %dialect, "tokenized");
    Ok(tokens)
}

/// Lazy token stream. Yields at most one error, then stops.
pub struct Lexer<'a> {
    source: &'a str,
    offset: usize,
    line: usize,
    column: usize,
    profile: &'static DialectProfile,
    done: bool,
}

type Recognized<'a> = Option<(TokenKind, &'a str)>;

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, dialect: Dialect) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 1,
            profile: dialect.profile(),
            done: false,
        }
    }

    fn scan_token(&self, rest: &'a str) -> Result<(TokenKind, &'a str), LexError> {
        let p = self.profile;
        let backslash = p.string_escape == StringEscape::Backslash;
        // rest is never empty here
        let first = rest.chars().next().unwrap_or_default();

        if let Some(hit) = self.attempt(rest, TokenKind::Whitespace, multispace1)? {
            return Ok(hit);
        }
        if let Some(hit) = self.attempt(rest, TokenKind::Comment, line_comment)? {
            return Ok(hit);
        }
        if p.hash_comments
            && let Some(hit) = self.attempt(rest, TokenKind::Comment, hash_comment)?
        {
            return Ok(hit);
        }
        if let Some(hit) = self.attempt(rest, TokenKind::Comment, block_comment)? {
            return Ok(hit);
        }
        if let Some(hit) = self.attempt(rest, TokenKind::StringLiteral, |i| {
            prefixed_string(i, backslash)
        })? {
            return Ok(hit);
        }
        if p.is_string_quote(first)
            && let Some(hit) = self.attempt(rest, TokenKind::StringLiteral, |i| {
                quoted(i, first, first, backslash)
            })?
        {
            return Ok(hit);
        }
        if p.dollar_quoted_strings
            && let Some(hit) = self.attempt(rest, TokenKind::StringLiteral, dollar_quoted)?
        {
            return Ok(hit);
        }
        if let Some(close) = p.identifier_close(first)
            && let Some(hit) = self.attempt(rest, TokenKind::Identifier { quoted: true }, |i| {
                quoted(i, first, close, false)
            })?
        {
            return Ok(hit);
        }
        if let Some(hit) = self.attempt(rest, TokenKind::NumericLiteral, number)? {
            return Ok(hit);
        }
        if let Some(hit) = self.attempt(rest, TokenKind::Parameter, parameter)? {
            return Ok(hit);
        }
        if let Some((_, text)) = self.attempt(rest, TokenKind::Keyword, word)? {
            let kind = if p.is_reserved(text) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier { quoted: false }
            };
            return Ok((kind, text));
        }
        if let Some(hit) = self.attempt(rest, TokenKind::Operator, operator)? {
            return Ok(hit);
        }
        if let Some(hit) = self.attempt(rest, TokenKind::Punctuation, punctuation)? {
            return Ok(hit);
        }

        Err(self.error(format!("unexpected character '{}'", first), first.to_string()))
    }

    /// Run one recognizer. A nom `Failure` means the construct started but never closed.
    fn attempt<F>(&self, rest: &'a str, kind: TokenKind, mut f: F) -> Result<Recognized<'a>, LexError>
    where
        F: FnMut(&'a str) -> IResult<&'a str, &'a str>,
    {
        match f(rest) {
            Ok((_, text)) if !text.is_empty() => Ok(Some((kind, text))),
            Ok(_) | Err(nom::Err::Error(_)) | Err(nom::Err::Incomplete(_)) => Ok(None),
            Err(nom::Err::Failure(_)) => Err(self.unterminated(rest)),
        }
    }

    fn unterminated(&self, rest: &str) -> LexError {
        let (what, opening) = if rest.starts_with("/*") {
            ("block comment", "/*".to_string())
        } else if rest.starts_with('$') {
            ("dollar-quoted string", rest.chars().take_while(|c| *c != '\n').take(16).collect())
        } else {
            let first = rest.chars().next().unwrap_or_default();
            if self.profile.identifier_close(first).is_some() && !self.profile.is_string_quote(first) {
                ("quoted identifier", first.to_string())
            } else if self.profile.is_string_quote(first) {
                ("string literal", first.to_string())
            } else {
                // prefixed literal such as E'...'
                ("string literal", rest.chars().take(2).collect())
            }
        };
        self.error(format!("unterminated {}", what), opening)
    }

    fn error(&self, message: String, text: String) -> LexError {
        LexError::new(message, text, self.offset, self.line, self.column)
    }

    fn advance(&mut self, text: &str) {
        self.offset += text.len();
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let rest = &self.source[self.offset..];
        if rest.is_empty() {
            self.done = true;
            return None;
        }
        match self.scan_token(rest) {
            Ok((kind, text)) => {
                let token = Token {
                    kind,
                    text,
                    span: Span::new(self.offset, self.offset + text.len()),
                    line: self.line,
                    column: self.column,
                };
                self.advance(text);
                Some(Ok(token))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn unterminated(input: &str) -> nom::Err<Error<&str>> {
    nom::Err::Failure(Error::new(input, ErrorKind::TakeUntil))
}

fn line_comment(input: &str) -> IResult<&str, &str> {
    recognize((tag("--"), take_till(|c| c == '\n' || c == '\r'))).parse(input)
}

fn hash_comment(input: &str) -> IResult<&str, &str> {
    recognize((char('#'), take_till(|c| c == '\n' || c == '\r'))).parse(input)
}

/// `/* ... */`, no nesting: the first `*/` closes.
fn block_comment(input: &str) -> IResult<&str, &str> {
    let (body, _) = tag("/*").parse(input)?;
    let Ok((rest, _)) = take_until::<_, _, Error<&str>>("*/").parse(body) else {
        return Err(unterminated(input));
    };
    let rest = &rest[2..];
    Ok((rest, &input[..input.len() - rest.len()]))
}

/// Delimited text where a doubled `close` escapes itself.
fn quoted(input: &str, open: char, close: char, backslash: bool) -> IResult<&str, &str> {
    let mut chars = input.char_indices().peekable();
    match chars.next() {
        Some((_, c)) if c == open => {}
        _ => return Err(nom::Err::Error(Error::new(input, ErrorKind::Char))),
    }
    while let Some((i, c)) = chars.next() {
        if backslash && c == '\\' {
            chars.next();
            continue;
        }
        if c == close {
            if chars.peek().map(|&(_, n)| n) == Some(close) {
                chars.next();
                continue;
            }
            let end = i + c.len_utf8();
            return Ok((&input[end..], &input[..end]));
        }
    }
    Err(unterminated(input))
}

/// `N'..'`, `E'..'` (backslash escapes), `X'..'`, `B'..'`.
fn prefixed_string(input: &str, backslash: bool) -> IResult<&str, &str> {
    let (body, prefix) = recognize(one_of("nNeExXbB")).parse(input)?;
    if !body.starts_with('\'') {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Char)));
    }
    let escapes = backslash || prefix.eq_ignore_ascii_case("e");
    let (rest, _) = quoted(body, '\'', '\'', escapes).map_err(|e| match e {
        nom::Err::Failure(_) => unterminated(input),
        other => other,
    })?;
    Ok((rest, &input[..input.len() - rest.len()]))
}

/// `$$ ... $$` or `$tag$ ... $tag$`.
fn dollar_quoted(input: &str) -> IResult<&str, &str> {
    let (body, delim) = recognize((
        char('$'),
        opt((
            satisfy(|c| c.is_alphabetic() || c == '_'),
            take_while(|c: char| c.is_alphanumeric() || c == '_'),
        )),
        char('$'),
    ))
    .parse(input)?;
    let Ok((rest, _)) = take_until::<_, _, Error<&str>>(delim).parse(body) else {
        return Err(unterminated(input));
    };
    let rest = &rest[delim.len()..];
    Ok((rest, &input[..input.len() - rest.len()]))
}

fn number(input: &str) -> IResult<&str, &str> {
    alt((
        recognize((tag_no_case("0x"), hex_digit1)),
        recognize((
            alt((
                recognize((digit1, opt((char('.'), digit0)))),
                recognize((char('.'), digit1)),
            )),
            opt((one_of("eE"), opt(one_of("+-")), digit1)),
        )),
    ))
    .parse(input)
}

fn word(input: &str) -> IResult<&str, &str> {
    recognize((
        satisfy(|c| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_' || c == '$'),
    ))
    .parse(input)
}

fn parameter(input: &str) -> IResult<&str, &str> {
    alt((
        recognize((char('?'), digit0)),
        recognize((char(':'), word)),
        recognize((char('$'), digit1)),
        recognize((char('@'), word)),
    ))
    .parse(input)
}

fn operator(input: &str) -> IResult<&str, &str> {
    alt((
        tag("->>"),
        tag("->"),
        tag("::"),
        tag("||"),
        tag("<="),
        tag(">="),
        tag("<>"),
        tag("!="),
        recognize(one_of("=<>+-*/%~&|^!")),
    ))
    .parse(input)
}

fn punctuation(input: &str) -> IResult<&str, &str> {
    recognize(one_of("(),;.[]")).parse(input)
}
