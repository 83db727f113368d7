//! Grammar productions, split by statement area. Each file adds an
//! `impl Parser` block.

pub mod case_when;
pub mod ddl;
pub mod dml;
pub mod expressions;
pub mod functions;
pub mod joins;
pub mod query;
pub mod select;

use crate::ast::*;
use crate::error::ParseError;
use crate::lexer::TokenKind;
use crate::parser::Parser;

impl<'a> Parser<'a> {
    /// One statement, without its terminating `;`.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let Some(token) = self.peek() else {
            return Err(self.error_here("no statement found"));
        };
        if token.is_word("SELECT")
            || token.is_word("WITH")
            || token.is_word("VALUES")
            || token.is_punct("(")
        {
            return Ok(Statement::Query(Box::new(self.parse_query()?)));
        }
        if token.is_word("INSERT") {
            return Ok(Statement::Insert(Box::new(self.parse_insert()?)));
        }
        if token.is_word("UPDATE") {
            return Ok(Statement::Update(Box::new(self.parse_update()?)));
        }
        if token.is_word("DELETE") {
            return Ok(Statement::Delete(Box::new(self.parse_delete()?)));
        }
        if token.is_word("CREATE") {
            return self.parse_create();
        }
        if token.is_word("DROP") {
            return Ok(Statement::Drop(self.parse_drop()?));
        }
        if token.is_word("TRUNCATE") {
            return Ok(Statement::Truncate(self.parse_truncate()?));
        }
        Err(self.expected("a statement"))
    }

    /// A bare or quoted identifier. Reserved words are rejected.
    pub(crate) fn parse_ident(&mut self) -> Result<Ident, ParseError> {
        let Some(token) = self.peek().copied() else {
            return Err(self.expected("an identifier"));
        };
        match token.kind {
            TokenKind::Identifier { quoted: false } => {
                self.advance();
                Ok(Ident::new(token.text))
            }
            TokenKind::Identifier { quoted: true } => {
                self.advance();
                Ok(unquote(token.text))
            }
            _ => Err(self.expected("an identifier")),
        }
    }

    /// True when the next token can serve as an identifier.
    pub(crate) fn check_ident(&self) -> bool {
        self.peek()
            .is_some_and(|t| matches!(t.kind, TokenKind::Identifier { .. }))
    }

    /// `a.b.c`
    pub(crate) fn parse_object_name(&mut self) -> Result<ObjectName, ParseError> {
        let mut parts = vec![self.parse_ident()?];
        while self.check_punct(".") && self.peek_nth(1).is_some_and(|t| matches!(t.kind, TokenKind::Identifier { .. })) {
            self.advance();
            parts.push(self.parse_ident()?);
        }
        Ok(ObjectName(parts))
    }

    /// `(a, b, c)`
    pub(crate) fn parse_parenthesized_idents(&mut self) -> Result<Vec<Ident>, ParseError> {
        self.expect_punct("(")?;
        let idents = self.parse_comma_separated(Self::parse_ident)?;
        self.expect_punct(")")?;
        Ok(idents)
    }

    /// One or more items separated by commas.
    pub(crate) fn parse_comma_separated<T>(
        &mut self,
        mut f: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        let mut items = vec![f(self)?];
        while self.eat_punct(",") {
            items.push(f(self)?);
        }
        Ok(items)
    }

    /// `[AS] alias [(col, ...)]`. Only identifiers qualify, so keywords end the item.
    pub(crate) fn parse_optional_table_alias(&mut self) -> Result<Option<TableAlias>, ParseError> {
        let explicit_as = self.eat_word("AS");
        if !explicit_as && !self.check_ident() {
            return Ok(None);
        }
        let name = self.parse_ident()?;
        let columns = if self.check_punct("(") {
            self.parse_parenthesized_idents()?
        } else {
            Vec::new()
        };
        Ok(Some(TableAlias {
            name,
            columns,
            explicit_as,
        }))
    }
}

/// Strip identifier quotes and collapse doubled closing quotes.
fn unquote(text: &str) -> Ident {
    let mut chars = text.chars();
    let open = chars.next().unwrap_or('"');
    let close = match open {
        '[' => ']',
        c => c,
    };
    let inner = &text[open.len_utf8()..text.len().saturating_sub(close.len_utf8())];
    let value = inner.replace(&format!("{close}{close}"), &close.to_string());
    Ident::quoted(value, open)
}
