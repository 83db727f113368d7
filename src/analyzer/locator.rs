//! Finds SQL embedded in host files.
//!
//! Java sources contribute string literals and text blocks, YAML files
//! contribute scalar values, and `.sql` files are one region. Every
//! candidate is decoded to the text the host program would see and kept
//! only when [`SqlDetector::is_sql`] accepts it.

use std::path::Path;

use regex::Regex;
use serde::Serialize;

use super::detector::SqlDetector;
use crate::config::FormatStyle;
use crate::dialect::Dialect;
use crate::error::SqlResult;
use crate::fmt::format_script;
use crate::lexer::Span;

/// Kind of file SQL is embedded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostKind {
    Sql,
    Java,
    Yaml,
}

impl HostKind {
    /// Host kind from the file extension, `None` for unsupported files.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "sql" => Some(HostKind::Sql),
            "java" => Some(HostKind::Java),
            "yml" | "yaml" => Some(HostKind::Yaml),
            _ => None,
        }
    }
}

/// How a region was written in the host file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// The whole file.
    File,
    /// Java `"..."`.
    StringLiteral,
    /// Java `"""` block.
    TextBlock,
    PlainScalar,
    QuotedScalar,
    /// YAML `|` or `>` block.
    BlockScalar,
}

/// One SQL region found in a host file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbeddedSql {
    /// Decoded SQL text.
    pub text: String,
    /// Raw region in the host source, delimiters excluded.
    pub span: Span,
    pub line: usize,
    pub column: usize,
    pub kind: RegionKind,
}

/// Locate SQL in `source` using a one-off [`SqlLocator`].
pub fn locate(source: &str, kind: HostKind, dialect: Dialect) -> SqlResult<Vec<EmbeddedSql>> {
    Ok(SqlLocator::new(dialect)?.locate(source, kind))
}

/// Format every SQL text block of a Java source in place.
pub fn format_text_blocks(source: &str, dialect: Dialect, style: &FormatStyle) -> SqlResult<String> {
    SqlLocator::new(dialect)?.format_text_blocks(source, style)
}

/// Host-file scanner with precompiled patterns.
#[derive(Debug, Clone)]
pub struct SqlLocator {
    detector: SqlDetector,
    /// Java tokens that can hold or hide a string: text blocks, comments,
    /// char literals and string literals, in that priority.
    java_pattern: Regex,
    yaml_entry_pattern: Regex,
    yaml_item_pattern: Regex,
    yaml_block_pattern: Regex,
}

impl SqlLocator {
    pub fn new(dialect: Dialect) -> SqlResult<Self> {
        Ok(Self {
            detector: SqlDetector::new(dialect),
            java_pattern: Regex::new(
                r#"(?s)"""[ \t\f]*\r?\n(?P<block>(?:[^\\]|\\.)*?)"""|//[^\n]*|/\*.*?\*/|'(?:[^'\\\n]|\\.)*'|"(?P<string>(?:[^"\\\n]|\\.)*)""#,
            )?,
            yaml_entry_pattern: Regex::new(
                r#"^(?P<indent> *)(?:- +)?(?:"[^"]*"|'[^']*'|[^:#\s'"][^:#]*?) *:(?: +(?P<value>\S.*?))? *$"#,
            )?,
            yaml_item_pattern: Regex::new(r"^(?P<indent> *)- +(?P<value>\S.*?) *$")?,
            yaml_block_pattern: Regex::new(r"^[|>][-+1-9]*(?: +#.*)?$")?,
        })
    }

    pub fn detector(&self) -> &SqlDetector {
        &self.detector
    }

    pub fn locate(&self, source: &str, kind: HostKind) -> Vec<EmbeddedSql> {
        let candidates = match kind {
            HostKind::Sql => vec![EmbeddedSql {
                text: source.to_string(),
                span: Span::new(0, source.len()),
                line: 1,
                column: 1,
                kind: RegionKind::File,
            }],
            HostKind::Java => self.java_candidates(source),
            HostKind::Yaml => self.yaml_candidates(source),
        };
        let found: Vec<_> = candidates
            .into_iter()
            .filter(|c| self.detector.is_sql(&c.text))
            .collect();
        tracing::debug!(host = ?kind, found = found.len(), "located embedded SQL");
        found
    }

    fn java_candidates(&self, source: &str) -> Vec<EmbeddedSql> {
        let mut candidates = Vec::new();
        for caps in self.java_pattern.captures_iter(source) {
            let (m, text, kind) = if let Some(m) = caps.name("block") {
                (m, decode_text_block(m.as_str()), RegionKind::TextBlock)
            } else if let Some(m) = caps.name("string") {
                (m, unescape_java(m.as_str()), RegionKind::StringLiteral)
            } else {
                continue;
            };
            let (line, column) = line_column(source, m.start());
            candidates.push(EmbeddedSql {
                text,
                span: Span::new(m.start(), m.end()),
                line,
                column,
                kind,
            });
        }
        candidates
    }

    fn yaml_candidates(&self, source: &str) -> Vec<EmbeddedSql> {
        let lines = split_lines(source);
        let mut candidates = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            let (offset, line) = lines[i];
            i += 1;
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("---") {
                continue;
            }
            let caps = match self.yaml_entry_pattern.captures(line) {
                Some(caps) => caps,
                None => match self.yaml_item_pattern.captures(line) {
                    Some(caps) => caps,
                    None => continue,
                },
            };
            let Some(value) = caps.name("value") else {
                continue;
            };
            let indent = caps.name("indent").map_or(0, |m| m.len());
            let start = offset + value.start();

            if self.yaml_block_pattern.is_match(value.as_str()) {
                let folded = value.as_str().starts_with('>');
                let (block, consumed) = block_scalar(source, &lines[i..], indent, folded);
                i += consumed;
                candidates.extend(block);
                continue;
            }
            let (text, span, kind) = match value.as_str().chars().next() {
                Some('"') => match quoted_scalar(value.as_str(), '"') {
                    Some((raw, len)) => (
                        unescape_yaml(raw),
                        Span::new(start + 1, start + 1 + len),
                        RegionKind::QuotedScalar,
                    ),
                    None => continue,
                },
                Some('\'') => match quoted_scalar(value.as_str(), '\'') {
                    Some((raw, len)) => (
                        raw.replace("''", "'"),
                        Span::new(start + 1, start + 1 + len),
                        RegionKind::QuotedScalar,
                    ),
                    None => continue,
                },
                Some('{' | '[' | '&' | '*' | '!' | '|' | '>') => continue,
                _ => {
                    let plain = strip_yaml_comment(value.as_str());
                    (
                        plain.to_string(),
                        Span::new(start, start + plain.len()),
                        RegionKind::PlainScalar,
                    )
                }
            };
            let (line, column) = line_column(source, span.start);
            candidates.push(EmbeddedSql {
                text,
                span,
                line,
                column,
                kind,
            });
        }
        candidates
    }

    /// Replace each SQL text block with its formatted SQL, re-indented to
    /// the block's own indentation. Other text is copied through.
    pub fn format_text_blocks(&self, source: &str, style: &FormatStyle) -> SqlResult<String> {
        style.validate()?;
        let mut out = String::with_capacity(source.len());
        let mut last = 0;
        let mut formatted_blocks = 0;
        for caps in self.java_pattern.captures_iter(source) {
            let Some(block) = caps.name("block") else {
                continue;
            };
            let Some(script) = self.detector.parse(&decode_text_block(block.as_str())) else {
                continue;
            };
            let formatted = format_script(&script, style);
            out.push_str(&source[last..block.start()]);
            out.push_str(&reindent_text_block(block.as_str(), &formatted));
            last = block.end();
            formatted_blocks += 1;
        }
        out.push_str(&source[last..]);
        tracing::debug!(blocks = formatted_blocks, "formatted text blocks");
        Ok(out)
    }
}

/// `(offset, line)` pairs, line terminators removed.
fn split_lines(source: &str) -> Vec<(usize, &str)> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for raw in source.split_inclusive('\n') {
        let line = raw.trim_end_matches('\n').trim_end_matches('\r');
        lines.push((offset, line));
        offset += raw.len();
    }
    lines
}

/// 1-based line and character column of a byte offset.
pub(crate) fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    (line, before[line_start..].chars().count() + 1)
}

fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

/// Text of a YAML block scalar whose header sits at `parent_indent`.
/// Returns the region, if any, and the number of lines consumed.
fn block_scalar(
    source: &str,
    lines: &[(usize, &str)],
    parent_indent: usize,
    folded: bool,
) -> (Option<EmbeddedSql>, usize) {
    let Some(block_indent) = lines
        .iter()
        .find(|(_, l)| !l.trim().is_empty())
        .map(|(_, l)| leading_spaces(l))
    else {
        return (None, 0);
    };
    if block_indent <= parent_indent {
        return (None, 0);
    }

    let mut consumed = 0;
    let mut last_content = None;
    for (n, (_, line)) in lines.iter().enumerate() {
        if !line.trim().is_empty() {
            if leading_spaces(line) < block_indent {
                break;
            }
            last_content = Some(n);
        }
        consumed = n + 1;
    }
    let Some(last) = last_content else {
        return (None, consumed);
    };
    let body = &lines[..=last];

    let mut text = String::new();
    let mut previous_blank = true;
    for (n, (_, line)) in body.iter().enumerate() {
        let content = line.get(block_indent..).unwrap_or("");
        if n > 0 {
            if !folded || content.is_empty() {
                text.push('\n');
            } else if !previous_blank {
                text.push(' ');
            }
        }
        text.push_str(content);
        previous_blank = content.is_empty();
    }

    let start = body[0].0 + block_indent.min(body[0].1.len());
    let (end_offset, end_line) = body[last];
    let span = Span::new(start, end_offset + end_line.len());
    let (line, column) = line_column(source, start);
    (
        Some(EmbeddedSql {
            text,
            span,
            line,
            column,
            kind: RegionKind::BlockScalar,
        }),
        consumed,
    )
}

/// Contents of a quoted scalar and their byte length, if it closes on this line.
fn quoted_scalar(value: &str, quote: char) -> Option<(&str, usize)> {
    let body = &value[1..];
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        if quote == '"' && c == '\\' {
            chars.next();
        } else if c == quote {
            if quote == '\'' && body[i + 1..].starts_with('\'') {
                chars.next();
                continue;
            }
            return Some((&body[..i], i));
        }
    }
    None
}

fn strip_yaml_comment(value: &str) -> &str {
    match value.find(" #") {
        Some(i) => value[..i].trim_end(),
        None => value,
    }
}

fn unescape_yaml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(c @ ('"' | '\\' | '/' | ' ')) => out.push(c),
            Some(c) => {
                out.push('\\');
                out.push(c);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// The string a Java text block evaluates to: incidental indentation and
/// trailing spaces stripped, then escapes decoded.
fn decode_text_block(raw: &str) -> String {
    let lines: Vec<&str> = raw.split('\n').map(|l| l.trim_end_matches('\r')).collect();
    let last = lines.len() - 1;
    let indent = lines
        .iter()
        .enumerate()
        .filter(|(n, l)| *n == last || !l.trim().is_empty())
        .map(|(_, l)| leading_spaces(l))
        .min()
        .unwrap_or(0);
    let stripped: Vec<&str> = lines
        .iter()
        .map(|l| l.get(indent..).unwrap_or("").trim_end_matches([' ', '\t']))
        .collect();
    unescape_java(&stripped.join("\n"))
}

fn unescape_java(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('s') => out.push(' '),
            // line continuation inside a text block
            Some('\n') => {}
            Some(c @ ('"' | '\'' | '\\')) => out.push(c),
            Some(d @ '0'..='7') => {
                let mut value = d.to_digit(8).unwrap_or(0);
                let max_digits = if d <= '3' { 2 } else { 1 };
                for _ in 0..max_digits {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.extend(char::from_u32(value));
            }
            Some('u') => {
                while chars.peek() == Some(&'u') {
                    chars.next();
                }
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(c) => out.push(c),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(c) => {
                out.push('\\');
                out.push(c);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// New raw contents for a text block holding `formatted`. Keeps the
/// closing delimiter line and a trailing `\` continuation.
pub(crate) fn reindent_text_block(raw: &str, formatted: &str) -> String {
    let (body, closing) = match raw.rfind('\n') {
        Some(i) if raw[i + 1..].trim().is_empty() => (&raw[..i], Some(&raw[i + 1..])),
        _ => (raw, None),
    };
    let indent = body
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| &l[..leading_spaces(l)])
        .min_by_key(|prefix| prefix.len())
        .unwrap_or("");
    let trimmed = body.trim_end();
    let backslashes = trimmed.len() - trimmed.trim_end_matches('\\').len();
    let continuation = backslashes % 2 == 1;

    let mut out = formatted
        .lines()
        .map(|l| {
            if l.is_empty() {
                String::new()
            } else {
                format!("{indent}{}", escape_text_block(l))
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    if continuation {
        out.push('\\');
    }
    if let Some(closing) = closing {
        out.push('\n');
        out.push_str(closing);
    }
    out
}

fn escape_text_block(line: &str) -> String {
    line.replace('\\', "\\\\").replace("\"\"\"", "\\\"\"\"")
}
