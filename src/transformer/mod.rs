//! AST rewrites.
//!
//! Every rewrite runs source -> AST -> rewritten AST -> formatter, so the
//! formatter is the only thing that produces output text.
//!
//! ```text
//! SQL text → parse_script → Script → Rewrite::apply → format_script → SQL text
//! ```

mod db2;
mod rename_function;
mod traits;

pub use db2::Db2ToPostgres;
pub use rename_function::ChangeFunctionName;
pub use traits::Rewrite;

use crate::analyzer::locator::reindent_text_block;
use crate::analyzer::{EmbeddedSql, HostKind, RegionKind, SqlLocator};
use crate::ast::Script;
use crate::config::FormatStyle;
use crate::dialect::Dialect;
use crate::error::SqlResult;
use crate::fmt::format_script;
use crate::parser::{ParseOptions, parse_script};

/// Apply `rewrite` to SQL text. `None` when nothing changed.
pub fn rewrite_sql(
    rewrite: &dyn Rewrite,
    source: &str,
    dialect: Dialect,
    style: &FormatStyle,
) -> SqlResult<Option<String>> {
    style.validate()?;
    let mut script = parse_script(source, &ParseOptions::new(dialect))?;
    let changed = rewrite.apply(&mut script);
    tracing::debug!(rewrite = rewrite.id(), changed, "applied rewrite");
    if changed == 0 {
        return Ok(None);
    }
    Ok(Some(format_script(&script, style)))
}

/// Apply `rewrite` to every SQL region of a host file. Only changed
/// regions are replaced. `None` when no region changed.
pub fn rewrite_embedded(
    rewrite: &dyn Rewrite,
    source: &str,
    host: HostKind,
    locator: &SqlLocator,
    style: &FormatStyle,
) -> SqlResult<Option<String>> {
    style.validate()?;
    let mut out = String::with_capacity(source.len());
    let mut last = 0;
    let mut changed_regions = 0;
    for region in locator.locate(source, host) {
        let Some(mut script) = locator.detector().parse(&region.text) else {
            continue;
        };
        let changed = rewrite.apply(&mut script);
        if changed == 0 {
            continue;
        }
        let Some(replacement) = render_region(&script, &region, source, style) else {
            tracing::warn!(
                line = region.line,
                rewrite = rewrite.id(),
                "skipping rewrite: line comments cannot be joined into a one-line string"
            );
            continue;
        };
        out.push_str(&source[last..region.span.start]);
        out.push_str(&replacement);
        last = region.span.end;
        changed_regions += 1;
        tracing::debug!(line = region.line, changed, rewrite = rewrite.id(), "rewrote region");
    }
    if changed_regions == 0 {
        return Ok(None);
    }
    out.push_str(&source[last..]);
    Ok(Some(out))
}

/// Rewritten SQL encoded for the region it replaces.
fn render_region(
    script: &Script,
    region: &EmbeddedSql,
    source: &str,
    style: &FormatStyle,
) -> Option<String> {
    match region.kind {
        RegionKind::File => {
            let mut text = format_script(script, style);
            if source.ends_with('\n') {
                text.push('\n');
            }
            Some(text)
        }
        RegionKind::TextBlock => Some(reindent_text_block(
            &source[region.span.range()],
            &format_script(script, style),
        )),
        RegionKind::BlockScalar => {
            let indent = " ".repeat(region.column - 1);
            let formatted = format_script(script, style);
            let lines: Vec<String> = formatted
                .lines()
                .enumerate()
                .map(|(n, l)| match (n, l.is_empty()) {
                    (0, _) | (_, true) => l.to_string(),
                    _ => format!("{indent}{l}"),
                })
                .collect();
            Some(lines.join("\n"))
        }
        RegionKind::StringLiteral | RegionKind::PlainScalar | RegionKind::QuotedScalar => {
            let has_line_comment = script
                .statements
                .iter()
                .flat_map(|s| &s.comments)
                .chain(&script.trailing_comments)
                .any(|c| c.is_line_comment());
            if has_line_comment {
                return None;
            }
            let one_line = format_script(script, &style.clone().with_max_line_length(None))
                .lines()
                .map(str::trim)
                .collect::<Vec<_>>()
                .join(" ");
            let quote = source[..region.span.start].chars().next_back();
            Some(match (region.kind, quote) {
                (RegionKind::PlainScalar, _) => one_line,
                (RegionKind::QuotedScalar, Some('\'')) => one_line.replace('\'', "''"),
                _ => one_line.replace('\\', "\\\\").replace('"', "\\\""),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn rename_in(source: &str, host: HostKind) -> Option<String> {
        let rule = ChangeFunctionName::new("nvl", "coalesce").unwrap();
        let locator = SqlLocator::new(Dialect::Standard).unwrap();
        rewrite_embedded(&rule, source, host, &locator, &FormatStyle::default()).unwrap()
    }

    #[test]
    fn test_rewrite_sql_file() {
        assert_eq!(
            rename_in("select nvl(a, 0) from t;\n", HostKind::Sql).as_deref(),
            Some("SELECT coalesce(a, 0)\nFROM t;\n")
        );
    }

    #[test]
    fn test_rewrite_java_string_literal_stays_one_line() {
        let source = r#"String q = "select nvl(\"A\", 0) from t where b = 1";"#;
        assert_eq!(
            rename_in(source, HostKind::Java).as_deref(),
            Some(r#"String q = "SELECT coalesce(\"A\", 0) FROM t WHERE b = 1";"#)
        );
    }

    #[test]
    fn test_rewrite_java_text_block() {
        let source = "String q = \"\"\"\n    select nvl(a, 0) from t\n    \"\"\";";
        assert_eq!(
            rename_in(source, HostKind::Java).as_deref(),
            Some("String q = \"\"\"\n    SELECT coalesce(a, 0)\n    FROM t\n    \"\"\";")
        );
    }

    #[test]
    fn test_rewrite_yaml_scalars() {
        let source = "a: select nvl(a, 0) from t\nb: 'select nvl(x, ''-'') from u'\nc: select 1\n";
        assert_eq!(
            rename_in(source, HostKind::Yaml).as_deref(),
            Some("a: SELECT coalesce(a, 0) FROM t\nb: 'SELECT coalesce(x, ''-'') FROM u'\nc: select 1\n")
        );
    }

    #[test]
    fn test_rewrite_yaml_block_scalar() {
        let source = "q: |\n  select nvl(a, 0) from t\nnext: 1\n";
        assert_eq!(
            rename_in(source, HostKind::Yaml).as_deref(),
            Some("q: |\n  SELECT coalesce(a, 0)\n  FROM t\nnext: 1\n")
        );
    }

    #[test]
    fn test_line_comment_blocks_one_line_rewrite() {
        let source = "String q = \"select nvl(a, 0) from t -- note\";";
        assert_eq!(rename_in(source, HostKind::Java), None);
    }

    #[test]
    fn test_unchanged_source_returns_none() {
        assert_eq!(rename_in("String q = \"select a from t\";", HostKind::Java), None);
    }
}
