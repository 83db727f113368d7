//! Rename function calls matching a glob.

use super::traits::Rewrite;
use crate::analyzer::FunctionPattern;
use crate::ast::*;
use crate::error::SqlResult;

/// Renames every call whose name matches `old` to `new`.
#[derive(Debug, Clone)]
pub struct ChangeFunctionName {
    old: FunctionPattern,
    new: ObjectName,
}

impl ChangeFunctionName {
    /// `old` is a glob (`nvl`, `to_*`); `new` may be dotted (`pkg.fn`).
    pub fn new(old: &str, new: &str) -> SqlResult<Self> {
        Ok(Self {
            old: FunctionPattern::new(old)?,
            new: ObjectName(new.split('.').map(Ident::new).collect()),
        })
    }
}

impl Rewrite for ChangeFunctionName {
    fn id(&self) -> &'static str {
        "change-function-name"
    }

    fn apply(&self, script: &mut Script) -> usize {
        let mut renamer = Renamer {
            rule: self,
            renamed: 0,
        };
        script.visit_mut(&mut renamer);
        renamer.renamed
    }
}

struct Renamer<'r> {
    rule: &'r ChangeFunctionName,
    renamed: usize,
}

impl VisitorMut for Renamer<'_> {
    fn function(&mut self, call: &mut FunctionCall) {
        if call.name != self.rule.new && self.rule.old.matches(&call.name) {
            call.name = self.rule.new.clone();
            self.renamed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormatStyle;
    use crate::dialect::Dialect;
    use crate::transformer::rewrite_sql;

    fn rename(sql: &str, old: &str, new: &str) -> Option<String> {
        let rule = ChangeFunctionName::new(old, new).unwrap();
        rewrite_sql(&rule, sql, Dialect::Standard, &FormatStyle::default()).unwrap()
    }

    #[test]
    fn test_renames_matching_calls() {
        assert_eq!(
            rename("select nvl(a, 0), NVL(b, 1) from t", "nvl", "coalesce").as_deref(),
            Some("SELECT coalesce(a, 0), coalesce(b, 1)\nFROM t")
        );
    }

    #[test]
    fn test_renames_nested_and_in_predicates() {
        assert_eq!(
            rename("update t set a = f(f(b)) where f(c) > 1", "f", "g").as_deref(),
            Some("UPDATE t\nSET a = g(g(b))\nWHERE g(c) > 1")
        );
    }

    #[test]
    fn test_glob_and_dotted_target() {
        assert_eq!(
            rename("select to_char(a), to_date(b) from t", "to_*", "fmt.convert").as_deref(),
            Some("SELECT fmt.convert(a), fmt.convert(b)\nFROM t")
        );
    }

    #[test]
    fn test_no_match_returns_none() {
        assert_eq!(rename("select upper(a) from t", "nvl", "coalesce"), None);
        assert_eq!(rename("select coalesce(a, 0) from t", "coalesce", "coalesce"), None);
    }
}
