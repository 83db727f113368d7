//! Heuristics for telling SQL apart from arbitrary text.

use crate::ast::Script;
use crate::dialect::Dialect;
use crate::parser::{ParseOptions, parse_script};

const DML_VERBS: [&str; 4] = ["SELECT", "UPDATE", "DELETE", "INSERT"];
const DDL_VERBS: [&str; 4] = ["CREATE", "ALTER", "DROP", "TRUNCATE"];

/// Decides whether a string found in a host file is SQL.
#[derive(Debug, Clone, Copy)]
pub struct SqlDetector {
    options: ParseOptions,
}

impl Default for SqlDetector {
    fn default() -> Self {
        Self::new(Dialect::Standard)
    }
}

impl SqlDetector {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            options: ParseOptions::new(dialect),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.options.dialect
    }

    /// Contains a DML verb anywhere, in any case.
    pub fn probably_sql(&self, text: &str) -> bool {
        contains_any(text, &DML_VERBS)
    }

    /// Contains a DDL verb anywhere, in any case.
    pub fn probably_ddl(&self, text: &str) -> bool {
        contains_any(text, &DDL_VERBS)
    }

    /// Passes one of the verb heuristics and parses as a script.
    pub fn is_sql(&self, text: &str) -> bool {
        self.parse(text).is_some()
    }

    /// The parsed script when `text` is SQL.
    pub fn parse(&self, text: &str) -> Option<Script> {
        if !self.probably_sql(text) && !self.probably_ddl(text) {
            return None;
        }
        match parse_script(text, &self.options) {
            Ok(script) => Some(script),
            Err(err) => {
                tracing::trace!(%err, "candidate text is not SQL");
                None
            }
        }
    }
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    let upper = text.to_ascii_uppercase();
    words.iter().any(|w| upper.contains(w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_heuristics() {
        let detector = SqlDetector::default();
        assert!(detector.probably_sql("select * from t"));
        assert!(detector.probably_sql("please Delete me"));
        assert!(!detector.probably_sql("create table t (a int)"));
        assert!(detector.probably_ddl("create table t (a int)"));
        assert!(detector.probably_ddl("Truncate t"));
        assert!(!detector.probably_ddl("hello world"));
    }

    #[test]
    fn test_is_sql_requires_a_parse() {
        let detector = SqlDetector::default();
        assert!(detector.is_sql("select a from t where id = ?"));
        assert!(detector.is_sql("drop table t"));
        assert!(!detector.is_sql("Please select an option"));
        assert!(!detector.is_sql("hello world"));
    }

    #[test]
    fn test_is_sql_uses_dialect() {
        let sql = "select top 5 a from t";
        assert!(!SqlDetector::new(Dialect::Standard).is_sql(sql));
        assert!(SqlDetector::new(Dialect::TSql).is_sql(sql));
    }
}
