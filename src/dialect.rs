//! SQL dialects as data.
//!
//! The grammar is dialect-agnostic. Everything that varies between dialects
//! (reserved words, quoting, escapes, and which optional productions are
//! accepted) lives in a [`DialectProfile`] looked up once per call.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Standard,
    PostgreSql,
    MySql,
    MariaDb,
    Db2,
    PlSql,
    TSql,
    Redshift,
    Spark,
    N1ql,
}

/// Grammar productions that only some dialects accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Production {
    /// `LIMIT n [OFFSET m]` and `LIMIT m, n`.
    LimitOffset,
    /// `[OFFSET n ROWS] FETCH {FIRST|NEXT} n ROWS ONLY`.
    FetchFirst,
    /// `SELECT TOP n ...`.
    Top,
    /// `expr::type`.
    DoubleColonCast,
    /// `MINUS` as a synonym for `EXCEPT`.
    MinusOperator,
    /// `SELECT DISTINCT ON (...)`.
    DistinctOn,
    /// `RETURNING` on INSERT/UPDATE/DELETE.
    Returning,
    /// `ILIKE`.
    ILike,
}

/// How a backslash inside a string literal is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringEscape {
    /// Only a doubled quote escapes a quote.
    Doubled,
    /// Backslash escapes the next character; doubling still works.
    Backslash,
}

/// Everything the lexer and parser need to know about one dialect.
#[derive(Debug, Clone, Copy)]
pub struct DialectProfile {
    pub dialect: Dialect,
    pub name: &'static str,
    extra_reserved: &'static [&'static str],
    /// (open, close) pairs for quoted identifiers.
    pub identifier_quotes: &'static [(char, char)],
    /// Characters that open a string literal.
    pub string_quotes: &'static [char],
    pub string_escape: StringEscape,
    /// `# comment` to end of line.
    pub hash_comments: bool,
    /// `$tag$ ... $tag$` strings.
    pub dollar_quoted_strings: bool,
    productions: &'static [Production],
}

/// Words that can never be a bare identifier or alias in any dialect.
const CORE_RESERVED: &[&str] = &[
    "ALL", "AND", "ANY", "AS", "ASC", "BETWEEN", "BY", "CASE", "CAST", "CHECK", "CONSTRAINT",
    "CREATE", "CROSS", "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE", "END", "ESCAPE",
    "EXCEPT", "EXISTS", "FALSE", "FETCH", "FILTER", "FOR", "FOREIGN", "FROM", "FULL", "GROUP",
    "HAVING", "IN", "INNER", "INSERT", "INTERSECT", "INTO", "IS", "JOIN", "LEFT", "LIKE", "LIMIT",
    "NATURAL", "NOT", "NULL", "OFFSET", "ON", "OR", "ORDER", "OUTER", "OVER", "PRIMARY",
    "REFERENCES", "RETURNING", "RIGHT", "SELECT", "SET", "SOME", "THEN", "TRUE", "TRUNCATE",
    "UNION", "UNIQUE", "UPDATE", "USING", "VALUES", "WHEN", "WHERE", "WINDOW", "WITH",
];

const DOUBLE_QUOTE_IDENT: &[(char, char)] = &[('"', '"')];
const BACKTICK_IDENT: &[(char, char)] = &[('`', '`')];
const TSQL_IDENT: &[(char, char)] = &[('[', ']'), ('"', '"')];

const SINGLE_QUOTE: &[char] = &['\''];
const SINGLE_OR_DOUBLE_QUOTE: &[char] = &['\'', '"'];

use Production::*;

static PROFILES: &[DialectProfile] = &[
    DialectProfile {
        dialect: Dialect::Standard,
        name: "sql",
        extra_reserved: &[],
        identifier_quotes: DOUBLE_QUOTE_IDENT,
        string_quotes: SINGLE_QUOTE,
        string_escape: StringEscape::Doubled,
        hash_comments: false,
        dollar_quoted_strings: false,
        productions: &[LimitOffset, FetchFirst, DoubleColonCast, DistinctOn, Returning],
    },
    DialectProfile {
        dialect: Dialect::PostgreSql,
        name: "postgresql",
        extra_reserved: &["ILIKE"],
        identifier_quotes: DOUBLE_QUOTE_IDENT,
        string_quotes: SINGLE_QUOTE,
        string_escape: StringEscape::Doubled,
        hash_comments: false,
        dollar_quoted_strings: true,
        productions: &[LimitOffset, FetchFirst, DoubleColonCast, DistinctOn, Returning, ILike],
    },
    DialectProfile {
        dialect: Dialect::MySql,
        name: "mysql",
        extra_reserved: &[],
        identifier_quotes: BACKTICK_IDENT,
        string_quotes: SINGLE_OR_DOUBLE_QUOTE,
        string_escape: StringEscape::Backslash,
        hash_comments: true,
        dollar_quoted_strings: false,
        productions: &[LimitOffset],
    },
    DialectProfile {
        dialect: Dialect::MariaDb,
        name: "mariadb",
        extra_reserved: &[],
        identifier_quotes: BACKTICK_IDENT,
        string_quotes: SINGLE_OR_DOUBLE_QUOTE,
        string_escape: StringEscape::Backslash,
        hash_comments: true,
        dollar_quoted_strings: false,
        productions: &[LimitOffset, Returning],
    },
    DialectProfile {
        dialect: Dialect::Db2,
        name: "db2",
        extra_reserved: &["MINUS"],
        identifier_quotes: DOUBLE_QUOTE_IDENT,
        string_quotes: SINGLE_QUOTE,
        string_escape: StringEscape::Doubled,
        hash_comments: false,
        dollar_quoted_strings: false,
        productions: &[FetchFirst, LimitOffset, MinusOperator],
    },
    DialectProfile {
        dialect: Dialect::PlSql,
        name: "plsql",
        extra_reserved: &["MINUS"],
        identifier_quotes: DOUBLE_QUOTE_IDENT,
        string_quotes: SINGLE_QUOTE,
        string_escape: StringEscape::Doubled,
        hash_comments: false,
        dollar_quoted_strings: false,
        productions: &[FetchFirst, MinusOperator, Returning],
    },
    DialectProfile {
        dialect: Dialect::TSql,
        name: "tsql",
        extra_reserved: &["TOP"],
        identifier_quotes: TSQL_IDENT,
        string_quotes: SINGLE_QUOTE,
        string_escape: StringEscape::Doubled,
        hash_comments: false,
        dollar_quoted_strings: false,
        productions: &[Top, FetchFirst],
    },
    DialectProfile {
        dialect: Dialect::Redshift,
        name: "redshift",
        extra_reserved: &["ILIKE"],
        identifier_quotes: DOUBLE_QUOTE_IDENT,
        string_quotes: SINGLE_QUOTE,
        string_escape: StringEscape::Doubled,
        hash_comments: false,
        dollar_quoted_strings: true,
        productions: &[LimitOffset, DoubleColonCast, ILike, Top],
    },
    DialectProfile {
        dialect: Dialect::Spark,
        name: "spark",
        extra_reserved: &["MINUS"],
        identifier_quotes: BACKTICK_IDENT,
        string_quotes: SINGLE_OR_DOUBLE_QUOTE,
        string_escape: StringEscape::Backslash,
        hash_comments: false,
        dollar_quoted_strings: false,
        productions: &[LimitOffset, MinusOperator, ILike],
    },
    DialectProfile {
        dialect: Dialect::N1ql,
        name: "n1ql",
        extra_reserved: &[],
        identifier_quotes: BACKTICK_IDENT,
        string_quotes: SINGLE_OR_DOUBLE_QUOTE,
        string_escape: StringEscape::Backslash,
        hash_comments: false,
        dollar_quoted_strings: false,
        productions: &[LimitOffset, Returning],
    },
];

impl Dialect {
    pub const ALL: [Dialect; 10] = [
        Dialect::Standard,
        Dialect::PostgreSql,
        Dialect::MySql,
        Dialect::MariaDb,
        Dialect::Db2,
        Dialect::PlSql,
        Dialect::TSql,
        Dialect::Redshift,
        Dialect::Spark,
        Dialect::N1ql,
    ];

    pub fn profile(self) -> &'static DialectProfile {
        // PROFILES is ordered like Dialect::ALL
        &PROFILES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.profile().name
    }

    /// Alternate spellings accepted by [`Dialect::from_str`].
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Dialect::Standard => &["standard", "ansi"],
            Dialect::PostgreSql => &["postgres", "pg"],
            Dialect::PlSql => &["oracle"],
            Dialect::TSql => &["mssql", "sqlserver"],
            _ => &[],
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Dialect::ALL
            .into_iter()
            .find(|d| {
                d.name().eq_ignore_ascii_case(wanted)
                    || d.aliases().iter().any(|a| a.eq_ignore_ascii_case(wanted))
            })
            .ok_or_else(|| {
                let known: Vec<&str> = Dialect::ALL.iter().map(|d| d.name()).collect();
                ConfigError::new(format!(
                    "unknown dialect '{}' (expected one of: {})",
                    s,
                    known.join(", ")
                ))
            })
    }
}

impl DialectProfile {
    pub fn supports(&self, production: Production) -> bool {
        self.productions.contains(&production)
    }

    /// Case-insensitive reserved-word check.
    pub fn is_reserved(&self, word: &str) -> bool {
        let is = |w: &&str| w.eq_ignore_ascii_case(word);
        CORE_RESERVED.iter().any(is) || self.extra_reserved.iter().any(is)
    }

    /// Closing quote for an identifier opened with `open`.
    pub fn identifier_close(&self, open: char) -> Option<char> {
        self.identifier_quotes
            .iter()
            .find(|(o, _)| *o == open)
            .map(|(_, c)| *c)
    }

    pub fn is_string_quote(&self, c: char) -> bool {
        self.string_quotes.contains(&c)
    }

    /// Preferred quote pair when an identifier must be quoted on output.
    pub fn default_identifier_quote(&self) -> (char, char) {
        self.identifier_quotes.first().copied().unwrap_or(('"', '"'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_line_up_with_enum() {
        for d in Dialect::ALL {
            assert_eq!(d.profile().dialect, d);
        }
    }

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("PostgreSQL".parse::<Dialect>().unwrap(), Dialect::PostgreSql);
        assert_eq!("pg".parse::<Dialect>().unwrap(), Dialect::PostgreSql);
        assert_eq!("oracle".parse::<Dialect>().unwrap(), Dialect::PlSql);
        assert_eq!("sql".parse::<Dialect>().unwrap(), Dialect::Standard);
        let err = "cobol".parse::<Dialect>().unwrap_err();
        assert!(err.message.contains("unknown dialect 'cobol'"));
    }

    #[test]
    fn test_production_table() {
        assert!(Dialect::TSql.profile().supports(Production::Top));
        assert!(!Dialect::PostgreSql.profile().supports(Production::Top));
        assert!(Dialect::Db2.profile().supports(Production::MinusOperator));
        assert!(Dialect::PostgreSql.profile().supports(Production::DoubleColonCast));
        assert!(!Dialect::MySql.profile().supports(Production::DoubleColonCast));
    }

    #[test]
    fn test_reserved_words() {
        let pg = Dialect::PostgreSql.profile();
        assert!(pg.is_reserved("select"));
        assert!(pg.is_reserved("ILIKE"));
        assert!(!pg.is_reserved("top"));
        assert!(!pg.is_reserved("table"));
        assert!(Dialect::TSql.profile().is_reserved("top"));
    }
}
