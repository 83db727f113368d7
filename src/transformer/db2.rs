//! Db2 to PostgreSQL conversion.

use super::traits::Rewrite;
use crate::ast::*;

/// Rewrites Db2-only syntax into its PostgreSQL spelling:
/// `FETCH FIRST n ROWS ONLY` becomes `LIMIT n` (OFFSET kept), `MINUS`
/// becomes `EXCEPT` and `CLOB` columns become `TEXT`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Db2ToPostgres;

impl Rewrite for Db2ToPostgres {
    fn id(&self) -> &'static str {
        "db2-to-postgres"
    }

    fn apply(&self, script: &mut Script) -> usize {
        let mut converter = Converter::default();
        script.visit_mut(&mut converter);
        converter.changed
    }
}

#[derive(Default)]
struct Converter {
    changed: usize,
}

impl VisitorMut for Converter {
    fn query(&mut self, query: &mut Query) {
        if let Some(limit) = &mut query.limit
            && limit.style == LimitStyle::FetchFirst
        {
            limit.style = LimitStyle::LimitOffset;
            self.changed += 1;
        }
    }

    fn set_operation(&mut self, op: &mut SetOperation) {
        if op.op == SetOperator::Minus {
            op.op = SetOperator::Except;
            self.changed += 1;
        }
    }

    fn data_type(&mut self, data_type: &mut DataType) {
        if data_type.is("CLOB") {
            *data_type = DataType::new("TEXT");
            self.changed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::FormatStyle;
    use crate::dialect::Dialect;
    use crate::transformer::rewrite_sql;

    fn convert(sql: &str) -> Option<String> {
        rewrite_sql(&Db2ToPostgres, sql, Dialect::Db2, &FormatStyle::default()).unwrap()
    }

    #[test]
    fn test_fetch_first_to_limit() {
        assert_eq!(
            convert("select a from t order by a fetch first 10 rows only").as_deref(),
            Some("SELECT a\nFROM t\nORDER BY a\nLIMIT 10")
        );
        assert_eq!(
            convert("select a from t offset 5 rows fetch next 1 row only").as_deref(),
            Some("SELECT a\nFROM t\nLIMIT 1 OFFSET 5")
        );
    }

    #[test]
    fn test_minus_to_except() {
        assert_eq!(
            convert("select a from t minus select a from u").as_deref(),
            Some("SELECT a\nFROM t\nEXCEPT\nSELECT a\nFROM u")
        );
    }

    #[test]
    fn test_clob_to_text() {
        let expected = r#"
CREATE TABLE docs (
  id INTEGER NOT NULL,
  body TEXT
)
"#;
        assert_eq!(
            convert("create table docs (id integer not null, body clob(1M))").as_deref(),
            Some(expected.trim())
        );
    }

    #[test]
    fn test_nested_queries_converted() {
        assert_eq!(
            convert("select * from t where id in (select id from u fetch first 3 rows only)").as_deref(),
            Some("SELECT *\nFROM t\nWHERE id IN (SELECT id FROM u LIMIT 3)")
        );
    }

    #[test]
    fn test_nothing_to_convert() {
        assert_eq!(convert("select a from t"), None);
    }
}
