//! Which columns of which tables a script touches.

use serde::Serialize;

use crate::ast::*;

/// One column read or written by a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnUsage {
    /// `SELECT`, `INSERT`, `UPDATE` or `DELETE`.
    pub operation: &'static str,
    pub table: String,
    /// `None` when the whole row is affected (DELETE).
    pub column: Option<String>,
}

impl ColumnUsage {
    fn new(operation: &'static str, table: &ObjectName, column: Option<&str>) -> Self {
        Self {
            operation,
            table: table.base().to_string(),
            column: column.map(str::to_string),
        }
    }
}

/// Column usage in source order.
///
/// SELECT is only reported for selects reading a single named table, since
/// columns cannot be attributed to a table through joins without a catalog.
/// Nested selects are reported on their own.
pub fn columns_used(script: &Script) -> Vec<ColumnUsage> {
    let mut collector = ColumnCollector::default();
    script.visit(&mut collector);
    collector.usages
}

#[derive(Default)]
struct ColumnCollector {
    usages: Vec<ColumnUsage>,
}

impl ColumnCollector {
    fn select(&mut self, select: &Select) {
        let [
            TableWithJoins {
                relation: TableFactor::Table { name, .. },
                joins,
            },
        ] = select.from.as_slice()
        else {
            return;
        };
        if !joins.is_empty() {
            return;
        }
        for item in &select.projection {
            let column = match item {
                SelectItem::Wildcard { .. } => "*",
                SelectItem::Expr {
                    expr: Expr::Column(c),
                    ..
                } => c.name(),
                SelectItem::Expr { .. } => continue,
            };
            self.usages.push(ColumnUsage::new("SELECT", name, Some(column)));
        }
    }
}

impl<'ast> Visitor<'ast> for ColumnCollector {
    fn pre_visit(&mut self, node: Node<'ast>) {
        match node {
            Node::Select(select) => self.select(select),
            Node::Statement(Statement::Insert(insert)) => {
                for column in &insert.columns {
                    self.usages
                        .push(ColumnUsage::new("INSERT", &insert.table, Some(&column.value)));
                }
            }
            Node::Statement(Statement::Update(update)) => {
                for assignment in &update.assignments {
                    self.usages.push(ColumnUsage::new(
                        "UPDATE",
                        &update.table,
                        Some(assignment.column()),
                    ));
                }
            }
            Node::Statement(Statement::Delete(delete)) => {
                self.usages.push(ColumnUsage::new("DELETE", &delete.table, None));
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseOptions, parse_script};

    fn usages(sql: &str) -> Vec<(String, String, Option<String>)> {
        let script = parse_script(sql, &ParseOptions::default()).unwrap();
        columns_used(&script)
            .into_iter()
            .map(|u| (u.operation.to_string(), u.table, u.column))
            .collect()
    }

    fn row(op: &str, table: &str, column: Option<&str>) -> (String, String, Option<String>) {
        (op.to_string(), table.to_string(), column.map(str::to_string))
    }

    #[test]
    fn test_select_columns() {
        assert_eq!(
            usages("select a, t.b, count(*), * from s.t"),
            vec![
                row("SELECT", "t", Some("a")),
                row("SELECT", "t", Some("b")),
                row("SELECT", "t", Some("*")),
            ]
        );
    }

    #[test]
    fn test_select_with_join_is_skipped() {
        assert!(usages("select a from t join u on t.id = u.id").is_empty());
        assert!(usages("select a from t, u").is_empty());
    }

    #[test]
    fn test_subquery_reported_separately() {
        assert_eq!(
            usages("select a from (select b from u) x where a in (select c from v)"),
            vec![row("SELECT", "u", Some("b")), row("SELECT", "v", Some("c"))]
        );
    }

    #[test]
    fn test_dml_columns() {
        assert_eq!(
            usages("insert into t (a, b) values (1, 2); update u set c = 1, d = 2; delete from v"),
            vec![
                row("INSERT", "t", Some("a")),
                row("INSERT", "t", Some("b")),
                row("UPDATE", "u", Some("c")),
                row("UPDATE", "u", Some("d")),
                row("DELETE", "v", None),
            ]
        );
    }
}
