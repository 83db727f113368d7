use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use rewrite_sql::analyzer::{FunctionPattern, RegionKind, SqlScanner, format_text_blocks, source_files};
use rewrite_sql::prelude::*;
use rewrite_sql::transformer::rewrite_embedded;

const REPO_JAVA: &str = r#"class Repo {
    String byId = "select nvl(name, '-') from users where id = ?";
    String label = "Please select a user";
    String report = """
        select nvl(total, 0) from orders
        """;
}
"#;

const QUERIES_YAML: &str = "queries:
  count: select count(*) from users
  purge: |
    delete from sessions where expires < ?
  title: Reports
";

fn project(name: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("rewrite-sql-it-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&root);
    fs::create_dir_all(root.join("src/main")).unwrap();
    fs::write(root.join("src/main/Repo.java"), REPO_JAVA).unwrap();
    fs::write(root.join("src/main/queries.yml"), QUERIES_YAML).unwrap();
    fs::write(root.join("README.txt"), "select a from t").unwrap();
    root
}

#[test]
fn test_locate_java_regions() {
    let regions = locate(REPO_JAVA, HostKind::Java, Dialect::Standard).unwrap();
    let found: Vec<_> = regions.iter().map(|r| (r.line, r.kind, r.text.as_str())).collect();
    assert_eq!(
        found,
        vec![
            (2, RegionKind::StringLiteral, "select nvl(name, '-') from users where id = ?"),
            (5, RegionKind::TextBlock, "select nvl(total, 0) from orders\n"),
        ]
    );
}

#[test]
fn test_locate_yaml_regions() {
    let regions = locate(QUERIES_YAML, HostKind::Yaml, Dialect::Standard).unwrap();
    let kinds: Vec<_> = regions.iter().map(|r| (r.line, r.kind)).collect();
    assert_eq!(kinds, vec![(2, RegionKind::PlainScalar), (4, RegionKind::BlockScalar)]);
    assert_eq!(regions[1].text.trim_end(), "delete from sessions where expires < ?");
}

#[test]
fn test_scan_project_and_analyze() {
    let root = project("scan");
    let scanner = SqlScanner::new(Dialect::Standard).unwrap();
    let reports = scanner.scan(&root).unwrap();
    let files: Vec<_> = reports
        .iter()
        .map(|r| r.file.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(files, vec!["Repo.java", "queries.yml"]);

    let yaml = &reports[1];
    let purge = scanner.locator().detector().parse(&yaml.occurrences[1].text).unwrap();
    let usage = columns_used(&purge);
    assert_eq!(usage.len(), 1);
    assert_eq!((usage[0].operation, usage[0].table.as_str(), usage[0].column.as_deref()), ("DELETE", "sessions", None));

    let pattern = FunctionPattern::new("n*").unwrap();
    let calls: Vec<_> = reports[0]
        .occurrences
        .iter()
        .filter_map(|o| scanner.locator().detector().parse(&o.text))
        .flat_map(|script| find_functions(&script, &pattern))
        .map(|call| (call.name, call.arguments))
        .collect();
    assert_eq!(calls, vec![("nvl".to_string(), 2), ("nvl".to_string(), 2)]);

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_rename_function_across_project() {
    let root = project("rename");
    let rule = ChangeFunctionName::new("nvl", "coalesce").unwrap();
    let locator = SqlLocator::new(Dialect::Standard).unwrap();
    let style = FormatStyle::default();

    let mut rewritten = Vec::new();
    for file in source_files(&root) {
        let host = HostKind::from_path(&file).unwrap();
        let content = fs::read_to_string(&file).unwrap();
        if let Some(new) = rewrite_embedded(&rule, &content, host, &locator, &style).unwrap() {
            rewritten.push(new);
        }
    }

    let expected = r#"class Repo {
    String byId = "SELECT coalesce(name, '-') FROM users WHERE id = ?";
    String label = "Please select a user";
    String report = """
        SELECT coalesce(total, 0)
        FROM orders
        """;
}
"#;
    assert_eq!(rewritten, vec![expected.to_string()]);

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_format_text_blocks_leaves_literals_alone() {
    let output = format_text_blocks(REPO_JAVA, Dialect::Standard, &FormatStyle::default()).unwrap();
    assert!(output.contains("String byId = \"select nvl(name, '-') from users where id = ?\";"));
    assert!(output.contains("        SELECT nvl(total, 0)\n        FROM orders\n        \"\"\";"));
}

#[test]
fn test_db2_migration() {
    let sql = "select id from t1 minus select id from t2 fetch first 5 rows only";
    let converted = rewrite_sql(&Db2ToPostgres, sql, Dialect::Db2, &FormatStyle::default())
        .unwrap()
        .unwrap();
    assert_eq!(converted, "SELECT id\nFROM t1\nEXCEPT\nSELECT id\nFROM t2\nLIMIT 5");
    assert!(parse(&converted, Dialect::PostgreSql).is_ok());
}
