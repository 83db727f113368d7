//! Walks files and directories looking for embedded SQL.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::locator::{EmbeddedSql, HostKind, SqlLocator};
use crate::dialect::Dialect;
use crate::error::SqlResult;

/// Directories never descended into.
const SKIPPED_DIRS: [&str; 6] = ["target", "node_modules", ".git", "vendor", "build", "dist"];

/// SQL found in one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: PathBuf,
    pub host: HostKind,
    pub occurrences: Vec<EmbeddedSql>,
}

/// Scanner over SQL, Java and YAML files.
#[derive(Debug, Clone)]
pub struct SqlScanner {
    locator: SqlLocator,
}

impl SqlScanner {
    pub fn new(dialect: Dialect) -> SqlResult<Self> {
        Ok(Self {
            locator: SqlLocator::new(dialect)?,
        })
    }

    pub fn locator(&self) -> &SqlLocator {
        &self.locator
    }

    /// Scan a file or a directory tree. Files without SQL are left out.
    pub fn scan(&self, path: &Path) -> SqlResult<Vec<FileReport>> {
        let mut reports = Vec::new();
        for file in source_files(path) {
            if let Some(report) = self.scan_file(&file)?
                && !report.occurrences.is_empty()
            {
                reports.push(report);
            }
        }
        tracing::debug!(path = %path.display(), files = reports.len(), "scan finished");
        Ok(reports)
    }

    /// `None` when the extension is not a supported host kind.
    pub fn scan_file(&self, path: &Path) -> SqlResult<Option<FileReport>> {
        let Some(host) = HostKind::from_path(path) else {
            return Ok(None);
        };
        let content = fs::read_to_string(path)?;
        Ok(Some(FileReport {
            file: path.to_path_buf(),
            host,
            occurrences: self.locator.locate(&content, host),
        }))
    }
}

/// Supported host files under `path` in a stable order. A file path is
/// returned as is when its extension is supported.
pub fn source_files(path: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if path.is_file() {
        if HostKind::from_path(path).is_some() {
            files.push(path.to_path_buf());
        }
    } else if path.is_dir() {
        collect_dir(path, &mut files);
    }
    files
}

fn collect_dir(dir: &Path, files: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(err) => {
            tracing::warn!(dir = %dir.display(), %err, "skipping unreadable directory");
            return;
        }
    };
    let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if SKIPPED_DIRS.contains(&name) {
                continue;
            }
            collect_dir(&path, files);
        } else if HostKind::from_path(&path).is_some() {
            files.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_tree(name: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("rewrite-sql-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("target")).unwrap();
        root
    }

    #[test]
    fn test_scan_directory_tree() {
        let root = temp_tree("scan");
        fs::write(
            root.join("src/Repo.java"),
            "class Repo { String q = \"select a from t\"; }",
        )
        .unwrap();
        fs::write(root.join("src/app.yml"), "query: delete from t\n").unwrap();
        fs::write(root.join("src/notes.txt"), "select a from t").unwrap();
        fs::write(root.join("src/empty.sql"), "-- nothing but prose").unwrap();
        fs::write(root.join("target/Gen.java"), "String q = \"select 1\";").unwrap();

        let reports = SqlScanner::new(Dialect::Standard).unwrap().scan(&root).unwrap();
        let names: Vec<_> = reports
            .iter()
            .map(|r| r.file.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["Repo.java", "app.yml"]);
        assert_eq!(reports[1].host, HostKind::Yaml);
        assert_eq!(reports[1].occurrences[0].text, "delete from t");

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_source_files_for_single_file() {
        let root = temp_tree("single");
        let file = root.join("src/query.sql");
        fs::write(&file, "select 1").unwrap();
        assert_eq!(source_files(&file), vec![file.clone()]);
        assert!(source_files(&root.join("src/missing.txt")).is_empty());
        fs::remove_dir_all(&root).unwrap();
    }
}
