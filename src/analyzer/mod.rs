//! Analysis of parsed SQL and discovery of SQL inside other files.
//!
//! - [`detector`]: is a string SQL at all?
//! - [`columns`]: which table columns a script reads or writes
//! - [`functions`]: function calls matching a name glob
//! - [`locator`]: SQL regions inside Java and YAML sources
//! - [`scanner`]: the locator applied to files and directory trees

pub mod columns;
pub mod detector;
pub mod functions;
pub mod locator;
pub mod scanner;

pub use columns::{ColumnUsage, columns_used};
pub use detector::SqlDetector;
pub use functions::{FunctionMatch, FunctionPattern, find_functions};
pub use locator::{EmbeddedSql, HostKind, RegionKind, SqlLocator, format_text_blocks, locate};
pub use scanner::{FileReport, SqlScanner, source_files};
