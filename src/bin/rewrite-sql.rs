//! rewrite-sql: format, inspect and rewrite SQL
//!
//! # Usage
//!
//! ```bash
//! # Format a file (or stdin) with the project style
//! rewrite-sql format query.sql --max-line-length 60
//! echo "select a,b from t" | rewrite-sql format
//!
//! # Find SQL embedded in Java/YAML sources
//! rewrite-sql find src/ --json
//!
//! # Rename a function everywhere
//! rewrite-sql rename-function --from nvl --to coalesce src/
//! ```

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use rewrite_sql::analyzer::{
    ColumnUsage, FunctionPattern, HostKind, RegionKind, SqlLocator, SqlScanner, columns_used,
    find_functions, source_files,
};
use rewrite_sql::config::{CommaStyle, Config, FormatStyle, KeywordCase};
use rewrite_sql::dialect::Dialect;
use rewrite_sql::lexer::{TokenKind, tokenize};
use rewrite_sql::transformer::{ChangeFunctionName, Db2ToPostgres, rewrite_embedded, rewrite_sql};
use rewrite_sql::{format_sql, parse};

#[derive(Parser)]
#[command(name = "rewrite-sql")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Format, inspect and rewrite SQL, including SQL embedded in Java and YAML")]
#[command(after_help = "EXAMPLES:
    rewrite-sql format query.sql              # Print formatted SQL
    rewrite-sql format --check query.sql      # Exit 1 if not formatted
    rewrite-sql find src/                     # List embedded SQL
    rewrite-sql db2-to-postgres legacy.sql    # Convert Db2 syntax")]
struct Cli {
    /// Debug logging on stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format SQL from a file or stdin
    Format {
        /// Input file, `-` or nothing for stdin
        file: Option<PathBuf>,
        /// Exit with status 1 when the input is not already formatted
        #[arg(long)]
        check: bool,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Print the token stream
    Tokens {
        file: Option<PathBuf>,
        #[arg(short, long)]
        dialect: Option<String>,
    },
    /// Print the AST as JSON
    Parse {
        file: Option<PathBuf>,
        #[arg(short, long)]
        dialect: Option<String>,
    },
    /// Locate SQL embedded in .sql, .java and .yml/.yaml files
    Find {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(short, long)]
        dialect: Option<String>,
        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },
    /// Find function calls by name glob
    Functions {
        /// Name glob, e.g. `nvl` or `to_*`
        #[arg(short, long)]
        name: String,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(short, long)]
        dialect: Option<String>,
    },
    /// Rename function calls in place
    RenameFunction {
        /// Name glob to replace
        #[arg(long)]
        from: String,
        /// New function name
        #[arg(long)]
        to: String,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Print rewritten files instead of writing them
        #[arg(long)]
        dry_run: bool,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Convert Db2 SQL to PostgreSQL
    Db2ToPostgres {
        file: Option<PathBuf>,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// List supported dialects
    Dialects,
}

/// Style overrides on top of the config file.
#[derive(Args, Clone)]
struct StyleArgs {
    /// SQL dialect (see `rewrite-sql dialects`)
    #[arg(short, long)]
    dialect: Option<String>,
    /// Spaces per indentation level
    #[arg(long, allow_negative_numbers = true)]
    indent: Option<i64>,
    /// Wrap clauses longer than this
    #[arg(long, allow_negative_numbers = true)]
    max_line_length: Option<i64>,
    /// Never wrap clauses
    #[arg(long, conflicts_with = "max_line_length")]
    no_wrap: bool,
    #[arg(long, value_enum)]
    keyword_case: Option<CliKeywordCase>,
    #[arg(long, value_enum)]
    comma_style: Option<CliCommaStyle>,
    /// Config file (default: ./rewrite-sql.toml, then the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum CliKeywordCase {
    Upper,
    Lower,
    Preserve,
}

impl From<CliKeywordCase> for KeywordCase {
    fn from(val: CliKeywordCase) -> Self {
        match val {
            CliKeywordCase::Upper => KeywordCase::Upper,
            CliKeywordCase::Lower => KeywordCase::Lower,
            CliKeywordCase::Preserve => KeywordCase::Preserve,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CliCommaStyle {
    Leading,
    Trailing,
}

impl From<CliCommaStyle> for CommaStyle {
    fn from(val: CliCommaStyle) -> Self {
        match val {
            CliCommaStyle::Leading => CommaStyle::Leading,
            CliCommaStyle::Trailing => CommaStyle::Trailing,
        }
    }
}

impl StyleArgs {
    /// Config file values with flags applied, validated before any parsing.
    fn resolve(&self) -> Result<(Dialect, FormatStyle)> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::discover()?,
        };
        if let Some(dialect) = &self.dialect {
            config.dialect = dialect.clone();
        }
        let (dialect, base) = config.resolve()?;
        let max_line_length = if self.no_wrap {
            None
        } else {
            self.max_line_length
                .or(base.max_line_length.map(|n| n as i64))
        };
        let style = FormatStyle::from_raw(
            self.indent.unwrap_or(base.indent_width as i64),
            max_line_length,
            self.keyword_case.map(Into::into).unwrap_or(base.keyword_case),
            self.comma_style.map(Into::into).unwrap_or(base.comma_style),
        )?;
        Ok((dialect, style))
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("rewrite_sql=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Format { file, check, style } => {
            let (dialect, style) = style.resolve()?;
            let (name, source) = read_input(file.as_deref())?;
            let formatted = format_sql(&source, dialect, &style).with_context(|| name.clone())?;
            if *check {
                if formatted != source.trim_end_matches(['\n', '\r']) {
                    eprintln!("{} {}", "Would reformat:".yellow().bold(), name);
                    std::process::exit(1);
                }
                eprintln!("{} {}", "Already formatted:".green(), name);
            } else {
                println!("{}", formatted);
            }
        }
        Commands::Tokens { file, dialect } => {
            let dialect = dialect_arg(dialect.as_deref())?;
            let (name, source) = read_input(file.as_deref())?;
            print_tokens(&source, dialect).with_context(|| name)?;
        }
        Commands::Parse { file, dialect } => {
            let dialect = dialect_arg(dialect.as_deref())?;
            let (name, source) = read_input(file.as_deref())?;
            let script = parse(&source, dialect).with_context(|| name)?;
            println!("{}", serde_json::to_string_pretty(&script)?);
        }
        Commands::Find {
            paths,
            dialect,
            json,
        } => find_sql(paths, dialect_arg(dialect.as_deref())?, *json)?,
        Commands::Functions {
            name,
            paths,
            dialect,
        } => find_function_calls(name, paths, dialect_arg(dialect.as_deref())?)?,
        Commands::RenameFunction {
            from,
            to,
            paths,
            dry_run,
            style,
        } => {
            let (dialect, style) = style.resolve()?;
            rename_function(from, to, paths, dialect, &style, *dry_run)?;
        }
        Commands::Db2ToPostgres { file, style } => {
            let (_, style) = style.resolve()?;
            let (name, source) = read_input(file.as_deref())?;
            let converted = match rewrite_sql(&Db2ToPostgres, &source, Dialect::Db2, &style)
                .with_context(|| name.clone())?
            {
                Some(sql) => sql,
                None => format_sql(&source, Dialect::Db2, &style).with_context(|| name)?,
            };
            println!("{}", converted);
        }
        Commands::Dialects => show_dialects(),
    }

    Ok(())
}

/// `(display name, contents)` of a file, or of stdin for `None` and `-`.
fn read_input(file: Option<&Path>) -> Result<(String, String)> {
    match file {
        Some(path) if path != Path::new("-") => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok((path.display().to_string(), source))
        }
        _ => {
            let mut source = String::new();
            std::io::stdin().read_to_string(&mut source)?;
            Ok(("<stdin>".to_string(), source))
        }
    }
}

fn dialect_arg(name: Option<&str>) -> Result<Dialect> {
    match name {
        Some(name) => Ok(name.parse()?),
        None => {
            let (dialect, _) = Config::discover()?.resolve()?;
            Ok(dialect)
        }
    }
}

fn print_tokens(source: &str, dialect: Dialect) -> Result<()> {
    for token in tokenize(source, dialect)? {
        if token.kind == TokenKind::Whitespace {
            continue;
        }
        let kind = match token.kind {
            TokenKind::Keyword => "keyword".cyan(),
            TokenKind::Identifier { quoted: true } => "quoted-identifier".white(),
            TokenKind::Identifier { quoted: false } => "identifier".white(),
            TokenKind::StringLiteral => "string".green(),
            TokenKind::NumericLiteral => "number".green(),
            TokenKind::Parameter => "parameter".magenta(),
            TokenKind::Operator => "operator".yellow(),
            TokenKind::Punctuation => "punctuation".yellow(),
            TokenKind::Comment => "comment".dimmed(),
            TokenKind::Whitespace => "whitespace".dimmed(),
        };
        println!(
            "{:>4}:{:<4} {:18} {}",
            token.line,
            token.column,
            kind,
            token.text
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct FoundSql {
    file: PathBuf,
    line: usize,
    column: usize,
    kind: RegionKind,
    sql: String,
    columns: Vec<ColumnUsage>,
}

fn find_sql(paths: &[PathBuf], dialect: Dialect, json: bool) -> Result<()> {
    let scanner = SqlScanner::new(dialect)?;
    let mut found = Vec::new();
    for path in paths {
        for report in scanner.scan(path)? {
            for occurrence in report.occurrences {
                let columns = scanner
                    .locator()
                    .detector()
                    .parse(&occurrence.text)
                    .map(|script| columns_used(&script))
                    .unwrap_or_default();
                found.push(FoundSql {
                    file: report.file.clone(),
                    line: occurrence.line,
                    column: occurrence.column,
                    kind: occurrence.kind,
                    sql: occurrence.text,
                    columns,
                });
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }
    for item in &found {
        println!(
            "{} {}",
            format!("{}:{}:{}", item.file.display(), item.line, item.column).cyan(),
            format!("{:?}", item.kind).dimmed()
        );
        for line in item.sql.trim().lines() {
            println!("    {}", line.white());
        }
        for usage in &item.columns {
            println!(
                "    {} {}.{}",
                usage.operation.green(),
                usage.table,
                usage.column.as_deref().unwrap_or("*")
            );
        }
    }
    println!();
    println!("{} {} SQL occurrence(s)", "Found".green().bold(), found.len());
    Ok(())
}

fn find_function_calls(glob: &str, paths: &[PathBuf], dialect: Dialect) -> Result<()> {
    let pattern = FunctionPattern::new(glob)?;
    let locator = SqlLocator::new(dialect)?;
    let mut total = 0;
    for file in paths.iter().flat_map(|p| source_files(p)) {
        let Some(host) = HostKind::from_path(&file) else {
            continue;
        };
        let content = fs::read_to_string(&file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        for occurrence in locator.locate(&content, host) {
            let Some(script) = locator.detector().parse(&occurrence.text) else {
                continue;
            };
            for call in find_functions(&script, &pattern) {
                total += 1;
                println!(
                    "{} {}({} argument{})",
                    format!("{}:{}", file.display(), occurrence.line).cyan(),
                    call.name.yellow(),
                    call.arguments,
                    if call.arguments == 1 { "" } else { "s" }
                );
            }
        }
    }
    println!("{} {} call(s) matching {}", "Found".green().bold(), total, glob);
    Ok(())
}

fn rename_function(
    from: &str,
    to: &str,
    paths: &[PathBuf],
    dialect: Dialect,
    style: &FormatStyle,
    dry_run: bool,
) -> Result<()> {
    let rule = ChangeFunctionName::new(from, to)?;
    let locator = SqlLocator::new(dialect)?;
    let mut changed_files = 0;
    for file in paths.iter().flat_map(|p| source_files(p)) {
        let Some(host) = HostKind::from_path(&file) else {
            continue;
        };
        let content = fs::read_to_string(&file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let Some(rewritten) = rewrite_embedded(&rule, &content, host, &locator, style)? else {
            continue;
        };
        changed_files += 1;
        if dry_run {
            println!("{}", format!("--- {}", file.display()).cyan().bold());
            println!("{}", rewritten);
        } else {
            fs::write(&file, rewritten)
                .with_context(|| format!("Failed to write {}", file.display()))?;
            println!("{} {}", "Rewrote".green(), file.display());
        }
    }
    println!(
        "{} {} -> {} in {} file(s)",
        "Renamed".green().bold(),
        from,
        to,
        changed_files
    );
    Ok(())
}

fn show_dialects() {
    println!("{:12} {}", "Dialect".white().bold(), "Aliases".white().bold());
    println!("{}", "─".repeat(40).dimmed());
    for dialect in Dialect::ALL {
        println!(
            "{:12} {}",
            dialect.name().cyan().bold(),
            dialect.aliases().join(", ").dimmed()
        );
    }
}
