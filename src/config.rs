//! Formatting style and configuration loading.
//!
//! A project keeps its settings in `rewrite-sql.toml`:
//!
//! ```toml
//! dialect = "postgresql"
//!
//! [style]
//! indent-width = 4
//! max-line-length = 100
//! keyword-case = "upper"
//! comma-style = "trailing"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::error::{ConfigError, SqlResult};

/// Project-local config file name.
pub const CONFIG_FILE: &str = "rewrite-sql.toml";

/// How keywords are cased on output. Identifiers and string contents are never touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordCase {
    #[default]
    Upper,
    Lower,
    /// Follow the case of the first keyword in the parsed input.
    Preserve,
}

/// Where the separating comma goes when a list is broken one item per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommaStyle {
    Leading,
    #[default]
    Trailing,
}

/// Layout options for one formatting call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FormatStyle {
    /// Spaces per nesting level.
    pub indent_width: usize,
    /// `None` means lines are never wrapped.
    pub max_line_length: Option<usize>,
    pub keyword_case: KeywordCase,
    pub comma_style: CommaStyle,
}

impl Default for FormatStyle {
    fn default() -> Self {
        Self {
            indent_width: 2,
            max_line_length: Some(80),
            keyword_case: KeywordCase::Upper,
            comma_style: CommaStyle::Trailing,
        }
    }
}

impl FormatStyle {
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    pub fn with_max_line_length(mut self, max: Option<usize>) -> Self {
        self.max_line_length = max;
        self
    }

    pub fn with_keyword_case(mut self, case: KeywordCase) -> Self {
        self.keyword_case = case;
        self
    }

    pub fn with_comma_style(mut self, style: CommaStyle) -> Self {
        self.comma_style = style;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_line_length == Some(0) {
            return Err(ConfigError::new("max-line-length must be greater than 0"));
        }
        if self.indent_width > 64 {
            return Err(ConfigError::new(format!(
                "indent-width {} is out of range (0..=64)",
                self.indent_width
            )));
        }
        Ok(())
    }

    /// Build a style from signed CLI-style values, rejecting negative widths.
    pub fn from_raw(
        indent_width: i64,
        max_line_length: Option<i64>,
        keyword_case: KeywordCase,
        comma_style: CommaStyle,
    ) -> Result<Self, ConfigError> {
        let indent_width = usize::try_from(indent_width)
            .map_err(|_| ConfigError::new(format!("indent-width must not be negative, got {}", indent_width)))?;
        let max_line_length = match max_line_length {
            None => None,
            Some(n) if n <= 0 => {
                return Err(ConfigError::new(format!(
                    "max-line-length must be greater than 0, got {}",
                    n
                )));
            }
            Some(n) => Some(n as usize),
        };
        let style = Self {
            indent_width,
            max_line_length,
            keyword_case,
            comma_style,
        };
        style.validate()?;
        Ok(style)
    }
}

/// On-disk configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub dialect: String,
    pub style: FormatStyle,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialect: Dialect::Standard.name().to_string(),
            style: FormatStyle::default(),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> SqlResult<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> SqlResult<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), dialect = %config.dialect, "loaded config");
        Ok(config)
    }

    /// `./rewrite-sql.toml`, then `<config dir>/rewrite-sql/config.toml`, then defaults.
    pub fn discover() -> SqlResult<Self> {
        match Self::default_paths().into_iter().find(|p| p.exists()) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("rewrite-sql").join("config.toml"));
        }
        paths
    }

    /// Validate everything up front so no bad setting surfaces mid-parse.
    pub fn resolve(&self) -> Result<(Dialect, FormatStyle), ConfigError> {
        let dialect: Dialect = self.dialect.parse()?;
        self.style.validate()?;
        Ok((dialect, self.style.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style() {
        let style = FormatStyle::default();
        assert_eq!(style.indent_width, 2);
        assert_eq!(style.max_line_length, Some(80));
        assert_eq!(style.keyword_case, KeywordCase::Upper);
        assert_eq!(style.comma_style, CommaStyle::Trailing);
        assert!(style.validate().is_ok());
    }

    #[test]
    fn test_config_from_toml() {
        let config = Config::from_toml(
            r#"
dialect = "postgres"

[style]
indent-width = 4
keyword-case = "lower"
comma-style = "leading"
"#,
        )
        .unwrap();
        let (dialect, style) = config.resolve().unwrap();
        assert_eq!(dialect, Dialect::PostgreSql);
        assert_eq!(style.indent_width, 4);
        assert_eq!(style.max_line_length, Some(80));
        assert_eq!(style.keyword_case, KeywordCase::Lower);
        assert_eq!(style.comma_style, CommaStyle::Leading);
    }

    #[test]
    fn test_negative_indent_is_rejected() {
        let err = FormatStyle::from_raw(-2, None, KeywordCase::Upper, CommaStyle::Trailing).unwrap_err();
        assert!(err.message.contains("must not be negative"));

        assert!(Config::from_toml("[style]\nindent-width = -2\n").is_err());
    }

    #[test]
    fn test_zero_line_length_is_rejected() {
        let err = FormatStyle::from_raw(2, Some(0), KeywordCase::Upper, CommaStyle::Trailing).unwrap_err();
        assert!(err.message.contains("max-line-length"));
    }

    #[test]
    fn test_unknown_dialect_fails_at_setup() {
        let config = Config {
            dialect: "klingon".into(),
            ..Config::default()
        };
        assert!(config.resolve().is_err());
    }
}
