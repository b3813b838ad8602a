//! Configuration types for disallowed-calls.

use crate::registry::config_dto::RawCallDto;
use crate::rule::ModelError;
use crate::types::{CallKind, Severity};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level configuration.
///
/// ```toml
/// severity = "error"
///
/// [[function]]
/// function = "var_dump"
/// message = "use the logger instead"
///
/// [[static]]
/// method = "Royale::withCheese()"
/// allow-in = ["src/kitchen/*.php"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Severity of reported violations (default: "error").
    #[serde(default)]
    pub severity: Severity,

    /// Disallowed function calls, `[[function]]`.
    #[serde(default, rename = "function")]
    pub functions: Vec<RawCallDto>,

    /// Disallowed instance method calls, `[[method]]`.
    #[serde(default, rename = "method")]
    pub methods: Vec<RawCallDto>,

    /// Disallowed static method calls, `[[static]]`.
    #[serde(default, rename = "static")]
    pub statics: Vec<RawCallDto>,
}

impl Config {
    /// Creates a new default configuration (no rules).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Returns the raw entries configured for a kind of call.
    #[must_use]
    pub fn entries(&self, kind: CallKind) -> &[RawCallDto] {
        match kind {
            CallKind::Function => &self.functions,
            CallKind::Method => &self.methods,
            CallKind::Static => &self.statics,
        }
    }

    /// Returns the total number of configured entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len() + self.methods.len() + self.statics.len()
    }

    /// Returns `true` if no rule is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Configuration errors. All of them abort setup before any call is checked.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(code(disallowed_calls::config::io))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    #[diagnostic(code(disallowed_calls::config::parse))]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// An entry names neither a function nor a method.
    #[error("{context}: either `method` or `function` must be set")]
    #[diagnostic(
        code(disallowed_calls::config::missing_identifier),
        help("add `function = \"name\"` or `method = \"Class::name\"` to the entry")
    )]
    MissingIdentifier {
        /// Which entry (e.g., "static[2]").
        context: String,
    },

    /// A field failed validation.
    #[error("{context}: {source}")]
    #[diagnostic(code(disallowed_calls::config::invalid_field))]
    Validation {
        /// Where the error occurred (e.g., "function[0].allow-in[1]").
        context: String,
        /// The underlying model error.
        source: ModelError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.severity, Severity::Error);
        assert!(config.is_empty());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
severity = "warning"

[[function]]
function = "var_dump"
message = "use logger"

[[method]]
method = "PDO::query"

[[static]]
method = "Royale::withCheese()"
allow-in = ["src/kitchen/*.php"]

[[static]]
method = "Royale::withoutCheese"
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.severity, Severity::Warning);
        assert_eq!(config.entries(CallKind::Function).len(), 1);
        assert_eq!(config.entries(CallKind::Method).len(), 1);
        assert_eq!(config.entries(CallKind::Static).len(), 2);
        assert_eq!(config.len(), 4);
    }

    #[test]
    fn test_parse_error() {
        let err = Config::parse("[[function]\nfunction = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_unknown_severity_is_parse_error() {
        let err = Config::parse("severity = \"fatal\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file(Path::new("/nonexistent/disallowed-calls.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
