//! Core types for disallowed-call violations and results.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level for violations.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail the check.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    #[default]
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Source code location of a call site, as reported by the host analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path, absolute or relative to the project root.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl Location {
    /// Creates a new location with explicit values.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

/// The kind of call a rule list applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallKind {
    /// Plain function call, `foo()`.
    Function,
    /// Instance method call, `$obj->foo()`.
    Method,
    /// Static method call, `Foo::bar()`.
    Static,
}

impl CallKind {
    /// Returns the kebab-case rule name reported for this kind of call.
    #[must_use]
    pub fn rule_name(self) -> &'static str {
        match self {
            Self::Function => "disallowed-function-call",
            Self::Method => "disallowed-method-call",
            Self::Static => "disallowed-static-call",
        }
    }

    /// Returns the rule code (e.g., "DC001").
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Function => "DC001",
            Self::Method => "DC002",
            Self::Static => "DC003",
        }
    }

    /// Returns the configuration section holding rules for this kind.
    #[must_use]
    pub fn section(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Method => "method",
            Self::Static => "static",
        }
    }
}

impl std::fmt::Display for CallKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.section())
    }
}

/// A disallowed call found during analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Rule code (e.g., "DC001").
    pub code: String,
    /// Rule name (e.g., "disallowed-function-call").
    pub rule: String,
    /// Severity of this violation.
    pub severity: Severity,
    /// Location of the offending call.
    pub location: Location,
    /// Human-readable message.
    pub message: String,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            severity,
            location,
            message: message.into(),
        }
    }

    /// Creates a violation for a call of the given kind.
    #[must_use]
    pub fn for_call(
        kind: CallKind,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self::new(kind.code(), kind.rule_name(), severity, location, message)
    }

    /// Two-line text report: rule header, then severity and message.
    #[must_use]
    pub fn format(&self) -> String {
        format!(
            "{} {} at {}:{}:{}\n  {}: {}\n",
            self.code,
            self.rule,
            self.location.file.display(),
            self.location.line,
            self.location.column,
            self.severity,
            self.message
        )
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}] {}",
            self.location.file.display(),
            self.location.line,
            self.location.column,
            self.severity,
            self.code,
            self.message
        )
    }
}

/// Result of checking a batch of call sites.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// All violations found, sorted by location.
    pub violations: Vec<Violation>,
    /// Number of call sites checked.
    pub calls_checked: usize,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has_violations_at(Severity::Error)
    }

    /// Checks if any violations meet or exceed the given severity threshold.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.violations.iter().any(|v| v.severity >= severity)
    }

    /// Counts violations by severity.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        let count = |severity| {
            self.violations
                .iter()
                .filter(|v| v.severity == severity)
                .count()
        };
        (
            count(Severity::Error),
            count(Severity::Warning),
            count(Severity::Info),
        )
    }

    /// Sorts violations by file, then line, then column.
    pub fn sort(&mut self) {
        self.violations.sort_by(|a, b| {
            a.location
                .file
                .cmp(&b.location.file)
                .then(a.location.line.cmp(&b.location.line))
                .then(a.location.column.cmp(&b.location.column))
        });
    }

    /// Adds violations from another result.
    pub fn extend(&mut self, other: Self) {
        self.violations.extend(other.violations);
        self.calls_checked += other.calls_checked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_violation(severity: Severity, line: usize) -> Violation {
        Violation::for_call(
            CallKind::Function,
            severity,
            Location::new("src/index.php", line, 5),
            "Calling var_dump() is forbidden, use logger",
        )
    }

    #[test]
    fn violation_for_call_uses_kind_code_and_name() {
        let v = make_violation(Severity::Error, 3);
        assert_eq!(v.code, "DC001");
        assert_eq!(v.rule, "disallowed-function-call");
    }

    #[test]
    fn violation_display_is_compact() {
        let v = make_violation(Severity::Warning, 12);
        assert_eq!(
            v.to_string(),
            "src/index.php:12:5: warning [DC001] Calling var_dump() is forbidden, use logger"
        );
    }

    #[test]
    fn violation_format_has_header_and_message() {
        assert_eq!(
            make_violation(Severity::Error, 7).format(),
            "DC001 disallowed-function-call at src/index.php:7:5\n  error: Calling var_dump() is forbidden, use logger\n"
        );
    }

    #[test]
    fn has_violations_at_respects_threshold() {
        let mut result = LintResult::new();
        result.violations.push(make_violation(Severity::Warning, 1));
        assert!(!result.has_errors());
        assert!(result.has_violations_at(Severity::Warning));
        assert!(result.has_violations_at(Severity::Info));
    }

    #[test]
    fn sort_orders_by_line() {
        let mut result = LintResult::new();
        result.violations.push(make_violation(Severity::Error, 9));
        result.violations.push(make_violation(Severity::Error, 2));
        result.sort();
        let lines: Vec<usize> = result.violations.iter().map(|v| v.location.line).collect();
        assert_eq!(lines, vec![2, 9]);
    }

    #[test]
    fn count_by_severity_splits_levels() {
        let mut result = LintResult::new();
        result.violations.push(make_violation(Severity::Error, 1));
        result.violations.push(make_violation(Severity::Error, 2));
        result.violations.push(make_violation(Severity::Info, 3));
        assert_eq!(result.count_by_severity(), (2, 0, 1));
    }
}
