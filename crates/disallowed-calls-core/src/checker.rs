//! The compiled checker that evaluates call sites against all rules.

use crate::call_site::CallSite;
use crate::config::{Config, ConfigError};
use crate::message::disallowed_message;
use crate::origin::{disallowed_method_message, TypeInfo};
use crate::registry;
use crate::rule::{normalize_identifier, DisallowedCall};
use crate::types::{CallKind, LintResult, Severity, Violation};
use crate::utils::paths::{GlobPathMatcher, PathMatcher};

use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while building a checker.
#[derive(Debug, Error)]
pub enum CheckerError {
    /// IO error resolving the project root.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// What was called at a call site.
#[derive(Debug, Clone)]
pub enum CallTarget<T> {
    /// `foo()`, with the host-resolved function name.
    Function {
        /// Resolved function name.
        name: String,
    },
    /// `$receiver->method()`.
    Method {
        /// Inferred receiver type.
        receiver: T,
        /// Method name; `None` if it is an expression.
        method: Option<String>,
    },
    /// `Class::method()`.
    Static {
        /// The referenced class as a type.
        class: T,
        /// Method name; `None` if it is an expression.
        method: Option<String>,
    },
}

/// A call site together with its target.
#[derive(Debug, Clone)]
pub struct Call<T> {
    /// Where the call is and what it was passed.
    pub site: CallSite,
    /// What was called.
    pub target: CallTarget<T>,
}

impl<T> Call<T> {
    /// Returns the kind of call.
    #[must_use]
    pub fn kind(&self) -> CallKind {
        match self.target {
            CallTarget::Function { .. } => CallKind::Function,
            CallTarget::Method { .. } => CallKind::Method,
            CallTarget::Static { .. } => CallKind::Static,
        }
    }
}

/// Builder for configuring a [`DisallowedCalls`] checker.
#[derive(Default)]
pub struct DisallowedCallsBuilder {
    root: Option<PathBuf>,
    config: Option<Config>,
    path_matcher: Option<Box<dyn PathMatcher>>,
    severity: Option<Severity>,
}

impl DisallowedCallsBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the project root `allow-in` patterns are relative to.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces the default glob-based path matcher.
    #[must_use]
    pub fn path_matcher<P: PathMatcher + 'static>(mut self, matcher: P) -> Self {
        self.path_matcher = Some(Box::new(matcher));
        self
    }

    /// Overrides the severity from the configuration.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Compiles the configured rules and builds the checker.
    ///
    /// # Errors
    ///
    /// Returns an error if a rule entry is invalid or the current directory
    /// cannot be resolved for a relative root.
    pub fn build(self) -> Result<DisallowedCalls, CheckerError> {
        let config = self.config.unwrap_or_default();

        let paths = match self.path_matcher {
            Some(matcher) => matcher,
            None => {
                let root = self.root.unwrap_or_else(|| PathBuf::from("."));
                let root = if root.is_absolute() {
                    root
                } else {
                    std::env::current_dir()?.join(&root)
                };
                Box::new(GlobPathMatcher::new(root))
            }
        };

        let checker = DisallowedCalls {
            functions: registry::compile(CallKind::Function.section(), &config.functions)?,
            methods: registry::compile(CallKind::Method.section(), &config.methods)?,
            statics: registry::compile(CallKind::Static.section(), &config.statics)?,
            paths,
            severity: self.severity.unwrap_or(config.severity),
        };

        info!("Compiled {} disallowed-call rule(s)", checker.rule_count());
        Ok(checker)
    }
}

/// Checks call sites against the compiled rule lists.
///
/// Immutable once built; safe to share across threads.
pub struct DisallowedCalls {
    functions: Vec<DisallowedCall>,
    methods: Vec<DisallowedCall>,
    statics: Vec<DisallowedCall>,
    paths: Box<dyn PathMatcher>,
    severity: Severity,
}

impl DisallowedCalls {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> DisallowedCallsBuilder {
        DisallowedCallsBuilder::new()
    }

    /// Returns the rules for a kind of call, in configured order.
    #[must_use]
    pub fn rules(&self, kind: CallKind) -> &[DisallowedCall] {
        match kind {
            CallKind::Function => &self.functions,
            CallKind::Method => &self.methods,
            CallKind::Static => &self.statics,
        }
    }

    /// Returns the total number of compiled rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.functions.len() + self.methods.len() + self.statics.len()
    }

    /// Returns the severity assigned to violations.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Checks a function call.
    #[must_use]
    pub fn check_function(&self, site: &CallSite, name: &str) -> Option<Violation> {
        let name = normalize_identifier(name);
        disallowed_message(site, name, None, &self.functions, self.paths.as_ref())
            .map(|message| self.violation(CallKind::Function, site, message))
    }

    /// Checks an instance method call on an inferred receiver type.
    ///
    /// # Errors
    ///
    /// Propagates reflection errors from the host.
    pub fn check_method<T: TypeInfo>(
        &self,
        site: &CallSite,
        receiver: &T,
        method: Option<&str>,
    ) -> Result<Option<Violation>, T::Error> {
        self.check_resolved(CallKind::Method, site, receiver, method)
    }

    /// Checks a static method call on a class reference.
    ///
    /// # Errors
    ///
    /// Propagates reflection errors from the host.
    pub fn check_static<T: TypeInfo>(
        &self,
        site: &CallSite,
        class: &T,
        method: Option<&str>,
    ) -> Result<Option<Violation>, T::Error> {
        self.check_resolved(CallKind::Static, site, class, method)
    }

    /// Checks any call.
    ///
    /// # Errors
    ///
    /// Propagates reflection errors from the host.
    pub fn check<T: TypeInfo>(&self, call: &Call<T>) -> Result<Option<Violation>, T::Error> {
        match &call.target {
            CallTarget::Function { name } => Ok(self.check_function(&call.site, name)),
            CallTarget::Method { receiver, method } => {
                self.check_method(&call.site, receiver, method.as_deref())
            }
            CallTarget::Static { class, method } => {
                self.check_static(&call.site, class, method.as_deref())
            }
        }
    }

    /// Checks a batch of calls in parallel.
    ///
    /// Each call is evaluated independently; violations are sorted by
    /// location.
    ///
    /// # Errors
    ///
    /// Returns the first reflection error encountered.
    pub fn check_all<T>(&self, calls: &[Call<T>]) -> Result<LintResult, T::Error>
    where
        T: TypeInfo + Sync,
        T::Error: Send,
    {
        let files: BTreeSet<&std::path::Path> = calls.iter().map(|c| c.site.file()).collect();
        info!(
            "Checking {} call site(s) in {} file(s)",
            calls.len(),
            files.len()
        );

        let found: Vec<Option<Violation>> = calls
            .par_iter()
            .map(|call| self.check(call))
            .collect::<Result<_, _>>()?;

        let mut result = LintResult {
            violations: found.into_iter().flatten().collect(),
            calls_checked: calls.len(),
        };
        result.sort();

        info!(
            "Check complete: {} violation(s) in {} call site(s)",
            result.violations.len(),
            result.calls_checked
        );
        Ok(result)
    }

    fn check_resolved<T: TypeInfo>(
        &self,
        kind: CallKind,
        site: &CallSite,
        called_on: &T,
        method: Option<&str>,
    ) -> Result<Option<Violation>, T::Error> {
        let message = disallowed_method_message(
            site,
            called_on,
            method,
            self.rules(kind),
            self.paths.as_ref(),
        )?;
        Ok(message.map(|m| self.violation(kind, site, m)))
    }

    fn violation(&self, kind: CallKind, site: &CallSite, message: String) -> Violation {
        debug!(
            "{} at {}:{}",
            kind.rule_name(),
            site.location.file.display(),
            site.location.line
        );
        Violation::for_call(kind, self.severity, site.location.clone(), message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call_site::Argument;
    use crate::reflection::{ClassDef, ClassTable, ReflectionError};
    use crate::types::Location;

    fn checker(toml: &str) -> DisallowedCalls {
        DisallowedCalls::builder()
            .root("/project")
            .config(Config::parse(toml).unwrap())
            .build()
            .unwrap()
    }

    fn site(file: &str, line: usize) -> CallSite {
        CallSite::new(Location::new(file, line, 1))
    }

    #[test]
    fn builds_rules_per_section() {
        let c = checker(
            r#"
[[function]]
function = "eval"

[[method]]
method = "PDO::query"

[[static]]
method = "Royale::withCheese"
[[static]]
method = "Royale::withBad*"
"#,
        );
        assert_eq!(c.rule_count(), 4);
        assert_eq!(c.rules(CallKind::Static).len(), 2);
        assert_eq!(c.severity(), Severity::Error);
    }

    #[test]
    fn build_fails_on_bad_entry() {
        let config = Config::parse("[[method]]\nmessage = \"no id\"\n").unwrap();
        let err = DisallowedCalls::builder()
            .root("/project")
            .config(config)
            .build()
            .err()
            .unwrap();
        assert!(matches!(
            err,
            CheckerError::Config(ConfigError::MissingIdentifier { .. })
        ));
    }

    #[test]
    fn function_call_violation() {
        let c = checker("[[function]]\nfunction = \"var_dump\"\nmessage = \"use logger\"\n");
        let v = c
            .check_function(&site("src/a.php", 4), "\\var_dump")
            .unwrap();
        assert_eq!(v.code, "DC001");
        assert_eq!(v.location.line, 4);
        assert_eq!(v.message, "Calling var_dump() is forbidden, use logger");
    }

    #[test]
    fn function_rules_do_not_apply_to_methods() {
        let c = checker("[[function]]\nfunction = \"Foo::bar\"\n");
        let table: ClassTable = [ClassDef::new("Foo").method("bar")].into_iter().collect();
        let found = c
            .check_method(&site("src/a.php", 1), &table.object_type("Foo"), Some("bar"))
            .unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn severity_override() {
        let c = DisallowedCalls::builder()
            .root("/project")
            .config(Config::parse("[[function]]\nfunction = \"eval\"\n").unwrap())
            .severity(Severity::Warning)
            .build()
            .unwrap();
        let v = c.check_function(&site("a.php", 1), "eval").unwrap();
        assert_eq!(v.severity, Severity::Warning);
    }

    #[test]
    fn check_all_sorts_and_counts() {
        let c = checker(
            r#"
[[function]]
function = "exec"
allow-params-anywhere = { 1 = "ls" }

[[static]]
method = "Royale::withCheese"
"#,
        );
        let table: ClassTable = [ClassDef::new("Royale").method("withCheese")]
            .into_iter()
            .collect();
        let calls = vec![
            Call {
                site: site("src/b.php", 9),
                target: CallTarget::Static {
                    class: table.receiver(Some("Royale")),
                    method: Some("withCheese".into()),
                },
            },
            Call {
                site: site("src/a.php", 2).with_args([Argument::literal("rm")]),
                target: CallTarget::Function {
                    name: "exec".into(),
                },
            },
            Call {
                site: site("src/a.php", 1).with_args([Argument::literal("ls")]),
                target: CallTarget::Function {
                    name: "exec".into(),
                },
            },
        ];
        let result = c.check_all(&calls).unwrap();
        assert_eq!(result.calls_checked, 3);
        let where_: Vec<(String, usize)> = result
            .violations
            .iter()
            .map(|v| (v.location.file.display().to_string(), v.location.line))
            .collect();
        assert_eq!(
            where_,
            vec![("src/a.php".to_string(), 2), ("src/b.php".to_string(), 9)]
        );
        assert_eq!(calls[0].kind(), CallKind::Static);
    }

    #[test]
    fn check_all_propagates_reflection_errors() {
        let c = checker("[[method]]\nmethod = \"Sub::m\"\n");
        let table: ClassTable = [
            ClassDef::new("Sub").extends("Gone").method("x"),
        ]
        .into_iter()
        .collect();
        let calls = vec![Call {
            site: site("src/a.php", 1),
            target: CallTarget::Method {
                receiver: table.receiver(Some("Sub")),
                method: Some("m".into()),
            },
        }];
        let err = c.check_all(&calls).unwrap_err();
        assert_eq!(err, ReflectionError::ClassNotFound("Gone".into()));
    }

    #[test]
    fn missing_nested_trait_is_reported() {
        let c = checker("[[method]]\nmethod = \"C::m\"\n");
        let table: ClassTable = [
            ClassDef::new("T1").method("m"),
            ClassDef::new("T2").uses("Missing"),
            ClassDef::new("C").uses("T1").uses("T2"),
        ]
        .into_iter()
        .collect();
        let err = c
            .check_method(&site("src/a.php", 1), &table.object_type("C"), Some("m"))
            .unwrap_err();
        assert_eq!(err, ReflectionError::ClassNotFound("Missing".into()));
    }

    #[test]
    fn relative_root_matches_absolute_files() {
        let cwd = std::env::current_dir().unwrap();
        let config = "[[function]]\nfunction = \"var_dump\"\nallow-in = [\"src/*\"]\n";
        for root in [".", "./", "../disallowed-calls-core/."] {
            let c = DisallowedCalls::builder()
                .root(root)
                .config(Config::parse(config).unwrap())
                .build()
                .unwrap();
            let inside = CallSite::new(Location::new(cwd.join("src/a.php"), 1, 1));
            let outside = CallSite::new(Location::new(cwd.join("tests/a.php"), 1, 1));
            let relative = site("src/a.php", 1);
            assert!(c.check_function(&inside, "var_dump").is_none(), "root {root}");
            assert!(c.check_function(&relative, "var_dump").is_none(), "root {root}");
            assert!(c.check_function(&outside, "var_dump").is_some(), "root {root}");
        }
    }
}
