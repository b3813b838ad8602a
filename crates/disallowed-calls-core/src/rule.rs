//! Compiled disallow rules.
//!
//! Everything here is validated at construction time; a [`DisallowedCall`]
//! that exists is always well formed.

use crate::call_site::LiteralValue;
use std::collections::BTreeMap;
use std::fmt;

/// Errors raised while validating rule fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// The call identifier is empty.
    #[error("call identifier must not be empty")]
    EmptyIdentifier,

    /// A `*` appears somewhere other than the last character.
    #[error("wildcard `*` is only allowed as the last character: `{call}`")]
    MisplacedWildcard {
        /// The offending identifier.
        call: String,
    },

    /// An `allow-in` entry is not a valid glob.
    #[error("invalid path pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Error from the glob parser.
        reason: String,
    },

    /// A parameter position is not a positive integer, or repeats one.
    #[error("parameter position must be a distinct integer >= 1, got `{position}`")]
    InvalidPosition {
        /// The raw position key.
        position: String,
    },
}

/// A validated call identifier, `function` or `Class::method`, optionally
/// ending in `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallPattern(String);

impl CallPattern {
    /// Creates a call pattern, stripping a leading `\` and a trailing `()`.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is empty or has a `*` before the
    /// last character.
    pub fn new(raw: &str) -> Result<Self, ModelError> {
        let call = normalize_identifier(raw);
        let call = call.strip_suffix("()").unwrap_or(call);
        if call.is_empty() {
            return Err(ModelError::EmptyIdentifier);
        }
        if call.trim_end_matches('*').contains('*') || call.matches('*').count() > 1 {
            return Err(ModelError::MisplacedWildcard {
                call: raw.to_string(),
            });
        }
        Ok(Self(call.to_string()))
    }

    /// Returns `true` if this pattern ends with the wildcard marker.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.0.ends_with('*')
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strips the leading namespace separator from a fully qualified name.
#[must_use]
pub fn normalize_identifier(name: &str) -> &str {
    name.trim().trim_start_matches('\\')
}

/// A validated `allow-in` glob, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowPath(String);

impl AllowPath {
    /// Creates a new path pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern has invalid glob syntax.
    pub fn new(pattern: &str) -> Result<Self, ModelError> {
        glob::Pattern::new(pattern).map_err(|e| ModelError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self(pattern.to_string()))
    }

    /// Returns the pattern as written in the configuration.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Required literal values keyed by 1-based argument position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamConstraints(BTreeMap<usize, LiteralValue>);

impl ParamConstraints {
    /// Builds constraints from raw `position -> value` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if a position is not an integer `>= 1`, or if two
    /// keys (e.g., `1` and `01`) name the same position.
    pub fn from_raw<'a, I>(entries: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = (&'a String, &'a LiteralValue)>,
    {
        let mut params = BTreeMap::new();
        for (position, value) in entries {
            let invalid = || ModelError::InvalidPosition {
                position: position.clone(),
            };
            let p = match position.trim().parse::<usize>() {
                Ok(p) if p >= 1 => p,
                _ => return Err(invalid()),
            };
            if params.insert(p, value.clone()).is_some() {
                return Err(invalid());
            }
        }
        Ok(Self(params))
    }

    /// Returns `true` if no position is constrained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(position, expected)` pairs in position order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &LiteralValue)> {
        self.0.iter().map(|(p, v)| (*p, v))
    }
}

impl<V: Into<LiteralValue>> FromIterator<(usize, V)> for ParamConstraints {
    fn from_iter<T: IntoIterator<Item = (usize, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(p, v)| (p, v.into())).collect())
    }
}

impl fmt::Display for ParamConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(p, v)| format!("{p} = {v}")).collect();
        write!(f, "{{ {} }}", parts.join(", "))
    }
}

/// An immutable disallow rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisallowedCall {
    call: CallPattern,
    message: Option<String>,
    allow_in: Vec<AllowPath>,
    allow_params_in_allowed: ParamConstraints,
    allow_params_anywhere: ParamConstraints,
}

impl DisallowedCall {
    /// Creates a rule without exceptions.
    #[must_use]
    pub fn new(call: CallPattern, message: Option<String>) -> Self {
        Self {
            call,
            message,
            allow_in: Vec::new(),
            allow_params_in_allowed: ParamConstraints::default(),
            allow_params_anywhere: ParamConstraints::default(),
        }
    }

    /// Sets the `allow-in` path patterns.
    #[must_use]
    pub fn with_allow_in(mut self, allow_in: Vec<AllowPath>) -> Self {
        self.allow_in = allow_in;
        self
    }

    /// Sets the parameters required when an `allow-in` pattern matched.
    #[must_use]
    pub fn with_allow_params_in_allowed(mut self, params: ParamConstraints) -> Self {
        self.allow_params_in_allowed = params;
        self
    }

    /// Sets the parameters that allow the call from any location.
    #[must_use]
    pub fn with_allow_params_anywhere(mut self, params: ParamConstraints) -> Self {
        self.allow_params_anywhere = params;
        self
    }

    /// Returns the configured identifier (without `()`).
    #[must_use]
    pub fn call(&self) -> &str {
        self.call.as_str()
    }

    /// Returns the call pattern.
    #[must_use]
    pub fn pattern(&self) -> &CallPattern {
        &self.call
    }

    /// Returns the message appended to diagnostics.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the `allow-in` path patterns in configured order.
    #[must_use]
    pub fn allow_in(&self) -> &[AllowPath] {
        &self.allow_in
    }

    /// Returns the parameters checked when a path pattern matched.
    #[must_use]
    pub fn allow_params_in_allowed(&self) -> &ParamConstraints {
        &self.allow_params_in_allowed
    }

    /// Returns the parameters checked regardless of location.
    #[must_use]
    pub fn allow_params_anywhere(&self) -> &ParamConstraints {
        &self.allow_params_anywhere
    }
}

impl fmt::Display for DisallowedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}()", self.call)?;
        if let Some(message) = &self.message {
            write!(f, " - {message}")?;
        }
        if !self.allow_in.is_empty() {
            let paths: Vec<&str> = self.allow_in.iter().map(AllowPath::as_str).collect();
            write!(f, "\n    allow-in: {}", paths.join(", "))?;
        }
        if !self.allow_params_in_allowed.is_empty() {
            write!(
                f,
                "\n    allow-params-in-allowed: {}",
                self.allow_params_in_allowed
            )?;
        }
        if !self.allow_params_anywhere.is_empty() {
            write!(
                f,
                "\n    allow-params-anywhere: {}",
                self.allow_params_anywhere
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_pattern_strips_leading_backslash_and_parens() {
        let p = CallPattern::new("\\Fiction\\Pulp\\Royale::withBad*()").unwrap();
        assert_eq!(p.as_str(), "Fiction\\Pulp\\Royale::withBad*");
        assert!(p.is_wildcard());
    }

    #[test]
    fn call_pattern_plain_function() {
        let p = CallPattern::new("var_dump").unwrap();
        assert_eq!(p.as_str(), "var_dump");
        assert!(!p.is_wildcard());
    }

    #[test]
    fn call_pattern_rejects_empty() {
        assert_eq!(CallPattern::new(""), Err(ModelError::EmptyIdentifier));
        assert_eq!(CallPattern::new("()"), Err(ModelError::EmptyIdentifier));
        assert_eq!(CallPattern::new("\\"), Err(ModelError::EmptyIdentifier));
    }

    #[test]
    fn call_pattern_rejects_inner_wildcard() {
        assert!(matches!(
            CallPattern::new("Foo::*bar"),
            Err(ModelError::MisplacedWildcard { .. })
        ));
        assert!(matches!(
            CallPattern::new("Foo::bar**"),
            Err(ModelError::MisplacedWildcard { .. })
        ));
    }

    #[test]
    fn allow_path_rejects_bad_glob() {
        assert!(AllowPath::new("src/allowed/*.php").is_ok());
        assert!(matches!(
            AllowPath::new("src/[unclosed"),
            Err(ModelError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn param_constraints_parse_positions() {
        let raw: BTreeMap<String, LiteralValue> = [
            ("1".to_string(), LiteralValue::Int(1)),
            ("3".to_string(), LiteralValue::Str("x".into())),
        ]
        .into_iter()
        .collect();
        let params = ParamConstraints::from_raw(&raw).unwrap();
        let positions: Vec<usize> = params.iter().map(|(p, _)| p).collect();
        assert_eq!(positions, vec![1, 3]);
    }

    #[test]
    fn param_constraints_reject_zero_and_text() {
        for bad in ["0", "first", "-1"] {
            let raw: BTreeMap<String, LiteralValue> =
                [(bad.to_string(), LiteralValue::Int(1))].into_iter().collect();
            assert!(matches!(
                ParamConstraints::from_raw(&raw),
                Err(ModelError::InvalidPosition { .. })
            ));
        }
    }

    #[test]
    fn param_constraints_reject_duplicate_positions() {
        for alias in ["01", "+1"] {
            let raw: BTreeMap<String, LiteralValue> = [
                ("1".to_string(), LiteralValue::Int(1)),
                (alias.to_string(), LiteralValue::Int(2)),
            ]
            .into_iter()
            .collect();
            assert!(matches!(
                ParamConstraints::from_raw(&raw),
                Err(ModelError::InvalidPosition { .. })
            ));
        }
    }

    #[test]
    fn display_lists_exceptions() {
        let rule = DisallowedCall::new(CallPattern::new("exec").unwrap(), Some("no".into()))
            .with_allow_in(vec![AllowPath::new("bin/*").unwrap()])
            .with_allow_params_anywhere([(1, 2)].into_iter().collect());
        let text = rule.to_string();
        assert!(text.starts_with("exec() - no"));
        assert!(text.contains("allow-in: bin/*"));
        assert!(text.contains("allow-params-anywhere: { 1 = 2 }"));
    }
}
