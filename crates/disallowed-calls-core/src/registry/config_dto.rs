//! Raw configuration entries (DTO layer).
//!
//! These types exist solely for serde deserialization.
//! They are compiled to [`DisallowedCall`](crate::rule::DisallowedCall)s
//! by [`compile`](super::compile).

use crate::call_site::LiteralValue;
use serde::Deserialize;
use std::collections::BTreeMap;

/// One disallowed-call entry as written in the configuration.
///
/// Exactly one of `function` or `method` is expected; when both are given
/// `function` is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawCallDto {
    /// Function identifier (e.g., `var_dump`).
    #[serde(default)]
    pub function: Option<String>,
    /// Method identifier (e.g., `PDO::query`).
    #[serde(default)]
    pub method: Option<String>,
    /// Text appended to the diagnostic.
    #[serde(default)]
    pub message: Option<String>,
    /// File path globs, relative to the project root.
    #[serde(default, alias = "allowIn")]
    pub allow_in: Vec<String>,
    /// Required literals when an `allow-in` path matched.
    #[serde(default, alias = "allowParamsInAllowed")]
    pub allow_params_in_allowed: BTreeMap<String, LiteralValue>,
    /// Literals that allow the call from any location.
    #[serde(default, alias = "allowParamsAnywhere")]
    pub allow_params_anywhere: BTreeMap<String, LiteralValue>,
}

impl RawCallDto {
    /// Returns the configured identifier, preferring `function`.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.function.as_deref().or(self.method.as_deref())
    }
}
