//! Rule matching and exception logic.
//!
//! A call is disallowed by a rule when its identifier matches the rule and
//! none of the rule's exceptions apply:
//!
//! 1. **allow-in**: the file matches a path pattern *and* the arguments
//!    satisfy `allow-params-in-allowed` (an empty map is satisfied).
//! 2. **allow-params-anywhere**: the arguments satisfy the map (an empty
//!    map is never satisfied).
//!
//! Once a path matched but its parameters did not, the next path pattern is
//! tried; `allow-params-anywhere` is only the final fallback.

use crate::call_site::CallSite;
use crate::rule::{DisallowedCall, ParamConstraints};
use crate::utils::paths::PathMatcher;

/// Tests whether `name` is covered by the rule's identifier.
///
/// `Foo::bar*` matches `Foo::bar` and every `Foo::barXxx`; anything else
/// must match exactly.
#[must_use]
pub fn identifier_matches(rule: &DisallowedCall, name: &str) -> bool {
    let call = rule.call();
    if rule.pattern().is_wildcard() {
        name.starts_with(call.trim_matches('*'))
    } else {
        name == call
    }
}

/// Tests whether one of the rule's exceptions applies to the call site.
#[must_use]
pub fn is_allowed(site: &CallSite, rule: &DisallowedCall, paths: &dyn PathMatcher) -> bool {
    for pattern in rule.allow_in() {
        if paths.matches(pattern.as_str(), site.file())
            && parameters_allow(site, rule.allow_params_in_allowed(), true)
        {
            return true;
        }
    }
    parameters_allow(site, rule.allow_params_anywhere(), false)
}

/// Checks the call's literal arguments against required values.
///
/// An empty map yields `default_when_empty`. Otherwise every configured
/// position must hold a known literal equal to the expected one; a missing
/// argument or an unknown value counts as a mismatch.
#[must_use]
pub fn parameters_allow(
    site: &CallSite,
    params: &ParamConstraints,
    default_when_empty: bool,
) -> bool {
    if params.is_empty() {
        return default_when_empty;
    }

    let mut disallowed = false;
    for (position, expected) in params.iter() {
        match site.literal_at(position) {
            Some(actual) => disallowed = disallowed || actual != expected,
            None => disallowed = true,
        }
    }
    !disallowed
}

/// Tests whether `rule` forbids the call to `name` at `site`.
#[must_use]
pub fn is_disallowed(
    site: &CallSite,
    name: &str,
    rule: &DisallowedCall,
    paths: &dyn PathMatcher,
) -> bool {
    identifier_matches(rule, name) && !is_allowed(site, rule, paths)
}
