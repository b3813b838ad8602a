//! Resolution of where a called method is actually declared.
//!
//! A method body may live in a trait or a parent class while being invoked
//! through a composing class or subclass. Rules are written against the
//! declaration, so the resolver produces the identifiers a rule could name,
//! most specific first:
//!
//! 1. `<Trait>::<method>` for every trait of the declaring class that
//!    declares the method, in composition order;
//! 2. `<DeclaringClass>::<method>`.
//!
//! Each candidate carries the `called as` name (`<ReceiverClass>::<method>`)
//! used in the diagnostic when it differs.
//!
//! Unknown receiver types and dynamic method names yield no candidates, so
//! incomplete type information never produces a diagnostic. Errors raised by
//! the host's reflection are returned unchanged.

use crate::call_site::CallSite;
use crate::message::disallowed_message;
use crate::rule::DisallowedCall;
use crate::utils::paths::PathMatcher;
use tracing::debug;

/// Reflection of a class or trait, provided by the host analyzer.
pub trait ClassInfo: Sized {
    /// Error raised when a referenced class cannot be loaded.
    type Error;

    /// Fully qualified display name (e.g., `Traits\TestTrait`).
    fn display_name(&self) -> &str;

    /// Whether the class or trait exposes a method with this name.
    ///
    /// # Errors
    ///
    /// Returns the host error if a class it depends on cannot be loaded.
    fn has_method(&self, method: &str) -> Result<bool, Self::Error>;

    /// Traits composed directly into this class, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns the host error if a trait cannot be loaded.
    fn traits(&self) -> Result<Vec<Self>, Self::Error>;
}

/// A method as reflected by the host.
#[derive(Debug, Clone)]
pub struct MethodInfo<C> {
    /// The method name as declared (may differ in case from the call).
    pub name: String,
    /// The class the method belongs to. For a method imported from a
    /// trait this is the class using the trait.
    pub declaring_class: C,
}

/// The statically inferred type a method is called on.
pub trait TypeInfo {
    /// Error raised by the host's reflection layer.
    type Error;
    /// Class reflection handed out by this type.
    type Class: ClassInfo<Error = Self::Error>;

    /// Whether the type supports method calls at all.
    fn can_call_methods(&self) -> bool;

    /// Whether the type exposes the named method.
    fn has_method(&self, method: &str) -> bool;

    /// Concrete class name, when the type has one.
    fn class_name(&self) -> Option<&str>;

    /// Looks up the named method.
    ///
    /// # Errors
    ///
    /// Returns the host error if reflection fails.
    fn method(&self, method: &str) -> Result<MethodInfo<Self::Class>, Self::Error>;
}

/// One identifier to test against the rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Where the method is declared (`Trait::method` or `Class::method`).
    pub declared_as: String,
    /// How the method was called, if the receiver has a class name.
    pub called_as: Option<String>,
}

/// Formats `Class::method`.
#[must_use]
pub fn qualified(class: &str, method: &str) -> String {
    format!("{class}::{method}")
}

/// Lists the candidate identifiers for a method call, trait declarations
/// first.
///
/// `method` is `None` when the called name is not a plain identifier
/// (e.g., `$obj->$name()`).
///
/// # Errors
///
/// Propagates reflection errors from the host.
pub fn resolve_candidates<T: TypeInfo>(
    called_on: &T,
    method: Option<&str>,
) -> Result<Vec<Candidate>, T::Error> {
    let Some(method_name) = method else {
        debug!("Skipping method call with dynamic name");
        return Ok(Vec::new());
    };

    if !called_on.can_call_methods() || !called_on.has_method(method_name) {
        debug!("Cannot resolve method {} on receiver type", method_name);
        return Ok(Vec::new());
    }

    let method = called_on.method(method_name)?;
    let called_as = called_on
        .class_name()
        .map(|class| qualified(class, &method.name));

    let mut candidates = Vec::new();
    for used in method.declaring_class.traits()? {
        if used.has_method(&method.name)? {
            candidates.push(Candidate {
                declared_as: qualified(used.display_name(), &method.name),
                called_as: called_as.clone(),
            });
        }
    }

    candidates.push(Candidate {
        declared_as: qualified(method.declaring_class.display_name(), &method.name),
        called_as,
    });

    Ok(candidates)
}

/// Resolves a method or static call and renders the first disallowing
/// rule's message.
///
/// # Errors
///
/// Propagates reflection errors from the host.
pub fn disallowed_method_message<T: TypeInfo>(
    site: &CallSite,
    called_on: &T,
    method: Option<&str>,
    rules: &[DisallowedCall],
    paths: &dyn PathMatcher,
) -> Result<Option<String>, T::Error> {
    let candidates = resolve_candidates(called_on, method)?;
    Ok(candidates.iter().find_map(|c| {
        debug!("Testing {} (called as {:?})", c.declared_as, c.called_as);
        disallowed_message(
            site,
            &c.declared_as,
            c.called_as.as_deref(),
            rules,
            paths,
        )
    }))
}
