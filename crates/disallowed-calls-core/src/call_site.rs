//! Host-provided view of a single call site.

use crate::types::Location;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A compile-time scalar constant inferred by the host analyzer.
///
/// Equality is by type and value: `Int(1)`, `Bool(true)` and `Str("1")`
/// are all distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    /// Boolean constant.
    Bool(bool),
    /// Integer constant.
    Int(i64),
    /// String constant.
    Str(String),
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => write!(f, "'{s}'"),
        }
    }
}

impl From<i64> for LiteralValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for LiteralValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// One argument expression of a call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    /// The argument's value if the host could fold it to a scalar constant.
    pub literal: Option<LiteralValue>,
}

impl Argument {
    /// An argument with a statically known value.
    #[must_use]
    pub fn literal(value: impl Into<LiteralValue>) -> Self {
        Self {
            literal: Some(value.into()),
        }
    }

    /// An argument whose value is not known at analysis time.
    #[must_use]
    pub fn unknown() -> Self {
        Self { literal: None }
    }
}

impl From<Option<LiteralValue>> for Argument {
    fn from(literal: Option<LiteralValue>) -> Self {
        Self { literal }
    }
}

/// A call site discovered by the host: where it is and what it was passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// Location of the call; its file is matched against `allow-in` patterns.
    pub location: Location,
    /// Arguments in source order (0-indexed).
    pub args: Vec<Argument>,
}

impl CallSite {
    /// Creates a call site without arguments.
    #[must_use]
    pub fn new(location: Location) -> Self {
        Self {
            location,
            args: Vec::new(),
        }
    }

    /// Sets the argument list.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = Argument>) -> Self {
        self.args = args.into_iter().collect();
        self
    }

    /// Returns the source file of the call.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.location.file
    }

    /// Returns the known literal at a 1-based argument position.
    ///
    /// `None` when the argument is missing or its value is not a constant.
    #[must_use]
    pub fn literal_at(&self, position: usize) -> Option<&LiteralValue> {
        position
            .checked_sub(1)
            .and_then(|index| self.args.get(index))
            .and_then(|arg| arg.literal.as_ref())
    }
}
