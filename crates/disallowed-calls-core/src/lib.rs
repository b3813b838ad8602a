//! # disallowed-calls-core
//!
//! Rule engine that forbids configured function, method and static calls.
//!
//! The host analyzer discovers call sites and resolves what they call; this
//! crate decides whether a call is forbidden and renders the diagnostic. It
//! includes:
//!
//! - [`Config`] for loading rule lists from TOML
//! - [`DisallowedCall`] for a compiled rule with its exceptions
//! - [`DisallowedCalls`] for checking call sites against all rules
//! - [`origin`] for resolving trait and inherited method declarations
//! - [`Snapshot`] and [`ClassTable`] for checking calls exported to JSON
//!
//! ## Example
//!
//! ```ignore
//! use disallowed_calls_core::{CallSite, Config, DisallowedCalls, Location};
//!
//! let checker = DisallowedCalls::builder()
//!     .root("/project")
//!     .config(Config::from_file("disallowed-calls.toml".as_ref())?)
//!     .build()?;
//!
//! let site = CallSite::new(Location::new("/project/src/a.php", 3, 1));
//! if let Some(violation) = checker.check_function(&site, "var_dump") {
//!     println!("{violation}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod call_site;
mod checker;
mod config;
mod rule;
mod types;

pub mod matcher;
pub mod message;
pub mod origin;
pub mod reflection;
pub mod registry;
pub mod snapshot;

/// Utility modules shared by the matching engine.
pub mod utils;

pub use call_site::{Argument, CallSite, LiteralValue};
pub use checker::{Call, CallTarget, CheckerError, DisallowedCalls, DisallowedCallsBuilder};
pub use config::{Config, ConfigError};
pub use origin::{ClassInfo, MethodInfo, TypeInfo};
pub use reflection::{ClassDef, ClassTable, ReceiverType, ReflectionError};
pub use registry::config_dto::RawCallDto;
pub use rule::{
    normalize_identifier, AllowPath, CallPattern, DisallowedCall, ModelError, ParamConstraints,
};
pub use snapshot::{Snapshot, SnapshotError};
pub use types::{CallKind, LintResult, Location, Severity, Violation};
