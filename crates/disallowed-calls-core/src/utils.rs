//! Utilities shared by the matching engine.

pub mod paths;

#[doc(inline)]
pub use paths::{GlobPathMatcher, PathMatcher};
