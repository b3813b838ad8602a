//! Call-site snapshots exported by a host analyzer.
//!
//! A snapshot is a JSON document listing the classes the analyzer knows
//! about and every call it discovered:
//!
//! ```json
//! {
//!   "classes": [
//!     { "name": "Inheritance\\Base", "methods": ["woofer"] },
//!     { "name": "Inheritance\\Sub", "parent": "Inheritance\\Base" }
//!   ],
//!   "calls": [
//!     { "kind": "function", "name": "var_dump", "file": "src/a.php", "line": 3, "column": 1 },
//!     { "kind": "method", "receiver": "Inheritance\\Sub", "method": "woofer",
//!       "file": "src/a.php", "line": 4, "column": 1, "args": [1, null, "x"] }
//!   ]
//! }
//! ```

use crate::call_site::{Argument, CallSite, LiteralValue};
use crate::checker::{Call, CallTarget};
use crate::reflection::{ClassDef, ClassTable, ReceiverType};
use crate::types::{CallKind, Location};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Errors loading a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// IO error reading the snapshot file.
    #[error("Failed to read snapshot {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Malformed JSON.
    #[error("Failed to parse snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// A call lacks a field its kind requires.
    #[error("calls[{index}]: a {kind} call requires `{field}`")]
    MissingField {
        /// Index of the call in the snapshot.
        index: usize,
        /// Kind of the call.
        kind: CallKind,
        /// The missing field.
        field: &'static str,
    },
}

/// A deserialized snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    /// Known classes and traits.
    #[serde(default)]
    pub classes: Vec<ClassDef>,
    /// Discovered calls.
    #[serde(default)]
    pub calls: Vec<SnapshotCall>,
}

/// One call as recorded in a snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotCall {
    /// Function, method or static call.
    pub kind: CallKind,
    /// Resolved function name (function calls).
    #[serde(default)]
    pub name: Option<String>,
    /// Inferred receiver class (method calls); absent if unknown.
    #[serde(default)]
    pub receiver: Option<String>,
    /// Referenced class (static calls); absent if unknown.
    #[serde(default)]
    pub class: Option<String>,
    /// Method name; absent if dynamic.
    #[serde(default)]
    pub method: Option<String>,
    /// Source file.
    pub file: PathBuf,
    /// Line number (1-indexed).
    #[serde(default = "default_position")]
    pub line: usize,
    /// Column number (1-indexed).
    #[serde(default = "default_position")]
    pub column: usize,
    /// Argument literals; `null` for values unknown at analysis time.
    #[serde(default)]
    pub args: Vec<Option<LiteralValue>>,
}

fn default_position() -> usize {
    1
}

impl Snapshot {
    /// Loads a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path).map_err(|e| SnapshotError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses a snapshot from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid.
    pub fn parse(content: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Builds the class model described by the snapshot.
    #[must_use]
    pub fn class_table(&self) -> ClassTable {
        self.classes.iter().cloned().collect()
    }

    /// Converts the recorded calls into checkable calls against `table`.
    ///
    /// # Errors
    ///
    /// Returns an error if a function call has no `name`.
    pub fn calls<'t>(
        &self,
        table: &'t ClassTable,
    ) -> Result<Vec<Call<ReceiverType<'t>>>, SnapshotError> {
        self.calls
            .iter()
            .enumerate()
            .map(|(index, call)| call.to_call(index, table))
            .collect()
    }
}

impl SnapshotCall {
    fn to_call<'t>(
        &self,
        index: usize,
        table: &'t ClassTable,
    ) -> Result<Call<ReceiverType<'t>>, SnapshotError> {
        let site = CallSite::new(Location::new(self.file.clone(), self.line, self.column))
            .with_args(self.args.iter().cloned().map(Argument::from));

        let target = match self.kind {
            CallKind::Function => CallTarget::Function {
                name: self.name.clone().ok_or(SnapshotError::MissingField {
                    index,
                    kind: self.kind,
                    field: "name",
                })?,
            },
            CallKind::Method => CallTarget::Method {
                receiver: table.receiver(self.receiver.as_deref()),
                method: self.method.clone(),
            },
            CallKind::Static => CallTarget::Static {
                class: table.receiver(self.class.as_deref()),
                method: self.method.clone(),
            },
        };

        Ok(Call { site, target })
    }
}
