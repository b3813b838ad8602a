//! Check command implementation.

use anyhow::{Context, Result};
use disallowed_calls_core::{LintResult, Snapshot};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// File name suffix of call-site snapshots.
const SNAPSHOT_SUFFIX: &str = ".calls.json";

/// Runs the check command.
pub fn run(path: &Path, root: &Path, format: OutputFormat, source: &ConfigSource) -> Result<()> {
    let checker = super::build_checker(root, source)?;

    let snapshots = collect_snapshots(path)?;
    tracing::info!(
        "Checking {} snapshot(s) with {} rule(s)",
        snapshots.len(),
        checker.rule_count()
    );

    let mut result = LintResult::new();
    for file in &snapshots {
        let snapshot = Snapshot::from_file(file)
            .with_context(|| format!("Failed to load snapshot: {}", file.display()))?;
        let table = snapshot.class_table();
        let calls = snapshot
            .calls(&table)
            .with_context(|| format!("Invalid snapshot: {}", file.display()))?;
        let found = checker
            .check_all(&calls)
            .with_context(|| format!("Failed to resolve calls in {}", file.display()))?;
        result.extend(found);
    }
    result.sort();

    super::output::print(&result, format)?;

    if result.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

/// Returns `path` itself when it is a file, else every snapshot below it
/// in a stable order.
fn collect_snapshots(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
        let is_snapshot = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(SNAPSHOT_SUFFIX));
        if entry.file_type().is_file() && is_snapshot {
            tracing::debug!("Found snapshot: {}", entry.path().display());
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn single_file_is_taken_as_is() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("anything.json");
        fs::write(&file, "{}").unwrap();
        assert_eq!(collect_snapshots(&file).unwrap(), vec![file]);
    }

    #[test]
    fn directory_is_walked_for_snapshots() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("b/nested")).unwrap();
        fs::write(tmp.path().join("b/nested/z.calls.json"), "{}").unwrap();
        fs::write(tmp.path().join("a.calls.json"), "{}").unwrap();
        fs::write(tmp.path().join("notes.json"), "{}").unwrap();

        let found = collect_snapshots(tmp.path()).unwrap();
        assert_eq!(
            found,
            vec![
                tmp.path().join("a.calls.json"),
                tmp.path().join("b/nested/z.calls.json"),
            ]
        );
    }
}
