//! List rules command implementation.

use anyhow::Result;
use disallowed_calls_core::CallKind;
use std::path::Path;

use crate::config_resolver::ConfigSource;

/// Runs the list-rules command.
pub fn run(root: &Path, source: &ConfigSource) -> Result<()> {
    let checker = super::build_checker(root, source)?;

    match source.path() {
        Some(path) => println!("Rules from {}:\n", path.display()),
        None => println!("No configuration found.\n"),
    }

    for kind in [CallKind::Function, CallKind::Method, CallKind::Static] {
        let rules = checker.rules(kind);
        println!("{:<6} {} ({} rule(s))", kind.code(), kind.rule_name(), rules.len());
        println!("{}", "-".repeat(60));
        for rule in rules {
            println!("{rule}");
        }
        println!();
    }

    println!("Severity: {}", checker.severity());
    Ok(())
}
