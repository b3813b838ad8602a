//! Output formatting for check results.

use anyhow::Result;
use disallowed_calls_core::LintResult;

use crate::OutputFormat;

/// Print check results in the specified format.
pub fn print(result: &LintResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for violation in &result.violations {
                println!("{}", violation.format());
            }
            println!("{}", summary(result));
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Compact => {
            for violation in &result.violations {
                println!("{violation}");
            }
        }
    }
    Ok(())
}

/// Colored one-line totals, red when anything fails the check.
fn summary(result: &LintResult) -> String {
    let (errors, warnings, infos) = result.count_by_severity();
    let color = match (errors, warnings) {
        (0, 0) => "\x1b[32m",
        (0, _) => "\x1b[33m",
        _ => "\x1b[31m",
    };
    format!(
        "{color}Found {errors} error(s), {warnings} warning(s), {infos} info(s) in {} call(s)\x1b[0m",
        result.calls_checked
    )
}
