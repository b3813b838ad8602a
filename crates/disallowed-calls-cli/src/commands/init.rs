//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# disallowed-calls configuration

# Severity of reported calls: "error", "warning" or "info"
severity = "error"

# Plain function calls, foo()
[[function]]
function = "var_dump()"
message = "use the logger instead"
# Paths relative to the project root where the call is fine
allow-in = ["tests/*"]

# [[function]]
# function = "exec"
# message = "only listing is allowed"
# Allowed anywhere when the 1st argument is the literal "ls"
# allow-params-anywhere = { 1 = "ls" }

# Instance method calls, $obj->method()
# [[method]]
# method = "PDO::query()"
# message = "use prepared statements"

# Static calls, Class::method(); a trailing * matches any suffix
# [[static]]
# method = "App\\Debug::dump*"
# message = "debug helpers are not for production"
# allow-in = ["src/Debug/*"]
# allow-params-in-allowed = { 1 = true }
"#;

/// File name written by the init command.
const CONFIG_NAME: &str = "disallowed-calls.toml";

/// Runs the init command.
pub fn run(root: &Path, force: bool) -> Result<()> {
    let config_path = root.join(CONFIG_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_NAME} to list the calls to forbid");
    println!("  2. Run: disallowed-calls check <snapshot-dir>");

    Ok(())
}
