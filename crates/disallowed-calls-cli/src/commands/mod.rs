//! Subcommand implementations.

pub mod check;
pub mod init;
pub mod list_rules;
pub mod output;

use anyhow::{anyhow, Context, Result};
use disallowed_calls_core::{CheckerError, Config, ConfigError, DisallowedCalls};
use std::path::Path;

use crate::config_resolver::ConfigSource;

/// Loads the resolved configuration, or the empty default.
pub fn load_config(source: &ConfigSource) -> Result<Config> {
    let Some(path) = source.path() else {
        tracing::warn!("No configuration found, no calls are disallowed");
        return Ok(Config::default());
    };
    if source.is_global() {
        tracing::info!("Using global config: {}", path.display());
    }
    Config::from_file(path)
        .map_err(diagnostic)
        .with_context(|| format!("Failed to load config: {}", path.display()))
}

/// Compiles the configured rules into a checker rooted at `root`.
pub fn build_checker(root: &Path, source: &ConfigSource) -> Result<DisallowedCalls> {
    let config = load_config(source)?;
    DisallowedCalls::builder()
        .root(root)
        .config(config)
        .build()
        .map_err(|e| match e {
            CheckerError::Config(e) => diagnostic(e),
            other => anyhow::Error::new(other),
        })
        .context("Failed to compile rules")
}

/// Renders a configuration error with its diagnostic code and help.
fn diagnostic(err: ConfigError) -> anyhow::Error {
    anyhow!("{:?}", miette::Report::new(err))
}
