//! Compiles raw configuration entries into rules.
//!
//! # Architecture
//!
//! ```text
//! TOML text
//!   ↓ serde (DTO layer)
//! RawCallDto
//!   ↓ validate + convert
//! Vec<DisallowedCall>   (configured order preserved)
//! ```

pub mod config_dto;

use crate::config::ConfigError;
use crate::rule::{AllowPath, CallPattern, DisallowedCall, ParamConstraints};
use config_dto::RawCallDto;
use tracing::debug;

/// Compiles the entries of one configuration section into rules.
///
/// Rule order equals entry order; the first matching rule wins when the
/// rules are evaluated.
///
/// # Errors
///
/// Returns [`ConfigError::MissingIdentifier`] when an entry has neither
/// `function` nor `method`, and [`ConfigError::Validation`] for any other
/// malformed field. Both name the entry as `section[index]`.
pub fn compile(section: &str, entries: &[RawCallDto]) -> Result<Vec<DisallowedCall>, ConfigError> {
    let rules = entries
        .iter()
        .enumerate()
        .map(|(i, dto)| convert_entry(dto, &format!("{section}[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Compiled {} rule(s) from [[{}]]", rules.len(), section);
    Ok(rules)
}

fn convert_entry(dto: &RawCallDto, ctx: &str) -> Result<DisallowedCall, ConfigError> {
    let raw_call = dto
        .identifier()
        .ok_or_else(|| ConfigError::MissingIdentifier {
            context: ctx.to_string(),
        })?;

    let call = CallPattern::new(raw_call).map_err(|e| ConfigError::Validation {
        context: format!("{ctx}.{}", if dto.function.is_some() { "function" } else { "method" }),
        source: e,
    })?;

    let allow_in = dto
        .allow_in
        .iter()
        .enumerate()
        .map(|(j, p)| {
            AllowPath::new(p).map_err(|e| ConfigError::Validation {
                context: format!("{ctx}.allow-in[{j}]"),
                source: e,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let in_allowed = ParamConstraints::from_raw(&dto.allow_params_in_allowed).map_err(|e| {
        ConfigError::Validation {
            context: format!("{ctx}.allow-params-in-allowed"),
            source: e,
        }
    })?;

    let anywhere = ParamConstraints::from_raw(&dto.allow_params_anywhere).map_err(|e| {
        ConfigError::Validation {
            context: format!("{ctx}.allow-params-anywhere"),
            source: e,
        }
    })?;

    Ok(DisallowedCall::new(call, dto.message.clone())
        .with_allow_in(allow_in)
        .with_allow_params_in_allowed(in_allowed)
        .with_allow_params_anywhere(anywhere))
}
